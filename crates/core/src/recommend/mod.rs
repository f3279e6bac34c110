//! Situation classification and wellness recommendation engine.
//!
//! A transcript is classified into a [`SituationCategory`], catalog items are
//! scored against the situation and the employee profile, the best ones are
//! ranked, and an empathic message is composed around the top item.
//!
//! [`SituationCategory`]: crate::domain::situation::SituationCategory

mod classifier;
mod composer;
mod engine;
pub mod lexicon;
mod scoring;

pub use classifier::{classify_situation, fallback_situation, FALLBACK_CONFIDENCE};
pub use composer::compose_message;
pub use engine::{
    CatalogSource, RecommendationEngine, RecommendationRequest, RecommendationStore,
};
pub use scoring::{ScoreCalculator, ScoringWeights};

/// Subtype used when no refinement keyword is present.
pub const GENERAL_SUBTYPE: &str = "general";

/// Default scoring weights.
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    situation_match: 40,
    beneficial_tag: 25,
    age_bracket: 20,
    hobby: 20,
    goal: 15,
    keyword: 10,
    avoid_penalty: 50,
    affordable_price: 10,
};

/// Starting prices below this earn the affordability bonus.
pub const AFFORDABLE_PRICE_CEILING: i64 = 100_000;

/// Recommendations returned when the caller does not ask for a count.
pub const DEFAULT_TOP_N: usize = 4;

/// Hard cap on composed message length, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// The goal clause is only added while the message is shorter than this.
pub const GOAL_CLAUSE_LIMIT: usize = 420;
