pub mod config;
pub mod distress;
pub mod domain;
pub mod errors;
pub mod onboarding;
pub mod recommend;
pub mod tagging;

pub use distress::{analyze_distress, AlertPriority, DistressAnalysis, RecommendedAction, Severity};
pub use domain::catalog::{CatalogItem, CatalogItemId};
pub use domain::profile::{AgeBracket, Profile, ProfileSnapshot};
pub use domain::recommendation::{
    NewWellnessRequest, RecommendationResult, ScoredItem, WellnessRequest, WellnessRequestId,
    WellnessRequestStatus,
};
pub use domain::situation::{Situation, SituationCategory};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use onboarding::OnboardingAnswers;
pub use recommend::{
    classify_situation, CatalogSource, RecommendationEngine, RecommendationRequest,
    RecommendationStore,
};
