//! Keyword-based situation classification.

use crate::domain::situation::{Situation, SituationCategory};

use super::lexicon::lexicon_for;
use super::GENERAL_SUBTYPE;

pub const FALLBACK_CONFIDENCE: f64 = 0.3;
pub const FALLBACK_CONTEXT: &str =
    "Sin situación específica detectada - asumiendo necesidad de apoyo general";

/// Keyword hits needed for full confidence.
const FULL_CONFIDENCE_HITS: f64 = 3.0;
const CONTEXT_KEYWORDS: usize = 3;

/// Classifies a transcript into one of the four situation categories.
///
/// Categories are scanned in [`SituationCategory::PRIORITY`] order and the
/// leader only changes on a strictly higher keyword count, so ties go to the
/// earlier category. A transcript with no hits falls back to perceived
/// incompetence with a general subtype.
pub fn classify_situation(transcript: &str) -> Situation {
    let lowered = transcript.to_lowercase();

    let mut best: Option<(SituationCategory, Vec<&'static str>)> = None;
    for category in SituationCategory::PRIORITY {
        let matched = lexicon_for(category).matched_keywords(&lowered);
        let leader_hits = best.as_ref().map_or(0, |(_, hits)| hits.len());
        if !matched.is_empty() && matched.len() > leader_hits {
            best = Some((category, matched));
        }
    }

    let Some((category, matched)) = best else {
        return fallback_situation();
    };

    let subtype = lexicon_for(category).subtype_for(&lowered).unwrap_or(GENERAL_SUBTYPE);
    let shown: Vec<&str> = matched.iter().copied().take(CONTEXT_KEYWORDS).collect();

    Situation {
        category,
        subtype: Some(subtype.to_owned()),
        context: format!("Detectado: {}", shown.join(", ")),
        confidence: (matched.len() as f64 / FULL_CONFIDENCE_HITS).min(1.0),
    }
}

pub fn fallback_situation() -> Situation {
    Situation {
        category: SituationCategory::PerceivedIncompetence,
        subtype: Some(GENERAL_SUBTYPE.to_owned()),
        context: FALLBACK_CONTEXT.to_owned(),
        confidence: FALLBACK_CONFIDENCE,
    }
}
