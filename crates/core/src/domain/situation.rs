use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Emotional context inferred from a conversation transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SituationCategory {
    #[serde(rename = "muerte_familiar")]
    Bereavement,
    #[serde(rename = "causa_economica")]
    EconomicHardship,
    #[serde(rename = "bloqueo_incapacidad")]
    PerceivedIncompetence,
    #[serde(rename = "rompimiento_pareja")]
    Breakup,
}

impl SituationCategory {
    /// Classification order. Earlier categories win ties.
    pub const PRIORITY: [SituationCategory; 4] =
        [Self::Bereavement, Self::Breakup, Self::PerceivedIncompetence, Self::EconomicHardship];

    /// Lexicon declaration order, used by distress analysis.
    pub const ALL: [SituationCategory; 4] =
        [Self::Bereavement, Self::EconomicHardship, Self::PerceivedIncompetence, Self::Breakup];

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Bereavement => "muerte_familiar",
            Self::EconomicHardship => "causa_economica",
            Self::PerceivedIncompetence => "bloqueo_incapacidad",
            Self::Breakup => "rompimiento_pareja",
        }
    }

    /// Parses a stored tag, falling back to perceived incompetence for
    /// anything unrecognized.
    pub fn from_tag_or_default(tag: &str) -> Self {
        tag.parse().unwrap_or(Self::PerceivedIncompetence)
    }
}

impl fmt::Display for SituationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownSituationCategory(pub String);

impl fmt::Display for UnknownSituationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown situation category `{}`", self.0)
    }
}

impl std::error::Error for UnknownSituationCategory {}

impl FromStr for SituationCategory {
    type Err = UnknownSituationCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "muerte_familiar" => Ok(Self::Bereavement),
            "causa_economica" => Ok(Self::EconomicHardship),
            "bloqueo_incapacidad" => Ok(Self::PerceivedIncompetence),
            "rompimiento_pareja" => Ok(Self::Breakup),
            other => Err(UnknownSituationCategory(other.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Situation {
    #[serde(rename = "type")]
    pub category: SituationCategory,
    #[serde(default)]
    pub subtype: Option<String>,
    pub context: String,
    pub confidence: f64,
}

impl Situation {
    pub fn subtype_or_general(&self) -> &str {
        self.subtype.as_deref().unwrap_or(crate::recommend::GENERAL_SUBTYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::{Situation, SituationCategory};

    #[test]
    fn tags_round_trip_through_from_str() {
        for category in SituationCategory::ALL {
            assert_eq!(category.as_tag().parse::<SituationCategory>(), Ok(category));
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_perceived_incompetence() {
        assert_eq!(
            SituationCategory::from_tag_or_default("emotional_distress"),
            SituationCategory::PerceivedIncompetence
        );
    }

    #[test]
    fn situation_serializes_category_under_type_key() {
        let situation = Situation {
            category: SituationCategory::Breakup,
            subtype: Some("divorcio".to_owned()),
            context: "Detectado: divorcio".to_owned(),
            confidence: 1.0 / 3.0,
        };
        let value = serde_json::to_value(&situation).expect("serialize");
        assert_eq!(value["type"], "rompimiento_pareja");
        assert_eq!(value["subtype"], "divorcio");
    }
}
