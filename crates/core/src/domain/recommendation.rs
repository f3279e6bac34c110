use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogItem;
use crate::domain::profile::{Profile, ProfileSnapshot};
use crate::domain::situation::Situation;
use crate::errors::DomainError;

/// Longest transcript fragment stored with a wellness request.
pub const TRANSCRIPT_EXCERPT_CHARS: usize = 500;

/// A catalog item with its score and the reasons that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    #[serde(rename = "recommendationScore")]
    pub score: i32,
    #[serde(rename = "recommendationReasons")]
    pub reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub situation: Situation,
    pub recommendations: Vec<ScoredItem>,
    pub empathic_message: String,
    pub message_length: usize,
    pub profile: Profile,
    pub timestamp: DateTime<Utc>,
}

impl RecommendationResult {
    pub fn top(&self) -> Option<&ScoredItem> {
        self.recommendations.first()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WellnessRequestId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellnessRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl WellnessRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for WellnessRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WellnessRequestStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(DomainError::InvariantViolation(format!(
                "unknown wellness request status `{other}`"
            ))),
        }
    }
}

/// Everything needed to persist a recommendation for HR review.
#[derive(Clone, Debug, PartialEq)]
pub struct NewWellnessRequest {
    pub anonymous_token: String,
    pub situation: Situation,
    pub profile: ProfileSnapshot,
    pub recommendation: ScoredItem,
    pub empathic_message: String,
    pub transcript_excerpt: String,
}

impl NewWellnessRequest {
    pub fn into_pending(self, id: WellnessRequestId, created_at: DateTime<Utc>) -> WellnessRequest {
        WellnessRequest {
            id,
            anonymous_token: self.anonymous_token,
            situation: self.situation,
            profile: self.profile,
            recommendation: self.recommendation,
            empathic_message: self.empathic_message,
            transcript_excerpt: self.transcript_excerpt,
            status: WellnessRequestStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessRequest {
    pub id: WellnessRequestId,
    pub anonymous_token: String,
    pub situation: Situation,
    pub profile: ProfileSnapshot,
    pub recommendation: ScoredItem,
    pub empathic_message: String,
    pub transcript_excerpt: String,
    pub status: WellnessRequestStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WellnessRequest {
    pub fn approve(
        &mut self,
        reviewer: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.transition(WellnessRequestStatus::Approved)?;
        self.reviewed_by = Some(reviewer.into());
        self.reviewed_at = Some(at);
        Ok(())
    }

    pub fn reject(
        &mut self,
        reviewer: impl Into<String>,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.transition(WellnessRequestStatus::Rejected)?;
        self.reviewed_by = Some(reviewer.into());
        self.reviewed_at = Some(at);
        self.rejection_reason = reason;
        Ok(())
    }

    fn transition(&mut self, next: WellnessRequestStatus) -> Result<(), DomainError> {
        if self.status != WellnessRequestStatus::Pending {
            return Err(DomainError::InvalidRequestTransition { from: self.status, to: next });
        }
        self.status = next;
        Ok(())
    }
}

/// Leading fragment of a transcript, ellipsized when it exceeds
/// [`TRANSCRIPT_EXCERPT_CHARS`].
pub fn transcript_excerpt(transcript: &str) -> String {
    if transcript.chars().count() <= TRANSCRIPT_EXCERPT_CHARS {
        return transcript.to_owned();
    }
    let mut excerpt: String = transcript.chars().take(TRANSCRIPT_EXCERPT_CHARS - 3).collect();
    excerpt.push_str("...");
    excerpt
}
