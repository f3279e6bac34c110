use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};
use tracing::debug;
use uuid::Uuid;

use behuman_core::domain::catalog::CatalogItem;
use behuman_core::domain::profile::ProfileSnapshot;
use behuman_core::domain::recommendation::{
    NewWellnessRequest, ScoredItem, WellnessRequest, WellnessRequestId, WellnessRequestStatus,
};
use behuman_core::domain::situation::{Situation, SituationCategory};
use behuman_core::errors::{ApplicationError, DomainError};
use behuman_core::recommend::RecommendationStore;

use super::{RepositoryError, WellnessRequestRepository};
use crate::DbPool;

const REQUEST_COLUMNS: &str = "id, anonymous_token, situation_type, situation_subtype,
        situation_context, situation_confidence, profile_json, catalog_item_json,
        recommendation_score, recommendation_reasons_json, empathic_message, transcript_excerpt,
        status, reviewed_by, reviewed_at, rejection_reason, created_at";

pub struct SqlWellnessRequestRepository {
    pool: DbPool,
}

impl SqlWellnessRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WellnessRequestRepository for SqlWellnessRequestRepository {
    async fn create(
        &self,
        request: NewWellnessRequest,
    ) -> Result<WellnessRequest, RepositoryError> {
        let record =
            request.into_pending(WellnessRequestId(Uuid::new_v4().to_string()), Utc::now());
        let item = &record.recommendation.item;
        let profile_json = encode_json(&record.profile)?;
        let item_json = encode_json(item)?;
        let reasons_json = encode_json(&record.recommendation.reasons)?;

        sqlx::query(
            "INSERT INTO wellness_request (
                id, anonymous_token, situation_type, situation_subtype, situation_context,
                situation_confidence, profile_json, catalog_item_id, catalog_item_name,
                catalog_item_price, catalog_item_category, catalog_item_subcategory,
                catalog_item_json, recommendation_score, recommendation_reasons_json,
                empathic_message, transcript_excerpt, status, created_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id.0)
        .bind(&record.anonymous_token)
        .bind(record.situation.category.as_tag())
        .bind(&record.situation.subtype)
        .bind(&record.situation.context)
        .bind(record.situation.confidence)
        .bind(profile_json)
        .bind(&item.id.0)
        .bind(&item.name)
        .bind(item.starting_price.map(|price| price.to_string()))
        .bind(&item.category)
        .bind(&item.subcategory)
        .bind(item_json)
        .bind(record.recommendation.score)
        .bind(reasons_json)
        .bind(&record.empathic_message)
        .bind(&record.transcript_excerpt)
        .bind(record.status.as_str())
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(
            event_name = "db.wellness_request.created",
            wellness_request_id = %record.id.0,
            catalog_item_id = %item.id.0,
            "wellness request stored"
        );

        Ok(record)
    }

    async fn find_by_id(
        &self,
        id: &WellnessRequestId,
    ) -> Result<Option<WellnessRequest>, RepositoryError> {
        let row =
            sqlx::query(&format!("SELECT {REQUEST_COLUMNS} FROM wellness_request WHERE id = ?"))
                .bind(&id.0)
                .fetch_optional(&self.pool)
                .await?;

        row.as_ref().map(request_from_row).transpose()
    }

    async fn list(
        &self,
        status: Option<WellnessRequestStatus>,
    ) -> Result<Vec<WellnessRequest>, RepositoryError> {
        let rows = if let Some(status) = status {
            sqlx::query(&format!(
                "SELECT {REQUEST_COLUMNS} FROM wellness_request
                 WHERE status = ?
                 ORDER BY created_at DESC, id ASC"
            ))
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(&format!(
                "SELECT {REQUEST_COLUMNS} FROM wellness_request ORDER BY created_at DESC, id ASC"
            ))
            .fetch_all(&self.pool)
            .await?
        };

        rows.iter().map(request_from_row).collect()
    }

    async fn save(&self, request: WellnessRequest) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE wellness_request
             SET status = ?, reviewed_by = ?, reviewed_at = ?, rejection_reason = ?
             WHERE id = ?",
        )
        .bind(request.status.as_str())
        .bind(&request.reviewed_by)
        .bind(request.reviewed_at.map(|at| at.to_rfc3339()))
        .bind(&request.rejection_reason)
        .bind(&request.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("wellness request {}", request.id.0)));
        }
        Ok(())
    }

    async fn record_review(&self, request: &WellnessRequest) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE wellness_request
             SET status = ?, reviewed_by = ?, reviewed_at = ?, rejection_reason = ?
             WHERE id = ? AND status = 'pending'",
        )
        .bind(request.status.as_str())
        .bind(&request.reviewed_by)
        .bind(request.reviewed_at.map(|at| at.to_rfc3339()))
        .bind(&request.rejection_reason)
        .bind(&request.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let current = self
            .find_by_id(&request.id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("wellness request {}", request.id.0)))?;
        Err(DomainError::InvalidRequestTransition { from: current.status, to: request.status }
            .into())
    }
}

#[async_trait]
impl RecommendationStore for SqlWellnessRequestRepository {
    async fn create_recommendation_record(
        &self,
        request: NewWellnessRequest,
    ) -> Result<WellnessRequest, ApplicationError> {
        Ok(self.create(request).await?)
    }
}

fn encode_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid timestamp `{raw}`: {e}")))
}

fn request_from_row(row: &SqliteRow) -> Result<WellnessRequest, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let anonymous_token: String =
        row.try_get("anonymous_token").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let situation_type: String =
        row.try_get("situation_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let situation_subtype: Option<String> =
        row.try_get("situation_subtype").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let situation_context: String =
        row.try_get("situation_context").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let situation_confidence: f64 = row
        .try_get("situation_confidence")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let profile_json: String =
        row.try_get("profile_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let item_json: String =
        row.try_get("catalog_item_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let score: i32 =
        row.try_get("recommendation_score").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let reasons_json: String = row
        .try_get("recommendation_reasons_json")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let empathic_message: String =
        row.try_get("empathic_message").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let transcript_excerpt: String =
        row.try_get("transcript_excerpt").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let reviewed_by: Option<String> =
        row.try_get("reviewed_by").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let reviewed_at: Option<String> =
        row.try_get("reviewed_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rejection_reason: Option<String> =
        row.try_get("rejection_reason").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let profile: ProfileSnapshot =
        serde_json::from_str(&profile_json).map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let item: CatalogItem =
        serde_json::from_str(&item_json).map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let reasons: Vec<String> =
        serde_json::from_str(&reasons_json).map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status: WellnessRequestStatus =
        status.parse().map_err(|e: DomainError| RepositoryError::Decode(e.to_string()))?;

    Ok(WellnessRequest {
        id: WellnessRequestId(id),
        anonymous_token,
        situation: Situation {
            category: SituationCategory::from_tag_or_default(&situation_type),
            subtype: situation_subtype,
            context: situation_context,
            confidence: situation_confidence,
        },
        profile,
        recommendation: ScoredItem { item, score, reasons },
        empathic_message,
        transcript_excerpt,
        status,
        reviewed_by,
        reviewed_at: reviewed_at.as_deref().map(parse_timestamp).transpose()?,
        rejection_reason,
        created_at: parse_timestamp(&created_at)?,
    })
}
