use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use behuman_core::domain::catalog::{CatalogItem, CatalogItemId};
use behuman_core::domain::recommendation::{
    NewWellnessRequest, WellnessRequest, WellnessRequestId, WellnessRequestStatus,
};
use behuman_core::errors::{ApplicationError, DomainError};

pub mod catalog;
pub mod memory;
pub mod wellness_request;

pub use catalog::SqlCatalogRepository;
pub use memory::{InMemoryCatalogRepository, InMemoryWellnessRequestRepository};
pub use wellness_request::SqlWellnessRequestRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(what) => ApplicationError::NotFound(what),
            RepositoryError::Domain(domain) => ApplicationError::Domain(domain),
            other => ApplicationError::Persistence(other.to_string()),
        }
    }
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_by_id(&self, id: &CatalogItemId) -> Result<Option<CatalogItem>, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<CatalogItem>, RepositoryError>;
    async fn list_by_situation_tag(&self, tag: &str) -> Result<Vec<CatalogItem>, RepositoryError>;
    async fn save(&self, item: CatalogItem) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait WellnessRequestRepository: Send + Sync {
    async fn create(&self, request: NewWellnessRequest)
        -> Result<WellnessRequest, RepositoryError>;

    async fn find_by_id(
        &self,
        id: &WellnessRequestId,
    ) -> Result<Option<WellnessRequest>, RepositoryError>;

    /// Newest first, optionally restricted to one status.
    async fn list(
        &self,
        status: Option<WellnessRequestStatus>,
    ) -> Result<Vec<WellnessRequest>, RepositoryError>;

    async fn save(&self, request: WellnessRequest) -> Result<(), RepositoryError>;

    /// Writes a review outcome only while the stored request is still pending.
    /// A request reviewed in the meantime yields `InvalidRequestTransition`.
    async fn record_review(&self, request: &WellnessRequest) -> Result<(), RepositoryError>;

    async fn approve(
        &self,
        id: &WellnessRequestId,
        reviewer: &str,
    ) -> Result<WellnessRequest, RepositoryError> {
        let mut request = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("wellness request {}", id.0)))?;
        request.approve(reviewer, Utc::now())?;
        self.record_review(&request).await?;
        Ok(request)
    }

    async fn reject(
        &self,
        id: &WellnessRequestId,
        reviewer: &str,
        reason: Option<String>,
    ) -> Result<WellnessRequest, RepositoryError> {
        let mut request = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("wellness request {}", id.0)))?;
        request.reject(reviewer, reason, Utc::now())?;
        self.record_review(&request).await?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use behuman_core::errors::{ApplicationError, DomainError};
    use behuman_core::WellnessRequestStatus;

    use super::RepositoryError;

    #[test]
    fn repository_errors_map_to_application_errors() {
        let not_found: ApplicationError = RepositoryError::NotFound("x".to_string()).into();
        assert_eq!(not_found, ApplicationError::NotFound("x".to_string()));

        let transition = DomainError::InvalidRequestTransition {
            from: WellnessRequestStatus::Approved,
            to: WellnessRequestStatus::Rejected,
        };
        let domain: ApplicationError = RepositoryError::Domain(transition.clone()).into();
        assert_eq!(domain, ApplicationError::Domain(transition));

        let decode: ApplicationError = RepositoryError::Decode("bad json".to_string()).into();
        assert!(matches!(decode, ApplicationError::Persistence(message) if message.contains("bad json")));
    }
}
