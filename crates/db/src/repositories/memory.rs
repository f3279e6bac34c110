use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use behuman_core::domain::catalog::{CatalogItem, CatalogItemId};
use behuman_core::domain::recommendation::{
    NewWellnessRequest, WellnessRequest, WellnessRequestId, WellnessRequestStatus,
};
use behuman_core::errors::{ApplicationError, DomainError};
use behuman_core::recommend::{CatalogSource, RecommendationStore};

use super::{CatalogRepository, RepositoryError, WellnessRequestRepository};

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    items: RwLock<HashMap<String, CatalogItem>>,
}

impl InMemoryCatalogRepository {
    pub fn with_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let items = items.into_iter().map(|item| (item.id.0.clone(), item)).collect();
        Self { items: RwLock::new(items) }
    }
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_by_id(&self, id: &CatalogItemId) -> Result<Option<CatalogItem>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.get(&id.0).cloned())
    }

    async fn list_all(&self) -> Result<Vec<CatalogItem>, RepositoryError> {
        let items = self.items.read().await;
        let mut all: Vec<CatalogItem> = items.values().cloned().collect();
        all.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(all)
    }

    async fn list_by_situation_tag(&self, tag: &str) -> Result<Vec<CatalogItem>, RepositoryError> {
        let mut tagged = self.list_all().await?;
        tagged.retain(|item| item.situation_tags.iter().any(|candidate| candidate == tag));
        Ok(tagged)
    }

    async fn save(&self, item: CatalogItem) -> Result<(), RepositoryError> {
        let mut items = self.items.write().await;
        items.insert(item.id.0.clone(), item);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogSource for InMemoryCatalogRepository {
    async fn items_by_situation_tag(
        &self,
        tag: &str,
    ) -> Result<Vec<CatalogItem>, ApplicationError> {
        Ok(self.list_by_situation_tag(tag).await?)
    }

    async fn all_items(&self) -> Result<Vec<CatalogItem>, ApplicationError> {
        Ok(self.list_all().await?)
    }
}

#[derive(Default)]
pub struct InMemoryWellnessRequestRepository {
    requests: RwLock<HashMap<String, WellnessRequest>>,
}

#[async_trait::async_trait]
impl WellnessRequestRepository for InMemoryWellnessRequestRepository {
    async fn create(
        &self,
        request: NewWellnessRequest,
    ) -> Result<WellnessRequest, RepositoryError> {
        let record =
            request.into_pending(WellnessRequestId(Uuid::new_v4().to_string()), Utc::now());
        let mut requests = self.requests.write().await;
        requests.insert(record.id.0.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_id(
        &self,
        id: &WellnessRequestId,
    ) -> Result<Option<WellnessRequest>, RepositoryError> {
        let requests = self.requests.read().await;
        Ok(requests.get(&id.0).cloned())
    }

    async fn list(
        &self,
        status: Option<WellnessRequestStatus>,
    ) -> Result<Vec<WellnessRequest>, RepositoryError> {
        let requests = self.requests.read().await;
        let mut listed: Vec<WellnessRequest> = requests
            .values()
            .filter(|request| status.map_or(true, |status| request.status == status))
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(listed)
    }

    async fn save(&self, request: WellnessRequest) -> Result<(), RepositoryError> {
        let mut requests = self.requests.write().await;
        if !requests.contains_key(&request.id.0) {
            return Err(RepositoryError::NotFound(format!("wellness request {}", request.id.0)));
        }
        requests.insert(request.id.0.clone(), request);
        Ok(())
    }

    async fn record_review(&self, request: &WellnessRequest) -> Result<(), RepositoryError> {
        let mut requests = self.requests.write().await;
        let Some(stored) = requests.get_mut(&request.id.0) else {
            return Err(RepositoryError::NotFound(format!("wellness request {}", request.id.0)));
        };
        if stored.status != WellnessRequestStatus::Pending {
            return Err(DomainError::InvalidRequestTransition {
                from: stored.status,
                to: request.status,
            }
            .into());
        }
        *stored = request.clone();
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecommendationStore for InMemoryWellnessRequestRepository {
    async fn create_recommendation_record(
        &self,
        request: NewWellnessRequest,
    ) -> Result<WellnessRequest, ApplicationError> {
        Ok(self.create(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use behuman_core::domain::catalog::{CatalogItem, CatalogItemId};
    use behuman_core::domain::profile::Profile;
    use behuman_core::domain::recommendation::{
        NewWellnessRequest, ScoredItem, WellnessRequestId, WellnessRequestStatus,
    };
    use behuman_core::domain::situation::SituationCategory;
    use behuman_core::recommend::{classify_situation, CatalogSource, RecommendationEngine};

    use super::{InMemoryCatalogRepository, InMemoryWellnessRequestRepository};
    use crate::repositories::{CatalogRepository, RepositoryError, WellnessRequestRepository};

    fn grief_item() -> CatalogItem {
        let mut item = CatalogItem::new("act-duelo", "Taller de duelo");
        item.description = "Acompanamiento grupal para procesar la perdida".to_string();
        item.starting_price = Some(Decimal::new(60_000, 0));
        item.category = "Bienestar emocional".to_string();
        item.situation_tags = vec![SituationCategory::Bereavement.as_tag().to_string()];
        item.profile_tags = vec!["adulto".to_string()];
        item
    }

    #[tokio::test]
    async fn catalog_repository_save_find_and_filter() {
        let repo = InMemoryCatalogRepository::default();
        repo.save(grief_item()).await.expect("save");
        repo.save(CatalogItem::new("act-yoga", "Yoga")).await.expect("save");

        let found =
            repo.find_by_id(&CatalogItemId("act-duelo".to_string())).await.expect("find");
        assert_eq!(found, Some(grief_item()));

        let tagged = repo.items_by_situation_tag("muerte_familiar").await.expect("tagged");
        assert_eq!(tagged.len(), 1);
        assert_eq!(repo.all_items().await.expect("all").len(), 2);
    }

    #[tokio::test]
    async fn engine_persists_top_recommendation_through_memory_store() {
        let catalog = Arc::new(InMemoryCatalogRepository::with_items([grief_item()]));
        let store = Arc::new(InMemoryWellnessRequestRepository::default());
        let engine = RecommendationEngine::new(catalog, store.clone()).with_seed(7);

        let profile = Profile::new("u-1", "Ana").with_age(34);
        let result = engine
            .process_transcript(
                "Mi abuelo murió la semana pasada. Estoy muy triste.",
                profile,
                Some("anon_test".to_string()),
            )
            .await;

        assert_eq!(result.recommendations[0].item.id.as_str(), "act-duelo");

        let stored = store.list(Some(WellnessRequestStatus::Pending)).await.expect("list");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].anonymous_token, "anon_test");
        assert_eq!(stored[0].recommendation.item.id.as_str(), "act-duelo");
        assert_eq!(stored[0].recommendation.score, result.recommendations[0].score);
    }

    #[tokio::test]
    async fn approving_twice_is_rejected() {
        let store = InMemoryWellnessRequestRepository::default();
        let created = store
            .create(NewWellnessRequest {
                anonymous_token: "anon_2".to_string(),
                situation: classify_situation("mi abuela falleció"),
                profile: Profile::new("u-2", "Luis").snapshot(),
                recommendation: ScoredItem { item: grief_item(), score: 40, reasons: Vec::new() },
                empathic_message: "Lo siento mucho.".to_string(),
                transcript_excerpt: "mi abuela falleció".to_string(),
            })
            .await
            .expect("create");

        store.approve(&created.id, "hr-1").await.expect("first approval");
        let error = store.approve(&created.id, "hr-1").await.expect_err("second approval");
        assert!(matches!(error, RepositoryError::Domain(_)));

        let missing = store
            .reject(&WellnessRequestId("nope".to_string()), "hr-1", None)
            .await
            .expect_err("unknown id");
        assert!(matches!(missing, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_reviews_leave_a_single_outcome() {
        let store = InMemoryWellnessRequestRepository::default();
        let created = store
            .create(NewWellnessRequest {
                anonymous_token: "anon_3".to_string(),
                situation: classify_situation("terminé con mi novia"),
                profile: Profile::new("u-3", "Eva").snapshot(),
                recommendation: ScoredItem { item: grief_item(), score: 30, reasons: Vec::new() },
                empathic_message: "Estamos contigo.".to_string(),
                transcript_excerpt: "terminé con mi novia".to_string(),
            })
            .await
            .expect("create");

        let (approved, rejected) = tokio::join!(
            store.approve(&created.id, "hr-a"),
            store.reject(&created.id, "hr-b", None),
        );
        assert!(approved.is_ok() != rejected.is_ok());

        let stored = store.find_by_id(&created.id).await.expect("find").expect("stored");
        let expected = if approved.is_ok() {
            WellnessRequestStatus::Approved
        } else {
            WellnessRequestStatus::Rejected
        };
        assert_eq!(stored.status, expected);
    }
}
