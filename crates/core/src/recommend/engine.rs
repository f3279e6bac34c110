//! Recommendation orchestration over injected catalog and storage.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::domain::catalog::CatalogItem;
use crate::domain::profile::Profile;
use crate::domain::recommendation::{
    transcript_excerpt, NewWellnessRequest, RecommendationResult, ScoredItem, WellnessRequest,
};
use crate::domain::situation::{Situation, SituationCategory};
use crate::errors::ApplicationError;

use super::classifier::classify_situation;
use super::composer::compose_message;
use super::scoring::ScoreCalculator;
use super::DEFAULT_TOP_N;

/// Read access to the wellness catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn items_by_situation_tag(&self, tag: &str)
        -> Result<Vec<CatalogItem>, ApplicationError>;
    async fn all_items(&self) -> Result<Vec<CatalogItem>, ApplicationError>;
}

/// Storage for recommendations that HR will review.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn create_recommendation_record(
        &self,
        request: NewWellnessRequest,
    ) -> Result<WellnessRequest, ApplicationError>;
}

#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub profile: Profile,
    pub situation: Situation,
    /// Source transcript, stored as an excerpt when persisting.
    pub transcript: Option<String>,
    pub top_n: usize,
    pub anonymous_token: Option<String>,
    /// Persist the top recommendation for HR review. Off unless opted in.
    pub persist: bool,
    pub correlation_id: String,
}

impl RecommendationRequest {
    pub fn new(profile: Profile, situation: Situation) -> Self {
        Self {
            profile,
            situation,
            transcript: None,
            top_n: DEFAULT_TOP_N,
            anonymous_token: None,
            persist: false,
            correlation_id: "unassigned".to_owned(),
        }
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = Some(transcript.into());
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_anonymous_token(mut self, token: impl Into<String>) -> Self {
        self.anonymous_token = Some(token.into());
        self
    }

    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }
}

/// Runs fetch, rank, compose and persist for one request.
///
/// Catalog and storage failures never surface to the caller: a failed fetch
/// ranks an empty candidate set and a failed save is logged and dropped.
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn RecommendationStore>,
    calculator: ScoreCalculator,
    rng: Mutex<StdRng>,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<dyn CatalogSource>, store: Arc<dyn RecommendationStore>) -> Self {
        Self {
            catalog,
            store,
            calculator: ScoreCalculator::new(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Makes calming phrase selection reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_calculator(mut self, calculator: ScoreCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Classifies the transcript and recommends with default options.
    ///
    /// Supplying a token opts the top recommendation into persistence.
    pub async fn process_transcript(
        &self,
        transcript: &str,
        profile: Profile,
        anonymous_token: Option<String>,
    ) -> RecommendationResult {
        let situation = classify_situation(transcript);
        let mut request = RecommendationRequest::new(profile, situation)
            .with_transcript(transcript)
            .with_persistence(anonymous_token.is_some());
        request.anonymous_token = anonymous_token;
        self.get_recommendations(request).await
    }

    pub async fn get_recommendations(&self, request: RecommendationRequest) -> RecommendationResult {
        let RecommendationRequest {
            profile,
            situation,
            transcript,
            top_n,
            anonymous_token,
            persist,
            correlation_id,
        } = request;

        let candidates = self.candidates(situation.category, top_n, &correlation_id).await;
        let recommendations = self.calculator.rank(&candidates, &situation, &profile, top_n);

        let empathic_message = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            compose_message(&profile, &situation, recommendations.first(), &mut *rng)
        };

        info!(
            event_name = "core.recommendation.ranked",
            correlation_id = %correlation_id,
            situation = %situation.category,
            candidate_count = candidates.len(),
            recommendation_count = recommendations.len(),
            "ranked wellness recommendations"
        );

        if let (true, Some(token), Some(top)) =
            (persist, anonymous_token.as_deref(), recommendations.first())
        {
            self.persist(
                token,
                &situation,
                &profile,
                top,
                &empathic_message,
                transcript.as_deref().unwrap_or_default(),
                &correlation_id,
            )
            .await;
        }

        RecommendationResult {
            situation,
            recommendations,
            message_length: empathic_message.chars().count(),
            empathic_message,
            profile,
            timestamp: Utc::now(),
        }
    }

    async fn candidates(
        &self,
        category: SituationCategory,
        top_n: usize,
        correlation_id: &str,
    ) -> Vec<CatalogItem> {
        match self.fetch_candidates(category, top_n).await {
            Ok(items) => items,
            Err(error) => {
                warn!(
                    event_name = "core.recommendation.catalog_unavailable",
                    correlation_id = %correlation_id,
                    situation = %category,
                    error = %error,
                    "catalog fetch failed, ranking an empty candidate set"
                );
                Vec::new()
            }
        }
    }

    /// Situation-tagged items first, topped up from the full catalog when
    /// fewer than twice the requested count were found.
    async fn fetch_candidates(
        &self,
        category: SituationCategory,
        top_n: usize,
    ) -> Result<Vec<CatalogItem>, ApplicationError> {
        let mut items = self.catalog.items_by_situation_tag(category.as_tag()).await?;
        if items.len() < top_n.saturating_mul(2) {
            let mut seen: HashSet<String> =
                items.iter().map(|item| item.id.0.clone()).collect();
            for item in self.catalog.all_items().await? {
                if seen.insert(item.id.0.clone()) {
                    items.push(item);
                }
            }
        }
        Ok(items)
    }

    #[allow(clippy::too_many_arguments)]
    async fn persist(
        &self,
        token: &str,
        situation: &Situation,
        profile: &Profile,
        top: &ScoredItem,
        empathic_message: &str,
        transcript: &str,
        correlation_id: &str,
    ) {
        let record = NewWellnessRequest {
            anonymous_token: token.to_owned(),
            situation: situation.clone(),
            profile: profile.snapshot(),
            recommendation: top.clone(),
            empathic_message: empathic_message.to_owned(),
            transcript_excerpt: transcript_excerpt(transcript),
        };

        match self.store.create_recommendation_record(record).await {
            Ok(saved) => info!(
                event_name = "core.recommendation.persisted",
                correlation_id = %correlation_id,
                wellness_request_id = %saved.id.0,
                "stored recommendation for review"
            ),
            Err(error) => warn!(
                event_name = "core.recommendation.persist_failed",
                correlation_id = %correlation_id,
                error = %error,
                "failed to store recommendation, continuing without it"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tokio::sync::Mutex;

    use super::{CatalogSource, RecommendationEngine, RecommendationRequest, RecommendationStore};
    use crate::domain::catalog::CatalogItem;
    use crate::domain::profile::Profile;
    use crate::domain::recommendation::{NewWellnessRequest, WellnessRequest, WellnessRequestId};
    use crate::domain::situation::SituationCategory;
    use crate::errors::ApplicationError;
    use crate::recommend::classify_situation;

    #[derive(Default)]
    struct StaticCatalog {
        items: Vec<CatalogItem>,
        fail: bool,
        full_fetches: Mutex<u32>,
    }

    #[async_trait]
    impl CatalogSource for StaticCatalog {
        async fn items_by_situation_tag(
            &self,
            tag: &str,
        ) -> Result<Vec<CatalogItem>, ApplicationError> {
            if self.fail {
                return Err(ApplicationError::Integration("catalog offline".to_owned()));
            }
            Ok(self
                .items
                .iter()
                .filter(|item| item.situation_tags.iter().any(|t| t == tag))
                .cloned()
                .collect())
        }

        async fn all_items(&self) -> Result<Vec<CatalogItem>, ApplicationError> {
            *self.full_fetches.lock().await += 1;
            Ok(self.items.clone())
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<NewWellnessRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl RecommendationStore for RecordingStore {
        async fn create_recommendation_record(
            &self,
            request: NewWellnessRequest,
        ) -> Result<WellnessRequest, ApplicationError> {
            if self.fail {
                return Err(ApplicationError::Persistence("disk full".to_owned()));
            }
            self.saved.lock().await.push(request.clone());
            Ok(request.into_pending(WellnessRequestId("wr-1".to_owned()), Utc::now()))
        }
    }

    fn catalog_items() -> Vec<CatalogItem> {
        let mut meditation = CatalogItem::new("med", "Meditación guiada");
        meditation.situation_tags = vec!["muerte_familiar".to_owned()];
        meditation.profile_tags = vec!["tranquilo".to_owned()];
        meditation.starting_price = Some(Decimal::new(30_000, 0));

        let mut painting = CatalogItem::new("paint", "Taller de pintura");
        painting.subcategory = "Arte".to_owned();
        painting.profile_tags = vec!["arte".to_owned()];

        let mut party = CatalogItem::new("party", "Fiesta de integración");
        party.profile_tags = vec!["fiesta".to_owned()];

        vec![meditation, painting, party]
    }

    fn engine(catalog: StaticCatalog, store: Arc<RecordingStore>) -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(catalog), store).with_seed(11)
    }

    #[tokio::test]
    async fn grandparent_transcript_produces_ranked_bereavement_recommendations() {
        let store = Arc::new(RecordingStore::default());
        let engine = engine(StaticCatalog { items: catalog_items(), ..Default::default() }, store.clone());

        let result = engine
            .process_transcript(
                "Mi abuelo murió la semana pasada. Estoy muy triste.",
                Profile::new("u-1", "Laura"),
                Some("anon_1".to_owned()),
            )
            .await;

        assert_eq!(result.situation.category, SituationCategory::Bereavement);
        assert_eq!(result.situation.subtype.as_deref(), Some("abuelos"));
        let ids: Vec<&str> = result.recommendations.iter().map(|r| r.item.id.as_str()).collect();
        assert_eq!(ids, vec!["med", "paint"]);
        assert_eq!(result.recommendations[0].score, 75);
        assert!(result.empathic_message.starts_with("Laura, "));
        assert_eq!(result.message_length, result.empathic_message.chars().count());
        assert!(result.message_length <= 500);

        let saved = store.saved.lock().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].anonymous_token, "anon_1");
        assert_eq!(saved[0].recommendation.item.id.as_str(), "med");
        assert_eq!(saved[0].transcript_excerpt, "Mi abuelo murió la semana pasada. Estoy muy triste.");
    }

    #[tokio::test]
    async fn catalog_failure_yields_empty_list_and_holding_message() {
        let store = Arc::new(RecordingStore::default());
        let engine =
            engine(StaticCatalog { items: catalog_items(), fail: true, ..Default::default() }, store.clone());

        let result = engine
            .process_transcript("terminamos", Profile::new("u-2", "Pablo"), Some("anon_2".to_owned()))
            .await;

        assert!(result.recommendations.is_empty());
        assert!(result.empathic_message.contains("estamos buscando las mejores opciones"));
        assert!(store.saved.lock().await.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_does_not_fail_the_request() {
        let store = Arc::new(RecordingStore { fail: true, ..Default::default() });
        let engine = engine(StaticCatalog { items: catalog_items(), ..Default::default() }, store);

        let result = engine
            .process_transcript("murió mi abuela", Profile::new("u-3", "Inés"), Some("anon_3".to_owned()))
            .await;

        assert!(!result.recommendations.is_empty());
    }

    #[tokio::test]
    async fn requests_do_not_persist_unless_opted_in() {
        let store = Arc::new(RecordingStore::default());
        let engine = engine(StaticCatalog { items: catalog_items(), ..Default::default() }, store.clone());
        let request = RecommendationRequest::new(
            Profile::new("u-7", "Elena"),
            classify_situation("murió mi abuela"),
        )
        .with_anonymous_token("anon_7");
        assert!(!request.persist);

        engine.get_recommendations(request.clone()).await;
        assert!(store.saved.lock().await.is_empty());

        engine.get_recommendations(request.with_persistence(true)).await;
        let saved = store.saved.lock().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].anonymous_token, "anon_7");
    }

    #[tokio::test]
    async fn nothing_is_persisted_without_token_or_when_disabled() {
        let store = Arc::new(RecordingStore::default());
        let engine = engine(StaticCatalog { items: catalog_items(), ..Default::default() }, store.clone());
        let situation = classify_situation("murió mi abuela");

        engine
            .get_recommendations(
                RecommendationRequest::new(Profile::new("u-4", "Rosa"), situation.clone())
                    .with_persistence(true),
            )
            .await;
        engine
            .get_recommendations(
                RecommendationRequest::new(Profile::new("u-4", "Rosa"), situation)
                    .with_anonymous_token("anon_4")
                    .with_persistence(false),
            )
            .await;

        assert!(store.saved.lock().await.is_empty());
    }

    #[tokio::test]
    async fn full_catalog_is_merged_without_duplicates_when_tagged_set_is_small() {
        let catalog = StaticCatalog { items: catalog_items(), ..Default::default() };
        let store = Arc::new(RecordingStore::default());
        let catalog = Arc::new(catalog);
        let engine = RecommendationEngine::new(catalog.clone(), store).with_seed(5);

        let result = engine
            .get_recommendations(
                RecommendationRequest::new(
                    Profile::new("u-5", "Tomás"),
                    classify_situation("murió mi abuela"),
                )
                .with_top_n(10),
            )
            .await;

        assert_eq!(*catalog.full_fetches.lock().await, 1);
        let ids: Vec<&str> = result.recommendations.iter().map(|r| r.item.id.as_str()).collect();
        assert_eq!(ids, vec!["med", "paint"]);
    }

    #[tokio::test]
    async fn large_tagged_set_skips_full_catalog_fetch() {
        let items: Vec<CatalogItem> = (0..4)
            .map(|index| {
                let mut item = CatalogItem::new(format!("t-{index}"), "Círculo de apoyo");
                item.situation_tags = vec!["rompimiento_pareja".to_owned()];
                item
            })
            .collect();
        let catalog = Arc::new(StaticCatalog { items, ..Default::default() });
        let engine =
            RecommendationEngine::new(catalog.clone(), Arc::new(RecordingStore::default()));

        let result = engine
            .get_recommendations(
                RecommendationRequest::new(Profile::new("u-6", "Vale"), classify_situation("terminamos"))
                    .with_top_n(2),
            )
            .await;

        assert_eq!(*catalog.full_fetches.lock().await, 0);
        assert_eq!(result.recommendations.len(), 2);
    }
}
