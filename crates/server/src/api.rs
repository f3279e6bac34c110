//! JSON API for recommendations, transcript screening and HR review.
//!
//! - `POST /api/recommendations`                   classify a transcript and rank activities
//! - `POST /api/analyze-transcript`                distress screening, plus a recommendation
//!                                                 when the distress is above mild
//! - `GET  /api/wellness/requests?status=`         persisted requests, newest first
//! - `POST /api/wellness/requests/{id}/approve`    HR approval of a pending request
//! - `POST /api/wellness/requests/{id}/reject`     HR rejection of a pending request

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use behuman_core::distress::{analyze_distress, AlertPriority, DistressAnalysis, Severity};
use behuman_core::errors::{ApplicationError, InterfaceError};
use behuman_core::recommend::{classify_situation, DEFAULT_TOP_N};
use behuman_core::{
    Profile, RecommendationEngine, RecommendationRequest, RecommendationResult, WellnessRequest,
    WellnessRequestId, WellnessRequestStatus,
};
use behuman_db::repositories::WellnessRequestRepository;

#[derive(Clone)]
pub struct ApiState {
    engine: Arc<RecommendationEngine>,
    requests: Arc<dyn WellnessRequestRepository>,
    top_n: usize,
    persist: bool,
}

impl ApiState {
    pub fn new(
        engine: Arc<RecommendationEngine>,
        requests: Arc<dyn WellnessRequestRepository>,
    ) -> Self {
        Self { engine, requests, top_n: DEFAULT_TOP_N, persist: true }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/recommendations", post(create_recommendations))
        .route("/api/analyze-transcript", post(analyze_transcript))
        .route("/api/wellness/requests", get(list_requests))
        .route("/api/wellness/requests/{id}/approve", post(approve_request))
        .route("/api/wellness/requests/{id}/reject", post(reject_request))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, data, timestamp: Utc::now().to_rfc3339() })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub success: bool,
    pub error: String,
    pub correlation_id: String,
    pub timestamp: String,
}

#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    fn bad_request(message: impl Into<String>, correlation_id: &str) -> Self {
        Self(InterfaceError::BadRequest {
            message: message.into(),
            correlation_id: correlation_id.to_string(),
        })
    }

    fn from_application(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self.0 {
            InterfaceError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
            InterfaceError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.clone()),
            InterfaceError::Conflict { message, .. } => (StatusCode::CONFLICT, message.clone()),
            InterfaceError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, self.0.user_message().to_string())
            }
            InterfaceError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.0.user_message().to_string())
            }
        };

        if status.is_server_error() {
            warn!(
                event_name = "server.api.request_failed",
                correlation_id = %self.0.correlation_id(),
                status = status.as_u16(),
                error = %self.0,
                "api request failed"
            );
        }

        let body = ApiErrorBody {
            success: false,
            error,
            correlation_id: self.0.correlation_id().to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

fn correlation_id() -> String {
    format!("req-{}", Uuid::new_v4())
}

fn anonymous_token(requested: Option<String>) -> String {
    requested
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .unwrap_or_else(|| format!("anon_{}", Uuid::new_v4()))
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBody {
    pub transcript: Option<String>,
    pub profile: Option<Profile>,
    pub anonymous_token: Option<String>,
}

async fn create_recommendations(
    State(state): State<ApiState>,
    body: Result<Json<RecommendationBody>, JsonRejection>,
) -> Result<Json<ApiResponse<RecommendationResult>>, ApiError> {
    let correlation_id = correlation_id();
    let Json(body) =
        body.map_err(|rejection| ApiError::bad_request(rejection.body_text(), &correlation_id))?;

    let transcript = body.transcript.filter(|transcript| !transcript.trim().is_empty());
    let (Some(transcript), Some(profile)) = (transcript, body.profile) else {
        return Err(ApiError::bad_request(
            "Missing required fields: transcript, profile",
            &correlation_id,
        ));
    };

    let result = recommend(&state, &transcript, profile, body.anonymous_token, &correlation_id)
        .await;

    info!(
        event_name = "server.recommendations.served",
        correlation_id = %correlation_id,
        situation = %result.situation.category,
        recommendation_count = result.recommendations.len(),
        "recommendations served"
    );

    Ok(ApiResponse::ok(result))
}

async fn recommend(
    state: &ApiState,
    transcript: &str,
    profile: Profile,
    token: Option<String>,
    correlation_id: &str,
) -> RecommendationResult {
    let situation = classify_situation(transcript);
    let request = RecommendationRequest::new(profile, situation)
        .with_transcript(transcript)
        .with_top_n(state.top_n)
        .with_anonymous_token(anonymous_token(token))
        .with_persistence(state.persist)
        .with_correlation_id(correlation_id);
    state.engine.get_recommendations(request).await
}

// ---------------------------------------------------------------------------
// Transcript analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptAnalysis {
    pub analysis: DistressAnalysis,
    pub alert_priority: AlertPriority,
    pub should_alert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<RecommendationResult>,
}

async fn analyze_transcript(
    State(state): State<ApiState>,
    body: Result<Json<RecommendationBody>, JsonRejection>,
) -> Result<Json<ApiResponse<TranscriptAnalysis>>, ApiError> {
    let correlation_id = correlation_id();
    let Json(body) =
        body.map_err(|rejection| ApiError::bad_request(rejection.body_text(), &correlation_id))?;

    let Some(transcript) = body.transcript.filter(|transcript| !transcript.trim().is_empty())
    else {
        return Err(ApiError::bad_request("Missing required field: transcript", &correlation_id));
    };

    let analysis = analyze_distress(&transcript);
    let should_alert = analysis.warrants_alert();

    let recommendation = match body.profile {
        Some(profile) if analysis.severity > Severity::Mild => Some(
            recommend(&state, &transcript, profile, body.anonymous_token, &correlation_id).await,
        ),
        _ => None,
    };

    if should_alert {
        warn!(
            event_name = "server.analysis.alert",
            correlation_id = %correlation_id,
            severity = ?analysis.severity,
            priority = ?analysis.alert_priority(),
            "distress alert raised for HR review"
        );
    }

    Ok(ApiResponse::ok(TranscriptAnalysis {
        alert_priority: analysis.alert_priority(),
        should_alert,
        reviewer_note: should_alert.then(|| analysis.reviewer_note()),
        analysis,
        recommendation,
    }))
}

// ---------------------------------------------------------------------------
// HR review
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub reviewer_id: Option<String>,
    pub reason: Option<String>,
}

async fn list_requests(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<WellnessRequest>>>, ApiError> {
    let correlation_id = correlation_id();
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<WellnessRequestStatus>()
                .map_err(|_| ApiError::bad_request(format!("unknown status `{raw}`"), &correlation_id))?,
        ),
    };

    let requests = state
        .requests
        .list(status)
        .await
        .map_err(|error| ApiError::from_application(error.into(), &correlation_id))?;

    Ok(ApiResponse::ok(requests))
}

fn reviewer(body: &ReviewBody, correlation_id: &str) -> Result<String, ApiError> {
    body.reviewer_id
        .as_deref()
        .map(str::trim)
        .filter(|reviewer| !reviewer.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("Missing required field: reviewerId", correlation_id))
}

async fn approve_request(
    Path(id): Path<String>,
    State(state): State<ApiState>,
    body: Result<Json<ReviewBody>, JsonRejection>,
) -> Result<Json<ApiResponse<WellnessRequest>>, ApiError> {
    let correlation_id = correlation_id();
    let Json(body) =
        body.map_err(|rejection| ApiError::bad_request(rejection.body_text(), &correlation_id))?;
    let reviewer = reviewer(&body, &correlation_id)?;

    let approved = state
        .requests
        .approve(&WellnessRequestId(id), &reviewer)
        .await
        .map_err(|error| ApiError::from_application(error.into(), &correlation_id))?;

    info!(
        event_name = "server.wellness_request.approved",
        correlation_id = %correlation_id,
        wellness_request_id = %approved.id.0,
        reviewer_id = %reviewer,
        "wellness request approved"
    );

    Ok(ApiResponse::ok(approved))
}

async fn reject_request(
    Path(id): Path<String>,
    State(state): State<ApiState>,
    body: Result<Json<ReviewBody>, JsonRejection>,
) -> Result<Json<ApiResponse<WellnessRequest>>, ApiError> {
    let correlation_id = correlation_id();
    let Json(body) =
        body.map_err(|rejection| ApiError::bad_request(rejection.body_text(), &correlation_id))?;
    let reviewer = reviewer(&body, &correlation_id)?;
    let reason = body.reason.filter(|reason| !reason.trim().is_empty());

    let rejected = state
        .requests
        .reject(&WellnessRequestId(id), &reviewer, reason)
        .await
        .map_err(|error| ApiError::from_application(error.into(), &correlation_id))?;

    info!(
        event_name = "server.wellness_request.rejected",
        correlation_id = %correlation_id,
        wellness_request_id = %rejected.id.0,
        reviewer_id = %reviewer,
        "wellness request rejected"
    );

    Ok(ApiResponse::ok(rejected))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use behuman_core::{CatalogItem, RecommendationEngine, WellnessRequestStatus};
    use behuman_db::repositories::{
        InMemoryCatalogRepository, InMemoryWellnessRequestRepository, WellnessRequestRepository,
    };

    use super::{router, ApiState};

    fn catalog() -> Vec<CatalogItem> {
        let mut duelo = CatalogItem::new("act-duelo", "Taller de duelo");
        duelo.description = "Acompañamiento para procesar la pérdida".to_string();
        duelo.starting_price = Some(Decimal::new(60_000, 0));
        duelo.situation_tags = vec!["muerte_familiar".to_string()];
        duelo.profile_tags = vec!["adulto".to_string(), "salud".to_string()];

        let mut finanzas = CatalogItem::new("act-finanzas", "Curso de finanzas");
        finanzas.situation_tags = vec!["causa_economica".to_string()];
        finanzas.profile_tags = vec!["adulto".to_string()];

        vec![duelo, finanzas]
    }

    fn app() -> (Router, Arc<InMemoryWellnessRequestRepository>) {
        let store = Arc::new(InMemoryWellnessRequestRepository::default());
        let engine = RecommendationEngine::new(
            Arc::new(InMemoryCatalogRepository::with_items(catalog())),
            store.clone(),
        )
        .with_seed(3);
        (router(ApiState::new(Arc::new(engine), store.clone())), store)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).expect("request")).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, payload)
    }

    fn profile() -> Value {
        json!({ "userId": "emp-1", "name": "Ana", "age": 34, "hobbies": ["musica"], "goals": ["salud"] })
    }

    #[tokio::test]
    async fn recommendations_return_ranked_result_and_persist_request() {
        let (app, store) = app();

        let (status, payload) = send(
            app,
            "POST",
            "/api/recommendations",
            Some(json!({
                "transcript": "Mi abuelo murió la semana pasada. Estoy muy triste.",
                "profile": profile(),
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["success"], json!(true));
        assert_eq!(payload["data"]["situation"]["type"], json!("muerte_familiar"));
        assert_eq!(payload["data"]["situation"]["subtype"], json!("abuelos"));
        assert_eq!(payload["data"]["recommendations"][0]["id"], json!("act-duelo"));
        assert!(payload["data"]["recommendations"][0]["recommendationScore"].as_i64() >= Some(40));
        assert!(payload["data"]["empathicMessage"].as_str().is_some_and(|m| m.contains("Ana")));

        let stored = store.list(None).await.expect("list");
        assert_eq!(stored.len(), 1);
        assert!(stored[0].anonymous_token.starts_with("anon_"));
    }

    #[tokio::test]
    async fn missing_profile_is_a_bad_request_envelope() {
        let (app, _) = app();

        let (status, payload) = send(
            app,
            "POST",
            "/api/recommendations",
            Some(json!({ "transcript": "Estoy triste" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["success"], json!(false));
        assert!(payload["error"].as_str().is_some_and(|e| e.contains("profile")));
        assert!(payload["correlationId"].as_str().is_some_and(|id| id.starts_with("req-")));
    }

    #[tokio::test]
    async fn blank_transcript_is_a_bad_request() {
        let (app, _) = app();
        let (status, _) = send(
            app,
            "POST",
            "/api/recommendations",
            Some(json!({ "transcript": "   ", "profile": profile() })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn severe_transcript_analysis_alerts_and_recommends() {
        let (app, store) = app();

        let (status, payload) = send(
            app,
            "POST",
            "/api/analyze-transcript",
            Some(json!({
                "transcript": "Mi madre falleció, estoy desesperado y devastado",
                "profile": profile(),
                "anonymousToken": "anon_fixed",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["data"]["analysis"]["severity"], json!("severe"));
        assert_eq!(payload["data"]["alertPriority"], json!("high"));
        assert_eq!(payload["data"]["shouldAlert"], json!(true));
        assert!(payload["data"]["reviewerNote"].is_string());
        assert!(payload["data"]["recommendation"].is_object());

        let stored = store.list(None).await.expect("list");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].anonymous_token, "anon_fixed");
    }

    #[tokio::test]
    async fn calm_transcript_analysis_skips_recommendation() {
        let (app, store) = app();

        let (status, payload) = send(
            app,
            "POST",
            "/api/analyze-transcript",
            Some(json!({ "transcript": "Hoy fue un buen día en la oficina", "profile": profile() })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["data"]["analysis"]["severity"], json!("mild"));
        assert!(payload["data"].get("recommendation").is_none());
        assert!(store.list(None).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn review_lifecycle_maps_to_http_statuses() {
        let (app, store) = app();
        send(
            app.clone(),
            "POST",
            "/api/recommendations",
            Some(json!({
                "transcript": "Mi abuela falleció",
                "profile": profile(),
                "anonymousToken": "anon_review",
            })),
        )
        .await;
        let id = store.list(None).await.expect("list")[0].id.0.clone();

        let (status, payload) =
            send(app.clone(), "GET", "/api/wellness/requests?status=pending", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["data"].as_array().map(Vec::len), Some(1));

        let (status, payload) = send(
            app.clone(),
            "POST",
            &format!("/api/wellness/requests/{id}/approve"),
            Some(json!({ "reviewerId": "hr-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["data"]["status"], json!("approved"));

        let (status, _) = send(
            app.clone(),
            "POST",
            &format!("/api/wellness/requests/{id}/reject"),
            Some(json!({ "reviewerId": "hr-2", "reason": "duplicado" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            app.clone(),
            "POST",
            "/api/wellness/requests/missing/approve",
            Some(json!({ "reviewerId": "hr-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            app.clone(),
            "POST",
            &format!("/api/wellness/requests/{id}/approve"),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(app.clone(), "GET", "/api/wellness/requests?status=archived", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let approved = store.list(Some(WellnessRequestStatus::Approved)).await.expect("list");
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].reviewed_by.as_deref(), Some("hr-1"));
    }
}
