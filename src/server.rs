//! HTTP surface for the presentation layer.
//! Every route is a thin wrapper over the engine; nothing here owns state.

use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::config::Config;
use crate::dictionary::StatusDictionary;
use crate::engine::InsightEngine;
use crate::forecast;
use crate::insights::InsightCache;
use crate::locale::Locale;
use crate::milestones;
use crate::models::{Activities, ApiResponse, ApplicationSummary, DetailsResponse, HistoryEvent};
use crate::processing_time::ProcessingTimeService;
use crate::store::{
    KeyValueStore, MemoryStore, SqliteStore, INSIGHTS_NAMESPACE, PROCESSING_TIMES_NAMESPACE,
    STATUS_WATCH_NAMESPACE,
};
use crate::watch::StatusWatch;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InsightEngine>,
    pub watch: Arc<StatusWatch>,
    pub default_locale: Locale,
}

impl AppState {
    /// Wire the engine and caches from configuration
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        let ttl = config.processing_time_ttl()?;
        let (insight_store, time_store, watch_store): (
            Arc<dyn KeyValueStore>,
            Arc<dyn KeyValueStore>,
            Arc<dyn KeyValueStore>,
        ) = match &config.storage.db_path {
            Some(path) => {
                let base = SqliteStore::open(path, INSIGHTS_NAMESPACE)?;
                let times = base.namespace(PROCESSING_TIMES_NAMESPACE);
                let watch = base.namespace(STATUS_WATCH_NAMESPACE);
                (Arc::new(base), Arc::new(times), Arc::new(watch))
            }
            None => (
                Arc::new(MemoryStore::new()),
                Arc::new(MemoryStore::new()),
                Arc::new(MemoryStore::new()),
            ),
        };

        let engine = InsightEngine::new(
            Arc::new(StatusDictionary::new()),
            Arc::new(InsightCache::new(insight_store)),
            Arc::new(ProcessingTimeService::new(time_store, ttl)),
        );

        Ok(Self {
            engine: Arc::new(engine),
            watch: Arc::new(StatusWatch::new(watch_store)),
            default_locale: config.insights.default_locale,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub details: DetailsResponse,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MilestoneRequest {
    pub activities: Option<Activities>,
    pub history: Option<Vec<HistoryEvent>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub received_date: Option<String>,
    pub months: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessingTimeQuery {
    pub lob: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProcessingTime {
    pub lob: Option<String>,
    pub months: u32,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/applications/view", post(application_view))
        .route("/milestones", post(parse_milestones))
        .route("/dictionary", get(list_definitions))
        .route("/dictionary/:code", get(explain_code))
        .route("/processing-time", get(processing_time))
        .route("/forecast", post(calculate_forecast))
        .route("/watch", post(observe_applications))
        .route("/insights", delete(clear_insights))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn root() -> &'static str {
    "Tracker Insights API v0.1.0"
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Assemble the full details view
async fn application_view(
    state: axum::extract::State<AppState>,
    Json(request): Json<ViewRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let locale = request
        .locale
        .as_deref()
        .map(Locale::from_tag)
        .unwrap_or(state.default_locale);

    let view = state.engine.assemble(&request.details, locale).await;
    let data = serde_json::to_value(&view).map_err(|e| {
        error!(error = %e, "failed to serialize application view");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ApiResponse::success("Application view assembled", data)))
}

async fn parse_milestones(Json(request): Json<MilestoneRequest>) -> Json<serde_json::Value> {
    let parsed = milestones::parse(request.activities.as_ref(), request.history.as_deref());
    Json(serde_json::json!({ "milestones": parsed }))
}

async fn list_definitions(state: axum::extract::State<AppState>) -> Json<ApiResponse> {
    let definitions: serde_json::Map<String, serde_json::Value> = state
        .engine
        .dictionary()
        .entries()
        .into_iter()
        .map(|(code, explanation)| (code.to_string(), explanation.into()))
        .collect();

    Json(ApiResponse::success(
        format!("{} definitions", definitions.len()),
        serde_json::Value::Object(definitions),
    ))
}

async fn explain_code(
    state: axum::extract::State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    match state.engine.dictionary().lookup(&code) {
        Some(explanation) => Ok(Json(ApiResponse::success(
            format!("Explanation for {}", code),
            serde_json::json!({ "code": code, "explanation": explanation }),
        ))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("No explanation for {}", code))),
        )),
    }
}

async fn processing_time(
    state: axum::extract::State<AppState>,
    Query(query): Query<ProcessingTimeQuery>,
) -> Json<ProcessingTime> {
    let months = state.engine.processing().estimate(query.lob.as_deref()).await;
    Json(ProcessingTime {
        lob: query.lob,
        months,
    })
}

async fn calculate_forecast(Json(request): Json<ForecastRequest>) -> Json<serde_json::Value> {
    // zero, negative and out-of-range month counts mean "no estimate"
    let months = request.months.and_then(|m| u32::try_from(m).ok());
    let result = forecast::calculate_forecast(request.received_date.as_deref(), months);
    Json(serde_json::json!({ "forecast": result }))
}

async fn observe_applications(
    state: axum::extract::State<AppState>,
    Json(apps): Json<Vec<ApplicationSummary>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.watch.observe(&apps) {
        Ok(outcome) => Ok(Json(ApiResponse::success(
            "Applications observed",
            serde_json::json!({ "outcome": outcome }),
        ))),
        Err(e) => {
            error!(error = %e, kind = e.label(), "status watch failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn clear_insights(state: axum::extract::State<AppState>) -> Json<ApiResponse> {
    state.engine.insights().clear();
    Json(ApiResponse::success("Insight cache cleared", serde_json::Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut config = Config::default();
        config.storage.db_path = None;
        router(AppState::from_config(&config).unwrap())
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_dictionary_route() {
        let response = app()
            .oneshot(Request::builder().uri("/dictionary/aor").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["data"]["explanation"],
            "Acknowledgement of Receipt. Official start of processing."
        );

        let missing = app()
            .oneshot(Request::builder().uri("/dictionary/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dictionary_listing_route() {
        let response = app()
            .oneshot(Request::builder().uri("/dictionary").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let definitions = body["data"].as_object().unwrap();
        assert_eq!(definitions.len(), StatusDictionary::new().len());
        assert_eq!(definitions["PPR"], StatusDictionary::new().lookup("PPR").unwrap());
    }

    #[tokio::test]
    async fn test_processing_time_route() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/processing-time?lob=Parents%20and%20Grandparents")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(json_body(response).await["months"], 24);
    }

    #[tokio::test]
    async fn test_view_route_french() {
        let body = serde_json::json!({
            "locale": "fr-CA",
            "details": {
                "app": {"appNumber": "E1", "status": "InProgress", "lob": "CEC"},
                "relations": [{"history": [{"key": "AOR", "dateCreated": "2024-02-01"}]}]
            }
        });
        let response = app().oneshot(post_json("/applications/view", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        let data = &json["data"];
        assert_eq!(data["estimatedMonths"], 5);
        assert_eq!(data["timeline"][0]["title"], "Accusé de Réception");
        assert!(data["forecast"].is_null());
    }

    #[tokio::test]
    async fn test_milestones_route() {
        let body = serde_json::json!({
            "history": [{"key": "MEDICAL_PASSED", "dateCreated": "2024-02-01"}]
        });
        let response = app().oneshot(post_json("/milestones", body)).await.unwrap();
        let json = json_body(response).await;
        assert_eq!(json["milestones"]["medical"], "PASSED");
        assert_eq!(json["milestones"]["biometrics"], "UNKNOWN");
    }

    #[tokio::test]
    async fn test_forecast_route_rejects_zero_months() {
        let body = serde_json::json!({ "receivedDate": "2024-01-15", "months": 0 });
        let response = app().oneshot(post_json("/forecast", body)).await.unwrap();
        assert!(json_body(response).await["forecast"].is_null());
    }

    #[tokio::test]
    async fn test_forecast_route_negative_months_is_absent() {
        let body = serde_json::json!({ "receivedDate": "2024-01-15", "months": -3 });
        let response = app().oneshot(post_json("/forecast", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await["forecast"].is_null());
    }

    #[tokio::test]
    async fn test_forecast_route_positive_months() {
        let body = serde_json::json!({ "receivedDate": "2024-01-15", "months": 6 });
        let response = app().oneshot(post_json("/forecast", body)).await.unwrap();
        let json = json_body(response).await;
        assert_eq!(json["forecast"]["estimatedDate"], "Jul 15, 2024");
    }

    #[tokio::test]
    async fn test_watch_route() {
        let router = app();
        let body = serde_json::json!([{
            "appNum": "E1", "status": "InProgress", "appType": "PR",
            "lastUpdated": "2024-02-01", "paFirstName": "A", "paLastName": "B"
        }]);

        let first = router.clone().oneshot(post_json("/watch", body.clone())).await.unwrap();
        assert_eq!(json_body(first).await["data"]["outcome"], "first_seen");

        let second = router.oneshot(post_json("/watch", body)).await.unwrap();
        assert_eq!(json_body(second).await["data"]["outcome"], "unchanged");
    }
}
