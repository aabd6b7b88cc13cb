mod analyze;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use ytsent_sentiment::{Analyzer, ModelInfo};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub model_info: ModelInfo,
}

/// Error response: the status code plus a `{"error": message}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    vocabulary_size: usize,
    trees: usize,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn analyze_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/analyze", get(analyze::analyze))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(analyze_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthData {
        status: "ok",
        vocabulary_size: state.model_info.vocabulary_size,
        trees: state.model_info.trees,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use ytsent_core::{Comment, VideoId};
    use ytsent_sentiment::{CommentSource, Prediction, SentimentError, SentimentModel};
    use ytsent_youtube::YoutubeError;

    use super::*;

    enum Behaviour {
        Comments(Vec<Comment>),
        Fail(fn() -> YoutubeError),
        Hang,
    }

    struct FakeSource {
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CommentSource for FakeSource {
        async fn fetch_comments(
            &self,
            _video_id: &VideoId,
            _max_comments: Option<usize>,
        ) -> Result<Vec<Comment>, SentimentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Comments(c) => Ok(c.clone()),
                Behaviour::Fail(make) => Err(make().into()),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    /// Positive (0.95) for texts containing "great", negative (0.9) otherwise.
    struct FakeModel {
        fail: bool,
    }

    impl SentimentModel for FakeModel {
        fn predict(&self, texts: &[String]) -> Result<Vec<Prediction>, SentimentError> {
            if self.fail {
                return Err(SentimentError::Model("boom".to_owned()));
            }
            Ok(texts
                .iter()
                .map(|t| {
                    let p = if t.contains("great") { 0.95 } else { 0.1 };
                    Prediction::from_positive_probability(p)
                })
                .collect())
        }
    }

    const WATCH: &str = "/analyze?youtube_link=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3DdQw4w9WgXcQ";

    fn app_with(
        behaviour: Behaviour,
        fail_model: bool,
        rate_limit: usize,
    ) -> (Router, Arc<FakeSource>) {
        let source = Arc::new(FakeSource {
            behaviour,
            calls: AtomicUsize::new(0),
        });
        let analyzer = Analyzer::new(source.clone(), Arc::new(FakeModel { fail: fail_model }))
            .with_deadline(Duration::from_millis(500));
        let state = AppState {
            analyzer: Arc::new(analyzer),
            model_info: ModelInfo {
                vocabulary_size: 5000,
                trees: 100,
                features: 5000,
            },
        };
        (
            build_app(state, RateLimitState::per_minute(rate_limit)),
            source,
        )
    }

    fn app(behaviour: Behaviour) -> Router {
        app_with(behaviour, false, 60).0
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    fn sample() -> Vec<Comment> {
        vec![
            Comment::top_level("ann", "What a <b>great</b> song"),
            Comment::top_level("bob", "meh"),
            Comment::top_level("cy", "great great"),
            Comment::top_level("dee", "not for me"),
        ]
    }

    #[tokio::test]
    async fn health_reports_artifact_shape() {
        let app = app(Behaviour::Comments(Vec::new()));
        let (status, json) = get_json(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({ "status": "ok", "vocabulary_size": 5000, "trees": 100 })
        );
    }

    #[tokio::test]
    async fn analyze_returns_summary() {
        let (status, json) = get_json(app(Behaviour::Comments(sample())), WATCH).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_comments"], 4);
        assert_eq!(json["positive_comments"], 2);
        assert_eq!(json["negative_comments"], 2);
        assert_eq!(json["sentiment_percentages"]["positive"], 50.0);
        assert_eq!(json["sentiment_percentages"]["negative"], 50.0);
        let top = json["top_5_positive_comments"].as_array().expect("array");
        assert_eq!(top.len(), 2);
        assert_eq!(top[0]["author"], "ann");
        assert_eq!(top[0]["text"], "What a <b>great</b> song");
        assert_eq!(json["top_5_negative_comments"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn zero_comments_yield_zero_percentages() {
        let (status, json) = get_json(app(Behaviour::Comments(Vec::new())), WATCH).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_comments"], 0);
        assert_eq!(json["sentiment_percentages"]["positive"], 0.0);
        assert_eq!(json["sentiment_percentages"]["negative"], 0.0);
    }

    #[tokio::test]
    async fn missing_link_is_bad_request() {
        let (app, source) = app_with(Behaviour::Comments(sample()), false, 60);
        let (status, json) = get_json(app, "/analyze").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            serde_json::json!({ "error": "youtube_link is required" })
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_link_is_bad_request() {
        let app = app(Behaviour::Comments(sample()));
        let (status, json) = get_json(app, "/analyze?youtube_link=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "youtube_link is required");
    }

    #[tokio::test]
    async fn unparseable_link_is_bad_request() {
        let (app, source) = app_with(Behaviour::Comments(sample()), false, 60);
        let (status, json) = get_json(app, "/analyze?youtube_link=hello").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "could not extract a video id from youtube_link");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upstream_quota_is_service_unavailable() {
        let behaviour =
            Behaviour::Fail(|| YoutubeError::QuotaExceeded("quotaExceeded".to_owned()));
        let (status, json) = get_json(app(behaviour), WATCH).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "comment service temporarily unavailable");
    }

    #[tokio::test]
    async fn other_upstream_failures_are_bad_gateway() {
        let behaviour =
            Behaviour::Fail(|| YoutubeError::VideoNotFound("dQw4w9WgXcQ".to_owned()));
        let (status, json) = get_json(app(behaviour), WATCH).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            json,
            serde_json::json!({ "error": "failed to fetch comments from upstream" })
        );
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let (status, json) = get_json(app(Behaviour::Hang), WATCH).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["error"], "comment analysis timed out");
    }

    #[tokio::test]
    async fn model_failure_is_internal_error() {
        let (app, _) = app_with(Behaviour::Comments(sample()), true, 60);
        let (status, json) = get_json(app, WATCH).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "sentiment analysis failed");
    }

    #[tokio::test]
    async fn analyze_is_rate_limited_but_health_is_not() {
        let (app, _) = app_with(Behaviour::Comments(Vec::new()), false, 1);
        let (first, _) = get_json(app.clone(), WATCH).await;
        assert_eq!(first, StatusCode::OK);
        let (second, json) = get_json(app.clone(), WATCH).await;
        assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"], "rate limit exceeded");
        let (health, _) = get_json(app, "/api/v1/health").await;
        assert_eq!(health, StatusCode::OK);
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let response = app(Behaviour::Comments(Vec::new()))
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
            Some("req-123")
        );
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let response = app(Behaviour::Comments(Vec::new()))
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }
}
