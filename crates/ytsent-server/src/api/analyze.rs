use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use ytsent_sentiment::{AnalysisResult, SentimentError};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeQuery {
    pub youtube_link: Option<String>,
}

/// Maps a pipeline failure onto the response the caller sees. Upstream
/// detail stays in the logs.
fn map_analysis_error(request_id: &str, error: &SentimentError) -> ApiError {
    match error {
        SentimentError::InvalidLink(_) => ApiError::new(
            StatusCode::BAD_REQUEST,
            "could not extract a video id from youtube_link",
        ),
        SentimentError::Source(e) if e.is_quota() => {
            tracing::warn!(request_id, error = %e, "comment API quota exhausted");
            ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "comment service temporarily unavailable",
            )
        }
        SentimentError::Source(e) => {
            tracing::warn!(request_id, error = %e, "comment fetch failed");
            ApiError::new(
                StatusCode::BAD_GATEWAY,
                "failed to fetch comments from upstream",
            )
        }
        SentimentError::DeadlineExceeded { .. } => {
            ApiError::new(StatusCode::GATEWAY_TIMEOUT, "comment analysis timed out")
        }
        SentimentError::ArtifactIo { .. }
        | SentimentError::ArtifactFormat { .. }
        | SentimentError::InvalidArtifact(_)
        | SentimentError::DimensionMismatch { .. }
        | SentimentError::Model(_)
        | SentimentError::Task(_) => {
            tracing::error!(request_id, error = %error, "sentiment analysis failed");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "sentiment analysis failed")
        }
    }
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let link = query
        .youtube_link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "youtube_link is required"))?;

    tracing::info!(request_id = %req_id.0, link, "analyze request");
    state
        .analyzer
        .analyze_link(link)
        .await
        .map(Json)
        .map_err(|e| map_analysis_error(&req_id.0, &e))
}
