use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::Recommendation;
use crate::services::{ensure_public_host, fetch_image};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Current recommendation snapshot, in display order
pub async fn get_recommendations(State(state): State<AppState>) -> Json<RecommendationsResponse> {
    let inner = state.inner.read().await;
    Json(RecommendationsResponse {
        recommendations: inner.recommendations.clone(),
        updated_at: inner.updated_at,
    })
}

/// Image bytes for the recommendation at `index`
pub async fn get_recommendation_image(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> AppResult<Response> {
    let image_url = {
        let inner = state.inner.read().await;
        inner
            .recommendations
            .get(index)
            .map(|rec| rec.image_url.clone())
            .ok_or_else(|| AppError::NotFound(format!("No recommendation at index {}", index)))?
    };

    if !state.allow_private_image_hosts {
        ensure_public_host(&image_url).map_err(|e| {
            tracing::warn!(error = %e, index = index, "Refusing to proxy image");
            e
        })?;
    }

    let image = fetch_image(&state.http_client, &image_url)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, index = index, "Image fetch failed");
            e
        })?;

    let content_type = image
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(([(header::CONTENT_TYPE, content_type)], image.bytes).into_response())
}
