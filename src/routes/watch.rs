//! Single-Title Player Route
//!
//! The detail path is always strict: there is no meaningful partial
//! result for a one-item page, so both upstream calls must succeed or
//! the request fails as a whole.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::models::{DramaCard, QualityOption};
use crate::services::upstream::{coerce_to_list, normalize_card, pick_default_quality};
use crate::AppState;

/// Everything the player page needs for one title
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    pub drama: DramaCard,
    /// Episode/chapter objects as the upstream sent them
    pub chapters: Vec<Value>,
    pub qualities: Vec<QualityOption>,
    pub default_quality: Option<QualityOption>,
}

/// GET /api/drama/:book_id
pub async fn get_drama(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let client = state.aggregator.client();
    let encoded = urlencoding::encode(&book_id);
    let detail_path = format!("/detail?bookId={}", encoded);
    let episodes_path = format!("/allepisode?bookId={}", encoded);

    // Both calls are strict; run them concurrently and settle both
    let (detail_outcome, episodes_outcome) =
        tokio::join!(client.fetch(&detail_path), client.fetch(&episodes_path));

    let detail_raw = detail_outcome.map_err(|e| upstream_error(&book_id, e))?;
    let episodes_raw = episodes_outcome.map_err(|e| upstream_error(&book_id, e))?;

    // The detail endpoint returns either the object or a one-element list
    let detail = match detail_raw {
        Value::Array(mut items) if !items.is_empty() => items.remove(0),
        other => other,
    };
    let drama = normalize_card(&detail).unwrap_or_default();

    let chapters = coerce_to_list(episodes_raw);
    let selection = pick_default_quality(&drama.cdn_list);

    Ok(Json(PlayerPayload {
        drama,
        chapters,
        qualities: selection.qualities,
        default_quality: selection.default,
    }))
}

fn upstream_error(
    book_id: &str,
    err: impl std::fmt::Display,
) -> (StatusCode, Json<serde_json::Value>) {
    tracing::error!("Upstream error for bookId {}: {}", book_id, err);
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({"error": format!("Upstream error: {}", err)})),
    )
}
