//! `POST /api/translate`: forward page snippets to DeepL.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::instrument;

use crate::services::{TranslateRequest, TranslateResponse};
use crate::state::AppState;

use super::ApiError;

/// Translate keyed snippets.
///
/// The key check comes first so a misconfigured server answers 500 whatever
/// the body.
#[instrument(skip(state, body))]
pub async fn translate(
    State(state): State<AppState>,
    body: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let client = state
        .translator()
        .ok_or_else(|| ApiError::internal("DEEPL_API_KEY missing"))?;

    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let response = client.translate(&request).await.map_err(|e| {
        tracing::error!(error = %e, "Translation failed");
        ApiError::internal(e.to_string())
    })?;

    Ok(Json(response))
}
