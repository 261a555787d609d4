//! `POST /api/asr`: transcribe an uploaded file into subtitles.

use axum::{
    Json,
    extract::{Multipart, State, multipart::{MultipartError, MultipartRejection}},
};
use tracing::instrument;

use crate::services::{MediaUpload, Transcript};
use crate::state::AppState;

use super::{ApiError, MAX_MEDIA_BYTES};

/// Multipart field carrying the media file.
const MEDIA_FIELD: &str = "media";

/// Transcribe the `media` upload.
#[instrument(skip(state, multipart))]
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Transcript>, ApiError> {
    let client = state
        .transcriber()
        .ok_or_else(|| ApiError::internal("OPENAI_API_KEY missing"))?;

    let mut multipart = multipart.map_err(|_| ApiError::bad_request("missing file"))?;
    let upload = read_media(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request("missing file"))?;

    tracing::info!(file = %upload.file_name, bytes = upload.bytes.len(), "Transcribing upload");

    let transcript = client.transcribe(upload).await.map_err(|e| {
        tracing::error!(error = %e, "Transcription failed");
        ApiError::internal(e.to_string())
    })?;

    Ok(Json(transcript))
}

/// Find the media part; other fields are skipped.
///
/// The request body limit leaves room for the multipart envelope, so the
/// file itself is held to [`MAX_MEDIA_BYTES`] here.
async fn read_media(multipart: &mut Multipart) -> Result<Option<MediaUpload>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(MEDIA_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("media")
            .to_owned();
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if bytes.is_empty() {
            return Ok(None);
        }
        if bytes.len() > MAX_MEDIA_BYTES {
            return Err(ApiError::too_large());
        }

        return Ok(Some(MediaUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError {
        status: e.status(),
        message: e.body_text(),
    }
}
