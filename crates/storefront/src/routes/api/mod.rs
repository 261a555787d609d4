//! JSON proxy endpoints used by the page widgets.
//!
//! Both endpoints answer errors as `{"error": "..."}` and send permissive
//! CORS headers.

pub mod asr;
pub mod translate;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Largest accepted media file.
pub const MAX_MEDIA_BYTES: usize = 50 * 1024 * 1024;

/// Room for multipart boundaries, part headers and small extra fields on
/// top of the media file itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Largest accepted translation payload.
pub const MAX_TRANSLATE_BYTES: usize = 2 * 1024 * 1024;

/// Error response for API endpoints.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ApiErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    /// A 400 for a request the proxy cannot use.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    /// A 413 for a media file over [`MAX_MEDIA_BYTES`].
    pub fn too_large() -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "file too large".to_owned(),
        }
    }

    /// A 500 for missing configuration or a failed upstream call.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                error: &self.message,
            }),
        )
            .into_response()
    }
}

/// Create the `/api` routes router.
pub fn api_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/translate",
            post(translate::translate).layer(DefaultBodyLimit::max(MAX_TRANSLATE_BYTES)),
        )
        .route(
            "/asr",
            post(asr::transcribe)
                .layer(DefaultBodyLimit::max(MAX_MEDIA_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .layer(cors)
}
