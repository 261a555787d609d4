//! OpenAI audio transcription client.
//!
//! Uploads a media file, asks for `verbose_json` so the reply carries timed
//! segments, and renders those segments as WebVTT.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use lixmath_core::subtitles::{self, Segment};

use crate::config::TranscriptionConfig;

/// Errors that can occur when calling the transcription API.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response or build the request.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// An uploaded audio or video file.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Subtitles and plain text for one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub vtt: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: Option<String>,
    #[serde(default)]
    segments: Vec<Segment>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Whisper transcription client.
#[derive(Clone)]
pub struct WhisperClient {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
    language: String,
}

impl WhisperClient {
    /// Create a new transcription client.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(api_key: &SecretString, config: &TranscriptionConfig) -> Result<Self, TranscribeError> {
        let mut headers = HeaderMap::new();

        let mut auth_header = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| TranscribeError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            language: config.language.clone(),
        })
    }

    /// Transcribe an upload into WebVTT subtitles and plain text.
    ///
    /// # Errors
    ///
    /// Returns error if the upload is rejected, the API answers with an error
    /// (even on a 2xx status) or the reply cannot be parsed.
    #[tracing::instrument(skip(self, upload), fields(file = %upload.file_name, bytes = upload.bytes.len()))]
    pub async fn transcribe(&self, upload: MediaUpload) -> Result<Transcript, TranscribeError> {
        let mut file = Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            file = file
                .mime_str(content_type)
                .map_err(|e| TranscribeError::Parse(format!("invalid content type: {e}")))?;
        }

        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("language", self.language.clone());

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed: Result<VerboseTranscription, _> = serde_json::from_str(&body);

        if !status.is_success() {
            let message = match parsed {
                Ok(VerboseTranscription {
                    error: Some(err), ..
                }) => err.message,
                _ => body,
            };
            return Err(TranscribeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply = parsed.map_err(|e| TranscribeError::Parse(e.to_string()))?;
        if let Some(err) = reply.error {
            return Err(TranscribeError::Api {
                status: status.as_u16(),
                message: err.message,
            });
        }

        Ok(Transcript {
            vtt: subtitles::to_vtt(&reply.segments),
            text: subtitles::plain_text(reply.text.as_deref(), &reply.segments),
        })
    }
}
