//! DeepL client for page translation.
//!
//! The translation widget sends keyed text snippets; they are forwarded to
//! DeepL in one form-encoded request and returned under the same keys.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use lixmath_core::language::deepl_target;

/// Errors that can occur when calling DeepL.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// DeepL answered with a different number of translations.
    #[error("expected {expected} translations, got {got}")]
    CountMismatch { expected: usize, got: usize },

    /// Failed to parse response or build the request.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// One translatable snippet, identified by the page's `data-i18n` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationItem {
    pub key: String,
    pub text: String,
}

/// Body of `POST /api/translate`.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateRequest {
    /// Page language tag such as `en-US`.
    pub target: String,
    pub items: Vec<TranslationItem>,
}

/// Reply of `POST /api/translate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslateResponse {
    pub translations: Vec<TranslationItem>,
}

#[derive(Debug, Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeeplTranslation {
    text: String,
}

/// DeepL v2 translate client.
#[derive(Clone)]
pub struct DeeplClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl DeeplClient {
    /// Create a new DeepL client.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(api_key: &SecretString, endpoint: Url) -> Result<Self, TranslateError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("DeepL-Auth-Key {}", api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| TranslateError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Translate every item into the request's target language.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the reply does not line up
    /// with the request.
    #[tracing::instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn translate(
        &self,
        request: &TranslateRequest,
    ) -> Result<TranslateResponse, TranslateError> {
        if request.items.is_empty() {
            return Ok(TranslateResponse {
                translations: Vec::new(),
            });
        }

        let target_lang = deepl_target(&request.target);
        let mut form: Vec<(&str, &str)> = Vec::with_capacity(request.items.len() + 1);
        form.push(("target_lang", target_lang));
        form.extend(request.items.iter().map(|item| ("text", item.text.as_str())));

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: DeeplResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;

        if body.translations.len() != request.items.len() {
            return Err(TranslateError::CountMismatch {
                expected: request.items.len(),
                got: body.translations.len(),
            });
        }

        let translations = request
            .items
            .iter()
            .zip(body.translations)
            .map(|(item, t)| TranslationItem {
                key: item.key.clone(),
                text: t.text,
            })
            .collect();

        Ok(TranslateResponse { translations })
    }
}
