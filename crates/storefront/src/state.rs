//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use lixmath_core::Catalog;

use crate::config::StoreConfig;
use crate::services::{DeeplClient, TranscribeError, TranslateError, WhisperClient};

/// Error building the vendor API clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("translation client: {0}")]
    Translate(#[from] TranslateError),
    #[error("transcription client: {0}")]
    Transcribe(#[from] TranscribeError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StoreConfig,
    pool: SqlitePool,
    catalog: Catalog,
    translator: Option<DeeplClient>,
    transcriber: Option<WhisperClient>,
}

impl AppState {
    /// Create a new application state with the demo catalog.
    ///
    /// Vendor clients are only built when their API key is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a vendor HTTP client cannot be built.
    pub fn new(config: StoreConfig, pool: SqlitePool) -> Result<Self, StateError> {
        let translator = config
            .translation
            .api_key
            .as_ref()
            .map(|key| DeeplClient::new(key, config.translation.endpoint.clone()))
            .transpose()?;
        let transcriber = config
            .transcription
            .api_key
            .as_ref()
            .map(|key| WhisperClient::new(key, &config.transcription))
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog: Catalog::demo(),
                translator,
                transcriber,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// The DeepL client, if `DEEPL_API_KEY` is set.
    #[must_use]
    pub fn translator(&self) -> Option<&DeeplClient> {
        self.inner.translator.as_ref()
    }

    /// The transcription client, if `OPENAI_API_KEY` is set.
    #[must_use]
    pub fn transcriber(&self) -> Option<&WhisperClient> {
        self.inner.transcriber.as_ref()
    }
}
