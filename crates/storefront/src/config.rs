//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the store runs locally with no setup.
//!
//! - `STOREFRONT_DATABASE_URL` - `SQLite` connection string (falls back to `DATABASE_URL`,
//!   default: `sqlite://lixmath.db?mode=rwc`)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (falls back to `PORT`, default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `STOREFRONT_IGV_RATE` - Sales tax rate applied at checkout (default: 0)
//! - `DEEPL_API_KEY` - DeepL key; `/api/translate` answers 500 without it
//! - `DEEPL_API_URL` - DeepL translate endpoint (default: free tier)
//! - `OPENAI_API_KEY` - OpenAI key; `/api/asr` answers 500 without it
//! - `OPENAI_TRANSCRIPTION_URL` - Transcription endpoint
//! - `ASR_MODEL` - Transcription model (default: whisper-1)
//! - `ASR_LANGUAGE` - Spoken language hint (default: es)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DATABASE_URL: &str = "sqlite://lixmath.db?mode=rwc";
const DEFAULT_DEEPL_URL: &str = "https://api-free.deepl.com/v2/translate";
const DEFAULT_TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "pon-tu",
    "tu-clave",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Sales tax (IGV) rate as a fraction, e.g. `0.18`
    pub igv_rate: Decimal,
    /// DeepL translation proxy configuration
    pub translation: TranslationConfig,
    /// Speech-to-text proxy configuration
    pub transcription: TranscriptionConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// DeepL API configuration.
///
/// `SecretString` redacts the key in `Debug` output.
#[derive(Debug, Clone)]
pub struct TranslationConfig {
    pub api_key: Option<SecretString>,
    pub endpoint: Url,
}

/// OpenAI audio transcription configuration.
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    pub api_key: Option<SecretString>,
    pub endpoint: Url,
    pub model: String,
    pub language: String,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or an API key
    /// fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(
            get_optional_env("STOREFRONT_DATABASE_URL")
                .or_else(|| get_optional_env("DATABASE_URL"))
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
        );
        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = match get_optional_env("STOREFRONT_PORT") {
            Some(_) => parse_env("STOREFRONT_PORT", "3000")?,
            None => parse_env("PORT", "3000")?,
        };
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let igv_rate = parse_igv_rate(&get_env_or_default("STOREFRONT_IGV_RATE", "0"))?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            igv_rate,
            translation: TranslationConfig::from_env()?,
            transcription: TranscriptionConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the store is served over HTTPS (enables secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Configuration for tests: in-memory database, no vendor keys.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            database_url: SecretString::from("sqlite::memory:"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost:3000".to_owned(),
            igv_rate: Decimal::ZERO,
            translation: TranslationConfig {
                api_key: None,
                endpoint: default_url(DEFAULT_DEEPL_URL),
            },
            transcription: TranscriptionConfig {
                api_key: None,
                endpoint: default_url(DEFAULT_TRANSCRIPTION_URL),
                model: "whisper-1".to_owned(),
                language: "es".to_owned(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl TranslationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_optional_secret("DEEPL_API_KEY")?,
            endpoint: parse_env("DEEPL_API_URL", DEFAULT_DEEPL_URL)?,
        })
    }
}

impl TranscriptionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_optional_secret("OPENAI_API_KEY")?,
            endpoint: parse_env("OPENAI_TRANSCRIPTION_URL", DEFAULT_TRANSCRIPTION_URL)?,
            model: get_env_or_default("ASR_MODEL", "whisper-1"),
            language: get_env_or_default("ASR_LANGUAGE", "es"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a compile-time default URL.
fn default_url(raw: &'static str) -> Url {
    Url::parse(raw).unwrap_or_else(|_| unreachable!("default URL {raw} is valid"))
}

/// Parse and bound-check the IGV rate (a fraction between 0 and 1).
fn parse_igv_rate(raw: &str) -> Result<Decimal, ConfigError> {
    let rate = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_IGV_RATE".to_string(), e.to_string()))?;
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_IGV_RATE".to_string(),
            format!("must be between 0 and 1 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that an API key is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate an optional API key.
fn get_optional_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    get_optional_env(key)
        .map(|value| {
            validate_secret_strength(&value, key)?;
            Ok(SecretString::from(value))
        })
        .transpose()
}
