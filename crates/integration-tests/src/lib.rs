//! Integration tests for the Lixmath storefront.
//!
//! These run over HTTP against a live server and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the storefront
//! cargo run -p lixmath-storefront
//!
//! # Run integration tests
//! cargo test -p lixmath-integration-tests -- --ignored
//! ```
//!
//! Set `STOREFRONT_BASE_URL` to test a server other than
//! `http://localhost:3000`. The proxy tests also need the server to have
//! `DEEPL_API_KEY` and `OPENAI_API_KEY` configured.
//!
//! # Test Categories
//!
//! - `storefront_shop` - Catalog, cart, accounts, checkout and downloads
//! - `storefront_api` - Translation and subtitle proxy endpoints

use reqwest::{Client, redirect::Policy};
use uuid::Uuid;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// A client that keeps the session cookie and does not follow redirects,
/// so tests can assert on `Location`.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialised.
#[must_use]
#[allow(clippy::expect_used)]
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A registration form for a fresh, unique account.
#[must_use]
pub fn registration(email: &str) -> Vec<(&'static str, String)> {
    vec![
        ("nombres", "Prueba".to_string()),
        ("ap_paterno", "Integracion".to_string()),
        ("ap_materno", "Lixmath".to_string()),
        ("edad", "30".to_string()),
        ("carrera", "Ingenieria Civil".to_string()),
        ("telefono", String::new()),
        ("email", email.to_string()),
        ("pais", "PE".to_string()),
        ("pass", "integracion-2024".to_string()),
        ("pass2", "integracion-2024".to_string()),
        ("acepto", "on".to_string()),
    ]
}

/// A unique throwaway email address.
#[must_use]
pub fn unique_email() -> String {
    format!("integration-{}@example.com", Uuid::new_v4())
}
