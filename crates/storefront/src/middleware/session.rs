//! Session middleware configuration.
//!
//! Sessions hold the visitor's cart, signed-in user and accessibility
//! preferences. Production uses the `SQLite` store; tests pass a
//! `MemoryStore`.

use sqlx::SqlitePool;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::SqliteStore;

use lixmath_core::Cart;

use crate::config::StoreConfig;
use crate::models::{AccessibilityPrefs, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "lixmath_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the `SQLite` session store and its table.
///
/// # Errors
///
/// Returns an error if the session table cannot be created.
pub async fn create_session_store(pool: &SqlitePool) -> Result<SqliteStore, sqlx::Error> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;
    Ok(store)
}

/// Create the session layer over any store.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &StoreConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the visitor's cart, or an empty one.
///
/// A value that no longer deserializes is treated as an empty cart.
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Load the visitor's cart for a handler that will write it back.
///
/// Unlike [`load_cart`], a stored value that fails to deserialize is an
/// error, so the caller never overwrites a cart it could not read.
///
/// # Errors
///
/// Returns an error if the session store fails or the cart is unreadable.
pub async fn try_load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Save the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Load the visitor's accessibility preferences, or the defaults.
pub async fn load_prefs(session: &Session) -> AccessibilityPrefs {
    session
        .get::<AccessibilityPrefs>(session_keys::ACCESSIBILITY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Save the visitor's accessibility preferences.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_prefs(
    session: &Session,
    prefs: &AccessibilityPrefs,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::ACCESSIBILITY, prefs).await
}
