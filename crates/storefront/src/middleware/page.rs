//! Per-request layout data for the base template.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{AccessibilityPrefs, CurrentUser, session_keys};

use super::session::{load_cart, load_prefs};

/// What the shared layout needs on every page: the header's account link
/// and cart badge, and the `<html>` accessibility classes and language.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub prefs: AccessibilityPrefs,
    /// Request path, used as the `return_to` of add-to-cart forms.
    pub path: String,
}

impl PageContext {
    /// Whether to show the cart badge.
    #[must_use]
    pub const fn has_cart_items(&self) -> bool {
        self.cart_count > 0
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_owned();

        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self {
                path,
                ..Self::default()
            });
        };

        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten();

        Ok(Self {
            user,
            cart_count: load_cart(session).await.count(),
            prefs: load_prefs(session).await,
            path,
        })
    }
}
