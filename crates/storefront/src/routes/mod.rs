//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Liveness check
//! GET  /health/ready             - Readiness check (database)
//!
//! # Catalog
//! GET  /                         - Catalog
//! GET  /products/{id}            - Product detail
//! GET  /detalle?id=              - Legacy product detail URL
//!
//! # Cart (session)
//! GET  /cart                     - Cart page
//! POST /cart/add                 - Add to cart (redirect, or badge fragment for HTMX)
//! POST /cart/remove              - Remove a product
//! GET  /cart/count               - Cart count badge (fragment)
//!
//! # Checkout (requires auth)
//! GET  /checkout                 - Order summary with IGV
//! POST /checkout/pay             - Simulated payment
//! GET  /checkout/thanks          - Thank-you page
//!
//! # Downloads and account (requires auth)
//! GET  /downloads                - Purchased products
//! GET  /downloads/{product_id}   - Simulated file
//! GET  /account                  - Profile
//!
//! # Auth
//! GET  /auth/login               - Login page
//! POST /auth/login               - Login action
//! GET  /auth/register            - Register page
//! POST /auth/register            - Register action
//! POST /auth/logout              - Logout action
//!
//! # Accessibility
//! GET  /accessibility            - Settings, translation and subtitle tools
//! POST /accessibility            - Save settings
//! POST /accessibility/language   - Record page language (JSON)
//! GET  /accessibility/prefs.css  - Slider values as CSS custom properties
//!
//! # Proxy API
//! POST /api/translate            - DeepL translation
//! POST /api/asr                  - Speech to WebVTT subtitles
//! ```

pub mod accessibility;
pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod downloads;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::rate_limit::RateLimiterLayer;
use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Rate limiters for the abuse-prone route groups.
#[derive(Clone)]
pub struct RateLimits {
    pub auth: RateLimiterLayer,
    pub api: RateLimiterLayer,
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/pay", post(checkout::pay))
        .route("/thanks", get(checkout::thanks))
}

/// Create the accessibility routes router.
pub fn accessibility_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(accessibility::index).post(accessibility::save))
        .route("/language", post(accessibility::set_language))
        .route("/prefs.css", get(accessibility::stylesheet))
}

/// Create all routes for the storefront.
///
/// `limits` is `None` in in-process tests, which have no peer address.
pub fn routes(limits: Option<RateLimits>) -> Router<AppState> {
    let mut auth = auth_routes();
    let mut api = api::api_routes();
    if let Some(limits) = limits {
        auth = auth.layer(limits.auth);
        api = api.layer(limits.api);
    }

    Router::new()
        .route("/", get(catalog::index))
        .route("/products/{id}", get(catalog::show))
        .route("/detalle", get(catalog::detail))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/downloads", get(downloads::index))
        .route("/downloads/{product_id}", get(downloads::download))
        .route("/account", get(account::profile))
        .nest("/auth", auth)
        .nest("/accessibility", accessibility_routes())
        .nest("/api", api)
}

/// Assemble the application: routes, static files, sessions and the
/// per-request middleware.
pub fn app<S>(
    state: AppState,
    session_layer: SessionManagerLayer<S>,
    limits: Option<RateLimits>,
) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes(limits))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
