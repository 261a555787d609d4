//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Forms work without JavaScript;
//! requests sent with `HX-Request` get the badge fragment back instead of a
//! redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use lixmath_core::{Cart, Catalog};

use crate::error::{AppError, Result};
use crate::middleware::{PageContext, load_cart, store_cart, try_load_cart};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image_url: String,
    pub qty: u32,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
}

impl CartView {
    /// Price the cart against the catalog.
    #[must_use]
    pub fn new(cart: &Cart, catalog: &Catalog) -> Self {
        let items = cart
            .priced(catalog)
            .into_iter()
            .map(|line| CartItemView {
                product_id: line.product.id.to_string(),
                name: line.product.name.clone(),
                image_url: line.product.image_url.clone(),
                qty: line.qty,
                line_total: line.line_total.to_string(),
            })
            .collect();

        Self {
            items,
            subtotal: cart.subtotal(catalog).to_string(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    /// Raw quantity field; browsers submit `qty=` when the input is blank.
    pub qty: Option<String>,
    /// Page to go back to when JavaScript is off.
    pub return_to: Option<String>,
}

impl AddToCartForm {
    /// Requested quantity. Blank, zero or malformed input adds one copy.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.qty
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|&qty| qty > 0)
            .unwrap_or(1)
    }
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(state, session, page))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
) -> CartShowTemplate {
    let cart = load_cart(&session).await;

    CartShowTemplate {
        page,
        cart: CartView::new(&cart, state.catalog()),
    }
}

/// Add a product to the cart.
///
/// Returns the badge fragment with an `HX-Trigger` for HTMX requests,
/// otherwise redirects back to `return_to`.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .find(&form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let mut cart = try_load_cart(&session).await?;
    cart.add(product.id.clone(), form.quantity());
    store_cart(&session, &cart).await?;

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: cart.count(),
            },
        )
            .into_response());
    }

    let target = form
        .return_to
        .as_deref()
        .filter(|path| is_local_path(path))
        .unwrap_or("/cart");
    Ok(Redirect::to(target).into_response())
}

/// Remove a product from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let mut cart = try_load_cart(&session).await?;
    cart.remove(&form.product_id);
    store_cart(&session, &cart).await?;

    Ok(Redirect::to("/cart"))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> CartCountTemplate {
    CartCountTemplate {
        count: load_cart(&session).await.count(),
    }
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

/// Only same-site absolute paths are accepted as redirect targets.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
