//! Checkout route handlers (simulated payment).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use lixmath_core::{Cart, Catalog, Price};

use crate::db::PurchaseRepository;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{PageContext, RequireAuth, load_cart, store_cart, try_load_cart};
use crate::models::purchase::{CURRENT_VERSION, NewPurchase};
use crate::state::AppState;

use super::cart::CartView;

/// Order totals shown before paying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: Price,
    pub igv: Price,
    pub total: Price,
    /// IGV rate as a percentage label, e.g. `18`.
    pub igv_percent: String,
}

impl CheckoutSummary {
    /// Compute subtotal, IGV and total for a cart.
    #[must_use]
    pub fn new(cart: &Cart, catalog: &Catalog, igv_rate: Decimal) -> Self {
        let subtotal = cart.subtotal(catalog);
        let igv = subtotal.scaled(igv_rate);
        Self {
            subtotal,
            igv,
            total: subtotal + igv,
            igv_percent: (igv_rate * Decimal::ONE_HUNDRED).normalize().to_string(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub summary: CheckoutSummary,
}

/// Thank-you page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/thanks.html")]
pub struct ThanksTemplate {
    pub page: PageContext,
}

/// Display the order summary.
#[instrument(skip(state, session, page, _user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    session: Session,
    page: PageContext,
) -> CheckoutTemplate {
    let cart = load_cart(&session).await;

    CheckoutTemplate {
        page,
        cart: CartView::new(&cart, state.catalog()),
        summary: CheckoutSummary::new(&cart, state.catalog(), state.config().igv_rate),
    }
}

/// Simulated payment: record a purchase per cart line and empty the cart.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Response> {
    let mut cart = try_load_cart(&session).await?;

    let purchases: Vec<NewPurchase> = cart
        .priced(state.catalog())
        .into_iter()
        .map(|line| NewPurchase {
            product_id: line.product.id.clone(),
            product_name: line.product.name.clone(),
            version: CURRENT_VERSION.to_owned(),
        })
        .collect();

    if purchases.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let recorded = PurchaseRepository::new(state.pool())
        .record_many(user.id, &purchases)
        .await?;

    cart.clear();
    store_cart(&session, &cart).await?;

    tracing::info!(purchases = recorded.len(), "Checkout completed");
    add_breadcrumb(
        "checkout",
        "Paid cart",
        &[("purchases", &recorded.len().to_string())],
    );

    Ok(Redirect::to("/checkout/thanks").into_response())
}

/// Display the thank-you page.
#[instrument(skip(page, _user))]
pub async fn thanks(RequireAuth(_user): RequireAuth, page: PageContext) -> ThanksTemplate {
    ThanksTemplate { page }
}

#[cfg(test)]
mod tests {
    use lixmath_core::ProductId;

    use super::*;

    #[test]
    fn test_summary_without_tax() {
        let mut cart = Cart::new();
        cart.add(ProductId::from("pav-rig"), 1);
        cart.add(ProductId::from("col-vias"), 2);

        let summary = CheckoutSummary::new(&cart, &Catalog::demo(), Decimal::ZERO);
        assert_eq!(summary.subtotal.to_string(), "S/ 69.70");
        assert_eq!(summary.igv.to_string(), "S/ 0.00");
        assert_eq!(summary.total.to_string(), "S/ 69.70");
        assert_eq!(summary.igv_percent, "0");
    }

    #[test]
    fn test_summary_with_igv() {
        let mut cart = Cart::new();
        cart.add(ProductId::from("pav-rig"), 1);

        let summary = CheckoutSummary::new(&cart, &Catalog::demo(), Decimal::new(18, 2));
        assert_eq!(summary.igv.to_string(), "S/ 5.38");
        assert_eq!(summary.total.to_string(), "S/ 35.28");
        assert_eq!(summary.igv_percent, "18");
    }
}
