//! Purchased product downloads (simulated).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::PurchaseRepository;
use crate::error::{AppError, Result};
use crate::middleware::{PageContext, RequireAuth};
use crate::models::Purchase;
use crate::state::AppState;

/// Downloads page template.
#[derive(Template, WebTemplate)]
#[template(path = "downloads/index.html")]
pub struct DownloadsTemplate {
    pub page: PageContext,
    pub purchases: Vec<Purchase>,
}

/// List the signed-in user's purchases.
#[instrument(skip(state, page, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<DownloadsTemplate> {
    let purchases = PurchaseRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(DownloadsTemplate { page, purchases })
}

/// Serve the simulated file for a purchased product.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn download(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse> {
    let purchase = PurchaseRepository::new(state.pool())
        .find_for_user(user.id, &product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("purchase of {product_id}")))?;

    let disposition = format!(
        "attachment; filename=\"{}-{}.txt\"",
        purchase.product_id, purchase.version
    );

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
            (CONTENT_DISPOSITION, disposition),
        ],
        download_body(&purchase),
    ))
}

fn download_body(purchase: &Purchase) -> String {
    format!("Descarga simulada de {}", purchase.product_name)
}
