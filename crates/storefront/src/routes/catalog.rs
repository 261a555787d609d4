//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use lixmath_core::Product;

use crate::error::{AppError, Result};
use crate::middleware::PageContext;
use crate::state::AppState;

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogIndexTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: Product,
}

/// Query for the legacy detail URL.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub id: Option<String>,
}

/// Display the catalog.
#[instrument(skip(state, page))]
pub async fn index(State(state): State<AppState>, page: PageContext) -> CatalogIndexTemplate {
    CatalogIndexTemplate {
        page,
        products: state.catalog().products().to_vec(),
    }
}

/// Display a product detail page.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<String>,
) -> Result<ProductShowTemplate> {
    let product = find_product(&state, &id)?;
    Ok(ProductShowTemplate { page, product })
}

/// Legacy `detalle?id=` URL; without an id it shows the first product.
#[instrument(skip(state, page))]
pub async fn detail(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<DetailQuery>,
) -> Result<ProductShowTemplate> {
    let product = match query.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => find_product(&state, id)?,
        None => state
            .catalog()
            .default_product()
            .cloned()
            .ok_or_else(|| AppError::NotFound("empty catalog".to_string()))?,
    };
    Ok(ProductShowTemplate { page, product })
}

fn find_product(state: &AppState, id: &str) -> Result<Product> {
    state
        .catalog()
        .find(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
