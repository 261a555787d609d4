//! Product catalog.
//!
//! The store sells a fixed set of downloadable engineering templates, so the
//! catalog is an in-memory list rather than a database table.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::price::Price;

/// Product identifier (a URL-safe slug such as `pav-rig`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product ID from a slug.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A product listed in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: String,
}

/// Ordered, immutable product list.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from a product list.
    ///
    /// Later duplicates of an already-listed id are dropped so lookups stay
    /// unambiguous.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let mut unique: Vec<Product> = Vec::with_capacity(products.len());
        for product in products {
            if !unique.iter().any(|p| p.id == product.id) {
                unique.push(product);
            }
        }
        Self { products: unique }
    }

    /// The demo catalog shipped with the store.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(vec![
            Product {
                id: ProductId::new("pav-rig"),
                name: "Diseño de Pavimento Rígido".to_owned(),
                price: Price::soles_from_cents(2990),
                image_url: "https://placehold.co/640x360?text=Pavimento".to_owned(),
            },
            Product {
                id: ProductId::new("vigas-2d"),
                name: "Diseño de Vigas 2D".to_owned(),
                price: Price::soles_from_cents(2490),
                image_url: "https://placehold.co/640x360?text=Vigas+2D".to_owned(),
            },
            Product {
                id: ProductId::new("col-vias"),
                name: "Estudios de Vías y Columnas".to_owned(),
                price: Price::soles_from_cents(1990),
                image_url: "https://placehold.co/640x360?text=V%C3%ADas+%26+Columnas".to_owned(),
            },
        ])
    }

    /// All products in display order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }

    /// The product shown when a detail page is requested without an id.
    #[must_use]
    pub fn default_product(&self) -> Option<&Product> {
        self.products.first()
    }
}
