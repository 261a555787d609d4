//! Shopping cart stored in the visitor's session.

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, Product, ProductId};
use super::price::{CurrencyCode, Price};

/// One cart line: a product and how many copies of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub qty: u32,
}

/// A cart line resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine<'a> {
    pub product: &'a Product,
    pub qty: u32,
    pub line_total: Price,
}

/// The visitor's cart.
///
/// Holds at most one line per product; adding an existing product bumps
/// its quantity instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `qty` copies of a product.
    pub fn add(&mut self, product_id: ProductId, qty: u32) {
        if qty == 0 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.qty = line.qty.saturating_add(qty),
            None => self.lines.push(CartLine { product_id, qty }),
        }
    }

    /// Remove a product's line. Removing an absent product is a no-op.
    pub fn remove(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id.as_str() != product_id);
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total number of items (sum of quantities).
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.qty))
    }

    /// Resolve lines against the catalog, skipping unknown products.
    #[must_use]
    pub fn priced<'a>(&self, catalog: &'a Catalog) -> Vec<PricedLine<'a>> {
        self.lines
            .iter()
            .filter_map(|line| {
                let product = catalog.find(line.product_id.as_str())?;
                Some(PricedLine {
                    product,
                    qty: line.qty,
                    line_total: product.price.times(line.qty),
                })
            })
            .collect()
    }

    /// Sum of all priced lines.
    #[must_use]
    pub fn subtotal(&self, catalog: &Catalog) -> Price {
        self.priced(catalog)
            .iter()
            .fold(Price::zero(CurrencyCode::PEN), |acc, l| acc + l.line_total)
    }
}
