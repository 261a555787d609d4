//! Purchase records.

use chrono::{DateTime, Utc};

use lixmath_core::{ProductId, PurchaseId, UserId};

/// Version label attached to every purchased template.
pub const CURRENT_VERSION: &str = "v1.0";

/// A product bought by a user at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub product_name: String,
    pub version: String,
    pub purchased_at: DateTime<Utc>,
}

/// A purchase about to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPurchase {
    pub product_id: ProductId,
    pub product_name: String,
    pub version: String,
}
