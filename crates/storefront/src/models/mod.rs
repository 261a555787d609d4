//! Domain models for the storefront.
//!
//! - [`user`] - Registered accounts
//! - [`purchase`] - Checkout records shown on the downloads page
//! - [`session`] - Identity stored in the visitor's session
//! - [`accessibility`] - Per-visitor display preferences

pub mod accessibility;
pub mod purchase;
pub mod session;
pub mod user;

pub use accessibility::AccessibilityPrefs;
pub use purchase::{NewPurchase, Purchase};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewUser, User, UserProfile};
