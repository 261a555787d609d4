//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use lixmath_core::{Email, UserId};

/// A registered storefront user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    /// Given names followed by the paternal surname.
    pub display_name: String,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
}

/// Registration details kept alongside the account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub maternal_surname: String,
    pub age: Option<String>,
    pub career: Option<String>,
    pub phone: Option<String>,
    pub country: String,
}

/// Data needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub display_name: String,
    pub password_hash: String,
    pub profile: UserProfile,
}
