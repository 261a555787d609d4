//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::{PageContext, RequireAuth};
use crate::models::User;
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub email: String,
    pub display_name: String,
    pub profile: Option<User>,
}

/// Display the profile page.
///
/// Falls back to the session copy of the name and email if the account row
/// is gone.
#[instrument(skip(state, page, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<ProfileTemplate> {
    let stored = UserRepository::new(state.pool()).get_by_id(user.id).await?;

    Ok(ProfileTemplate {
        page,
        email: user.email.to_string(),
        display_name: user.display_name,
        profile: stored,
    })
}
