//! Authentication route handlers.
//!
//! Registration and password login against the local user table. Validation
//! failures re-render the form with the message and the typed values.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, PageContext, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::{AuthError, AuthService, Registration};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub pass: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub form: Registration,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(OptionalAuth(user): OptionalAuth, page: PageContext) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }

    LoginTemplate {
        page,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, page, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AuthService::new(state.pool())
        .login(&form.email, &form.pass)
        .await
    {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            set_current_user(&session, &current).await?;
            set_sentry_user(&current.id, Some(current.email.as_str()));
            tracing::info!(user_id = %current.id, "User logged in");

            Ok(Redirect::to("/account").into_response())
        }
        Err(e) if e.is_user_error() => {
            tracing::warn!(error = %e, "Login failed");
            let status = match e {
                AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
                _ => StatusCode::UNAUTHORIZED,
            };
            Ok((
                status,
                LoginTemplate {
                    page,
                    error: Some(e.user_message().to_owned()),
                    email: form.email,
                },
            )
                .into_response())
        }
        Err(e) => Err(AppError::Auth(e)),
    }
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(Redirect::to("/"))
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(page: PageContext) -> RegisterTemplate {
    RegisterTemplate {
        page,
        error: None,
        form: Registration::default(),
    }
}

/// Handle registration form submission.
///
/// A new account is signed in right away.
#[instrument(skip(state, session, page, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<Registration>,
) -> Result<Response> {
    match AuthService::new(state.pool()).register(&form).await {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            set_current_user(&session, &current).await?;
            set_sentry_user(&current.id, Some(current.email.as_str()));
            tracing::info!(user_id = %current.id, "User registered");

            Ok(Redirect::to("/account").into_response())
        }
        Err(e) if e.is_user_error() => {
            let status = match e {
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            Ok((
                status,
                RegisterTemplate {
                    page,
                    error: Some(e.user_message().to_owned()),
                    form: Registration {
                        pass: String::new(),
                        pass2: String::new(),
                        ..form
                    },
                },
            )
                .into_response())
        }
        Err(e) => Err(AppError::Auth(e)),
    }
}
