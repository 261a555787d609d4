//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required registration field is blank.
    #[error("missing required fields")]
    MissingFields,

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Terms and privacy checkbox not ticked.
    #[error("terms not accepted")]
    TermsNotAccepted,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] lixmath_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Login submitted without email or password.
    #[error("missing credentials")]
    MissingCredentials,

    /// No account for that email.
    #[error("user not found")]
    UserNotFound,

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the error comes from what the visitor typed.
    ///
    /// Everything else is a server fault.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Repository(_) | Self::PasswordHash)
    }

    /// Message shown on the form.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingFields => "Completa todos los campos obligatorios",
            Self::PasswordMismatch => "Las contraseñas no coinciden",
            Self::TermsNotAccepted => "Debes aceptar Términos y Privacidad",
            Self::InvalidEmail(_) => "Ingresa un correo electrónico válido",
            Self::WeakPassword(_) => "La contraseña debe tener al menos 8 caracteres",
            Self::UserAlreadyExists => "Ese correo ya está registrado",
            Self::MissingCredentials => "Completa correo y contraseña",
            Self::UserNotFound => "No existe una cuenta con ese correo",
            Self::InvalidCredentials => "Contraseña incorrecta",
            Self::Repository(_) | Self::PasswordHash => {
                "Ocurrió un error. Inténtalo nuevamente."
            }
        }
    }
}
