//! Authentication service.
//!
//! Password registration and login against the local user table.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use lixmath_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User, UserProfile};

/// Minimum password length, in characters.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration form as submitted.
///
/// Field names follow the form inputs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub nombres: String,
    pub ap_paterno: String,
    pub ap_materno: String,
    pub edad: String,
    pub carrera: String,
    pub telefono: String,
    pub email: String,
    pub pais: String,
    pub pass: String,
    pub pass2: String,
    /// Present (any value) when the terms checkbox is ticked.
    pub acepto: Option<String>,
}

impl Registration {
    /// Run the form checks in order and build the account to insert.
    ///
    /// The password hash is left empty; [`AuthService::register`] fills it.
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn validate(&self) -> Result<NewUser, AuthError> {
        let required = [
            &self.nombres,
            &self.ap_paterno,
            &self.ap_materno,
            &self.email,
            &self.pass,
            &self.pass2,
            &self.pais,
        ];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(AuthError::MissingFields);
        }
        if self.pass != self.pass2 {
            return Err(AuthError::PasswordMismatch);
        }
        if self.acepto.is_none() {
            return Err(AuthError::TermsNotAccepted);
        }
        let email = Email::parse(&self.email)?;
        validate_password(&self.pass)?;

        Ok(NewUser {
            email,
            display_name: format!("{} {}", self.nombres.trim(), self.ap_paterno.trim()),
            password_hash: String::new(),
            profile: UserProfile {
                maternal_surname: self.ap_materno.trim().to_owned(),
                age: non_blank(&self.edad),
                career: non_blank(&self.carrera),
                phone: non_blank(&self.telefono),
                country: self.pais.trim().to_owned(),
            },
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns a validation variant if the form is incomplete or invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, form: &Registration) -> Result<User, AuthError> {
        let mut new_user = form.validate()?;
        new_user.password_hash = hash_password(&form.pass)?;

        self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if either field is blank,
    /// `AuthError::UserNotFound` if no account matches the email and
    /// `AuthError::InvalidCredentials` if the password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        // A malformed address cannot belong to any account.
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    fn valid_form() -> Registration {
        Registration {
            nombres: "María José".to_owned(),
            ap_paterno: "Torres".to_owned(),
            ap_materno: "Villa".to_owned(),
            edad: "23".to_owned(),
            carrera: "Ingeniería Civil".to_owned(),
            telefono: String::new(),
            email: " maria@uni.edu.pe ".to_owned(),
            pais: "Perú".to_owned(),
            pass: "concreto123".to_owned(),
            pass2: "concreto123".to_owned(),
            acepto: Some("on".to_owned()),
        }
    }

    #[test]
    fn test_validate_builds_account() {
        let user = valid_form().validate().unwrap();
        assert_eq!(user.email.as_str(), "maria@uni.edu.pe");
        assert_eq!(user.display_name, "María José Torres");
        assert_eq!(user.profile.maternal_surname, "Villa");
        assert_eq!(user.profile.age.as_deref(), Some("23"));
        assert_eq!(user.profile.phone, None);
    }

    #[test]
    fn test_validate_missing_fields_first() {
        let form = Registration {
            pais: "   ".to_owned(),
            pass2: "different".to_owned(),
            acepto: None,
            ..valid_form()
        };
        assert!(matches!(form.validate(), Err(AuthError::MissingFields)));
    }

    #[test]
    fn test_validate_order() {
        let mismatch = Registration {
            pass2: "otra-clave".to_owned(),
            acepto: None,
            ..valid_form()
        };
        assert!(matches!(mismatch.validate(), Err(AuthError::PasswordMismatch)));

        let no_terms = Registration {
            acepto: None,
            email: "bad".to_owned(),
            ..valid_form()
        };
        assert!(matches!(no_terms.validate(), Err(AuthError::TermsNotAccepted)));

        let bad_email = Registration {
            email: "sin-arroba".to_owned(),
            pass: "corta".to_owned(),
            pass2: "corta".to_owned(),
            ..valid_form()
        };
        assert!(matches!(bad_email.validate(), Err(AuthError::InvalidEmail(_))));

        let short = Registration {
            pass: "corta".to_owned(),
            pass2: "corta".to_owned(),
            ..valid_form()
        };
        assert!(matches!(short.validate(), Err(AuthError::WeakPassword(_))));
    }

    #[test]
    fn test_password_length_counts_chars() {
        assert!(validate_password("ñandúñañ").is_ok());
        assert!(validate_password("ñandú").is_err());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AuthError::PasswordMismatch.user_message(),
            "Las contraseñas no coinciden"
        );
        assert!(AuthError::UserAlreadyExists.is_user_error());
        assert!(!AuthError::PasswordHash.is_user_error());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = memory_pool().await;
        let auth = AuthService::new(&pool);

        let user = auth.register(&valid_form()).await.unwrap();
        let logged_in = auth.login("maria@uni.edu.pe", "concreto123").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let pool = memory_pool().await;
        let auth = AuthService::new(&pool);

        auth.register(&valid_form()).await.unwrap();
        let err = auth.register(&valid_form()).await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_login_errors() {
        let pool = memory_pool().await;
        let auth = AuthService::new(&pool);
        auth.register(&valid_form()).await.unwrap();

        assert!(matches!(
            auth.login("", "x").await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            auth.login("otro@uni.edu.pe", "concreto123").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            auth.login("maria@uni.edu.pe", "equivocada").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
