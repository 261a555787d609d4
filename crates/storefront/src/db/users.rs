//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use lixmath_core::{Email, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::user::{NewUser, User, UserProfile};

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    display_name: String,
    maternal_surname: String,
    age: Option<String>,
    career: Option<String>,
    phone: Option<String>,
    country: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(r.id),
            email,
            display_name: r.display_name,
            profile: UserProfile {
                maternal_surname: r.maternal_surname,
                age: r.age,
                career: r.career,
                phone: r.phone,
                country: r.country,
            },
            created_at: r.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, display_name, maternal_surname, age, career, phone, \
                            country, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = ?"))
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Get the password hash for a user, by email.
    ///
    /// Returns the user together with the hash so login needs one query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(FromRow)]
        struct Row {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row: Option<Row> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM user WHERE email = ?"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let profile = &new_user.profile;
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO user (email, display_name, password_hash, maternal_surname,
                              age, career, phone, country, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(new_user.email.as_str())
        .bind(&new_user.display_name)
        .bind(&new_user.password_hash)
        .bind(&profile.maternal_surname)
        .bind(profile.age.as_deref())
        .bind(profile.career.as_deref())
        .bind(profile.phone.as_deref())
        .bind(&profile.country)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        User::try_from(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            display_name: "Ana Quispe".to_owned(),
            password_hash: "$argon2id$fake".to_owned(),
            profile: UserProfile {
                maternal_surname: "Huamán".to_owned(),
                age: Some("21".to_owned()),
                career: None,
                phone: Some("+51 999 888 777".to_owned()),
                country: "Perú".to_owned(),
            },
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);

        let created = repo.create(&new_user("ana@example.pe")).await.unwrap();
        assert_eq!(created.display_name, "Ana Quispe");
        assert_eq!(created.profile.country, "Perú");

        let (by_email, _) = repo
            .get_password_hash(&created.email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.profile, created.profile);

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, created.email);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&new_user("ana@example.pe")).await.unwrap();
        let err = repo.create(&new_user("ana@example.pe")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_password_hash_lookup() {
        let pool = memory_pool().await;
        let repo = UserRepository::new(&pool);
        let created = repo.create(&new_user("ana@example.pe")).await.unwrap();

        let (user, hash) = repo
            .get_password_hash(&created.email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(hash, "$argon2id$fake");

        let missing = Email::parse("nadie@example.pe").unwrap();
        assert!(repo.get_password_hash(&missing).await.unwrap().is_none());
    }
}
