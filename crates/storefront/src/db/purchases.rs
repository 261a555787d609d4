//! Purchase repository.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use lixmath_core::{ProductId, PurchaseId, UserId};

use super::RepositoryError;
use crate::models::purchase::{NewPurchase, Purchase};

#[derive(FromRow)]
struct PurchaseRow {
    id: i64,
    user_id: i64,
    product_id: String,
    product_name: String,
    version: String,
    purchased_at: DateTime<Utc>,
}

impl From<PurchaseRow> for Purchase {
    fn from(r: PurchaseRow) -> Self {
        Self {
            id: PurchaseId::new(r.id),
            user_id: UserId::new(r.user_id),
            product_id: ProductId::new(r.product_id),
            product_name: r.product_name,
            version: r.version,
            purchased_at: r.purchased_at,
        }
    }
}

/// Repository for purchase records.
pub struct PurchaseRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record every purchase of one checkout in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// recorded in that case.
    pub async fn record_many(
        &self,
        user_id: UserId,
        purchases: &[NewPurchase],
    ) -> Result<Vec<Purchase>, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut recorded = Vec::with_capacity(purchases.len());

        for p in purchases {
            let row: PurchaseRow = sqlx::query_as(
                r"
                INSERT INTO purchase (user_id, product_id, product_name, version, purchased_at)
                VALUES (?, ?, ?, ?, ?)
                RETURNING id, user_id, product_id, product_name, version, purchased_at
                ",
            )
            .bind(user_id.as_i64())
            .bind(p.product_id.as_str())
            .bind(&p.product_name)
            .bind(&p.version)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            recorded.push(row.into());
        }

        tx.commit().await?;
        Ok(recorded)
    }

    /// List a user's purchases, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Purchase>, RepositoryError> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(
            r"
            SELECT id, user_id, product_id, product_name, version, purchased_at
            FROM purchase
            WHERE user_id = ?
            ORDER BY id
            ",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Purchase::from).collect())
    }

    /// Most recent purchase of a product by a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_for_user(
        &self,
        user_id: UserId,
        product_id: &str,
    ) -> Result<Option<Purchase>, RepositoryError> {
        let row: Option<PurchaseRow> = sqlx::query_as(
            r"
            SELECT id, user_id, product_id, product_name, version, purchased_at
            FROM purchase
            WHERE user_id = ? AND product_id = ?
            ORDER BY id DESC
            LIMIT 1
            ",
        )
        .bind(user_id.as_i64())
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Purchase::from))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lixmath_core::Email;

    use super::*;
    use crate::db::UserRepository;
    use crate::db::test_support::memory_pool;
    use crate::models::purchase::CURRENT_VERSION;
    use crate::models::user::{NewUser, UserProfile};

    async fn seed_user(pool: &SqlitePool, email: &str) -> UserId {
        UserRepository::new(pool)
            .create(&NewUser {
                email: Email::parse(email).unwrap(),
                display_name: "Luis Rojas".to_owned(),
                password_hash: "x".to_owned(),
                profile: UserProfile {
                    maternal_surname: "Paz".to_owned(),
                    country: "Perú".to_owned(),
                    ..UserProfile::default()
                },
            })
            .await
            .unwrap()
            .id
    }

    fn purchase(id: &str, name: &str) -> NewPurchase {
        NewPurchase {
            product_id: ProductId::from(id),
            product_name: name.to_owned(),
            version: CURRENT_VERSION.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let pool = memory_pool().await;
        let user = seed_user(&pool, "luis@example.pe").await;
        let repo = PurchaseRepository::new(&pool);

        let recorded = repo
            .record_many(
                user,
                &[
                    purchase("pav-rig", "Diseño de Pavimento Rígido"),
                    purchase("col-vias", "Estudios de Vías y Columnas"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(recorded.len(), 2);

        let listed = repo.list_for_user(user).await.unwrap();
        assert_eq!(listed, recorded);
        assert_eq!(listed[0].version, "v1.0");
    }

    #[tokio::test]
    async fn test_purchases_are_per_user() {
        let pool = memory_pool().await;
        let luis = seed_user(&pool, "luis@example.pe").await;
        let rosa = seed_user(&pool, "rosa@example.pe").await;
        let repo = PurchaseRepository::new(&pool);

        repo.record_many(luis, &[purchase("vigas-2d", "Diseño de Vigas 2D")])
            .await
            .unwrap();

        assert!(repo.list_for_user(rosa).await.unwrap().is_empty());
        assert!(repo.find_for_user(rosa, "vigas-2d").await.unwrap().is_none());
        assert!(repo.find_for_user(luis, "vigas-2d").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_record_many_rolls_back_on_failure() {
        let pool = memory_pool().await;
        let user = seed_user(&pool, "luis@example.pe").await;
        let repo = PurchaseRepository::new(&pool);

        sqlx::query(
            r"
            CREATE TRIGGER reject_boom BEFORE INSERT ON purchase
            WHEN NEW.product_id = 'boom'
            BEGIN SELECT RAISE(ABORT, 'boom'); END
            ",
        )
        .execute(&pool)
        .await
        .unwrap();

        // The first insert succeeds inside the transaction, the second aborts.
        let result = repo
            .record_many(
                user,
                &[purchase("pav-rig", "Diseño de Pavimento Rígido"), purchase("boom", "x")],
            )
            .await;
        assert!(matches!(result, Err(RepositoryError::Database(_))));
        assert!(repo.list_for_user(user).await.unwrap().is_empty());
    }
}
