use crate::domain::user::User;
use crate::error::Result;
use crate::storage::records::UserRecord;
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct UserRepository {}

impl UserRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// # Errors
    /// Returns `AppError::Database` on failure, including a unique violation for a taken email.
    #[tracing::instrument(level = "debug", skip(self, conn, email, password_hash), err)]
    pub(crate) async fn create(&self, conn: &mut PgConnection, email: &str, password_hash: &str) -> Result<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            r"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(conn)
        .await?;

        Ok(record.into())
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn, email), err)]
    pub(crate) async fn find_by_email(&self, conn: &mut PgConnection, email: &str) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r"
            SELECT id, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r"
            SELECT id, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// Returns `None` when the user no longer exists.
    ///
    /// # Errors
    /// Returns `AppError::Database` on failure, including a unique violation for a taken email.
    #[tracing::instrument(level = "debug", skip(self, conn, email), err)]
    pub(crate) async fn update_email(&self, conn: &mut PgConnection, id: Uuid, email: &str) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r"
            UPDATE users
            SET email = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(email)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }
}
