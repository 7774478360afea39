use crate::error::Result;
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct RefreshTokenRepository {}

impl RefreshTokenRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Stores the hash of a newly issued refresh token. The raw token never touches the database.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, token_hash), err)]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        token_hash: &str,
        ttl_days: i64,
    ) -> Result<()> {
        let expires_at = OffsetDateTime::now_utc() + time::Duration::days(ttl_days);

        sqlx::query("INSERT INTO refresh_tokens (token_hash, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token_hash)
            .bind(user_id)
            .bind(expires_at)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Consumes `old_hash` and stores `new_hash` in one statement.
    ///
    /// The old row is deleted whether or not it had expired, so a token can be presented at most once.
    /// Returns the owning user only when the old token existed and was still valid.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the statement fails.
    #[tracing::instrument(level = "debug", skip(self, conn, old_hash, new_hash), err)]
    pub(crate) async fn rotate_unexpired(
        &self,
        conn: &mut PgConnection,
        old_hash: &str,
        new_hash: &str,
        ttl_days: i64,
    ) -> Result<Option<Uuid>> {
        let expires_at = OffsetDateTime::now_utc() + time::Duration::days(ttl_days);

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r"
            WITH consumed AS (
                DELETE FROM refresh_tokens
                WHERE token_hash = $1
                RETURNING user_id, expires_at
            )
            INSERT INTO refresh_tokens (token_hash, user_id, expires_at)
            SELECT $2, user_id, $3
            FROM consumed
            WHERE expires_at > NOW()
            RETURNING user_id
            ",
        )
        .bind(old_hash)
        .bind(new_hash)
        .bind(expires_at)
        .fetch_optional(conn)
        .await?;

        Ok(user_id)
    }

    /// Revokes every refresh token held by the user.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the deletion fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub(crate) async fn delete_all_for_user(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1").bind(user_id).execute(conn).await?;
        Ok(result.rows_affected())
    }

    /// # Errors
    /// Returns `AppError::Database` if the deletion fails.
    #[tracing::instrument(level = "debug", skip(self, conn), err)]
    pub async fn delete_expired(&self, conn: &mut PgConnection) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW()").execute(conn).await?;
        Ok(result.rows_affected())
    }
}
