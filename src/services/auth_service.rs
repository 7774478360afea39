use crate::config::AuthConfig;
use crate::domain::auth::{Claims, OpaqueToken};
use crate::domain::auth_session::AuthSession;
use crate::domain::user::User;
use crate::error::{AppError, Result};
use crate::storage::refresh_token_repo::RefreshTokenRepository;
use crate::telemetry::METER_NAME;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use opentelemetry::{global, metrics::Counter};
use rand::rngs::OsRng;
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    refresh_total: Counter<u64>,
    refresh_rejected_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter(METER_NAME);
        Self {
            refresh_total: meter
                .u64_counter("auth_refresh_total")
                .with_description("Total number of successful token rotations")
                .build(),
            refresh_rejected_total: meter
                .u64_counter("auth_refresh_rejected_total")
                .with_description("Refresh attempts with an unknown, reused or expired token")
                .build(),
        }
    }
}

/// Token issuance and verification. Owns no user data; callers pass the connection so
/// issuance can join their transaction.
#[derive(Clone, Debug)]
pub struct AuthService {
    config: AuthConfig,
    refresh_repo: RefreshTokenRepository,
    metrics: Metrics,
}

impl AuthService {
    #[must_use]
    pub fn new(config: AuthConfig, refresh_repo: RefreshTokenRepository) -> Self {
        Self { config, refresh_repo, metrics: Metrics::new() }
    }

    /// # Errors
    /// Returns `AppError::Internal` if hashing fails or the blocking task panics.
    #[tracing::instrument(err, skip(self, password))]
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default().hash_password(password.as_bytes(), &salt).map(|h| h.to_string()).map_err(|e| {
                tracing::error!(error = %e, "password hashing failed");
                AppError::Internal
            })
        })
        .await
        .map_err(|_| AppError::Internal)?
    }

    /// # Errors
    /// Returns `AppError::Internal` if the stored hash is malformed.
    #[tracing::instrument(err, skip(self, password, password_hash))]
    pub async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash).map_err(|_| AppError::Internal)?;
            Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
        })
        .await
        .map_err(|_| AppError::Internal)?
    }

    /// Issues an access token and a fresh refresh token for `user`.
    ///
    /// # Errors
    /// Returns an error if signing or storing the refresh token fails.
    #[tracing::instrument(err, skip(self, conn, user), fields(user.id = %user.id))]
    pub(crate) async fn create_session(&self, conn: &mut PgConnection, user: &User) -> Result<AuthSession> {
        let claims = Claims::new(user.id, user.email.clone(), self.config.access_token_ttl_secs);
        let access_token = claims.encode(&self.config.jwt_secret)?;

        let refresh_token = OpaqueToken::generate();
        self.refresh_repo
            .create(conn, user.id, &OpaqueToken::hash(&refresh_token), self.config.refresh_token_ttl_days)
            .await?;

        Ok(AuthSession { access_token, refresh_token, expires_at: claims.exp })
    }

    /// Consumes `refresh_token` and returns the owning user id along with its replacement.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` when the token is unknown, already used, or expired.
    #[tracing::instrument(err(level = "warn"), skip(self, conn, refresh_token), fields(user.id = tracing::field::Empty))]
    pub(crate) async fn rotate_refresh_token(&self, conn: &mut PgConnection, refresh_token: &str) -> Result<(Uuid, String)> {
        let new_refresh_token = OpaqueToken::generate();

        let Some(user_id) = self
            .refresh_repo
            .rotate_unexpired(
                conn,
                &OpaqueToken::hash(refresh_token),
                &OpaqueToken::hash(&new_refresh_token),
                self.config.refresh_token_ttl_days,
            )
            .await?
        else {
            self.metrics.refresh_rejected_total.add(1, &[]);
            return Err(AppError::AuthError);
        };

        tracing::Span::current().record("user.id", tracing::field::display(user_id));
        self.metrics.refresh_total.add(1, &[]);

        Ok((user_id, new_refresh_token))
    }

    /// Signs a new access token to pair with an already-rotated refresh token.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails.
    pub(crate) fn reissue(&self, user: &User, refresh_token: String) -> Result<AuthSession> {
        let claims = Claims::new(user.id, user.email.clone(), self.config.access_token_ttl_secs);
        let access_token = claims.encode(&self.config.jwt_secret)?;
        Ok(AuthSession { access_token, refresh_token, expires_at: claims.exp })
    }

    /// # Errors
    /// Returns `AppError::Database` if the deletion fails.
    #[tracing::instrument(err, skip(self, conn), fields(user.id = %user_id))]
    pub(crate) async fn revoke_all(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<u64> {
        self.refresh_repo.delete_all_for_user(conn, user_id).await
    }

    /// Verifies an access token and returns its claims.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` for a malformed, forged or expired token.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        Claims::decode(token, &self.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn setup_service() -> AuthService {
        let config = AuthConfig {
            jwt_secret: "test_secret".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_days: 7,
            refresh_cleanup_interval_secs: 0,
        };
        AuthService::new(config, RefreshTokenRepository::new())
    }

    fn user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            email: "navigator@example.com".to_string(),
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reissued_token_verifies() {
        let service = setup_service();
        let user = user();

        let session = service.reissue(&user, "opaque".to_string()).unwrap();
        let claims = service.verify_token(&session.access_token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.exp, session.expires_at);
        assert_eq!(session.refresh_token, "opaque");
    }

    #[test]
    fn test_foreign_token_rejected() {
        let service = setup_service();
        let forged = Claims::new(Uuid::new_v4(), "x@example.com", 60).encode("other_secret").unwrap();
        assert!(matches!(service.verify_token(&forged), Err(AppError::AuthError)));
        assert!(matches!(service.verify_token("not-a-jwt"), Err(AppError::AuthError)));
    }

    #[tokio::test]
    async fn test_password_hashing() {
        let service = setup_service();
        let password = "password12345";
        let hash = service.hash_password(password).await.unwrap();

        assert!(service.verify_password(password, &hash).await.unwrap());
        assert!(!service.verify_password("wrong_password", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_internal_error() {
        let service = setup_service();
        assert!(matches!(service.verify_password("pw", "not-a-phc-string").await, Err(AppError::Internal)));
    }
}
