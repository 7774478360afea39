use crate::domain::auth_session::AuthSession;
use crate::domain::user::User;
use crate::error::{AppError, Result};
use crate::services::auth_service::AuthService;
use crate::storage::DbPool;
use crate::storage::user_repo::UserRepository;
use crate::telemetry::METER_NAME;
use opentelemetry::{global, metrics::Counter};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Debug)]
struct AccountMetrics {
    users_registered_total: Counter<u64>,
    login_total: Counter<u64>,
    logout_total: Counter<u64>,
}

impl AccountMetrics {
    fn new() -> Self {
        let meter = global::meter(METER_NAME);
        Self {
            users_registered_total: meter
                .u64_counter("users_registered_total")
                .with_description("Total number of successful user registrations")
                .build(),
            login_total: meter
                .u64_counter("auth_login_total")
                .with_description("Total number of successful login attempts")
                .build(),
            logout_total: meter
                .u64_counter("auth_logout_total")
                .with_description("Total number of successful logout attempts")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AccountService {
    pool: DbPool,
    user_repo: UserRepository,
    auth_service: AuthService,
    metrics: AccountMetrics,
}

impl AccountService {
    #[must_use]
    pub fn new(pool: DbPool, user_repo: UserRepository, auth_service: AuthService) -> Self {
        Self { pool, user_repo, auth_service, metrics: AccountMetrics::new() }
    }

    /// Creates the user and signs them in.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` for an invalid email or short password and
    /// `AppError::Conflict` when the email is taken.
    #[tracing::instrument(skip(self, email, password), fields(user.id = tracing::field::Empty), err(level = "warn"))]
    pub async fn register(&self, email: String, password: String) -> Result<AuthSession> {
        validate_email(&email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        let password_hash = self.auth_service.hash_password(&password).await?;

        let mut tx = self.pool.begin().await?;

        if self.user_repo.find_by_email(&mut tx, &email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let user = self.user_repo.create(&mut tx, &email, &password_hash).await?;
        tracing::Span::current().record("user.id", tracing::field::display(user.id));

        let session = self.auth_service.create_session(&mut tx, &user).await?;
        tx.commit().await?;

        tracing::info!("User registered successfully");
        self.metrics.users_registered_total.add(1, &[]);

        Ok(session)
    }

    /// # Errors
    /// Returns `AppError::AuthError` for an unknown email or wrong password.
    #[tracing::instrument(skip(self, email, password), fields(user.id = tracing::field::Empty), err(level = "warn"))]
    pub async fn login(&self, email: String, password: String) -> Result<AuthSession> {
        let mut conn = self.pool.acquire().await?;
        let Some(user) = self.user_repo.find_by_email(&mut conn, &email).await? else {
            tracing::warn!("Login failed: user not found");
            return Err(AppError::AuthError);
        };

        tracing::Span::current().record("user.id", tracing::field::display(user.id));

        if !self.auth_service.verify_password(&password, &user.password_hash).await? {
            tracing::warn!("Login failed: invalid password");
            return Err(AppError::AuthError);
        }

        let session = self.auth_service.create_session(&mut conn, &user).await?;

        tracing::info!("User logged in successfully");
        self.metrics.login_total.add(1, &[]);

        Ok(session)
    }

    /// Exchanges a refresh token for a new token pair. The presented token cannot be used again.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` if the token is invalid, reused, expired, or its user is gone.
    #[tracing::instrument(skip(self, refresh_token), err(level = "warn"))]
    pub async fn refresh(&self, refresh_token: String) -> Result<AuthSession> {
        let mut tx = self.pool.begin().await?;

        let (user_id, rotated) = self.auth_service.rotate_refresh_token(&mut tx, &refresh_token).await?;
        let user = self.user_repo.find_by_id(&mut tx, user_id).await?.ok_or(AppError::AuthError)?;
        let session = self.auth_service.reissue(&user, rotated)?;

        tx.commit().await?;

        tracing::info!("Tokens rotated successfully");
        Ok(session)
    }

    /// Revokes every refresh token the user holds.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the revocation fails.
    #[tracing::instrument(skip(self), fields(user.id = %user_id), err)]
    pub async fn logout(&self, user_id: Uuid) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let revoked = self.auth_service.revoke_all(&mut conn, user_id).await?;
        tracing::info!(revoked, "User logged out");
        self.metrics.logout_total.add(1, &[]);
        Ok(())
    }

    /// # Errors
    /// Returns `AppError::AuthError` if the user no longer exists.
    #[tracing::instrument(skip(self), fields(user.id = %user_id), err(level = "warn"))]
    pub async fn profile(&self, user_id: Uuid) -> Result<User> {
        let mut conn = self.pool.acquire().await?;
        self.user_repo.find_by_id(&mut conn, user_id).await?.ok_or(AppError::AuthError)
    }

    /// Applies a partial update to the user's own account. An absent email leaves it unchanged.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` for an invalid email, `AppError::Conflict` when another
    /// account already uses it, and `AppError::AuthError` if the user no longer exists.
    #[tracing::instrument(skip(self, email), fields(user.id = %user_id), err(level = "warn"))]
    pub async fn update_profile(&self, user_id: Uuid, email: Option<String>) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let user = match email {
            Some(email) => {
                validate_email(&email)?;
                if self.user_repo.find_by_email(&mut tx, &email).await?.is_some_and(|other| other.id != user_id) {
                    return Err(AppError::Conflict("Email is already registered".to_string()));
                }
                self.user_repo.update_email(&mut tx, user_id, &email).await?
            }
            None => self.user_repo.find_by_id(&mut tx, user_id).await?,
        }
        .ok_or(AppError::AuthError)?;

        tx.commit().await?;

        tracing::info!("Profile updated");
        Ok(user)
    }
}

/// Accepts `local@domain.tld`-shaped addresses without whitespace.
fn validate_email(email: &str) -> Result<()> {
    let invalid = || AppError::BadRequest("Please enter a valid email".to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}
