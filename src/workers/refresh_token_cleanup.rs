use crate::error::AppError;
use crate::storage::DbPool;
use crate::storage::refresh_token_repo::RefreshTokenRepository;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

/// Periodically deletes refresh tokens whose expiry has passed. Rotated and revoked
/// tokens are deleted at use time, so only expired ones accumulate.
#[derive(Debug)]
pub struct RefreshTokenCleanupWorker {
    pool: DbPool,
    repo: RefreshTokenRepository,
    every: Option<Duration>,
}

impl RefreshTokenCleanupWorker {
    /// An interval of zero seconds disables the sweep.
    #[must_use]
    pub fn new(pool: DbPool, repo: RefreshTokenRepository, interval_secs: u64) -> Self {
        let every = (interval_secs > 0).then(|| Duration::from_secs(interval_secs));
        Self { pool, repo, every }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let Some(every) = self.every else {
            tracing::info!("expired refresh token sweep disabled");
            return;
        };

        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let sweep = self.sweep().instrument(tracing::info_span!("refresh_token_sweep"));
                    if let Err(e) = sweep.await {
                        tracing::error!(error = %e, "expired refresh token sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("expired refresh token sweep stopped");
    }

    /// Returns the number of tokens removed.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the delete fails.
    pub async fn sweep(&self) -> Result<u64, AppError> {
        let mut conn = self.pool.acquire().await?;
        let removed = self.repo.delete_expired(&mut conn).await?;
        if removed > 0 {
            tracing::info!(removed, "removed expired refresh tokens");
        } else {
            tracing::debug!("no expired refresh tokens");
        }
        Ok(removed)
    }
}
