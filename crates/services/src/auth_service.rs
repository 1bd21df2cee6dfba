use std::sync::Arc;

use lingo_core::model::{AccessLevel, AdminSecret};
use storage::repository::AccessRepository;
use tokio::sync::Mutex;

/// Admin gate: a single shared secret unlocks question editing.
///
/// See [`AdminSecret`] for why this is not real authentication.
pub struct AuthService {
    secret: AdminSecret,
    repo: Arc<dyn AccessRepository>,
    level: Mutex<AccessLevel>,
}

impl AuthService {
    /// Restore the access level persisted by an earlier run.
    ///
    /// Falls back to `Guest` when the flag cannot be read.
    pub async fn load(secret: AdminSecret, repo: Arc<dyn AccessRepository>) -> Self {
        let level = match repo.load_admin_flag().await {
            Ok(flag) => AccessLevel::from_flag(flag),
            Err(err) => {
                tracing::warn!("Failed to read admin flag, starting as guest: {}", err);
                AccessLevel::Guest
            }
        };

        Self {
            secret,
            repo,
            level: Mutex::new(level),
        }
    }

    /// Unlock admin access if `password` matches the configured secret.
    ///
    /// A wrong password returns `false` and leaves the state and storage as they are.
    pub async fn login(&self, password: &str) -> bool {
        if !self.secret.matches(password) {
            tracing::info!("admin login rejected");
            return false;
        }

        let mut level = self.level.lock().await;
        *level = AccessLevel::Admin;
        if let Err(err) = self.repo.save_admin_flag(true).await {
            tracing::warn!("Failed to persist admin login: {}", err);
        }
        tracing::info!("admin login accepted");
        true
    }

    pub async fn logout(&self) {
        let mut level = self.level.lock().await;
        *level = AccessLevel::Guest;
        if let Err(err) = self.repo.save_admin_flag(false).await {
            tracing::warn!("Failed to clear admin flag: {}", err);
        }
        tracing::info!("admin logged out");
    }

    pub async fn access_level(&self) -> AccessLevel {
        *self.level.lock().await
    }

    pub async fn is_admin(&self) -> bool {
        self.access_level().await.is_admin()
    }
}
