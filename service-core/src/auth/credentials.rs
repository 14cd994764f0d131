use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use secrecy::SecretString;

/// Lookup of account-level signing credentials plus nonce bookkeeping for
/// replay protection.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn signing_secret(&self, access_key_id: &str) -> Result<Option<SecretString>, AppError>;

    /// Record `nonce` for `ttl_secs`. Returns `false` if it was already seen
    /// within its window.
    async fn claim_nonce(&self, nonce: &str, ttl_secs: i64) -> Result<bool, AppError>;
}

const NONCE_PRUNE_THRESHOLD: usize = 10_000;

/// In-process credential store, loaded from configuration at startup.
#[derive(Default)]
pub struct StaticCredentialStore {
    secrets: DashMap<String, SecretString>,
    nonces: DashMap<String, i64>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(self, access_key_id: impl Into<String>, secret: SecretString) -> Self {
        self.secrets.insert(access_key_id.into(), secret);
        self
    }

    fn prune_nonces(&self, now: i64) {
        if self.nonces.len() > NONCE_PRUNE_THRESHOLD {
            self.nonces.retain(|_, expires_at| *expires_at >= now);
        }
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn signing_secret(&self, access_key_id: &str) -> Result<Option<SecretString>, AppError> {
        Ok(self.secrets.get(access_key_id).map(|s| s.value().clone()))
    }

    async fn claim_nonce(&self, nonce: &str, ttl_secs: i64) -> Result<bool, AppError> {
        let now = Utc::now().timestamp();
        self.prune_nonces(now);

        let claimed = match self.nonces.entry(nonce.to_string()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() < now {
                    entry.insert(now + ttl_secs);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now + ttl_secs);
                true
            }
        };
        Ok(claimed)
    }
}
