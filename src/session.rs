use std::time::Duration;

use moka::future::Cache;
use service::UserId;
use tracing::debug;
use uuid::Uuid;

/// In-process session tokens, mapping an opaque bearer token to a user.
///
/// Tokens expire after sitting unused for the configured idle time. They are
/// not persisted, so a restart logs everybody out.
#[derive(Clone, Debug)]
pub struct SessionStore {
    tokens: Cache<String, UserId>,
}

impl SessionStore {
    pub fn new(capacity: u64, idle_ttl: Duration) -> Self {
        let tokens = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle_ttl)
            .build();
        Self { tokens }
    }

    /// Issues a fresh token for `user`.
    pub async fn open(&self, user: UserId) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), user).await;
        debug!("Opened session for {}", user);
        token
    }

    pub async fn resolve(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).await
    }

    /// Forgets a token. Returns false when it was unknown or already expired.
    pub async fn close(&self, token: &str) -> bool {
        self.tokens.remove(token).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_resolve_close() {
        let store = SessionStore::new(10, Duration::from_secs(60));
        let first = store.open(UserId(1)).await;
        let second = store.open(UserId(1)).await;
        assert_ne!(first, second);

        assert_eq!(store.resolve(&first).await, Some(UserId(1)));
        assert!(store.close(&first).await);
        assert_eq!(store.resolve(&first).await, None);
        assert!(!store.close(&first).await);
        assert_eq!(store.resolve(&second).await, Some(UserId(1)));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let store = SessionStore::new(10, Duration::from_secs(60));
        assert_eq!(store.resolve("not-a-token").await, None);
    }
}
