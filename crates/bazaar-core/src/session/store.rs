use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::UserId;
use crate::session::state::Session;

/// In-memory session store keyed by user id.
///
/// Every mutation of a session happens under its own per-key lock, held for
/// the whole inbound event: duplicate deliveries for one user serialize while
/// unrelated users proceed concurrently. Sessions live for the process
/// lifetime; there is no eviction.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<UserId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    /// Look up (creating with defaults if absent) and exclusively lock the
    /// session for `user`.
    pub async fn lock(&self, user: UserId) -> OwnedMutexGuard<Session> {
        let slot = {
            let mut map = self.inner.lock().await;
            map.entry(user)
                .or_insert_with(|| Arc::new(Mutex::new(Session::default())))
                .clone()
        };
        slot.lock_owned().await
    }

    /// Return the session to defaults in place.
    pub async fn reset(&self, user: UserId) {
        let mut session = self.lock(user).await;
        session.reset();
    }

    /// Drop the entry entirely (profile workflow terminal transitions).
    pub async fn remove(&self, user: UserId) {
        let mut map = self.inner.lock().await;
        map.remove(&user);
    }

    pub async fn contains(&self, user: UserId) -> bool {
        self.inner.lock().await.contains_key(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::{BrowseState, SessionMode};

    #[tokio::test]
    async fn creates_lazily_and_keeps_mutations() {
        let store = SessionStore::default();
        assert!(!store.contains(UserId(1)).await);

        {
            let mut session = store.lock(UserId(1)).await;
            session.mode = SessionMode::Browse(BrowseState::AwaitingCategory);
        }
        assert!(store.contains(UserId(1)).await);

        let session = store.lock(UserId(1)).await;
        assert_eq!(
            session.mode,
            SessionMode::Browse(BrowseState::AwaitingCategory)
        );
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let store = SessionStore::default();
        {
            let mut session = store.lock(UserId(1)).await;
            session.mode = SessionMode::Browse(BrowseState::AwaitingCategory);
        }
        store.reset(UserId(1)).await;

        let session = store.lock(UserId(1)).await;
        assert_eq!(*session, Session::default());
    }

    #[tokio::test]
    async fn distinct_users_lock_independently() {
        let store = SessionStore::default();
        let a = store.lock(UserId(1)).await;
        // Holding user 1's lock must not block user 2.
        let b = store.lock(UserId(2)).await;
        drop(a);
        drop(b);
    }

    #[tokio::test]
    async fn remove_drops_the_entry() {
        let store = SessionStore::default();
        {
            let mut session = store.lock(UserId(1)).await;
            session.mode = SessionMode::Browse(BrowseState::AwaitingCategory);
        }
        store.remove(UserId(1)).await;
        assert!(!store.contains(UserId(1)).await);

        // Recreated fresh on the next event.
        let session = store.lock(UserId(1)).await;
        assert_eq!(*session, Session::default());
    }
}
