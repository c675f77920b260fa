// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory session registry with idle expiry.
//!
//! Each session sits behind its own async mutex, so transitions on one
//! session are serialized while different sessions never contend. Expired
//! sessions are dropped on lookup and swept on every insert.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tagvault_config::SessionConfig;
use tokio::sync::Mutex;
use tracing::debug;

use crate::session::Session;

/// A shared, lockable session.
pub type SharedSession = Arc<Mutex<Session>>;

struct Slot {
    session: SharedSession,
    /// Milliseconds since the registry epoch.
    last_seen: AtomicU64,
}

/// All live sessions keyed by session id.
pub struct SessionRegistry {
    slots: DashMap<String, Arc<Slot>>,
    idle_timeout: Duration,
    epoch: Instant,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            idle_timeout,
            epoch: Instant::now(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::from_secs(config.idle_timeout_secs))
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn is_expired(&self, slot: &Slot, now_ms: u64) -> bool {
        let idle = now_ms.saturating_sub(slot.last_seen.load(Ordering::Relaxed));
        Duration::from_millis(idle) > self.idle_timeout
    }

    /// Register a session and return its id.
    pub fn insert(&self, session: Session) -> String {
        self.sweep();
        let id = session.id().to_string();
        let slot = Slot {
            session: Arc::new(Mutex::new(session)),
            last_seen: AtomicU64::new(self.now_ms()),
        };
        self.slots.insert(id.clone(), Arc::new(slot));
        id
    }

    /// Look up a live session and mark it as used.
    pub fn get(&self, id: &str) -> Option<SharedSession> {
        let slot = self.slots.get(id).map(|entry| Arc::clone(entry.value()))?;
        let now = self.now_ms();
        if self.is_expired(&slot, now) {
            self.slots.remove(id);
            debug!("session expired on lookup");
            return None;
        }
        slot.last_seen.store(now, Ordering::Relaxed);
        Some(Arc::clone(&slot.session))
    }

    /// Remove a session, returning it if it was present.
    pub fn remove(&self, id: &str) -> Option<SharedSession> {
        self.slots
            .remove(id)
            .map(|(_, slot)| Arc::clone(&slot.session))
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.now_ms();
        let before = self.slots.len();
        self.slots.retain(|_, slot| !self.is_expired(slot, now));
        let removed = before.saturating_sub(self.slots.len());
        if removed > 0 {
            debug!(removed, "expired sessions swept");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AuthState;
    use zeroize::Zeroizing;

    #[tokio::test]
    async fn inserted_session_can_be_found_and_removed() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let id = registry.insert(Session::new());
        let session = registry.get(&id).unwrap();
        assert_eq!(session.lock().await.id(), id);

        assert!(registry.remove(&id).is_some());
        assert!(registry.get(&id).is_none());
        assert!(registry.remove(&id).is_none());
    }

    #[tokio::test]
    async fn sessions_do_not_share_state() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let a = registry.insert(Session::new());
        let b = registry.insert(Session::new());

        registry
            .get(&a)
            .unwrap()
            .lock()
            .await
            .password_verified(1, Zeroizing::new([1; 32]), "A".into())
            .unwrap();

        assert_eq!(registry.get(&a).unwrap().lock().await.state(), AuthState::PasswordVerified);
        assert_eq!(registry.get(&b).unwrap().lock().await.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn idle_session_expires_on_lookup() {
        let registry = SessionRegistry::new(Duration::from_millis(50));
        let id = registry.insert(Session::new());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(registry.get(&id).is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn activity_keeps_session_alive() {
        let registry = SessionRegistry::new(Duration::from_millis(150));
        let id = registry.insert(Session::new());
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(60)).await;
            assert!(registry.get(&id).is_some());
        }
    }

    #[tokio::test]
    async fn insert_sweeps_expired_sessions() {
        let registry = SessionRegistry::new(Duration::from_millis(50));
        registry.insert(Session::new());
        registry.insert(Session::new());
        tokio::time::sleep(Duration::from_millis(120)).await;
        registry.insert(Session::new());
        assert_eq!(registry.len(), 1);
    }
}
