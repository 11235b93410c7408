//! Per-client session state and the in-memory registry that owns it.
//!
//! ARCHITECTURE
//! ============
//! Every client gets its own `Session`, keyed by an opaque random token that
//! travels in a cookie. Nothing here is persisted: a restart forgets every
//! login and every recorded vote.
//!
//! LIFECYCLE
//! =========
//! Sessions are created on first contact, torn down on logout, and dropped
//! by `sweep_expired` once idle for longer than the configured window.
//! Reading or mutating a session refreshes its idle clock.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;

use crate::model::PostId;
use crate::services::auth::Role;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone)]
pub struct Session {
    pub logged_in: bool,
    pub current_user: Option<Role>,
    /// Posts this session has already upvoted.
    pub voted_post_ids: HashSet<PostId>,
    /// The admin-action password was entered in this session.
    pub admin_unlocked: bool,
    last_seen: Instant,
}

impl Session {
    pub(crate) fn new(now: Instant) -> Self {
        Self { logged_in: false, current_user: None, voted_post_ids: HashSet::new(), admin_unlocked: false, last_seen: now }
    }

    pub fn log_in(&mut self, role: Role) {
        self.logged_in = true;
        self.current_user = Some(role);
    }

    #[must_use]
    pub fn has_voted(&self, id: PostId) -> bool {
        self.voted_post_ids.contains(&id)
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        let mut voted_post_ids: Vec<PostId> = self.voted_post_ids.iter().copied().collect();
        voted_post_ids.sort_unstable();
        SessionView {
            logged_in: self.logged_in,
            current_user: self.current_user,
            admin_unlocked: self.admin_unlocked,
            voted_post_ids,
        }
    }
}

/// What a client may see of its own session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub logged_in: bool,
    pub current_user: Option<Role>,
    pub admin_unlocked: bool,
    pub voted_post_ids: Vec<PostId>,
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<String, Session>>>,
    idle: Duration,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), idle }
    }

    /// Start a fresh, logged-out session and return its token.
    #[must_use]
    pub fn create(&self) -> String {
        self.create_at(Instant::now())
    }

    fn create_at(&self, now: Instant) -> String {
        let token = generate_token();
        self.lock().insert(token.clone(), Session::new(now));
        token
    }

    /// True if `token` names a live session. Refreshes its idle clock.
    #[must_use]
    pub fn touch(&self, token: &str) -> bool {
        self.with_session(token, |_| ()).is_some()
    }

    /// Snapshot of a live session.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<Session> {
        self.with_session(token, |session| session.clone())
    }

    /// Run `f` against a live session. Returns `None` if the token is
    /// unknown or idle past the window (in which case it is dropped).
    pub fn with_session<R>(&self, token: &str, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.with_session_at(token, Instant::now(), f)
    }

    fn with_session_at<R>(&self, token: &str, now: Instant, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.lock();
        let expired = {
            let session = sessions.get(token)?;
            now.saturating_duration_since(session.last_seen) > self.idle
        };
        if expired {
            sessions.remove(token);
            return None;
        }
        let session = sessions.get_mut(token)?;
        session.last_seen = now;
        Some(f(session))
    }

    /// Tear a session down. Returns whether it existed.
    pub fn remove(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }

    /// Drop every idle session. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| now.saturating_duration_since(s.last_seen) <= self.idle);
        before - sessions.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Periodically drop idle sessions. Returns a handle for shutdown.
pub fn spawn_sweeper(registry: SessionRegistry, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = registry.sweep_expired();
            if removed > 0 {
                tracing::debug!(removed, remaining = registry.len(), "idle sessions swept");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
