//! Wall service: the post operations as seen by one session.
//!
//! DESIGN
//! ======
//! The store knows nothing about sessions. This layer adds the per-session
//! rules on top: one vote per post per session, the optional login
//! requirement, and the admin-action gate in front of edits.
//!
//! ERROR HANDLING
//! ==============
//! A vote is recorded in the session before the store is touched and
//! rolled back if the store fails, so two concurrent requests from the same
//! session cannot both count.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::model::{self, AdminEdit, Post, PostId};
use crate::services::session::Session;
use crate::state::AppState;
use crate::store::{NewPost, StoreError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WallError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("you already voted for post {0}")]
    AlreadyVoted(PostId),
    #[error("please log in first")]
    LoginRequired,
    #[error("enter the admin password to edit posts")]
    AdminLocked,
    #[error("session expired")]
    SessionExpired,
}

impl ErrorCode for WallError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::AlreadyVoted(_) => "E_ALREADY_VOTED",
            Self::LoginRequired => "E_LOGIN_REQUIRED",
            Self::AdminLocked => "E_ADMIN_LOCKED",
            Self::SessionExpired => "E_SESSION_EXPIRED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// A post plus whether the asking session has voted for it.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub voted: bool,
}

// =============================================================================
// HELPERS
// =============================================================================

fn session(state: &AppState, token: &str) -> Result<Session, WallError> {
    state.sessions.get(token).ok_or(WallError::SessionExpired)
}

fn ensure_login(state: &AppState, session: &Session) -> Result<(), WallError> {
    if state.config.require_login && !session.logged_in {
        return Err(WallError::LoginRequired);
    }
    Ok(())
}

fn log_storage_failure(err: &StoreError, operation: &'static str) {
    if err.is_storage() {
        tracing::error!(error = %err, operation, "post store failure");
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Every post, newest first, flagged with this session's votes.
///
/// Listing stays open even when login is enforced.
///
/// # Errors
///
/// A storage error.
pub async fn list(state: &AppState, token: &str) -> Result<Vec<PostView>, WallError> {
    let session = session(state, token)?;

    let posts = state.store.lock().await.load_all().inspect_err(|e| log_storage_failure(e, "list"))?;
    Ok(model::display_order(posts)
        .into_iter()
        .map(|post| {
            let voted = session.has_voted(post.id);
            PostView { post, voted }
        })
        .collect())
}

/// Submit a new post.
///
/// # Errors
///
/// `LoginRequired` when login is enforced, a validation error for bad input,
/// or a storage error.
pub async fn submit(state: &AppState, token: &str, category: &str, problem: &str) -> Result<Post, WallError> {
    let session = session(state, token)?;
    ensure_login(state, &session)?;
    let new_post = NewPost::new(category, problem)?;

    let post = state
        .store
        .lock()
        .await
        .submit(new_post)
        .inspect_err(|e| log_storage_failure(e, "submit"))?;
    info!(id = post.id, category = post.category.as_str(), "post submitted");
    Ok(post)
}

/// Upvote a post once for this session.
///
/// # Errors
///
/// `AlreadyVoted` if this session voted for `id` before, `NotFound` for an
/// unknown post, `LoginRequired` when login is enforced, or a storage error.
pub async fn vote(state: &AppState, token: &str, id: PostId) -> Result<Post, WallError> {
    let session = session(state, token)?;
    ensure_login(state, &session)?;

    let claimed = state
        .sessions
        .with_session(token, |s| s.voted_post_ids.insert(id))
        .ok_or(WallError::SessionExpired)?;
    if !claimed {
        return Err(WallError::AlreadyVoted(id));
    }

    let result = state.store.lock().await.vote(id);
    match result {
        Ok(post) => Ok(post),
        Err(e) => {
            state.sessions.with_session(token, |s| s.voted_post_ids.remove(&id));
            log_storage_failure(&e, "vote");
            Err(e.into())
        }
    }
}

/// Apply an admin save. The session must have entered the admin-action
/// password first. Ids deleted here are forgotten from this session's votes.
///
/// # Errors
///
/// `AdminLocked` without the admin-action password, otherwise whatever
/// [`crate::store::PostStore::apply_admin_edits`] reports.
pub async fn apply_edits(state: &AppState, token: &str, edits: &[AdminEdit]) -> Result<Vec<Post>, WallError> {
    let session = session(state, token)?;
    if !session.admin_unlocked {
        warn!(edits = edits.len(), "admin edit attempted without unlock");
        return Err(WallError::AdminLocked);
    }

    let remaining = state
        .store
        .lock()
        .await
        .apply_admin_edits(edits)
        .inspect_err(|e| log_storage_failure(e, "admin_edits"))?;

    state.sessions.with_session(token, |s| {
        for edit in edits.iter().filter(|e| e.delete) {
            s.voted_post_ids.remove(&edit.id);
        }
    });
    Ok(model::display_order(remaining))
}

#[cfg(test)]
#[path = "wall_test.rs"]
mod tests;
