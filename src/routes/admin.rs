//! Admin routes: the admin-action unlock and the bulk edit save.

use axum::extract::State;
use axum::response::{Json, Response};
use serde::{Deserialize, Serialize};

use crate::model::{AdminEdit, Post};
use crate::routes::auth::CurrentSession;
use crate::routes::{auth_error_response, session_expired_response, wall_error_response};
use crate::services::{auth as auth_svc, wall};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UnlockBody {
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditsBody {
    pub edits: Vec<AdminEdit>,
}

#[derive(Serialize)]
pub struct EditsResponse {
    /// Posts left after the save, newest first.
    pub posts: Vec<Post>,
}

/// `POST /api/admin/unlock`: enter the admin-action password.
pub async fn unlock(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(body): Json<UnlockBody>,
) -> Result<Json<serde_json::Value>, Response> {
    let credentials = &state.config.credentials;
    state
        .sessions
        .with_session(&current.token, |session| auth_svc::unlock_admin(credentials, session, &body.password))
        .ok_or_else(session_expired_response)?
        .map_err(|e| {
            tracing::warn!(error = %e, "admin unlock failed");
            auth_error_response(&e)
        })?;

    tracing::info!("admin actions unlocked");
    Ok(Json(serde_json::json!({ "admin_unlocked": true })))
}

/// `POST /api/admin/edits`: apply status changes and deletions.
pub async fn save_edits(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(body): Json<EditsBody>,
) -> Result<Json<EditsResponse>, Response> {
    let posts = wall::apply_edits(&state, &current.token, &body.edits)
        .await
        .map_err(wall_error_response)?;
    Ok(Json(EditsResponse { posts }))
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
