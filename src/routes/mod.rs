//! Router assembly and error-to-response translation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every route runs behind the session middleware, so handlers can always
//! extract a `CurrentSession`. Service errors are rendered as a JSON
//! `ErrorBody` with a status chosen here.

pub mod admin;
pub mod auth;
pub mod posts;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ErrorBody, ErrorCode};
use crate::services::auth::AuthError;
use crate::services::wall::WallError;
use crate::state::AppState;
use crate::store::StoreError;

const STORAGE_FAILURE_MESSAGE: &str = "could not access saved posts, please try again later";

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/options", get(posts::options))
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route("/api/posts/{id}/vote", post(posts::vote_post))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/signup", post(auth::sign_up))
        .route("/api/admin/unlock", post(admin::unlock))
        .route("/api/admin/edits", post(admin::save_edits))
        .layer(middleware::from_fn_with_state(state.clone(), auth::ensure_session))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERROR RESPONSES
// =============================================================================

pub(crate) fn error_response(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Response {
    (status, Json(ErrorBody::from_error(err))).into_response()
}

pub(crate) fn wall_error_to_status(err: &WallError) -> StatusCode {
    match err {
        WallError::Store(StoreError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        WallError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        WallError::Store(StoreError::Io(_) | StoreError::Csv(_) | StoreError::Corrupt(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        WallError::AlreadyVoted(_) => StatusCode::CONFLICT,
        WallError::LoginRequired | WallError::AdminLocked => StatusCode::FORBIDDEN,
        WallError::SessionExpired => StatusCode::UNAUTHORIZED,
    }
}

pub(crate) fn auth_error_to_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::MissingLoginFields | AuthError::MissingSignUpFields | AuthError::InvalidEmail(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AuthError::InvalidCredentials | AuthError::InvalidAdminPassword => StatusCode::UNAUTHORIZED,
        AuthError::AdminActionDisabled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Storage failures get a generic message; the detail is only logged.
pub(crate) fn wall_error_response(err: WallError) -> Response {
    let status = wall_error_to_status(&err);
    if let WallError::Store(store_err) = &err {
        if store_err.is_storage() {
            let body = ErrorBody {
                code: store_err.error_code(),
                message: STORAGE_FAILURE_MESSAGE.to_owned(),
                retryable: false,
            };
            return (status, Json(body)).into_response();
        }
    }
    error_response(status, &err)
}

pub(crate) fn auth_error_response(err: &AuthError) -> Response {
    error_response(auth_error_to_status(err), err)
}

pub(crate) fn session_expired_response() -> Response {
    wall_error_response(WallError::SessionExpired)
}

// =============================================================================
// TEST CLIENT
// =============================================================================


#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
