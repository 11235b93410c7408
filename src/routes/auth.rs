//! Session cookie plumbing and the login / logout / sign-up routes.

use axum::extract::{FromRef, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::routes::{auth_error_response, session_expired_response};
use crate::services::auth::{self as auth_svc, Role};
use crate::services::session::SessionView;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "voicewall_session";

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn cleared_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// SESSION MIDDLEWARE + EXTRACTOR
// =============================================================================

/// Token of the session serving this request, placed in request extensions
/// by [`ensure_session`].
#[derive(Debug, Clone)]
struct SessionToken(String);

/// Attach a live session to every request, starting a new one (and setting
/// its cookie) when the client has none or its old one expired.
pub async fn ensure_session(State(state): State<AppState>, jar: CookieJar, mut req: Request, next: Next) -> Response {
    let existing = jar
        .get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|token| !token.is_empty() && state.sessions.touch(token))
        .map(str::to_owned);

    let (token, fresh) = match existing {
        Some(token) => (token, false),
        None => (state.sessions.create(), true),
    };
    req.extensions_mut().insert(SessionToken(token.clone()));

    let response = next.run(req).await;
    if fresh {
        tracing::debug!("new session started");
        let jar = CookieJar::new().add(session_cookie(token, state.config.cookie_secure));
        (jar, response).into_response()
    } else {
        response
    }
}

/// The caller's session. Use as a handler parameter.
pub struct CurrentSession {
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for CurrentSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .extensions
            .get::<SessionToken>()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
        Ok(Self { token: token.0.clone() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignUpBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /api/auth/me`: the caller's session.
pub async fn me(State(state): State<AppState>, current: CurrentSession) -> Result<Json<SessionView>, Response> {
    state
        .sessions
        .get(&current.token)
        .map(|session| Json(session.view()))
        .ok_or_else(session_expired_response)
}

/// `POST /api/auth/login`: log in as one of the fixed accounts.
pub async fn login(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(body): Json<LoginBody>,
) -> Result<Json<SessionView>, Response> {
    let credentials = &state.config.credentials;
    let outcome = state
        .sessions
        .with_session(&current.token, |session| {
            auth_svc::login(credentials, session, &body.username, &body.password).map(|_| session.view())
        })
        .ok_or_else(session_expired_response)?;

    match outcome {
        Ok(view) => {
            tracing::info!(user = view.current_user.map(Role::as_str), "login succeeded");
            Ok(Json(view))
        }
        Err(e) => {
            tracing::warn!(username = %body.username, error = %e, "login failed");
            Err(auth_error_response(&e))
        }
    }
}

/// `POST /api/auth/logout`: end the session and clear the cookie.
pub async fn logout(State(state): State<AppState>, current: CurrentSession) -> impl IntoResponse {
    state.sessions.remove(&current.token);
    let jar = CookieJar::new().add(cleared_cookie(state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

/// `POST /api/auth/signup`: simulated registration; creates no account.
pub async fn sign_up(Json(body): Json<SignUpBody>) -> Result<(StatusCode, Json<auth_svc::SignUpAck>), Response> {
    auth_svc::sign_up(&body.username, &body.email, &body.password)
        .map(|ack| (StatusCode::ACCEPTED, Json(ack)))
        .map_err(|e| auth_error_response(&e))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
