//! Post routes: list, submit, vote.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};
use serde::{Deserialize, Serialize};

use crate::model::{Category, Post, PostId, Status};
use crate::routes::auth::CurrentSession;
use crate::routes::wall_error_response;
use crate::services::wall::{self, PostView};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubmitBody {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub problem: String,
}

#[derive(Serialize)]
pub struct OptionsResponse {
    pub categories: Vec<&'static str>,
    pub statuses: Vec<&'static str>,
}

/// `GET /api/options`: the fixed category and status vocabularies.
pub async fn options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        categories: Category::ALL.iter().map(|c| c.as_str()).collect(),
        statuses: Status::ALL.iter().map(|s| s.as_str()).collect(),
    })
}

/// `GET /api/posts`: all posts, newest first.
pub async fn list_posts(State(state): State<AppState>, current: CurrentSession) -> Result<Json<Vec<PostView>>, Response> {
    wall::list(&state, &current.token)
        .await
        .map(Json)
        .map_err(wall_error_response)
}

/// `POST /api/posts`: submit a new post.
pub async fn create_post(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(body): Json<SubmitBody>,
) -> Result<(StatusCode, Json<Post>), Response> {
    let post = wall::submit(&state, &current.token, &body.category, &body.problem)
        .await
        .map_err(wall_error_response)?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// `POST /api/posts/:id/vote`: upvote once per session.
pub async fn vote_post(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<PostId>,
) -> Result<Json<Post>, Response> {
    wall::vote(&state, &current.token, id)
        .await
        .map(Json)
        .map_err(wall_error_response)
}

#[cfg(test)]
#[path = "posts_test.rs"]
mod tests;
