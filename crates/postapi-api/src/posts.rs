use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use postapi_db::models::PostRow;
use postapi_types::api::{PostRequest, PostResponse};

use crate::auth::{AppState, with_db};
use crate::error::ApiError;
use crate::middleware::AuthUser;

const MAX_TITLE_LEN: usize = 200;
const MAX_CONTENT_LEN: usize = 10_000;

fn post_response(row: PostRow) -> PostResponse {
    PostResponse {
        id: row.id,
        title: row.title,
        content: row.content,
        author: row.author,
    }
}

fn parse_post_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid ID {}", raw)))
}

fn validate_post(title: &str, content: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(ApiError::BadRequest("title and content are required".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::BadRequest(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(ApiError::BadRequest(format!(
            "content must be at most {} characters",
            MAX_CONTENT_LEN
        )));
    }
    Ok(())
}

pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<PostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_post(&req.title, &req.content)?;

    let post = with_db(&state, move |db| {
        Ok(db.create_post(&req.title, &req.content, &user.username)?)
    })
    .await?;

    info!("Post {} created by {}", post.id, post.author);
    Ok((StatusCode::CREATED, Json(post_response(post))))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&post_id)?;

    let post = with_db(&state, move |db| Ok(db.get_post(id)?))
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    Ok(Json(post_response(post)))
}

/// Empty fields keep their stored value. Only the author may update.
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    user: AuthUser,
    Json(req): Json<PostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&post_id)?;

    let post = with_db(&state, move |db| {
        // Someone else's post looks exactly like a missing one.
        let current = db
            .get_post(id)?
            .filter(|post| post.author == user.username)
            .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

        let title = if req.title.is_empty() { current.title } else { req.title };
        let content = if req.content.is_empty() { current.content } else { req.content };
        validate_post(&title, &content)?;

        db.update_post(id, &user.username, &title, &content)?
            .ok_or_else(|| ApiError::NotFound("Post not found".into()))
    })
    .await?;

    Ok(Json(post_response(post)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_post_id(&post_id)?;

    let deleted = with_db(&state, move |db| Ok(db.delete_post(id, &user.username)?)).await?;
    if !deleted {
        return Err(ApiError::NotFound("Post not found".into()));
    }

    info!("Post {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = with_db(&state, move |db| Ok(db.get_posts_by_author(&username)?)).await?;

    Ok(Json(posts.into_iter().map(post_response).collect::<Vec<_>>()))
}
