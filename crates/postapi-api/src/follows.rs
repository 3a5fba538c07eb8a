use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;

use postapi_db::DbError;
use postapi_types::api::FollowResponse;

use crate::auth::{AppState, with_db};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::users::user_response;

pub async fn follow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    if username == user.username {
        return Err(ApiError::BadRequest("cannot follow yourself".into()));
    }

    let follower = user.username.clone();
    let followed = username.clone();
    with_db(&state, move |db| {
        db.follow(&follower, &followed).map_err(|e| match e {
            DbError::NotFound => ApiError::NotFound("User not found".into()),
            DbError::Conflict(_) => ApiError::Conflict(format!("already following {}", followed)),
            other => other.into(),
        })
    })
    .await?;

    info!("{} now follows {}", user.username, username);
    Ok(Json(FollowResponse {
        follower_username: user.username,
        followed_username: username,
    }))
}

pub async fn unfollow(
    State(state): State<AppState>,
    Path(username): Path<String>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let follower = user.username.clone();
    let followed = username.clone();
    let removed = with_db(&state, move |db| Ok(db.unfollow(&follower, &followed)?)).await?;

    if !removed {
        return Err(ApiError::NotFound(format!("not following {}", username)));
    }

    Ok(Json(FollowResponse {
        follower_username: user.username,
        followed_username: username,
    }))
}

pub async fn get_followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let users = with_db(&state, move |db| Ok(db.get_followers(&username)?)).await?;

    Ok(Json(users.into_iter().map(user_response).collect::<Vec<_>>()))
}

pub async fn get_following(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let users = with_db(&state, move |db| Ok(db.get_following(&username)?)).await?;

    Ok(Json(users.into_iter().map(user_response).collect::<Vec<_>>()))
}
