use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use postapi_db::models::UserRow;
use postapi_types::api::UserResponse;

use crate::auth::{AppState, with_db};
use crate::error::ApiError;

/// Drops the password hash.
pub(crate) fn user_response(row: UserRow) -> UserResponse {
    UserResponse {
        username: row.username,
        email: row.email,
    }
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = with_db(&state, move |db| Ok(db.get_user(&username)?))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(user_response(user)))
}
