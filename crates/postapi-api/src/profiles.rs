use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use postapi_db::DbError;
use postapi_db::models::ProfileRow;
use postapi_types::api::{ProfileRequest, ProfileResponse};

use crate::auth::{AppState, with_db};
use crate::error::ApiError;
use crate::middleware::AuthUser;

const MAX_DESCRIPTION_LEN: usize = 500;

fn profile_response(row: ProfileRow) -> ProfileResponse {
    ProfileResponse {
        username: row.username,
        description: row.description,
        profile_picture: row.profile_picture,
    }
}

fn validate_profile(description: &str, profile_picture: &str) -> Result<(), ApiError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::BadRequest(format!(
            "description must be at most {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    if !profile_picture.is_empty()
        && !(profile_picture.starts_with("http://") || profile_picture.starts_with("https://"))
    {
        return Err(ApiError::BadRequest("profile_picture must be an http(s) URL".into()));
    }
    Ok(())
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = with_db(&state, move |db| Ok(db.get_profile(&username)?))
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    Ok(Json(profile_response(profile)))
}

pub async fn create_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_profile(&req.description, &req.profile_picture)?;

    let profile = with_db(&state, move |db| {
        db.create_profile(&user.username, &req.description, &req.profile_picture)
            .map_err(|e| match e {
                DbError::Conflict(_) => ApiError::Conflict("profile already exists".into()),
                DbError::NotFound => ApiError::NotFound("User not found".into()),
                other => other.into(),
            })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(profile_response(profile))))
}

/// Empty fields keep their stored value.
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_profile(&req.description, &req.profile_picture)?;

    let profile = with_db(&state, move |db| {
        let current = db
            .get_profile(&user.username)?
            .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

        let description = if req.description.is_empty() {
            current.description
        } else {
            req.description
        };
        let profile_picture = if req.profile_picture.is_empty() {
            current.profile_picture
        } else {
            req.profile_picture
        };

        if !db.update_profile(&user.username, &description, &profile_picture)? {
            return Err(ApiError::NotFound("Profile not found".into()));
        }

        Ok(ProfileRow {
            username: user.username,
            description,
            profile_picture,
        })
    })
    .await?;

    Ok(Json(profile_response(profile)))
}
