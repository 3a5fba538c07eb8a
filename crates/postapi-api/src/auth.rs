use std::sync::{Arc, OnceLock};

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use regex::Regex;
use tracing::{error, info, warn};

use postapi_db::{Database, DbError};
use postapi_types::api::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};

use crate::error::ApiError;
use crate::token::TokenCodec;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenCodec,
}

const MAX_USERNAME_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 8;

/// Usernames that collide with literal path segments such as `/api/profiles/me`.
const RESERVED_USERNAMES: &[&str] = &["me"];

/// Run blocking work (argon2, SQLite) off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })?
}

pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    blocking(move || f(&state.db)).await
}

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Regex should compile")
    })
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    if req.username.trim().is_empty() {
        return Err(ApiError::BadRequest("username required".into()));
    }
    if RESERVED_USERNAMES
        .iter()
        .any(|reserved| req.username.eq_ignore_ascii_case(reserved))
    {
        return Err(ApiError::BadRequest(format!(
            "username {} is reserved",
            req.username
        )));
    }
    if req.username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if !email_regex().is_match(&req.email) {
        return Err(ApiError::BadRequest("invalid email format".into()));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_registration(&req)?;

    // Hash password with Argon2id
    let password = req.password;
    let password_hash = blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!("Password hashing failed: {}", e);
                ApiError::Internal
            })
    })
    .await?;

    let username = req.username.clone();
    let email = req.email.clone();
    with_db(&state, move |db| {
        db.create_user(&username, &email, &password_hash)
            .map_err(|e| match e {
                DbError::Conflict(_) => {
                    ApiError::Conflict("username or email already taken".into())
                }
                other => other.into(),
            })
    })
    .await?;

    info!("Registered user {}", req.username);
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            username: req.username,
            email: req.email,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.clone();
    let user = with_db(&state, move |db| Ok(db.get_user(&username)?))
        .await?
        .ok_or_else(|| {
            warn!("Login failed: unknown user {}", req.username);
            ApiError::Unauthorized("Invalid credentials")
        })?;

    // Verify password
    let stored = user.password.clone();
    let password = req.password;
    blocking(move || {
        let parsed_hash = PasswordHash::new(&stored).map_err(|e| {
            error!("Stored password hash is unreadable: {}", e);
            ApiError::Internal
        })?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| ApiError::Unauthorized("Invalid credentials"))
    })
    .await
    .inspect_err(|_| warn!("Login failed for {}", user.username))?;

    let token = state.tokens.issue(&user.username).map_err(|e| {
        error!("Cannot create token: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(LoginResponse {
        user: UserResponse {
            username: user.username,
            email: user.email,
        },
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn registration_validation() {
        assert!(validate_registration(&request("alice", "alice@example.com", "password1")).is_ok());

        for bad in [
            request("", "alice@example.com", "password1"),
            request("   ", "alice@example.com", "password1"),
            request("me", "me@example.com", "password1"),
            request("ME", "me@example.com", "password1"),
            request(&"a".repeat(33), "alice@example.com", "password1"),
            request("alice", "alice@example.com", "short"),
            request("alice", "not-an-email", "password1"),
            request("alice", "alice@nodot", "password1"),
            request("alice", "a b@example.com", "password1"),
        ] {
            let err = validate_registration(&bad).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{bad:?}");
        }
    }
}
