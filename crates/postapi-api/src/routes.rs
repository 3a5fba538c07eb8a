use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{follows, posts, profiles, users};

/// All `/api` routes plus `/health`. Routes that act as the caller sit
/// behind [`require_auth`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/posts/{post_id}", get(posts::get_post))
        .route("/api/users/{username}", get(users::get_user))
        .route("/api/users/{username}/posts", get(posts::get_user_posts))
        .route("/api/users/{username}/followers", get(follows::get_followers))
        .route("/api/users/{username}/following", get(follows::get_following))
        .route("/api/profiles/{username}", get(profiles::get_profile))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/posts", post(posts::create_post))
        .route(
            "/api/posts/{post_id}",
            patch(posts::update_post).delete(posts::delete_post),
        )
        .route("/api/follow/{username}", post(follows::follow))
        .route("/api/unfollow/{username}", delete(follows::unfollow))
        .route(
            "/api/profiles/me",
            post(profiles::create_profile).patch(profiles::update_profile),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
