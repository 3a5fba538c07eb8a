pub mod auth;
pub mod error;
pub mod follows;
pub mod middleware;
pub mod posts;
pub mod profiles;
pub mod routes;
pub mod token;
pub mod users;

pub use auth::{AppState, AppStateInner};
pub use routes::router;
