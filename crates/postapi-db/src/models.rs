//! Database row types. These map directly to SQLite rows.
//! Distinct from postapi-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRow {
    pub username: String,
    pub description: String,
    pub profile_picture: String,
}
