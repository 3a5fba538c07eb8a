use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            username    TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS posts (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL,
            content     TEXT NOT NULL,
            author      TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_author
            ON posts(author, id);

        CREATE TABLE IF NOT EXISTS user_follows (
            follower_username   TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            followed_username   TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (follower_username, followed_username),
            CHECK (follower_username <> followed_username)
        );

        CREATE INDEX IF NOT EXISTS idx_user_follows_followed
            ON user_follows(followed_username);

        CREATE TABLE IF NOT EXISTS profiles (
            username        TEXT PRIMARY KEY REFERENCES users(username) ON DELETE CASCADE,
            description     TEXT NOT NULL DEFAULT '',
            profile_picture TEXT NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
