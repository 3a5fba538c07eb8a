use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::UserRow;
use crate::{Database, Result};

impl Database {
    /// `password_hash` must already be hashed; this layer stores it verbatim.
    pub fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)",
                (username, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, username))
    }
}

fn query_user(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT username, email, password, created_at FROM users WHERE username = ?1",
    )?;

    let row = stmt.query_row([username], user_from_row).optional()?;
    Ok(row)
}

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        username: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        created_at: row.get(3)?,
    })
}
