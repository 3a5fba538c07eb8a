use rusqlite::OptionalExtension;

use crate::models::ProfileRow;
use crate::{Database, Result};

/// Picture used when a profile is created without one.
pub const DEFAULT_PROFILE_PICTURE: &str = "https://i.redd.it/j6mkb6p73h791.jpg";

impl Database {
    pub fn create_profile(
        &self,
        username: &str,
        description: &str,
        profile_picture: &str,
    ) -> Result<ProfileRow> {
        let picture = if profile_picture.is_empty() {
            DEFAULT_PROFILE_PICTURE
        } else {
            profile_picture
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO profiles (username, description, profile_picture) VALUES (?1, ?2, ?3)",
                (username, description, picture),
            )?;
            Ok(ProfileRow {
                username: username.to_string(),
                description: description.to_string(),
                profile_picture: picture.to_string(),
            })
        })
    }

    pub fn get_profile(&self, username: &str) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT username, description, profile_picture FROM profiles WHERE username = ?1",
                    [username],
                    |row| {
                        Ok(ProfileRow {
                            username: row.get(0)?,
                            description: row.get(1)?,
                            profile_picture: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Returns false when `username` has no profile yet.
    pub fn update_profile(
        &self,
        username: &str,
        description: &str,
        profile_picture: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE profiles SET description = ?2, profile_picture = ?3 WHERE username = ?1",
                (username, description, profile_picture),
            )?;
            Ok(changed > 0)
        })
    }
}
