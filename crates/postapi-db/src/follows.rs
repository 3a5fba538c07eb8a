use crate::models::UserRow;
use crate::users::user_from_row;
use crate::{Database, Result};

impl Database {
    /// Fails with `Invalid` on a self-follow, `NotFound` when either user is
    /// missing and `Conflict` when the follow already exists.
    pub fn follow(&self, follower: &str, followed: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_follows (follower_username, followed_username) VALUES (?1, ?2)",
                (follower, followed),
            )?;
            Ok(())
        })
    }

    /// Returns false when `follower` was not following `followed`.
    pub fn unfollow(&self, follower: &str, followed: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM user_follows WHERE follower_username = ?1 AND followed_username = ?2",
                (follower, followed),
            )?;
            Ok(changed > 0)
        })
    }

    /// Users following `username`.
    pub fn get_followers(&self, username: &str) -> Result<Vec<UserRow>> {
        self.query_follow_users(
            "SELECT u.username, u.email, u.password, u.created_at
             FROM user_follows f
             JOIN users u ON u.username = f.follower_username
             WHERE f.followed_username = ?1
             ORDER BY f.created_at, u.username",
            username,
        )
    }

    /// Users that `username` follows.
    pub fn get_following(&self, username: &str) -> Result<Vec<UserRow>> {
        self.query_follow_users(
            "SELECT u.username, u.email, u.password, u.created_at
             FROM user_follows f
             JOIN users u ON u.username = f.followed_username
             WHERE f.follower_username = ?1
             ORDER BY f.created_at, u.username",
            username,
        )
    }

    // JOIN users to fetch details in a single query (no N+1)
    fn query_follow_users(&self, sql: &str, username: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map([username], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbError};

    fn db_with_users() -> Database {
        let db = Database::open_in_memory().unwrap();
        for name in ["alice", "bob", "carol"] {
            db.create_user(name, &format!("{name}@example.com"), "hash").unwrap();
        }
        db
    }

    fn names(rows: Vec<crate::models::UserRow>) -> Vec<String> {
        let mut names: Vec<String> = rows.into_iter().map(|u| u.username).collect();
        names.sort();
        names
    }

    #[test]
    fn follow_lists_both_directions() {
        let db = db_with_users();
        db.follow("alice", "bob").unwrap();
        db.follow("carol", "bob").unwrap();
        db.follow("bob", "alice").unwrap();

        assert_eq!(names(db.get_followers("bob").unwrap()), vec!["alice", "carol"]);
        assert_eq!(names(db.get_following("bob").unwrap()), vec!["alice"]);
        assert!(db.get_following("carol").unwrap().len() == 1);
        assert!(db.get_followers("carol").unwrap().is_empty());
    }

    #[test]
    fn follow_rejections() {
        let db = db_with_users();

        let err = db.follow("alice", "alice").unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));

        let err = db.follow("alice", "nobody").unwrap_err();
        assert!(matches!(err, DbError::NotFound));

        db.follow("alice", "bob").unwrap();
        let err = db.follow("alice", "bob").unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[test]
    fn unfollow_reports_whether_a_follow_existed() {
        let db = db_with_users();
        db.follow("alice", "bob").unwrap();

        assert!(db.unfollow("alice", "bob").unwrap());
        assert!(!db.unfollow("alice", "bob").unwrap());
        assert!(db.get_followers("bob").unwrap().is_empty());
    }
}
