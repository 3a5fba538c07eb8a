use rusqlite::{OptionalExtension, Row};

use crate::models::PostRow;
use crate::{Database, Result};

const POST_COLUMNS: &str = "id, title, content, author, created_at";

impl Database {
    pub fn create_post(&self, title: &str, content: &str, author: &str) -> Result<PostRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (title, content, author) VALUES (?1, ?2, ?3)",
                (title, content, author),
            )?;
            let id = conn.last_insert_rowid();
            let row = conn.query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                [id],
                post_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                    [id],
                    post_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Only the author can update. Returns the stored row, or `None` when no
    /// post with this id belongs to `author`.
    pub fn update_post(
        &self,
        id: i64,
        author: &str,
        title: &str,
        content: &str,
    ) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "UPDATE posts SET title = ?1, content = ?2 WHERE id = ?3 AND author = ?4 \
                         RETURNING {POST_COLUMNS}"
                    ),
                    rusqlite::params![title, content, id, author],
                    post_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Only the author can delete. Returns false when nothing was removed.
    pub fn delete_post(&self, id: i64, author: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM posts WHERE id = ?1 AND author = ?2",
                rusqlite::params![id, author],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn get_posts_by_author(&self, author: &str) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {POST_COLUMNS} FROM posts WHERE author = ?1 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([author], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbError};

    fn db_with_users() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("alice", "alice@example.com", "hash").unwrap();
        db.create_user("bob", "bob@example.com", "hash").unwrap();
        db
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let db = db_with_users();
        let first = db.create_post("Hello", "World", "alice").unwrap();
        let second = db.create_post("Again", "More", "alice").unwrap();

        assert_eq!(first.author, "alice");
        assert_eq!(first.title, "Hello");
        assert!(second.id > first.id);
        assert_eq!(db.get_post(first.id).unwrap().unwrap(), first);
    }

    #[test]
    fn create_for_unknown_author_is_not_found() {
        let db = db_with_users();
        let err = db.create_post("Hello", "World", "nobody").unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[test]
    fn update_and_delete_require_the_author() {
        let db = db_with_users();
        let post = db.create_post("Hello", "World", "alice").unwrap();

        assert!(db.update_post(post.id, "bob", "Hijacked", "x").unwrap().is_none());
        assert!(!db.delete_post(post.id, "bob").unwrap());
        assert_eq!(db.get_post(post.id).unwrap().unwrap().title, "Hello");

        let updated = db.update_post(post.id, "alice", "Edited", "World").unwrap().unwrap();
        assert_eq!(updated.title, "Edited");
        assert_eq!(updated.created_at, post.created_at);
        assert_eq!(db.get_post(post.id).unwrap().unwrap(), updated);

        assert!(db.delete_post(post.id, "alice").unwrap());
        assert!(db.get_post(post.id).unwrap().is_none());
        assert!(!db.delete_post(post.id, "alice").unwrap());
    }

    #[test]
    fn posts_by_author_only_lists_their_posts() {
        let db = db_with_users();
        db.create_post("a1", "x", "alice").unwrap();
        db.create_post("b1", "x", "bob").unwrap();
        db.create_post("a2", "x", "alice").unwrap();

        let titles: Vec<String> = db
            .get_posts_by_author("alice")
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["a1", "a2"]);
        assert!(db.get_posts_by_author("nobody").unwrap().is_empty());
    }
}
