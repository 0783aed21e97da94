use crate::models::{FriendRow, LoginCodeRow, MessageRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        name: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        last_seen: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, username, email, password, last_seen)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, name, username, email, password_hash, last_seen),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Friends --

    /// Atomic add-if-absent. Returns true when the friend was newly added,
    /// false when the pair already existed.
    pub fn add_friend(&self, user_id: &str, friend_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO friends (user_id, friend_id) VALUES (?1, ?2)",
                (user_id, friend_id),
            )?;
            Ok(changed > 0)
        })
    }

    /// Resolve a user's friend references to summary profiles.
    pub fn get_friends(&self, user_id: &str) -> Result<Vec<FriendRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.name, u.email, u.profile_pic
                 FROM friends f
                 JOIN users u ON u.id = f.friend_id
                 WHERE f.user_id = ?1",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(FriendRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        profile_pic: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Login codes --

    /// Delete-then-insert under a single lock acquisition: at most one live
    /// code per email, last-issued-wins.
    pub fn replace_login_code(&self, email: &str, code_hash: &str, expires_at: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM login_codes WHERE email = ?1", [email])?;
            conn.execute(
                "INSERT INTO login_codes (email, code_hash, expires_at) VALUES (?1, ?2, ?3)",
                (email, code_hash, expires_at),
            )?;
            Ok(())
        })
    }

    pub fn get_login_code(&self, email: &str) -> Result<Option<LoginCodeRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT email, code_hash, expires_at FROM login_codes WHERE email = ?1",
                    [email],
                    |row| {
                        Ok(LoginCodeRow {
                            email: row.get(0)?,
                            code_hash: row.get(1)?,
                            expires_at: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn delete_login_codes(&self, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM login_codes WHERE email = ?1", [email])?;
            Ok(())
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        id: &str,
        sender_id: &str,
        receiver_id: &str,
        body: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, sender_id, receiver_id, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, sender_id, receiver_id, body, created_at),
            )?;
            Ok(())
        })
    }

    /// All messages between two users, in either direction, ascending by
    /// creation time. Symmetric in its arguments.
    pub fn get_conversation(&self, a: &str, b: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, receiver_id, body, created_at
                 FROM messages
                 WHERE (sender_id = ?1 AND receiver_id = ?2)
                    OR (sender_id = ?2 AND receiver_id = ?1)
                 ORDER BY created_at ASC",
            )?;

            let rows = stmt
                .query_map([a, b], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        sender_id: row.get(1)?,
                        receiver_id: row.get(2)?,
                        body: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, name, username, email, password, profile_pic, about, is_online, last_seen, created_at
         FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                username: row.get(2)?,
                email: row.get(3)?,
                password: row.get(4)?,
                profile_pic: row.get(5)?,
                about: row.get(6)?,
                is_online: row.get(7)?,
                last_seen: row.get(8)?,
                created_at: row.get(9)?,
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use crate::{now_ts, Database};
    use uuid::Uuid;

    fn seed_user(db: &Database, name: &str, username: &str, email: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.create_user(&id, name, username, email, "hash", &now_ts())
            .unwrap();
        id
    }

    #[test]
    fn duplicate_email_is_rejected_by_unique_index() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "Ann", "ann", "a@x.com");

        let id = Uuid::new_v4().to_string();
        let res = db.create_user(&id, "Ann Again", "ann2", "a@x.com", "hash", &now_ts());
        assert!(res.is_err());
    }

    #[test]
    fn lookup_by_email_and_id() {
        let db = Database::open_in_memory().unwrap();
        let id = seed_user(&db, "Ann", "ann", "a@x.com");

        let by_email = db.get_user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(by_email.id, id);
        assert_eq!(by_email.about, "Hey there! I am using Banter.");

        let by_id = db.get_user_by_id(&id).unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");

        assert!(db.get_user_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn friend_add_has_set_semantics() {
        let db = Database::open_in_memory().unwrap();
        let a = seed_user(&db, "Ann", "ann", "a@x.com");
        let b = seed_user(&db, "Bob", "bob", "b@x.com");

        assert!(db.add_friend(&a, &b).unwrap());
        assert!(!db.add_friend(&a, &b).unwrap());

        let friends = db.get_friends(&a).unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].id, b);
        assert_eq!(friends[0].name, "Bob");

        // Directed: Bob's list is untouched.
        assert!(db.get_friends(&b).unwrap().is_empty());
    }

    #[test]
    fn login_code_replacement_leaves_one_live_row() {
        let db = Database::open_in_memory().unwrap();

        db.replace_login_code("a@x.com", "hash-1", 100).unwrap();
        db.replace_login_code("a@x.com", "hash-2", 200).unwrap();

        let row = db.get_login_code("a@x.com").unwrap().unwrap();
        assert_eq!(row.code_hash, "hash-2");
        assert_eq!(row.expires_at, 200);

        db.delete_login_codes("a@x.com").unwrap();
        assert!(db.get_login_code("a@x.com").unwrap().is_none());
    }

    #[test]
    fn conversation_is_symmetric_and_ascending() {
        let db = Database::open_in_memory().unwrap();
        let a = seed_user(&db, "Ann", "ann", "a@x.com");
        let b = seed_user(&db, "Bob", "bob", "b@x.com");

        db.insert_message("m1", &a, &b, "hi", "2026-01-01T00:00:01.000000Z")
            .unwrap();
        db.insert_message("m2", &b, &a, "hey", "2026-01-01T00:00:02.000000Z")
            .unwrap();
        db.insert_message("m3", &a, &b, "how are you", "2026-01-01T00:00:03.000000Z")
            .unwrap();

        let forward = db.get_conversation(&a, &b).unwrap();
        let reverse = db.get_conversation(&b, &a).unwrap();

        let ids = |rows: &[crate::models::MessageRow]| {
            rows.iter().map(|r| r.id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(ids(&forward), vec!["m1", "m2", "m3"]);
        assert_eq!(ids(&forward), ids(&reverse));
    }
}
