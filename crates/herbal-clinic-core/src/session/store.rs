//! Persisted session storage.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::{Session, SessionResult, UserType, SCHEMA};

/// Device-local store for the signed-in session.
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open store at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> SessionResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Create in-memory store (for testing).
    pub fn open_in_memory() -> SessionResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> SessionResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Replace the stored session.
    pub fn save(&self, session: &Session) -> SessionResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO session (id, access_token, refresh_token, username, user_type, saved_at)
            VALUES (1, ?1, ?2, ?3, ?4, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                username = excluded.username,
                user_type = excluded.user_type,
                saved_at = excluded.saved_at
            "#,
            params![
                session.access_token,
                session.refresh_token,
                session.username,
                session.user_type.as_str(),
            ],
        )?;
        log::debug!("Stored session for {}", session.username);
        Ok(())
    }

    /// Load the stored session, if any.
    pub fn load(&self) -> SessionResult<Option<Session>> {
        let session = self
            .conn
            .query_row(
                "SELECT access_token, refresh_token, username, user_type FROM session WHERE id = 1",
                [],
                |row| {
                    let user_type: String = row.get(3)?;
                    Ok(Session {
                        access_token: row.get(0)?,
                        refresh_token: row.get(1)?,
                        username: row.get(2)?,
                        user_type: UserType::parse(&user_type),
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    /// Forget the stored session (logout). Returns whether one existed.
    pub fn clear(&self) -> SessionResult<bool> {
        let removed = self.conn.execute("DELETE FROM session", [])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_type: UserType) -> Session {
        Session {
            access_token: "acc".into(),
            refresh_token: "ref".into(),
            username: "depo1".into(),
            user_type,
        }
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let store = SessionStore::open_in_memory().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn test_save_replaces_previous() {
        let store = SessionStore::open_in_memory().unwrap();
        store.save(&session(UserType::Clinic)).unwrap();

        let mut next = session(UserType::Logistic);
        next.access_token = "acc2".into();
        store.save(&next).unwrap();

        assert_eq!(store.load().unwrap(), Some(next));
    }

    #[test]
    fn test_clear_logs_out() {
        let store = SessionStore::open_in_memory().unwrap();
        store.save(&session(UserType::Logistic)).unwrap();
        assert!(store.clear().unwrap());
        assert!(store.load().unwrap().is_none());
    }
}
