// ==========================================
// Dual Meet APS - user account repository
// ==========================================
// Read side only matters to the engine (lock holder display names)
// ==========================================

use crate::domain::meet::UserAccount;
use crate::domain::types::UserRole;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, user: &UserAccount) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO users (user_id, display_name, role, team_id) VALUES (?1, ?2, ?3, ?4)",
            params![user.user_id, user.display_name, user.role.as_str(), user.team_id],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, user_id: &str) -> RepositoryResult<Option<UserAccount>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                "SELECT user_id, display_name, role, team_id FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserAccount {
                        user_id: row.get(0)?,
                        display_name: row.get(1)?,
                        role: UserRole::parse(&row.get::<_, String>(2)?),
                        team_id: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Display name, falling back to the raw id for unknown users
    pub fn display_name(&self, user_id: &str) -> RepositoryResult<String> {
        Ok(self
            .find_by_id(user_id)?
            .map(|u| u.display_name)
            .unwrap_or_else(|| user_id.to_string()))
    }
}
