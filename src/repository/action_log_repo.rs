// ==========================================
// Dual Meet APS - audit log repository
// ==========================================
// Append-only; nothing here updates or deletes rows
// ==========================================

use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{fmt_datetime, parse_datetime};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Inserts one audit row
    ///
    /// # Returns
    /// - `Ok(action_id)`
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO action_log (
                action_id, meet_id, action_type, action_ts, actor, payload_json, detail
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                log.action_id,
                log.meet_id,
                log.action_type,
                fmt_datetime(log.action_ts),
                log.actor,
                log.payload_json.as_ref().map(|v| v.to_string()),
                log.detail,
            ],
        )?;

        Ok(log.action_id.clone())
    }

    /// Newest first
    pub fn list_by_meet(&self, meet_id: &str, limit: usize) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, meet_id, action_type, action_ts, actor, payload_json, detail
            FROM action_log
            WHERE meet_id = ?1
            ORDER BY action_ts DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let logs = stmt
            .query_map(params![meet_id, limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    pub fn count_by_action_type(&self, action_type: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM action_log WHERE action_type = ?1",
            params![action_type],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn map_row(row: &Row<'_>) -> SqliteResult<ActionLog> {
    let action_ts: String = row.get(3)?;
    let payload: Option<String> = row.get(5)?;
    Ok(ActionLog {
        action_id: row.get(0)?,
        meet_id: row.get(1)?,
        action_type: row.get(2)?,
        action_ts: parse_datetime(3, &action_ts)?,
        actor: row.get(4)?,
        // malformed payloads are dropped rather than failing the whole listing
        payload_json: payload.and_then(|s| serde_json::from_str(&s).ok()),
        detail: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action_log::ActionType;
    use serde_json::json;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_insert_and_list_by_meet() {
        let repo = ActionLogRepository::new(setup_test_db());

        let log = ActionLog::new(
            Some("meet-1"),
            ActionType::GeneratePairings,
            "coach-1",
            Some(json!({ "created": 3 })),
            "generated".to_string(),
        );
        let id = repo.insert(&log).unwrap();
        assert_eq!(id, log.action_id);

        let other = ActionLog::new(None, ActionType::ReleaseLocks, "coach-1", None, "released".to_string());
        repo.insert(&other).unwrap();

        let listed = repo.list_by_meet("meet-1", 10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].action_type, "GENERATE_PAIRINGS");
        assert_eq!(listed[0].payload_json, Some(json!({ "created": 3 })));
    }

    #[test]
    fn test_count_by_action_type() {
        let repo = ActionLogRepository::new(setup_test_db());
        for _ in 0..2 {
            let log = ActionLog::new(Some("m"), ActionType::LockBout, "u", None, String::new());
            repo.insert(&log).unwrap();
        }
        assert_eq!(repo.count_by_action_type("LOCK_BOUT").unwrap(), 2);
        assert_eq!(repo.count_by_action_type("UNLOCK_BOUT").unwrap(), 0);
    }
}
