// ==========================================
// Dual Meet APS - meet repository
// ==========================================
// Includes the persistence side of the meet edit lock. Lock writes are
// single conditional UPDATEs so two writers can never both succeed.
// ==========================================

use crate::domain::meet::Meet;
use crate::domain::settings::MatSettings;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{fmt_date, fmt_datetime, parse_date, parse_opt_datetime};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

fn map_meet(row: &Row<'_>) -> SqliteResult<Meet> {
    let meet_date: String = row.get(2)?;
    Ok(Meet {
        meet_id: row.get(0)?,
        name: row.get(1)?,
        meet_date: parse_date(2, &meet_date)?,
        home_team_id: row.get(3)?,
        num_mats: row.get(4)?,
        min_rest_bouts: row.get(5)?,
        rest_penalty: row.get(6)?,
        max_matches_per_wrestler: row.get(7)?,
        lock_holder: row.get(8)?,
        locked_at: parse_opt_datetime(9, row.get(9)?)?,
        lock_expires_at: parse_opt_datetime(10, row.get(10)?)?,
        deleted_at: parse_opt_datetime(11, row.get(11)?)?,
    })
}

// ==========================================
// MeetRepository
// ==========================================
pub struct MeetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MeetRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, meet: &Meet) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO meet (
                meet_id, name, meet_date, home_team_id,
                num_mats, min_rest_bouts, rest_penalty, max_matches_per_wrestler,
                lock_holder, locked_at, lock_expires_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                meet.meet_id,
                meet.name,
                fmt_date(meet.meet_date),
                meet.home_team_id,
                meet.num_mats,
                meet.min_rest_bouts,
                meet.rest_penalty,
                meet.max_matches_per_wrestler,
                meet.lock_holder,
                meet.locked_at.map(fmt_datetime),
                meet.lock_expires_at.map(fmt_datetime),
                meet.deleted_at.map(fmt_datetime),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, meet_id: &str) -> RepositoryResult<Option<Meet>> {
        let conn = self.get_conn()?;
        let meet = conn
            .query_row(
                r#"
                SELECT meet_id, name, meet_date, home_team_id,
                       num_mats, min_rest_bouts, rest_penalty, max_matches_per_wrestler,
                       lock_holder, locked_at, lock_expires_at, deleted_at
                FROM meet
                WHERE meet_id = ?1
                "#,
                params![meet_id],
                map_meet,
            )
            .optional()?;
        Ok(meet)
    }

    pub fn add_team(&self, meet_id: &str, team_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO meet_team (meet_id, team_id) VALUES (?1, ?2)",
            params![meet_id, team_id],
        )?;
        Ok(())
    }

    pub fn list_team_ids(&self, meet_id: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT team_id FROM meet_team WHERE meet_id = ?1 ORDER BY team_id")?;
        let ids = stmt
            .query_map(params![meet_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<String>>>()?;
        Ok(ids)
    }

    pub fn soft_delete(&self, meet_id: &str, now: NaiveDateTime) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE meet SET deleted_at = ?1 WHERE meet_id = ?2 AND deleted_at IS NULL",
            params![fmt_datetime(now), meet_id],
        )?;
        Ok(rows)
    }

    pub fn update_mat_settings(&self, meet_id: &str, settings: &MatSettings) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE meet SET num_mats = ?1, min_rest_bouts = ?2, rest_penalty = ?3 WHERE meet_id = ?4",
            params![settings.num_mats, settings.min_rest_bouts, settings.rest_penalty, meet_id],
        )?;
        Ok(rows)
    }

    // ==========================================
    // edit lock
    // ==========================================

    /// Stamps the lock for `user_id` if it is free, already theirs, or expired
    ///
    /// # Returns
    /// - Ok(true): lock written
    /// - Ok(false): a live lock of another user is in place
    pub fn try_stamp_lock(
        &self,
        meet_id: &str,
        user_id: &str,
        now: NaiveDateTime,
        expires_at: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE meet
            SET lock_holder = ?1,
                locked_at = ?2,
                lock_expires_at = ?3
            WHERE meet_id = ?4
              AND (
                lock_holder IS NULL
                OR lock_holder = ?1
                OR lock_expires_at IS NULL
                OR lock_expires_at <= ?2
              )
            "#,
            params![user_id, fmt_datetime(now), fmt_datetime(expires_at), meet_id],
        )?;
        Ok(rows == 1)
    }

    /// Clears an expired lock so the next attempt starts from Unlocked
    pub fn clear_expired_lock(&self, meet_id: &str, now: NaiveDateTime) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE meet
            SET lock_holder = NULL, locked_at = NULL, lock_expires_at = NULL
            WHERE meet_id = ?1 AND lock_expires_at IS NOT NULL AND lock_expires_at <= ?2
            "#,
            params![meet_id, fmt_datetime(now)],
        )?;
        Ok(rows)
    }

    /// Releases every lock held by the user
    pub fn release_locks_held_by(&self, user_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE meet
            SET lock_holder = NULL, locked_at = NULL, lock_expires_at = NULL
            WHERE lock_holder = ?1
            "#,
            params![user_id],
        )?;
        Ok(rows)
    }
}
