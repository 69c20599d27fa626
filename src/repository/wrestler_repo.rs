// ==========================================
// Dual Meet APS - wrestler and per-meet status repository
// ==========================================
// Roster & status provider for the pairing engine
// ==========================================

use crate::domain::types::WrestlerStatus;
use crate::domain::wrestler::Wrestler;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{fmt_date, fmt_datetime, parse_date};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const WRESTLER_COLUMNS: &str = "w.wrestler_id, w.team_id, w.first_name, w.last_name, w.birthdate, \
                                w.weight, w.experience_years, w.skill, w.active";

fn map_wrestler(row: &Row<'_>) -> SqliteResult<Wrestler> {
    let birthdate: String = row.get(4)?;
    Ok(Wrestler {
        wrestler_id: row.get(0)?,
        team_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        birthdate: parse_date(4, &birthdate)?,
        weight: row.get(5)?,
        experience_years: row.get(6)?,
        skill: row.get(7)?,
        active: row.get::<_, i32>(8)? != 0,
    })
}

// ==========================================
// WrestlerRepository
// ==========================================
pub struct WrestlerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WrestlerRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, w: &Wrestler) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO wrestler (
                wrestler_id, team_id, first_name, last_name, birthdate,
                weight, experience_years, skill, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                w.wrestler_id,
                w.team_id,
                w.first_name,
                w.last_name,
                fmt_date(w.birthdate),
                w.weight,
                w.experience_years,
                w.skill,
                w.active as i32,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, wrestler_id: &str) -> RepositoryResult<Option<Wrestler>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM wrestler w WHERE w.wrestler_id = ?1", WRESTLER_COLUMNS);
        let wrestler = conn.query_row(&sql, params![wrestler_id], map_wrestler).optional()?;
        Ok(wrestler)
    }

    /// Active wrestlers of every team attached to the meet, by id
    pub fn list_active_for_meet(&self, meet_id: &str) -> RepositoryResult<Vec<Wrestler>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM wrestler w
            JOIN meet_team mt ON mt.team_id = w.team_id
            WHERE mt.meet_id = ?1 AND w.active = 1
            ORDER BY w.wrestler_id
            "#,
            WRESTLER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let wrestlers = stmt
            .query_map(params![meet_id], map_wrestler)?
            .collect::<SqliteResult<Vec<Wrestler>>>()?;
        Ok(wrestlers)
    }

    // ==========================================
    // per-meet status
    // ==========================================

    pub fn set_status(
        &self,
        meet_id: &str,
        wrestler_id: &str,
        status: WrestlerStatus,
        now: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO wrestler_status (meet_id, wrestler_id, status, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(meet_id, wrestler_id) DO UPDATE SET status = ?3, updated_at = ?4
            "#,
            params![meet_id, wrestler_id, status.as_str(), fmt_datetime(now)],
        )?;
        Ok(())
    }

    /// Status of a wrestler for the meet; no row means AVAILABLE
    pub fn get_status(&self, meet_id: &str, wrestler_id: &str) -> RepositoryResult<WrestlerStatus> {
        let conn = self.get_conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT status FROM wrestler_status WHERE meet_id = ?1 AND wrestler_id = ?2",
                params![meet_id, wrestler_id],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            None => Ok(WrestlerStatus::Available),
            Some(s) => WrestlerStatus::parse(&s).ok_or_else(|| RepositoryError::FieldValueError {
                field: "wrestler_status.status".to_string(),
                message: format!("unknown status '{}'", s),
            }),
        }
    }

    /// Ids of wrestlers marked ABSENT or NOT_COMING for the meet
    pub fn list_unavailable_ids(&self, meet_id: &str) -> RepositoryResult<HashSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT wrestler_id FROM wrestler_status WHERE meet_id = ?1 AND status IN ('ABSENT', 'NOT_COMING')",
        )?;
        let ids = stmt
            .query_map(params![meet_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<HashSet<String>>>()?;
        Ok(ids)
    }
}
