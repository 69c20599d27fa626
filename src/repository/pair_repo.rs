// ==========================================
// Dual Meet APS - excluded / rejected pair repository
// ==========================================
// Both tables are keyed by (meet_id, wrestler_low, wrestler_high)
// ==========================================

use crate::domain::bout::{ExcludedPair, PairKey, RejectReason, RejectedPair};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{fmt_datetime, parse_datetime};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub struct PairRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PairRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // excluded pairs
    // ==========================================

    pub fn insert_excluded(&self, excluded: &ExcludedPair) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO excluded_pair (meet_id, wrestler_low, wrestler_high, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                excluded.meet_id,
                excluded.pair.low,
                excluded.pair.high,
                excluded.created_by,
                fmt_datetime(excluded.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn delete_excluded(&self, meet_id: &str, pair: &PairKey) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM excluded_pair WHERE meet_id = ?1 AND wrestler_low = ?2 AND wrestler_high = ?3",
            params![meet_id, pair.low, pair.high],
        )?;
        Ok(rows)
    }

    pub fn excluded_exists(&self, meet_id: &str, pair: &PairKey) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM excluded_pair WHERE meet_id = ?1 AND wrestler_low = ?2 AND wrestler_high = ?3",
                params![meet_id, pair.low, pair.high],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }

    pub fn list_excluded(&self, meet_id: &str) -> RepositoryResult<Vec<ExcludedPair>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT meet_id, wrestler_low, wrestler_high, created_by, created_at
            FROM excluded_pair
            WHERE meet_id = ?1
            ORDER BY wrestler_low, wrestler_high
            "#,
        )?;
        let rows = stmt
            .query_map(params![meet_id], |row| {
                let created_at: String = row.get(4)?;
                Ok(ExcludedPair {
                    meet_id: row.get(0)?,
                    pair: PairKey {
                        low: row.get(1)?,
                        high: row.get(2)?,
                    },
                    created_by: row.get(3)?,
                    created_at: parse_datetime(4, &created_at)?,
                })
            })?
            .collect::<SqliteResult<Vec<ExcludedPair>>>()?;
        Ok(rows)
    }

    pub fn excluded_key_set(&self, meet_id: &str) -> RepositoryResult<HashSet<PairKey>> {
        Ok(self.list_excluded(meet_id)?.into_iter().map(|e| e.pair).collect())
    }

    // ==========================================
    // rejected pairs
    // ==========================================

    /// Upserts rejections; an existing row for the pair takes the latest run
    pub fn upsert_rejected(&self, rejected: &[RejectedPair], now: NaiveDateTime) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for r in rejected {
            tx.execute(
                r#"
                INSERT INTO rejected_pair (
                    meet_id, wrestler_low, wrestler_high, wrestler_id, reason, run_id, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(meet_id, wrestler_low, wrestler_high) DO UPDATE SET
                    wrestler_id = ?4, reason = ?5, run_id = ?6, created_at = ?7
                "#,
                params![
                    r.meet_id,
                    r.pair.low,
                    r.pair.high,
                    r.wrestler_id,
                    r.reason.as_str(),
                    r.run_id,
                    fmt_datetime(now),
                ],
            )?;
        }

        tx.commit()?;
        Ok(rejected.len())
    }

    pub fn list_rejected(&self, meet_id: &str) -> RepositoryResult<Vec<RejectedPair>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT meet_id, wrestler_low, wrestler_high, wrestler_id, reason, run_id
            FROM rejected_pair
            WHERE meet_id = ?1
            ORDER BY wrestler_id, wrestler_low, wrestler_high
            "#,
        )?;
        let rows = stmt
            .query_map(params![meet_id], |row| {
                Ok(RejectedPair {
                    meet_id: row.get(0)?,
                    pair: PairKey {
                        low: row.get(1)?,
                        high: row.get(2)?,
                    },
                    wrestler_id: row.get(3)?,
                    reason: RejectReason::parse(&row.get::<_, String>(4)?),
                    run_id: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<RejectedPair>>>()?;
        Ok(rows)
    }
}
