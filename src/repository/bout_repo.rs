// ==========================================
// Dual Meet APS - bout repository
// ==========================================
// Bulk delete / bulk create / per-row (mat, order) updates
// ==========================================

use crate::domain::bout::{Bout, PairKey};
use crate::domain::types::BoutType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row, Transaction};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const BOUT_COLUMNS: &str = "bout_id, meet_id, red_id, green_id, mat, bout_order, bout_type, locked, notes";

fn map_bout(row: &Row<'_>) -> SqliteResult<Bout> {
    Ok(Bout {
        bout_id: row.get(0)?,
        meet_id: row.get(1)?,
        red_id: row.get(2)?,
        green_id: row.get(3)?,
        mat: row.get(4)?,
        order: row.get(5)?,
        bout_type: BoutType::parse(&row.get::<_, String>(6)?),
        locked: row.get::<_, i32>(7)? != 0,
        notes: row.get(8)?,
    })
}

fn insert_in_tx(tx: &Transaction<'_>, bout: &Bout) -> RepositoryResult<()> {
    tx.execute(
        r#"
        INSERT INTO bout (
            bout_id, meet_id, red_id, green_id, mat, bout_order, bout_type, locked, notes
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            bout.bout_id,
            bout.meet_id,
            bout.red_id,
            bout.green_id,
            bout.mat,
            bout.order,
            bout.bout_type.as_str(),
            bout.locked as i32,
            bout.notes,
        ],
    )?;
    Ok(())
}

fn update_schedule_in_tx(tx: &Transaction<'_>, bout: &Bout) -> RepositoryResult<()> {
    tx.execute(
        "UPDATE bout SET mat = ?1, bout_order = ?2 WHERE bout_id = ?3",
        params![bout.mat, bout.order, bout.bout_id],
    )?;
    Ok(())
}

// ==========================================
// BoutRepository
// ==========================================
pub struct BoutRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BoutRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, bout: &Bout) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        insert_in_tx(&tx, bout)?;
        tx.commit()?;
        Ok(())
    }

    pub fn find_by_id(&self, bout_id: &str) -> RepositoryResult<Option<Bout>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM bout WHERE bout_id = ?1", BOUT_COLUMNS);
        let bout = conn.query_row(&sql, params![bout_id], map_bout).optional()?;
        Ok(bout)
    }

    /// Bout of the meet for the unordered pair, whichever side is red
    pub fn find_by_pair(&self, meet_id: &str, pair: &PairKey) -> RepositoryResult<Option<Bout>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM bout
            WHERE meet_id = ?1
              AND ((red_id = ?2 AND green_id = ?3) OR (red_id = ?3 AND green_id = ?2))
            "#,
            BOUT_COLUMNS
        );
        let bout = conn
            .query_row(&sql, params![meet_id, pair.low, pair.high], map_bout)
            .optional()?;
        Ok(bout)
    }

    /// All bouts of a meet ordered by (mat, order)
    pub fn list_by_meet(&self, meet_id: &str) -> RepositoryResult<Vec<Bout>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM bout WHERE meet_id = ?1 ORDER BY mat, bout_order, bout_id",
            BOUT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let bouts = stmt
            .query_map(params![meet_id], map_bout)?
            .collect::<SqliteResult<Vec<Bout>>>()?;
        Ok(bouts)
    }

    /// Regeneration write: drops every bout not in `keep_ids`, inserts
    /// `created`, then writes (mat, order) for `rescheduled`. One transaction.
    ///
    /// # Returns
    /// (deleted, inserted)
    pub fn replace_for_meet(
        &self,
        meet_id: &str,
        keep_ids: &HashSet<String>,
        created: &[Bout],
        rescheduled: &[Bout],
    ) -> RepositoryResult<(usize, usize)> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let existing: Vec<String> = {
            let mut stmt = tx.prepare("SELECT bout_id FROM bout WHERE meet_id = ?1")?;
            let ids = stmt
                .query_map(params![meet_id], |row| row.get::<_, String>(0))?
                .collect::<SqliteResult<Vec<String>>>()?;
            ids
        };

        let mut deleted = 0;
        for id in existing.iter().filter(|id| !keep_ids.contains(*id)) {
            deleted += tx.execute("DELETE FROM bout WHERE bout_id = ?1", params![id])?;
        }

        for bout in created {
            insert_in_tx(&tx, bout)?;
        }
        for bout in rescheduled {
            update_schedule_in_tx(&tx, bout)?;
        }

        tx.commit()?;
        Ok((deleted, created.len()))
    }

    /// Writes (mat, order) of each bout
    pub fn update_schedule(&self, bouts: &[Bout]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for bout in bouts {
            update_schedule_in_tx(&tx, bout)?;
        }
        tx.commit()?;
        Ok(bouts.len())
    }

    pub fn delete_by_meet(&self, meet_id: &str, keep_locked: bool) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = if keep_locked {
            conn.execute("DELETE FROM bout WHERE meet_id = ?1 AND locked = 0", params![meet_id])?
        } else {
            conn.execute("DELETE FROM bout WHERE meet_id = ?1", params![meet_id])?
        };
        Ok(rows)
    }

    pub fn set_locked(&self, bout_id: &str, locked: bool) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE bout SET locked = ?1 WHERE bout_id = ?2",
            params![locked as i32, bout_id],
        )?;
        Ok(rows)
    }

    pub fn update_notes(&self, bout_id: &str, notes: Option<&str>) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE bout SET notes = ?1 WHERE bout_id = ?2",
            params![notes, bout_id],
        )?;
        Ok(rows)
    }
}
