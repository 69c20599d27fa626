// ==========================================
// Dual Meet APS - team and mat rule repository
// ==========================================

use crate::domain::team::{MatRule, Team};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// TeamRepository
// ==========================================
pub struct TeamRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TeamRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, team: &Team) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO team (team_id, name, symbol) VALUES (?1, ?2, ?3)",
            params![team.team_id, team.name, team.symbol],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, team_id: &str) -> RepositoryResult<Option<Team>> {
        let conn = self.get_conn()?;
        let team = conn
            .query_row(
                "SELECT team_id, name, symbol FROM team WHERE team_id = ?1",
                params![team_id],
                |row| {
                    Ok(Team {
                        team_id: row.get(0)?,
                        name: row.get(1)?,
                        symbol: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(team)
    }

    /// Mat rules of a team in matIndex order
    pub fn list_mat_rules(&self, team_id: &str) -> RepositoryResult<Vec<MatRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT mat_index, color, min_experience, max_experience, min_age, max_age
            FROM mat_rule
            WHERE team_id = ?1
            ORDER BY mat_index
            "#,
        )?;

        let rules = stmt
            .query_map(params![team_id], |row| {
                Ok(MatRule {
                    mat_index: row.get(0)?,
                    color: row.get(1)?,
                    min_experience: row.get(2)?,
                    max_experience: row.get(3)?,
                    min_age: row.get(4)?,
                    max_age: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<MatRule>>>()?;

        Ok(rules)
    }

    /// Replaces a team's mat rules in one transaction
    pub fn replace_mat_rules(&self, team_id: &str, rules: &[MatRule]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM mat_rule WHERE team_id = ?1", params![team_id])?;
        for rule in rules {
            tx.execute(
                r#"
                INSERT INTO mat_rule (
                    team_id, mat_index, color, min_experience, max_experience, min_age, max_age
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    team_id,
                    rule.mat_index,
                    rule.color,
                    rule.min_experience,
                    rule.max_experience,
                    rule.min_age,
                    rule.max_age,
                ],
            )?;
        }

        tx.commit()?;
        Ok(rules.len())
    }
}
