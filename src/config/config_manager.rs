// ==========================================
// Dual Meet APS - config manager
// ==========================================
// Load / query / override of config_kv entries
// ==========================================

use crate::config::pairing_config_trait::PairingConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::settings::{MatSettings, PairingSettings};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Wraps an existing connection; PRAGMAs are re-applied (idempotent)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// Raw value of a global key
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// All global keys as a JSON object, sorted by key
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// Parsed value of a key; a missing or malformed value yields `default`
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy + std::fmt::Debug,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key, value = %raw, default = ?default, "malformed config value, using default");
                    Ok(default)
                }
            },
        }
    }
}

impl PairingConfigReader for ConfigManager {
    fn pairing_defaults(&self) -> Result<PairingSettings, Box<dyn Error>> {
        let d = PairingSettings::default();
        Ok(PairingSettings {
            max_age_gap_days: self.get_parsed_or_default(config_keys::MAX_AGE_GAP_DAYS, d.max_age_gap_days)?,
            max_weight_diff_pct: self
                .get_parsed_or_default(config_keys::MAX_WEIGHT_DIFF_PCT, d.max_weight_diff_pct)?,
            first_year_only_with_first_year: self.get_parsed_or_default(
                config_keys::FIRST_YEAR_ONLY_WITH_FIRST_YEAR,
                d.first_year_only_with_first_year,
            )?,
            allow_same_team_matches: self
                .get_parsed_or_default(config_keys::ALLOW_SAME_TEAM_MATCHES, d.allow_same_team_matches)?,
            matches_per_wrestler: self
                .get_parsed_or_default(config_keys::MATCHES_PER_WRESTLER, d.matches_per_wrestler)?,
            max_matches_per_wrestler: self
                .get_parsed_or_default(config_keys::MAX_MATCHES_PER_WRESTLER, d.max_matches_per_wrestler)?,
            preserve_mats: self.get_parsed_or_default(config_keys::PRESERVE_MATS, d.preserve_mats)?,
        })
    }

    fn mat_defaults(&self) -> Result<MatSettings, Box<dyn Error>> {
        let d = MatSettings::default();
        Ok(MatSettings {
            num_mats: self.get_parsed_or_default(config_keys::NUM_MATS, d.num_mats)?,
            min_rest_bouts: self.get_parsed_or_default(config_keys::MIN_REST_BOUTS, d.min_rest_bouts)?,
            rest_penalty: self.get_parsed_or_default(config_keys::REST_PENALTY, d.rest_penalty)?,
        })
    }
}

// ==========================================
// config keys
// ==========================================
pub mod config_keys {
    // pairing
    pub const MAX_AGE_GAP_DAYS: &str = "max_age_gap_days";
    pub const MAX_WEIGHT_DIFF_PCT: &str = "max_weight_diff_pct";
    pub const FIRST_YEAR_ONLY_WITH_FIRST_YEAR: &str = "first_year_only_with_first_year";
    pub const ALLOW_SAME_TEAM_MATCHES: &str = "allow_same_team_matches";
    pub const MATCHES_PER_WRESTLER: &str = "matches_per_wrestler";
    pub const MAX_MATCHES_PER_WRESTLER: &str = "max_matches_per_wrestler";
    pub const PRESERVE_MATS: &str = "preserve_mats";

    // mats
    pub const NUM_MATS: &str = "num_mats";
    pub const MIN_REST_BOUTS: &str = "min_rest_bouts";
    pub const REST_PENALTY: &str = "rest_penalty";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meet::Meet;
    use chrono::NaiveDate;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let cfg = setup();
        let p = cfg.pairing_defaults().unwrap();
        assert_eq!(p.max_age_gap_days, 365);
        assert_eq!(p.matches_per_wrestler, 2);
        assert!(p.first_year_only_with_first_year);

        let m = cfg.mat_defaults().unwrap();
        assert_eq!(m.num_mats, 3);
        assert_eq!(m.min_rest_bouts, 4);
    }

    #[test]
    fn test_override_and_malformed_fallback() {
        let cfg = setup();
        cfg.set_value(config_keys::MAX_AGE_GAP_DAYS, "180").unwrap();
        cfg.set_value(config_keys::MATCHES_PER_WRESTLER, "lots").unwrap();
        cfg.set_value(config_keys::ALLOW_SAME_TEAM_MATCHES, "true").unwrap();

        let p = cfg.pairing_defaults().unwrap();
        assert_eq!(p.max_age_gap_days, 180);
        assert_eq!(p.matches_per_wrestler, 2);
        assert!(p.allow_same_team_matches);

        // upsert replaces
        cfg.set_value(config_keys::MAX_AGE_GAP_DAYS, "200").unwrap();
        assert_eq!(cfg.pairing_defaults().unwrap().max_age_gap_days, 200);
    }

    #[test]
    fn test_meet_overrides_match_cap() {
        let cfg = setup();
        let mut meet = Meet::new("Dual", NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(), None);
        meet.max_matches_per_wrestler = 5;
        meet.num_mats = 4;

        assert_eq!(cfg.pairing_settings_for(&meet).unwrap().max_matches_per_wrestler, 5);
        assert_eq!(cfg.mat_settings_for(&meet).num_mats, 4);
    }

    #[test]
    fn test_snapshot_is_sorted_json() {
        let cfg = setup();
        cfg.set_value("b_key", "2").unwrap();
        cfg.set_value("a_key", "1").unwrap();
        let snap = cfg.get_config_snapshot().unwrap();
        assert_eq!(snap, r#"{"a_key":"1","b_key":"2"}"#);
    }
}
