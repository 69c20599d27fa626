// ==========================================
// Dual Meet APS - application state
// ==========================================
// Owns the shared connection and the API instances built on it
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::MeetApi;
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    ActionLogRepository, BoutRepository, MeetRepository, PairRepository, TeamRepository,
    UserRepository, WrestlerRepository,
};

/// Shared application state
pub struct AppState {
    pub db_path: String,

    pub meet_api: Arc<MeetApi>,

    pub config_manager: Arc<ConfigManager>,

    /// Roster plumbing (teams, users, wrestlers) for callers that seed data
    pub team_repo: Arc<TeamRepository>,
    pub user_repo: Arc<UserRepository>,
    pub wrestler_repo: Arc<WrestlerRepository>,

    pub action_log_repo: Arc<ActionLogRepository>,

    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Opens (or creates) the database, applies the schema and builds the APIs
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "initializing AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("cannot open database {}: {}", db_path, e))?;
        init_schema(&conn).map_err(|e| format!("schema initialization failed: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // repositories
        // ==========================================
        let meet_repo = Arc::new(MeetRepository::new(conn.clone()));
        let wrestler_repo = Arc::new(WrestlerRepository::new(conn.clone()));
        let team_repo = Arc::new(TeamRepository::new(conn.clone()));
        let bout_repo = Arc::new(BoutRepository::new(conn.clone()));
        let pair_repo = Arc::new(PairRepository::new(conn.clone()));
        let user_repo = Arc::new(UserRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("config manager initialization failed: {}", e))?,
        );

        // ==========================================
        // API
        // ==========================================
        let meet_api = Arc::new(MeetApi::new(
            meet_repo,
            wrestler_repo.clone(),
            team_repo.clone(),
            bout_repo,
            pair_repo,
            user_repo.clone(),
            action_log_repo.clone(),
            config_manager.clone(),
        ));

        tracing::info!("AppState ready");

        Ok(Self {
            db_path,
            meet_api,
            config_manager,
            team_repo,
            user_repo,
            wrestler_repo,
            action_log_repo,
            conn,
        })
    }

    /// Shared connection, for callers that need raw access (tests, tooling)
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

/// Database path: `DUAL_MEET_APS_DB_PATH` if set, else the user data dir
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("DUAL_MEET_APS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./dual_meet_aps.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("dual-meet-aps-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("dual-meet-aps");
        }

        // best-effort; opening the database reports a real failure
        std::fs::create_dir_all(&path).ok();
        path = path.join("dual_meet_aps.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_new_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();
        let state = AppState::new(db_path).unwrap();

        let conn = state.connection();
        let conn = conn.lock().unwrap();
        let version = crate::db::read_schema_version(&conn).unwrap();
        assert_eq!(version, Some(crate::db::CURRENT_SCHEMA_VERSION));
    }
}
