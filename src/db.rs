// ==========================================
// Dual Meet APS - SQLite connection setup
// ==========================================
// - every connection gets the same PRAGMAs (foreign keys, busy timeout)
// - init_schema is idempotent and stamps schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout in milliseconds
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Timestamp format used for every TEXT datetime column
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format used for every TEXT date column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Applies the shared PRAGMAs
///
/// foreign_keys and busy_timeout are per connection.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Opens a connection and applies the shared PRAGMAs
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Reads schema_version (None when the table does not exist)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Creates every table and index if missing
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS team (
            team_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            symbol TEXT
        );

        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            role TEXT NOT NULL,
            team_id TEXT REFERENCES team(team_id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS mat_rule (
            team_id TEXT NOT NULL REFERENCES team(team_id) ON DELETE CASCADE,
            mat_index INTEGER NOT NULL,
            color TEXT,
            min_experience INTEGER NOT NULL,
            max_experience INTEGER NOT NULL,
            min_age REAL NOT NULL,
            max_age REAL NOT NULL,
            PRIMARY KEY (team_id, mat_index)
        );

        CREATE TABLE IF NOT EXISTS wrestler (
            wrestler_id TEXT PRIMARY KEY,
            team_id TEXT NOT NULL REFERENCES team(team_id) ON DELETE CASCADE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            birthdate TEXT NOT NULL,
            weight REAL NOT NULL,
            experience_years INTEGER NOT NULL DEFAULT 0,
            skill INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_wrestler_team ON wrestler(team_id);

        CREATE TABLE IF NOT EXISTS meet (
            meet_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            meet_date TEXT NOT NULL,
            home_team_id TEXT REFERENCES team(team_id) ON DELETE SET NULL,
            num_mats INTEGER NOT NULL DEFAULT 3,
            min_rest_bouts INTEGER NOT NULL DEFAULT 4,
            rest_penalty REAL NOT NULL DEFAULT 10.0,
            max_matches_per_wrestler INTEGER NOT NULL DEFAULT 3,
            lock_holder TEXT,
            locked_at TEXT,
            lock_expires_at TEXT,
            deleted_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_meet_lock_holder ON meet(lock_holder);

        CREATE TABLE IF NOT EXISTS meet_team (
            meet_id TEXT NOT NULL REFERENCES meet(meet_id) ON DELETE CASCADE,
            team_id TEXT NOT NULL REFERENCES team(team_id) ON DELETE CASCADE,
            PRIMARY KEY (meet_id, team_id)
        );

        CREATE TABLE IF NOT EXISTS wrestler_status (
            meet_id TEXT NOT NULL REFERENCES meet(meet_id) ON DELETE CASCADE,
            wrestler_id TEXT NOT NULL REFERENCES wrestler(wrestler_id) ON DELETE CASCADE,
            status TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (meet_id, wrestler_id)
        );

        CREATE TABLE IF NOT EXISTS excluded_pair (
            meet_id TEXT NOT NULL REFERENCES meet(meet_id) ON DELETE CASCADE,
            wrestler_low TEXT NOT NULL,
            wrestler_high TEXT NOT NULL,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (meet_id, wrestler_low, wrestler_high),
            CHECK (wrestler_low < wrestler_high)
        );

        CREATE TABLE IF NOT EXISTS rejected_pair (
            meet_id TEXT NOT NULL REFERENCES meet(meet_id) ON DELETE CASCADE,
            wrestler_low TEXT NOT NULL,
            wrestler_high TEXT NOT NULL,
            wrestler_id TEXT NOT NULL,
            reason TEXT NOT NULL,
            run_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (meet_id, wrestler_low, wrestler_high),
            CHECK (wrestler_low < wrestler_high)
        );

        CREATE TABLE IF NOT EXISTS bout (
            bout_id TEXT PRIMARY KEY,
            meet_id TEXT NOT NULL REFERENCES meet(meet_id) ON DELETE CASCADE,
            red_id TEXT NOT NULL,
            green_id TEXT NOT NULL,
            mat INTEGER NOT NULL DEFAULT 0,
            bout_order INTEGER NOT NULL DEFAULT 0,
            bout_type TEXT NOT NULL DEFAULT 'NORMAL',
            locked INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_bout_meet ON bout(meet_id, mat, bout_order);
        CREATE UNIQUE INDEX IF NOT EXISTS uq_bout_pair
            ON bout(meet_id, min(red_id, green_id), max(red_id, green_id));

        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            meet_id TEXT,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            payload_json TEXT,
            detail TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_action_log_meet_ts ON action_log(meet_id, action_ts);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}
