// ==========================================
// Dual Meet APS - application layer
// ==========================================
// Wires repositories, config and API over one shared connection
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
