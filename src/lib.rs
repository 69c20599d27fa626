// ==========================================
// Dual Meet APS - core library
// ==========================================
// Pairing, mat assignment and bout sequencing for youth wrestling
// dual meets, backed by SQLite
// ==========================================

// ==========================================
// modules
// ==========================================

// domain - entities and enums
pub mod domain;

// repository - data access
pub mod repository;

// engine - pairing and scheduling rules (no SQL)
pub mod engine;

// config - config_kv backed defaults
pub mod config;

// database bootstrap (PRAGMAs, schema)
pub mod db;

pub mod logging;

// API - orchestration entry points
pub mod api;

// app - shared state wiring
pub mod app;

// ==========================================
// re-exports
// ==========================================

pub use domain::types::{BoutType, UserRole, WrestlerStatus};

pub use domain::{
    ActingUser, ActionLog, ActionType, Bout, ExcludedPair, MatRule, MatSettings, Meet, PairKey,
    PairingSettings, RejectReason, RejectedPair, Team, UserAccount, Wrestler,
};

pub use engine::{
    EligibilityEvaluator, MatRuleResolver, MeetLockPolicy, PairGenerator, RestAwareSequencer,
};

pub use api::{ApiError, ApiResult, ErrorKind, MeetApi};

// ==========================================
// constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Dual Meet APS";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
