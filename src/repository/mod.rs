// ==========================================
// Dual Meet APS - repository layer
// ==========================================
// Data access only, no business rules.
// All queries are parameterized.
// ==========================================

pub mod action_log_repo;
pub mod bout_repo;
pub mod error;
pub mod meet_repo;
pub mod pair_repo;
pub mod sql_utils;
pub mod team_repo;
pub mod user_repo;
pub mod wrestler_repo;

pub use action_log_repo::ActionLogRepository;
pub use bout_repo::BoutRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use meet_repo::MeetRepository;
pub use pair_repo::PairRepository;
pub use team_repo::TeamRepository;
pub use user_repo::UserRepository;
pub use wrestler_repo::WrestlerRepository;
