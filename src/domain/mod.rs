// ==========================================
// Dual Meet APS - domain layer
// ==========================================
// Entities and enums only; no data access, no engine logic
// ==========================================

pub mod action_log;
pub mod bout;
pub mod meet;
pub mod settings;
pub mod team;
pub mod types;
pub mod wrestler;

pub use action_log::{ActionLog, ActionType};
pub use bout::{Bout, ExcludedPair, PairKey, RejectReason, RejectedPair};
pub use meet::{ActingUser, Meet, UserAccount};
pub use settings::{MatSettings, PairingSettings};
pub use team::{default_mat_rules, MatRule, Team};
pub use types::{BoutType, UserRole, WrestlerStatus};
pub use wrestler::Wrestler;
