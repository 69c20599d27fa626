// ==========================================
// Dual Meet APS - configuration layer
// ==========================================
// Storage: config_kv table (scope_id = 'global')
// ==========================================

pub mod config_manager;
pub mod pairing_config_trait;

pub use config_manager::{config_keys, ConfigManager};
pub use pairing_config_trait::PairingConfigReader;
