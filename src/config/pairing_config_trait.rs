// ==========================================
// Dual Meet APS - pairing config reader trait
// ==========================================
// Read-only view used by the API layer; no writes here
// ==========================================

use crate::domain::meet::Meet;
use crate::domain::settings::{MatSettings, PairingSettings};
use std::error::Error;

pub trait PairingConfigReader: Send + Sync {
    /// Global pairing defaults
    ///
    /// # Defaults
    /// - max_age_gap_days: 365
    /// - max_weight_diff_pct: 0.10
    /// - first_year_only_with_first_year: true
    /// - allow_same_team_matches: false
    /// - matches_per_wrestler: 2
    /// - max_matches_per_wrestler: 3
    /// - preserve_mats: false
    fn pairing_defaults(&self) -> Result<PairingSettings, Box<dyn Error>>;

    /// Global mat defaults, applied to newly created meets
    ///
    /// # Defaults
    /// - num_mats: 3
    /// - min_rest_bouts: 4
    /// - rest_penalty: 10.0
    fn mat_defaults(&self) -> Result<MatSettings, Box<dyn Error>>;

    /// Pairing defaults with the meet's own match cap applied
    fn pairing_settings_for(&self, meet: &Meet) -> Result<PairingSettings, Box<dyn Error>> {
        let mut settings = self.pairing_defaults()?;
        settings.max_matches_per_wrestler = meet.max_matches_per_wrestler;
        Ok(settings)
    }

    /// The meet row always carries its mat settings
    fn mat_settings_for(&self, meet: &Meet) -> MatSettings {
        MatSettings {
            num_mats: meet.num_mats,
            min_rest_bouts: meet.min_rest_bouts,
            rest_penalty: meet.rest_penalty,
        }
    }
}
