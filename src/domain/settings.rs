// ==========================================
// Dual Meet APS - run settings
// ==========================================

use serde::{Deserialize, Serialize};

/// Settings for one pair generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingSettings {
    pub max_age_gap_days: i64,
    pub max_weight_diff_pct: f64, // 0.10 = 10% of the lighter wrestler
    pub first_year_only_with_first_year: bool,
    pub allow_same_team_matches: bool,
    pub matches_per_wrestler: u32,
    pub max_matches_per_wrestler: u32,
    /// Keep the mat of bouts whose pair survives regeneration
    pub preserve_mats: bool,
}

impl PairingSettings {
    /// Per-wrestler bout target after the cap is applied
    pub fn target_per_wrestler(&self) -> u32 {
        self.matches_per_wrestler.min(self.max_matches_per_wrestler)
    }
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            max_age_gap_days: 365,
            max_weight_diff_pct: 0.10,
            first_year_only_with_first_year: true,
            allow_same_team_matches: false,
            matches_per_wrestler: 2,
            max_matches_per_wrestler: 3,
            preserve_mats: false,
        }
    }
}

/// Settings for mat assignment and sequencing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatSettings {
    pub num_mats: u32,
    pub min_rest_bouts: u32,
    pub rest_penalty: f64,
}

impl Default for MatSettings {
    fn default() -> Self {
        Self {
            num_mats: 3,
            min_rest_bouts: 4,
            rest_penalty: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_is_capped() {
        let settings = PairingSettings {
            matches_per_wrestler: 5,
            max_matches_per_wrestler: 2,
            ..PairingSettings::default()
        };
        assert_eq!(settings.target_per_wrestler(), 2);
    }
}
