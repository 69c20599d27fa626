// ==========================================
// Dual Meet APS - input validators
// ==========================================
// Numeric bounds for run settings, pair identity checks, role checks
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::bout::PairKey;
use crate::domain::meet::ActingUser;
use crate::domain::settings::{MatSettings, PairingSettings};
use crate::domain::team::MatRule;
use crate::domain::types::UserRole;
use std::collections::HashSet;

pub const MAX_AGE_GAP_DAYS_LIMIT: i64 = 3650;
pub const MATCHES_PER_WRESTLER_LIMIT: u32 = 10;
pub const NUM_MATS_LIMIT: u32 = 20;
pub const MIN_REST_BOUTS_LIMIT: u32 = 50;

pub fn validate_pairing_settings(s: &PairingSettings) -> ApiResult<()> {
    if !(0..=MAX_AGE_GAP_DAYS_LIMIT).contains(&s.max_age_gap_days) {
        return Err(ApiError::InvalidInput(format!(
            "max_age_gap_days must be within 0..={}, got {}",
            MAX_AGE_GAP_DAYS_LIMIT, s.max_age_gap_days
        )));
    }
    if !(s.max_weight_diff_pct > 0.0 && s.max_weight_diff_pct <= 1.0) {
        return Err(ApiError::InvalidInput(format!(
            "max_weight_diff_pct must be within (0, 1], got {}",
            s.max_weight_diff_pct
        )));
    }
    for (name, value) in [
        ("matches_per_wrestler", s.matches_per_wrestler),
        ("max_matches_per_wrestler", s.max_matches_per_wrestler),
    ] {
        if !(1..=MATCHES_PER_WRESTLER_LIMIT).contains(&value) {
            return Err(ApiError::InvalidInput(format!(
                "{} must be within 1..={}, got {}",
                name, MATCHES_PER_WRESTLER_LIMIT, value
            )));
        }
    }
    Ok(())
}

pub fn validate_mat_settings(s: &MatSettings) -> ApiResult<()> {
    if !(1..=NUM_MATS_LIMIT).contains(&s.num_mats) {
        return Err(ApiError::InvalidInput(format!(
            "num_mats must be within 1..={}, got {}",
            NUM_MATS_LIMIT, s.num_mats
        )));
    }
    if s.min_rest_bouts > MIN_REST_BOUTS_LIMIT {
        return Err(ApiError::InvalidInput(format!(
            "min_rest_bouts must be within 0..={}, got {}",
            MIN_REST_BOUTS_LIMIT, s.min_rest_bouts
        )));
    }
    if !s.rest_penalty.is_finite() || s.rest_penalty < 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "rest_penalty must be a finite non-negative number, got {}",
            s.rest_penalty
        )));
    }
    Ok(())
}

/// Normalized key for two wrestler ids; blank or identical ids are rejected
pub fn validate_pair(a: &str, b: &str) -> ApiResult<PairKey> {
    let (a, b) = (a.trim(), b.trim());
    if a.is_empty() || b.is_empty() {
        return Err(ApiError::InvalidInput("wrestler id must not be empty".to_string()));
    }
    PairKey::new(a, b).ok_or_else(|| {
        ApiError::InvalidInput(format!("a wrestler cannot be paired with themselves ({})", a))
    })
}

/// Unique mat_index, ordered bounds, half-year ages
pub fn validate_mat_rules(rules: &[MatRule]) -> ApiResult<()> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(rule.mat_index) {
            return Err(ApiError::InvalidInput(format!(
                "duplicate mat_index {}",
                rule.mat_index
            )));
        }
        if rule.min_experience > rule.max_experience {
            return Err(ApiError::InvalidInput(format!(
                "mat {}: min_experience {} > max_experience {}",
                rule.mat_index, rule.min_experience, rule.max_experience
            )));
        }
        if rule.min_age > rule.max_age {
            return Err(ApiError::InvalidInput(format!(
                "mat {}: min_age {} > max_age {}",
                rule.mat_index, rule.min_age, rule.max_age
            )));
        }
        for age in [rule.min_age, rule.max_age] {
            if !is_half_year(age) {
                return Err(ApiError::InvalidInput(format!(
                    "mat {}: age bound {} is not a multiple of 0.5",
                    rule.mat_index, age
                )));
            }
        }
    }
    Ok(())
}

fn is_half_year(age: f64) -> bool {
    age.is_finite() && age >= 0.0 && (age * 2.0).fract() == 0.0
}

/// Mutations need Coach or above; a Coach must belong to a participating team
pub fn require_editor(user: &ActingUser, participant_team_ids: &[String]) -> ApiResult<()> {
    if !user.role.at_least(UserRole::Coach) {
        return Err(ApiError::PermissionDenied(format!(
            "user {} has role {} and cannot edit meets",
            user.user_id,
            user.role.as_str()
        )));
    }
    if user.role == UserRole::Coach {
        let on_meet = user
            .team_id
            .as_ref()
            .map(|t| participant_team_ids.iter().any(|p| p == t))
            .unwrap_or(false);
        if !on_meet {
            return Err(ApiError::PermissionDenied(format!(
                "coach {} does not belong to a team in this meet",
                user.user_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairing_settings_bounds() {
        assert!(validate_pairing_settings(&PairingSettings::default()).is_ok());

        let mut s = PairingSettings::default();
        s.max_weight_diff_pct = 0.0;
        assert!(matches!(validate_pairing_settings(&s), Err(ApiError::InvalidInput(_))));

        let mut s = PairingSettings::default();
        s.max_age_gap_days = -1;
        assert!(validate_pairing_settings(&s).is_err());

        let mut s = PairingSettings::default();
        s.matches_per_wrestler = 0;
        assert!(validate_pairing_settings(&s).is_err());
    }

    #[test]
    fn test_mat_settings_bounds() {
        assert!(validate_mat_settings(&MatSettings::default()).is_ok());

        let mut s = MatSettings::default();
        s.num_mats = 0;
        assert!(validate_mat_settings(&s).is_err());

        let mut s = MatSettings::default();
        s.rest_penalty = f64::NAN;
        assert!(validate_mat_settings(&s).is_err());
    }

    #[test]
    fn test_validate_pair() {
        let key = validate_pair("w2", "w1").unwrap();
        assert_eq!(key.low, "w1");
        assert!(validate_pair("w1", "w1").is_err());
        assert!(validate_pair("", "w1").is_err());
    }

    #[test]
    fn test_mat_rules() {
        let ok = vec![
            MatRule::new(0, "green", (0, 1), (0.0, 9.5)),
            MatRule::new(1, "green", (0, 99), (0.0, 99.0)),
        ];
        assert!(validate_mat_rules(&ok).is_ok());

        let dup = vec![ok[0].clone(), ok[0].clone()];
        assert!(validate_mat_rules(&dup).is_err());

        let quarter = vec![MatRule::new(0, "green", (0, 1), (0.0, 9.25))];
        assert!(validate_mat_rules(&quarter).is_err());

        let inverted = vec![MatRule::new(0, "green", (3, 1), (0.0, 9.0))];
        assert!(validate_mat_rules(&inverted).is_err());
    }

    #[test]
    fn test_require_editor() {
        let teams = vec!["t1".to_string(), "t2".to_string()];

        let coach = ActingUser::new("c1", UserRole::Coach, Some("t1"));
        assert!(require_editor(&coach, &teams).is_ok());

        let outsider = ActingUser::new("c9", UserRole::Coach, Some("t9"));
        assert!(matches!(require_editor(&outsider, &teams), Err(ApiError::PermissionDenied(_))));

        let parent = ActingUser::new("p1", UserRole::Parent, Some("t1"));
        assert!(require_editor(&parent, &teams).is_err());

        let admin = ActingUser::new("a1", UserRole::Admin, None);
        assert!(require_editor(&admin, &teams).is_ok());
    }
}
