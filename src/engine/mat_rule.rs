// ==========================================
// Dual Meet APS - mat rule resolver
// ==========================================
// Maps a bout to the preferred mat of the home team's rule bands
// Profile = lower experience and lower age of the two wrestlers, so the
// more novice wrestler decides the mat.
// ==========================================

use crate::domain::team::{default_mat_rules, MatRule};
use crate::domain::wrestler::Wrestler;
use chrono::NaiveDate;

/// Fallback when no band matches
pub const FALLBACK_MAT: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoutProfile {
    pub experience_years: u32,
    pub age_years: f64,
}

impl BoutProfile {
    pub fn of(a: &Wrestler, b: &Wrestler, on: NaiveDate) -> Self {
        Self {
            experience_years: a.experience_years.min(b.experience_years),
            age_years: a.age_in_years(on).min(b.age_in_years(on)),
        }
    }
}

pub struct MatRuleResolver {
    rules: Vec<MatRule>,
    using_defaults: bool,
}

impl MatRuleResolver {
    /// Builds a resolver; an empty rule list selects the built-in bands
    pub fn new(mut rules: Vec<MatRule>) -> Self {
        let using_defaults = rules.is_empty();
        if using_defaults {
            rules = default_mat_rules();
        }
        // stable sort keeps input order for (tolerated) duplicate indices
        rules.sort_by_key(|r| r.mat_index);
        Self {
            rules,
            using_defaults,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Vec::new())
    }

    pub fn using_defaults(&self) -> bool {
        self.using_defaults
    }

    pub fn rules(&self) -> &[MatRule] {
        &self.rules
    }

    /// First band (in matIndex order) containing the profile, else mat 0
    pub fn resolve(&self, profile: BoutProfile) -> u32 {
        self.rules
            .iter()
            .find(|r| r.contains(profile.experience_years, profile.age_years))
            .map(|r| r.mat_index)
            .unwrap_or(FALLBACK_MAT)
    }

    pub fn preferred_mat(&self, a: &Wrestler, b: &Wrestler, on: NaiveDate) -> u32 {
        self.resolve(BoutProfile::of(a, b, on))
    }

    /// Preferred mat clamped into [0, num_mats)
    pub fn preferred_mat_within(&self, a: &Wrestler, b: &Wrestler, on: NaiveDate, num_mats: u32) -> u32 {
        self.preferred_mat(a, b, on).min(num_mats.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
    }

    fn wrestler(age_years: f64, exp: u32) -> Wrestler {
        Wrestler {
            wrestler_id: format!("w-{}-{}", age_years, exp),
            team_id: "t".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            birthdate: on() - Duration::days((age_years * 365.25) as i64 + 1),
            weight: 70.0,
            experience_years: exp,
            skill: 0,
            active: true,
        }
    }

    #[test]
    fn test_profile_uses_the_more_novice_wrestler() {
        let young_rookie = wrestler(8.0, 0);
        let older_veteran = wrestler(12.0, 4);
        let profile = BoutProfile::of(&young_rookie, &older_veteran, on());
        assert_eq!(profile.experience_years, 0);
        assert!(profile.age_years < 8.1);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = vec![
            MatRule::new(2, "red", (0, 99), (0.0, 99.0)),
            MatRule::new(1, "blue", (0, 2), (0.0, 10.0)),
        ];
        let resolver = MatRuleResolver::new(rules);
        assert!(!resolver.using_defaults());
        // both bands match; mat 1 comes first in matIndex order
        assert_eq!(resolver.resolve(BoutProfile { experience_years: 1, age_years: 9.0 }), 1);
        assert_eq!(resolver.resolve(BoutProfile { experience_years: 5, age_years: 9.0 }), 2);
    }

    #[test]
    fn test_no_match_falls_back_to_mat_zero() {
        let resolver = MatRuleResolver::new(vec![MatRule::new(3, "blue", (2, 4), (10.0, 12.0))]);
        assert_eq!(resolver.resolve(BoutProfile { experience_years: 0, age_years: 6.0 }), FALLBACK_MAT);
    }

    #[test]
    fn test_default_bands() {
        let resolver = MatRuleResolver::with_defaults();
        assert!(resolver.using_defaults());
        assert_eq!(resolver.preferred_mat(&wrestler(7.0, 0), &wrestler(8.0, 0), on()), 0);
        assert_eq!(resolver.preferred_mat(&wrestler(13.0, 3), &wrestler(13.5, 4), on()), 3);
        assert_eq!(resolver.preferred_mat(&wrestler(17.0, 8), &wrestler(17.0, 9), on()), 5);
    }

    #[test]
    fn test_clamped_to_available_mats() {
        let resolver = MatRuleResolver::with_defaults();
        let a = wrestler(17.0, 8);
        let b = wrestler(17.0, 9);
        assert_eq!(resolver.preferred_mat_within(&a, &b, on(), 3), 2);
    }
}
