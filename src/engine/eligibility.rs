// ==========================================
// Dual Meet APS - eligibility evaluator
// ==========================================
// Decides whether two wrestlers may be paired and how good the pairing is
// Stateless, no I/O
// ==========================================
// Checks run in order and stop at the first failure:
// 1. same team (unless allowed)
// 2. excluded pair
// 3. first-year rule
// 4. age gap in days
// 5. weight gap relative to the lighter wrestler
// ==========================================

use crate::domain::bout::{PairKey, RejectReason};
use crate::domain::settings::PairingSettings;
use crate::domain::wrestler::Wrestler;
use std::collections::HashSet;

/// Share of the cost taken by the normalized age gap
pub const AGE_GAP_WEIGHT: f64 = 0.5;
/// Share of the cost taken by the normalized weight gap
pub const WEIGHT_GAP_WEIGHT: f64 = 0.5;
/// Skill difference only separates near-ties, it never rejects
pub const SKILL_TIEBREAK_WEIGHT: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub eligible: bool,
    pub cost: f64,
    /// First failed check; None when eligible
    pub reason: Option<RejectReason>,
}

impl Evaluation {
    fn rejected(reason: RejectReason, cost: f64) -> Self {
        Self {
            eligible: false,
            cost,
            reason: Some(reason),
        }
    }
}

// ==========================================
// EligibilityEvaluator - pure functions
// ==========================================
pub struct EligibilityEvaluator;

impl EligibilityEvaluator {
    /// Evaluates a candidate pairing
    ///
    /// # Arguments
    /// - excluded: normalized excluded pairs of the meet
    ///
    /// # Returns
    /// Evaluation with the compatibility cost (lower is better). The cost
    /// is filled in even for ineligible pairs so callers can rank "closest
    /// miss" partners.
    pub fn evaluate(
        a: &Wrestler,
        b: &Wrestler,
        settings: &PairingSettings,
        excluded: &HashSet<PairKey>,
    ) -> Evaluation {
        let cost = Self::cost(a, b, settings);

        if !settings.allow_same_team_matches && a.team_id == b.team_id {
            return Evaluation::rejected(RejectReason::SameTeam, cost);
        }

        if let Some(key) = PairKey::new(&a.wrestler_id, &b.wrestler_id) {
            if excluded.contains(&key) {
                return Evaluation::rejected(RejectReason::Excluded, cost);
            }
        }

        if settings.first_year_only_with_first_year && a.is_first_year() != b.is_first_year() {
            return Evaluation::rejected(RejectReason::FirstYearMismatch, cost);
        }

        if Self::age_gap_days(a, b) > settings.max_age_gap_days {
            return Evaluation::rejected(RejectReason::AgeGap, cost);
        }

        match Self::weight_gap_pct(a, b) {
            None => return Evaluation::rejected(RejectReason::InvalidWeight, cost),
            Some(pct) if pct > settings.max_weight_diff_pct => {
                return Evaluation::rejected(RejectReason::WeightGap, cost)
            }
            Some(_) => {}
        }

        Evaluation {
            eligible: true,
            cost,
            reason: None,
        }
    }

    /// |ageInDays(a) - ageInDays(b)|, independent of the reference date
    pub fn age_gap_days(a: &Wrestler, b: &Wrestler) -> i64 {
        a.birthdate.signed_duration_since(b.birthdate).num_days().abs()
    }

    /// |wa - wb| / min(wa, wb); None when either weight is not positive
    pub fn weight_gap_pct(a: &Wrestler, b: &Wrestler) -> Option<f64> {
        let lighter = a.weight.min(b.weight);
        if !lighter.is_finite() || lighter <= 0.0 || !a.weight.is_finite() || !b.weight.is_finite() {
            return None;
        }
        Some((a.weight - b.weight).abs() / lighter)
    }

    /// Weighted sum of the normalized age and weight gaps plus the skill tiebreak
    pub fn cost(a: &Wrestler, b: &Wrestler, settings: &PairingSettings) -> f64 {
        let age_term = Self::age_gap_days(a, b) as f64 / settings.max_age_gap_days.max(1) as f64;
        let weight_term = match Self::weight_gap_pct(a, b) {
            Some(pct) if settings.max_weight_diff_pct > 0.0 => pct / settings.max_weight_diff_pct,
            Some(pct) => pct,
            None => return f64::INFINITY,
        };
        let skill_term = (a.skill - b.skill).abs() as f64;

        AGE_GAP_WEIGHT * age_term + WEIGHT_GAP_WEIGHT * weight_term + SKILL_TIEBREAK_WEIGHT * skill_term
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn wrestler(id: &str, team: &str, age_days: i64, weight: f64, exp: u32) -> Wrestler {
        let meet_day = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        Wrestler {
            wrestler_id: id.to_string(),
            team_id: team.to_string(),
            first_name: id.to_string(),
            last_name: "Test".to_string(),
            birthdate: meet_day - Duration::days(age_days),
            weight,
            experience_years: exp,
            skill: 0,
            active: true,
        }
    }

    fn settings() -> PairingSettings {
        PairingSettings {
            max_age_gap_days: 180,
            max_weight_diff_pct: 0.1,
            first_year_only_with_first_year: true,
            allow_same_team_matches: false,
            matches_per_wrestler: 1,
            max_matches_per_wrestler: 2,
            preserve_mats: false,
        }
    }

    #[test]
    fn test_close_pair_is_eligible() {
        let a = wrestler("a", "x", 3650, 80.0, 1);
        let b = wrestler("b", "y", 3700, 82.0, 1);
        let eval = EligibilityEvaluator::evaluate(&a, &b, &settings(), &HashSet::new());
        assert!(eval.eligible);
        assert!(eval.reason.is_none());
        assert!(eval.cost > 0.0 && eval.cost < 1.0);
    }

    #[test]
    fn test_same_team_checked_first() {
        // also fails the age gap, but same team is reported
        let a = wrestler("a", "x", 3650, 80.0, 1);
        let c = wrestler("c", "x", 5500, 140.0, 5);
        let eval = EligibilityEvaluator::evaluate(&a, &c, &settings(), &HashSet::new());
        assert!(!eval.eligible);
        assert_eq!(eval.reason, Some(RejectReason::SameTeam));

        let allow = PairingSettings {
            allow_same_team_matches: true,
            ..settings()
        };
        let eval = EligibilityEvaluator::evaluate(&a, &c, &allow, &HashSet::new());
        assert_eq!(eval.reason, Some(RejectReason::AgeGap));
    }

    #[test]
    fn test_excluded_pair_in_either_order() {
        let a = wrestler("a", "x", 3650, 80.0, 1);
        let b = wrestler("b", "y", 3650, 80.0, 1);
        let mut excluded = HashSet::new();
        excluded.insert(PairKey::new("b", "a").unwrap());
        let eval = EligibilityEvaluator::evaluate(&a, &b, &settings(), &excluded);
        assert_eq!(eval.reason, Some(RejectReason::Excluded));
    }

    #[test]
    fn test_first_year_rule() {
        let rookie = wrestler("a", "x", 3650, 80.0, 0);
        let veteran = wrestler("b", "y", 3650, 80.0, 2);
        let other_rookie = wrestler("c", "y", 3650, 80.0, 0);
        let s = settings();
        assert_eq!(
            EligibilityEvaluator::evaluate(&rookie, &veteran, &s, &HashSet::new()).reason,
            Some(RejectReason::FirstYearMismatch)
        );
        assert!(EligibilityEvaluator::evaluate(&rookie, &other_rookie, &s, &HashSet::new()).eligible);

        let relaxed = PairingSettings {
            first_year_only_with_first_year: false,
            ..settings()
        };
        assert!(EligibilityEvaluator::evaluate(&rookie, &veteran, &relaxed, &HashSet::new()).eligible);
    }

    #[test]
    fn test_weight_gap_relative_to_lighter() {
        let a = wrestler("a", "x", 3650, 100.0, 1);
        let b = wrestler("b", "y", 3650, 110.0, 1);
        let c = wrestler("c", "y", 3650, 111.0, 1);
        assert!(EligibilityEvaluator::evaluate(&a, &b, &settings(), &HashSet::new()).eligible);
        assert_eq!(
            EligibilityEvaluator::evaluate(&a, &c, &settings(), &HashSet::new()).reason,
            Some(RejectReason::WeightGap)
        );
    }

    #[test]
    fn test_zero_weight_is_invalid() {
        let a = wrestler("a", "x", 3650, 0.0, 1);
        let b = wrestler("b", "y", 3650, 80.0, 1);
        let eval = EligibilityEvaluator::evaluate(&a, &b, &settings(), &HashSet::new());
        assert_eq!(eval.reason, Some(RejectReason::InvalidWeight));
        assert!(eval.cost.is_infinite());
    }

    #[test]
    fn test_skill_only_breaks_ties() {
        let a = wrestler("a", "x", 3650, 80.0, 1);
        let mut b = wrestler("b", "y", 3650, 80.0, 1);
        let base = EligibilityEvaluator::cost(&a, &b, &settings());
        b.skill = 5;
        let with_skill = EligibilityEvaluator::cost(&a, &b, &settings());
        assert!(with_skill > base);
        assert!(with_skill - base < 0.01);
    }
}
