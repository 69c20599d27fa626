// ==========================================
// Dual Meet APS - wrestler entity
// ==========================================
// Immutable for the duration of one scheduling run
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days per year used to turn an age in days into years
pub const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wrestler {
    pub wrestler_id: String,
    pub team_id: String,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: NaiveDate,
    pub weight: f64,
    pub experience_years: u32, // 0 = first-year
    pub skill: i32,
    pub active: bool,
}

impl Wrestler {
    /// Age in whole days on the given date
    pub fn age_in_days(&self, on: NaiveDate) -> i64 {
        on.signed_duration_since(self.birthdate).num_days()
    }

    pub fn age_in_years(&self, on: NaiveDate) -> f64 {
        self.age_in_days(on) as f64 / DAYS_PER_YEAR
    }

    pub fn is_first_year(&self) -> bool {
        self.experience_years == 0
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(birth: NaiveDate) -> Wrestler {
        Wrestler {
            wrestler_id: "w1".to_string(),
            team_id: "t1".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Reed".to_string(),
            birthdate: birth,
            weight: 70.0,
            experience_years: 0,
            skill: 3,
            active: true,
        }
    }

    #[test]
    fn test_age_in_days_and_years() {
        let w = make(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        let on = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(w.age_in_days(on), 3653);
        assert!((w.age_in_years(on) - 10.0).abs() < 0.01);
        assert!(w.is_first_year());
        assert_eq!(w.display_name(), "Sam Reed");
    }
}
