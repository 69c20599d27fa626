// ==========================================
// Dual Meet APS - team and mat rules
// ==========================================
// Mat rules route the more novice wrestler of a bout to a mat.
// matIndex is unique per team; overlapping bands are tolerated
// (first match in matIndex order wins).
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub name: String,
    pub symbol: Option<String>,
}

/// Per-mat eligibility band (inclusive bounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatRule {
    pub mat_index: u32,
    pub color: Option<String>,
    pub min_experience: u32,
    pub max_experience: u32,
    pub min_age: f64, // years, half-year precision
    pub max_age: f64,
}

impl MatRule {
    pub fn new(
        mat_index: u32,
        color: &str,
        experience: (u32, u32),
        age: (f64, f64),
    ) -> Self {
        Self {
            mat_index,
            color: Some(color.to_string()),
            min_experience: experience.0,
            max_experience: experience.1,
            min_age: age.0,
            max_age: age.1,
        }
    }

    pub fn contains(&self, experience_years: u32, age_years: f64) -> bool {
        experience_years >= self.min_experience
            && experience_years <= self.max_experience
            && age_years >= self.min_age
            && age_years <= self.max_age
    }
}

/// Built-in bands used when the meet has no home team or the home team
/// has no configured rules: novice on mat 0 up to open on mat 5.
pub fn default_mat_rules() -> Vec<MatRule> {
    vec![
        MatRule::new(0, "green", (0, 0), (0.0, 8.5)),
        MatRule::new(1, "blue", (0, 1), (0.0, 10.5)),
        MatRule::new(2, "yellow", (0, 2), (0.0, 12.5)),
        MatRule::new(3, "orange", (0, 4), (0.0, 14.0)),
        MatRule::new(4, "red", (0, 6), (0.0, 16.0)),
        MatRule::new(5, "black", (0, 99), (0.0, 99.0)),
    ]
}
