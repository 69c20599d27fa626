// ==========================================
// Dual Meet APS - meet entity and acting user
// ==========================================

use crate::domain::types::UserRole;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Meet
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meet {
    pub meet_id: String,
    pub name: String,
    pub meet_date: NaiveDate,
    pub home_team_id: Option<String>,

    // ===== scheduling defaults =====
    pub num_mats: u32,
    pub min_rest_bouts: u32,
    pub rest_penalty: f64,
    pub max_matches_per_wrestler: u32,

    // ===== edit lock =====
    pub lock_holder: Option<String>,
    pub locked_at: Option<NaiveDateTime>,
    pub lock_expires_at: Option<NaiveDateTime>,

    pub deleted_at: Option<NaiveDateTime>,
}

impl Meet {
    pub fn new(name: &str, meet_date: NaiveDate, home_team_id: Option<String>) -> Self {
        Self {
            meet_id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            meet_date,
            home_team_id,
            num_mats: 3,
            min_rest_bouts: 4,
            rest_penalty: 10.0,
            max_matches_per_wrestler: 3,
            lock_holder: None,
            locked_at: None,
            lock_expires_at: None,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// ==========================================
// ActingUser - caller identity passed into every API call
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    pub user_id: String,
    pub role: UserRole,
    pub team_id: Option<String>,
}

impl ActingUser {
    pub fn new(user_id: &str, role: UserRole, team_id: Option<&str>) -> Self {
        Self {
            user_id: user_id.to_string(),
            role,
            team_id: team_id.map(|t| t.to_string()),
        }
    }
}

/// Row of the users table; only the display name matters to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: String,
    pub display_name: String,
    pub role: UserRole,
    pub team_id: Option<String>,
}
