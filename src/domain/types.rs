// ==========================================
// Dual Meet APS - domain enums
// ==========================================
// Stored as SCREAMING_SNAKE_CASE strings in SQLite
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Wrestler status (per meet)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WrestlerStatus {
    Available, // default when no row exists
    Absent,
    NotComing,
}

impl WrestlerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WrestlerStatus::Available => "AVAILABLE",
            WrestlerStatus::Absent => "ABSENT",
            WrestlerStatus::NotComing => "NOT_COMING",
        }
    }

    pub fn parse(s: &str) -> Option<WrestlerStatus> {
        match s.trim().to_uppercase().as_str() {
            "AVAILABLE" => Some(WrestlerStatus::Available),
            "ABSENT" => Some(WrestlerStatus::Absent),
            "NOT_COMING" => Some(WrestlerStatus::NotComing),
            _ => None,
        }
    }

    /// ABSENT and NOT_COMING wrestlers are kept out of pairing
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, WrestlerStatus::Available)
    }
}

impl fmt::Display for WrestlerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Bout type
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoutType {
    Normal,     // produced by the pair generator
    Forced,     // created by a coach, bypasses eligibility
    Exhibition, // does not count toward team score
}

impl BoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoutType::Normal => "NORMAL",
            BoutType::Forced => "FORCED",
            BoutType::Exhibition => "EXHIBITION",
        }
    }

    pub fn parse(s: &str) -> BoutType {
        match s.trim().to_uppercase().as_str() {
            "FORCED" => BoutType::Forced,
            "EXHIBITION" => BoutType::Exhibition,
            _ => BoutType::Normal,
        }
    }
}

impl fmt::Display for BoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// User role
// ==========================================
// Order: Viewer < Parent < Coach < Admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Viewer,
    Parent,
    Coach,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Viewer => "VIEWER",
            UserRole::Parent => "PARENT",
            UserRole::Coach => "COACH",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> UserRole {
        match s.trim().to_uppercase().as_str() {
            "PARENT" => UserRole::Parent,
            "COACH" => UserRole::Coach,
            "ADMIN" => UserRole::Admin,
            _ => UserRole::Viewer,
        }
    }

    pub fn at_least(&self, required: UserRole) -> bool {
        *self >= required
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(UserRole::Admin > UserRole::Coach);
        assert!(UserRole::Coach > UserRole::Parent);
        assert!(UserRole::Parent > UserRole::Viewer);
        assert!(UserRole::Coach.at_least(UserRole::Coach));
        assert!(!UserRole::Parent.at_least(UserRole::Coach));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(WrestlerStatus::parse("absent"), Some(WrestlerStatus::Absent));
        assert_eq!(WrestlerStatus::parse("NOT_COMING"), Some(WrestlerStatus::NotComing));
        assert_eq!(WrestlerStatus::parse("late"), None);
        assert!(WrestlerStatus::NotComing.is_unavailable());
        assert!(!WrestlerStatus::Available.is_unavailable());
    }

    #[test]
    fn test_bout_type_parse_defaults_to_normal() {
        assert_eq!(BoutType::parse("FORCED"), BoutType::Forced);
        assert_eq!(BoutType::parse("unknown"), BoutType::Normal);
    }
}
