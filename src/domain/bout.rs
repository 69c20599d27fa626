// ==========================================
// Dual Meet APS - bouts and pair records
// ==========================================
// PairKey is the unordered wrestler pair normalized so the lower id
// comes first; (A,B) and (B,A) must collide on the same record.
// ==========================================

use crate::domain::types::BoutType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// PairKey
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub low: String,
    pub high: String,
}

impl PairKey {
    /// Returns None when both ids are the same wrestler
    pub fn new(a: &str, b: &str) -> Option<PairKey> {
        if a == b {
            return None;
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Some(PairKey {
            low: low.to_string(),
            high: high.to_string(),
        })
    }

    pub fn contains(&self, wrestler_id: &str) -> bool {
        self.low == wrestler_id || self.high == wrestler_id
    }

    pub fn other(&self, wrestler_id: &str) -> Option<&str> {
        if self.low == wrestler_id {
            Some(&self.high)
        } else if self.high == wrestler_id {
            Some(&self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.low, self.high)
    }
}

// ==========================================
// Bout
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bout {
    pub bout_id: String,
    pub meet_id: String,
    pub red_id: String,
    pub green_id: String,
    pub mat: u32,   // 0-based mat index
    pub order: u32, // 1-based position on its mat
    pub bout_type: BoutType,
    pub locked: bool,
    pub notes: Option<String>,
}

impl Bout {
    /// New unscheduled bout; the lower wrestler id wrestles red
    pub fn new(meet_id: &str, pair: &PairKey, bout_type: BoutType) -> Self {
        Self {
            bout_id: uuid::Uuid::new_v4().to_string(),
            meet_id: meet_id.to_string(),
            red_id: pair.low.clone(),
            green_id: pair.high.clone(),
            mat: 0,
            order: 0,
            bout_type,
            locked: false,
            notes: None,
        }
    }

    pub fn pair_key(&self) -> Option<PairKey> {
        PairKey::new(&self.red_id, &self.green_id)
    }

    pub fn involves(&self, wrestler_id: &str) -> bool {
        self.red_id == wrestler_id || self.green_id == wrestler_id
    }

    /// Locked or forced bouts survive regeneration
    pub fn is_pinned(&self) -> bool {
        self.locked || self.bout_type == BoutType::Forced
    }
}

// ==========================================
// ExcludedPair - standing veto set by a coach
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedPair {
    pub meet_id: String,
    pub pair: PairKey,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

// ==========================================
// RejectedPair - why a wrestler ended a run without a bout
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Eligible partners existed but were all claimed elsewhere
    PartnersClaimed,
    SameTeam,
    Excluded,
    FirstYearMismatch,
    AgeGap,
    WeightGap,
    InvalidWeight,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::PartnersClaimed => "PARTNERS_CLAIMED",
            RejectReason::SameTeam => "SAME_TEAM",
            RejectReason::Excluded => "EXCLUDED",
            RejectReason::FirstYearMismatch => "FIRST_YEAR_MISMATCH",
            RejectReason::AgeGap => "AGE_GAP",
            RejectReason::WeightGap => "WEIGHT_GAP",
            RejectReason::InvalidWeight => "INVALID_WEIGHT",
        }
    }

    pub fn parse(s: &str) -> RejectReason {
        match s.trim().to_uppercase().as_str() {
            "SAME_TEAM" => RejectReason::SameTeam,
            "EXCLUDED" => RejectReason::Excluded,
            "FIRST_YEAR_MISMATCH" => RejectReason::FirstYearMismatch,
            "AGE_GAP" => RejectReason::AgeGap,
            "WEIGHT_GAP" => RejectReason::WeightGap,
            "INVALID_WEIGHT" => RejectReason::InvalidWeight,
            _ => RejectReason::PartnersClaimed,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedPair {
    pub meet_id: String,
    pub pair: PairKey,
    /// The wrestler left without a bout
    pub wrestler_id: String,
    pub reason: RejectReason,
    pub run_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        let ab = PairKey::new("a", "b").unwrap();
        let ba = PairKey::new("b", "a").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.low, "a");
        assert_eq!(ab.other("b"), Some("a"));
        assert_eq!(ab.other("c"), None);
    }

    #[test]
    fn test_pair_key_rejects_self_pair() {
        assert!(PairKey::new("a", "a").is_none());
    }

    #[test]
    fn test_new_bout_red_is_lower_id() {
        let pair = PairKey::new("w9", "w1").unwrap();
        let bout = Bout::new("m1", &pair, BoutType::Normal);
        assert_eq!(bout.red_id, "w1");
        assert_eq!(bout.green_id, "w9");
        assert!(!bout.is_pinned());
    }
}
