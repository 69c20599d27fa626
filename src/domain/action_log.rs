// ==========================================
// Dual Meet APS - audit log model
// ==========================================
// Every successful mutating API call writes one row
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    pub meet_id: Option<String>, // None for cross-meet actions (lock release)
    pub action_type: String,
    pub action_ts: NaiveDateTime,
    pub actor: String,
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

impl ActionLog {
    pub fn new(
        meet_id: Option<&str>,
        action_type: ActionType,
        actor: &str,
        payload_json: Option<JsonValue>,
        detail: String,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            meet_id: meet_id.map(|m| m.to_string()),
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Utc::now().naive_utc(),
            actor: actor.to_string(),
            payload_json,
            detail: Some(detail),
        }
    }
}

// ==========================================
// ActionType
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateMeet,
    DeleteMeet,
    GeneratePairings,
    ForcePair,
    AssignMats,
    ReorderBouts,
    DeletePairings,
    LockBout,
    UnlockBout,
    UpdateBoutNotes,
    SetWrestlerStatus,
    AddExcludedPair,
    RemoveExcludedPair,
    ReplaceMatRules,
    ReleaseLocks,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateMeet => "CREATE_MEET",
            ActionType::DeleteMeet => "DELETE_MEET",
            ActionType::GeneratePairings => "GENERATE_PAIRINGS",
            ActionType::ForcePair => "FORCE_PAIR",
            ActionType::AssignMats => "ASSIGN_MATS",
            ActionType::ReorderBouts => "REORDER_BOUTS",
            ActionType::DeletePairings => "DELETE_PAIRINGS",
            ActionType::LockBout => "LOCK_BOUT",
            ActionType::UnlockBout => "UNLOCK_BOUT",
            ActionType::UpdateBoutNotes => "UPDATE_BOUT_NOTES",
            ActionType::SetWrestlerStatus => "SET_WRESTLER_STATUS",
            ActionType::AddExcludedPair => "ADD_EXCLUDED_PAIR",
            ActionType::RemoveExcludedPair => "REMOVE_EXCLUDED_PAIR",
            ActionType::ReplaceMatRules => "REPLACE_MAT_RULES",
            ActionType::ReleaseLocks => "RELEASE_LOCKS",
        }
    }
}
