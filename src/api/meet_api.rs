// ==========================================
// Dual Meet APS - meet API
// ==========================================
// Orchestration only: validate -> edit lock -> engine -> persist -> audit.
// Engines never touch SQL; repositories never make decisions.
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    require_editor, validate_mat_rules, validate_mat_settings, validate_pair,
    validate_pairing_settings,
};
use crate::config::PairingConfigReader;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::bout::{Bout, ExcludedPair, PairKey, RejectedPair};
use crate::domain::meet::{ActingUser, Meet};
use crate::domain::settings::{MatSettings, PairingSettings};
use crate::domain::team::MatRule;
use crate::domain::types::{BoutType, UserRole, WrestlerStatus};
use crate::domain::wrestler::Wrestler;
use crate::engine::{
    mat_loads, total_rest_penalty, Clock, GenerationInput, LockDecision, LockTransition,
    MatRuleResolver, MeetLockPolicy, MeetLockState, PairGenerator, Placement,
    RestAwareSequencer, SequenceItem, SystemClock,
};
use crate::repository::{
    ActionLogRepository, BoutRepository, MeetRepository, PairRepository, TeamRepository,
    UserRepository, WrestlerRepository,
};

mod lock;
mod pairing;
mod roster;
mod scheduling;

// ==========================================
// responses
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetLockGrant {
    pub meet_id: String,
    pub holder_id: String,
    pub locked_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratePairingsResponse {
    pub run_id: String,
    pub created_count: usize,
    pub rejected_count: usize,
    /// Locked or forced bouts kept from the previous bout set
    pub kept_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignMatsResponse {
    pub assigned_count: usize,
    pub total_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderBoutsResponse {
    pub reordered_count: usize,
    pub penalty_before: f64,
    pub penalty_after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestPenaltyReport {
    pub meet_id: String,
    pub bout_count: usize,
    pub total_penalty: f64,
    pub mat_loads: Vec<usize>,
}

// ==========================================
// MeetApi
// ==========================================

/// Pairing and scheduling entry points for one meet database
///
/// Every mutating call:
/// 1. loads the meet (NotFound / StateViolation when soft-deleted)
/// 2. checks the acting user's role and team
/// 3. acquires or renews the meet edit lock
/// 4. runs the engine and persists the result
/// 5. writes one action_log row
pub struct MeetApi {
    meet_repo: Arc<MeetRepository>,
    wrestler_repo: Arc<WrestlerRepository>,
    team_repo: Arc<TeamRepository>,
    bout_repo: Arc<BoutRepository>,
    pair_repo: Arc<PairRepository>,
    user_repo: Arc<UserRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<dyn PairingConfigReader>,
    clock: Arc<dyn Clock>,
    lock_policy: MeetLockPolicy,
    generator: PairGenerator,
}

impl MeetApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        meet_repo: Arc<MeetRepository>,
        wrestler_repo: Arc<WrestlerRepository>,
        team_repo: Arc<TeamRepository>,
        bout_repo: Arc<BoutRepository>,
        pair_repo: Arc<PairRepository>,
        user_repo: Arc<UserRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<dyn PairingConfigReader>,
    ) -> Self {
        Self {
            meet_repo,
            wrestler_repo,
            team_repo,
            bout_repo,
            pair_repo,
            user_repo,
            action_log_repo,
            config,
            clock: Arc::new(SystemClock),
            lock_policy: MeetLockPolicy::default(),
            generator: PairGenerator::new(),
        }
    }

    /// Replaces the wall clock (lock expiry tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ==========================================
    // shared helpers
    // ==========================================

    fn load_meet(&self, meet_id: &str) -> ApiResult<Meet> {
        if meet_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("meet_id must not be empty".to_string()));
        }
        self.meet_repo
            .find_by_id(meet_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Meet(id={})", meet_id)))
    }

    fn load_live_meet(&self, meet_id: &str) -> ApiResult<Meet> {
        let meet = self.load_meet(meet_id)?;
        if meet.is_deleted() {
            return Err(ApiError::StateViolation(format!(
                "meet {} has been deleted",
                meet_id
            )));
        }
        Ok(meet)
    }

    /// Common prologue of every mutating call; returns the meet as read
    /// before the lock was stamped
    fn begin_edit(&self, meet_id: &str, user: &ActingUser) -> ApiResult<Meet> {
        let meet = self.load_live_meet(meet_id)?;
        let team_ids = self.meet_repo.list_team_ids(meet_id)?;
        require_editor(user, &team_ids)?;
        self.lock_meet(&meet, &user.user_id)?;
        Ok(meet)
    }

    fn load_wrestler(&self, wrestler_id: &str) -> ApiResult<Wrestler> {
        self.wrestler_repo
            .find_by_id(wrestler_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Wrestler(id={})", wrestler_id)))
    }

    fn load_bout(&self, bout_id: &str) -> ApiResult<Bout> {
        self.bout_repo
            .find_by_id(bout_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Bout(id={})", bout_id)))
    }

    /// Home team rules, or the built-in bands
    fn resolver_for(&self, meet: &Meet) -> ApiResult<MatRuleResolver> {
        let rules = match &meet.home_team_id {
            Some(team_id) => self.team_repo.list_mat_rules(team_id)?,
            None => Vec::new(),
        };
        Ok(MatRuleResolver::new(rules))
    }

    /// Wrestlers of the meet's teams keyed by id, inactive ones included
    fn wrestler_index(&self, meet_id: &str, bouts: &[Bout]) -> ApiResult<HashMap<String, Wrestler>> {
        let mut index: HashMap<String, Wrestler> = self
            .wrestler_repo
            .list_active_for_meet(meet_id)?
            .into_iter()
            .map(|w| (w.wrestler_id.clone(), w))
            .collect();
        for bout in bouts {
            for id in [&bout.red_id, &bout.green_id] {
                if !index.contains_key(id) {
                    if let Some(w) = self.wrestler_repo.find_by_id(id)? {
                        index.insert(id.clone(), w);
                    }
                }
            }
        }
        Ok(index)
    }

    fn preferred_mat(
        resolver: &MatRuleResolver,
        wrestlers: &HashMap<String, Wrestler>,
        bout: &Bout,
        meet_date: NaiveDate,
        num_mats: u32,
    ) -> u32 {
        match (wrestlers.get(&bout.red_id), wrestlers.get(&bout.green_id)) {
            (Some(a), Some(b)) => resolver.preferred_mat_within(a, b, meet_date, num_mats),
            _ => bout.mat,
        }
    }

    fn record(
        &self,
        meet_id: Option<&str>,
        action: ActionType,
        user: &ActingUser,
        payload: Value,
        detail: String,
    ) -> ApiResult<()> {
        let log = ActionLog::new(meet_id, action, &user.user_id, Some(payload), detail);
        self.action_log_repo.insert(&log)?;
        Ok(())
    }

    fn config_error(err: Box<dyn std::error::Error>) -> ApiError {
        ApiError::InternalError(format!("config read failed: {}", err))
    }
}

/// Writes placements back onto the bouts they name
fn apply_placements(bouts: &mut [Bout], placements: &[Placement]) {
    let by_id: HashMap<&str, &Placement> =
        placements.iter().map(|p| (p.bout_id.as_str(), p)).collect();
    for bout in bouts.iter_mut() {
        if let Some(p) = by_id.get(bout.bout_id.as_str()) {
            bout.mat = p.mat;
            bout.order = p.order;
        }
    }
}
