// ==========================================
// Dual Meet APS - engine layer
// ==========================================
// Pure pairing and scheduling rules; no SQL, no audit writes
// ==========================================

pub mod eligibility;
pub mod mat_rule;
pub mod meet_lock;
pub mod pair_generator;
pub mod sequencer;

pub use eligibility::{EligibilityEvaluator, Evaluation};
pub use mat_rule::{BoutProfile, MatRuleResolver};
pub use meet_lock::{
    Clock, LockDecision, LockTransition, MeetLockPolicy, MeetLockState, SystemClock,
    MEET_LOCK_TTL_SECS,
};
pub use pair_generator::{CandidateEdge, GenerationInput, GenerationResult, PairGenerator};
pub use sequencer::{mat_loads, total_rest_penalty, Placement, RestAwareSequencer, SequenceItem};
