// ==========================================
// Dual Meet APS - meet edit lock state machine
// ==========================================
// Unlocked -> Locked(holder, expiresAt) -> Unlocked
// Expiry is checked lazily when someone tries to acquire; there is no sweep.
// The lock is cooperative: every mutating API call acquires (and thereby
// renews) it before touching the meet's bouts.
// ==========================================

use crate::domain::meet::Meet;
use chrono::{Duration, NaiveDateTime};

/// Lock lifetime; renewed on every mutating action
pub const MEET_LOCK_TTL_SECS: i64 = 120;

// ==========================================
// Clock
// ==========================================
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in UTC
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Utc::now().naive_utc()
    }
}

// ==========================================
// MeetLockState
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetLockState {
    Unlocked,
    Locked {
        holder: String,
        locked_at: NaiveDateTime,
        expires_at: NaiveDateTime,
    },
}

impl MeetLockState {
    /// Reads the lock triple of a meet; a partial triple counts as unlocked
    pub fn of(meet: &Meet) -> Self {
        match (&meet.lock_holder, meet.locked_at, meet.lock_expires_at) {
            (Some(holder), Some(locked_at), Some(expires_at)) => MeetLockState::Locked {
                holder: holder.clone(),
                locked_at,
                expires_at,
            },
            _ => MeetLockState::Unlocked,
        }
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        match self {
            MeetLockState::Unlocked => false,
            MeetLockState::Locked { expires_at, .. } => *expires_at <= now,
        }
    }

    pub fn holder(&self) -> Option<&str> {
        match self {
            MeetLockState::Unlocked => None,
            MeetLockState::Locked { holder, .. } => Some(holder),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTransition {
    Fresh,
    Renewed,
    TakenOverExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockDecision {
    Grant {
        locked_at: NaiveDateTime,
        expires_at: NaiveDateTime,
        transition: LockTransition,
    },
    Conflict {
        holder: String,
        expires_at: NaiveDateTime,
    },
}

// ==========================================
// MeetLockPolicy
// ==========================================
pub struct MeetLockPolicy {
    ttl: Duration,
}

impl Default for MeetLockPolicy {
    fn default() -> Self {
        Self::new(Duration::seconds(MEET_LOCK_TTL_SECS))
    }
}

impl MeetLockPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Decides an acquire attempt by `user_id` at `now`
    ///
    /// - unlocked, or held by the same user: (re)stamp
    /// - held by another user and expired: clear, then stamp
    /// - held by another user and live: conflict
    pub fn decide(&self, state: &MeetLockState, user_id: &str, now: NaiveDateTime) -> LockDecision {
        let grant = |transition| LockDecision::Grant {
            locked_at: now,
            expires_at: now + self.ttl,
            transition,
        };

        match state {
            MeetLockState::Unlocked => grant(LockTransition::Fresh),
            MeetLockState::Locked { holder, .. } if holder == user_id => grant(LockTransition::Renewed),
            MeetLockState::Locked { .. } if state.is_expired(now) => grant(LockTransition::TakenOverExpired),
            MeetLockState::Locked {
                holder, expires_at, ..
            } => LockDecision::Conflict {
                holder: holder.clone(),
                expires_at: *expires_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap().and_hms_opt(9, 0, 0).unwrap()
    }

    fn locked_by(holder: &str, at: NaiveDateTime) -> MeetLockState {
        MeetLockState::Locked {
            holder: holder.to_string(),
            locked_at: at,
            expires_at: at + Duration::seconds(MEET_LOCK_TTL_SECS),
        }
    }

    #[test]
    fn test_unlocked_grants_fresh_lock() {
        let policy = MeetLockPolicy::default();
        match policy.decide(&MeetLockState::Unlocked, "u1", t0()) {
            LockDecision::Grant { expires_at, transition, .. } => {
                assert_eq!(transition, LockTransition::Fresh);
                assert_eq!(expires_at, t0() + Duration::seconds(120));
            }
            other => panic!("expected grant, got {:?}", other),
        }
    }

    #[test]
    fn test_holder_renews() {
        let policy = MeetLockPolicy::default();
        let later = t0() + Duration::seconds(60);
        match policy.decide(&locked_by("u1", t0()), "u1", later) {
            LockDecision::Grant { locked_at, expires_at, transition } => {
                assert_eq!(transition, LockTransition::Renewed);
                assert_eq!(locked_at, later);
                assert_eq!(expires_at, later + Duration::seconds(120));
            }
            other => panic!("expected grant, got {:?}", other),
        }
    }

    #[test]
    fn test_other_user_conflicts_until_expiry() {
        let policy = MeetLockPolicy::default();
        let state = locked_by("u1", t0());

        let during = t0() + Duration::seconds(119);
        assert_eq!(
            policy.decide(&state, "u2", during),
            LockDecision::Conflict {
                holder: "u1".to_string(),
                expires_at: t0() + Duration::seconds(120),
            }
        );

        let after = t0() + Duration::seconds(120);
        assert!(matches!(
            policy.decide(&state, "u2", after),
            LockDecision::Grant { transition: LockTransition::TakenOverExpired, .. }
        ));
    }

    #[test]
    fn test_partial_triple_is_unlocked() {
        let mut meet = Meet::new("Dual", t0().date(), None);
        meet.lock_holder = Some("u1".to_string());
        assert_eq!(MeetLockState::of(&meet), MeetLockState::Unlocked);
    }
}
