use super::*;

impl MeetApi {
    // ==========================================
    // meet edit lock
    // ==========================================

    /// Acquires or renews the edit lock of a meet for `user_id`
    ///
    /// # Returns
    /// - Ok(MeetLockGrant): lock held until `expires_at`
    /// - Err(ApiError::LockConflict): another user holds a live lock
    #[instrument(skip(self))]
    pub fn acquire_meet_lock(&self, meet_id: &str, user_id: &str) -> ApiResult<MeetLockGrant> {
        if user_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("user_id must not be empty".to_string()));
        }
        let meet = self.load_live_meet(meet_id)?;
        self.lock_meet(&meet, user_id)
    }

    /// Clears every lock held by `user_id` (logout, "done editing")
    #[instrument(skip(self))]
    pub fn release_meet_locks(&self, user_id: &str) -> ApiResult<usize> {
        if user_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("user_id must not be empty".to_string()));
        }
        let released = self.meet_repo.release_locks_held_by(user_id)?;
        info!(user_id, released, "meet locks released");

        if released > 0 {
            let log = ActionLog::new(
                None,
                ActionType::ReleaseLocks,
                user_id,
                Some(json!({ "released": released })),
                format!("released {} meet lock(s)", released),
            );
            self.action_log_repo.insert(&log)?;
        }
        Ok(released)
    }

    /// Current lock state as stored; expiry is not applied here
    pub fn meet_lock_state(&self, meet_id: &str) -> ApiResult<MeetLockState> {
        let meet = self.load_meet(meet_id)?;
        Ok(MeetLockState::of(&meet))
    }

    pub(super) fn lock_meet(&self, meet: &Meet, user_id: &str) -> ApiResult<MeetLockGrant> {
        let now = self.clock.now();
        let state = MeetLockState::of(meet);

        match self.lock_policy.decide(&state, user_id, now) {
            LockDecision::Conflict { holder, expires_at } => {
                Err(self.lock_conflict(&meet.meet_id, &holder, expires_at)?)
            }
            LockDecision::Grant {
                locked_at,
                expires_at,
                transition,
            } => {
                if transition == LockTransition::TakenOverExpired {
                    self.meet_repo.clear_expired_lock(&meet.meet_id, now)?;
                    info!(
                        meet_id = %meet.meet_id,
                        previous_holder = state.holder().unwrap_or_default(),
                        "expired meet lock cleared"
                    );
                }

                // The stamp re-checks the row; losing a race here means another
                // user stamped between our read and our write.
                if !self
                    .meet_repo
                    .try_stamp_lock(&meet.meet_id, user_id, locked_at, expires_at)?
                {
                    let current = self.load_meet(&meet.meet_id)?;
                    return match MeetLockState::of(&current) {
                        MeetLockState::Locked {
                            holder, expires_at, ..
                        } => Err(self.lock_conflict(&meet.meet_id, &holder, expires_at)?),
                        MeetLockState::Unlocked => Err(ApiError::InternalError(format!(
                            "lock stamp on meet {} failed without a holder",
                            meet.meet_id
                        ))),
                    };
                }

                Ok(MeetLockGrant {
                    meet_id: meet.meet_id.clone(),
                    holder_id: user_id.to_string(),
                    locked_at,
                    expires_at,
                })
            }
        }
    }

    /// Builds the conflict error; resolving the display name can itself fail
    fn lock_conflict(
        &self,
        meet_id: &str,
        holder_id: &str,
        expires_at: NaiveDateTime,
    ) -> ApiResult<ApiError> {
        let holder_name = self.user_repo.display_name(holder_id)?;
        warn!(meet_id, holder_id, %expires_at, "meet lock conflict");
        Ok(ApiError::LockConflict {
            meet_id: meet_id.to_string(),
            holder_id: holder_id.to_string(),
            holder_name,
            expires_at,
        })
    }
}
