use super::*;

impl MeetApi {
    // ==========================================
    // mat assignment / reordering
    // ==========================================

    /// Places every bout of the meet on a mat and orders each mat
    ///
    /// The settings are stored on the meet row so later reorders use them.
    #[instrument(skip(self, user, settings), fields(user_id = %user.user_id))]
    pub fn assign_mats(
        &self,
        meet_id: &str,
        user: &ActingUser,
        settings: &MatSettings,
    ) -> ApiResult<AssignMatsResponse> {
        validate_mat_settings(settings)?;
        let meet = self.begin_edit(meet_id, user)?;

        let mut bouts = self.bout_repo.list_by_meet(meet_id)?;
        let resolver = self.resolver_for(&meet)?;
        let wrestlers = self.wrestler_index(meet_id, &bouts)?;

        let items: Vec<SequenceItem> = bouts
            .iter()
            .map(|b| {
                let preferred = if b.locked {
                    b.mat
                } else {
                    Self::preferred_mat(&resolver, &wrestlers, b, meet.meet_date, settings.num_mats)
                };
                SequenceItem::from_bout(b, preferred)
            })
            .collect();

        let placements = RestAwareSequencer::new(settings.clone()).assign(&items);
        apply_placements(&mut bouts, &placements);

        self.meet_repo.update_mat_settings(meet_id, settings)?;
        let assigned = self.bout_repo.update_schedule(&bouts)?;
        let total_penalty = total_rest_penalty(&bouts, settings.min_rest_bouts, settings.rest_penalty);

        info!(meet_id, assigned, total_penalty, "mats assigned");

        self.record(
            Some(meet_id),
            ActionType::AssignMats,
            user,
            json!({ "settings": settings, "assigned": assigned, "total_penalty": total_penalty }),
            format!("assigned {} bouts to {} mats", assigned, settings.num_mats),
        )?;

        Ok(AssignMatsResponse {
            assigned_count: assigned,
            total_penalty,
        })
    }

    /// Recomputes the order within each mat; mats are not reassigned
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub fn reorder_bouts(&self, meet_id: &str, user: &ActingUser) -> ApiResult<ReorderBoutsResponse> {
        let meet = self.begin_edit(meet_id, user)?;
        let settings = self.config.mat_settings_for(&meet);

        let mut bouts = self.bout_repo.list_by_meet(meet_id)?;
        let penalty_before = total_rest_penalty(&bouts, settings.min_rest_bouts, settings.rest_penalty);

        let items: Vec<SequenceItem> = bouts.iter().map(|b| SequenceItem::from_bout(b, b.mat)).collect();
        let placements = RestAwareSequencer::new(settings.clone()).reorder(&items);
        apply_placements(&mut bouts, &placements);

        let reordered = self.bout_repo.update_schedule(&bouts)?;
        let penalty_after = total_rest_penalty(&bouts, settings.min_rest_bouts, settings.rest_penalty);

        info!(meet_id, reordered, penalty_before, penalty_after, "bouts reordered");

        self.record(
            Some(meet_id),
            ActionType::ReorderBouts,
            user,
            json!({ "reordered": reordered, "penalty_before": penalty_before, "penalty_after": penalty_after }),
            format!("reordered {} bouts, penalty {} -> {}", reordered, penalty_before, penalty_after),
        )?;

        Ok(ReorderBoutsResponse {
            reordered_count: reordered,
            penalty_before,
            penalty_after,
        })
    }

    /// Mat settings stored on the meet row
    pub fn meet_mat_settings(&self, meet_id: &str) -> ApiResult<MatSettings> {
        let meet = self.load_meet(meet_id)?;
        Ok(self.config.mat_settings_for(&meet))
    }

    /// Current rest penalty and per-mat load of the stored schedule
    pub fn rest_penalty_report(&self, meet_id: &str) -> ApiResult<RestPenaltyReport> {
        let meet = self.load_meet(meet_id)?;
        let settings = self.config.mat_settings_for(&meet);
        let bouts = self.bout_repo.list_by_meet(meet_id)?;

        Ok(RestPenaltyReport {
            meet_id: meet_id.to_string(),
            bout_count: bouts.len(),
            total_penalty: total_rest_penalty(&bouts, settings.min_rest_bouts, settings.rest_penalty),
            mat_loads: mat_loads(&bouts, settings.num_mats),
        })
    }

    // ==========================================
    // single bout edits
    // ==========================================

    /// Locks or unlocks a bout; a bout with an unavailable wrestler cannot be locked
    pub fn set_bout_locked(&self, bout_id: &str, user: &ActingUser, locked: bool) -> ApiResult<Bout> {
        let mut bout = self.load_bout(bout_id)?;
        self.begin_edit(&bout.meet_id, user)?;

        if locked {
            for id in [&bout.red_id, &bout.green_id] {
                let status = self.wrestler_repo.get_status(&bout.meet_id, id)?;
                if status.is_unavailable() {
                    return Err(ApiError::StateViolation(format!(
                        "bout {} cannot be locked: wrestler {} is {}",
                        bout_id,
                        id,
                        status.as_str()
                    )));
                }
            }
        }

        self.bout_repo.set_locked(bout_id, locked)?;
        bout.locked = locked;

        let action = if locked { ActionType::LockBout } else { ActionType::UnlockBout };
        self.record(
            Some(&bout.meet_id),
            action,
            user,
            json!({ "bout_id": bout_id }),
            format!("{} bout {}", if locked { "locked" } else { "unlocked" }, bout_id),
        )?;
        Ok(bout)
    }

    pub fn update_bout_notes(&self, bout_id: &str, user: &ActingUser, notes: Option<&str>) -> ApiResult<Bout> {
        let mut bout = self.load_bout(bout_id)?;
        self.begin_edit(&bout.meet_id, user)?;

        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        self.bout_repo.update_notes(bout_id, notes)?;
        bout.notes = notes.map(|n| n.to_string());

        self.record(
            Some(&bout.meet_id),
            ActionType::UpdateBoutNotes,
            user,
            json!({ "bout_id": bout_id, "notes": notes }),
            format!("updated notes of bout {}", bout_id),
        )?;
        Ok(bout)
    }

    // ==========================================
    // queries (no lock)
    // ==========================================

    /// Every stored bout ordered by (mat, order)
    pub fn list_bouts(&self, meet_id: &str) -> ApiResult<Vec<Bout>> {
        self.load_meet(meet_id)?;
        Ok(self.bout_repo.list_by_meet(meet_id)?)
    }

    /// Bouts whose wrestlers are both available; filtered rows stay stored
    pub fn list_active_bouts(&self, meet_id: &str) -> ApiResult<Vec<Bout>> {
        self.load_meet(meet_id)?;
        let unavailable = self.wrestler_repo.list_unavailable_ids(meet_id)?;
        Ok(self
            .bout_repo
            .list_by_meet(meet_id)?
            .into_iter()
            .filter(|b| !unavailable.contains(&b.red_id) && !unavailable.contains(&b.green_id))
            .collect())
    }
}
