use super::*;

impl MeetApi {
    // ==========================================
    // pair generation
    // ==========================================

    /// Pairing defaults for a meet (config_kv, with the meet's match cap)
    pub fn default_pairing_settings(&self, meet_id: &str) -> ApiResult<PairingSettings> {
        let meet = self.load_meet(meet_id)?;
        self.config.pairing_settings_for(&meet).map_err(Self::config_error)
    }

    /// Regenerates the meet's bouts and schedules them
    ///
    /// Locked and forced bouts are kept and seeded into the selection;
    /// every other bout is replaced. The new set is placed on mats and
    /// ordered before it is written, in one transaction.
    #[instrument(skip(self, user, settings), fields(user_id = %user.user_id))]
    pub fn generate_pairings(
        &self,
        meet_id: &str,
        user: &ActingUser,
        settings: &PairingSettings,
    ) -> ApiResult<GeneratePairingsResponse> {
        validate_pairing_settings(settings)?;
        let meet = self.begin_edit(meet_id, user)?;
        let mat_settings = self.config.mat_settings_for(&meet);

        // 1. roster minus unavailable wrestlers
        let unavailable = self.wrestler_repo.list_unavailable_ids(meet_id)?;
        let roster: Vec<Wrestler> = self
            .wrestler_repo
            .list_active_for_meet(meet_id)?
            .into_iter()
            .filter(|w| !unavailable.contains(&w.wrestler_id))
            .collect();

        // 2. pinned bouts survive; only those with two available wrestlers reserve capacity
        let existing = self.bout_repo.list_by_meet(meet_id)?;
        let (mut pinned, replaced): (Vec<Bout>, Vec<Bout>) =
            existing.into_iter().partition(|b| b.is_pinned());
        let seeds: Vec<Bout> = pinned
            .iter()
            .filter(|b| !unavailable.contains(&b.red_id) && !unavailable.contains(&b.green_id))
            .cloned()
            .collect();

        // 3. select
        let excluded = self.pair_repo.excluded_key_set(meet_id)?;
        let run_id = uuid::Uuid::new_v4().to_string();
        let result = self.generator.generate(&GenerationInput {
            meet_id,
            run_id: &run_id,
            roster: &roster,
            pinned: &seeds,
            excluded: &excluded,
            settings,
        });

        // 4. preferred mats, then placement
        let resolver = self.resolver_for(&meet)?;
        let wrestlers = self.wrestler_index(meet_id, &pinned)?;
        let previous: HashMap<PairKey, (u32, u32)> = if settings.preserve_mats {
            replaced
                .iter()
                .filter_map(|b| b.pair_key().map(|k| (k, (b.mat, b.order))))
                .collect()
        } else {
            HashMap::new()
        };

        let mut created = result.bouts;
        let mut items: Vec<SequenceItem> = Vec::with_capacity(pinned.len() + created.len());
        for bout in &pinned {
            let preferred = if bout.locked {
                bout.mat
            } else {
                Self::preferred_mat(&resolver, &wrestlers, bout, meet.meet_date, mat_settings.num_mats)
            };
            items.push(SequenceItem::from_bout(bout, preferred));
        }
        for bout in &created {
            // a surviving pair stays on its mat; only its order is recomputed
            let item = match bout.pair_key().and_then(|k| previous.get(&k).copied()) {
                Some((mat, order)) => {
                    let mut item = SequenceItem::from_bout(bout, mat).with_fixed_mat();
                    item.current = Some((mat, order));
                    item
                }
                None => SequenceItem::from_bout(
                    bout,
                    Self::preferred_mat(&resolver, &wrestlers, bout, meet.meet_date, mat_settings.num_mats),
                ),
            };
            items.push(item);
        }

        let placements = RestAwareSequencer::new(mat_settings).assign(&items);
        apply_placements(&mut pinned, &placements);
        apply_placements(&mut created, &placements);

        // 5. persist
        let keep_ids: HashSet<String> = pinned.iter().map(|b| b.bout_id.clone()).collect();
        let (deleted, inserted) =
            self.bout_repo
                .replace_for_meet(meet_id, &keep_ids, &created, &pinned)?;
        self.pair_repo.upsert_rejected(&result.rejected, self.clock.now())?;

        info!(
            meet_id,
            run_id = %run_id,
            deleted,
            inserted,
            kept = pinned.len(),
            rejected = result.rejected.len(),
            candidate_edges = result.candidate_edge_count,
            "pairings generated"
        );

        let response = GeneratePairingsResponse {
            run_id: run_id.clone(),
            created_count: inserted,
            rejected_count: result.rejected.len(),
            kept_count: pinned.len(),
        };

        self.record(
            Some(meet_id),
            ActionType::GeneratePairings,
            user,
            json!({
                "run_id": run_id,
                "settings": settings,
                "created": response.created_count,
                "rejected": response.rejected_count,
                "kept": response.kept_count,
                "deleted": deleted,
            }),
            format!(
                "generated {} bouts ({} kept, {} rejected)",
                response.created_count, response.kept_count, response.rejected_count
            ),
        )?;

        Ok(response)
    }

    /// Creates a FORCED bout between two wrestlers, bypassing eligibility
    ///
    /// Absence is still respected. When the pair already has a bout the
    /// existing bout is returned unchanged.
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub fn force_pair(
        &self,
        meet_id: &str,
        user: &ActingUser,
        wrestler_a: &str,
        wrestler_b: &str,
    ) -> ApiResult<Bout> {
        let pair = validate_pair(wrestler_a, wrestler_b)?;
        let meet = self.begin_edit(meet_id, user)?;

        let team_ids = self.meet_repo.list_team_ids(meet_id)?;
        let a = self.load_wrestler(&pair.low)?;
        let b = self.load_wrestler(&pair.high)?;
        for w in [&a, &b] {
            if !team_ids.contains(&w.team_id) {
                return Err(ApiError::InvalidInput(format!(
                    "wrestler {} is not on a team in meet {}",
                    w.wrestler_id, meet_id
                )));
            }
            let status = self.wrestler_repo.get_status(meet_id, &w.wrestler_id)?;
            if status.is_unavailable() {
                return Err(ApiError::StateViolation(format!(
                    "wrestler {} is {} for this meet",
                    w.wrestler_id,
                    status.as_str()
                )));
            }
        }

        if let Some(existing) = self.bout_repo.find_by_pair(meet_id, &pair)? {
            info!(meet_id, pair = %pair, bout_id = %existing.bout_id, "pair already scheduled");
            return Ok(existing);
        }

        let resolver = self.resolver_for(&meet)?;
        let mut bout = Bout::new(meet_id, &pair, BoutType::Forced);
        bout.mat = resolver.preferred_mat_within(&a, &b, meet.meet_date, meet.num_mats);
        bout.order = self
            .bout_repo
            .list_by_meet(meet_id)?
            .iter()
            .filter(|x| x.mat == bout.mat)
            .map(|x| x.order)
            .max()
            .unwrap_or(0)
            + 1;

        self.bout_repo.insert(&bout)?;

        self.record(
            Some(meet_id),
            ActionType::ForcePair,
            user,
            json!({ "bout_id": bout.bout_id, "red_id": bout.red_id, "green_id": bout.green_id }),
            format!(
                "forced {} vs {} on mat {} #{}",
                a.display_name(),
                b.display_name(),
                bout.mat,
                bout.order
            ),
        )?;

        Ok(bout)
    }

    /// Deletes the meet's bouts, optionally keeping locked ones
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub fn delete_pairings(&self, meet_id: &str, user: &ActingUser, keep_locked: bool) -> ApiResult<usize> {
        self.begin_edit(meet_id, user)?;
        let deleted = self.bout_repo.delete_by_meet(meet_id, keep_locked)?;

        self.record(
            Some(meet_id),
            ActionType::DeletePairings,
            user,
            json!({ "deleted": deleted, "keep_locked": keep_locked }),
            format!("deleted {} bouts", deleted),
        )?;
        Ok(deleted)
    }

    // ==========================================
    // excluded / rejected pairs
    // ==========================================

    /// Adds a standing veto on a pair; existing bouts are left alone
    pub fn add_excluded_pair(
        &self,
        meet_id: &str,
        user: &ActingUser,
        wrestler_a: &str,
        wrestler_b: &str,
    ) -> ApiResult<ExcludedPair> {
        let pair = validate_pair(wrestler_a, wrestler_b)?;
        self.begin_edit(meet_id, user)?;
        self.load_wrestler(&pair.low)?;
        self.load_wrestler(&pair.high)?;

        if self.pair_repo.excluded_exists(meet_id, &pair)? {
            return Err(ApiError::DuplicatePair(format!(
                "pair {} is already excluded in meet {}",
                pair, meet_id
            )));
        }

        let excluded = ExcludedPair {
            meet_id: meet_id.to_string(),
            pair,
            created_by: user.user_id.clone(),
            created_at: self.clock.now(),
        };
        self.pair_repo.insert_excluded(&excluded)?;

        self.record(
            Some(meet_id),
            ActionType::AddExcludedPair,
            user,
            json!({ "low": excluded.pair.low, "high": excluded.pair.high }),
            format!("excluded pair {}", excluded.pair),
        )?;
        Ok(excluded)
    }

    pub fn remove_excluded_pair(
        &self,
        meet_id: &str,
        user: &ActingUser,
        wrestler_a: &str,
        wrestler_b: &str,
    ) -> ApiResult<()> {
        let pair = validate_pair(wrestler_a, wrestler_b)?;
        self.begin_edit(meet_id, user)?;

        if self.pair_repo.delete_excluded(meet_id, &pair)? == 0 {
            return Err(ApiError::NotFound(format!(
                "ExcludedPair(meet={}, pair={})",
                meet_id, pair
            )));
        }

        self.record(
            Some(meet_id),
            ActionType::RemoveExcludedPair,
            user,
            json!({ "low": pair.low, "high": pair.high }),
            format!("removed excluded pair {}", pair),
        )?;
        Ok(())
    }

    pub fn list_excluded_pairs(&self, meet_id: &str) -> ApiResult<Vec<ExcludedPair>> {
        self.load_meet(meet_id)?;
        Ok(self.pair_repo.list_excluded(meet_id)?)
    }

    pub fn list_rejected_pairs(&self, meet_id: &str) -> ApiResult<Vec<RejectedPair>> {
        self.load_meet(meet_id)?;
        Ok(self.pair_repo.list_rejected(meet_id)?)
    }
}
