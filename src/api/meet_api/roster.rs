use super::*;

impl MeetApi {
    // ==========================================
    // meet setup
    // ==========================================

    /// Creates a meet between `team_ids` with the configured mat defaults
    ///
    /// A coach must belong to one of the participating teams.
    pub fn create_meet(
        &self,
        user: &ActingUser,
        name: &str,
        meet_date: NaiveDate,
        home_team_id: Option<&str>,
        team_ids: &[String],
    ) -> ApiResult<Meet> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("meet name must not be empty".to_string()));
        }
        if team_ids.len() < 2 {
            return Err(ApiError::InvalidInput(
                "a dual meet needs at least two teams".to_string(),
            ));
        }
        if let Some(home) = home_team_id {
            if !team_ids.iter().any(|t| t == home) {
                return Err(ApiError::InvalidInput(format!(
                    "home team {} is not a participant",
                    home
                )));
            }
        }
        require_editor(user, team_ids)?;
        for team_id in team_ids {
            if self.team_repo.find_by_id(team_id)?.is_none() {
                return Err(ApiError::NotFound(format!("Team(id={})", team_id)));
            }
        }

        let mat_defaults = self.config.mat_defaults().map_err(Self::config_error)?;
        let pairing_defaults = self.config.pairing_defaults().map_err(Self::config_error)?;

        let mut meet = Meet::new(name.trim(), meet_date, home_team_id.map(|h| h.to_string()));
        meet.num_mats = mat_defaults.num_mats;
        meet.min_rest_bouts = mat_defaults.min_rest_bouts;
        meet.rest_penalty = mat_defaults.rest_penalty;
        meet.max_matches_per_wrestler = pairing_defaults.max_matches_per_wrestler;

        self.meet_repo.insert(&meet)?;
        for team_id in team_ids {
            self.meet_repo.add_team(&meet.meet_id, team_id)?;
        }

        self.record(
            Some(&meet.meet_id),
            ActionType::CreateMeet,
            user,
            json!({ "name": meet.name, "meet_date": meet.meet_date.to_string(), "teams": team_ids }),
            format!("created meet {}", meet.name),
        )?;
        Ok(meet)
    }

    /// Soft-deletes a meet; later mutations fail with StateViolation
    pub fn delete_meet(&self, meet_id: &str, user: &ActingUser) -> ApiResult<()> {
        self.begin_edit(meet_id, user)?;
        self.meet_repo.soft_delete(meet_id, self.clock.now())?;

        self.record(
            Some(meet_id),
            ActionType::DeleteMeet,
            user,
            json!({}),
            format!("deleted meet {}", meet_id),
        )?;
        Ok(())
    }

    // ==========================================
    // per-meet wrestler status
    // ==========================================

    /// Marks a wrestler AVAILABLE / ABSENT / NOT_COMING for the meet
    ///
    /// Existing bouts are kept; unavailable wrestlers drop out of the
    /// active bout view and of the next generation run.
    pub fn set_wrestler_status(
        &self,
        meet_id: &str,
        user: &ActingUser,
        wrestler_id: &str,
        status: WrestlerStatus,
    ) -> ApiResult<()> {
        self.begin_edit(meet_id, user)?;
        let wrestler = self.load_wrestler(wrestler_id)?;
        let team_ids = self.meet_repo.list_team_ids(meet_id)?;
        if !team_ids.contains(&wrestler.team_id) {
            return Err(ApiError::InvalidInput(format!(
                "wrestler {} is not on a team in meet {}",
                wrestler_id, meet_id
            )));
        }

        self.wrestler_repo
            .set_status(meet_id, wrestler_id, status, self.clock.now())?;

        self.record(
            Some(meet_id),
            ActionType::SetWrestlerStatus,
            user,
            json!({ "wrestler_id": wrestler_id, "status": status.as_str() }),
            format!("{} marked {}", wrestler.display_name(), status.as_str()),
        )?;
        Ok(())
    }

    pub fn get_wrestler_status(&self, meet_id: &str, wrestler_id: &str) -> ApiResult<WrestlerStatus> {
        self.load_meet(meet_id)?;
        Ok(self.wrestler_repo.get_status(meet_id, wrestler_id)?)
    }

    // ==========================================
    // team mat rules
    // ==========================================

    /// Replaces a team's mat rules; Admin, or a Coach of that team
    pub fn replace_mat_rules(&self, team_id: &str, user: &ActingUser, rules: &[MatRule]) -> ApiResult<usize> {
        if self.team_repo.find_by_id(team_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Team(id={})", team_id)));
        }
        let own_team = user.team_id.as_deref() == Some(team_id);
        if !(user.role == UserRole::Admin || (user.role == UserRole::Coach && own_team)) {
            return Err(ApiError::PermissionDenied(format!(
                "user {} cannot edit mat rules of team {}",
                user.user_id, team_id
            )));
        }
        validate_mat_rules(rules)?;

        let written = self.team_repo.replace_mat_rules(team_id, rules)?;

        self.record(
            None,
            ActionType::ReplaceMatRules,
            user,
            json!({ "team_id": team_id, "rules": rules }),
            format!("replaced {} mat rules of team {}", written, team_id),
        )?;
        Ok(written)
    }

    pub fn list_mat_rules(&self, team_id: &str) -> ApiResult<Vec<MatRule>> {
        Ok(self.team_repo.list_mat_rules(team_id)?)
    }
}
