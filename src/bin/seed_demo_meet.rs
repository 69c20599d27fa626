// Dev utility: reset a database and seed two teams, their coaches and a dual meet.
//
// Usage:
//   cargo run --bin seed_demo_meet -- [db_path] [wrestlers_per_team]
//
// Prints the meet id and the coach user id to feed into `dual-meet-aps generate`.

use chrono::{Duration, Local, NaiveDate};
use std::error::Error;
use std::fs;
use std::path::Path;

use dual_meet_aps::app::{get_default_db_path, AppState};
use dual_meet_aps::domain::{ActingUser, Team, UserAccount, Wrestler};
use dual_meet_aps::UserRole;

const DEFAULT_WRESTLERS_PER_TEAM: usize = 24;

fn main() -> Result<(), Box<dyn Error>> {
    dual_meet_aps::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    let per_team = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_WRESTLERS_PER_TEAM)
        .max(2);

    backup_and_reset_db(&db_path)?;
    let state = AppState::new(db_path.clone())?;

    let meet_date = Local::now().date_naive() + Duration::days(7);
    let teams = [("HAWKS", "Hawks", "HWK"), ("BEARS", "Bears", "BRS")];

    for (team_id, name, symbol) in teams {
        state.team_repo.insert(&Team {
            team_id: team_id.to_string(),
            name: name.to_string(),
            symbol: Some(symbol.to_string()),
        })?;
        state.user_repo.insert(&UserAccount {
            user_id: format!("coach-{}", team_id.to_lowercase()),
            display_name: format!("{} Coach", name),
            role: UserRole::Coach,
            team_id: Some(team_id.to_string()),
        })?;
        for idx in 0..per_team {
            state.wrestler_repo.insert(&demo_wrestler(team_id, idx, meet_date))?;
        }
    }

    let coach = ActingUser::new("coach-hawks", UserRole::Coach, Some("HAWKS"));
    let meet = state.meet_api.create_meet(
        &coach,
        "Hawks vs Bears",
        meet_date,
        Some("HAWKS"),
        &["HAWKS".to_string(), "BEARS".to_string()],
    )?;

    println!("db_path={}", db_path);
    println!("meet_id={}", meet.meet_id);
    println!("user_id={}", coach.user_id);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

/// Deterministic spread of ages 6..14, weights 45..120 lb, experience 0..5
fn demo_wrestler(team_id: &str, idx: usize, meet_date: NaiveDate) -> Wrestler {
    let age_days = 6 * 365 + (idx as i64 * 137) % (8 * 365);
    let experience = ((age_days / 365 - 6) as u32).min(5);
    Wrestler {
        wrestler_id: format!("{}-{:02}", team_id, idx + 1),
        team_id: team_id.to_string(),
        first_name: format!("W{}", idx + 1),
        last_name: team_id.to_string(),
        birthdate: meet_date - Duration::days(age_days),
        weight: 45.0 + (age_days as f64 / 365.0 - 6.0) * 9.0 + (idx % 3) as f64 * 1.5,
        experience_years: if idx % 4 == 0 { 0 } else { experience.max(1) },
        skill: (idx % 5) as i32,
        active: true,
    }
}
