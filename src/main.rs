// ==========================================
// Dual Meet APS - command line entry
// ==========================================
// Usage:
//   dual-meet-aps [db_path] init
//   dual-meet-aps [db_path] generate <meet_id> <user_id>
//   dual-meet-aps [db_path] assign-mats <meet_id> <user_id> [num_mats]
//   dual-meet-aps [db_path] reorder <meet_id> <user_id>
//   dual-meet-aps [db_path] report <meet_id>
//   dual-meet-aps [db_path] release <user_id>
//
// db_path defaults to $DUAL_MEET_APS_DB_PATH or the user data dir.
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use dual_meet_aps::app::{get_default_db_path, AppState};
use dual_meet_aps::domain::ActingUser;
use dual_meet_aps::logging;

const COMMANDS: [&str; 6] = ["init", "generate", "assign-mats", "reorder", "report", "release"];

fn main() -> Result<()> {
    logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let db_path = match args.first() {
        Some(first) if !COMMANDS.contains(&first.as_str()) => args.remove(0),
        _ => get_default_db_path(),
    };
    let command = if args.is_empty() {
        bail!("missing command, expected one of: {}", COMMANDS.join(", "));
    } else {
        args.remove(0)
    };

    tracing::info!(version = dual_meet_aps::VERSION, db_path = %db_path, command = %command, "{}", dual_meet_aps::APP_NAME);

    let state = AppState::new(db_path.clone()).map_err(|e| anyhow!(e))?;
    let api = state.meet_api.clone();

    match command.as_str() {
        "init" => {
            println!("database ready: {}", db_path);
        }
        "generate" => {
            let (meet_id, user) = meet_and_user(&state, &args)?;
            let settings = api.default_pairing_settings(meet_id)?;
            let response = api.generate_pairings(meet_id, &user, &settings)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        "assign-mats" => {
            let (meet_id, user) = meet_and_user(&state, &args)?;
            let mut settings = api.meet_mat_settings(meet_id)?;
            if let Some(raw) = args.get(2) {
                settings.num_mats = raw
                    .parse()
                    .with_context(|| format!("num_mats must be a positive integer, got {}", raw))?;
            }
            let response = api.assign_mats(meet_id, &user, &settings)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        "reorder" => {
            let (meet_id, user) = meet_and_user(&state, &args)?;
            let response = api.reorder_bouts(meet_id, &user)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        "report" => {
            let meet_id = args.first().context("usage: report <meet_id>")?;
            let report = api.rest_penalty_report(meet_id)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            for bout in api.list_active_bouts(meet_id)? {
                println!(
                    "mat {} #{:>3}  {} vs {}{}",
                    bout.mat,
                    bout.order,
                    bout.red_id,
                    bout.green_id,
                    if bout.locked { "  [locked]" } else { "" }
                );
            }
        }
        "release" => {
            let user_id = args.first().context("usage: release <user_id>")?;
            let released = api.release_meet_locks(user_id)?;
            println!("released={}", released);
        }
        other => bail!("unknown command {}, expected one of: {}", other, COMMANDS.join(", ")),
    }

    Ok(())
}

/// `<meet_id> <user_id>` with the user resolved from the users table
fn meet_and_user<'a>(state: &AppState, args: &'a [String]) -> Result<(&'a str, ActingUser)> {
    let meet_id = args.first().context("missing <meet_id>")?;
    let user_id = args.get(1).context("missing <user_id>")?;
    let account = state
        .user_repo
        .find_by_id(user_id)?
        .ok_or_else(|| anyhow!("unknown user {}", user_id))?;
    let user = ActingUser::new(&account.user_id, account.role, account.team_id.as_deref());
    Ok((meet_id.as_str(), user))
}
