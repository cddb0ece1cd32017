//! `/curse` command executor
//!
//! Parses the arguments with clap, checks the sender's permission and
//! calls into the manager. Every reply goes to the sender through the world.

use clap::{Parser, Subcommand};
use curse_core::leaderboard::{RankedEntry, format_duration_ms};
use curse_core::plague::PlagueError;
use curse_core::world::{Feedback, ParticipantId, Tone, World};

use crate::app_state::AppState;

pub const PERM_START: &str = "curse.start";
pub const PERM_STOP: &str = "curse.stop";
pub const PERM_USE: &str = "curse.use";
pub const PERM_RELOAD: &str = "curse.reload";
pub const PERM_ADMIN: &str = "curse.admin";

const NO_PERMISSION: &str = "You don't have permission to use this command!";

#[derive(Parser)]
#[command(name = "curse", no_binary_name = true, disable_help_subcommand = true)]
struct CurseCli {
    #[command(subcommand)]
    command: Option<CurseAction>,
}

#[derive(Subcommand)]
enum CurseAction {
    /// Start a curse where you stand
    Start {
        /// Ignore the restart cooldown (admin only)
        #[arg(short, long)]
        force: bool,
    },
    /// Stop your active curse
    Stop,
    /// Reset your curse
    Reset {
        /// Arm the restart cooldown
        #[arg(short, long)]
        cooldown: bool,
    },
    /// Show the leaderboard
    #[command(alias = "lb")]
    Leaderboard,
    /// Reload configuration and leaderboard
    Reload,
    Help,
}

/// Run `/curse <args>` as `sender`. `Err` carries a usage error.
pub fn execute(state: &mut AppState, sender: ParticipantId, args: &[String]) -> Result<(), String> {
    let cli = CurseCli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command.unwrap_or(CurseAction::Help) {
        CurseAction::Start { force } => {
            if !state.world.has_permission(sender, PERM_START) {
                return deny(state, sender);
            }
            if force && !state.world.has_permission(sender, PERM_ADMIN) {
                return deny(state, sender);
            }
            // Refusals already told the sender why
            match state.manager.start_session(&mut state.world, sender, force) {
                Ok(()) | Err(PlagueError::Admission(_)) => {}
                Err(e) => return Err(e.to_string()),
            }
        }
        CurseAction::Stop => {
            if !state.world.has_permission(sender, PERM_STOP) {
                return deny(state, sender);
            }
            match state.manager.stop_session(&mut state.world, sender) {
                Ok(snapshot) => state.world.send_message(
                    sender,
                    Feedback::success(format!(
                        "Your curse has been stopped. You reached round {} with {} kills.",
                        snapshot.round_reached, snapshot.total_kills
                    )),
                ),
                Err(PlagueError::NoActiveSession(_)) => state
                    .world
                    .send_message(sender, Feedback::error("You don't have an active curse!")),
                Err(e) => return Err(e.to_string()),
            }
        }
        CurseAction::Reset { cooldown } => {
            if !state.world.has_permission(sender, PERM_STOP) {
                return deny(state, sender);
            }
            state.manager.reset_session(&mut state.world, sender, cooldown);
        }
        CurseAction::Leaderboard => {
            if !state.world.has_permission(sender, PERM_USE) {
                return deny(state, sender);
            }
            for line in leaderboard_lines(state, sender) {
                state.world.send_message(sender, line);
            }
        }
        CurseAction::Reload => {
            if !state.world.has_permission(sender, PERM_RELOAD) {
                return deny(state, sender);
            }
            match state.reload() {
                Ok(()) => state
                    .world
                    .send_message(sender, Feedback::success("Configuration reloaded!")),
                Err(e) => {
                    tracing::error!(error = %e, "Config reload failed");
                    state.world.send_message(
                        sender,
                        Feedback::error(format!("Failed to reload configuration: {e}")),
                    );
                }
            }
        }
        CurseAction::Help => {
            for line in HELP {
                state.world.send_message(sender, Feedback::info(*line));
            }
        }
    }
    Ok(())
}

fn deny(state: &mut AppState, sender: ParticipantId) -> Result<(), String> {
    state.world.send_message(sender, Feedback::error(NO_PERMISSION));
    Ok(())
}

const HELP: &[&str] = &[
    "=== Curse Commands ===",
    "/curse start [--force] - Start a curse",
    "/curse stop - Stop your curse",
    "/curse reset [--cooldown] - Reset your curse",
    "/curse leaderboard - Show the leaderboard",
    "/curse reload - Reload the configuration",
];

// ─────────────────────────────────────────────────────────────────────────────
// Leaderboard
// ─────────────────────────────────────────────────────────────────────────────

fn leaderboard_lines(state: &AppState, sender: ParticipantId) -> Vec<Feedback> {
    let settings = &state.manager.config().leaderboard;
    if !settings.enabled {
        return vec![Feedback::error("The leaderboard is disabled.")];
    }
    let board = state.manager.stats().board();
    let n = settings.display_count;

    let mut lines = vec![Feedback::notice("=== Curse Leaderboard ===")];
    let global = board.global();
    lines.push(Feedback::info(format!(
        "Total completions: {} | Total kills: {}",
        global.total_completions, global.total_kills
    )));

    if board.is_empty() {
        lines.push(Feedback::warning("No curses have been survived yet."));
        return lines;
    }

    section(&mut lines, "Most completions:", &board.top_by_completions(n), |v| v.to_string());
    section(&mut lines, "Most kills:", &board.top_by_kills(n), |v| v.to_string());
    section(&mut lines, "Best times:", &board.best_times(n), format_duration_ms);

    if let Some(record) = board.personal(sender) {
        let best = record
            .best_time_ms
            .map_or_else(|| "-".to_string(), format_duration_ms);
        lines.push(Feedback::notice("Your stats:"));
        lines.push(Feedback::info(format!(
            "Completions: {} | Kills: {} | Best time: {} | Highest round: {}",
            record.completions, record.kills, best, record.highest_round
        )));
    }
    lines
}

fn section(lines: &mut Vec<Feedback>, title: &str, rows: &[RankedEntry], value: impl Fn(u64) -> String) {
    if rows.is_empty() {
        return;
    }
    lines.push(Feedback::new(Tone::Notice, title));
    for row in rows {
        lines.push(Feedback::info(format!("{}. {} - {}", row.rank, row.name, value(row.value))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curse_core::context::CurseConfig;
    use curse_core::leaderboard::MemoryLeaderboard;
    use curse_core::plague::PlagueManager;
    use curse_core::world::{Location, SimWorld};

    const ALEX: ParticipantId = ParticipantId(1);

    fn make_state() -> AppState {
        let epoch = chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();
        let mut world = SimWorld::new(epoch);
        world.add_participant(ALEX, "Alex", Location::new("overworld", 0.0, 64.0, 0.0));
        AppState {
            manager: PlagueManager::new(CurseConfig::default(), Box::new(MemoryLeaderboard::new())),
            world,
            config_file: None,
            paused: false,
        }
    }

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn start_requires_permission() {
        let mut state = make_state();
        execute(&mut state, ALEX, &args("start")).unwrap();

        assert!(!state.manager.has_active_plague(ALEX));
        assert!(state.world.was_told(ALEX, NO_PERMISSION));
    }

    #[test]
    fn start_and_stop_with_permission() {
        let mut state = make_state();
        state.world.grant(ALEX, PERM_START);
        state.world.grant(ALEX, PERM_STOP);

        execute(&mut state, ALEX, &args("start")).unwrap();
        assert!(state.manager.has_active_plague(ALEX));

        execute(&mut state, ALEX, &args("stop")).unwrap();
        assert!(!state.manager.has_active_plague(ALEX));
        assert!(state.world.was_told(ALEX, "You reached round 1 with 0 kills."));

        execute(&mut state, ALEX, &args("stop")).unwrap();
        assert!(state.world.was_told(ALEX, "You don't have an active curse!"));
    }

    #[test]
    fn force_needs_admin() {
        let mut state = make_state();
        state.world.grant(ALEX, PERM_START);

        execute(&mut state, ALEX, &args("start --force")).unwrap();
        assert!(!state.manager.has_active_plague(ALEX));

        state.world.set_operator(ALEX, true);
        execute(&mut state, ALEX, &args("start -f")).unwrap();
        assert!(state.manager.has_active_plague(ALEX));
    }

    #[test]
    fn leaderboard_alias_renders_rankings() {
        let mut state = make_state();
        state.world.set_operator(ALEX, true);
        execute(&mut state, ALEX, &args("start")).unwrap();
        execute(&mut state, ALEX, &args("stop")).unwrap();

        execute(&mut state, ALEX, &args("lb")).unwrap();
        assert!(state.world.was_told(ALEX, "=== Curse Leaderboard ==="));
        assert!(state.world.was_told(ALEX, "1. Alex - 0"));
        assert!(state.world.was_told(ALEX, "Highest round: 1"));
    }

    #[test]
    fn disabled_leaderboard_says_so() {
        let mut state = make_state();
        state.world.grant(ALEX, PERM_USE);
        let mut config = CurseConfig::default();
        config.leaderboard.enabled = false;
        state.manager.set_config(config);

        execute(&mut state, ALEX, &args("leaderboard")).unwrap();
        assert!(state.world.was_told(ALEX, "The leaderboard is disabled."));
    }

    #[test]
    fn unknown_subcommand_is_a_usage_error() {
        let mut state = make_state();
        assert!(execute(&mut state, ALEX, &args("dance")).is_err());
    }

    #[test]
    fn bare_command_shows_help() {
        let mut state = make_state();
        execute(&mut state, ALEX, &[]).unwrap();
        assert!(state.world.was_told(ALEX, "=== Curse Commands ==="));
    }
}
