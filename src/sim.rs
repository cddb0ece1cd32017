//! Host-side actions for the simulated world
//!
//! Each action changes the world the way a real server would and then
//! reports the matching host event to the manager.

use curse_core::items::{self, ItemKind};
use curse_core::plague::{EventHandler, EventOutcome, HostEvent};
use curse_core::world::{Location, ParticipantId, World};

use crate::app_state::AppState;
use crate::commands::{PERM_START, PERM_STOP, PERM_USE};

pub const DEFAULT_WORLD: &str = "overworld";
const GROUND_Y: f64 = 64.0;

pub fn find(state: &AppState, name: &str) -> Result<ParticipantId, String> {
    state
        .world
        .find_by_name(name)
        .ok_or_else(|| format!("no participant named {name}"))
}

/// Add a participant, or bring a known one back online.
pub fn join(state: &mut AppState, name: &str, x: f64, z: f64) -> Result<ParticipantId, String> {
    if let Some(id) = state.world.find_by_name(name) {
        state.world.set_online(id, true);
        state
            .manager
            .handle_event(&mut state.world, &HostEvent::ParticipantJoined { participant: id });
        return Ok(id);
    }

    let id = state.next_participant_id();
    state
        .world
        .add_participant(id, name, Location::new(DEFAULT_WORLD, x, GROUND_Y, z));
    for node in [PERM_START, PERM_STOP, PERM_USE] {
        state.world.grant(id, node);
    }
    tracing::debug!(participant = %id, name, "Participant joined");
    Ok(id)
}

pub fn quit(state: &mut AppState, name: &str) -> Result<(), String> {
    let id = find(state, name)?;
    state
        .manager
        .handle_event(&mut state.world, &HostEvent::ParticipantQuit { participant: id });
    state.world.set_online(id, false);
    Ok(())
}

pub fn die(state: &mut AppState, name: &str) -> Result<(), String> {
    let id = find(state, name)?;
    state
        .manager
        .handle_event(&mut state.world, &HostEvent::ParticipantDied { participant: id });
    Ok(())
}

pub fn move_to(state: &mut AppState, name: &str, x: f64, z: f64) -> Result<(), String> {
    let id = find(state, name)?;
    let world = state
        .world
        .location(id)
        .map_or_else(|| DEFAULT_WORLD.to_string(), |at| at.world);
    state.world.move_to(id, Location::new(world, x, GROUND_Y, z));
    Ok(())
}

/// Kill up to `count` opponents hunting `name`. Returns how many died.
pub fn kill(state: &mut AppState, name: &str, count: usize) -> Result<usize, String> {
    let id = find(state, name)?;
    let mut killed = 0;
    for mob in state.world.mobs_targeting(id).into_iter().take(count) {
        state.world.kill_mob(mob);
        if let EventOutcome::CurseMobKilled { .. } = state
            .manager
            .handle_event(&mut state.world, &HostEvent::MobDied { mob })
        {
            killed += 1;
        }
    }
    Ok(killed)
}

/// Drink a catalog item by key, e.g. `curse_trigger`.
pub fn drink(state: &mut AppState, name: &str, key: &str) -> Result<EventOutcome, String> {
    let id = find(state, name)?;
    if items::lookup(key).is_none() {
        return Err(format!("unknown item {key}"));
    }
    let event = HostEvent::ItemConsumed {
        participant: id,
        display_name: items::display_name(key).to_string(),
        has_bad_omen: ItemKind::from_key(key) == ItemKind::Trigger,
    };
    Ok(state.manager.handle_event(&mut state.world, &event))
}

/// A zombie picks up a cursed book right next to `name`.
pub fn drop_book(state: &mut AppState, name: &str) -> Result<EventOutcome, String> {
    let id = find(state, name)?;
    let at = state
        .world
        .location(id)
        .ok_or_else(|| format!("{name} is nowhere"))?
        .offset(1.0, 0.0, 1.0);
    let carrier = state.world.add_entity(at.clone());
    Ok(state
        .manager
        .handle_event(&mut state.world, &HostEvent::CursedBookPickedUp { carrier, at }))
}

/// One line per active session.
pub fn status_lines(state: &AppState) -> Vec<String> {
    let mut lines: Vec<String> = state
        .manager
        .plagues()
        .map(|plague| {
            let name = state
                .world
                .display_name(plague.participant())
                .unwrap_or_else(|| plague.participant().to_string());
            format!(
                "{name}: round {} | mobs {}/{} | kills {} | antidote {} | boundary {:?}",
                plague.current_round(),
                plague.remaining_mobs(),
                plague.initial_mob_count(),
                plague.total_kills(),
                if plague.has_antidote() { "yes" } else { "no" },
                plague.boundary().state(),
            )
        })
        .collect();
    lines.sort();
    lines.insert(
        0,
        format!(
            "tick {} | time of day {} | {} active",
            state.tick(),
            state.world.current_time_of_day(),
            state.manager.active_count()
        ),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use curse_core::context::CurseConfig;
    use curse_core::leaderboard::MemoryLeaderboard;
    use curse_core::plague::PlagueManager;
    use curse_core::world::SimWorld;

    fn make_state() -> AppState {
        let epoch = chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();
        AppState {
            manager: PlagueManager::new(CurseConfig::default(), Box::new(MemoryLeaderboard::new())),
            world: SimWorld::new(epoch),
            config_file: None,
            paused: false,
        }
    }

    #[test]
    fn trigger_then_kills_clear_the_wave() {
        let mut state = make_state();
        let id = join(&mut state, "Alex", 0.0, 0.0).unwrap();

        assert_eq!(drink(&mut state, "alex", items::CURSE_TRIGGER).unwrap(), EventOutcome::Handled);
        let wave = state.manager.plague(id).unwrap().remaining_mobs() as usize;

        assert_eq!(kill(&mut state, "Alex", 100).unwrap(), wave);
        assert!(state.manager.plague(id).unwrap().has_antidote());
    }

    #[test]
    fn quit_and_rejoin_arms_cooldown() {
        let mut state = make_state();
        let id = join(&mut state, "Alex", 0.0, 0.0).unwrap();
        state.manager.start_session(&mut state.world, id, false).unwrap();

        quit(&mut state, "Alex").unwrap();
        assert!(!state.world.is_online(id));
        assert_eq!(join(&mut state, "Alex", 0.0, 0.0).unwrap(), id);
        assert!(state.world.was_told(id, "reset due to leaving the server"));
    }

    #[test]
    fn unknown_names_and_items_are_errors() {
        let mut state = make_state();
        assert!(die(&mut state, "Nobody").is_err());
        join(&mut state, "Alex", 0.0, 0.0).unwrap();
        assert!(drink(&mut state, "Alex", "lava").is_err());
    }
}
