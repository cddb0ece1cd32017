use std::path::PathBuf;

use chrono::{NaiveDateTime, Utc};
use curse_core::context::{ConfigError, CurseConfig, CurseConfigExt};
use curse_core::leaderboard::{FileLeaderboard, MemoryLeaderboard, StatsRecorder, default_leaderboard_path};
use curse_core::plague::PlagueManager;
use curse_core::timers::Tick;
use curse_core::world::{Feedback, ParticipantId, SimWorld};

/// Everything the REPL and the ticker share. Lives behind one mutex so
/// every mutation happens on a single timeline.
pub struct AppState {
    pub manager: PlagueManager,
    pub world: SimWorld,
    /// Explicit config file given on the command line, if any
    pub config_file: Option<PathBuf>,
    pub paused: bool,
}

impl AppState {
    pub fn new(config_file: Option<PathBuf>) -> Self {
        let config = load_config(config_file.as_deref());
        let stats = open_leaderboard(config.leaderboard.enabled);
        let epoch: NaiveDateTime = Utc::now().naive_utc();

        let mut world = SimWorld::new(epoch);
        world.set_day_cycle(true);

        Self {
            manager: PlagueManager::new(config, stats),
            world,
            config_file,
            paused: false,
        }
    }

    pub fn tick(&self) -> u64 {
        self.world.tick()
    }

    /// Run `ticks` server ticks, one at a time.
    pub fn advance(&mut self, ticks: u64) {
        let start = self.world.tick();
        for t in start + 1..=start + ticks {
            self.world.set_tick(t);
            self.manager.tick(&mut self.world, Tick(t));
        }
    }

    /// Re-read the config (and the leaderboard file behind the recorder).
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let config = match &self.config_file {
            Some(path) => CurseConfig::load_from(path)?,
            None => CurseConfig::try_load()?,
        };
        self.manager.set_config(config);
        self.manager.stats_mut().reload();
        tracing::info!(file = ?self.config_file, "Configuration reloaded");
        Ok(())
    }

    /// Take every message sent since the last call, tagged with the recipient's name.
    pub fn drain_messages(&mut self) -> Vec<(String, Feedback)> {
        let ids: Vec<ParticipantId> = self.world.participants().map(|(id, _)| *id).collect();
        let mut drained = Vec::new();
        for id in ids {
            let name = self
                .world
                .participant(id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| id.to_string());
            for message in self.world.take_messages(id) {
                drained.push((name.clone(), message));
            }
        }
        drained
    }

    pub fn next_participant_id(&self) -> ParticipantId {
        let max = self.world.participants().map(|(id, _)| id.0).max().unwrap_or(0);
        ParticipantId(max + 1)
    }
}

fn load_config(path: Option<&std::path::Path>) -> CurseConfig {
    match path {
        Some(path) => CurseConfig::load_from(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Config file unreadable, using defaults");
            CurseConfig::default()
        }),
        None => CurseConfig::load(),
    }
}

fn open_leaderboard(enabled: bool) -> Box<dyn StatsRecorder> {
    if !enabled {
        return Box::new(MemoryLeaderboard::new());
    }
    match default_leaderboard_path() {
        Ok(path) => Box::new(FileLeaderboard::open(path)),
        Err(e) => {
            tracing::warn!(error = %e, "No data directory, leaderboard kept in memory");
            Box::new(MemoryLeaderboard::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curse_core::world::Location;

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
    fn advance_moves_world_and_manager_together() {
        let mut state = make_state();
        state.advance(40);
        assert_eq!(state.tick(), 40);
        assert_eq!(state.manager.now(), Tick(40));
    }

    #[test]
    fn drained_messages_carry_the_recipient() {
        let mut state = make_state();
        let id = state.next_participant_id();
        state.world.add_participant(id, "Alex", Location::new("overworld", 0.0, 64.0, 0.0));
        state.manager.start_session(&mut state.world, id, false).unwrap();

        let drained = state.drain_messages();
        assert!(drained.iter().all(|(name, _)| name == "Alex"));
        assert!(drained.iter().any(|(_, m)| m.text.contains("The curse has begun!")));
        assert!(state.drain_messages().is_empty());
    }
}
