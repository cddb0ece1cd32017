//! Session statistics and rankings
//!
//! A session counts as a completion once it got past round 1. Best times
//! only come from completions.

mod error;
mod store;

pub use error::LeaderboardError;
pub use store::{FileLeaderboard, default_leaderboard_path};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::plague::SessionSnapshot;
use crate::world::ParticipantId;

/// Receives ended sessions.
pub trait StatsRecorder: Send {
    fn record(&mut self, participant: ParticipantId, name: &str, snapshot: &SessionSnapshot);
    fn board(&self) -> &Leaderboard;
    /// Re-read backing storage, if any.
    fn reload(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    #[serde(default)]
    pub total_completions: u64,
    #[serde(default)]
    pub total_kills: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    #[serde(default)]
    pub completions: u32,
    #[serde(default)]
    pub kills: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time_ms: Option<u64>,
    #[serde(default)]
    pub highest_round: u32,
    #[serde(default)]
    pub sessions: u32,
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: usize,
    pub participant: ParticipantId,
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    #[serde(default)]
    pub global: GlobalStats,
    /// Keyed by participant id. TOML keys must be strings.
    #[serde(default)]
    pub players: BTreeMap<String, PlayerRecord>,
}

impl Leaderboard {
    pub fn apply(&mut self, participant: ParticipantId, name: &str, snapshot: &SessionSnapshot) {
        let completed = snapshot.round_reached > 1;
        let kills = snapshot.total_kills as u64;

        if completed {
            self.global.total_completions += 1;
        }
        self.global.total_kills += kills;

        let record = self.players.entry(participant.to_string()).or_default();
        record.name = name.to_string();
        record.sessions += 1;
        record.kills += kills;
        record.highest_round = record.highest_round.max(snapshot.round_reached);
        if completed {
            record.completions += 1;
            record.best_time_ms = Some(
                record
                    .best_time_ms
                    .map_or(snapshot.elapsed_ms, |best| best.min(snapshot.elapsed_ms)),
            );
        }
    }

    pub fn global(&self) -> GlobalStats {
        self.global
    }

    pub fn personal(&self, participant: ParticipantId) -> Option<&PlayerRecord> {
        self.players.get(&participant.to_string())
    }

    pub fn top_by_completions(&self, n: usize) -> Vec<RankedEntry> {
        self.ranked(n, |r| Some(r.completions as u64), true)
    }

    pub fn top_by_kills(&self, n: usize) -> Vec<RankedEntry> {
        self.ranked(n, |r| Some(r.kills), true)
    }

    /// Fastest completions first. Players without a completion are left out.
    pub fn best_times(&self, n: usize) -> Vec<RankedEntry> {
        self.ranked(n, |r| r.best_time_ms, false)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn ranked(
        &self,
        n: usize,
        value: impl Fn(&PlayerRecord) -> Option<u64>,
        descending: bool,
    ) -> Vec<RankedEntry> {
        let mut rows: Vec<(ParticipantId, &PlayerRecord, u64)> = self
            .players
            .iter()
            .filter_map(|(key, record)| {
                let id = key.parse().ok().map(ParticipantId)?;
                Some((id, record, value(record)?))
            })
            .collect();

        // Ties broken by name for a stable display
        rows.sort_by(|a, b| {
            let by_value = if descending { b.2.cmp(&a.2) } else { a.2.cmp(&b.2) };
            by_value.then_with(|| a.1.name.cmp(&b.1.name))
        });

        rows.into_iter()
            .take(n)
            .enumerate()
            .map(|(i, (participant, record, value))| RankedEntry {
                rank: i + 1,
                participant,
                name: record.name.clone(),
                value,
            })
            .collect()
    }
}

/// In-memory recorder for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    board: Leaderboard,
    recorded: Vec<SessionSnapshot>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> &[SessionSnapshot] {
        &self.recorded
    }
}

impl StatsRecorder for MemoryLeaderboard {
    fn record(&mut self, participant: ParticipantId, name: &str, snapshot: &SessionSnapshot) {
        self.board.apply(participant, name, snapshot);
        self.recorded.push(snapshot.clone());
    }

    fn board(&self) -> &Leaderboard {
        &self.board
    }
}

/// `Xm Ys`, or `Ys` under a minute.
pub fn format_duration_ms(ms: u64) -> String {
    let secs = ms / 1000;
    let (minutes, secs) = (secs / 60, secs % 60);
    if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
