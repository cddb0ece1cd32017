//! One participant's curse session
//!
//! The session holds the encounter state only. Spawning, rewards and
//! teardown live in the manager, which owns the world and the scheduler.

use chrono::NaiveDateTime;
use hashbrown::HashSet;

use super::boundary::Boundary;
use crate::timers::{TaskHandle, Tick};
use crate::world::{Location, MobId, ParticipantId};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// Antidote drunk with the cure earned
    Cured,
    Stopped,
    Reset,
    Disconnected,
    Shutdown,
    TimedOut,
    DaylightWithoutCure,
}

impl EndReason {
    pub fn is_failure(self) -> bool {
        matches!(self, EndReason::TimedOut | EndReason::DaylightWithoutCure)
    }

    pub fn is_successful(self) -> bool {
        self == EndReason::Cured
    }

    pub fn label(self) -> &'static str {
        match self {
            EndReason::Cured => "cured",
            EndReason::Stopped => "stopped",
            EndReason::Reset => "reset",
            EndReason::Disconnected => "disconnected",
            EndReason::Shutdown => "shutdown",
            EndReason::TimedOut => "timed out",
            EndReason::DaylightWithoutCure => "daylight without cure",
        }
    }
}

/// Final figures of an ended session, handed to the stats recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub participant: ParticipantId,
    pub round_reached: u32,
    pub total_kills: u32,
    pub elapsed_ms: u64,
    pub reason: EndReason,
    pub started_wall: NaiveDateTime,
}

/// Result of attributing an opponent death to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// Not ours, already counted, or the session is over
    Ignored,
    Counted,
    /// Last opponent of the wave
    WaveCleared,
}

/// Handles of the tasks a session owns. All cancelled on teardown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTimers {
    pub wave_timeout: Option<TaskHandle>,
    pub round_advance: Option<TaskHandle>,
    pub monitor: Option<TaskHandle>,
    pub hud: Option<TaskHandle>,
}

impl SessionTimers {
    pub fn drain(&mut self) -> Vec<TaskHandle> {
        [
            self.wave_timeout.take(),
            self.round_advance.take(),
            self.monitor.take(),
            self.hud.take(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Plague {
    participant: ParticipantId,
    generation: u64,
    start_location: Location,

    current_round: u32,
    total_kills: u32,
    started_at: Tick,
    started_wall: NaiveDateTime,
    round_started_at: Tick,
    initial_mob_count: u32,
    active_mobs: HashSet<MobId>,

    has_antidote: bool,
    final_wave: bool,
    active: bool,

    pub(crate) boundary: Boundary,
    pub(crate) timers: SessionTimers,
}

impl Plague {
    pub fn new(
        participant: ParticipantId,
        generation: u64,
        start_location: Location,
        now: Tick,
        wall: NaiveDateTime,
    ) -> Self {
        Self {
            participant,
            generation,
            start_location,
            current_round: 1,
            total_kills: 0,
            started_at: now,
            started_wall: wall,
            round_started_at: now,
            initial_mob_count: 0,
            active_mobs: HashSet::new(),
            has_antidote: false,
            final_wave: false,
            active: true,
            boundary: Boundary::default(),
            timers: SessionTimers::default(),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn start_location(&self) -> &Location {
        &self.start_location
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_kills(&self) -> u32 {
        self.total_kills
    }

    pub fn started_at(&self) -> Tick {
        self.started_at
    }

    pub fn round_started_at(&self) -> Tick {
        self.round_started_at
    }

    pub fn initial_mob_count(&self) -> u32 {
        self.initial_mob_count
    }

    pub fn active_mobs(&self) -> &HashSet<MobId> {
        &self.active_mobs
    }

    pub fn remaining_mobs(&self) -> u32 {
        self.active_mobs.len() as u32
    }

    pub fn has_antidote(&self) -> bool {
        self.has_antidote
    }

    pub fn is_final_wave(&self) -> bool {
        self.final_wave
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn is_outside_area(&self) -> bool {
        self.boundary.is_outside_area()
    }

    pub fn has_been_warned(&self) -> bool {
        self.boundary.has_been_warned()
    }

    pub fn last_warning_at(&self) -> Option<Tick> {
        self.boundary.last_warning_at()
    }

    pub fn timers(&self) -> &SessionTimers {
        &self.timers
    }

    pub fn has_pending_advance(&self) -> bool {
        self.timers.round_advance.is_some()
    }

    // ─── Wave Progress ──────────────────────────────────────────────────────

    /// Reset wave bookkeeping before spawning `count` opponents.
    pub(crate) fn begin_wave(&mut self, count: u32, now: Tick) {
        self.initial_mob_count = count;
        self.round_started_at = now;
    }

    pub(crate) fn add_mob(&mut self, mob: MobId) {
        self.active_mobs.insert(mob);
    }

    /// Drain the opponent set, returning what was in it.
    pub(crate) fn take_mobs(&mut self) -> Vec<MobId> {
        self.active_mobs.drain().collect()
    }

    /// Attribute an opponent death. Unknown or repeated deaths are ignored.
    pub(crate) fn record_kill(&mut self, mob: MobId) -> KillOutcome {
        if !self.active || !self.active_mobs.remove(&mob) {
            return KillOutcome::Ignored;
        }
        self.total_kills += 1;
        if self.active_mobs.is_empty() {
            KillOutcome::WaveCleared
        } else {
            KillOutcome::Counted
        }
    }

    pub(crate) fn grant_antidote(&mut self) {
        self.has_antidote = true;
    }

    /// Move to the next round. Returns true if that is the final wave.
    pub(crate) fn advance_round(&mut self, max_rounds: u32) -> bool {
        if self.current_round <= max_rounds {
            self.current_round += 1;
        }
        if self.current_round > max_rounds {
            self.final_wave = true;
        }
        self.final_wave
    }

    /// Mark the session ended and hand back every timer it still owns.
    pub(crate) fn deactivate(&mut self) -> Vec<TaskHandle> {
        self.active = false;
        self.timers.drain()
    }

    pub fn snapshot(&self, now: Tick, reason: EndReason) -> SessionSnapshot {
        SessionSnapshot {
            participant: self.participant,
            round_reached: self.current_round,
            total_kills: self.total_kills,
            elapsed_ms: Tick(now.since(self.started_at)).as_millis(),
            reason,
            started_wall: self.started_wall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_plague() -> Plague {
        let wall = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();
        Plague::new(
            ParticipantId(1),
            1,
            Location::new("world", 0.0, 64.0, 0.0),
            Tick(100),
            wall,
        )
    }

    #[test]
    fn kills_are_idempotent() {
        let mut plague = make_plague();
        plague.begin_wave(2, Tick(100));
        plague.add_mob(MobId(1));
        plague.add_mob(MobId(2));

        assert_eq!(plague.record_kill(MobId(1)), KillOutcome::Counted);
        assert_eq!(plague.record_kill(MobId(1)), KillOutcome::Ignored);
        assert_eq!(plague.record_kill(MobId(99)), KillOutcome::Ignored);
        assert_eq!(plague.total_kills(), 1);
        assert_eq!(plague.record_kill(MobId(2)), KillOutcome::WaveCleared);
        assert_eq!(plague.total_kills(), 2);
    }

    #[test]
    fn round_never_passes_the_final_sentinel() {
        let mut plague = make_plague();
        for _ in 0..6 {
            assert!(!plague.advance_round(7));
        }
        assert_eq!(plague.current_round(), 7);
        assert!(plague.advance_round(7));
        assert_eq!(plague.current_round(), 8);
        assert!(plague.advance_round(7));
        assert_eq!(plague.current_round(), 8);
    }

    #[test]
    fn inactive_session_ignores_kills() {
        let mut plague = make_plague();
        plague.add_mob(MobId(5));
        plague.deactivate();
        assert_eq!(plague.record_kill(MobId(5)), KillOutcome::Ignored);
        assert_eq!(plague.total_kills(), 0);
    }

    #[test]
    fn snapshot_reports_elapsed_millis() {
        let plague = make_plague();
        let snapshot = plague.snapshot(Tick(100 + 20 * 90), EndReason::TimedOut);
        assert_eq!(snapshot.elapsed_ms, 90_000);
        assert_eq!(snapshot.round_reached, 1);
        assert!(snapshot.reason.is_failure());
        assert!(!snapshot.reason.is_successful());
    }
}
