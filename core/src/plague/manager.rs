//! Session manager
//!
//! Owns every active session, the mob → owner index, the restart cooldowns
//! and the task scheduler. The host calls [`PlagueManager::tick`] once per
//! server tick and reports events through [`super::EventHandler`].
//!
//! Sessions enter the index only through admission and leave it only
//! through teardown ([`PlagueManager::end_session`]). Tasks armed for a
//! session carry its generation; a task whose session is gone or was
//! replaced does nothing when it fires.

use hashbrown::{HashMap, HashSet};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use curse_types::CurseConfig;

use super::boundary::{BoundaryTransition, BoundaryZone};
use super::error::{AdmissionDenied, PlagueError};
use super::rewards::{self, RewardDrop};
use super::session::{EndReason, KillOutcome, Plague, SessionSnapshot};
use super::waves::{self, FINAL_WAVE_SIZE};
use crate::cooldown::CooldownRegistry;
use crate::hud;
use crate::leaderboard::StatsRecorder;
use crate::timers::{DueTask, Scheduler, Tick};
use crate::world::{
    EffectSpec, Feedback, Location, MobId, OpponentSpec, ParticleKind, ParticipantId,
    StatusEffect, Tone, World, WorldEffect,
};

// ─────────────────────────────────────────────────────────────────────────────
// Timing (ticks)
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) const MONITOR_PERIOD: u64 = 20;
pub(crate) const ROUND_ADVANCE_DELAY: u64 = 100;
pub(crate) const PARTICLE_PERIOD: u64 = 2;
pub(crate) const PARTICLE_RUNS: u32 = 50;
pub(crate) const BOOK_START_DELAY: u64 = 40;
pub(crate) const BOOK_DESPAWN_DELAY: u64 = 20;

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

/// Deferred work. Session-bound variants carry `(owner, generation)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Monitor { owner: ParticipantId, generation: u64 },
    HudRefresh { owner: ParticipantId, generation: u64 },
    WaveTimeout { owner: ParticipantId, generation: u64 },
    RoundAdvance { owner: ParticipantId, generation: u64 },
    RewardParticles { at: Location },
    DelayedStart { participant: ParticipantId },
    DespawnEntity { entity: MobId },
}

impl Task {
    fn session(&self) -> Option<(ParticipantId, u64)> {
        match *self {
            Task::Monitor { owner, generation }
            | Task::HudRefresh { owner, generation }
            | Task::WaveTimeout { owner, generation }
            | Task::RoundAdvance { owner, generation } => Some((owner, generation)),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Manager
// ─────────────────────────────────────────────────────────────────────────────

pub struct PlagueManager {
    config: CurseConfig,
    plagues: HashMap<ParticipantId, Plague>,
    mob_owners: HashMap<MobId, ParticipantId>,
    cooldowns: CooldownRegistry,
    scheduler: Scheduler<Task>,
    stats: Box<dyn StatsRecorder>,
    /// Participants who quit mid-session; cooldown armed when they return
    pub(crate) pending_quits: HashSet<ParticipantId>,
    pub(crate) rng: StdRng,
    next_generation: u64,
    now: Tick,
}

impl PlagueManager {
    pub fn new(config: CurseConfig, stats: Box<dyn StatsRecorder>) -> Self {
        Self::with_rng(config, stats, StdRng::from_entropy())
    }

    /// Construct with a fixed RNG (deterministic spawns and loot).
    pub fn with_rng(config: CurseConfig, stats: Box<dyn StatsRecorder>, rng: StdRng) -> Self {
        let cooldowns = CooldownRegistry::new(config.plague.reset_cooldown_minutes);
        Self {
            config,
            plagues: HashMap::new(),
            mob_owners: HashMap::new(),
            cooldowns,
            scheduler: Scheduler::new(),
            stats,
            pending_quits: HashSet::new(),
            rng,
            next_generation: 1,
            now: Tick::ZERO,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &CurseConfig {
        &self.config
    }

    /// Swap in a reloaded config. Running sessions keep their armed timers.
    pub fn set_config(&mut self, config: CurseConfig) {
        self.cooldowns
            .set_duration_minutes(config.plague.reset_cooldown_minutes);
        self.config = config;
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn has_active_plague(&self, participant: ParticipantId) -> bool {
        self.plagues.contains_key(&participant)
    }

    pub fn plague(&self, participant: ParticipantId) -> Option<&Plague> {
        self.plagues.get(&participant)
    }

    pub fn plagues(&self) -> impl Iterator<Item = &Plague> {
        self.plagues.values()
    }

    pub fn active_count(&self) -> usize {
        self.plagues.len()
    }

    pub fn owner_of(&self, mob: MobId) -> Option<ParticipantId> {
        self.mob_owners.get(&mob).copied()
    }

    pub fn cooldowns(&self) -> &CooldownRegistry {
        &self.cooldowns
    }

    pub fn cooldowns_mut(&mut self) -> &mut CooldownRegistry {
        &mut self.cooldowns
    }

    pub fn scheduler(&self) -> &Scheduler<Task> {
        &self.scheduler
    }

    pub fn stats(&self) -> &dyn StatsRecorder {
        self.stats.as_ref()
    }

    pub fn stats_mut(&mut self) -> &mut dyn StatsRecorder {
        self.stats.as_mut()
    }

    // ─── Timeline ───────────────────────────────────────────────────────────

    /// Run every task due at or before `now`.
    pub fn tick(&mut self, world: &mut dyn World, now: Tick) {
        while let Some(due) = self.scheduler.pop_due(now) {
            // Work done by a late task is timed from when it was due
            self.now = due.due_at.max(self.now);
            self.dispatch(world, due);
        }
        self.now = now;
    }

    fn dispatch(&mut self, world: &mut dyn World, due: DueTask<Task>) {
        if let Some((owner, generation)) = due.payload.session()
            && !self.is_current(owner, generation)
        {
            trace!(participant = %owner, generation, task = ?due.payload, "Dropping stale task");
            return;
        }

        match due.payload {
            Task::Monitor { owner, .. } => self.monitor(world, owner),
            Task::HudRefresh { owner, .. } => self.refresh_hud(world, owner),
            Task::WaveTimeout { owner, .. } => {
                if let Some(plague) = self.plagues.get_mut(&owner) {
                    plague.timers.wave_timeout = None;
                }
                self.fail_session(world, owner, EndReason::TimedOut, "Time limit exceeded!");
            }
            Task::RoundAdvance { owner, .. } => self.advance_round(world, owner),
            Task::RewardParticles { at } => world.play_effect(WorldEffect::Particles {
                kind: ParticleKind::Enchant,
                at: at.offset(0.5, 1.0, 0.5),
                count: 10,
            }),
            Task::DelayedStart { participant } => self.delayed_start(world, participant),
            Task::DespawnEntity { entity } => {
                if self.config.cursed_book.enable_activation_effects
                    && let Some(at) = world.entity_location(entity)
                {
                    world.play_effect(WorldEffect::Particles {
                        kind: ParticleKind::Poof,
                        at: at.offset(0.0, 1.0, 0.0),
                        count: 10,
                    });
                }
                world.remove_entity(entity);
            }
        }
    }

    fn is_current(&self, owner: ParticipantId, generation: u64) -> bool {
        self.plagues
            .get(&owner)
            .is_some_and(|p| p.generation() == generation && p.is_active())
    }

    // ─── Admission ──────────────────────────────────────────────────────────

    /// Start a curse for `participant`.
    ///
    /// Checks, in order: already active, cooldown (skipped with
    /// `bypass_cooldown`), server ceiling, night window, protected zones.
    /// A refusal is sent to the participant and changes nothing.
    pub fn start_session(
        &mut self,
        world: &mut dyn World,
        participant: ParticipantId,
        bypass_cooldown: bool,
    ) -> Result<(), PlagueError> {
        if !world.is_online(participant) {
            return Err(PlagueError::ParticipantNotFound(participant));
        }
        let location = world
            .location(participant)
            .ok_or(PlagueError::ParticipantNotFound(participant))?;

        if let Err(denied) = self.admit(world, participant, &location, bypass_cooldown) {
            debug!(participant = %participant, reason = ?denied, "Curse start refused");
            world.send_message(participant, Feedback::error(denied.to_string()));
            return Err(denied.into());
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let plague = Plague::new(participant, generation, location, self.now, world.now());
        world.sync_status_bar(participant, &hud::bar_payload(&plague), &[participant]);
        self.plagues.insert(participant, plague);

        if self.config.plague.visual_effects {
            world.apply_effect(participant, EffectSpec::permanent(StatusEffect::Glowing, 0));
        }

        world.send_message(participant, Feedback::notice("The curse has begun! Survive the waves!"));
        world.send_message(participant, Feedback::warning("Kill all mobs in each round to progress!"));

        info!(participant = %participant, generation, bypass_cooldown, "Curse started");

        self.spawn_next_wave(world, participant);

        let now = self.now;
        let monitor = self.scheduler.schedule_repeating(
            now,
            now.after(MONITOR_PERIOD),
            MONITOR_PERIOD,
            None,
            Task::Monitor { owner: participant, generation },
        );
        let hud = self.config.hud.enabled.then(|| {
            let period = self.config.hud_interval_ticks();
            self.scheduler.schedule_repeating(
                now,
                now.after(period),
                period,
                None,
                Task::HudRefresh { owner: participant, generation },
            )
        });
        if let Some(plague) = self.plagues.get_mut(&participant) {
            plague.timers.monitor = Some(monitor);
            plague.timers.hud = hud;
        }
        Ok(())
    }

    fn admit(
        &mut self,
        world: &dyn World,
        participant: ParticipantId,
        location: &Location,
        bypass_cooldown: bool,
    ) -> Result<(), AdmissionDenied> {
        if self.plagues.contains_key(&participant) {
            return Err(AdmissionDenied::AlreadyActive);
        }

        let now = world.now();
        if !bypass_cooldown && self.cooldowns.has(participant, now) {
            return Err(AdmissionDenied::Cooldown {
                remaining_secs: self.cooldowns.remaining_secs(participant, now),
            });
        }

        let max = self.config.plague.max_active_plagues;
        if self.plagues.len() >= max {
            return Err(AdmissionDenied::ServerFull { max });
        }

        match world.time_of_day(&location.world) {
            Some(t) if self.config.clock.is_night(t) => {}
            t => {
                return Err(AdmissionDenied::NotNight {
                    time_of_day: t.unwrap_or(0),
                });
            }
        }

        let min = self.config.plague.min_distance_from_villages;
        if min > 0
            && let Some(distance) = world.nearest_protected_zone(location)
            && distance < min as f64
        {
            return Err(AdmissionDenied::ProtectedZone { distance, min });
        }

        Ok(())
    }

    fn delayed_start(&mut self, world: &mut dyn World, participant: ParticipantId) {
        match self.start_session(world, participant, false) {
            Ok(()) => world.send_message(
                participant,
                Feedback::new(Tone::Dark, "The cursed book has awakened! The curse begins!"),
            ),
            Err(PlagueError::ParticipantNotFound(_)) => {
                debug!(participant = %participant, "Cursed book owner gone before activation");
            }
            Err(_) => world.send_message(
                participant,
                Feedback::error("The curse could not be started. Check the conditions and try again."),
            ),
        }
    }

    // ─── Stop / Reset ───────────────────────────────────────────────────────

    pub fn stop_session(
        &mut self,
        world: &mut dyn World,
        participant: ParticipantId,
    ) -> Result<SessionSnapshot, PlagueError> {
        self.end_session(world, participant, EndReason::Stopped)
            .ok_or(PlagueError::NoActiveSession(participant))
    }

    /// End any active curse, optionally arming the restart cooldown.
    pub fn reset_session(
        &mut self,
        world: &mut dyn World,
        participant: ParticipantId,
        set_cooldown: bool,
    ) -> Option<SessionSnapshot> {
        let snapshot = self.end_session(world, participant, EndReason::Reset);
        if set_cooldown {
            self.cooldowns.set(participant, world.now());
            world.send_message(
                participant,
                Feedback::warning(format!(
                    "Your curse has been reset! You must wait {} minutes before starting another.",
                    self.config.plague.reset_cooldown_minutes
                )),
            );
        } else {
            world.send_message(participant, Feedback::warning("Your curse has been reset!"));
        }
        snapshot
    }

    /// End every session. Used when the host shuts down.
    pub fn stop_all(&mut self, world: &mut dyn World) -> usize {
        let owners: Vec<ParticipantId> = self.plagues.keys().copied().collect();
        let ended = owners
            .into_iter()
            .filter_map(|owner| self.end_session(world, owner, EndReason::Shutdown))
            .count();
        self.scheduler.clear();
        info!(ended, "Stopped all curses");
        ended
    }

    // ─── Waves ──────────────────────────────────────────────────────────────

    /// Replace the current wave with a normal wave for the current round.
    pub fn spawn_next_wave(&mut self, world: &mut dyn World, owner: ParticipantId) {
        let Some(plague) = self.plagues.get(&owner) else {
            return;
        };
        let count = waves::mob_count(
            plague.current_round(),
            world.level(owner),
            self.config.plague.scale_with_xp,
        );
        self.clear_mobs(world, owner);
        self.spawn_wave(world, owner, count);
        self.arm_wave_timeout(owner);
    }

    /// Spawn `count` opponents on the ring around the start location.
    pub fn spawn_wave(&mut self, world: &mut dyn World, owner: ParticipantId, count: u32) {
        let now = self.now;
        let Some(plague) = self.plagues.get_mut(&owner) else {
            return;
        };
        if !plague.is_active() {
            return;
        }
        plague.begin_wave(count, now);

        let center = plague.start_location().clone();
        let round = plague.current_round();
        let radius = self.config.plague.spawn_radius;

        for _ in 0..count {
            let (x, z) = waves::ring_point(&mut self.rng, &center, radius);
            let y = world.highest_block_y(&center.world, x.floor() as i64, z.floor() as i64) + 1;
            let at = Location::new(center.world.clone(), x, y as f64, z);
            let spec = OpponentSpec::for_round(at, round, owner);

            let Some(mob) = world.spawn_opponent(&spec) else {
                debug!(participant = %owner, "Host refused an opponent spawn");
                continue;
            };
            plague.add_mob(mob);
            self.mob_owners.insert(mob, owner);
            if self.config.debug.log_mob_spawns {
                info!(participant = %owner, round, mob = %mob, at = %spec.at, "Spawned cursed zombie");
            }
        }

        debug!(participant = %owner, round, count, "Wave spawned");
        self.refresh_display(world, owner);
    }

    fn start_final_wave(&mut self, world: &mut dyn World, owner: ParticipantId, first_time: bool) {
        if first_time {
            world.send_message(
                owner,
                Feedback::new(Tone::Dark, "The final wave rises! Only the antidote can save you now!"),
            );
            info!(participant = %owner, "Final wave");
        }
        self.clear_mobs(world, owner);
        self.spawn_wave(world, owner, FINAL_WAVE_SIZE);
    }

    fn arm_wave_timeout(&mut self, owner: ParticipantId) {
        let Some(ticks) = self.config.wave_timeout_ticks() else {
            return;
        };
        let now = self.now;
        let Some(plague) = self.plagues.get_mut(&owner) else {
            return;
        };
        if let Some(old) = plague.timers.wave_timeout.take() {
            self.scheduler.cancel(old);
        }
        let handle = self.scheduler.schedule_once(
            now,
            now.after(ticks),
            Task::WaveTimeout { owner, generation: plague.generation() },
        );
        plague.timers.wave_timeout = Some(handle);
    }

    /// Remove every opponent the session still has.
    fn clear_mobs(&mut self, world: &mut dyn World, owner: ParticipantId) {
        let Some(plague) = self.plagues.get_mut(&owner) else {
            return;
        };
        for mob in plague.take_mobs() {
            self.mob_owners.remove(&mob);
            if world.is_alive(mob) {
                world.remove_entity(mob);
            }
        }
    }

    // ─── Kills & Rounds ─────────────────────────────────────────────────────

    /// Attribute an opponent death. Returns the owning participant for curse
    /// opponents, `None` for anything else.
    pub fn record_mob_death(&mut self, world: &mut dyn World, mob: MobId) -> Option<ParticipantId> {
        let owner = self.mob_owners.remove(&mob)?;
        let outcome = self
            .plagues
            .get_mut(&owner)
            .map_or(KillOutcome::Ignored, |p| p.record_kill(mob));

        match outcome {
            KillOutcome::Ignored => {}
            KillOutcome::Counted => self.refresh_display(world, owner),
            KillOutcome::WaveCleared => {
                self.refresh_display(world, owner);
                self.complete_round(world, owner);
            }
        }
        Some(owner)
    }

    /// Wave cleared: cancel the timeout, reward, and schedule the advance.
    /// The final wave gives nothing and simply regenerates.
    fn complete_round(&mut self, world: &mut dyn World, owner: ParticipantId) {
        let now = self.now;
        let Some(plague) = self.plagues.get_mut(&owner) else {
            return;
        };
        if !plague.is_active() || plague.has_pending_advance() {
            return;
        }
        if let Some(timeout) = plague.timers.wave_timeout.take() {
            self.scheduler.cancel(timeout);
        }

        let round = plague.current_round();
        let final_wave = plague.is_final_wave();
        if !final_wave && round == 1 {
            plague.grant_antidote();
        }

        let handle = self.scheduler.schedule_once(
            now,
            now.after(ROUND_ADVANCE_DELAY),
            Task::RoundAdvance { owner, generation: plague.generation() },
        );
        plague.timers.round_advance = Some(handle);

        info!(participant = %owner, round, final_wave, "Wave cleared");
        if !final_wave {
            self.reward_session(world, owner);
        }
    }

    /// Place a reward chest near the owner.
    pub fn reward_session(&mut self, world: &mut dyn World, owner: ParticipantId) -> Option<RewardDrop> {
        let now = self.now;
        let plague = self.plagues.get_mut(&owner)?;
        if !plague.is_active() {
            return None;
        }
        let at = world.location(owner)?.offset(0.0, 0.0, 2.0);

        let drop = rewards::roll_rewards(&mut self.rng, plague.current_round(), plague.has_antidote());
        if drop.grants_antidote {
            plague.grant_antidote();
        }
        let chest = world.place_reward_chest(&at, &drop.items);

        if self.config.plague.visual_effects {
            self.scheduler.schedule_repeating(
                now,
                now,
                PARTICLE_PERIOD,
                Some(PARTICLE_RUNS),
                Task::RewardParticles { at: chest },
            );
        }

        world.send_message(owner, Feedback::success("A reward chest has appeared!"));
        debug!(participant = %owner, items = drop.items.len(), antidote = drop.grants_antidote, "Reward placed");
        Some(drop)
    }

    fn advance_round(&mut self, world: &mut dyn World, owner: ParticipantId) {
        let max_rounds = self.config.plague.max_rounds;
        let Some(plague) = self.plagues.get_mut(&owner) else {
            return;
        };
        plague.timers.round_advance = None;

        let was_final = plague.is_final_wave();
        if plague.advance_round(max_rounds) {
            self.start_final_wave(world, owner, !was_final);
        } else {
            let round = plague.current_round();
            world.send_message(owner, Feedback::notice(format!("Round {round} begins!")));
            self.spawn_next_wave(world, owner);
        }
    }

    // ─── Monitoring ─────────────────────────────────────────────────────────

    fn boundary_zone(&self) -> BoundaryZone {
        BoundaryZone {
            radius: self.config.plague.combat_radius as f64,
            warning_distance: self.config.plague.warning_distance as f64,
            warning_cooldown: self.config.warning_cooldown_ticks(),
        }
    }

    /// Once-a-second checks: liveness, display membership, boundary, daylight.
    pub fn monitor(&mut self, world: &mut dyn World, owner: ParticipantId) {
        if !self.plagues.contains_key(&owner) {
            return;
        }
        if !world.is_online(owner) {
            info!(participant = %owner, "Curse owner went offline");
            self.end_session(world, owner, EndReason::Disconnected);
            return;
        }

        self.refresh_display(world, owner);

        let Some(location) = world.location(owner) else {
            return;
        };
        let zone = self.boundary_zone();
        let now = self.now;
        let Some(plague) = self.plagues.get_mut(&owner) else {
            return;
        };
        let distance = plague.start_location().distance_or_inf(&location);
        let has_antidote = plague.has_antidote();

        match plague.boundary.observe(distance, &zone, now) {
            BoundaryTransition::Warn => {
                world.send_message(
                    owner,
                    Feedback::warning(format!(
                        "You are nearing the edge of the curse area! Stay within {} blocks.",
                        self.config.plague.combat_radius
                    )),
                );
            }
            BoundaryTransition::Left => {
                world.send_message(owner, Feedback::error("You left the curse area! The curse intensifies!"));
                world.send_message(owner, Feedback::warning("Return to the curse area to lift the poison."));
                world.apply_effect(owner, EffectSpec::permanent(StatusEffect::Poison, 0));
                debug!(participant = %owner, distance, "Left curse area");
                self.refresh_display(world, owner);
            }
            BoundaryTransition::Returned => {
                world.remove_effect(owner, StatusEffect::Poison);
                world.send_message(owner, Feedback::success("You returned to the curse area. The poison fades."));
                debug!(participant = %owner, distance, "Returned to curse area");
                self.refresh_display(world, owner);
            }
            BoundaryTransition::Settled | BoundaryTransition::Unchanged => {}
        }

        if let Some(time) = world.time_of_day(&location.world)
            && self.config.clock.is_daylight(time)
            && !has_antidote
        {
            self.fail_session(
                world,
                owner,
                EndReason::DaylightWithoutCure,
                "Daylight arrived without the antidote! The curse consumes you!",
            );
        }
    }

    // ─── Displays ───────────────────────────────────────────────────────────

    /// Recompute viewers and push both displays.
    pub fn refresh_display(&mut self, world: &mut dyn World, owner: ParticipantId) {
        let Some(plague) = self.plagues.get(&owner).filter(|p| p.is_active()) else {
            return;
        };
        let viewers = hud::observers(&*world, owner, self.config.plague.combat_radius as f64);
        world.sync_status_bar(owner, &hud::bar_payload(plague), &viewers);
        if self.config.hud.enabled {
            world.sync_action_bar(owner, &hud::hud_line(plague, &self.config, self.now), &viewers);
        }
    }

    fn refresh_hud(&mut self, world: &mut dyn World, owner: ParticipantId) {
        if !self.config.hud.enabled {
            return;
        }
        let Some(plague) = self.plagues.get(&owner).filter(|p| p.is_active()) else {
            return;
        };
        let viewers = hud::observers(&*world, owner, self.config.plague.combat_radius as f64);
        world.sync_action_bar(owner, &hud::hud_line(plague, &self.config, self.now), &viewers);
    }

    // ─── Teardown ───────────────────────────────────────────────────────────

    fn apply_poison_penalty(&self, world: &mut dyn World, owner: ParticipantId) {
        world.apply_effect(owner, EffectSpec::permanent(StatusEffect::Poison, 1));
        world.send_message(owner, Feedback::error("You have been cursed with deadly poison!"));
        world.send_message(owner, Feedback::warning("Find and drink the antidote to survive!"));
    }

    fn fail_session(&mut self, world: &mut dyn World, owner: ParticipantId, reason: EndReason, message: &str) {
        if !self.plagues.contains_key(&owner) {
            return;
        }
        world.send_message(owner, Feedback::error(message));
        self.apply_poison_penalty(world, owner);
        self.end_session(world, owner, reason);
    }

    /// The single teardown path. Cancels the session's tasks, removes its
    /// opponents and displays, records stats and drops it from the index.
    pub fn end_session(
        &mut self,
        world: &mut dyn World,
        owner: ParticipantId,
        reason: EndReason,
    ) -> Option<SessionSnapshot> {
        let mut plague = self.plagues.remove(&owner)?;

        for handle in plague.deactivate() {
            self.scheduler.cancel(handle);
        }
        for mob in plague.take_mobs() {
            self.mob_owners.remove(&mob);
            if world.is_alive(mob) {
                world.remove_entity(mob);
            }
        }

        world.clear_status_bar(owner);
        world.clear_action_bar(owner);
        world.remove_effect(owner, StatusEffect::Glowing);
        if !reason.is_failure() && plague.is_outside_area() {
            world.remove_effect(owner, StatusEffect::Poison);
        }

        let snapshot = plague.snapshot(self.now, reason);
        let name = world
            .display_name(owner)
            .unwrap_or_else(|| owner.to_string());
        self.stats.record(owner, &name, &snapshot);

        info!(
            participant = %owner,
            round = snapshot.round_reached,
            kills = snapshot.total_kills,
            elapsed_ms = snapshot.elapsed_ms,
            reason = reason.label(),
            "Curse ended"
        );
        Some(snapshot)
    }

    // ─── Deferred Helpers ───────────────────────────────────────────────────

    pub(crate) fn schedule_delayed_start(&mut self, participant: ParticipantId) {
        let now = self.now;
        self.scheduler
            .schedule_once(now, now.after(BOOK_START_DELAY), Task::DelayedStart { participant });
    }

    pub(crate) fn schedule_despawn(&mut self, entity: MobId) {
        let now = self.now;
        self.scheduler
            .schedule_once(now, now.after(BOOK_DESPAWN_DELAY), Task::DespawnEntity { entity });
    }

    pub(crate) fn cooldown_blocks(&mut self, world: &dyn World, participant: ParticipantId) -> Option<u64> {
        let now = world.now();
        self.cooldowns
            .has(participant, now)
            .then(|| self.cooldowns.remaining_secs(participant, now))
    }

    pub(crate) fn arm_cooldown(&mut self, world: &dyn World, participant: ParticipantId) {
        self.cooldowns.set(participant, world.now());
    }
}
