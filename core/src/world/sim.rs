//! In-memory world
//!
//! Records every side effect the engine asks for so tests (and the REPL)
//! can inspect them. No physics, no AI: opponents only die when told to.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use hashbrown::{HashMap, HashSet};

use super::{
    EffectSpec, Feedback, ItemStack, Location, MobId, OpponentSpec, ParticipantId, StatusEffect,
    World, WorldEffect,
};
use crate::hud::{BarPayload, HudLine};

const DAY_LENGTH: u32 = 24_000;

#[derive(Debug, Clone)]
pub struct SimParticipant {
    pub name: String,
    pub location: Location,
    pub level: u32,
    pub online: bool,
    pub operator: bool,
    pub permissions: HashSet<String>,
    pub effects: HashMap<StatusEffect, EffectSpec>,
    pub messages: Vec<Feedback>,
    pub restored: u32,
}

#[derive(Debug, Clone)]
pub struct SimWorld {
    epoch: NaiveDateTime,
    tick: u64,
    time_of_day: u32,
    day_cycle: bool,
    terrain_height: i64,

    participants: BTreeMap<ParticipantId, SimParticipant>,
    mobs: BTreeMap<MobId, OpponentSpec>,
    /// Host entities the engine did not spawn (book carriers)
    strays: BTreeMap<MobId, Location>,
    next_mob: u64,

    status_bars: HashMap<ParticipantId, (BarPayload, Vec<ParticipantId>)>,
    action_bars: HashMap<ParticipantId, (HudLine, Vec<ParticipantId>)>,
    chests: Vec<(Location, Vec<ItemStack>)>,
    played: Vec<WorldEffect>,
    protected_zones: Vec<Location>,
    effect_log: Vec<(ParticipantId, EffectSpec)>,
}

impl SimWorld {
    pub fn new(epoch: NaiveDateTime) -> Self {
        Self {
            epoch,
            tick: 0,
            time_of_day: 18_000,
            day_cycle: false,
            terrain_height: 63,
            participants: BTreeMap::new(),
            mobs: BTreeMap::new(),
            strays: BTreeMap::new(),
            next_mob: 1,
            status_bars: HashMap::new(),
            action_bars: HashMap::new(),
            chests: Vec::new(),
            played: Vec::new(),
            protected_zones: Vec::new(),
            effect_log: Vec::new(),
        }
    }

    // ─── Setup ──────────────────────────────────────────────────────────────

    pub fn add_participant(&mut self, id: ParticipantId, name: &str, location: Location) {
        self.participants.insert(
            id,
            SimParticipant {
                name: name.to_string(),
                location,
                level: 0,
                online: true,
                operator: false,
                permissions: HashSet::new(),
                effects: HashMap::new(),
                messages: Vec::new(),
                restored: 0,
            },
        );
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&SimParticipant> {
        self.participants.get(&id)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut SimParticipant> {
        self.participants.get_mut(&id)
    }

    pub fn participants(&self) -> impl Iterator<Item = (&ParticipantId, &SimParticipant)> {
        self.participants.iter()
    }

    pub fn find_by_name(&self, name: &str) -> Option<ParticipantId> {
        self.participants
            .iter()
            .find(|(_, p)| p.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    pub fn move_to(&mut self, id: ParticipantId, location: Location) {
        if let Some(p) = self.participants.get_mut(&id) {
            p.location = location;
        }
    }

    pub fn set_online(&mut self, id: ParticipantId, online: bool) {
        if let Some(p) = self.participants.get_mut(&id) {
            p.online = online;
        }
    }

    pub fn set_level(&mut self, id: ParticipantId, level: u32) {
        if let Some(p) = self.participants.get_mut(&id) {
            p.level = level;
        }
    }

    pub fn grant(&mut self, id: ParticipantId, node: &str) {
        if let Some(p) = self.participants.get_mut(&id) {
            p.permissions.insert(node.to_string());
        }
    }

    pub fn set_operator(&mut self, id: ParticipantId, operator: bool) {
        if let Some(p) = self.participants.get_mut(&id) {
            p.operator = operator;
        }
    }

    pub fn add_protected_zone(&mut self, at: Location) {
        self.protected_zones.push(at);
    }

    pub fn set_terrain_height(&mut self, y: i64) {
        self.terrain_height = y;
    }

    // ─── Clock ──────────────────────────────────────────────────────────────

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Move the clock forward. Time of day follows when the day cycle is on.
    pub fn set_tick(&mut self, tick: u64) {
        let delta = tick.saturating_sub(self.tick);
        self.tick = tick;
        if self.day_cycle {
            self.time_of_day = ((self.time_of_day as u64 + delta) % DAY_LENGTH as u64) as u32;
        }
    }

    pub fn set_time_of_day(&mut self, time: u32) {
        self.time_of_day = time % DAY_LENGTH;
    }

    pub fn current_time_of_day(&self) -> u32 {
        self.time_of_day
    }

    pub fn set_day_cycle(&mut self, enabled: bool) {
        self.day_cycle = enabled;
    }

    // ─── Opponents ──────────────────────────────────────────────────────────

    /// Add a host entity that is not a curse opponent.
    pub fn add_entity(&mut self, at: Location) -> MobId {
        let id = self.allocate_mob();
        self.strays.insert(id, at);
        id
    }

    fn allocate_mob(&mut self) -> MobId {
        let id = MobId(self.next_mob);
        self.next_mob += 1;
        id
    }

    /// Kill a living opponent. The host is expected to report the death.
    pub fn kill_mob(&mut self, mob: MobId) -> bool {
        self.mobs.remove(&mob).is_some()
    }

    pub fn mob(&self, mob: MobId) -> Option<&OpponentSpec> {
        self.mobs.get(&mob)
    }

    pub fn mobs(&self) -> impl Iterator<Item = (&MobId, &OpponentSpec)> {
        self.mobs.iter()
    }

    pub fn mobs_targeting(&self, id: ParticipantId) -> Vec<MobId> {
        self.mobs
            .iter()
            .filter(|(_, spec)| spec.target == id)
            .map(|(mob, _)| *mob)
            .collect()
    }

    pub fn mob_count(&self) -> usize {
        self.mobs.len()
    }

    // ─── Recorded Output ────────────────────────────────────────────────────

    pub fn messages_for(&self, id: ParticipantId) -> &[Feedback] {
        self.participants
            .get(&id)
            .map(|p| p.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn take_messages(&mut self, id: ParticipantId) -> Vec<Feedback> {
        self.participants
            .get_mut(&id)
            .map(|p| std::mem::take(&mut p.messages))
            .unwrap_or_default()
    }

    /// True if any message to `id` contains `needle`.
    pub fn was_told(&self, id: ParticipantId, needle: &str) -> bool {
        self.messages_for(id).iter().any(|m| m.text.contains(needle))
    }

    pub fn status_bar(&self, owner: ParticipantId) -> Option<&(BarPayload, Vec<ParticipantId>)> {
        self.status_bars.get(&owner)
    }

    pub fn action_bar(&self, owner: ParticipantId) -> Option<&(HudLine, Vec<ParticipantId>)> {
        self.action_bars.get(&owner)
    }

    pub fn chests(&self) -> &[(Location, Vec<ItemStack>)] {
        &self.chests
    }

    pub fn played_effects(&self) -> &[WorldEffect] {
        &self.played
    }

    /// Every effect application, in order.
    pub fn effect_log(&self) -> &[(ParticipantId, EffectSpec)] {
        &self.effect_log
    }

    pub fn applications_of(&self, id: ParticipantId, effect: StatusEffect) -> usize {
        self.effect_log
            .iter()
            .filter(|(who, spec)| *who == id && spec.effect == effect)
            .count()
    }
}

impl World for SimWorld {
    fn now(&self) -> NaiveDateTime {
        self.epoch + Duration::milliseconds((self.tick * 50) as i64)
    }

    fn is_online(&self, id: ParticipantId) -> bool {
        self.participants.get(&id).is_some_and(|p| p.online)
    }

    fn display_name(&self, id: ParticipantId) -> Option<String> {
        self.participants.get(&id).map(|p| p.name.clone())
    }

    fn location(&self, id: ParticipantId) -> Option<Location> {
        self.participants.get(&id).map(|p| p.location.clone())
    }

    fn level(&self, id: ParticipantId) -> u32 {
        self.participants.get(&id).map(|p| p.level).unwrap_or(0)
    }

    fn time_of_day(&self, _world: &str) -> Option<u32> {
        Some(self.time_of_day)
    }

    fn has_permission(&self, id: ParticipantId, node: &str) -> bool {
        self.participants
            .get(&id)
            .is_some_and(|p| p.operator || p.permissions.contains(node))
    }

    fn participants_near(&self, center: &Location, radius: f64) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|(_, p)| p.online)
            .filter(|(_, p)| p.location.distance(center).is_some_and(|d| d <= radius))
            .map(|(id, _)| *id)
            .collect()
    }

    fn nearest_protected_zone(&self, at: &Location) -> Option<f64> {
        self.protected_zones
            .iter()
            .filter_map(|zone| zone.distance(at))
            .min_by(f64::total_cmp)
    }

    fn highest_block_y(&self, _world: &str, _x: i64, _z: i64) -> i64 {
        self.terrain_height
    }

    fn send_message(&mut self, id: ParticipantId, message: Feedback) {
        if let Some(p) = self.participants.get_mut(&id) {
            p.messages.push(message);
        }
    }

    fn apply_effect(&mut self, id: ParticipantId, effect: EffectSpec) {
        if let Some(p) = self.participants.get_mut(&id) {
            p.effects.insert(effect.effect, effect);
            self.effect_log.push((id, effect));
        }
    }

    fn remove_effect(&mut self, id: ParticipantId, effect: StatusEffect) -> bool {
        self.participants
            .get_mut(&id)
            .is_some_and(|p| p.effects.remove(&effect).is_some())
    }

    fn has_effect(&self, id: ParticipantId, effect: StatusEffect) -> bool {
        self.participants
            .get(&id)
            .is_some_and(|p| p.effects.contains_key(&effect))
    }

    fn restore_condition(&mut self, id: ParticipantId) {
        if let Some(p) = self.participants.get_mut(&id) {
            p.restored += 1;
        }
    }

    fn spawn_opponent(&mut self, spec: &OpponentSpec) -> Option<MobId> {
        let id = self.allocate_mob();
        self.mobs.insert(id, spec.clone());
        Some(id)
    }

    fn is_alive(&self, mob: MobId) -> bool {
        self.mobs.contains_key(&mob) || self.strays.contains_key(&mob)
    }

    fn entity_location(&self, entity: MobId) -> Option<Location> {
        self.mobs
            .get(&entity)
            .map(|spec| spec.at.clone())
            .or_else(|| self.strays.get(&entity).cloned())
    }

    fn remove_entity(&mut self, mob: MobId) {
        self.mobs.remove(&mob);
        self.strays.remove(&mob);
    }

    fn place_reward_chest(&mut self, at: &Location, items: &[ItemStack]) -> Location {
        let y = self.highest_block_y(&at.world, at.x.floor() as i64, at.z.floor() as i64) + 1;
        let placed = Location::new(at.world.clone(), at.x.floor(), y as f64, at.z.floor());
        self.chests.push((placed.clone(), items.to_vec()));
        placed
    }

    fn play_effect(&mut self, effect: WorldEffect) {
        self.played.push(effect);
    }

    fn sync_status_bar(&mut self, owner: ParticipantId, payload: &BarPayload, viewers: &[ParticipantId]) {
        self.status_bars
            .insert(owner, (payload.clone(), viewers.to_vec()));
    }

    fn clear_status_bar(&mut self, owner: ParticipantId) {
        self.status_bars.remove(&owner);
    }

    fn sync_action_bar(&mut self, owner: ParticipantId, line: &HudLine, viewers: &[ParticipantId]) {
        self.action_bars.insert(owner, (line.clone(), viewers.to_vec()));
    }

    fn clear_action_bar(&mut self, owner: ParticipantId) {
        self.action_bars.remove(&owner);
    }
}
