//! Host world capabilities
//!
//! The engine never touches game objects directly. Everything it needs from
//! the host (clock, participant queries, opponent spawning, status bars,
//! messages) goes through the [`World`] trait. [`SimWorld`] is the in-memory
//! implementation used by tests and the interactive host.

mod sim;

pub use sim::{SimParticipant, SimWorld};

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::hud::{BarPayload, HudLine};

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MobId(pub u64);

impl fmt::Display for MobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mob#{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Locations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Euclidean distance, `None` across worlds.
    pub fn distance(&self, other: &Location) -> Option<f64> {
        if self.world != other.world {
            return None;
        }
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }

    /// Distance treating another world as infinitely far.
    pub fn distance_or_inf(&self, other: &Location) -> f64 {
        self.distance(other).unwrap_or(f64::INFINITY)
    }

    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Location {
        Location::new(self.world.clone(), self.x + dx, self.y + dy, self.z + dz)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}, {:.1}, {:.1})", self.world, self.x, self.y, self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feedback & Effects
// ─────────────────────────────────────────────────────────────────────────────

/// Message color class. The host maps these to its own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Error,
    Warning,
    Success,
    Info,
    Notice,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub text: String,
    pub tone: Tone,
}

impl Feedback {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Tone::Error, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Tone::Warning, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Tone::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Tone::Info, text)
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(Tone::Notice, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEffect {
    Glowing,
    Poison,
    Weakness,
    Slowness,
}

/// A status effect application. `duration_ticks: None` lasts until removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectSpec {
    pub effect: StatusEffect,
    pub amplifier: u32,
    pub duration_ticks: Option<u64>,
}

impl EffectSpec {
    pub fn permanent(effect: StatusEffect, amplifier: u32) -> Self {
        Self {
            effect,
            amplifier,
            duration_ticks: None,
        }
    }

    pub fn timed(effect: StatusEffect, amplifier: u32, ticks: u64) -> Self {
        Self {
            effect,
            amplifier,
            duration_ticks: Some(ticks),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Enchant,
    Witch,
    Smoke,
    SoulFire,
    Poof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    WitherSpawn,
    Thunder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldEffect {
    Particles {
        kind: ParticleKind,
        at: Location,
        count: u32,
    },
    Sound {
        kind: SoundKind,
        at: Location,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Opponents & Rewards
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentSlot {
    Helmet,
    Chestplate,
    Leggings,
    Boots,
    MainHand,
}

/// Everything the host needs to spawn one curse opponent.
#[derive(Debug, Clone, PartialEq)]
pub struct OpponentSpec {
    pub at: Location,
    pub name: &'static str,
    pub health_multiplier: f64,
    /// Speed effect amplifier, `None` for base speed
    pub speed_amplifier: Option<u32>,
    pub equipment: Vec<EquipmentSlot>,
    pub persistent: bool,
    pub target: ParticipantId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    pub key: &'static str,
    pub amount: u32,
}

impl ItemStack {
    pub fn one(key: &'static str) -> Self {
        Self { key, amount: 1 }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// World Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Capabilities the host world provides to the engine.
pub trait World {
    // ─── Queries ────────────────────────────────────────────────────────────

    /// Wall clock used for cooldowns and session start stamps.
    fn now(&self) -> NaiveDateTime;

    fn is_online(&self, id: ParticipantId) -> bool;

    fn display_name(&self, id: ParticipantId) -> Option<String>;

    fn location(&self, id: ParticipantId) -> Option<Location>;

    /// Experience level, used for wave scaling.
    fn level(&self, id: ParticipantId) -> u32;

    /// Day ticks (0..24000) in the named world.
    fn time_of_day(&self, world: &str) -> Option<u32>;

    fn has_permission(&self, id: ParticipantId, node: &str) -> bool;

    /// Online participants within `radius` of `center` (same world only).
    fn participants_near(&self, center: &Location, radius: f64) -> Vec<ParticipantId>;

    /// Distance to the nearest protected zone (village), `None` when none is known.
    fn nearest_protected_zone(&self, _at: &Location) -> Option<f64> {
        None
    }

    fn highest_block_y(&self, world: &str, x: i64, z: i64) -> i64;

    // ─── Participant Effects ────────────────────────────────────────────────

    fn send_message(&mut self, id: ParticipantId, message: Feedback);

    fn apply_effect(&mut self, id: ParticipantId, effect: EffectSpec);

    /// Returns true if the effect was present.
    fn remove_effect(&mut self, id: ParticipantId, effect: StatusEffect) -> bool;

    fn has_effect(&self, id: ParticipantId, effect: StatusEffect) -> bool;

    /// Heal back to full condition (undo potion).
    fn restore_condition(&mut self, id: ParticipantId);

    // ─── Opponents ──────────────────────────────────────────────────────────

    fn spawn_opponent(&mut self, spec: &OpponentSpec) -> Option<MobId>;

    fn is_alive(&self, mob: MobId) -> bool;

    fn entity_location(&self, entity: MobId) -> Option<Location>;

    fn remove_entity(&mut self, mob: MobId);

    // ─── Rewards & Effects ──────────────────────────────────────────────────

    /// Place a chest with `items` at `at`. Returns the chest location.
    fn place_reward_chest(&mut self, at: &Location, items: &[ItemStack]) -> Location;

    fn play_effect(&mut self, effect: WorldEffect);

    // ─── Displays ───────────────────────────────────────────────────────────

    /// Show `payload` as `owner`'s status bar to exactly `viewers`.
    fn sync_status_bar(&mut self, owner: ParticipantId, payload: &BarPayload, viewers: &[ParticipantId]);

    fn clear_status_bar(&mut self, owner: ParticipantId);

    /// Show `line` as `owner`'s action-bar HUD to exactly `viewers`.
    fn sync_action_bar(&mut self, owner: ParticipantId, line: &HudLine, viewers: &[ParticipantId]);

    fn clear_action_bar(&mut self, owner: ParticipantId);
}
