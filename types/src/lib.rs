//! Shared configuration types for the curse engine
//!
//! This crate contains the serializable settings consumed by `curse-core`
//! and the host binary. Every field carries a serde default so partial
//! config files keep the documented value for anything they omit.

use serde::{Deserialize, Serialize};

/// Host server ticks per second. Interval settings below are in ticks.
pub const TICKS_PER_SECOND: u64 = 20;

// ─────────────────────────────────────────────────────────────────────────────
// Serde Default Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_max_rounds() -> u32 {
    7
}
fn default_spawn_radius() -> u32 {
    20
}
fn default_time_limit() -> u32 {
    180
}
fn default_max_active() -> usize {
    3
}
fn default_combat_radius() -> u32 {
    30
}
fn default_warning_distance() -> u32 {
    5
}
fn default_warning_cooldown() -> u32 {
    10
}
fn default_min_village_distance() -> u32 {
    100
}
fn default_reset_cooldown() -> u32 {
    5
}
fn default_display_count() -> usize {
    10
}
fn default_hud_interval() -> u64 {
    20
}
fn default_pickup_range() -> f64 {
    10.0
}
fn default_night_start() -> u32 {
    12541
}
fn default_night_end() -> u32 {
    23031
}
fn default_daylight_from() -> u32 {
    23031
}
fn default_daylight_until() -> u32 {
    12541
}

// ─────────────────────────────────────────────────────────────────────────────
// Plague Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Encounter tuning: waves, radii, limits and cooldowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlagueSettings {
    /// Normal waves before the final wave.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Add `level / 5` opponents per wave.
    #[serde(default = "default_true")]
    pub scale_with_xp: bool,
    /// Base distance of the spawn ring from the start location.
    #[serde(default = "default_spawn_radius")]
    pub spawn_radius: u32,
    /// Seconds to clear a wave. 0 disables the timeout.
    #[serde(default = "default_time_limit")]
    pub time_limit_per_round: u32,
    #[serde(default)]
    pub allow_terrain_damage: bool,
    /// Server-wide ceiling on concurrent sessions.
    #[serde(default = "default_max_active")]
    pub max_active_plagues: usize,
    #[serde(default = "default_true")]
    pub visual_effects: bool,
    /// Containment radius around the start location. Also the HUD observer radius.
    #[serde(default = "default_combat_radius")]
    pub combat_radius: u32,
    /// Width of the warning band inside the combat radius.
    #[serde(default = "default_warning_distance")]
    pub warning_distance: u32,
    #[serde(default = "default_warning_cooldown")]
    pub warning_cooldown_seconds: u32,
    #[serde(default = "default_min_village_distance")]
    pub min_distance_from_villages: u32,
    #[serde(default = "default_reset_cooldown")]
    pub reset_cooldown_minutes: u32,
}

impl Default for PlagueSettings {
    fn default() -> Self {
        Self {
            max_rounds: 7,
            scale_with_xp: true,
            spawn_radius: 20,
            time_limit_per_round: 180,
            allow_terrain_damage: false,
            max_active_plagues: 3,
            visual_effects: true,
            combat_radius: 30,
            warning_distance: 5,
            warning_cooldown_seconds: 10,
            min_distance_from_villages: 100,
            reset_cooldown_minutes: 5,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Leaderboard / Debug Settings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Rows shown per ranking.
    #[serde(default = "default_display_count")]
    pub display_count: usize,
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            display_count: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub log_mob_spawns: bool,
    #[serde(default)]
    pub log_player_actions: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// HUD Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Action-bar HUD shown to everyone near a cursed participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Refresh period in ticks.
    #[serde(default = "default_hud_interval")]
    pub update_interval: u64,
    #[serde(default = "default_true")]
    pub show_timer: bool,
    #[serde(default = "default_true")]
    pub show_kills: bool,
    #[serde(default = "default_true")]
    pub show_remaining_mobs: bool,
    #[serde(default = "default_true")]
    pub show_antidote_status: bool,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            update_interval: 20,
            show_timer: true,
            show_kills: true,
            show_remaining_mobs: true,
            show_antidote_status: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cursed Book Settings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursedBookSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How far from the carrier a participant may be to be held responsible.
    #[serde(default = "default_pickup_range")]
    pub pickup_range: f64,
    #[serde(default = "default_true")]
    pub enable_recipe: bool,
    #[serde(default = "default_true")]
    pub enable_activation_effects: bool,
}

impl Default for CursedBookSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            pickup_range: 10.0,
            enable_recipe: true,
            enable_activation_effects: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock Settings
// ─────────────────────────────────────────────────────────────────────────────

/// In-world time windows, in day ticks (0..24000).
///
/// The start gate and the daylight failure gate are kept as separate
/// windows; both boundaries belong to both of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSettings {
    #[serde(default = "default_night_start")]
    pub night_start: u32,
    #[serde(default = "default_night_end")]
    pub night_end: u32,
    #[serde(default = "default_daylight_from")]
    pub daylight_from: u32,
    #[serde(default = "default_daylight_until")]
    pub daylight_until: u32,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            night_start: 12541,
            night_end: 23031,
            daylight_from: 23031,
            daylight_until: 12541,
        }
    }
}

impl ClockSettings {
    /// Whether a new session may start at this time of day.
    pub fn is_night(&self, time_of_day: u32) -> bool {
        time_of_day >= self.night_start && time_of_day <= self.night_end
    }

    /// Whether a session without the cure fails at this time of day.
    pub fn is_daylight(&self, time_of_day: u32) -> bool {
        time_of_day >= self.daylight_from || time_of_day <= self.daylight_until
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Curse Config
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurseConfig {
    #[serde(default)]
    pub plague: PlagueSettings,
    #[serde(default)]
    pub leaderboard: LeaderboardSettings,
    #[serde(default)]
    pub debug: DebugSettings,
    #[serde(default)]
    pub hud: HudSettings,
    #[serde(default)]
    pub cursed_book: CursedBookSettings,
    #[serde(default)]
    pub clock: ClockSettings,
}

impl CurseConfig {
    /// Wave timeout in ticks, `None` when disabled.
    pub fn wave_timeout_ticks(&self) -> Option<u64> {
        match self.plague.time_limit_per_round {
            0 => None,
            secs => Some(secs as u64 * TICKS_PER_SECOND),
        }
    }

    pub fn warning_cooldown_ticks(&self) -> u64 {
        self.plague.warning_cooldown_seconds as u64 * TICKS_PER_SECOND
    }

    /// HUD refresh period, never zero.
    pub fn hud_interval_ticks(&self) -> u64 {
        self.hud.update_interval.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CurseConfig::default();
        assert_eq!(config.plague.max_rounds, 7);
        assert_eq!(config.plague.spawn_radius, 20);
        assert_eq!(config.plague.combat_radius, 30);
        assert_eq!(config.plague.time_limit_per_round, 180);
        assert_eq!(config.plague.max_active_plagues, 3);
        assert_eq!(config.plague.reset_cooldown_minutes, 5);
        assert_eq!(config.leaderboard.display_count, 10);
        assert_eq!(config.hud.update_interval, 20);
        assert_eq!(config.clock.night_start, 12541);
        assert_eq!(config.clock.night_end, 23031);
    }

    #[test]
    fn night_and_daylight_windows_share_their_edges() {
        let clock = ClockSettings::default();
        assert!(clock.is_night(12541));
        assert!(clock.is_daylight(12541));
        assert!(clock.is_night(23031));
        assert!(clock.is_daylight(23031));
        assert!(clock.is_night(18000));
        assert!(!clock.is_daylight(18000));
        assert!(!clock.is_night(6000));
        assert!(clock.is_daylight(6000));
    }

    #[test]
    fn timeout_disabled_at_zero() {
        let mut config = CurseConfig::default();
        assert_eq!(config.wave_timeout_ticks(), Some(3600));
        config.plague.time_limit_per_round = 0;
        assert_eq!(config.wave_timeout_ticks(), None);
    }
}
