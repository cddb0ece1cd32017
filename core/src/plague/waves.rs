//! Wave sizing and opponent scaling

use std::f64::consts::TAU;

use rand::Rng;

use crate::world::{EquipmentSlot, Location, OpponentSpec, ParticipantId};

pub const BASE_WAVE_SIZE: u32 = 3;
pub const MAX_WAVE_SIZE: u32 = 20;
/// Opponents in the final wave, far more than a participant can clear.
pub const FINAL_WAVE_SIZE: u32 = 50;
/// Extra random spread added to the spawn radius, exclusive.
pub const SPAWN_SPREAD: u32 = 10;

pub const OPPONENT_NAME: &str = "Cursed Zombie";

/// Opponents in a normal wave.
pub fn mob_count(round: u32, level: u32, scale_with_xp: bool) -> u32 {
    let bonus = if scale_with_xp { level / 5 } else { 0 };
    (BASE_WAVE_SIZE + round + bonus).min(MAX_WAVE_SIZE)
}

pub fn health_multiplier(round: u32) -> f64 {
    1.0 + round as f64 * 0.5
}

pub fn speed_amplifier(round: u32) -> Option<u32> {
    (round > 2).then(|| round - 2)
}

pub fn equipment_for_round(round: u32) -> Vec<EquipmentSlot> {
    let mut gear = Vec::new();
    if round > 3 {
        gear.push(EquipmentSlot::Helmet);
    }
    if round > 4 {
        gear.push(EquipmentSlot::Chestplate);
    }
    if round > 5 {
        gear.push(EquipmentSlot::Leggings);
        gear.push(EquipmentSlot::Boots);
    }
    if round > 6 {
        gear.push(EquipmentSlot::MainHand);
    }
    gear
}

impl OpponentSpec {
    /// A curse opponent scaled for `round`, hunting `target`.
    pub fn for_round(at: Location, round: u32, target: ParticipantId) -> Self {
        Self {
            at,
            name: OPPONENT_NAME,
            health_multiplier: health_multiplier(round),
            speed_amplifier: speed_amplifier(round),
            equipment: equipment_for_round(round),
            persistent: true,
            target,
        }
    }
}

/// A point on the spawn ring: `(x, z)` at `radius + [0, spread)` from `center`.
pub fn ring_point<R: Rng + ?Sized>(rng: &mut R, center: &Location, radius: u32) -> (f64, f64) {
    let angle = rng.gen_range(0.0..TAU);
    let distance = (radius + rng.gen_range(0..SPAWN_SPREAD)) as f64;
    (center.x + angle.cos() * distance, center.z + angle.sin() * distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn wave_size_formula() {
        assert_eq!(mob_count(1, 0, true), 4);
        assert_eq!(mob_count(2, 10, true), 7);
        assert_eq!(mob_count(2, 10, false), 5);
        assert_eq!(mob_count(7, 100, true), 20);
    }

    #[test]
    fn scaling_by_round() {
        assert_eq!(health_multiplier(1), 1.5);
        assert_eq!(health_multiplier(4), 3.0);
        assert_eq!(speed_amplifier(2), None);
        assert_eq!(speed_amplifier(5), Some(3));
        assert!(equipment_for_round(3).is_empty());
        assert_eq!(equipment_for_round(4), vec![EquipmentSlot::Helmet]);
        assert_eq!(equipment_for_round(6).len(), 4);
        assert_eq!(equipment_for_round(7).len(), 5);
    }

    #[test]
    fn ring_points_stay_in_the_annulus() {
        let mut rng = StdRng::seed_from_u64(42);
        let center = Location::new("world", 100.0, 64.0, -50.0);
        for _ in 0..500 {
            let (x, z) = ring_point(&mut rng, &center, 20);
            let d = ((x - center.x).powi(2) + (z - center.z).powi(2)).sqrt();
            assert!((20.0 - 1e-9..29.0 + 1e-9).contains(&d), "distance {d}");
        }
    }

    #[test]
    fn opponent_spec_is_persistent_and_named() {
        let spec = OpponentSpec::for_round(Location::new("w", 0.0, 0.0, 0.0), 5, ParticipantId(1));
        assert!(spec.persistent);
        assert_eq!(spec.name, "Cursed Zombie");
        assert_eq!(spec.speed_amplifier, Some(3));
        assert_eq!(spec.target, ParticipantId(1));
    }
}
