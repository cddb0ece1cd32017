//! Containment boundary state machine
//!
//! ```text
//!   Inside ──(in band, cooldown ok)──▶ Warned
//!   Warned ──(below band)────────────▶ Inside
//!   Inside | Warned ──(d > radius)───▶ Outside   poison applied
//!   Outside ──(d <= radius)──────────▶ Inside    poison removed
//! ```
//!
//! The band is `[radius - warning_distance, radius]`. Warnings repeat no
//! more often than the cooldown. Returning from Outside clears the warning
//! history; drifting back below the band from Warned keeps it.

use crate::timers::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryState {
    #[default]
    Inside,
    Warned,
    Outside,
}

/// What the caller must do after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryTransition {
    Unchanged,
    /// Send the edge warning
    Warn,
    /// Apply the boundary poison, switch the bar to the outside look
    Left,
    /// Remove the boundary poison, restore the bar
    Returned,
    /// Back below the warning band, nothing to show
    Settled,
}

/// Containment geometry, in blocks and ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryZone {
    pub radius: f64,
    pub warning_distance: f64,
    pub warning_cooldown: u64,
}

impl BoundaryZone {
    fn band_start(&self) -> f64 {
        (self.radius - self.warning_distance).max(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundary {
    state: BoundaryState,
    last_warning_at: Option<Tick>,
}

impl Boundary {
    pub fn state(&self) -> BoundaryState {
        self.state
    }

    pub fn is_outside_area(&self) -> bool {
        self.state == BoundaryState::Outside
    }

    pub fn has_been_warned(&self) -> bool {
        self.state == BoundaryState::Warned
    }

    pub fn last_warning_at(&self) -> Option<Tick> {
        self.last_warning_at
    }

    /// Feed the owner's distance from the start location.
    /// Another world counts as `f64::INFINITY`.
    pub fn observe(&mut self, distance: f64, zone: &BoundaryZone, now: Tick) -> BoundaryTransition {
        if distance > zone.radius {
            if self.state == BoundaryState::Outside {
                return BoundaryTransition::Unchanged;
            }
            self.state = BoundaryState::Outside;
            return BoundaryTransition::Left;
        }

        if self.state == BoundaryState::Outside {
            self.state = BoundaryState::Inside;
            self.last_warning_at = None;
            return BoundaryTransition::Returned;
        }

        if distance >= zone.band_start() {
            let cooled = self
                .last_warning_at
                .is_none_or(|at| now.since(at) >= zone.warning_cooldown);
            self.state = BoundaryState::Warned;
            if cooled {
                self.last_warning_at = Some(now);
                return BoundaryTransition::Warn;
            }
            return BoundaryTransition::Unchanged;
        }

        if self.state == BoundaryState::Warned {
            self.state = BoundaryState::Inside;
            return BoundaryTransition::Settled;
        }
        BoundaryTransition::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> BoundaryZone {
        BoundaryZone {
            radius: 30.0,
            warning_distance: 5.0,
            warning_cooldown: 200,
        }
    }

    #[test]
    fn warns_inside_the_band_only() {
        let mut b = Boundary::default();
        assert_eq!(b.observe(10.0, &zone(), Tick(0)), BoundaryTransition::Unchanged);
        assert_eq!(b.observe(25.0, &zone(), Tick(20)), BoundaryTransition::Warn);
        assert!(b.has_been_warned());
        assert_eq!(b.last_warning_at(), Some(Tick(20)));
    }

    #[test]
    fn warning_respects_cooldown() {
        let mut b = Boundary::default();
        assert_eq!(b.observe(28.0, &zone(), Tick(0)), BoundaryTransition::Warn);
        assert_eq!(b.observe(28.0, &zone(), Tick(100)), BoundaryTransition::Unchanged);
        // Dropping below the band keeps the warning time
        assert_eq!(b.observe(5.0, &zone(), Tick(120)), BoundaryTransition::Settled);
        assert_eq!(b.observe(28.0, &zone(), Tick(140)), BoundaryTransition::Unchanged);
        assert_eq!(b.observe(28.0, &zone(), Tick(200)), BoundaryTransition::Warn);
    }

    #[test]
    fn round_trip_clears_flags() {
        let mut b = Boundary::default();
        b.observe(27.0, &zone(), Tick(0));
        assert_eq!(b.observe(31.0, &zone(), Tick(20)), BoundaryTransition::Left);
        assert!(b.is_outside_area());
        assert_eq!(b.observe(45.0, &zone(), Tick(40)), BoundaryTransition::Unchanged);

        assert_eq!(b.observe(10.0, &zone(), Tick(60)), BoundaryTransition::Returned);
        assert!(!b.is_outside_area());
        assert!(!b.has_been_warned());
        assert_eq!(b.last_warning_at(), None);
        assert_eq!(b.observe(10.0, &zone(), Tick(80)), BoundaryTransition::Unchanged);
    }

    #[test]
    fn exactly_on_radius_is_inside() {
        let mut b = Boundary::default();
        assert_eq!(b.observe(30.0, &zone(), Tick(0)), BoundaryTransition::Warn);
        assert!(!b.is_outside_area());
    }

    #[test]
    fn other_world_is_outside() {
        let mut b = Boundary::default();
        assert_eq!(b.observe(f64::INFINITY, &zone(), Tick(0)), BoundaryTransition::Left);
    }

    #[test]
    fn return_into_band_warns_immediately() {
        let mut b = Boundary::default();
        b.observe(29.0, &zone(), Tick(0));
        b.observe(40.0, &zone(), Tick(20));
        assert_eq!(b.observe(29.0, &zone(), Tick(40)), BoundaryTransition::Returned);
        // History was cleared on return, so no cooldown applies
        assert_eq!(b.observe(29.0, &zone(), Tick(60)), BoundaryTransition::Warn);
    }
}
