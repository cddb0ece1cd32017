//! Shared curse displays
//!
//! Both displays are pure projections of a session. Each refresh recomputes
//! the viewer set (owner plus everyone within the combat radius) and hands
//! the whole set to the world, so nobody is patched in or out incrementally.

mod bar;
mod line;

pub use bar::{BarColor, BarPayload, FINAL_WAVE_TITLE, OUTSIDE_SUFFIX, bar_payload};
pub use line::{HudColor, HudLine, HudSegment, format_clock, hud_line, round_color, timer_color};

use crate::world::{ParticipantId, World};

/// The owner plus every online participant within `radius` of the owner's
/// current position. Empty when the owner is nowhere to be found.
pub fn observers(world: &dyn World, owner: ParticipantId, radius: f64) -> Vec<ParticipantId> {
    let Some(center) = world.location(owner) else {
        return Vec::new();
    };
    let mut viewers = vec![owner];
    viewers.extend(
        world
            .participants_near(&center, radius)
            .into_iter()
            .filter(|id| *id != owner),
    );
    viewers
}
