use crate::plague::Plague;

pub const FINAL_WAVE_TITLE: &str = "The Curse - Final Wave (Use Antidote!)";
pub const OUTSIDE_SUFFIX: &str = "(Return to the curse area!)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarColor {
    Red,
    Purple,
    Yellow,
}

/// Status bar contents. `progress` is the fraction of the wave still alive.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPayload {
    pub title: String,
    pub color: BarColor,
    pub progress: f64,
}

pub fn bar_payload(plague: &Plague) -> BarPayload {
    let (mut title, mut color) = if plague.is_final_wave() {
        (FINAL_WAVE_TITLE.to_string(), BarColor::Purple)
    } else {
        (format!("The Curse - Round {}", plague.current_round()), BarColor::Red)
    };

    if plague.is_outside_area() {
        title = format!("{title} {OUTSIDE_SUFFIX}");
        color = BarColor::Yellow;
    }

    let progress = match plague.initial_mob_count() {
        0 => 1.0,
        initial => (plague.remaining_mobs() as f64 / initial as f64).clamp(0.0, 1.0),
    };

    BarPayload {
        title,
        color,
        progress,
    }
}
