use curse_types::CurseConfig;

use crate::plague::Plague;
use crate::timers::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudColor {
    Black,
    Gray,
    DarkGray,
    White,
    Green,
    Yellow,
    Gold,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudSegment {
    pub text: String,
    pub color: HudColor,
    pub bold: bool,
}

impl HudSegment {
    fn new(text: impl Into<String>, color: HudColor) -> Self {
        Self {
            text: text.into(),
            color,
            bold: false,
        }
    }
}

/// Action-bar line as colored segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HudLine {
    pub segments: Vec<HudSegment>,
}

impl HudLine {
    fn push(&mut self, text: impl Into<String>, color: HudColor) {
        self.segments.push(HudSegment::new(text, color));
    }

    /// Plain text without colors.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn segment(&self, text: &str) -> Option<&HudSegment> {
        self.segments.iter().find(|s| s.text == text)
    }
}

/// Round number color by difficulty.
pub fn round_color(round: u32) -> HudColor {
    match round {
        0..=2 => HudColor::Green,
        3..=4 => HudColor::Yellow,
        5..=6 => HudColor::Gold,
        _ => HudColor::Red,
    }
}

/// Timer color by the fraction of the limit left.
pub fn timer_color(remaining_secs: u64, limit_secs: u64) -> HudColor {
    if limit_secs == 0 {
        return HudColor::Red;
    }
    let fraction = remaining_secs as f64 / limit_secs as f64;
    if fraction > 0.5 {
        HudColor::Green
    } else if fraction > 0.25 {
        HudColor::Yellow
    } else {
        HudColor::Red
    }
}

/// `MM:SS`
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn hud_line(plague: &Plague, config: &CurseConfig, now: Tick) -> HudLine {
    let hud = &config.hud;
    let mut line = HudLine::default();

    line.push("▌ ", HudColor::Black);
    line.push("Round: ", HudColor::Gray);
    line.push(plague.current_round().to_string(), round_color(plague.current_round()));
    line.push(format!("/{}", config.plague.max_rounds), HudColor::DarkGray);

    if hud.show_kills {
        line.push(" | Kills: ", HudColor::Gray);
        line.push(plague.total_kills().to_string(), HudColor::White);
    }

    if hud.show_remaining_mobs {
        let remaining = plague.remaining_mobs();
        let color = if remaining > 0 { HudColor::Red } else { HudColor::Green };
        line.push(" | Remaining: ", HudColor::Gray);
        line.push(remaining.to_string(), color);
    }

    let limit = config.plague.time_limit_per_round as u64;
    if hud.show_timer && limit > 0 && !plague.is_final_wave() {
        let elapsed = Tick(now.since(plague.round_started_at())).as_secs();
        let remaining = limit.saturating_sub(elapsed);
        if remaining > 0 {
            line.push(" | Time: ", HudColor::Gray);
            line.push(format_clock(remaining), timer_color(remaining, limit));
        }
    }

    if hud.show_antidote_status && plague.has_antidote() {
        line.push(" | ", HudColor::Gray);
        line.segments.push(HudSegment {
            text: "ANTIDOTE AVAILABLE".to_string(),
            color: HudColor::Green,
            bold: true,
        });
    }

    line.push(" ▐", HudColor::Black);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::{BarColor, bar_payload};
    use crate::world::{Location, MobId, ParticipantId};
    use chrono::NaiveDate;

    fn make_plague() -> Plague {
        let wall = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();
        let mut plague = Plague::new(
            ParticipantId(1),
            1,
            Location::new("world", 0.0, 64.0, 0.0),
            Tick(0),
            wall,
        );
        plague.begin_wave(4, Tick(0));
        for i in 1..=4 {
            plague.add_mob(MobId(i));
        }
        plague
    }

    #[test]
    fn full_line_text() {
        let mut plague = make_plague();
        plague.record_kill(MobId(1));
        plague.grant_antidote();
        let config = CurseConfig::default();

        let line = hud_line(&plague, &config, Tick(20 * 30));
        assert_eq!(
            line.text(),
            "▌ Round: 1/7 | Kills: 1 | Remaining: 3 | Time: 02:30 | ANTIDOTE AVAILABLE ▐"
        );
        assert_eq!(line.segment("02:30").map(|s| s.color), Some(HudColor::Green));
        assert_eq!(line.segment("3").map(|s| s.color), Some(HudColor::Red));
    }

    #[test]
    fn toggles_hide_segments() {
        let plague = make_plague();
        let mut config = CurseConfig::default();
        config.hud.show_kills = false;
        config.hud.show_timer = false;
        config.hud.show_remaining_mobs = false;

        assert_eq!(hud_line(&plague, &config, Tick(0)).text(), "▌ Round: 1/7 ▐");
    }

    #[test]
    fn timer_hidden_when_expired_or_disabled() {
        let plague = make_plague();
        let mut config = CurseConfig::default();
        assert!(!hud_line(&plague, &config, Tick(20 * 180)).text().contains("Time"));

        config.plague.time_limit_per_round = 0;
        assert!(!hud_line(&plague, &config, Tick(0)).text().contains("Time"));
    }

    #[test]
    fn colors_by_threshold() {
        assert_eq!(round_color(2), HudColor::Green);
        assert_eq!(round_color(4), HudColor::Yellow);
        assert_eq!(round_color(6), HudColor::Gold);
        assert_eq!(round_color(8), HudColor::Red);
        assert_eq!(timer_color(91, 180), HudColor::Green);
        assert_eq!(timer_color(90, 180), HudColor::Yellow);
        assert_eq!(timer_color(45, 180), HudColor::Red);
        assert_eq!(format_clock(605), "10:05");
    }

    #[test]
    fn bar_tracks_remaining_fraction_and_boundary() {
        let mut plague = make_plague();
        plague.record_kill(MobId(1));
        let bar = bar_payload(&plague);
        assert_eq!(bar.title, "The Curse - Round 1");
        assert_eq!(bar.color, BarColor::Red);
        assert!((bar.progress - 0.75).abs() < 1e-9);

        let zone = crate::plague::BoundaryZone {
            radius: 30.0,
            warning_distance: 5.0,
            warning_cooldown: 200,
        };
        plague.boundary.observe(50.0, &zone, Tick(20));
        let bar = bar_payload(&plague);
        assert_eq!(bar.color, BarColor::Yellow);
        assert!(bar.title.ends_with("(Return to the curse area!)"));
    }

    #[test]
    fn final_wave_bar_is_purple() {
        let mut plague = make_plague();
        plague.advance_round(1);
        let bar = bar_payload(&plague);
        assert_eq!(bar.color, BarColor::Purple);
        assert_eq!(bar.title, crate::hud::FINAL_WAVE_TITLE);
    }
}
