//! Per-participant restart cooldowns
//!
//! After a reset (death, `/curse reset --cooldown`, quitting mid-session) a
//! participant may not start a new curse until the cooldown runs out.
//! Expired entries are dropped lazily the next time they are queried.

use chrono::{Duration, NaiveDateTime};
use hashbrown::HashMap;

use crate::world::ParticipantId;

#[derive(Debug, Clone)]
pub struct CooldownRegistry {
    blocked_until: HashMap<ParticipantId, NaiveDateTime>,
    duration: Duration,
}

impl CooldownRegistry {
    pub fn new(minutes: u32) -> Self {
        Self {
            blocked_until: HashMap::new(),
            duration: Duration::minutes(minutes as i64),
        }
    }

    /// Block `id` until `now` plus the configured duration.
    pub fn set(&mut self, id: ParticipantId, now: NaiveDateTime) {
        self.blocked_until.insert(id, now + self.duration);
    }

    /// Whether `id` is still blocked. Clears the entry once it has expired.
    pub fn has(&mut self, id: ParticipantId, now: NaiveDateTime) -> bool {
        match self.blocked_until.get(&id) {
            Some(until) if now < *until => true,
            Some(_) => {
                self.blocked_until.remove(&id);
                false
            }
            None => false,
        }
    }

    /// Whole seconds left, rounded down. 0 when absent or expired.
    pub fn remaining_secs(&self, id: ParticipantId, now: NaiveDateTime) -> u64 {
        self.blocked_until
            .get(&id)
            .map(|until| (*until - now).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }

    pub fn remove(&mut self, id: ParticipantId) -> bool {
        self.blocked_until.remove(&id).is_some()
    }

    pub fn clear(&mut self) {
        self.blocked_until.clear();
    }

    /// Applies to cooldowns armed after the change.
    pub fn set_duration_minutes(&mut self, minutes: u32) {
        self.duration = Duration::minutes(minutes as i64);
    }

    pub fn len(&self) -> usize {
        self.blocked_until.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked_until.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(secs: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::seconds(secs)
    }

    #[test]
    fn blocks_for_the_configured_minutes() {
        let mut cooldowns = CooldownRegistry::new(5);
        let id = ParticipantId(1);
        cooldowns.set(id, at(0));

        assert!(cooldowns.has(id, at(299)));
        assert_eq!(cooldowns.remaining_secs(id, at(0)), 300);
        assert_eq!(cooldowns.remaining_secs(id, at(120)), 180);
    }

    #[test]
    fn expiry_clears_lazily() {
        let mut cooldowns = CooldownRegistry::new(5);
        let id = ParticipantId(1);
        cooldowns.set(id, at(0));

        assert_eq!(cooldowns.len(), 1);
        assert_eq!(cooldowns.remaining_secs(id, at(400)), 0);
        assert!(!cooldowns.has(id, at(300)));
        assert!(cooldowns.is_empty());
    }

    #[test]
    fn absent_participant_is_free() {
        let mut cooldowns = CooldownRegistry::new(5);
        assert!(!cooldowns.has(ParticipantId(9), at(0)));
        assert_eq!(cooldowns.remaining_secs(ParticipantId(9), at(0)), 0);
    }

    #[test]
    fn set_again_restarts_the_window() {
        let mut cooldowns = CooldownRegistry::new(1);
        let id = ParticipantId(3);
        cooldowns.set(id, at(0));
        cooldowns.set(id, at(50));
        assert!(cooldowns.has(id, at(100)));
        assert_eq!(cooldowns.remaining_secs(id, at(100)), 10);
    }

    #[test]
    fn duration_change_applies_to_new_entries() {
        let mut cooldowns = CooldownRegistry::new(5);
        cooldowns.set(ParticipantId(1), at(0));
        cooldowns.set_duration_minutes(1);
        cooldowns.set(ParticipantId(2), at(0));

        assert!(cooldowns.has(ParticipantId(1), at(120)));
        assert!(!cooldowns.has(ParticipantId(2), at(120)));
    }
}
