//! Host events the engine reacts to
//!
//! The host forwards deaths, joins, quits, consumed items and cursed-book
//! pickups. The returned [`EventOutcome`] tells it whether to cancel the
//! original action or adjust drops.

use tracing::{debug, info};

use super::manager::PlagueManager;
use super::session::EndReason;
use crate::items::ItemKind;
use crate::world::{
    Feedback, Location, MobId, ParticleKind, ParticipantId, SoundKind, StatusEffect, Tone, World,
    WorldEffect,
};

/// Radius within which bystanders hear about a consumed cursed book.
const BOOK_NEWS_RADIUS: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    ParticipantDied {
        participant: ParticipantId,
    },
    ParticipantQuit {
        participant: ParticipantId,
    },
    ParticipantJoined {
        participant: ParticipantId,
    },
    MobDied {
        mob: MobId,
    },
    ItemConsumed {
        participant: ParticipantId,
        display_name: String,
        has_bad_omen: bool,
    },
    /// A host entity picked up the cursed book at `at`
    CursedBookPickedUp {
        carrier: MobId,
        at: Location,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Handled,
    /// The host should cancel the triggering action
    Cancelled,
    /// A curse opponent died; scale its experience drop
    CurseMobKilled { xp_multiplier: u32 },
}

/// Trait for systems that react to host events.
pub trait EventHandler {
    fn handle_event(&mut self, world: &mut dyn World, event: &HostEvent) -> EventOutcome;

    /// Handle several events in order, returning each outcome.
    fn handle_events(&mut self, world: &mut dyn World, events: &[HostEvent]) -> Vec<EventOutcome> {
        events
            .iter()
            .map(|event| self.handle_event(world, event))
            .collect()
    }
}

impl EventHandler for PlagueManager {
    fn handle_event(&mut self, world: &mut dyn World, event: &HostEvent) -> EventOutcome {
        if self.config().debug.log_player_actions {
            info!(event = ?event, "Host event");
        }

        match event {
            HostEvent::ParticipantDied { participant } => {
                if !self.has_active_plague(*participant) {
                    return EventOutcome::Ignored;
                }
                self.reset_session(world, *participant, true);
                world.send_message(*participant, Feedback::error("Your curse has been reset due to death!"));
                EventOutcome::Handled
            }
            HostEvent::ParticipantQuit { participant } => {
                if !self.has_active_plague(*participant) {
                    return EventOutcome::Ignored;
                }
                // Cooldown waits for the rejoin
                self.pending_quits.insert(*participant);
                self.end_session(world, *participant, EndReason::Disconnected);
                EventOutcome::Handled
            }
            HostEvent::ParticipantJoined { participant } => {
                if !self.pending_quits.remove(participant) {
                    return EventOutcome::Ignored;
                }
                self.arm_cooldown(world, *participant);
                world.send_message(
                    *participant,
                    Feedback::warning(
                        "Your curse was reset due to leaving the server. You must wait before starting another one.",
                    ),
                );
                EventOutcome::Handled
            }
            HostEvent::MobDied { mob } => match self.record_mob_death(world, *mob) {
                Some(_) => EventOutcome::CurseMobKilled { xp_multiplier: 2 },
                None => EventOutcome::Ignored,
            },
            HostEvent::ItemConsumed {
                participant,
                display_name,
                has_bad_omen,
            } => match ItemKind::classify(display_name, *has_bad_omen) {
                ItemKind::Trigger => self.on_trigger(world, *participant),
                ItemKind::Antidote => self.on_antidote(world, *participant),
                ItemKind::Undo => self.on_undo(world, *participant),
                ItemKind::Other => EventOutcome::Ignored,
            },
            HostEvent::CursedBookPickedUp { carrier, at } => self.on_cursed_book(world, *carrier, at),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Consumables
// ─────────────────────────────────────────────────────────────────────────────

impl PlagueManager {
    fn on_trigger(&mut self, world: &mut dyn World, participant: ParticipantId) -> EventOutcome {
        if self.has_active_plague(participant) {
            world.send_message(participant, Feedback::error("You already have an active curse!"));
            return EventOutcome::Cancelled;
        }

        let is_night = world
            .location(participant)
            .and_then(|at| world.time_of_day(&at.world))
            .is_some_and(|t| self.config().clock.is_night(t));
        if !is_night {
            world.send_message(participant, Feedback::error("The curse can only be started at night!"));
            return EventOutcome::Cancelled;
        }

        match self.start_session(world, participant, false) {
            Ok(()) => {
                world.send_message(participant, Feedback::new(Tone::Dark, "You feel the darkness taking hold..."));
                EventOutcome::Handled
            }
            Err(e) => {
                debug!(participant = %participant, error = %e, "Trigger potion did not start a curse");
                world.send_message(participant, Feedback::error("Failed to start the curse!"));
                EventOutcome::Cancelled
            }
        }
    }

    fn on_antidote(&mut self, world: &mut dyn World, participant: ParticipantId) -> EventOutcome {
        let had_poison = world.has_effect(participant, StatusEffect::Poison);
        let had_glowing = world.has_effect(participant, StatusEffect::Glowing);

        if let Some(plague) = self.plague(participant) {
            if !plague.has_antidote() {
                world.send_message(participant, Feedback::error("This antidote isn't yours to use yet!"));
                return EventOutcome::Cancelled;
            }

            world.send_message(participant, Feedback::success("The antidote courses through your veins..."));
            world.remove_effect(participant, StatusEffect::Poison);
            world.remove_effect(participant, StatusEffect::Glowing);
            let summary = if had_poison {
                "The curse and poisoning effect have been cured!"
            } else {
                "The curse has been lifted!"
            };
            world.send_message(participant, Feedback::notice(summary));
            self.end_session(world, participant, EndReason::Cured);
            return EventOutcome::Handled;
        }

        if !had_poison && !had_glowing {
            world.send_message(participant, Feedback::warning("You don't have any curse effects to cure!"));
            return EventOutcome::Handled;
        }

        world.send_message(participant, Feedback::success("The antidote courses through your veins..."));
        world.remove_effect(participant, StatusEffect::Poison);
        world.remove_effect(participant, StatusEffect::Glowing);
        let summary = match (had_poison, had_glowing) {
            (true, true) => "The poisoning and glowing effects have been cured!",
            (true, false) => "The poisoning effect has been cured!",
            _ => "The glowing effect has been cured!",
        };
        world.send_message(participant, Feedback::notice(summary));
        EventOutcome::Handled
    }

    fn on_undo(&mut self, world: &mut dyn World, participant: ParticipantId) -> EventOutcome {
        if !self.has_active_plague(participant) {
            world.send_message(participant, Feedback::error("You don't have an active curse!"));
            return EventOutcome::Handled;
        }

        let mut cleansed = false;
        for effect in [StatusEffect::Poison, StatusEffect::Weakness, StatusEffect::Slowness] {
            cleansed |= world.remove_effect(participant, effect);
        }
        world.restore_condition(participant);

        world.send_message(participant, Feedback::info("The undo potion restores your condition!"));
        if cleansed {
            world.send_message(participant, Feedback::success("Negative effects have been cleansed!"));
        }
        world.send_message(participant, Feedback::success("You feel refreshed and ready to continue!"));
        EventOutcome::Handled
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cursed Book
    // ─────────────────────────────────────────────────────────────────────────

    fn on_cursed_book(&mut self, world: &mut dyn World, carrier: MobId, at: &Location) -> EventOutcome {
        let book = &self.config().cursed_book;
        if !book.enabled {
            return EventOutcome::Ignored;
        }
        let range = book.pickup_range;
        let activation_effects = book.enable_activation_effects;

        let Some(participant) = nearest_participant(world, at, range) else {
            return EventOutcome::Ignored;
        };

        if self.has_active_plague(participant) {
            world.send_message(participant, Feedback::error("You already have an active curse!"));
            return EventOutcome::Ignored;
        }
        if let Some(remaining) = self.cooldown_blocks(world, participant) {
            world.send_message(
                participant,
                Feedback::error(format!(
                    "You must wait {} minutes before starting another curse!",
                    remaining / 60
                )),
            );
            return EventOutcome::Ignored;
        }

        if activation_effects {
            self.play_book_activation(world, participant, at);
        }
        self.schedule_despawn(carrier);
        self.schedule_delayed_start(participant);

        info!(participant = %participant, carrier = %carrier, "Cursed book consumed");
        EventOutcome::Cancelled
    }

    fn play_book_activation(&self, world: &mut dyn World, participant: ParticipantId, at: &Location) {
        world.play_effect(WorldEffect::Sound {
            kind: SoundKind::WitherSpawn,
            at: at.clone(),
        });
        world.play_effect(WorldEffect::Sound {
            kind: SoundKind::Thunder,
            at: at.clone(),
        });

        if self.config().plague.visual_effects {
            let above = at.offset(0.0, 1.0, 0.0);
            for (kind, count) in [
                (ParticleKind::Smoke, 20),
                (ParticleKind::Witch, 15),
                (ParticleKind::SoulFire, 10),
            ] {
                world.play_effect(WorldEffect::Particles {
                    kind,
                    at: above.clone(),
                    count,
                });
            }
        }

        world.send_message(
            participant,
            Feedback::new(Tone::Dark, "The zombie's eyes glow with dark energy..."),
        );

        let name = world
            .display_name(participant)
            .unwrap_or_else(|| participant.to_string());
        for bystander in world.participants_near(at, BOOK_NEWS_RADIUS) {
            if bystander != participant {
                world.send_message(
                    bystander,
                    Feedback::warning(format!("{name}'s cursed book has been consumed by a zombie!")),
                );
            }
        }
    }
}

/// Closest online participant within `range` of `at`.
fn nearest_participant(world: &dyn World, at: &Location, range: f64) -> Option<ParticipantId> {
    world
        .participants_near(at, range)
        .into_iter()
        .filter_map(|id| {
            let distance = world.location(id)?.distance(at)?;
            Some((id, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
