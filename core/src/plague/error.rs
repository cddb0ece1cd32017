//! Error types for session admission and control

use thiserror::Error;

use crate::world::ParticipantId;

/// Why a session could not start. Display is the message shown to the participant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdmissionDenied {
    #[error("You already have an active curse!")]
    AlreadyActive,

    #[error("You must wait {remaining_secs} seconds before starting another curse!")]
    Cooldown { remaining_secs: u64 },

    #[error("Too many active curses on the server!")]
    ServerFull { max: usize },

    #[error("The curse can only be started at night!")]
    NotNight { time_of_day: u32 },

    #[error("You're too close to a village to start the curse!")]
    ProtectedZone { distance: f64, min: u32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlagueError {
    #[error(transparent)]
    Admission(#[from] AdmissionDenied),

    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),

    #[error("participant {0} has no active curse")]
    NoActiveSession(ParticipantId),
}

impl PlagueError {
    pub fn is_admission(&self) -> bool {
        matches!(self, PlagueError::Admission(_))
    }
}
