pub mod context;
pub mod cooldown;
pub mod hud;
pub mod items;
pub mod leaderboard;
pub mod plague;
pub mod timers;
pub mod world;

// Re-exports for convenience
pub use context::{ConfigError, CurseConfig, CurseConfigExt, config_path};
pub use cooldown::CooldownRegistry;
pub use leaderboard::{FileLeaderboard, Leaderboard, MemoryLeaderboard, StatsRecorder};
pub use plague::{
    AdmissionDenied, EndReason, EventHandler, EventOutcome, HostEvent, Plague, PlagueError,
    PlagueManager, SessionSnapshot,
};
pub use timers::{Scheduler, Tick};
pub use world::{Feedback, Location, MobId, ParticipantId, SimWorld, Tone, World};
