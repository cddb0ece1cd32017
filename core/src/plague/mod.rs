//! Curse sessions and their manager
//!
//! - **Session** (`Plague`): one participant's encounter state
//! - **Manager**: admission, spawning, rewards, monitoring and teardown
//! - **Boundary**: containment state machine driven by the monitor
//! - **Events**: host notifications (deaths, quits, consumed items)

mod boundary;
mod error;
mod events;
mod manager;
mod rewards;
mod session;
pub mod waves;


pub use boundary::{Boundary, BoundaryState, BoundaryTransition, BoundaryZone};
pub use error::{AdmissionDenied, PlagueError};
pub use events::{EventHandler, EventOutcome, HostEvent};
pub use manager::{PlagueManager, Task};
pub use rewards::{RewardDrop, roll_rewards};
pub use session::{EndReason, KillOutcome, Plague, SessionSnapshot, SessionTimers};
