//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Virtual clock only (the caller feeds elapsed time)
//! - Injected RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod event;
pub mod player;
pub mod round;
pub mod scheduler;
pub mod state;

pub use collision::{Aabb, Collection};
pub use entity::{Entity, EntityId, EntityKind, EntityRegistry};
pub use event::{DespawnReason, RoundEvent, SoundEffect};
pub use player::{MoveInput, Player};
pub use round::{Round, RoundPhase, RoundSummary, RoundTask};
pub use scheduler::{Fired, Scheduler, TimerHandle, TimerMode};
pub use state::{Counts, RoundState, TickOutcome};
