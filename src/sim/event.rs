//! Outbound events for the display and audio layers

use glam::Vec2;

use super::entity::{EntityId, EntityKind};

/// Sound effects the round asks the audio layer to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Coin collected
    CoinPickup,
    /// Speed power-up collected
    PowerUp,
    /// Countdown reached zero
    RoundOver,
}

/// Why an entity left the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnReason {
    Collected,
    Expired,
    /// An uncollected power-up replaced by a fresh one
    Replaced,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    Spawned { id: EntityId, kind: EntityKind, pos: Vec2 },
    Despawned { id: EntityId, reason: DespawnReason },
    ScoreChanged(u32),
    TimeChanged(u32),
    BoostChanged(bool),
    RoomChanged(u8),
    Sound(SoundEffect),
    RoundEnded,
}
