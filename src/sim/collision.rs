//! Player/entity overlap and collection policy
//!
//! Overlap is a plain axis-aligned box test. The browser build may feed
//! overlaps from its own physics instead; either way every id goes through
//! [`collect`], which turns the first overlap into a collection and ignores
//! the rest.

use glam::Vec2;

use super::entity::{EntityId, EntityKind, EntityRegistry};
use crate::tuning::Tuning;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Touching edges count as overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

/// Result of collecting a live entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Coin {
        kind: EntityKind,
        score_delta: u32,
        time_bonus: u32,
        count_increment: u32,
    },
    PowerUp,
}

/// Live entities overlapping the player, in id order
pub fn overlapping(registry: &EntityRegistry, player: &Aabb) -> Vec<EntityId> {
    registry
        .iter()
        .filter(|entity| entity.bounds().overlaps(player))
        .map(|entity| entity.id)
        .collect()
}

/// Destroy `id` and describe what was collected.
///
/// Returns `None` if the entity is unknown or already gone, so repeated
/// overlap callbacks for one entity collect it once.
pub fn collect(registry: &mut EntityRegistry, id: EntityId, tuning: &Tuning) -> Option<Collection> {
    let entity = registry.destroy(id)?;
    let collection = match entity.kind {
        EntityKind::SpeedPowerUp => Collection::PowerUp,
        kind => {
            let params = tuning.params(kind);
            Collection::Coin {
                kind,
                score_delta: params.score_delta,
                time_bonus: params.time_bonus,
                count_increment: params.count_increment,
            }
        }
    };
    log::debug!("Collected {} #{}", entity.kind.as_str(), id.0);
    Some(collection)
}
