//! Spawned collectibles and their lifetimes
//!
//! The registry owns every live entity. Entities leave it exactly once, either
//! by expiring or by being collected; whichever comes second is a no-op.

use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::round::RoundTask;
use super::scheduler::Scheduler;
use crate::error::SchedulerError;
use crate::tuning::SpawnParams;

/// Stable entity identifier (never reused within a round)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    BlueCoin,
    GreenCoin,
    RedCoin,
    SpeedPowerUp,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::BlueCoin,
        EntityKind::GreenCoin,
        EntityKind::RedCoin,
        EntityKind::SpeedPowerUp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::BlueCoin => "blue coin",
            EntityKind::GreenCoin => "green coin",
            EntityKind::RedCoin => "red coin",
            EntityKind::SpeedPowerUp => "speed power-up",
        }
    }
}

/// A spawned collectible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Centre position in play-field pixels
    pub pos: Vec2,
    /// Display size in pixels
    pub size: Vec2,
    /// Virtual time of the spawn
    pub spawned_at: Duration,
    /// Lifetime, if the entity expires at all
    pub expiry: Option<Duration>,
    pub alive: bool,
}

impl Entity {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }
}

/// Owner of every live entity in a round
#[derive(Debug)]
pub struct EntityRegistry {
    /// Live entities (sorted by id for deterministic iteration)
    live: BTreeMap<EntityId, Entity>,
    /// The single live power-up, if any
    power_up: Option<EntityId>,
    /// Set when the round ends; later spawns are dropped
    closed: bool,
    next_id: u32,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            live: BTreeMap::new(),
            power_up: None,
            closed: false,
            next_id: 1,
        }
    }

    /// Spawn `kind` at a uniformly random point inside `field`
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        kind: EntityKind,
        params: &SpawnParams,
        field: Vec2,
        rng: &mut R,
        scheduler: &mut Scheduler<RoundTask>,
    ) -> Result<Option<EntityId>, SchedulerError> {
        let pos = Vec2::new(
            rng.random_range(0.0..=field.x.max(0.0)),
            rng.random_range(0.0..=field.y.max(0.0)),
        );
        self.spawn_at(kind, pos, params, scheduler)
    }

    /// Spawn a speed power-up, replacing any live one
    pub fn spawn_power_up<R: Rng + ?Sized>(
        &mut self,
        params: &SpawnParams,
        field: Vec2,
        rng: &mut R,
        scheduler: &mut Scheduler<RoundTask>,
    ) -> Result<Option<EntityId>, SchedulerError> {
        self.spawn(EntityKind::SpeedPowerUp, params, field, rng, scheduler)
    }

    /// Spawn `kind` at `pos` and register its expiry timer.
    ///
    /// Returns `Ok(None)` once the registry is closed.
    pub fn spawn_at(
        &mut self,
        kind: EntityKind,
        pos: Vec2,
        params: &SpawnParams,
        scheduler: &mut Scheduler<RoundTask>,
    ) -> Result<Option<EntityId>, SchedulerError> {
        if self.closed {
            log::debug!("Dropped {} spawn after round end", kind.as_str());
            return Ok(None);
        }

        let id = EntityId(self.next_id);
        let expiry = params.expiry();
        if let Some(lifetime) = expiry {
            scheduler.after(lifetime, RoundTask::Expire(id))?;
        }
        self.next_id += 1;

        if kind == EntityKind::SpeedPowerUp {
            if let Some(previous) = self.power_up.take() {
                self.destroy(previous);
            }
            self.power_up = Some(id);
        }

        let entity = Entity {
            id,
            kind,
            pos,
            size: Vec2::new(params.width, params.height),
            spawned_at: scheduler.now(),
            expiry,
            alive: true,
        };
        log::debug!("Spawned {} #{} at ({:.0}, {:.0})", kind.as_str(), id.0, pos.x, pos.y);
        self.live.insert(id, entity);

        Ok(Some(id))
    }

    /// Remove an entity. Unknown or already destroyed ids return `None`.
    pub fn destroy(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.live.remove(&id)?;
        entity.alive = false;
        if self.power_up == Some(id) {
            self.power_up = None;
        }
        Some(entity)
    }

    /// Stop accepting spawns
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.live.get(&id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.live.contains_key(&id)
    }

    /// Live entities in id order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.live.values()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.live.values().filter(|e| e.kind == kind).count()
    }

    pub fn power_up(&self) -> Option<EntityId> {
        self.power_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_registers_expiry() {
        let tuning = Tuning::default();
        let mut scheduler = Scheduler::new();
        let mut registry = EntityRegistry::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let field = Vec2::new(800.0, 600.0);

        let red = registry
            .spawn(EntityKind::RedCoin, &tuning.red_coin, field, &mut rng, &mut scheduler)
            .unwrap()
            .unwrap();
        let entity = registry.get(red).unwrap();
        assert!(entity.alive);
        assert!(entity.pos.x >= 0.0 && entity.pos.x <= field.x);
        assert!(entity.pos.y >= 0.0 && entity.pos.y <= field.y);
        assert_eq!(entity.size, Vec2::new(40.0, 60.0));

        let fired = scheduler.pop_due(Duration::from_secs(10)).unwrap();
        assert_eq!(fired.task, RoundTask::Expire(red));
        assert_eq!(fired.at, Duration::from_millis(3000));
    }

    #[test]
    fn test_non_expiring_kind_has_no_timer() {
        let tuning = Tuning::default();
        let mut scheduler = Scheduler::new();
        let mut registry = EntityRegistry::new();

        let blue = registry
            .spawn_at(EntityKind::BlueCoin, Vec2::ZERO, &tuning.blue_coin, &mut scheduler)
            .unwrap()
            .unwrap();
        assert_eq!(registry.get(blue).unwrap().expiry, None);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let tuning = Tuning::default();
        let mut scheduler = Scheduler::new();
        let mut registry = EntityRegistry::new();
        let id = registry
            .spawn_at(EntityKind::GreenCoin, Vec2::ZERO, &tuning.green_coin, &mut scheduler)
            .unwrap()
            .unwrap();

        let destroyed = registry.destroy(id).unwrap();
        assert!(!destroyed.alive);
        assert!(registry.destroy(id).is_none());
        assert!(registry.destroy(EntityId(999)).is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_at_most_one_power_up() {
        let tuning = Tuning::default();
        let mut scheduler = Scheduler::new();
        let mut registry = EntityRegistry::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let field = Vec2::new(100.0, 100.0);

        let first = registry
            .spawn_power_up(&tuning.speed_power_up, field, &mut rng, &mut scheduler)
            .unwrap()
            .unwrap();
        let second = registry
            .spawn_power_up(&tuning.speed_power_up, field, &mut rng, &mut scheduler)
            .unwrap()
            .unwrap();

        assert!(!registry.is_alive(first));
        assert!(registry.is_alive(second));
        assert_eq!(registry.power_up(), Some(second));
        assert_eq!(registry.count_of(EntityKind::SpeedPowerUp), 1);
    }

    #[test]
    fn test_closed_registry_drops_spawns() {
        let tuning = Tuning::default();
        let mut scheduler = Scheduler::new();
        let mut registry = EntityRegistry::new();
        registry.close();

        let spawned = registry
            .spawn_at(EntityKind::RedCoin, Vec2::ZERO, &tuning.red_coin, &mut scheduler)
            .unwrap();
        assert!(spawned.is_none());
        assert_eq!(registry.live_count(), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_zero_lifetime_surfaces_invalid_delay() {
        let mut params = Tuning::default().red_coin;
        params.lifetime_ms = 0;
        let mut scheduler = Scheduler::new();
        let mut registry = EntityRegistry::new();

        let result = registry.spawn_at(EntityKind::RedCoin, Vec2::ZERO, &params, &mut scheduler);
        assert_eq!(result, Err(SchedulerError::InvalidDelay));
        assert_eq!(registry.live_count(), 0);
    }
}
