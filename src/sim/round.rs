//! Round state machine
//!
//! `Running -> Ended`. While running, a countdown timer and one repeating
//! spawn timer per scheduled kind drive the round; the player's physics step
//! drives collections. Reaching zero cancels every timer, closes the entity
//! registry and builds the mosaic. Nothing mutates the round afterwards.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{self, Collection};
use super::entity::{EntityId, EntityKind, EntityRegistry};
use super::event::{DespawnReason, RoundEvent, SoundEffect};
use super::player::{MoveInput, Player};
use super::scheduler::{Fired, Scheduler};
use super::state::{Counts, RoundState, TickOutcome};
use crate::error::RoundError;
use crate::mosaic::{self, Mosaic};
use crate::tuning::Tuning;

/// Work queued on the round scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTask {
    /// Countdown step
    Tick,
    /// Scheduled spawn of a kind
    Spawn(EntityKind),
    /// Lifetime of an entity ran out
    Expire(EntityId),
    /// A speed boost timer ran out
    EndBoost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Running,
    /// Terminal
    Ended,
}

/// What the end screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub score: u32,
    pub counts: Counts,
    pub mosaic: Mosaic,
    /// Score reached the reward threshold
    pub reward_unlocked: bool,
    pub call_to_action: String,
}

/// One round of play
#[derive(Debug)]
pub struct Round<R = Pcg32> {
    tuning: Tuning,
    field: Vec2,
    scheduler: Scheduler<RoundTask>,
    registry: EntityRegistry,
    state: RoundState,
    player: Player,
    phase: RoundPhase,
    rng: R,
    events: Vec<RoundEvent>,
    summary: Option<RoundSummary>,
}

impl Round<Pcg32> {
    /// Start a round with a seeded RNG
    pub fn with_seed(tuning: Tuning, field: Vec2, seed: u64) -> Result<Self, RoundError> {
        Self::new(tuning, field, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Round<R> {
    /// Validate `tuning` and enter `Running`: the first blue coin spawns
    /// immediately, the countdown and spawn schedules start.
    pub fn new(tuning: Tuning, field: Vec2, rng: R) -> Result<Self, RoundError> {
        tuning.validate()?;

        let mut round = Self {
            state: RoundState::new(tuning.round_seconds),
            player: Player::new(field),
            tuning,
            field,
            scheduler: Scheduler::new(),
            registry: EntityRegistry::new(),
            phase: RoundPhase::Running,
            rng,
            events: Vec::new(),
            summary: None,
        };

        round
            .scheduler
            .every(round.tuning.tick_interval(), RoundTask::Tick)?;
        round.spawn_kind(EntityKind::BlueCoin)?;
        for kind in EntityKind::ALL {
            if let Some(interval) = round.tuning.params(kind).interval() {
                round.scheduler.every(interval, RoundTask::Spawn(kind))?;
            }
        }

        log::info!(
            "Round started: {}s on a {}x{} field",
            round.tuning.round_seconds,
            field.x,
            field.y
        );
        round.events.push(RoundEvent::TimeChanged(round.state.time_left()));
        round.events.push(RoundEvent::ScoreChanged(0));

        Ok(round)
    }

    /// Advance the clock by `dt`, firing every timer that comes due in order.
    ///
    /// A failing timer is logged and skipped; the rest still run.
    pub fn advance(&mut self, dt: Duration) {
        let until = self.scheduler.now() + dt;
        while self.phase == RoundPhase::Running {
            let Some(fired) = self.scheduler.pop_due(until) else {
                break;
            };
            if let Err(err) = self.dispatch(&fired) {
                log::warn!("Timer {:?} at {:?} failed: {err}", fired.task, fired.at);
            }
        }
        self.scheduler.set_now(until);
    }

    fn dispatch(&mut self, fired: &Fired<RoundTask>) -> Result<(), RoundError> {
        if self.phase == RoundPhase::Ended {
            log::debug!("Dropped {:?} after round end", fired.task);
            return Ok(());
        }

        match fired.task {
            RoundTask::Tick => match self.state.tick() {
                TickOutcome::Running => {
                    self.events.push(RoundEvent::TimeChanged(self.state.time_left()));
                }
                TickOutcome::Expired => {
                    self.events.push(RoundEvent::TimeChanged(0));
                    self.end_round();
                }
                TickOutcome::Stopped => {}
            },
            RoundTask::Spawn(kind) => {
                self.spawn_kind(kind)?;
            }
            RoundTask::Expire(id) => {
                if self.registry.destroy(id).is_some() {
                    log::debug!("Entity #{} expired", id.0);
                    self.events.push(RoundEvent::Despawned {
                        id,
                        reason: DespawnReason::Expired,
                    });
                }
            }
            RoundTask::EndBoost => {
                if self.state.end_boost(fired.at) {
                    log::debug!("Boost ended");
                    self.events.push(RoundEvent::BoostChanged(false));
                }
            }
        }
        Ok(())
    }

    fn spawn_kind(&mut self, kind: EntityKind) -> Result<Option<EntityId>, RoundError> {
        let params = self.tuning.params(kind);
        let spawned = if kind == EntityKind::SpeedPowerUp {
            let previous = self.registry.power_up();
            let spawned = self.registry.spawn_power_up(
                params,
                self.field,
                &mut self.rng,
                &mut self.scheduler,
            )?;
            if let Some(previous) = previous.filter(|id| !self.registry.is_alive(*id)) {
                self.events.push(RoundEvent::Despawned {
                    id: previous,
                    reason: DespawnReason::Replaced,
                });
            }
            spawned
        } else {
            self.registry
                .spawn(kind, params, self.field, &mut self.rng, &mut self.scheduler)?
        };

        if let Some(entity) = spawned.and_then(|id| self.registry.get(id)) {
            self.events.push(RoundEvent::Spawned {
                id: entity.id,
                kind: entity.kind,
                pos: entity.pos,
            });
        }
        Ok(spawned)
    }

    /// One physics step: move the player, then collect everything it
    /// overlaps. Returns the number of entities collected.
    ///
    /// Input is ignored once the round has ended.
    pub fn step(&mut self, input: &MoveInput, dt: f32) -> Result<usize, RoundError> {
        if self.phase == RoundPhase::Ended {
            return Ok(0);
        }

        let speed = self.tuning.player_speed(self.state.boosting());
        if self.player.step(input.velocity(speed), dt, self.field) {
            log::debug!("Entered room {}", self.player.room);
            self.events.push(RoundEvent::RoomChanged(self.player.room));
        }

        let mut collected = 0;
        for id in collision::overlapping(&self.registry, &self.player.bounds()) {
            if self.collect(id)?.is_some() {
                collected += 1;
            }
        }
        Ok(collected)
    }

    /// Collect `id` on behalf of an overlap callback.
    ///
    /// Unknown, already collected or expired ids and any call after the
    /// round ended return `Ok(None)` and change nothing.
    pub fn collect(&mut self, id: EntityId) -> Result<Option<Collection>, RoundError> {
        if self.phase == RoundPhase::Ended {
            return Ok(None);
        }
        let Some(collection) = collision::collect(&mut self.registry, id, &self.tuning) else {
            return Ok(None);
        };
        self.events.push(RoundEvent::Despawned {
            id,
            reason: DespawnReason::Collected,
        });

        match collection {
            Collection::Coin {
                kind,
                score_delta,
                time_bonus,
                count_increment,
            } => {
                let replacement =
                    self.state
                        .apply_collection(kind, score_delta, time_bonus, count_increment);
                self.events.push(RoundEvent::ScoreChanged(self.state.score()));
                self.events.push(RoundEvent::TimeChanged(self.state.time_left()));
                self.events.push(RoundEvent::Sound(SoundEffect::CoinPickup));
                if let Some(kind) = replacement {
                    self.spawn_kind(kind)?;
                }
            }
            Collection::PowerUp => {
                let now = self.scheduler.now();
                let duration = self.tuning.boost_duration();
                if let Some(expiry) = self.state.start_boost(now, duration) {
                    self.scheduler.after(duration, RoundTask::EndBoost)?;
                    log::debug!("Boosting until {:?}", expiry);
                    self.events.push(RoundEvent::BoostChanged(true));
                }
                self.events.push(RoundEvent::Sound(SoundEffect::PowerUp));
            }
        }
        Ok(Some(collection))
    }

    fn end_round(&mut self) {
        self.phase = RoundPhase::Ended;
        self.scheduler.cancel_all();
        self.registry.close();

        let counts = self.state.counts();
        let score = self.state.score();
        let mosaic = mosaic::generate(&counts, &mut self.rng);
        let reward_unlocked = score >= self.tuning.reward_threshold;
        let call_to_action = if reward_unlocked {
            format!(
                "You reached {} points! Generate your mosaic?",
                self.tuning.reward_threshold
            )
        } else {
            "Game Over!".to_string()
        };

        log::info!(
            "Round over: score {}, coins {}/{}/{}, mosaic {}x{}",
            score,
            counts.blue,
            counts.green,
            counts.red,
            mosaic.side(),
            mosaic.side()
        );

        self.summary = Some(RoundSummary {
            score,
            counts,
            mosaic,
            reward_unlocked,
            call_to_action,
        });
        self.events.push(RoundEvent::Sound(SoundEffect::RoundOver));
        self.events.push(RoundEvent::RoundEnded);
    }

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn live_entity_count(&self) -> usize {
        self.registry.live_count()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn field(&self) -> Vec2 {
        self.field
    }

    /// Virtual time since the round started
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// End screen data, available once the round has ended
    pub fn summary(&self) -> Option<&RoundSummary> {
        self.summary.as_ref()
    }
}
