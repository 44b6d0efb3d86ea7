//! Score, countdown and boost state for one round
//!
//! Mutated only through collections, countdown ticks and boost changes. Once
//! the countdown hits zero the state is frozen.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::entity::EntityKind;

/// Collected coins per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub blue: u32,
    pub green: u32,
    pub red: u32,
}

impl Counts {
    pub fn new(blue: u32, green: u32, red: u32) -> Self {
        Self { blue, green, red }
    }

    pub fn get(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::BlueCoin => self.blue,
            EntityKind::GreenCoin => self.green,
            EntityKind::RedCoin => self.red,
            EntityKind::SpeedPowerUp => 0,
        }
    }

    fn add(&mut self, kind: EntityKind, n: u32) {
        let slot = match kind {
            EntityKind::BlueCoin => &mut self.blue,
            EntityKind::GreenCoin => &mut self.green,
            EntityKind::RedCoin => &mut self.red,
            EntityKind::SpeedPowerUp => return,
        };
        *slot = slot.saturating_add(n);
    }

    pub fn total(&self) -> u32 {
        self.blue.saturating_add(self.green).saturating_add(self.red)
    }
}

/// What a countdown tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time remains
    Running,
    /// This tick reached zero; reported exactly once
    Expired,
    /// The countdown had already expired
    Stopped,
}

/// Mutable round state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    score: u32,
    /// Seconds left on the countdown
    time_left: u32,
    boosting: bool,
    /// Virtual time the current boost ends
    boost_expiry: Option<Duration>,
    counts: Counts,
    expired: bool,
}

impl RoundState {
    pub fn new(round_seconds: u32) -> Self {
        Self {
            score: 0,
            time_left: round_seconds,
            boosting: false,
            boost_expiry: None,
            counts: Counts::default(),
            expired: round_seconds == 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn boosting(&self) -> bool {
        self.boosting
    }

    pub fn boost_expiry(&self) -> Option<Duration> {
        self.boost_expiry
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Apply a coin collection.
    ///
    /// Returns the kind that must be respawned to replace it (blue coins
    /// only), or `None` if nothing needs replacing or the countdown is over.
    pub fn apply_collection(
        &mut self,
        kind: EntityKind,
        score_delta: u32,
        time_bonus: u32,
        count_increment: u32,
    ) -> Option<EntityKind> {
        if self.expired {
            return None;
        }
        self.score = self.score.saturating_add(score_delta);
        self.time_left = self.time_left.saturating_add(time_bonus);
        self.counts.add(kind, count_increment);

        (kind == EntityKind::BlueCoin).then_some(EntityKind::BlueCoin)
    }

    /// One countdown step
    pub fn tick(&mut self) -> TickOutcome {
        if self.expired {
            return TickOutcome::Stopped;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.expired = true;
            self.boosting = false;
            self.boost_expiry = None;
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }

    /// Start or extend a boost ending at `now + duration`. The latest call
    /// wins even if it ends earlier than a boost already running.
    pub fn start_boost(&mut self, now: Duration, duration: Duration) -> Option<Duration> {
        if self.expired {
            return None;
        }
        let expiry = now + duration;
        self.boosting = true;
        self.boost_expiry = Some(expiry);
        Some(expiry)
    }

    /// End the boost if its expiry has been reached by `at`. A stale timer
    /// from an earlier collection finds a later expiry and does nothing.
    pub fn end_boost(&mut self, at: Duration) -> bool {
        match self.boost_expiry {
            Some(expiry) if self.boosting && expiry <= at => {
                self.boosting = false;
                self.boost_expiry = None;
                true
            }
            _ => false,
        }
    }
}
