//! Round balance and spawn tables
//!
//! Defaults match the arcade timings. A browser build may ship a
//! JSON override; anything missing falls back to the defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use crate::sim::EntityKind;

/// Largest accepted `count_increment`; keeps mosaic tile counts bounded
pub const MAX_COUNT_INCREMENT: u32 = 100;

/// Per-kind spawn parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnParams {
    /// Display width in pixels
    pub width: f32,
    /// Display height in pixels
    pub height: f32,
    /// Time an uncollected entity stays on the field (ms)
    pub lifetime_ms: u64,
    /// Whether the lifetime applies at all
    pub expires: bool,
    /// Points awarded on collection
    pub score_delta: u32,
    /// Seconds added to the countdown on collection
    pub time_bonus: u32,
    /// Added to the per-kind collected count
    pub count_increment: u32,
    /// Repeating spawn interval (ms); `None` means the kind is never spawned on a schedule
    pub interval_ms: Option<u64>,
}

impl SpawnParams {
    const fn coin(lifetime_ms: u64, expires: bool, score_delta: u32, time_bonus: u32) -> Self {
        Self {
            width: 40.0,
            height: 60.0,
            lifetime_ms,
            expires,
            score_delta,
            time_bonus,
            count_increment: 1,
            interval_ms: None,
        }
    }

    const fn every(mut self, interval_ms: u64) -> Self {
        self.interval_ms = Some(interval_ms);
        self
    }

    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval_ms.map(Duration::from_millis)
    }

    /// Lifetime to register for a fresh entity, if it expires at all
    pub fn expiry(&self) -> Option<Duration> {
        self.expires.then(|| self.lifetime())
    }
}

/// Complete round tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Countdown length at round start (seconds)
    pub round_seconds: u32,
    /// Countdown tick period (ms)
    pub tick_interval_ms: u64,
    /// How long a speed boost lasts (ms)
    pub boost_duration_ms: u64,
    /// Speed multiplier while boosting
    pub boost_multiplier: f32,
    /// Player speed without boost (px/s)
    pub base_speed: f32,
    /// Score at which the end screen offers the mosaic reward
    pub reward_threshold: u32,

    pub blue_coin: SpawnParams,
    pub green_coin: SpawnParams,
    pub red_coin: SpawnParams,
    pub speed_power_up: SpawnParams,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            round_seconds: 60,
            tick_interval_ms: 1000,
            boost_duration_ms: 5000,
            boost_multiplier: 2.0,
            base_speed: 320.0,
            reward_threshold: 50,

            // Blue coins never time out so one is always on the field
            blue_coin: SpawnParams::coin(9000, false, 1, 1),
            green_coin: SpawnParams::coin(6000, true, 10, 4).every(20_000),
            red_coin: SpawnParams::coin(3000, true, 20, 8).every(40_000),
            speed_power_up: SpawnParams {
                width: 100.0,
                height: 100.0,
                lifetime_ms: 6000,
                expires: true,
                score_delta: 0,
                time_bonus: 0,
                count_increment: 0,
                interval_ms: Some(15_000),
            },
        }
    }
}

impl Tuning {
    /// Parse a JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn params(&self, kind: EntityKind) -> &SpawnParams {
        match kind {
            EntityKind::BlueCoin => &self.blue_coin,
            EntityKind::GreenCoin => &self.green_coin,
            EntityKind::RedCoin => &self.red_coin,
            EntityKind::SpeedPowerUp => &self.speed_power_up,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn boost_duration(&self) -> Duration {
        Duration::from_millis(self.boost_duration_ms)
    }

    /// Player speed for the current boost state
    pub fn player_speed(&self, boosting: bool) -> f32 {
        if boosting {
            self.base_speed * self.boost_multiplier
        } else {
            self.base_speed
        }
    }

    /// Reject values the scheduler or the round cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.round_seconds == 0 {
            return Err(TuningError::Invalid("round_seconds must be positive".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(TuningError::Invalid("tick_interval_ms must be positive".into()));
        }
        if self.boost_duration_ms == 0 {
            return Err(TuningError::Invalid("boost_duration_ms must be positive".into()));
        }

        for kind in EntityKind::ALL {
            let params = self.params(kind);
            if params.interval_ms == Some(0) {
                return Err(TuningError::Invalid(format!(
                    "{kind:?} spawn interval must be positive"
                )));
            }
            if params.expires && params.lifetime_ms == 0 {
                return Err(TuningError::Invalid(format!(
                    "{kind:?} lifetime must be positive"
                )));
            }
            if params.count_increment > MAX_COUNT_INCREMENT {
                return Err(TuningError::Invalid(format!(
                    "{kind:?} count_increment must be at most {MAX_COUNT_INCREMENT}"
                )));
            }
            if params.width <= 0.0 || params.height <= 0.0 {
                return Err(TuningError::Invalid(format!("{kind:?} size must be positive")));
            }
        }

        Ok(())
    }
}
