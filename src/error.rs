//! Error types for the round simulation and its configuration.
//!
//! Timing races (late expiries, duplicate overlaps, callbacks after the round
//! ended) are not errors: they are absorbed by guards in the simulation.

/// Errors raised when registering a timer.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("timer delay must be positive")]
    InvalidDelay,
}

/// Errors raised while loading or checking a [`Tuning`](crate::Tuning).
#[derive(thiserror::Error, Debug)]
pub enum TuningError {
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Errors raised while starting or driving a round
#[derive(thiserror::Error, Debug)]
pub enum RoundError {
    #[error(transparent)]
    Tuning(#[from] TuningError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}
