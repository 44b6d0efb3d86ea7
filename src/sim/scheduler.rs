//! Virtual-clock timer queue
//!
//! Timers carry a task value instead of a closure. The owner pops due timers
//! one at a time and dispatches them itself, so a callback can cancel other
//! timers (including ones due at the same instant) before they are popped.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::error::SchedulerError;

/// Handle returned when a timer is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Whether a timer fires once or keeps firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    OneShot,
    Repeating { interval: Duration },
}

/// A timer popped from the queue
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub handle: TimerHandle,
    /// Virtual time the timer was due
    pub at: Duration,
    pub mode: TimerMode,
    pub task: T,
}

#[derive(Debug)]
struct Timer<T> {
    key: (Duration, u64),
    mode: TimerMode,
    task: T,
}

/// Single-threaded timer queue driven by an explicit clock.
///
/// Due timers pop in due-time order; timers due at the same instant pop in
/// the order they were queued.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    timers: HashMap<TimerHandle, Timer<T>>,
    queue: BTreeMap<(Duration, u64), TimerHandle>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            timers: HashMap::new(),
            queue: BTreeMap::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `task` once, `delay` from now
    pub fn after(&mut self, delay: Duration, task: T) -> Result<TimerHandle, SchedulerError> {
        if delay.is_zero() {
            return Err(SchedulerError::InvalidDelay);
        }
        Ok(self.insert(self.now + delay, TimerMode::OneShot, task))
    }

    /// Fire `task` every `interval` until cancelled. The first fire is one
    /// full interval from now.
    pub fn every(&mut self, interval: Duration, task: T) -> Result<TimerHandle, SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::InvalidDelay);
        }
        Ok(self.insert(self.now + interval, TimerMode::Repeating { interval }, task))
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.timers.remove(&handle) {
            Some(timer) => {
                self.queue.remove(&timer.key);
                true
            }
            None => false,
        }
    }

    /// Drop every pending timer
    pub fn cancel_all(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Time the next timer is due, if any
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Move the clock forward to `until` without firing anything. Never
    /// moves the clock backwards.
    pub fn set_now(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn insert(&mut self, due: Duration, mode: TimerMode, task: T) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let handle = TimerHandle(seq);
        let key = (due, seq);
        self.queue.insert(key, handle);
        self.timers.insert(handle, Timer { key, mode, task });
        handle
    }
}

impl<T: Clone> Scheduler<T> {
    /// Pop the earliest timer due at or before `until`, advancing the clock
    /// to its due time. Repeating timers are re-queued before they are
    /// returned, so cancelling the handle during dispatch stops them.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<T>> {
        let (&key, &handle) = self.queue.iter().next()?;
        let (due, _) = key;
        if due > until {
            return None;
        }
        self.queue.remove(&key);
        self.now = self.now.max(due);

        let timer = self.timers.get_mut(&handle)?;
        let mode = timer.mode;
        let task = timer.task.clone();

        match mode {
            TimerMode::OneShot => {
                self.timers.remove(&handle);
            }
            TimerMode::Repeating { interval } => {
                let seq = self.next_seq;
                self.next_seq += 1;
                let next = (due + interval, seq);
                timer.key = next;
                self.queue.insert(next, handle);
            }
        }

        Some(Fired {
            handle,
            at: due,
            mode,
            task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drain(s: &mut Scheduler<&'static str>, until: Duration) -> Vec<(&'static str, u64)> {
        let mut out = Vec::new();
        while let Some(fired) = s.pop_due(until) {
            out.push((fired.task, fired.at.as_millis() as u64));
        }
        s.set_now(until);
        out
    }

    #[test]
    fn test_zero_delay_rejected() {
        let mut s: Scheduler<()> = Scheduler::new();
        assert_eq!(s.after(Duration::ZERO, ()), Err(SchedulerError::InvalidDelay));
        assert_eq!(s.every(Duration::ZERO, ()), Err(SchedulerError::InvalidDelay));
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut s = Scheduler::new();
        let h = s.after(ms(500), "once").unwrap();
        assert!(drain(&mut s, ms(499)).is_empty());
        assert_eq!(drain(&mut s, ms(500)), vec![("once", 500)]);
        assert!(!s.is_pending(h));
        assert!(drain(&mut s, ms(5000)).is_empty());
    }

    #[test]
    fn test_repeating_and_fifo_order() {
        let mut s = Scheduler::new();
        s.every(ms(1000), "tick").unwrap();
        s.after(ms(2000), "later").unwrap();
        s.after(ms(1000), "same-time").unwrap();

        let fired = drain(&mut s, ms(3000));
        assert_eq!(
            fired,
            vec![
                ("tick", 1000),
                ("same-time", 1000),
                // "later" was queued before the tick re-armed itself
                ("later", 2000),
                ("tick", 2000),
                ("tick", 3000),
            ]
        );
        assert_eq!(s.now(), ms(3000));
    }

    #[test]
    fn test_cancel_during_dispatch_stops_queued_fire() {
        let mut s = Scheduler::new();
        let first = s.after(ms(100), "first").unwrap();
        let repeating = s.every(ms(100), "spawn").unwrap();

        let fired = s.pop_due(ms(1000)).unwrap();
        assert_eq!(fired.handle, first);
        // Cancel the repeating timer that is due at the same instant
        assert!(s.cancel(repeating));
        assert!(s.pop_due(ms(1000)).is_none());
        assert!(!s.cancel(repeating));
    }

    #[test]
    fn test_cancel_all() {
        let mut s = Scheduler::new();
        s.every(ms(10), "a").unwrap();
        s.after(ms(10), "b").unwrap();
        s.cancel_all();
        assert_eq!(s.pending(), 0);
        assert!(drain(&mut s, ms(1000)).is_empty());
    }

    #[test]
    fn test_clock_never_rewinds() {
        let mut s: Scheduler<()> = Scheduler::new();
        s.set_now(ms(50));
        s.set_now(ms(10));
        assert_eq!(s.now(), ms(50));
        s.after(ms(5), ()).unwrap();
        assert_eq!(s.next_due(), Some(ms(55)));
    }
}
