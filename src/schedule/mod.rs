//! Cooperative timer scheduling.
//!
//! The session needs two timers: a periodic clock tick and a one-shot delay
//! before a mismatched pair flips back. Neither blocks the caller. The host
//! owns the actual clock through the [`Scheduler`] trait and hands due tasks
//! back to `SessionController::on_timer`.
//!
//! Every task carries the epoch of the session that armed it. A restart
//! bumps the epoch, so a callback that slips through after cancellation is
//! recognised as stale and dropped.
//!
//! [`ManualScheduler`] is a virtual-clock implementation for tests,
//! simulations and hosts that drive time from their own frame loop.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Handle returned by [`Scheduler::after`], used to cancel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

/// What a timer does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Periodic elapsed-time tick.
    ClockTick,
    /// End of the mismatch display delay.
    HideMismatch,
}

/// A scheduled callback: the kind plus the session epoch that armed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerTask {
    pub kind: TimerKind,
    pub epoch: u64,
}

impl TimerTask {
    #[must_use]
    pub const fn new(kind: TimerKind, epoch: u64) -> Self {
        Self { kind, epoch }
    }
}

/// Scheduling primitive consumed by the session controller.
///
/// Implementations deliver each non-cancelled task once, after at least
/// `delay_ms`, by calling `SessionController::on_timer(token, task)`.
pub trait Scheduler {
    /// Arm a one-shot timer.
    fn after(&mut self, delay_ms: u64, task: TimerTask) -> TimerToken;

    /// Cancel a pending timer. Returns false if it already fired or was
    /// never armed.
    fn cancel(&mut self, token: TimerToken) -> bool;
}

/// Virtual-clock scheduler.
///
/// Time only moves when the owner calls [`ManualScheduler::pop_due`] or
/// [`ManualScheduler::set_now`]. Timers due at the same instant fire in the
/// order they were armed.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_token: u64,
    /// (due time, token) -> task
    pending: BTreeMap<(u64, TimerToken), TimerTask>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether a token is still armed.
    #[must_use]
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.keys().any(|(_, t)| *t == token)
    }

    /// Due time of the earliest armed timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Remove and return the earliest timer due at or before `until_ms`,
    /// moving the clock to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerToken, TimerTask)> {
        let (&(due, token), _) = self.pending.iter().next()?;
        if due > until_ms {
            return None;
        }
        let task = self.pending.remove(&(due, token))?;
        self.now_ms = self.now_ms.max(due);
        Some((token, task))
    }

    /// Move the clock forward without firing anything. Never moves back.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Advance the clock and collect everything that came due.
    ///
    /// Timers armed while handling the returned tasks are not included;
    /// `SessionController::advance` interleaves firing and re-arming.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<(TimerToken, TimerTask)> {
        let target = self.now_ms.saturating_add(elapsed_ms);
        let mut fired = Vec::new();
        while let Some(entry) = self.pop_due(target) {
            fired.push(entry);
        }
        self.set_now(target);
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn after(&mut self, delay_ms: u64, task: TimerTask) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending.insert((self.now_ms.saturating_add(delay_ms), token), task);
        token
    }

    fn cancel(&mut self, token: TimerToken) -> bool {
        let key = self.pending.keys().find(|(_, t)| *t == token).copied();
        match key {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(epoch: u64) -> TimerTask {
        TimerTask::new(TimerKind::ClockTick, epoch)
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut s = ManualScheduler::new();
        let late = s.after(300, tick(0));
        let early = s.after(100, TimerTask::new(TimerKind::HideMismatch, 0));

        let fired = s.advance(1000);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].0, early);
        assert_eq!(fired[1].0, late);
        assert_eq!(s.now(), 1000);
    }

    #[test]
    fn test_same_deadline_fires_in_arm_order() {
        let mut s = ManualScheduler::new();
        let a = s.after(100, tick(0));
        let b = s.after(100, tick(0));
        let fired: Vec<_> = s.advance(100).into_iter().map(|(t, _)| t).collect();
        assert_eq!(fired, vec![a, b]);
    }

    #[test]
    fn test_not_due_yet() {
        let mut s = ManualScheduler::new();
        s.after(1000, tick(0));
        assert!(s.advance(999).is_empty());
        assert_eq!(s.advance(1).len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut s = ManualScheduler::new();
        let token = s.after(100, tick(3));
        assert!(s.is_pending(token));
        assert!(s.cancel(token));
        assert!(!s.is_pending(token));
        assert!(!s.cancel(token));
        assert!(s.advance(1000).is_empty());
    }

    #[test]
    fn test_pop_due_moves_clock() {
        let mut s = ManualScheduler::new();
        s.after(250, tick(0));
        let (_, task) = s.pop_due(1000).unwrap();
        assert_eq!(task, tick(0));
        assert_eq!(s.now(), 250);
        assert_eq!(s.next_deadline(), None);

        // Armed relative to the new time
        s.after(250, tick(0));
        assert_eq!(s.next_deadline(), Some(500));
    }

    #[test]
    fn test_clock_never_moves_back() {
        let mut s = ManualScheduler::new();
        s.set_now(500);
        s.set_now(100);
        assert_eq!(s.now(), 500);
    }
}
