//! Deferred work driven by the host clock.
//!
//! The picker never sleeps. The host reports elapsed time through
//! `SelectPicker::advance`, and whatever came due runs in deadline order.

use std::time::Duration;

/// Delay before a rejected selection's rendered element reverts.
pub const REVERT_DELAY: Duration = Duration::from_millis(10);
/// How long a limit notice stays visible.
pub const NOTICE_DURATION: Duration = Duration::from_millis(1000);
/// Idle time after which the type-ahead buffer is cleared.
pub const TYPE_AHEAD_RESET: Duration = Duration::from_millis(800);

/// A unit of deferred work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Re-sync the rendered element of a row with its descriptor
    RevertElement { data_index: usize },
    HideNotice,
    ClearTypeAhead,
}

#[derive(Debug, Clone)]
struct Pending {
    due: Duration,
    seq: u64,
    task: Deferred,
}

/// Deadline-ordered queue of deferred work.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now: Duration,
    seq: u64,
    pending: Vec<Pending>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the queue was created.
    pub const fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run `task` after `delay`.
    pub fn schedule(&mut self, delay: Duration, task: Deferred) {
        self.seq += 1;
        self.pending.push(Pending {
            due: self.now + delay,
            seq: self.seq,
            task,
        });
    }

    /// Schedule `task`, replacing any pending identical task.
    pub fn reschedule(&mut self, delay: Duration, task: Deferred) {
        self.cancel(&task);
        self.schedule(delay, task);
    }

    /// Drop every pending occurrence of `task`.
    pub fn cancel(&mut self, task: &Deferred) {
        self.pending.retain(|p| &p.task != task);
    }

    pub fn is_scheduled(&self, task: &Deferred) -> bool {
        self.pending.iter().any(|p| &p.task == task)
    }

    /// Move the clock forward and return the tasks that came due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Deferred> {
        self.now += elapsed;
        let now = self.now;
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = rest;
        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_due_before_deadline() {
        let mut q = TimerQueue::new();
        q.schedule(NOTICE_DURATION, Deferred::HideNotice);
        assert!(q.advance(Duration::from_millis(999)).is_empty());
        assert_eq!(q.advance(Duration::from_millis(1)), vec![Deferred::HideNotice]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_due_tasks_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(NOTICE_DURATION, Deferred::HideNotice);
        q.schedule(
            REVERT_DELAY,
            Deferred::RevertElement { data_index: 3 },
        );
        let due = q.advance(Duration::from_secs(2));
        assert_eq!(
            due,
            vec![
                Deferred::RevertElement { data_index: 3 },
                Deferred::HideNotice
            ]
        );
    }

    #[test]
    fn test_reschedule_replaces() {
        let mut q = TimerQueue::new();
        q.schedule(TYPE_AHEAD_RESET, Deferred::ClearTypeAhead);
        q.advance(Duration::from_millis(500));
        q.reschedule(TYPE_AHEAD_RESET, Deferred::ClearTypeAhead);
        assert_eq!(q.len(), 1);
        assert!(q.advance(Duration::from_millis(500)).is_empty());
        assert!(q.is_scheduled(&Deferred::ClearTypeAhead));
        assert_eq!(q.advance(Duration::from_millis(300)), vec![Deferred::ClearTypeAhead]);
    }

    #[test]
    fn test_cancel() {
        let mut q = TimerQueue::new();
        q.schedule(REVERT_DELAY, Deferred::HideNotice);
        q.cancel(&Deferred::HideNotice);
        assert!(q.advance(Duration::from_secs(1)).is_empty());
        assert_eq!(q.now(), Duration::from_secs(1));
    }
}
