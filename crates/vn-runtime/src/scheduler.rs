//! A deterministic, cancellable task scheduler.
//!
//! Playback pacing is a chain of delayed steps (reveal, gap, post-choice
//! pause). Instead of wall-clock timers, tasks sit on a caller-driven
//! millisecond timeline: the frontend reports elapsed time and due tasks
//! pop in order. Switching chapter or story mid-reveal cancels the pending
//! chain outright, so a superseded timeline can never mutate fresh state.
//! Everything is single-threaded; between calls the scheduler is inert.

/// Identifier for a scheduled task, usable to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Pending<T> {
    id: u64,
    due_ms: u64,
    task: T,
}

/// Caller-driven millisecond timeline holding delayed tasks.
#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at time zero.
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// The current position on the timeline, in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `task` to become due `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due_ms: self.now_ms + delay_ms,
            task,
        });
        TaskId(id)
    }

    /// Cancel a single pending task. Returns `false` if it was not
    /// pending (already popped or cancelled).
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id.0);
        self.pending.len() != before
    }

    /// Cancel every pending task. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Whether nothing is pending.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// The absolute due time of the earliest pending task.
    pub fn next_due_at(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }

    /// Milliseconds until the earliest pending task is due (zero if it is
    /// already due).
    pub fn due_in(&self) -> Option<u64> {
        self.next_due_at()
            .map(|due| due.saturating_sub(self.now_ms))
    }

    /// Move the timeline forward to `at_ms` (never backwards) and pop
    /// every task that became due, ordered by due time then scheduling
    /// order.
    pub fn advance_to(&mut self, at_ms: u64) -> Vec<T> {
        self.now_ms = self.now_ms.max(at_ms);

        let mut due = Vec::new();
        let mut keep = Vec::new();
        for pending in self.pending.drain(..) {
            if pending.due_ms <= self.now_ms {
                due.push(pending);
            } else {
                keep.push(pending);
            }
        }
        self.pending = keep;

        due.sort_by_key(|p| (p.due_ms, p.id));
        due.into_iter().map(|p| p.task).collect()
    }
}
