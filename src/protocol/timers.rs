/// Handle of a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Scheduled<A> {
    id: TimerId,
    deadline_ms: u64,
    action: A,
}

/// Virtual millisecond clock with one-shot timers.
///
/// Timers fire in deadline order; equal deadlines fire in scheduling order.
#[derive(Debug)]
pub struct TimerQueue<A> {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Scheduled<A>>,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<A> TimerQueue<A> {
    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `action` to fire `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            deadline_ms: self.now_ms.saturating_add(delay_ms),
            action,
        });
        id
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Return `true` when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.iter().map(|s| s.deadline_ms).min()
    }

    /// Remove and return the earliest timer due at or before `until_ms`, moving the clock to its
    /// deadline.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, A)> {
        let (pos, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.deadline_ms <= until_ms)
            .min_by_key(|(_, s)| (s.deadline_ms, s.id))?;
        let s = self.pending.swap_remove(pos);
        self.now_ms = self.now_ms.max(s.deadline_ms);
        Some((s.id, s.action))
    }

    /// Move the clock forward to `until_ms` without firing anything.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
