/// Deterministic timer service driven by host time.
///
/// Key properties:
/// - Total ordering on `(due, id)`: equal deadlines fire in scheduling order.
/// - Cancellation removes the entry immediately, so superseded timers do not
///   accumulate.
/// - Nothing fires on its own; the owner pops due timers with the current
///   host time.
use foundation::time::Millis;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Key {
    due: Millis,
    id: TimerId,
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.due.cmp(&other.due).then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
struct Entry<T> {
    key: Key,
    payload: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule(&mut self, due: Millis, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            key: Key { due, id },
            payload,
        });
        id
    }

    pub fn schedule_after(&mut self, now: Millis, delay_ms: u64, payload: T) -> TimerId {
        self.schedule(now.saturating_add(delay_ms), payload)
    }

    /// Removes a pending timer. Returns `false` if it already fired or was
    /// never scheduled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        if let Some(idx) = self.entries.iter().position(|e| e.key.id == id) {
            self.entries.swap_remove(idx);
            return true;
        }
        false
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.key.id == id)
    }

    fn earliest_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            match best {
                None => best = Some(idx),
                Some(b) => {
                    if entry.key < self.entries[b].key {
                        best = Some(idx);
                    }
                }
            }
        }
        best
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.earliest_index().map(|idx| self.entries[idx].key.due)
    }

    /// Pops the earliest timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(TimerId, T)> {
        let idx = self.earliest_index()?;
        if self.entries[idx].key.due > now {
            return None;
        }
        let entry = self.entries.swap_remove(idx);
        Some((entry.key.id, entry.payload))
    }
}
