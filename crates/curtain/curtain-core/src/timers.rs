//! Deadline queue for fallback and settle timers.
//!
//! The core never sleeps. It records deadlines, asks the adapter to call back
//! via [`Effect::ScheduleTimer`], and fires whatever is due on the next tick.
//! Timers are never cancelled; handlers check state and become no-ops.

use crate::ids::{IdAllocator, TimerId};
use crate::outputs::{Effect, Outputs};

#[derive(Clone, Debug)]
struct Pending<K> {
    id: TimerId,
    at_ms: f64,
    kind: K,
}

#[derive(Debug)]
pub struct TimerQueue<K> {
    ids: IdAllocator,
    pending: Vec<Pending<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            ids: IdAllocator::new(),
            pending: Vec::new(),
        }
    }
}

impl<K: Copy> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a deadline and emit the scheduling effect.
    pub fn schedule(&mut self, at_ms: f64, kind: K, out: &mut Outputs) -> TimerId {
        let id = self.ids.alloc_timer();
        self.pending.push(Pending { id, at_ms, kind });
        out.push(Effect::ScheduleTimer { id, at_ms });
        id
    }

    /// Remove and return every timer due at `now_ms`, earliest first.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<(TimerId, K)> {
        let mut due: Vec<Pending<K>> = Vec::new();
        self.pending.retain(|p| {
            if p.at_ms <= now_ms {
                due.push(p.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|p| (p.id, p.kind)).collect()
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.pending.iter().map(|p| p.at_ms).min_by(f64::total_cmp)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
