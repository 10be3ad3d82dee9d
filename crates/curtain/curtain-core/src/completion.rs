//! Counting latch over per-element "transition finished" signals.

use serde::{Deserialize, Serialize};

/// Result of feeding one signal into a [`CompletionTracker`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// Signal did not qualify, or the latch already fired.
    Ignored,
    /// Counted; still waiting for more.
    Pending { remaining: u32 },
    /// This signal completed the count. Reported exactly once.
    Fired,
}

/// Fires once after `expected` qualifying signals, or once when forced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTracker {
    expected: u32,
    remaining: u32,
    done: bool,
}

impl CompletionTracker {
    pub fn new(expected: u32) -> Self {
        Self {
            expected,
            remaining: expected,
            done: false,
        }
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn signal(&mut self, qualifies: bool) -> Completion {
        if !qualifies || self.done {
            return Completion::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.done = true;
            Completion::Fired
        } else {
            Completion::Pending {
                remaining: self.remaining,
            }
        }
    }

    /// Same as [`signal`](Self::signal) but runs `on_complete` when it fires.
    pub fn signal_with(&mut self, qualifies: bool, on_complete: impl FnOnce()) -> Completion {
        let result = self.signal(qualifies);
        if result == Completion::Fired {
            on_complete();
        }
        result
    }

    /// Fallback path: complete now unless already done.
    pub fn force(&mut self) -> Completion {
        if self.done {
            return Completion::Ignored;
        }
        self.done = true;
        self.remaining = 0;
        Completion::Fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_qualifying_signals_fire_once() {
        let mut fired = 0;
        let mut t = CompletionTracker::new(2);
        assert_eq!(
            t.signal_with(true, || fired += 1),
            Completion::Pending { remaining: 1 }
        );
        assert_eq!(t.signal_with(true, || fired += 1), Completion::Fired);
        assert_eq!(t.signal_with(true, || fired += 1), Completion::Ignored);
        assert_eq!(t.force(), Completion::Ignored);
        assert_eq!(fired, 1);
    }

    #[test]
    fn one_signal_then_timeout_fires_once() {
        let mut t = CompletionTracker::new(2);
        assert_eq!(t.signal(true), Completion::Pending { remaining: 1 });
        assert_eq!(t.force(), Completion::Fired);
        assert_eq!(t.signal(true), Completion::Ignored);
        assert_eq!(t.remaining(), 0);
    }

    #[test]
    fn non_qualifying_signals_are_ignored() {
        let mut t = CompletionTracker::new(2);
        assert_eq!(t.signal(false), Completion::Ignored);
        assert_eq!(t.remaining(), 2);
        assert!(!t.is_done());
    }

    #[test]
    fn zero_expected_fires_on_first_qualifying_signal_without_underflow() {
        let mut t = CompletionTracker::new(0);
        assert_eq!(t.signal(true), Completion::Fired);
        assert_eq!(t.remaining(), 0);
    }
}
