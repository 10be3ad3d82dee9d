//! Identifiers and simple allocators for elements and timers.

use serde::{Deserialize, Serialize};

/// Opaque handle for one element of the host document.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Handle for a scheduled fallback or settle timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u32);

/// Monotonic allocator for TimerId.
/// ElementIds come from the host snapshot, so only timers are allocated here.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_timer: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_timer(&mut self) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer = self.next_timer.wrapping_add(1);
        id
    }
}
