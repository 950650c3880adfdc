use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Expiry,
}

impl SubmitTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmitTrigger::Manual => "manual",
            SubmitTrigger::Expiry => "expiry",
        }
    }
}

/// One-shot submission latch. The first claimant (manual submit or timer
/// expiry) wins; every later claim is a no-op. Claiming is a compare-and-set,
/// so the mutual exclusion holds under concurrent claims and is testable
/// without wall-clock timing.
#[derive(Debug, Default)]
pub struct SubmitLatch {
    claimed: AtomicBool,
    trigger: OnceLock<SubmitTrigger>,
}

impl SubmitLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to claim the latch. Returns true exactly once.
    pub fn claim(&self, trigger: SubmitTrigger) -> bool {
        if self.claimed.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            let _ = self.trigger.set(trigger);
            true
        } else {
            false
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    pub fn trigger(&self) -> Option<SubmitTrigger> {
        self.trigger.get().copied()
    }
}
