//! Cooperative cancellation (`spec.md` §5).
//!
//! Pattern matching, the forward/backward chainers, and attention cycles all
//! check a [`CancellationToken`] between clauses / steps / cycles — never
//! mid-primitive, mirroring the teacher's depth-budget check in its
//! evaluator (`depth > opts.max_depth`, checked once per recursive call, not
//! inside a primitive).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheap, cloneable handle that a caller can use to request cancellation
/// of a long-running operation. Checking is the callee's responsibility at
/// well-defined points; it is never polled inside a tight inner loop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
