//! Cooperative cancellation for registry suspension points.
//!
//! The validator has no timeouts of its own; the caller passes a token and
//! the validator checks it at every point where it is about to consult a
//! registry, the only suspension points it has. `CancellationToken` is a
//! plain shared flag rather than an async primitive, matching the teacher's
//! synchronous engine (no async runtime is part of its dependency stack, and
//! introducing one here would mean swapping the stack rather than extending
//! it).

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Signals that validation was stopped early because its `CancellationToken`
/// was cancelled. Distinct from [`crate::errors::ValidationError`]: it is not
/// part of the closed `ReasonCode` ABI because it is not a judgement
/// about the blueprint at all, just an aborted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation was cancelled before completing")
    }
}

impl std::error::Error for Cancelled {}

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
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Checked immediately before any registry call. Returns `Err(Cancelled)`
    /// the caller should propagate verbatim, stopping at the next
    /// suspension point rather than finishing the run.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancel_is_observed_by_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(token.check().is_err());
    }
}
