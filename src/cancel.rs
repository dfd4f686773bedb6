use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cooperative cancellation signal for a batch.
///
/// Cloning a [`CancelToken`] yields another handle to the same signal. Calling
/// [`CancelToken::cancel`] on any handle stops the [`Runner`][crate::Runner] from admitting further
/// tasks; tasks that are already running are never interrupted; they may poll
/// [`CancelToken::is_cancelled`] themselves and return early.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
