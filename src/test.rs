//! Internal unit test utilities.

use std::{
    panic::resume_unwind,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Unwinds with `payload` without running the panic hook, keeping test output clean.
pub fn silent_panic(payload: String) {
    resume_unwind(Box::new(payload));
}

/// Counts how many task bodies are running at once, and remembers the peak.
#[derive(Default)]
pub struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    /// Marks a body as running until the returned guard is dropped.
    pub fn enter(&self) -> GaugeGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        GaugeGuard { gauge: self }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }
}

pub struct GaugeGuard<'a> {
    gauge: &'a Gauge,
}

impl Drop for GaugeGuard<'_> {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}
