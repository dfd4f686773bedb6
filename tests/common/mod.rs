#![allow(dead_code)]
//! Shared integration test utilities.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    thread,
    time::Duration,
};

use slotrun::{Task, TaskId};

/// Instruments task bodies: how many run at once, the peak of that, and how often each ran.
#[derive(Default)]
pub struct Probe {
    current: AtomicUsize,
    peak: AtomicUsize,
    runs: Mutex<BTreeMap<u64, usize>>,
}

impl Probe {
    /// Records one execution of task `id`, keeping it "running" for `hold`.
    pub fn run(&self, id: u64, hold: Duration) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        *self.runs.lock().unwrap().entry(id).or_default() += 1;
        if !hold.is_zero() {
            thread::sleep(hold);
        }
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Execution count per task ID.
    pub fn runs(&self) -> BTreeMap<u64, usize> {
        self.runs.lock().unwrap().clone()
    }
}

/// A task that is observed by `probe` and fails iff `fails(id)`.
pub fn probed<'a>(
    probe: &'a Probe,
    id: u64,
    hold: Duration,
    fails: impl Fn(u64) -> bool + Send + 'a,
) -> Task<'a> {
    Task::new(id, move || {
        probe.run(id, hold);
        if fails(id) {
            return Err(format!("error processing item: {id}"));
        }
        Ok(())
    })
}

/// Sorted IDs of the failed tasks.
pub fn failed_ids(result: &slotrun::BatchResult) -> Vec<u64> {
    let mut ids: Vec<u64> = result.failed().map(|TaskId(id)| id).collect();
    ids.sort_unstable();
    ids
}
