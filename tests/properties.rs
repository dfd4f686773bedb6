//! Property-based tests for batch accounting and the concurrency ceiling.
//!
//! # Accounting
//! - Every submitted task is run exactly once
//! - Successes plus failures equal the batch size
//! - Each failing task is reported exactly once, under its own ID
//!
//! # Ceiling
//! - Never more than `limit` bodies run at once
//!
//! # Configuration
//! - Limits below 1 are rejected before anything runs

mod common;

use std::time::Duration;

use common::*;
use proptest::prelude::*;
use slotrun::{run_batch, Error, Runner, Task};

fn arb_batch() -> impl Strategy<Value = (Vec<bool>, i64)> {
    (prop::collection::vec(any::<bool>(), 0..40), 1i64..=8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every task runs once and ends up either succeeded or failed, never both.
    #[test]
    fn every_task_accounted_for((fails, limit) in arb_batch()) {
        let probe = Probe::default();
        let tasks = fails.iter().enumerate().map(|(i, &fail)| {
            probed(&probe, i as u64, Duration::from_micros(100), move |_| fail)
        });
        let result = run_batch(tasks, limit).unwrap();

        let expected_failures: Vec<u64> = fails
            .iter()
            .enumerate()
            .filter(|&(_, &fail)| fail)
            .map(|(i, _)| i as u64)
            .collect();

        prop_assert_eq!(result.submitted(), fails.len());
        prop_assert_eq!(result.succeeded() + result.failures().len(), fails.len());
        prop_assert_eq!(failed_ids(&result), expected_failures);
        prop_assert_eq!(probe.runs().len(), fails.len());
        prop_assert!(probe.runs().values().all(|&n| n == 1));
        prop_assert!((probe.peak() as i64) <= limit);
    }

    /// The same runner gives the same accounting for repeated batches.
    #[test]
    fn reused_runner_is_stateless(n in 0usize..20, limit in 1i64..=4) {
        let runner = Runner::new(limit).unwrap();
        for _ in 0..2 {
            let tasks = (0..n as u64).map(|id| {
                Task::new(id, move || if id % 3 == 0 { Err("divisible by three") } else { Ok(()) })
            });
            let result = runner.run(tasks);
            prop_assert_eq!(result.submitted(), n);
            prop_assert_eq!(result.failures().len(), n.div_ceil(3));
        }
    }

    /// Non-positive limits fail without running a task.
    #[test]
    fn non_positive_limits_rejected(limit in i64::MIN..=0, n in 0u64..5) {
        let probe = Probe::default();
        let tasks = (0..n).map(|id| probed(&probe, id, Duration::ZERO, |_| false));
        let rejected = matches!(
            run_batch(tasks, limit),
            Err(Error::InvalidConfiguration { limit: got }) if got == limit
        );
        prop_assert!(rejected);
        prop_assert!(probe.runs().is_empty());
    }
}
