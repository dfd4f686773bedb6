//! Bounded-concurrency batch execution on owned threads.
//!
//! (if you want to process a large iterator of homogeneous items in parallel, [`rayon`] is likely
//! the better fit; this crate is about running a fixed batch of independent, possibly blocking
//! jobs while capping how many of them run at once, and learning which of them failed)
//!
//! # Overview
//!
//! A batch is a list of [`Task`]s, each made of a caller-assigned [`TaskId`] and a fallible body.
//! A [`Runner`] admits the tasks one by one: every admitted task holds one of a fixed number of
//! admission slots while its body runs, and new admissions block while all slots are taken. The
//! bodies run on a set of worker threads, one per slot, that is spawned for the batch and reused
//! for every task in it.
//!
//! The batch call enforces *structured concurrency*: it does not return until every admitted task
//! has finished and every worker thread has been joined, so no background work outlives it. This also allows task
//! bodies to borrow from the caller's stack.
//!
//! Failures are data, not errors. A body that returns `Err` or panics produces a [`Failure`]
//! tagged with its [`TaskId`], and never affects its siblings. The only error a batch call can
//! return is [`Error::InvalidConfiguration`], raised before any task runs.
//!
//! # Usage
//!
//! ```
//! use slotrun::{run_batch, Task, TaskId};
//!
//! let tasks = (1..=10).map(|item| {
//!     Task::new(item, move || {
//!         if item % 5 == 0 {
//!             return Err(format!("error processing item: {item}"));
//!         }
//!         Ok(())
//!     })
//! });
//!
//! let result = run_batch(tasks, 3).unwrap();
//! assert_eq!(result.succeeded(), 8);
//!
//! let mut failed: Vec<TaskId> = result.failed().collect();
//! failed.sort();
//! assert_eq!(failed, [TaskId(5), TaskId(10)]);
//! ```
//!
//! A configured [`Runner`] can be reused, and a batch can be cancelled cooperatively:
//!
//! ```
//! use slotrun::{CancelToken, Runner, Task};
//!
//! let runner = Runner::builder().name("fetch").limit(4).build().unwrap();
//! let cancel = CancelToken::new();
//! cancel.cancel();
//!
//! let tasks = (0..8).map(|id| Task::new(id, || Ok::<_, String>(())));
//! let result = runner.run_with_cancel(tasks, &cancel);
//! assert_eq!(result.skipped().len(), 8);
//! ```
//!
//! # Limitations
//!
//! Neither waiting for a slot nor waiting for the batch has a timeout. A task body that never
//! returns hangs the whole batch; bodies that may block indefinitely need their own cancellation,
//! for example by polling a [`CancelToken`].
//!
//! [`rayon`]: https://crates.io/crates/rayon

mod cancel;
mod error;
mod runner;
mod slot;
mod sync;
mod task;
#[cfg(test)]
mod test;

pub use cancel::CancelToken;
pub use error::{BoxError, Cause, Error, Failure};
pub use runner::{run_batch, BatchResult, Runner, RunnerBuilder};
pub use slot::{SlotGuard, Slots};
pub use task::{Outcome, Task, TaskId};
