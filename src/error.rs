use std::{any::Any, error::Error as StdError, io};

use thiserror::Error;

use crate::TaskId;

/// An error returned by a task body.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors that abort a batch call before any task runs.
///
/// Failing tasks never produce an [`Error`]; they are reported as [`Failure`]s in the
/// [`BatchResult`][crate::BatchResult].
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: concurrency limit must be at least 1, got {limit}")]
    InvalidConfiguration { limit: i64 },
}

/// Why a task failed.
#[derive(Debug, Error)]
pub enum Cause {
    /// The task body returned an error.
    #[error("{0}")]
    Error(#[source] BoxError),
    /// The task body panicked. Holds the panic message, if it had one.
    #[error("task panicked: {0}")]
    Panic(String),
    /// No worker thread could be spawned for the batch, so the body was dropped without running.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
}

impl Cause {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let msg = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(s) => s.to_string(),
                Err(_) => "<non-string panic payload>".to_string(),
            },
        };
        Cause::Panic(msg)
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Cause::Panic(_))
    }
}

/// A failed task, tagged with the identifier it was submitted with.
#[derive(Debug, Error)]
#[error("task {task} failed: {cause}")]
pub struct Failure {
    pub task: TaskId,
    #[source]
    pub cause: Cause,
}
