use std::fmt;

use crate::{error::BoxError, Failure};

/// Caller-assigned identifier of a [`Task`].
///
/// The runner never interprets it; it is only echoed back in [`Failure`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

pub(crate) type Body<'a> = Box<dyn FnOnce() -> Result<(), BoxError> + Send + 'a>;

/// A unit of work: an identifier and a body that is run exactly once.
///
/// The body may borrow from the surrounding scope, since the [`Runner`][crate::Runner] does not
/// return before every task it admitted has finished.
pub struct Task<'a> {
    id: TaskId,
    body: Body<'a>,
}

impl<'a> Task<'a> {
    /// Creates a task from an identifier and a fallible body.
    ///
    /// Any error type convertible into a boxed [`std::error::Error`] works, including `String`
    /// and `&'static str`.
    pub fn new<F, E>(id: u64, body: F) -> Self
    where
        F: FnOnce() -> Result<(), E> + Send + 'a,
        E: Into<BoxError>,
    {
        Self {
            id: TaskId(id),
            body: Box::new(move || body().map_err(Into::into)),
        }
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn into_parts(self) -> (TaskId, Body<'a>) {
        (self.id, self.body)
    }
}

impl fmt::Debug for Task<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// What happened to one admitted task.
#[derive(Debug)]
pub enum Outcome {
    Success(TaskId),
    Failure(Failure),
}

impl Outcome {
    pub fn task(&self) -> TaskId {
        match self {
            Outcome::Success(id) => *id,
            Outcome::Failure(failure) => failure.task,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}
