use std::{
    io,
    num::NonZeroUsize,
    panic::{self, resume_unwind, AssertUnwindSafe},
    thread,
};

use crate::{
    slot::{SlotGuard, Slots},
    task::{Body, Outcome, Task, TaskId},
    CancelToken, Cause, Error, Failure,
};

/// A builder object that can be used to configure a [`Runner`].
#[derive(Clone)]
pub struct RunnerBuilder {
    name: Option<String>,
    limit: i64,
    stack_size: Option<usize>,
}

impl RunnerBuilder {
    /// Sets the name of the [`Runner`].
    ///
    /// The name shows up in log messages, and worker threads are named after it and their index,
    /// as in `name-0`, `name-1`, ...
    pub fn name<N: Into<String>>(self, name: N) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Sets the maximum number of task bodies that may run at the same time.
    ///
    /// Defaults to 1. Values below 1 make [`RunnerBuilder::build`] fail.
    #[inline]
    pub fn limit(self, limit: i64) -> Self {
        Self { limit, ..self }
    }

    /// Sets the stack size of the spawned worker threads.
    #[inline]
    pub fn stack_size(self, stack_size: usize) -> Self {
        Self {
            stack_size: Some(stack_size),
            ..self
        }
    }

    /// Validates the configuration and creates the [`Runner`].
    pub fn build(self) -> Result<Runner, Error> {
        let limit = usize::try_from(self.limit)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(Error::InvalidConfiguration { limit: self.limit })?;
        Ok(Runner {
            name: self.name,
            limit,
            stack_size: self.stack_size,
        })
    }
}

/// Runs batches of [`Task`]s with a bound on how many of them execute at once.
///
/// A batch is run by up to `limit` worker threads that are owned by the batch call: [`Runner::run`]
/// does not return before every admitted task has finished and every worker has been joined. A
/// task that fails or panics only produces a [`Failure`] in the [`BatchResult`]; its siblings keep
/// running.
///
/// A [`Runner`] holds no state between batches and can be reused.
#[derive(Debug, Clone)]
pub struct Runner {
    name: Option<String>,
    limit: NonZeroUsize,
    stack_size: Option<usize>,
}

impl Runner {
    /// Returns a builder that can be used to configure a [`Runner`].
    #[inline]
    pub fn builder() -> RunnerBuilder {
        RunnerBuilder {
            name: None,
            limit: 1,
            stack_size: None,
        }
    }

    /// Creates an unnamed [`Runner`] that runs at most `limit` tasks at once.
    pub fn new(limit: i64) -> Result<Self, Error> {
        Self::builder().limit(limit).build()
    }

    #[inline]
    pub fn limit(&self) -> NonZeroUsize {
        self.limit
    }

    /// Runs every task in `tasks` and blocks until all of them have finished.
    pub fn run<'a, I>(&self, tasks: I) -> BatchResult
    where
        I: IntoIterator<Item = Task<'a>>,
    {
        self.run_inner(tasks.into_iter().collect(), None)
    }

    /// Like [`Runner::run`], but stops admitting tasks once `cancel` is raised.
    ///
    /// Tasks that were never admitted are reported in [`BatchResult::skipped`]. Tasks that are
    /// already running are waited for, not interrupted.
    pub fn run_with_cancel<'a, I>(&self, tasks: I, cancel: &CancelToken) -> BatchResult
    where
        I: IntoIterator<Item = Task<'a>>,
    {
        self.run_inner(tasks.into_iter().collect(), Some(cancel))
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("runner")
    }

    fn run_inner(&self, tasks: Vec<Task<'_>>, cancel: Option<&CancelToken>) -> BatchResult {
        let submitted = tasks.len();
        if submitted == 0 {
            return BatchResult::default();
        }

        let label = self.label();
        log::debug!(
            "'{label}' starting batch of {submitted} tasks, limit {}",
            self.limit
        );

        let slots = Slots::new(self.limit);
        let workers = self.limit.get().min(submitted);
        // Room for every outcome, so reporting never blocks a worker.
        let (sender, recv) = crossbeam_channel::bounded::<Outcome>(submitted);
        let mut skipped = Vec::new();

        thread::scope(|s| {
            // Rendezvous: a task is only handed over once a worker is idle.
            let (job_sender, job_recv) =
                crossbeam_channel::bounded::<(TaskId, Body<'_>, SlotGuard<'_>)>(0);
            let mut handles = Vec::with_capacity(workers);
            let mut spawn_error = None;
            for i in 0..workers {
                let mut builder = thread::Builder::new();
                if let Some(name) = &self.name {
                    builder = builder.name(format!("{name}-{i}"));
                }
                if let Some(stack_size) = self.stack_size {
                    builder = builder.stack_size(stack_size);
                }

                let jobs = job_recv.clone();
                let outcomes = sender.clone();
                let spawned = builder.spawn_scoped(s, move || {
                    log::trace!("'{label}' worker {i} starting");
                    for (id, body, slot) in jobs {
                        log::trace!("'{label}' task {id} running");
                        let outcome = execute(id, body);
                        drop(slot);
                        log::trace!("'{label}' task {id} released its slot");

                        match &outcome {
                            Outcome::Success(_) => log::trace!("'{label}' task {id} succeeded"),
                            Outcome::Failure(failure) => log::debug!("'{label}' {failure}"),
                        }
                        if outcomes.send(outcome).is_err() {
                            unreachable!("outcome receiver outlives every worker");
                        }
                    }
                    log::trace!("'{label}' worker {i} exiting");
                });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        log::warn!("'{label}' could not spawn worker {i}: {err}");
                        spawn_error = Some(err);
                    }
                }
            }
            drop(job_recv);

            let mut tasks = tasks.into_iter();
            if handles.is_empty() {
                // Nothing can run the bodies; report every task instead of blocking forever.
                if let Some(err) = spawn_error {
                    for task in tasks.by_ref() {
                        let failure = Failure {
                            task: task.id(),
                            cause: Cause::Spawn(io::Error::new(err.kind(), err.to_string())),
                        };
                        if sender.send(Outcome::Failure(failure)).is_err() {
                            unreachable!("outcome receiver outlives the dispatch loop");
                        }
                    }
                }
            }

            while let Some(task) = tasks.next() {
                if slots.available() == 0 {
                    log::trace!("'{label}' all {} slots taken, waiting", self.limit);
                }
                let slot = slots.acquire();

                if cancel.is_some_and(CancelToken::is_cancelled) {
                    drop(slot);
                    skipped.push(task.id());
                    skipped.extend(tasks.by_ref().map(|task| task.id()));
                    log::debug!(
                        "'{label}' cancelled, skipping {} unadmitted tasks",
                        skipped.len()
                    );
                    break;
                }

                let (id, body) = task.into_parts();
                log::trace!("'{label}' task {id} admitted");
                if job_sender.send((id, body, slot)).is_err() {
                    // Every worker is gone, which only happens when one panicked outside a task
                    // body. The join below forwards that panic.
                    break;
                }
            }

            // Completion barrier: close the job channel so idle workers exit, wait for all of
            // them, then forward a panic that escaped a worker, if any.
            drop(job_sender);
            let mut payload = None;
            for handle in handles {
                if let Err(pl) = handle.join() {
                    payload = Some(pl);
                }
            }
            if let Some(payload) = payload {
                resume_unwind(payload);
            }
        });

        // Every worker has exited, so once our own sender is gone the channel is complete.
        drop(sender);
        let mut result = BatchResult {
            submitted,
            succeeded: 0,
            failures: Vec::new(),
            skipped,
        };
        for outcome in recv {
            match outcome {
                Outcome::Success(_) => result.succeeded += 1,
                Outcome::Failure(failure) => result.failures.push(failure),
            }
        }
        debug_assert_eq!(
            result.succeeded + result.failures.len() + result.skipped.len(),
            submitted,
            "every submitted task must be accounted for"
        );

        log::debug!(
            "'{label}' batch done: {} succeeded, {} failed, {} skipped",
            result.succeeded,
            result.failures.len(),
            result.skipped.len()
        );
        result
    }
}

/// Runs one task body, turning an error or a panic into a [`Failure`] tagged with `id`.
fn execute(id: TaskId, body: Body<'_>) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => Outcome::Success(id),
        Ok(Err(err)) => Outcome::Failure(Failure {
            task: id,
            cause: Cause::Error(err),
        }),
        Err(payload) => Outcome::Failure(Failure {
            task: id,
            cause: Cause::from_panic(payload),
        }),
    }
}

/// Runs `tasks` with at most `concurrency_limit` of them executing at once.
///
/// This is a shorthand for [`Runner::new`] followed by [`Runner::run`]. The only error is an
/// invalid `concurrency_limit`, in which case no task is run; failing tasks are reported in the
/// returned [`BatchResult`].
pub fn run_batch<'a, I>(tasks: I, concurrency_limit: i64) -> Result<BatchResult, Error>
where
    I: IntoIterator<Item = Task<'a>>,
{
    Ok(Runner::new(concurrency_limit)?.run(tasks))
}

/// The aggregated outcome of one batch.
///
/// Holds one [`Failure`] per failed task, in no particular order. A submitted task that is neither
/// failed nor [skipped](BatchResult::skipped) has succeeded.
#[derive(Debug, Default)]
pub struct BatchResult {
    submitted: usize,
    succeeded: usize,
    failures: Vec<Failure>,
    skipped: Vec<TaskId>,
}

impl BatchResult {
    /// Number of tasks handed to the runner.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }

    /// IDs of the tasks that failed.
    pub fn failed(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.failures.iter().map(|failure| failure.task)
    }

    /// IDs of the tasks that were never admitted because the batch was cancelled.
    pub fn skipped(&self) -> &[TaskId] {
        &self.skipped
    }

    /// Returns `true` if every submitted task ran and succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }
}
