//! Schedulers decide how the children of a container are executed.
//!
//! A container opens one [Schedule] per run of its children, hands it one
//! [Task] per live child and then calls [Schedule::finished], which must not
//! return before every task has completed.

use crate::errors::Error;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};
use tracing::debug;

/// Runs one child. Only a stop request is returned as an error; everything
/// else has already been reported through the notifier.
pub type Task<'a> = Box<dyn FnOnce() -> Result<(), Error> + Send + 'a>;

pub trait Scheduler: Send + Sync {
    /// Open a session for one batch of children.
    fn session<'a>(&'a self) -> Box<dyn Schedule<'a> + 'a>;
}

/// One batch of scheduled children.
pub trait Schedule<'a> {
    fn schedule(&mut self, task: Task<'a>) -> Result<(), Error>;

    /// Block until every scheduled task completed.
    fn finished(self: Box<Self>) -> Result<(), Error>;
}

/// Runs every child synchronously, in order, as soon as it is scheduled.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl Scheduler for Sequential {
    fn session<'a>(&'a self) -> Box<dyn Schedule<'a> + 'a> {
        Box::new(Sequential)
    }
}

impl<'a> Schedule<'a> for Sequential {
    fn schedule(&mut self, task: Task<'a>) -> Result<(), Error> {
        task()
    }

    fn finished(self: Box<Self>) -> Result<(), Error> {
        Ok(())
    }
}

/// Runs children on a bounded pool of worker threads.
///
/// Clones share one pool, so nested containers using the same scheduler
/// never start more than `workers` threads between them. Tasks are queued
/// until [Schedule::finished] and then started in scheduling order. A stop
/// request from any task keeps the tasks that have not started yet from
/// running.
#[derive(Clone, Debug)]
pub struct ParallelScheduler {
    pool: Arc<ThreadPool>,
}

impl ParallelScheduler {
    pub fn new(workers: usize) -> Result<Self, Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|idx| format!("trellis-worker-{}", idx))
            .build()?;
        Ok(ParallelScheduler {
            pool: Arc::new(pool),
        })
    }

    /// One worker per CPU.
    pub fn per_cpu() -> Result<Self, Error> {
        Self::new(num_cpus::get())
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Scheduler for ParallelScheduler {
    fn session<'a>(&'a self) -> Box<dyn Schedule<'a> + 'a> {
        Box::new(Batch {
            pool: &self.pool,
            tasks: Vec::new(),
        })
    }
}

struct Batch<'a> {
    pool: &'a ThreadPool,
    tasks: Vec<Task<'a>>,
}

impl<'a> Schedule<'a> for Batch<'a> {
    fn schedule(&mut self, task: Task<'a>) -> Result<(), Error> {
        self.tasks.push(task);
        Ok(())
    }

    fn finished(self: Box<Self>) -> Result<(), Error> {
        let Batch { pool, tasks } = *self;
        debug!(
            tasks = tasks.len(),
            workers = pool.current_num_threads(),
            "running batch"
        );
        let stopped = AtomicBool::new(false);
        let first_error = Mutex::new(None);

        pool.scope_fifo(|scope| {
            for task in tasks {
                let stopped = &stopped;
                let first_error = &first_error;
                scope.spawn_fifo(move |_| {
                    if stopped.load(Ordering::SeqCst) {
                        return;
                    }
                    if let Err(err) = task() {
                        stopped.store(true, Ordering::SeqCst);
                        first_error
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .get_or_insert(err);
                    }
                });
            }
        });

        match first_error
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
