use super::RunListener;
use crate::{description::Description, errors::Error};
use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

/// A failed test or container, paired with what went wrong.
#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    description: Description,
    error: Error,
}

impl Failure {
    pub fn new(description: Description, error: Error) -> Self {
        Failure { description, error }
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Display name of the failed node.
    pub fn test_header(&self) -> &str {
        self.description.display_name()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.test_header(), self.error)
    }
}

#[derive(Default)]
struct Tally {
    run_count: usize,
    ignore_count: usize,
    failures: Vec<Failure>,
    run_time: Duration,
    started: Option<Instant>,
}

/// Aggregated outcome of a run, filled in through [RunResult::listener].
///
/// Clones share the same tally.
#[derive(Clone, Default)]
pub struct RunResult {
    tally: Arc<Mutex<Tally>>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leaf tests that started.
    pub fn run_count(&self) -> usize {
        self.tally().run_count
    }

    pub fn failure_count(&self) -> usize {
        self.tally().failures.len()
    }

    pub fn ignore_count(&self) -> usize {
        self.tally().ignore_count
    }

    /// Wall-clock time between run start and run finish.
    pub fn run_time(&self) -> Duration {
        self.tally().run_time
    }

    /// Failures in the order they were reported.
    pub fn failures(&self) -> Vec<Failure> {
        self.tally().failures.clone()
    }

    pub fn was_successful(&self) -> bool {
        self.failure_count() == 0
    }

    /// A listener that records into this result.
    pub fn listener(&self) -> Arc<dyn RunListener> {
        Arc::new(Recorder(self.clone()))
    }

    fn tally(&self) -> MutexGuard<'_, Tally> {
        self.tally.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tally = self.tally();
        f.debug_struct("RunResult")
            .field("run_count", &tally.run_count)
            .field("ignore_count", &tally.ignore_count)
            .field("failures", &tally.failures)
            .field("run_time", &tally.run_time)
            .finish()
    }
}

struct Recorder(RunResult);

impl RunListener for Recorder {
    fn test_run_started(&self, _: &Description) -> Result<(), Error> {
        self.0.tally().started = Some(Instant::now());
        Ok(())
    }

    fn test_run_finished(&self, _: &RunResult) -> Result<(), Error> {
        let mut tally = self.0.tally();
        if let Some(started) = tally.started.take() {
            tally.run_time += started.elapsed();
        }
        Ok(())
    }

    fn test_started(&self, _: &Description) -> Result<(), Error> {
        self.0.tally().run_count += 1;
        Ok(())
    }

    fn test_failure(&self, failure: &Failure) -> Result<(), Error> {
        self.0.tally().failures.push(failure.clone());
        Ok(())
    }

    fn test_ignored(&self, _: &Description) -> Result<(), Error> {
        self.0.tally().ignore_count += 1;
        Ok(())
    }
}
