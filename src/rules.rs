//! Rules let cross-cutting behaviour wrap execution of a suite, a test case
//! or a single test method.
//!
//! A rule receives the statement it wraps plus the identity of what is being
//! run, and returns a new statement. It never sees the runner tree.

use crate::{
    description::Description,
    errors::Error,
    model::{FrameworkMethod, TestClass},
    statement::Statement,
};
use std::time::{Duration, Instant};
use tracing::trace;

/// Wraps execution of a suite.
pub trait SuiteRule: Send + Sync {
    fn apply<'a>(
        &'a self,
        base: Statement<'a>,
        suite: &'a TestClass,
    ) -> Statement<'a>;
}

/// Wraps execution of a test case, i.e. a class owning test methods.
pub trait TestCaseRule: Send + Sync {
    fn apply<'a>(
        &'a self,
        base: Statement<'a>,
        test_case: &'a TestClass,
    ) -> Statement<'a>;
}

/// Wraps execution of one test method. `target` describes the method being
/// run.
pub trait MethodRule: Send + Sync {
    fn apply<'a>(
        &'a self,
        base: Statement<'a>,
        method: &'a FrameworkMethod,
        target: &'a Description,
    ) -> Statement<'a>;
}

type ClassCallback = Box<dyn Fn(&TestClass) + Send + Sync>;

/// Callbacks around a container, usable as a [SuiteRule] or a
/// [TestCaseRule] in place of before-all/after-all hooks.
///
/// `finished` runs whether or not the container failed, but not when the
/// run was stopped.
#[derive(Default)]
pub struct ContainerWatchman {
    starting: Option<ClassCallback>,
    finished: Option<ClassCallback>,
}

pub type SuiteWatchman = ContainerWatchman;
pub type TestCaseWatchman = ContainerWatchman;

impl ContainerWatchman {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting(
        mut self,
        callback: impl Fn(&TestClass) + Send + Sync + 'static,
    ) -> Self {
        self.starting = Some(Box::new(callback));
        self
    }

    pub fn finished(
        mut self,
        callback: impl Fn(&TestClass) + Send + Sync + 'static,
    ) -> Self {
        self.finished = Some(Box::new(callback));
        self
    }

    fn watch<'a>(
        &'a self,
        base: Statement<'a>,
        class: &'a TestClass,
    ) -> Statement<'a> {
        Statement::new(move || {
            if let Some(starting) = &self.starting {
                starting(class);
            }
            let res = base.evaluate();
            if let (Some(finished), false) =
                (&self.finished, matches!(res, Err(Error::StoppedByUser)))
            {
                finished(class);
            }
            res
        })
    }
}

impl SuiteRule for ContainerWatchman {
    fn apply<'a>(
        &'a self,
        base: Statement<'a>,
        suite: &'a TestClass,
    ) -> Statement<'a> {
        self.watch(base, suite)
    }
}

impl TestCaseRule for ContainerWatchman {
    fn apply<'a>(
        &'a self,
        base: Statement<'a>,
        test_case: &'a TestClass,
    ) -> Statement<'a> {
        self.watch(base, test_case)
    }
}

type TestCallback = Box<dyn Fn(&Description) + Send + Sync>;
type FailedCallback = Box<dyn Fn(&Description, &Error) + Send + Sync>;

/// Callbacks around a single test method.
#[derive(Default)]
pub struct TestWatchman {
    starting: Option<TestCallback>,
    succeeded: Option<TestCallback>,
    failed: Option<FailedCallback>,
    finished: Option<TestCallback>,
}

impl TestWatchman {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting(
        mut self,
        callback: impl Fn(&Description) + Send + Sync + 'static,
    ) -> Self {
        self.starting = Some(Box::new(callback));
        self
    }

    pub fn succeeded(
        mut self,
        callback: impl Fn(&Description) + Send + Sync + 'static,
    ) -> Self {
        self.succeeded = Some(Box::new(callback));
        self
    }

    /// Not called for unmet assumptions or stop requests.
    pub fn failed(
        mut self,
        callback: impl Fn(&Description, &Error) + Send + Sync + 'static,
    ) -> Self {
        self.failed = Some(Box::new(callback));
        self
    }

    pub fn finished(
        mut self,
        callback: impl Fn(&Description) + Send + Sync + 'static,
    ) -> Self {
        self.finished = Some(Box::new(callback));
        self
    }
}

impl MethodRule for TestWatchman {
    fn apply<'a>(
        &'a self,
        base: Statement<'a>,
        _method: &'a FrameworkMethod,
        target: &'a Description,
    ) -> Statement<'a> {
        Statement::new(move || {
            if let Some(starting) = &self.starting {
                starting(target);
            }
            let res = base.evaluate();
            match &res {
                Err(Error::StoppedByUser) => return res,
                Err(Error::AssumptionViolated(_)) => {}
                Err(err) => {
                    if let Some(failed) = &self.failed {
                        failed(target, err);
                    }
                }
                Ok(()) => {
                    if let Some(succeeded) = &self.succeeded {
                        succeeded(target);
                    }
                }
            }
            if let Some(finished) = &self.finished {
                finished(target);
            }
            res
        })
    }
}

/// Fails a test method that runs longer than `limit`.
///
/// The body cannot be interrupted; the limit is checked once it returns.
#[derive(Clone, Copy, Debug)]
pub struct Timeout {
    limit: Duration,
}

impl Timeout {
    pub fn new(limit: Duration) -> Self {
        Timeout { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Timeout::new(Duration::from_millis(ms))
    }
}

impl MethodRule for Timeout {
    fn apply<'a>(
        &'a self,
        base: Statement<'a>,
        method: &'a FrameworkMethod,
        _target: &'a Description,
    ) -> Statement<'a> {
        Statement::new(move || {
            let start = Instant::now();
            let res = base.evaluate();
            let elapsed = start.elapsed();
            trace!(method = method.name(), ?elapsed, "timed");
            match res {
                Err(Error::StoppedByUser) => res,
                _ if elapsed > self.limit => Err(Error::TimedOut {
                    limit: self.limit,
                    elapsed,
                }),
                _ => res,
            }
        })
    }
}
