#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use trellis::{
    description::Description,
    errors::Error,
    model::{FrameworkMethod, TestClass},
    notification::RunResult,
    rules::{MethodRule, SuiteRule, TestCaseRule},
    statement::Statement,
    Core, Runner,
};

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Default::default()
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A hook or test body that appends `entry` to `log`.
pub fn append(
    log: &Log,
    entry: &str,
) -> impl Fn() -> Result<(), Error> + Send + Sync + 'static {
    let log = log.clone();
    let entry = entry.to_string();
    move || {
        log.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn run(runner: &dyn Runner) -> RunResult {
    init_logging();
    Core::new().run(runner)
}

/// A test case whose methods append their own name to `log`.
pub fn test_case(name: &str, methods: &[&str], log: &Log) -> Arc<TestClass> {
    let mut builder = TestClass::builder(name);
    for method in methods {
        builder = builder.test(method, append(log, method));
    }
    builder.build()
}

/// Display names of the tests below `description`, depth first.
pub fn leaf_names(description: &Description) -> Vec<String> {
    description
        .iter()
        .filter(|d| d.is_test())
        .map(|d| d.display_name().to_string())
        .collect()
}

/// Logs `tag>target` on entry and `tag<target` on exit of whatever it
/// wraps.
pub struct Tracer {
    tag: String,
    log: Log,
}

impl Tracer {
    pub fn new(tag: &str, log: &Log) -> Self {
        Tracer {
            tag: tag.to_string(),
            log: log.clone(),
        }
    }

    fn wrap<'a>(
        &'a self,
        base: Statement<'a>,
        target: &'a str,
    ) -> Statement<'a> {
        Statement::new(move || {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}>{}", self.tag, target));
            let res = base.evaluate();
            self.log
                .lock()
                .unwrap()
                .push(format!("{}<{}", self.tag, target));
            res
        })
    }
}

impl SuiteRule for Tracer {
    fn apply<'a>(
        &'a self,
        base: Statement<'a>,
        suite: &'a TestClass,
    ) -> Statement<'a> {
        self.wrap(base, suite.name())
    }
}

impl TestCaseRule for Tracer {
    fn apply<'a>(
        &'a self,
        base: Statement<'a>,
        test_case: &'a TestClass,
    ) -> Statement<'a> {
        self.wrap(base, test_case.name())
    }
}

impl MethodRule for Tracer {
    fn apply<'a>(
        &'a self,
        base: Statement<'a>,
        _method: &'a FrameworkMethod,
        target: &'a Description,
    ) -> Statement<'a> {
        self.wrap(base, target.display_name())
    }
}
