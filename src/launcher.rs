//! Entry points that run a tree and collect its [RunResult].

use crate::{
    executor::{Ancestry, Computer, Runner},
    model::TestClass,
    notification::{RunListener, RunNotifier, RunResult, TextListener},
    request::Request,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs requests against a notifier shared by every run.
///
/// Listeners added here see the events of every later run.
#[derive(Default)]
pub struct Core {
    notifier: RunNotifier,
}

impl Core {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn RunListener>) {
        self.notifier.add_listener(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn RunListener>) {
        self.notifier.remove_listener(listener);
    }

    /// The notifier runs report through, e.g. to request a stop from
    /// another thread.
    pub fn notifier(&self) -> &RunNotifier {
        &self.notifier
    }

    /// Run `runner` once and return what happened. A fresh result is
    /// registered ahead of every other listener for the duration of the run.
    pub fn run(&self, runner: &dyn Runner) -> RunResult {
        let result = RunResult::new();
        let listener = result.listener();
        self.notifier.add_first_listener(listener.clone());

        let description = runner.description();
        info!(
            suite = description.display_name(),
            tests = description.test_count(),
            "run started"
        );
        self.notifier.fire_test_run_started(&description);
        if let Err(err) = runner.run(&self.notifier, &mut Ancestry::new()) {
            warn!(error = %err, "run aborted");
        }
        self.notifier.fire_test_run_finished(&result);
        self.notifier.remove_listener(&listener);

        info!(
            run = result.run_count(),
            failed = result.failure_count(),
            ignored = result.ignore_count(),
            elapsed = ?result.run_time(),
            "run finished"
        );
        result
    }

    pub fn run_request(&self, request: &Request) -> RunResult {
        self.run(request.get_runner())
    }

    /// Run every test of `classes`, using `computer` to build the tree.
    pub fn run_classes(
        &self,
        computer: &Computer,
        classes: impl IntoIterator<Item = Arc<TestClass>>,
    ) -> RunResult {
        self.run_request(&Request::classes(computer, classes))
    }
}

/// Run every test of `classes` serially without any extra listener.
pub fn run_classes(
    classes: impl IntoIterator<Item = Arc<TestClass>>,
) -> RunResult {
    Core::new().run_classes(&Computer::serial(), classes)
}

/// Run every test of `classes` serially, printing progress and a summary to
/// stdout.
pub fn run_main(
    classes: impl IntoIterator<Item = Arc<TestClass>>,
) -> RunResult {
    let core = Core::new();
    core.add_listener(Arc::new(TextListener::stdout()));
    core.run_classes(&Computer::serial(), classes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{description::Description, errors::Error};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl RunListener for Events {
        fn test_run_started(&self, d: &Description) -> Result<(), Error> {
            self.0.lock().unwrap().push(format!("run {}", d));
            Ok(())
        }

        fn test_run_finished(&self, r: &RunResult) -> Result<(), Error> {
            self.0
                .lock()
                .unwrap()
                .push(format!("done {}", r.run_count()));
            Ok(())
        }
    }

    #[test]
    fn results_are_per_run() {
        let core = Core::new();
        let events = Arc::new(Events::default());
        core.add_listener(events.clone());
        let class = TestClass::builder("T").test("a", || Ok(())).build();

        let first = core.run_request(&Request::class(&class));
        let second = core.run_request(&Request::class(&class));

        assert_eq!(first.run_count(), 1);
        assert_eq!(second.run_count(), 1);
        assert_eq!(core.notifier().listener_count(), 1);
        assert_eq!(
            *events.0.lock().unwrap(),
            ["run T", "done 1", "run T", "done 1"]
        );
    }

    #[test]
    fn free_function_runs_classes() {
        let result = run_classes(vec![
            TestClass::builder("A").test("a", || Ok(())).build(),
            TestClass::builder("B")
                .test("b", || Err(Error::Failure("nope".into())))
                .build(),
        ]);
        assert_eq!(result.run_count(), 2);
        assert_eq!(result.failure_count(), 1);
        assert!(!result.was_successful());
    }
}
