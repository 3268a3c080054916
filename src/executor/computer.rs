use super::{
    ErrorReportingRunner, ParallelScheduler, Runner, Scheduler, SuiteRunner,
    TestCaseRunner,
};
use crate::{errors::Error, model::TestClass};
use std::{fmt, sync::Arc};
use tracing::{debug, warn};

/// Builds runner trees for test classes.
///
/// A class with suite classes becomes a [SuiteRunner] over runners for its
/// members; any other class becomes a [TestCaseRunner]. The serial computer
/// leaves every runner on the sequential scheduler. A parallel one installs
/// a scheduler on suites, test cases, or both.
#[derive(Clone, Default)]
pub struct Computer {
    suites: Option<Arc<dyn Scheduler>>,
    test_cases: Option<Arc<dyn Scheduler>>,
}

impl Computer {
    pub fn serial() -> Self {
        Self::default()
    }

    /// Run the members of suites (`classes`) and the methods of test cases
    /// (`methods`) concurrently, one worker per CPU.
    pub fn parallel(classes: bool, methods: bool) -> Result<Self, Error> {
        Self::parallel_with(classes, methods, num_cpus::get())
    }

    /// Like [Computer::parallel] with a fixed number of workers. Every
    /// container of the tree shares the same pool.
    pub fn parallel_with(
        classes: bool,
        methods: bool,
        workers: usize,
    ) -> Result<Self, Error> {
        let scheduler: Arc<dyn Scheduler> =
            Arc::new(ParallelScheduler::new(workers)?);
        Ok(Computer {
            suites: if classes { Some(scheduler.clone()) } else { None },
            test_cases: if methods { Some(scheduler) } else { None },
        })
    }

    /// Build the runner tree rooted at `class`.
    pub fn runner_for(
        &self,
        class: &Arc<TestClass>,
    ) -> Result<Box<dyn Runner>, Error> {
        if !class.is_suite() {
            debug!(class = class.name(), "building test case runner");
            let runner = TestCaseRunner::test_case(class.clone())?;
            return Ok(self.install(runner, &self.test_cases));
        }

        debug!(class = class.name(), "building suite runner");
        let runners = class
            .suite_classes()
            .iter()
            .map(|member| self.safe_runner_for(member))
            .collect();
        let runner = SuiteRunner::suite(class.clone(), runners)?;
        Ok(self.install(runner, &self.suites))
    }

    /// Build the runner tree rooted at `class`, reporting a class that
    /// cannot be run through an [ErrorReportingRunner].
    pub fn safe_runner_for(&self, class: &Arc<TestClass>) -> Box<dyn Runner> {
        self.runner_for(class).unwrap_or_else(|err| {
            warn!(class = class.name(), error = %err, "cannot run class");
            Box::new(ErrorReportingRunner::new(class.name(), err))
        })
    }

    /// A suite named `name` over `classes`.
    pub fn suite(
        &self,
        name: &str,
        classes: impl IntoIterator<Item = Arc<TestClass>>,
    ) -> Result<Box<dyn Runner>, Error> {
        let classes: Vec<_> = classes.into_iter().collect();
        let class = TestClass::builder(name)
            .suite_classes(classes.iter().cloned())
            .build();
        let runners = classes
            .iter()
            .map(|member| self.safe_runner_for(member))
            .collect();
        let runner = SuiteRunner::suite(class, runners)?;
        Ok(self.install(runner, &self.suites))
    }

    fn install(
        &self,
        runner: impl Runner + 'static,
        scheduler: &Option<Arc<dyn Scheduler>>,
    ) -> Box<dyn Runner> {
        if let Some(scheduler) = scheduler {
            runner.set_scheduler(scheduler.clone());
        }
        Box::new(runner)
    }
}

impl fmt::Debug for Computer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Computer")
            .field("parallel_suites", &self.suites.is_some())
            .field("parallel_test_cases", &self.test_cases.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> Arc<TestClass> {
        TestClass::builder(name).test("t", || Ok(())).build()
    }

    #[test]
    fn builds_nested_trees() {
        let inner = TestClass::builder("Inner").suite_class(leaf("A")).build();
        let outer = TestClass::builder("Outer")
            .suite_class(inner)
            .suite_class(leaf("B"))
            .build();
        let runner = Computer::serial().runner_for(&outer).unwrap();
        let names: Vec<_> = runner
            .description()
            .iter()
            .map(|d| d.display_name().to_string())
            .collect();
        assert_eq!(names, ["Outer", "Inner", "A", "t(A)", "B", "t(B)"]);
    }

    #[test]
    fn invalid_members_become_error_reports() {
        let outer = TestClass::builder("Outer")
            .suite_class(TestClass::builder("NoTests").build())
            .suite_class(leaf("Fine"))
            .build();
        let runner = Computer::serial().runner_for(&outer).unwrap();
        let names: Vec<_> = runner
            .description()
            .children()
            .iter()
            .map(|d| d.display_name().to_string())
            .collect();
        assert_eq!(names, ["NoTests", "Fine"]);
        assert_eq!(runner.test_count(), 2);
    }

    #[test]
    fn named_suite_over_classes() {
        let runner = Computer::parallel_with(true, true, 2)
            .unwrap()
            .suite("Everything", vec![leaf("A"), leaf("B")])
            .unwrap();
        assert_eq!(runner.description().display_name(), "Everything");
        assert_eq!(runner.test_count(), 2);
    }
}
