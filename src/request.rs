//! Requests describe what to run before anything runs: a class, a set of
//! classes, or a single method, optionally filtered and sorted.

use crate::{
    description::Description,
    errors::Error,
    executor::{Computer, ErrorReportingRunner, Runner},
    manipulation::{self, Filter, Sorter},
    model::TestClass,
};
use std::{fmt, sync::Arc};
use tracing::debug;

/// A runner tree ready to be handed to [crate::launcher::Core].
pub struct Request {
    runner: Box<dyn Runner>,
}

impl Request {
    /// Wrap an already built runner.
    pub fn runner(runner: Box<dyn Runner>) -> Self {
        Request { runner }
    }

    /// Every test of `class`, run serially.
    pub fn class(class: &Arc<TestClass>) -> Self {
        Request::runner(Computer::serial().safe_runner_for(class))
    }

    /// Every test of `classes`, gathered into one suite built by `computer`.
    pub fn classes(
        computer: &Computer,
        classes: impl IntoIterator<Item = Arc<TestClass>>,
    ) -> Self {
        let runner = computer.suite("classes", classes).unwrap_or_else(|err| {
            Box::new(ErrorReportingRunner::new("classes", err))
        });
        Request::runner(runner)
    }

    /// The single test method `method` of `class`.
    pub fn method(class: &Arc<TestClass>, method: &str) -> Self {
        let desired = Description::create_test(
            class.name(),
            method,
            Vec::<String>::new(),
        );
        Request::class(class).filter_with(manipulation::matching(desired))
    }

    /// Keep only the tests `filter` accepts. When none remain the request
    /// instead reports a single failure naming the filter.
    pub fn filter_with(self, filter: Arc<dyn Filter>) -> Self {
        let name = self.runner.description().display_name().to_string();
        debug!(
            request = %name,
            filter = %filter.describe(),
            "filtering request"
        );
        match manipulation::apply_filter(&filter, self.runner.as_ref()) {
            Ok(()) => self,
            Err(Error::NoTestsRemain) => {
                let err = Error::Failure(format!(
                    "No tests found matching {} from {}",
                    filter.describe(),
                    name
                ));
                Request::runner(Box::new(ErrorReportingRunner::new(name, err)))
            }
            Err(err) => {
                Request::runner(Box::new(ErrorReportingRunner::new(name, err)))
            }
        }
    }

    /// Run sibling tests in the order given by `sorter`.
    pub fn sort_with(self, sorter: Sorter) -> Self {
        sorter.apply(self.runner.as_ref());
        self
    }

    /// Run sibling tests ordered by `comparator`.
    pub fn sorted(
        self,
        comparator: impl Fn(&Description, &Description) -> std::cmp::Ordering
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.sort_with(Sorter::new(comparator))
    }

    pub fn get_runner(&self) -> &dyn Runner {
        self.runner.as_ref()
    }

    pub fn into_runner(self) -> Box<dyn Runner> {
        self.runner
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Request({})", self.runner.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> Arc<TestClass> {
        TestClass::builder("Calculator")
            .test("adds", || Ok(()))
            .test("divides", || Ok(()))
            .build()
    }

    #[test]
    fn method_request_keeps_one_test() {
        let request = Request::method(&calculator(), "divides");
        let description = request.get_runner().description();
        assert_eq!(description.test_count(), 1);
        assert_eq!(
            description.children()[0].display_name(),
            "divides(Calculator)"
        );
    }

    #[test]
    fn unmatched_filter_reports_failure() {
        let request = Request::method(&calculator(), "missing");
        let runner = request.get_runner();
        let description = runner.description();
        assert_eq!(description.display_name(), "Calculator");
        assert_eq!(
            description.children()[0].display_name(),
            "initializationError(Calculator)"
        );
    }

    #[test]
    fn sorted_request_orders_children() {
        let request = Request::class(&calculator())
            .sorted(|a, b| b.display_name().cmp(a.display_name()));
        let names: Vec<_> = request
            .get_runner()
            .description()
            .children()
            .iter()
            .map(|d| d.display_name().to_string())
            .collect();
        assert_eq!(names, ["divides(Calculator)", "adds(Calculator)"]);
    }
}
