//! The execution engine: runners, the containers they drive, and the
//! schedulers that run children.

mod ancestry;
mod computer;
mod error_reporting;
mod parent;
mod scheduler;
mod suite;
mod test_case;

pub use ancestry::Ancestry;
pub use computer::Computer;
pub use error_reporting::ErrorReportingRunner;
pub use parent::{NodeKind, ParentRunner};
pub use scheduler::{ParallelScheduler, Schedule, Scheduler, Sequential, Task};
pub use suite::{SuiteKind, SuiteRunner};
pub use test_case::{TestCaseKind, TestCaseRunner};

use crate::{
    description::Description,
    errors::Error,
    manipulation::{Filter, Sorter},
    notification::RunNotifier,
};
use std::sync::Arc;

/// A node of the runner tree.
pub trait Runner: Send + Sync {
    /// Describes the tests this runner will run, given the current filter
    /// and sorter.
    fn description(&self) -> Description;

    /// Run every test below this node, reporting through `notifier`.
    /// Failures are reported, not returned; only [Error::StoppedByUser]
    /// escapes.
    fn run(
        &self,
        notifier: &RunNotifier,
        ancestry: &mut Ancestry,
    ) -> Result<(), Error>;

    /// Restrict the tests that run. Fails with [Error::NoTestsRemain] when
    /// nothing would be left.
    fn filter(&self, filter: Arc<dyn Filter>) -> Result<(), Error>;

    fn sort(&self, sorter: Sorter);

    /// Replace the scheduler used for this node's children. Runners without
    /// children ignore it.
    fn set_scheduler(&self, _scheduler: Arc<dyn Scheduler>) {}

    fn test_count(&self) -> usize {
        self.description().test_count()
    }
}
