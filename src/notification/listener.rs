use super::{Failure, RunResult};
use crate::{description::Description, errors::Error};

/// Receives run events. Every method defaults to doing nothing.
///
/// Events are delivered synchronously, in registration order. A listener
/// that returns an error (or panics) is removed from the notifier and the
/// error is reported as a failure of the test mechanism.
pub trait RunListener: Send + Sync {
    fn test_run_started(
        &self,
        _description: &Description,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn test_run_finished(&self, _result: &RunResult) -> Result<(), Error> {
        Ok(())
    }

    /// A leaf test is about to run.
    fn test_started(&self, _description: &Description) -> Result<(), Error> {
        Ok(())
    }

    fn test_finished(&self, _description: &Description) -> Result<(), Error> {
        Ok(())
    }

    /// A test or a container failed.
    fn test_failure(&self, _failure: &Failure) -> Result<(), Error> {
        Ok(())
    }

    /// A test or a container was skipped.
    fn test_ignored(&self, _description: &Description) -> Result<(), Error> {
        Ok(())
    }
}
