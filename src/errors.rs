use std::{any::Any, fmt, time::Duration};
use thiserror::Error;

/// An error raised while building or running a test tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// An expected skip condition. Reported as ignored, never as a failure.
    #[error("assumption not met: {0}")]
    AssumptionViolated(String),

    /// The caller asked the run to stop. Never converted into a failure.
    #[error("run stopped by user")]
    StoppedByUser,

    /// Test code failed explicitly.
    #[error("{0}")]
    Failure(String),

    /// A hook, test body, or rule panicked.
    #[error("panicked: {0}")]
    Panic(String),

    #[error("timed out after {elapsed:?} (limit {limit:?})")]
    TimedOut { limit: Duration, elapsed: Duration },

    /// Several errors collected from one statement chain.
    #[error("{}", MultipleDisplay(.0))]
    Multiple(Vec<Error>),

    #[error("no tests remain")]
    NoTestsRemain,

    /// Validation failed while constructing a runner. Every violation is
    /// listed.
    #[error("{class} is not a valid test class: {}", .errors.join("; "))]
    Initialization { class: String, errors: Vec<String> },

    /// A listener failed and was removed from the notifier.
    #[error("listener failed: {0}")]
    Listener(String),

    /// Bad configuration file, regex, or IO.
    #[error("{0}")]
    Config(String),
}

struct MultipleDisplay<'a>(&'a [Error]);

impl fmt::Display for MultipleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "there were {} errors:", self.0.len())?;
        for err in self.0 {
            write!(f, "\n  - {}", err)?;
        }
        Ok(())
    }
}

impl Error {
    /// Collapse a list of errors: nothing is `Ok`, a single error is
    /// returned as-is, several become [Error::Multiple].
    pub fn from_errors(mut errors: Vec<Error>) -> Result<(), Error> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Multiple(errors)),
        }
    }

    /// Convert a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Ok(err) = payload.downcast::<Error>() {
            return *err;
        } else {
            "unknown panic".to_string()
        };
        Error::Panic(msg)
    }

    pub fn is_assumption(&self) -> bool {
        matches!(self, Error::AssumptionViolated(_))
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Error::StoppedByUser)
    }

    /// The underlying errors: the members of a composite, or just `self`.
    pub fn causes(&self) -> Vec<&Error> {
        match self {
            Error::Multiple(errors) => {
                errors.iter().flat_map(|e| e.causes()).collect()
            }
            other => vec![other],
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::Config(format!("cannot start worker pool: {}", err))
    }
}

/// Fail the current test with `msg`.
pub fn fail<T>(msg: impl Into<String>) -> Result<T, Error> {
    Err(Error::Failure(msg.into()))
}

/// Skip the current test or container unless `cond` holds.
pub fn assume_true(cond: bool, msg: impl Into<String>) -> Result<(), Error> {
    if cond {
        Ok(())
    } else {
        Err(Error::AssumptionViolated(msg.into()))
    }
}

/// Skip unless `value` is present, returning it otherwise.
pub fn assume_not_none<T>(value: Option<T>, what: &str) -> Result<T, Error> {
    value.ok_or_else(|| {
        Error::AssumptionViolated(format!("expected {} to be present", what))
    })
}
