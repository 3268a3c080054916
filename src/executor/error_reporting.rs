use super::{Ancestry, Runner};
use crate::{
    description::Description,
    errors::Error,
    manipulation::{Filter, Sorter},
    notification::{Failure, RunNotifier},
};
use std::sync::Arc;

/// Stands in for a class whose runner could not be built. Each cause is
/// reported as a failed test, so siblings in a suite still run.
#[derive(Debug)]
pub struct ErrorReportingRunner {
    class_name: String,
    causes: Vec<Error>,
}

impl ErrorReportingRunner {
    pub fn new(class_name: impl Into<String>, error: Error) -> Self {
        let causes = match error {
            Error::Initialization { errors, .. } => {
                errors.into_iter().map(Error::Failure).collect()
            }
            Error::Multiple(errors) => errors,
            other => vec![other],
        };
        ErrorReportingRunner {
            class_name: class_name.into(),
            causes,
        }
    }

    pub fn causes(&self) -> &[Error] {
        &self.causes
    }

    fn describe_cause(&self, idx: usize) -> Description {
        let method = if self.causes.len() == 1 {
            "initializationError".to_string()
        } else {
            format!("initializationError{}", idx)
        };
        Description::create_test(
            &self.class_name,
            &method,
            Vec::<String>::new(),
        )
    }
}

impl Runner for ErrorReportingRunner {
    fn description(&self) -> Description {
        let mut description =
            Description::create_suite(&self.class_name, Vec::<String>::new());
        for idx in 0..self.causes.len() {
            description.add_child(self.describe_cause(idx));
        }
        description
    }

    fn run(
        &self,
        notifier: &RunNotifier,
        _ancestry: &mut Ancestry,
    ) -> Result<(), Error> {
        for (idx, cause) in self.causes.iter().enumerate() {
            let description = self.describe_cause(idx);
            notifier.fire_test_started(&description)?;
            notifier.fire_test_failure(Failure::new(
                description.clone(),
                cause.clone(),
            ));
            notifier.fire_test_finished(&description);
        }
        Ok(())
    }

    fn filter(&self, _filter: Arc<dyn Filter>) -> Result<(), Error> {
        Ok(())
    }

    fn sort(&self, _sorter: Sorter) {}
}
