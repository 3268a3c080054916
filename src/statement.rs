//! Statements are the single composition primitive of the engine.
//!
//! Everything that runs, from a test method to a whole suite, is a
//! [Statement]. Hooks and rules are decorators: they take a statement and
//! return a new one that does extra work around it.

use crate::{errors::Error, model::FrameworkMethod};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::trace;

type Body<'a> = Box<dyn FnOnce() -> Result<(), Error> + Send + 'a>;

/// A single-shot unit of work. Evaluating consumes it.
pub struct Statement<'a>(Body<'a>);

impl<'a> Statement<'a> {
    pub fn new(body: impl FnOnce() -> Result<(), Error> + Send + 'a) -> Self {
        Statement(Box::new(body))
    }

    /// A statement that does nothing.
    pub fn noop() -> Self {
        Statement::new(|| Ok(()))
    }

    /// A statement that fails with `err` when evaluated.
    pub fn failing(err: Error) -> Self {
        Statement::new(move || Err(err))
    }

    /// Run the wrapped work. Panics are caught and surface as
    /// [Error::Panic].
    pub fn evaluate(self) -> Result<(), Error> {
        let Statement(body) = self;
        catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| {
            Err(Error::from_panic(payload))
        })
    }

    /// Fold `decorators` over this statement in order: the first decorator
    /// wraps innermost, the last ends up outermost.
    pub fn wrap_all<D>(
        self,
        decorators: impl IntoIterator<Item = D>,
        mut apply: impl FnMut(D, Statement<'a>) -> Statement<'a>,
    ) -> Statement<'a> {
        decorators
            .into_iter()
            .fold(self, |statement, decorator| apply(decorator, statement))
    }
}

/// Invoke a hook or test method body.
pub fn invoke(method: &FrameworkMethod) -> Statement<'_> {
    Statement::new(move || {
        trace!(method = method.name(), "invoking");
        method.invoke()
    })
}

/// Run `befores` in order, then `base`. The first failing hook stops
/// everything after it, including `base`.
pub fn run_befores<'a>(
    base: Statement<'a>,
    befores: &'a [FrameworkMethod],
) -> Statement<'a> {
    if befores.is_empty() {
        return base;
    }
    Statement::new(move || {
        for before in befores {
            invoke(before).evaluate()?;
        }
        base.evaluate()
    })
}

/// Run `base`, then every hook in `afters`. All afters run even when `base`
/// or an earlier after failed; every error is kept. A stop request skips
/// the afters that were not entered yet.
pub fn run_afters<'a>(
    base: Statement<'a>,
    afters: &'a [FrameworkMethod],
) -> Statement<'a> {
    if afters.is_empty() {
        return base;
    }
    Statement::new(move || {
        let mut errors = Vec::new();
        match base.evaluate() {
            Err(Error::StoppedByUser) => return Err(Error::StoppedByUser),
            Err(err) => errors.push(err),
            Ok(()) => {}
        }
        for after in afters {
            match invoke(after).evaluate() {
                Err(Error::StoppedByUser) => {
                    return Err(Error::StoppedByUser)
                }
                Err(err) => errors.push(err),
                Ok(()) => {}
            }
        }
        Error::from_errors(errors)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn hook(log: &Log, name: &str, fail: bool) -> FrameworkMethod {
        let log = log.clone();
        let name = name.to_string();
        FrameworkMethod::new(name.clone(), move || {
            log.lock().unwrap().push(name.clone());
            if fail {
                Err(Error::Failure(format!("{} failed", name)))
            } else {
                Ok(())
            }
        })
    }

    fn logged(log: &Log, entry: &'static str) -> Statement<'static> {
        let log = log.clone();
        Statement::new(move || {
            log.lock().unwrap().push(entry.to_string());
            Ok(())
        })
    }

    #[test]
    fn panics_become_errors() {
        let res = Statement::new(|| panic!("kaboom")).evaluate();
        assert_eq!(res, Err(Error::Panic("kaboom".into())));
    }

    #[test]
    fn wrap_all_first_is_innermost() {
        let log: Log = Default::default();
        let statement = logged(&log, "base").wrap_all(
            ["first", "second"],
            |name, base| {
                let log = log.clone();
                Statement::new(move || {
                    log.lock().unwrap().push(format!("enter {}", name));
                    base.evaluate()
                })
            },
        );
        statement.evaluate().unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            ["enter second", "enter first", "base"]
        );
    }

    #[test]
    fn failing_before_stops_the_rest() {
        let log: Log = Default::default();
        let befores =
            vec![hook(&log, "b1", true), hook(&log, "b2", false)];
        let res = run_befores(logged(&log, "base"), &befores).evaluate();
        assert_eq!(res, Err(Error::Failure("b1 failed".into())));
        assert_eq!(*log.lock().unwrap(), ["b1"]);
    }

    #[test]
    fn afters_always_run_and_combine_errors() {
        let log: Log = Default::default();
        let afters = vec![hook(&log, "a1", true), hook(&log, "a2", false)];
        let base = Statement::failing(Error::Failure("base failed".into()));
        let err = run_afters(base, &afters).evaluate().unwrap_err();
        assert_eq!(*log.lock().unwrap(), ["a1", "a2"]);
        assert_eq!(
            err.causes(),
            [
                &Error::Failure("base failed".into()),
                &Error::Failure("a1 failed".into())
            ]
        );
    }

    #[test]
    fn stop_skips_afters() {
        let log: Log = Default::default();
        let afters = vec![hook(&log, "a1", false)];
        let base = Statement::failing(Error::StoppedByUser);
        let res = run_afters(base, &afters).evaluate();
        assert_eq!(res, Err(Error::StoppedByUser));
        assert!(log.lock().unwrap().is_empty());
    }
}
