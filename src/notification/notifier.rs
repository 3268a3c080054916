use super::{Failure, RunListener, RunResult};
use crate::{description::Description, errors::Error};
use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};
use tracing::warn;

/// Broadcasts the events of one run to every registered listener.
#[derive(Default)]
pub struct RunNotifier {
    listeners: RwLock<Vec<Arc<dyn RunListener>>>,
    stop_requested: AtomicBool,
}

impl RunNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn RunListener>) {
        self.write_listeners().push(listener);
    }

    /// Register `listener` ahead of every other one, so it sees each event
    /// first.
    pub fn add_first_listener(&self, listener: Arc<dyn RunListener>) {
        self.write_listeners().insert(0, listener);
    }

    /// Remove `listener`, compared by identity.
    pub fn remove_listener(&self, listener: &Arc<dyn RunListener>) {
        self.write_listeners().retain(|l| !Arc::ptr_eq(l, listener));
    }

    pub fn listener_count(&self) -> usize {
        self.read_listeners().len()
    }

    /// Ask the run to stop. The next [RunNotifier::fire_test_started]
    /// returns [Error::StoppedByUser], which unwinds the whole run.
    pub fn please_stop(&self) {
        warn!("stop requested");
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub fn fire_test_run_started(&self, description: &Description) {
        self.safely(&|l| l.test_run_started(description));
    }

    pub fn fire_test_run_finished(&self, result: &RunResult) {
        self.safely(&|l| l.test_run_finished(result));
    }

    /// Announce that a leaf test starts. Fails instead when a stop was
    /// requested; nothing is delivered in that case.
    pub fn fire_test_started(
        &self,
        description: &Description,
    ) -> Result<(), Error> {
        if self.is_stop_requested() {
            return Err(Error::StoppedByUser);
        }
        self.safely(&|l| l.test_started(description));
        Ok(())
    }

    pub fn fire_test_finished(&self, description: &Description) {
        self.safely(&|l| l.test_finished(description));
    }

    pub fn fire_test_failure(&self, failure: Failure) {
        self.safely(&|l| l.test_failure(&failure));
    }

    pub fn fire_test_ignored(&self, description: &Description) {
        self.safely(&|l| l.test_ignored(description));
    }

    /// Deliver to every listener. Listeners that fail are dropped and their
    /// error is reported to the remaining ones.
    fn safely(&self, deliver: &dyn Fn(&dyn RunListener) -> Result<(), Error>) {
        let listeners = self.read_listeners().clone();
        let mut failed = Vec::new();
        for listener in listeners {
            let res = catch_unwind(AssertUnwindSafe(|| deliver(&*listener)))
                .unwrap_or_else(|payload| Err(Error::from_panic(payload)));
            if let Err(err) = res {
                warn!(error = %err, "removing failed listener");
                self.remove_listener(&listener);
                failed.push(err);
            }
        }
        for err in failed {
            let err = match err {
                Error::Listener(_) => err,
                other => Error::Listener(other.to_string()),
            };
            let failure = Failure::new(Description::test_mechanism(), err);
            self.safely(&|l| l.test_failure(&failure));
        }
    }

    fn read_listeners(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, Vec<Arc<dyn RunListener>>> {
        self.listeners
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_listeners(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<dyn RunListener>>> {
        self.listeners
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
