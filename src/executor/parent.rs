use super::{Ancestry, Runner, Scheduler, Sequential};
use crate::{
    description::Description,
    errors::Error,
    manipulation::{self, Filter, Sorter},
    model::{Hook, TestClass},
    notification::{Failure, RunNotifier},
    rules::{SuiteRule, TestCaseRule},
    statement::{run_afters, run_befores, Statement},
};
use std::{
    collections::HashSet,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

/// What distinguishes one kind of container from another: the children it
/// owns and how one of them is described and run.
pub trait NodeKind: Send + Sync + Sized {
    type Child: Send + Sync;

    /// The children in declaration order, before any filter or sorter.
    fn children<'a>(&'a self, class: &'a TestClass) -> &'a [Self::Child];

    fn describe_child(
        &self,
        class: &TestClass,
        child: &Self::Child,
    ) -> Description;

    /// Run one child, reporting everything that happens to it. Only a stop
    /// request may be returned as an error.
    fn run_child(
        &self,
        class: &TestClass,
        child: &Self::Child,
        description: &Description,
        notifier: &RunNotifier,
        ancestry: &mut Ancestry,
    ) -> Result<(), Error>;

    /// Whether `child` is ignored. When every child is, the container's
    /// hooks and rules are skipped.
    fn is_ignored(&self, _child: &Self::Child) -> bool {
        false
    }

    /// Pass `filter` down to a child that is itself a container.
    fn filter_child(
        &self,
        _child: &Self::Child,
        _filter: &Arc<dyn Filter>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Pass `sorter` down to a child that is itself a container.
    fn sort_child(&self, _child: &Self::Child, _sorter: &Sorter) {}

    /// Validation specific to this kind of container.
    fn collect_initialization_errors(
        &self,
        _class: &TestClass,
        _errors: &mut Vec<String>,
    ) {
    }
}

/// Runs a container and, through its [NodeKind], all of its children.
///
/// The filter, sorter and scheduler can be replaced at any time before a
/// run. The live children, and with them the description, are recomputed
/// from the current filter and sorter every time they are needed.
pub struct ParentRunner<K: NodeKind> {
    class: Arc<TestClass>,
    kind: K,
    filter: RwLock<Option<Arc<dyn Filter>>>,
    pruned: RwLock<HashSet<usize>>,
    sorter: RwLock<Sorter>,
    scheduler: RwLock<Arc<dyn Scheduler>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl<K: NodeKind> ParentRunner<K> {
    /// Validate `class` and build a runner for it. Every problem found is
    /// reported at once.
    pub fn new(class: Arc<TestClass>, kind: K) -> Result<Self, Error> {
        let mut errors = Vec::new();
        for hook in [Hook::BeforeAll, Hook::AfterAll] {
            for method in class.hooks(hook) {
                method.validate_public_void_no_arg(true, &mut errors);
            }
        }
        class.validate_rule_fields(&mut errors);
        if class.is_test_case() && class.is_suite() {
            errors.push(format!(
                "Class {} declares both test methods and suite classes",
                class.name()
            ));
        }
        kind.collect_initialization_errors(&class, &mut errors);
        if !errors.is_empty() {
            return Err(Error::Initialization {
                class: class.name().to_string(),
                errors,
            });
        }

        Ok(ParentRunner {
            class,
            kind,
            filter: RwLock::new(None),
            pruned: RwLock::new(HashSet::new()),
            sorter: RwLock::new(Sorter::none()),
            scheduler: RwLock::new(Arc::new(Sequential)),
        })
    }

    pub fn class(&self) -> &Arc<TestClass> {
        &self.class
    }

    /// Raw children that survive the current filter, unsorted.
    fn candidates(&self) -> Vec<(&K::Child, Description)> {
        let filter = read(&self.filter).clone();
        let pruned = read(&self.pruned);
        self.kind
            .children(&self.class)
            .iter()
            .enumerate()
            .filter(|(idx, _)| !pruned.contains(idx))
            .map(|(_, child)| {
                (child, self.kind.describe_child(&self.class, child))
            })
            .filter(|(_, description)| {
                filter.as_ref().map_or(true, |f| f.should_run(description))
            })
            .collect()
    }

    /// The children that will run, in the order they will run.
    fn live_children(&self) -> Vec<(&K::Child, Description)> {
        let mut live = self.candidates();
        let sorter = read(&self.sorter).clone();
        if !sorter.is_none() {
            live.sort_by(|(_, a), (_, b)| sorter.compare(a, b));
        }
        live
    }

    fn all_children_ignored(&self, live: &[(&K::Child, Description)]) -> bool {
        live.iter().all(|(child, _)| self.kind.is_ignored(child))
    }

    /// The full statement for this container: children, rules, then
    /// after-all and before-all hooks.
    fn class_block<'a>(
        &'a self,
        notifier: &'a RunNotifier,
        ancestry: &'a Ancestry,
    ) -> Statement<'a> {
        let live = self.live_children();
        if self.all_children_ignored(&live) {
            return self.children_invoker(live, notifier, ancestry);
        }
        let statement = self.children_invoker(live, notifier, ancestry);
        let statement = self.with_rules(statement, ancestry);
        let statement = run_afters(statement, self.class.hooks(Hook::AfterAll));
        run_befores(statement, self.class.hooks(Hook::BeforeAll))
    }

    /// Wrap `base` in every rule that applies to this container, given the
    /// containers currently open above it.
    ///
    /// A test case gets its own test-case rules, then the propagated
    /// test-case rules of its ancestors. A suite gets its own suite rules
    /// and the propagated suite rules of its ancestors. Ancestors are
    /// visited root first, so the nearest one ends up outermost.
    fn with_rules<'a>(
        &'a self,
        base: Statement<'a>,
        ancestry: &'a Ancestry,
    ) -> Statement<'a> {
        let class: &'a TestClass = &self.class;
        if class.is_test_case() {
            let local = class.test_case_rules().map(|(rule, _)| rule);
            let propagated = ancestry.enclosing().iter().flat_map(|frame| {
                frame
                    .test_case_rules()
                    .filter(|(_, propagate)| *propagate)
                    .map(|(rule, _)| rule)
            });
            return base.wrap_all(
                local.chain(propagated),
                |rule: &'a dyn TestCaseRule, inner| rule.apply(inner, class),
            );
        }

        let applicable = ancestry
            .root_to_leaf()
            .filter(|frame| !frame.is_test_case())
            .flat_map(|frame| {
                let own = Arc::ptr_eq(frame, &self.class);
                frame
                    .suite_rules()
                    .filter(move |(_, propagate)| own || *propagate)
                    .map(|(rule, _)| rule)
            });
        base.wrap_all(applicable, |rule: &'a dyn SuiteRule, inner| {
            rule.apply(inner, class)
        })
    }

    fn children_invoker<'a>(
        &'a self,
        live: Vec<(&'a K::Child, Description)>,
        notifier: &'a RunNotifier,
        ancestry: &'a Ancestry,
    ) -> Statement<'a> {
        Statement::new(move || self.run_children(live, notifier, ancestry))
    }

    fn run_children<'a>(
        &'a self,
        live: Vec<(&'a K::Child, Description)>,
        notifier: &'a RunNotifier,
        ancestry: &'a Ancestry,
    ) -> Result<(), Error> {
        debug!(
            class = self.class.name(),
            children = live.len(),
            "running children"
        );
        let scheduler = read(&self.scheduler).clone();
        let mut session = scheduler.session();
        for (child, description) in live {
            session.schedule(Box::new(move || {
                let mut branch = ancestry.snapshot();
                self.kind.run_child(
                    &self.class,
                    child,
                    &description,
                    notifier,
                    &mut branch,
                )
            }))?;
        }
        session.finished()
    }
}

impl<K: NodeKind> Runner for ParentRunner<K> {
    fn description(&self) -> Description {
        let mut description =
            Description::create_suite(self.class.name(), self.class.metadata());
        for (_, child) in self.live_children() {
            description.add_child(child);
        }
        description
    }

    fn run(
        &self,
        notifier: &RunNotifier,
        ancestry: &mut Ancestry,
    ) -> Result<(), Error> {
        debug!(class = self.class.name(), depth = ancestry.len(), "entering");
        ancestry.push(self.class.clone());
        let view = ancestry.snapshot();
        let res =
            Statement::new(|| self.class_block(notifier, &view).evaluate())
                .evaluate();
        ancestry.pop();
        debug!(class = self.class.name(), ok = res.is_ok(), "leaving");

        match res {
            Ok(()) => Ok(()),
            Err(Error::StoppedByUser) => Err(Error::StoppedByUser),
            Err(err) if err.is_assumption() => {
                notifier.fire_test_ignored(&self.description());
                Ok(())
            }
            Err(err) => {
                notifier
                    .fire_test_failure(Failure::new(self.description(), err));
                Ok(())
            }
        }
    }

    fn filter(&self, filter: Arc<dyn Filter>) -> Result<(), Error> {
        let filter = match read(&self.filter).clone() {
            Some(existing) => manipulation::intersect(existing, filter),
            None => filter,
        };
        debug!(
            class = self.class.name(),
            filter = %filter.describe(),
            "applying filter"
        );

        let mut pruned = read(&self.pruned).clone();
        let mut survivors = 0;
        for (idx, child) in self.kind.children(&self.class).iter().enumerate() {
            if pruned.contains(&idx) {
                continue;
            }
            let description = self.kind.describe_child(&self.class, child);
            if !filter.should_run(&description) {
                continue;
            }
            match self.kind.filter_child(child, &filter) {
                Ok(()) => survivors += 1,
                Err(Error::NoTestsRemain) => {
                    pruned.insert(idx);
                }
                Err(err) => return Err(err),
            }
        }

        *write(&self.filter) = Some(filter);
        *write(&self.pruned) = pruned;
        if survivors == 0 {
            return Err(Error::NoTestsRemain);
        }
        Ok(())
    }

    fn sort(&self, sorter: Sorter) {
        for (child, _) in self.candidates() {
            self.kind.sort_child(child, &sorter);
        }
        *write(&self.sorter) = sorter;
    }

    fn set_scheduler(&self, scheduler: Arc<dyn Scheduler>) {
        *write(&self.scheduler) = scheduler;
    }
}
