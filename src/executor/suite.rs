use super::{Ancestry, NodeKind, ParentRunner, Runner};
use crate::{
    description::Description,
    errors::Error,
    manipulation::{self, Filter, Sorter},
    model::TestClass,
    notification::RunNotifier,
};
use std::sync::Arc;

/// A container whose children are the runners of other classes.
pub struct SuiteKind {
    runners: Vec<Box<dyn Runner>>,
}

/// Runs a suite class.
pub type SuiteRunner = ParentRunner<SuiteKind>;

impl ParentRunner<SuiteKind> {
    /// A suite for `class` whose children are `runners`, already built for
    /// the suite's member classes.
    pub fn suite(
        class: Arc<TestClass>,
        runners: Vec<Box<dyn Runner>>,
    ) -> Result<Self, Error> {
        ParentRunner::new(class, SuiteKind { runners })
    }
}

impl NodeKind for SuiteKind {
    type Child = Box<dyn Runner>;

    fn children<'a>(&'a self, _class: &'a TestClass) -> &'a [Self::Child] {
        &self.runners
    }

    fn describe_child(
        &self,
        _class: &TestClass,
        child: &Self::Child,
    ) -> Description {
        child.description()
    }

    fn run_child(
        &self,
        _class: &TestClass,
        child: &Self::Child,
        _description: &Description,
        notifier: &RunNotifier,
        ancestry: &mut Ancestry,
    ) -> Result<(), Error> {
        child.run(notifier, ancestry)
    }

    fn filter_child(
        &self,
        child: &Self::Child,
        filter: &Arc<dyn Filter>,
    ) -> Result<(), Error> {
        manipulation::apply_filter(filter, child.as_ref())
    }

    fn sort_child(&self, child: &Self::Child, sorter: &Sorter) {
        sorter.apply(child.as_ref());
    }
}
