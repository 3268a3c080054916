use super::{Ancestry, NodeKind, ParentRunner};
use crate::{
    description::Description,
    errors::Error,
    model::{FrameworkMethod, Hook, TestClass},
    notification::{Failure, RunNotifier},
    rules::MethodRule,
    statement::{invoke, run_afters, run_befores, Statement},
};
use std::sync::Arc;
use tracing::trace;

/// A container whose children are the test methods of its class.
#[derive(Clone, Copy, Debug, Default)]
pub struct TestCaseKind;

/// Runs the test methods of a test case class.
pub type TestCaseRunner = ParentRunner<TestCaseKind>;

impl ParentRunner<TestCaseKind> {
    pub fn test_case(class: Arc<TestClass>) -> Result<Self, Error> {
        ParentRunner::new(class, TestCaseKind)
    }
}

impl TestCaseKind {
    /// The statement for one method: the body inside its before-each and
    /// after-each hooks, wrapped by the class's own method rules and then
    /// by the propagated method rules of enclosing containers, root first.
    fn method_block<'a>(
        class: &'a TestClass,
        method: &'a FrameworkMethod,
        description: &'a Description,
        ancestry: &'a Ancestry,
    ) -> Statement<'a> {
        let statement = invoke(method);
        let statement = run_befores(statement, class.hooks(Hook::BeforeEach));
        let statement = run_afters(statement, class.hooks(Hook::AfterEach));

        let local = class.method_rules().map(|(rule, _)| rule);
        let propagated = ancestry.enclosing().iter().flat_map(|frame| {
            frame
                .method_rules()
                .filter(|(_, propagate)| *propagate)
                .map(|(rule, _)| rule)
        });
        statement.wrap_all(
            local.chain(propagated),
            |rule: &'a dyn MethodRule, inner| {
                rule.apply(inner, method, description)
            },
        )
    }
}

impl NodeKind for TestCaseKind {
    type Child = FrameworkMethod;

    fn children<'a>(&'a self, class: &'a TestClass) -> &'a [Self::Child] {
        class.tests()
    }

    fn describe_child(
        &self,
        class: &TestClass,
        method: &FrameworkMethod,
    ) -> Description {
        Description::create_test(class.name(), method.name(), method.metadata())
    }

    fn run_child(
        &self,
        class: &TestClass,
        method: &FrameworkMethod,
        description: &Description,
        notifier: &RunNotifier,
        ancestry: &mut Ancestry,
    ) -> Result<(), Error> {
        if method.is_ignored() {
            trace!(
                test = description.display_name(),
                reason = method.ignore_reason().unwrap_or_default(),
                "ignored"
            );
            notifier.fire_test_ignored(description);
            return Ok(());
        }

        notifier.fire_test_started(description)?;
        trace!(test = description.display_name(), "started");
        let ancestry: &Ancestry = ancestry;
        let res = Statement::new(|| {
            Self::method_block(class, method, description, ancestry).evaluate()
        })
        .evaluate();
        match res {
            Ok(()) => {}
            Err(Error::StoppedByUser) => return Err(Error::StoppedByUser),
            Err(err) if err.is_assumption() => {
                notifier.fire_test_ignored(description)
            }
            Err(err) => notifier
                .fire_test_failure(Failure::new(description.clone(), err)),
        }
        notifier.fire_test_finished(description);
        Ok(())
    }

    fn is_ignored(&self, method: &FrameworkMethod) -> bool {
        method.is_ignored()
    }

    fn collect_initialization_errors(
        &self,
        class: &TestClass,
        errors: &mut Vec<String>,
    ) {
        for hook in [Hook::BeforeEach, Hook::AfterEach] {
            for method in class.hooks(hook) {
                method.validate_public_void_no_arg(false, errors);
            }
        }
        for method in class.tests() {
            method.validate_public_void_no_arg(false, errors);
        }
        if class.tests().is_empty() {
            errors.push("No runnable methods".to_string());
        }
    }
}
