use super::{FrameworkMethod, Signature};
use crate::{
    errors::Error,
    rules::{MethodRule, SuiteRule, TestCaseRule},
};
use std::{fmt, sync::Arc};

/// Which lifecycle list a hook belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    BeforeAll,
    AfterAll,
    BeforeEach,
    AfterEach,
}

/// The capability a declared rule provides.
#[derive(Clone)]
pub enum RuleKind {
    Suite(Arc<dyn SuiteRule>),
    TestCase(Arc<dyn TestCaseRule>),
    Method(Arc<dyn MethodRule>),
}

/// A rule declared on a test class.
///
/// Without [RuleField::propagate] the rule is local: it applies to the
/// declaring class only. With it the rule also applies to every container
/// (or method, for method rules) below the declaring class.
#[derive(Clone)]
pub struct RuleField {
    name: String,
    rule: RuleKind,
    propagate: bool,
    public: bool,
}

impl RuleField {
    pub fn suite(
        name: impl Into<String>,
        rule: impl SuiteRule + 'static,
    ) -> Self {
        Self::new(name, RuleKind::Suite(Arc::new(rule)))
    }

    pub fn test_case(
        name: impl Into<String>,
        rule: impl TestCaseRule + 'static,
    ) -> Self {
        Self::new(name, RuleKind::TestCase(Arc::new(rule)))
    }

    pub fn method(
        name: impl Into<String>,
        rule: impl MethodRule + 'static,
    ) -> Self {
        Self::new(name, RuleKind::Method(Arc::new(rule)))
    }

    pub fn new(name: impl Into<String>, rule: RuleKind) -> Self {
        RuleField {
            name: name.into(),
            rule,
            propagate: false,
            public: true,
        }
    }

    /// Apply the rule to all descendants of the declaring class too.
    pub fn propagate(mut self) -> Self {
        self.propagate = true;
        self
    }

    /// Declared visibility of the field the rule was discovered on.
    pub fn with_visibility(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self) -> &RuleKind {
        &self.rule
    }

    pub fn is_propagated(&self) -> bool {
        self.propagate
    }

    pub fn is_public(&self) -> bool {
        self.public
    }
}

/// A test class: a suite of other classes, or a test case owning test
/// methods. Hooks and rules are kept in declaration order.
pub struct TestClass {
    name: String,
    metadata: Vec<String>,
    before_all: Vec<FrameworkMethod>,
    after_all: Vec<FrameworkMethod>,
    before_each: Vec<FrameworkMethod>,
    after_each: Vec<FrameworkMethod>,
    tests: Vec<FrameworkMethod>,
    suite_classes: Vec<Arc<TestClass>>,
    rules: Vec<RuleField>,
}

impl TestClass {
    pub fn builder(name: impl Into<String>) -> TestClassBuilder {
        TestClassBuilder {
            class: TestClass {
                name: name.into(),
                metadata: Vec::new(),
                before_all: Vec::new(),
                after_all: Vec::new(),
                before_each: Vec::new(),
                after_each: Vec::new(),
                tests: Vec::new(),
                suite_classes: Vec::new(),
                rules: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &[String] {
        &self.metadata
    }

    pub fn hooks(&self, hook: Hook) -> &[FrameworkMethod] {
        match hook {
            Hook::BeforeAll => &self.before_all,
            Hook::AfterAll => &self.after_all,
            Hook::BeforeEach => &self.before_each,
            Hook::AfterEach => &self.after_each,
        }
    }

    pub fn tests(&self) -> &[FrameworkMethod] {
        &self.tests
    }

    pub fn suite_classes(&self) -> &[Arc<TestClass>] {
        &self.suite_classes
    }

    pub fn rules(&self) -> &[RuleField] {
        &self.rules
    }

    /// A test case directly owns test methods.
    pub fn is_test_case(&self) -> bool {
        !self.tests.is_empty()
    }

    pub fn is_suite(&self) -> bool {
        !self.suite_classes.is_empty()
    }

    /// Suite rules declared here, paired with their propagation flag.
    pub fn suite_rules(&self) -> impl Iterator<Item = (&dyn SuiteRule, bool)> {
        self.rules.iter().filter_map(|field| match &field.rule {
            RuleKind::Suite(rule) => Some((rule.as_ref(), field.propagate)),
            _ => None,
        })
    }

    pub fn test_case_rules(
        &self,
    ) -> impl Iterator<Item = (&dyn TestCaseRule, bool)> {
        self.rules.iter().filter_map(|field| match &field.rule {
            RuleKind::TestCase(rule) => Some((rule.as_ref(), field.propagate)),
            _ => None,
        })
    }

    pub fn method_rules(
        &self,
    ) -> impl Iterator<Item = (&dyn MethodRule, bool)> {
        self.rules.iter().filter_map(|field| match &field.rule {
            RuleKind::Method(rule) => Some((rule.as_ref(), field.propagate)),
            _ => None,
        })
    }

    /// Rule fields must be public.
    pub fn validate_rule_fields(&self, errors: &mut Vec<String>) {
        for field in self.rules.iter().filter(|f| !f.public) {
            errors.push(format!("Rule field {} must be public", field.name));
        }
    }
}

impl fmt::Debug for TestClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TestClass")
            .field("name", &self.name)
            .field("tests", &self.tests.len())
            .field("suite_classes", &self.suite_classes.len())
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Fluent registration of a [TestClass].
///
/// ```
/// use trellis::model::TestClass;
///
/// let calculator = TestClass::builder("Calculator")
///     .before_all("start", || Ok(()))
///     .test("adds", || {
///         assert_eq!(2 + 3, 5);
///         Ok(())
///     })
///     .build();
/// assert!(calculator.is_test_case());
/// ```
pub struct TestClassBuilder {
    class: TestClass,
}

impl TestClassBuilder {
    pub fn metadata(mut self, tag: impl Into<String>) -> Self {
        self.class.metadata.push(tag.into());
        self
    }

    pub fn before_all(
        self,
        name: &str,
        body: impl Fn() -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        let method = static_method(name, body);
        self.hook(Hook::BeforeAll, method)
    }

    pub fn after_all(
        self,
        name: &str,
        body: impl Fn() -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        let method = static_method(name, body);
        self.hook(Hook::AfterAll, method)
    }

    pub fn before_each(
        self,
        name: &str,
        body: impl Fn() -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        self.hook(Hook::BeforeEach, FrameworkMethod::new(name, body))
    }

    pub fn after_each(
        self,
        name: &str,
        body: impl Fn() -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        self.hook(Hook::AfterEach, FrameworkMethod::new(name, body))
    }

    /// Register an already-built hook method, keeping its declared
    /// signature.
    pub fn hook(mut self, hook: Hook, method: FrameworkMethod) -> Self {
        match hook {
            Hook::BeforeAll => self.class.before_all.push(method),
            Hook::AfterAll => self.class.after_all.push(method),
            Hook::BeforeEach => self.class.before_each.push(method),
            Hook::AfterEach => self.class.after_each.push(method),
        }
        self
    }

    pub fn test(
        self,
        name: &str,
        body: impl Fn() -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        self.method(FrameworkMethod::new(name, body))
    }

    pub fn method(mut self, method: FrameworkMethod) -> Self {
        self.class.tests.push(method);
        self
    }

    pub fn suite_class(mut self, class: Arc<TestClass>) -> Self {
        self.class.suite_classes.push(class);
        self
    }

    pub fn suite_classes(
        mut self,
        classes: impl IntoIterator<Item = Arc<TestClass>>,
    ) -> Self {
        self.class.suite_classes.extend(classes);
        self
    }

    pub fn rule(mut self, field: RuleField) -> Self {
        self.class.rules.push(field);
        self
    }

    pub fn build(self) -> Arc<TestClass> {
        Arc::new(self.class)
    }
}

fn static_method(
    name: &str,
    body: impl Fn() -> Result<(), Error> + Send + Sync + 'static,
) -> FrameworkMethod {
    FrameworkMethod::new(name, body).with_signature(Signature::STATIC)
}
