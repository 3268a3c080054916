//! Filtering and sorting of the runner tree.
//!
//! Both work purely over [Description] values. A runner stores the filter
//! or sorter it was given and applies it lazily whenever its live children
//! are computed.

use crate::{description::Description, errors::Error, executor::Runner};
use regex::Regex;
use std::{cmp::Ordering, fmt, sync::Arc};

/// Decides which tests run.
pub trait Filter: Send + Sync {
    /// Whether `description` should run. For a container this should be
    /// `true` when any of its descendants would.
    fn should_run(&self, description: &Description) -> bool;

    /// Human-readable summary, used in "no tests found" reports.
    fn describe(&self) -> String;
}

/// Hand `filter` to `child`. Fails with [Error::NoTestsRemain] when nothing
/// below `child` survives.
pub fn apply_filter(
    filter: &Arc<dyn Filter>,
    child: &dyn Runner,
) -> Result<(), Error> {
    child.filter(filter.clone())
}

/// Lets every test through.
pub fn all() -> Arc<dyn Filter> {
    Arc::new(All)
}

/// Runs only the test (or every test under the container) equal to
/// `desired`.
pub fn matching(desired: Description) -> Arc<dyn Filter> {
    Arc::new(Matching(desired))
}

/// Runs tests whose display name matches `include` (when given) and does
/// not match `exclude` (when given).
pub fn name_pattern(
    include: Option<Regex>,
    exclude: Option<Regex>,
) -> Arc<dyn Filter> {
    Arc::new(NamePattern { include, exclude })
}

/// Runs tests accepted by both filters.
pub fn intersect(
    first: Arc<dyn Filter>,
    second: Arc<dyn Filter>,
) -> Arc<dyn Filter> {
    Arc::new(Intersect(first, second))
}

/// A container runs if any child does. Used by filters that only judge
/// leaves.
fn any_leaf(
    description: &Description,
    accept: impl Fn(&Description) -> bool,
) -> bool {
    description
        .iter()
        .filter(|d| d.is_test())
        .any(|leaf| accept(leaf))
}

struct All;

impl Filter for All {
    fn should_run(&self, _: &Description) -> bool {
        true
    }

    fn describe(&self) -> String {
        "all tests".to_string()
    }
}

struct Matching(Description);

impl Filter for Matching {
    fn should_run(&self, description: &Description) -> bool {
        any_leaf(description, |leaf| leaf == &self.0)
            || description == &self.0
    }

    fn describe(&self) -> String {
        format!("Method {}", self.0.display_name())
    }
}

struct NamePattern {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl Filter for NamePattern {
    fn should_run(&self, description: &Description) -> bool {
        any_leaf(description, |leaf| {
            let name = leaf.display_name();
            self.include.as_ref().map_or(true, |inc| inc.is_match(name))
                && !self.exclude.as_ref().map_or(false, |ex| ex.is_match(name))
        })
    }

    fn describe(&self) -> String {
        let show = |re: &Option<Regex>| {
            re.as_ref().map_or("-".to_string(), |re| re.as_str().to_string())
        };
        format!(
            "include {} exclude {}",
            show(&self.include),
            show(&self.exclude)
        )
    }
}

struct Intersect(Arc<dyn Filter>, Arc<dyn Filter>);

impl Filter for Intersect {
    fn should_run(&self, description: &Description) -> bool {
        if description.is_test() {
            return self.0.should_run(description)
                && self.1.should_run(description);
        }
        description.children().iter().any(|child| self.should_run(child))
    }

    fn describe(&self) -> String {
        format!("{} and {}", self.0.describe(), self.1.describe())
    }
}

type Comparator = dyn Fn(&Description, &Description) -> Ordering + Send + Sync;

/// Orders siblings by comparing their descriptions. The default sorter
/// compares everything as equal, which with a stable sort keeps declaration
/// order.
#[derive(Clone, Default)]
pub struct Sorter {
    comparator: Option<Arc<Comparator>>,
}

impl Sorter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(
        comparator: impl Fn(&Description, &Description) -> Ordering
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Sorter {
            comparator: Some(Arc::new(comparator)),
        }
    }

    /// Ascending by display name.
    pub fn by_name() -> Self {
        Sorter::new(|a, b| a.display_name().cmp(b.display_name()))
    }

    /// The exact reverse of this order. Reversing the identity sorter leaves
    /// it the identity.
    pub fn reversed(&self) -> Self {
        match &self.comparator {
            None => Sorter::none(),
            Some(cmp) => {
                let cmp = cmp.clone();
                Sorter::new(move |a, b| cmp(b, a))
            }
        }
    }

    pub fn is_none(&self) -> bool {
        self.comparator.is_none()
    }

    pub fn compare(&self, a: &Description, b: &Description) -> Ordering {
        self.comparator
            .as_ref()
            .map_or(Ordering::Equal, |cmp| cmp(a, b))
    }

    /// Hand this sorter to `child`.
    pub fn apply(&self, child: &dyn Runner) {
        child.sort(self.clone());
    }
}

impl fmt::Debug for Sorter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.comparator {
            None => write!(f, "Sorter(none)"),
            Some(_) => write!(f, "Sorter(..)"),
        }
    }
}
