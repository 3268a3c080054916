//! Descriptions mirror the runner tree for reporting, filtering and sorting.
//!
//! A [Description] is a plain value: it holds no reference back to the
//! runner that produced it. Runners rebuild their description from the
//! currently active filter and sorter every time one is requested.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// Display name used for failures that belong to the engine itself rather
/// than to any test, e.g. a listener that errored.
const TEST_MECHANISM: &str = "Test mechanism";

/// Immutable node of the reporting tree.
///
/// Two descriptions are equal when their display names are.
#[derive(Clone, Debug, Default)]
pub struct Description {
    display_name: String,
    children: Vec<Description>,
    metadata: Vec<String>,
}

impl Description {
    /// The description of nothing at all.
    pub const EMPTY: Description = Description {
        display_name: String::new(),
        children: Vec::new(),
        metadata: Vec::new(),
    };

    /// Description of a container: a suite or a test case.
    pub fn create_suite(
        name: impl Into<String>,
        metadata: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Description {
            display_name: name.into(),
            children: Vec::new(),
            metadata: metadata.into_iter().map(Into::into).collect(),
        }
    }

    /// Description of a single test method, displayed as `method(Class)`.
    pub fn create_test(
        class: &str,
        method: &str,
        metadata: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Description {
            display_name: format!("{}({})", method, class),
            children: Vec::new(),
            metadata: metadata.into_iter().map(Into::into).collect(),
        }
    }

    pub fn test_mechanism() -> Self {
        Description::create_suite(TEST_MECHANISM, Vec::<String>::new())
    }

    pub fn add_child(&mut self, child: Description) {
        self.children.push(child);
    }

    pub fn with_child(mut self, child: Description) -> Self {
        self.add_child(child);
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn children(&self) -> &[Description] {
        &self.children
    }

    pub fn metadata(&self) -> &[String] {
        &self.metadata
    }

    /// Leaves are tests.
    pub fn is_test(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_suite(&self) -> bool {
        !self.is_test()
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_empty() && self.children.is_empty()
    }

    /// Number of leaves below (or at) this node.
    pub fn test_count(&self) -> usize {
        if self.is_test() {
            return 1;
        }
        self.children.iter().map(Description::test_count).sum()
    }

    /// Method part of a `method(Class)` display name.
    pub fn method_name(&self) -> Option<&str> {
        self.split_name().map(|(method, _)| method)
    }

    /// Class part of a `method(Class)` display name, or the whole name for
    /// containers.
    pub fn class_name(&self) -> &str {
        self.split_name()
            .map(|(_, class)| class)
            .unwrap_or(&self.display_name)
    }

    fn split_name(&self) -> Option<(&str, &str)> {
        let name = self.display_name.strip_suffix(')')?;
        let open = name.rfind('(')?;
        Some((&name[..open], &name[open + 1..]))
    }

    /// Depth-first iterator over this node and all its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Description> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

impl PartialEq for Description {
    fn eq(&self, other: &Self) -> bool {
        self.display_name == other.display_name
    }
}

impl Eq for Description {}

impl Hash for Description {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.display_name.hash(state);
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}
