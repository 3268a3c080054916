use crate::model::TestClass;
use std::sync::Arc;

/// The containers currently being executed, root first.
///
/// A runner pushes its class when its run starts and pops it when the run
/// ends. Each scheduled child gets its own snapshot, so concurrently running
/// branches never share one stack.
#[derive(Clone, Debug, Default)]
pub struct Ancestry {
    frames: Vec<Arc<TestClass>>,
}

impl Ancestry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, class: Arc<TestClass>) {
        self.frames.push(class);
    }

    pub fn pop(&mut self) -> Option<Arc<TestClass>> {
        self.frames.pop()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Every open container, outermost first.
    pub fn root_to_leaf(&self) -> impl Iterator<Item = &Arc<TestClass>> {
        self.frames.iter()
    }

    /// The innermost open container.
    pub fn leaf(&self) -> Option<&Arc<TestClass>> {
        self.frames.last()
    }

    /// Every open container except the innermost one.
    pub fn enclosing(&self) -> &[Arc<TestClass>] {
        match self.frames.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// An independent copy for one scheduled branch.
    pub fn snapshot(&self) -> Ancestry {
        self.clone()
    }
}
