//! The already-resolved description of a test class that the engine
//! consumes.
//!
//! The engine never discovers hooks, test methods or rules itself. A
//! [TestClass] carries them as ordered lists, built through
//! [TestClassBuilder] or by any other discovery mechanism that fills one in.

mod class;
mod method;

pub use class::{Hook, RuleField, RuleKind, TestClass, TestClassBuilder};
pub use method::{FrameworkMethod, Signature};
