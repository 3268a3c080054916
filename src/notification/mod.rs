//! Lifecycle events of a run and the listeners that consume them.

mod listener;
mod notifier;
mod result;
mod text;

pub use listener::RunListener;
pub use notifier::RunNotifier;
pub use result::{Failure, RunResult};
pub use text::TextListener;
