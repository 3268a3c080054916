//! Trellis is a hierarchical test runner: suites contain suites and test
//! cases, test cases contain test methods, and everything in between can be
//! decorated by hooks and rules.
//!
//! ## Testing Model
//! Tests are organized as a tree of [TestClass](model::TestClass)es. A
//! class either lists member classes (a suite) or owns test methods (a test
//! case). Classes are registered explicitly with a builder:
//! ```
//! use trellis::model::TestClass;
//!
//! let calculator = TestClass::builder("Calculator")
//!     .before_all("connect", || Ok(()))
//!     .test("adds", || {
//!         assert_eq!(2 + 3, 5);
//!         Ok(())
//!     })
//!     .test("divides", || trellis::errors::fail("not implemented"))
//!     .build();
//! let all = TestClass::builder("All").suite_class(calculator).build();
//!
//! let result = trellis::launcher::run_classes(vec![all]);
//! assert_eq!(result.run_count(), 2);
//! assert_eq!(result.failure_count(), 1);
//! ```
//!
//! ## Execution
//! Every node of the tree is run by a [Runner](executor::Runner). A
//! container builds one [Statement](statement::Statement) for itself, from
//! the inside out:
//!   1. run the live children through the container's scheduler,
//!   2. wrap that in the rules that apply to the container,
//!   3. run the after-all hooks afterwards, keeping every error,
//!   4. run the before-all hooks first, stopping at the first failure.
//!
//! Rules come in three flavours: [SuiteRule](rules::SuiteRule),
//! [TestCaseRule](rules::TestCaseRule) and [MethodRule](rules::MethodRule).
//! A rule declared with [propagate](model::RuleField::propagate) also
//! applies to every container (or method) below the class that declares
//! it.
//!
//! ## Reporting
//! Runners report through a [RunNotifier](notification::RunNotifier).
//! A [RunResult](notification::RunResult) counts what ran, what was ignored
//! and what failed; a [TextListener](notification::TextListener) prints it:
//! ```text
//! ✓ adds(Calculator)
//! ✗ divides(Calculator)
//!   not implemented
//!   1 passing / 1 failing / 0 ignored (0.001s)
//! ```
//!
//! ## Filters
//! A [Filter](manipulation::Filter) selects the tests to run and a
//! [Sorter](manipulation::Sorter) orders siblings. Both can be applied to a
//! [Request](request::Request) or read from a `trellis.toml` file, see
//! [Config](config::Config).

pub mod config;
pub mod description;
pub mod errors;
pub mod executor;
pub mod launcher;
pub mod manipulation;
pub mod model;
pub mod notification;
pub mod request;
pub mod rules;
pub mod statement;

pub use description::Description;
pub use errors::Error;
pub use executor::{Computer, Runner};
pub use launcher::Core;
pub use request::Request;
