//! Suite Inspector - test suite tree tooling
//!
//! Works on the hierarchical definition of a test suite (suites, fixtures,
//! parameterized methods and test cases) and on the result tree of a
//! finished run.
//!
//! ## Features
//!
//! - Locate fixtures, the lowest suites that directly hold test cases
//! - Export every leaf test with the properties it inherits from its ancestors
//! - Build a selection query that re-runs exactly the failed tests
//! - Decide whether a test may run concurrently with its siblings, from
//!   declared scopes and a live scheduler snapshot
//!
//! ## Example
//!
//! ```
//! use suite_inspector::models::{NodeDef, Outcome};
//! use suite_inspector::retry::build_retry_query;
//!
//! let run = NodeDef::suite("Suite")
//!     .child(
//!         NodeDef::suite("Login")
//!             .child(NodeDef::test("Valid").outcome(Outcome::Passed))
//!             .child(NodeDef::test("Locked").outcome(Outcome::Failed)),
//!     )
//!     .into_result_tree()
//!     .unwrap();
//!
//! assert_eq!(build_retry_query(&run), "test==Suite.Login.Locked");
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod models;
pub mod output;
pub mod parallel;
pub mod retry;
pub mod utils;

pub use error::{Result, SuiteError};
