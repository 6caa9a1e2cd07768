//! Tree models for suite definitions and run results
//!
//! Nodes live in an arena and reference their parent by index; see
//! [`Tree`].

mod definition;
mod properties;
mod test_result;
mod tree;

pub use definition::{
    load_definition, load_result_tree, load_suite_tree, NodeDef, SuiteTree, TestNode,
};
pub use properties::{keys, PropertyBag};
pub use test_result::{Outcome, ResultNode, ResultTree, RunOutcome, RunSummary};
pub use tree::{Ancestors, Node, NodeId, NodeKind, Tree, TreeBuilder};

pub(crate) use definition::is_yaml_file;
