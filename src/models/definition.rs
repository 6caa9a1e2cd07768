//! Nested tree definitions
//!
//! Suite loaders and runners hand trees over in a nested form (JSON or YAML);
//! these are flattened into the arena representation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::properties::PropertyBag;
use super::test_result::{Outcome, ResultTree};
use super::tree::{Node, NodeId, NodeKind, Tree, TreeBuilder};
use crate::error::{Result, SuiteError};

pub type SuiteTree = Tree<()>;
pub type TestNode = Node<()>;

/// One node of a nested suite or result definition
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeDef {
    /// Short name, appended to the parent's full name
    pub name: String,

    /// Explicit full name, overriding the derived one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Node kind; inferred from the presence of children when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,

    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,

    /// Reported outcome; only meaningful for result trees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDef>,
}

impl NodeDef {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn suite(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Suite)
    }

    pub fn parameterized(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::ParameterizedMethod)
    }

    pub fn test(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::TestMethod)
    }

    pub fn child(mut self, child: NodeDef) -> Self {
        self.children.push(child);
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.add(key, value);
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn resolved_kind(&self) -> NodeKind {
        self.kind.unwrap_or(if self.children.is_empty() {
            NodeKind::TestMethod
        } else {
            NodeKind::Suite
        })
    }

    /// Whether this node or any descendant reports an outcome
    pub fn has_outcomes(&self) -> bool {
        self.outcome.is_some() || self.children.iter().any(NodeDef::has_outcomes)
    }

    /// Flatten into a suite tree
    pub fn into_suite_tree(self) -> Result<SuiteTree> {
        Ok(self.flatten(false, &|_| ())?.build())
    }

    /// Flatten into a result tree, computing fail counts.
    ///
    /// Repeated case names under one parameterized method are kept.
    pub fn into_result_tree(self) -> Result<ResultTree> {
        Ok(self.flatten(true, &|def| def.outcome)?.build_results())
    }

    fn flatten<T>(
        self,
        duplicate_cases: bool,
        payload: &impl Fn(&NodeDef) -> T,
    ) -> Result<TreeBuilder<T>> {
        let full_name = self.full_name.clone().unwrap_or_else(|| self.name.clone());
        let root = Node::new(full_name, self.resolved_kind(), payload(&self))
            .with_properties(self.properties);
        let mut builder = Tree::builder(root);
        if duplicate_cases {
            builder = builder.allow_duplicate_cases();
        }
        let root_id = builder.root();
        for child in self.children {
            attach(&mut builder, root_id, child, payload)?;
        }
        Ok(builder)
    }
}

fn attach<T>(
    builder: &mut TreeBuilder<T>,
    parent: NodeId,
    def: NodeDef,
    payload: &impl Fn(&NodeDef) -> T,
) -> Result<()> {
    let full_name = match &def.full_name {
        Some(name) => name.clone(),
        None => format!("{}.{}", name_prefix(builder, parent), def.name),
    };
    let node = Node::new(full_name, def.resolved_kind(), payload(&def))
        .with_properties(def.properties);
    let id = builder.add_child(parent, node)?;
    for child in def.children {
        attach(builder, id, child, payload)?;
    }
    Ok(())
}

/// Cases of a parameterized method are named after the method's fixture,
/// e.g. `Fixture.Method(1)` rather than `Fixture.Method.Method(1)`.
fn name_prefix<T>(builder: &TreeBuilder<T>, parent: NodeId) -> String {
    let Some(node) = builder.node(parent) else {
        return String::new();
    };
    let prefix_node = match node.kind() {
        NodeKind::ParameterizedMethod => node
            .parent()
            .and_then(|grandparent| builder.node(grandparent))
            .unwrap_or(node),
        _ => node,
    };
    prefix_node.full_name().to_string()
}

/// Load a nested definition from a JSON or YAML file
pub fn load_definition(path: impl AsRef<Path>) -> Result<NodeDef> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| SuiteError::io(path, e))?;

    let def: NodeDef = if is_yaml_file(path) {
        serde_yaml::from_str(&content).map_err(|e| SuiteError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| SuiteError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    debug!("Loaded definition '{}' from {}", def.name, path.display());
    Ok(def)
}

/// Load and flatten a suite tree
pub fn load_suite_tree(path: impl AsRef<Path>) -> Result<SuiteTree> {
    load_definition(path)?.into_suite_tree()
}

/// Load and flatten a result tree
pub fn load_result_tree(path: impl AsRef<Path>) -> Result<ResultTree> {
    load_definition(path)?.into_result_tree()
}

pub(crate) fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
