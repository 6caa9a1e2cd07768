//! Arena-backed test trees
//!
//! Suite definitions and run results share one tree shape: nodes live in a
//! flat arena, addressed by [`NodeId`], each carrying an explicit parent index.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use super::properties::PropertyBag;
use crate::error::{Result, SuiteError};

/// Opaque index of a node inside its [`Tree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural kind of a node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(
        alias = "TestSuite",
        alias = "TestFixture",
        alias = "SetUpFixture",
        alias = "Assembly",
        alias = "ParameterizedFixture",
        alias = "GenericFixture"
    )]
    Suite,
    #[serde(alias = "Theory")]
    ParameterizedMethod,
    TestMethod,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Suite => "Suite",
            NodeKind::ParameterizedMethod => "ParameterizedMethod",
            NodeKind::TestMethod => "TestMethod",
        }
    }

    /// Whether nodes of this kind make their parent a fixture
    pub fn is_test_case(&self) -> bool {
        matches!(self, NodeKind::ParameterizedMethod | NodeKind::TestMethod)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single tree node; `T` carries per-tree data such as run outcomes
#[derive(Clone, Debug)]
pub struct Node<T> {
    full_name: String,
    kind: NodeKind,
    properties: PropertyBag,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    payload: T,
}

impl<T> Node<T> {
    pub fn new(full_name: impl Into<String>, kind: NodeKind, payload: T) -> Self {
        Self {
            full_name: full_name.into(),
            kind,
            properties: PropertyBag::new(),
            parent: None,
            children: Vec::new(),
            payload,
        }
    }

    pub fn with_properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// A test case with no children; only these produce export rows
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::TestMethod && self.children.is_empty()
    }

    pub(crate) fn map_payload<U>(self, payload: U) -> Node<U> {
        Node {
            full_name: self.full_name,
            kind: self.kind,
            properties: self.properties,
            parent: self.parent,
            children: self.children,
            payload,
        }
    }
}

/// Immutable arena of nodes
#[derive(Clone, Debug)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
    by_name: HashMap<String, NodeId>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<T> Tree<T> {
    /// Tree with no nodes
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a tree from its root node
    pub fn builder(root: Node<T>) -> TreeBuilder<T> {
        TreeBuilder::new(root)
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn root_node(&self) -> Option<&Node<T>> {
        self.nodes.first()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.0)
    }

    /// Look up a node by full name
    pub fn find(&self, full_name: &str) -> Option<NodeId> {
        self.by_name.get(full_name).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn first_child(&self, id: NodeId) -> Option<&Node<T>> {
        self.get(id)
            .and_then(|n| n.children.first())
            .map(|&child| &self[child])
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, T> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Leaf test cases below `id` (inclusive), in pre-order
    pub fn leaves_under(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        self.collect_leaves(id, &mut leaves);
        leaves
    }

    /// Every leaf test case in the tree, in pre-order
    pub fn leaves(&self) -> Vec<NodeId> {
        self.root()
            .map(|root| self.leaves_under(root))
            .unwrap_or_default()
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let node = &self[id];
        if node.is_leaf() {
            out.push(id);
        }
        for &child in &node.children {
            self.collect_leaves(child, out);
        }
    }
}

impl<T> Index<NodeId> for Tree<T> {
    type Output = Node<T>;

    fn index(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.0]
    }
}

/// Iterator over a node's ancestors
pub struct Ancestors<'a, T> {
    tree: &'a Tree<T>,
    next: Option<NodeId>,
}

impl<'a, T> Iterator for Ancestors<'a, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Appends nodes to a tree while checking its invariants.
///
/// Children always receive a higher index than their parent, so arena order
/// is a valid pre-order only when children are added depth-first; bottom-up
/// passes rely solely on the parent-before-child property.
pub struct TreeBuilder<T> {
    tree: Tree<T>,
    allow_duplicate_cases: bool,
}

impl<T> TreeBuilder<T> {
    pub fn new(root: Node<T>) -> Self {
        let mut tree = Tree::empty();
        tree.by_name.insert(root.full_name.clone(), NodeId(0));
        tree.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            ..root
        });
        Self {
            tree,
            allow_duplicate_cases: false,
        }
    }

    /// Accept repeated case names under a parameterized method.
    ///
    /// Runners report one result per case instance, so overloaded methods
    /// can yield the same case name twice; [`Tree::find`] returns the first.
    pub fn allow_duplicate_cases(mut self) -> Self {
        self.allow_duplicate_cases = true;
        self
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Attach `node` as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, node: Node<T>) -> Result<NodeId> {
        let parent_node = self
            .tree
            .nodes
            .get(parent.0)
            .ok_or(SuiteError::UnknownNode(parent.0))?;

        if parent_node.kind == NodeKind::ParameterizedMethod && node.kind != NodeKind::TestMethod {
            return Err(SuiteError::InvalidChildKind {
                parent: parent_node.full_name.clone(),
                child: node.full_name,
                kind: node.kind,
            });
        }
        let repeated_case = self.allow_duplicate_cases
            && parent_node.kind == NodeKind::ParameterizedMethod
            && node.kind == NodeKind::TestMethod;
        if self.tree.by_name.contains_key(&node.full_name) && !repeated_case {
            return Err(SuiteError::DuplicateFullName(node.full_name));
        }

        let id = NodeId(self.tree.nodes.len());
        self.tree
            .by_name
            .entry(node.full_name.clone())
            .or_insert(id);
        self.tree.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            ..node
        });
        self.tree.nodes[parent.0].children.push(id);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.tree.get(id)
    }

    pub fn build(self) -> Tree<T> {
        self.tree
    }

    /// Rebuild the tree with payloads computed bottom-up.
    ///
    /// `f` receives each node together with the already computed payloads
    /// of its children.
    pub(crate) fn build_bottom_up<U>(self, f: impl Fn(&Node<T>, &[&U]) -> U) -> Tree<U> {
        let nodes = self.tree.nodes;
        let mut payloads: Vec<Option<U>> = (0..nodes.len()).map(|_| None).collect();

        for i in (0..nodes.len()).rev() {
            let child_payloads: Vec<&U> = nodes[i]
                .children
                .iter()
                .filter_map(|c| payloads[c.0].as_ref())
                .collect();
            let payload = f(&nodes[i], &child_payloads);
            payloads[i] = Some(payload);
        }

        let nodes = nodes
            .into_iter()
            .zip(payloads)
            .filter_map(|(node, payload)| payload.map(|p| node.map_payload(p)))
            .collect();

        Tree {
            nodes,
            by_name: self.tree.by_name,
        }
    }
}
