//! Property export
//!
//! Flattens a suite tree into one row per leaf test case, annotated with the
//! properties each case inherits from its ancestors.

mod table;

pub use table::{ExportTable, DEFAULT_EXPORT_FILE, FULL_NAME_HEADER, KIND_HEADER};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::discovery::locate_fixtures;
use crate::models::{keys, Node, NodeId, PropertyBag, Tree};

/// How multiple values of one property are rendered in a single cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRule {
    /// Values written back to back
    Concat,
    /// One value per line
    Lines,
}

impl JoinRule {
    pub fn join(&self, values: &[String]) -> String {
        match self {
            JoinRule::Concat => values.concat(),
            JoinRule::Lines => values.join("\n"),
        }
    }
}

/// Builds [`ExportTable`]s for a fixed list of property keys
#[derive(Clone, Debug)]
pub struct PropertyExporter {
    keys: Vec<String>,
    rules: HashMap<String, JoinRule>,
}

impl PropertyExporter {
    /// Exporter for `keys`, in column order; `Category` values are newline-joined
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            rules: HashMap::from([(keys::CATEGORY.to_string(), JoinRule::Lines)]),
        }
    }

    /// Override the join rule of one key
    pub fn with_rule(mut self, key: impl Into<String>, rule: JoinRule) -> Self {
        self.rules.insert(key.into(), rule);
        self
    }

    /// Use `key` instead of `Category` as the newline-joined key
    pub fn with_category_key(mut self, key: impl Into<String>) -> Self {
        self.rules.remove(keys::CATEGORY);
        self.with_rule(key, JoinRule::Lines)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn rule_for(&self, key: &str) -> JoinRule {
        self.rules.get(key).copied().unwrap_or(JoinRule::Concat)
    }

    /// Build the export table for every fixture of `tree`
    pub fn build<T>(&self, tree: &Tree<T>) -> ExportTable {
        let mut table = ExportTable::new(self.header());

        let fixtures = locate_fixtures(tree);
        info!("Number of discovered fixtures: {}", fixtures.len());

        for fixture in fixtures {
            let inherited = inherited_bag(tree, fixture);
            self.visit(tree, fixture, &inherited, &mut table);
            debug!("Fixture processed: '{}'", tree[fixture].full_name());
        }

        table
    }

    fn header(&self) -> Vec<String> {
        let mut header = vec![FULL_NAME_HEADER.to_string(), KIND_HEADER.to_string()];
        header.extend(self.keys.iter().cloned());
        trim_trailing_empty(&mut header);
        header
    }

    fn visit<T>(&self, tree: &Tree<T>, id: NodeId, inherited: &PropertyBag, table: &mut ExportTable) {
        let node = &tree[id];
        let effective = inherited.merge(node.properties());

        if node.is_leaf() {
            table.push_row(self.row(node, &effective));
            return;
        }
        for &child in node.children() {
            self.visit(tree, child, &effective, table);
        }
    }

    fn row<T>(&self, node: &Node<T>, bag: &PropertyBag) -> Vec<String> {
        let mut cells = vec![node.full_name().to_string(), node.kind().to_string()];
        for key in &self.keys {
            let value = bag
                .get(key)
                .map(|values| self.rule_for(key).join(values))
                .unwrap_or_default();
            cells.push(quote(&value));
        }
        trim_trailing_empty(&mut cells);
        cells
    }
}

/// Effective bag of everything above `id`, merged root first
pub fn inherited_bag<T>(tree: &Tree<T>, id: NodeId) -> PropertyBag {
    let mut path: Vec<NodeId> = tree.ancestors(id).collect();
    path.reverse();
    path.into_iter()
        .fold(PropertyBag::new(), |bag, ancestor| {
            bag.merge(tree[ancestor].properties())
        })
}

/// Effective bag of `id` itself
pub fn effective_bag<T>(tree: &Tree<T>, id: NodeId) -> PropertyBag {
    inherited_bag(tree, id).merge(tree[id].properties())
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn trim_trailing_empty(cells: &mut Vec<String>) {
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
}
