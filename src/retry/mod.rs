//! Retry query generation
//!
//! Builds a test selection expression that re-targets exactly the failed
//! leaf tests of a finished run, e.g.
//! `test==Suite.Login.Valid | test=="Suite.Login.Locked(1)"`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::discovery::locate_matching;
use crate::error::{Result, SuiteError};
use crate::models::{NodeId, NodeKind, Outcome, ResultTree};

/// Default destination for a written retry query
pub const DEFAULT_QUERY_FILE: &str = "retry-query.txt";

const SEPARATOR: &str = " | ";

/// How names containing `(` are quoted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// `test=="A.M(1)"`
    #[default]
    Plain,
    /// `test==\"A.M(1)\"`, for passing through a shell argument
    Escaped,
}

impl QuoteStyle {
    fn quote(&self, name: &str) -> String {
        match self {
            QuoteStyle::Plain => format!("\"{name}\""),
            QuoteStyle::Escaped => format!("\\\"{name}\\\""),
        }
    }
}

/// Builds retry queries from result trees
#[derive(Clone, Copy, Debug, Default)]
pub struct RetryQueryBuilder {
    quote_style: QuoteStyle,
}

impl RetryQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote_style(mut self, quote_style: QuoteStyle) -> Self {
        self.quote_style = quote_style;
        self
    }

    /// Query selecting every failed leaf; empty when there is nothing to retry
    pub fn build(&self, run: &ResultTree) -> String {
        let Some(root) = run.root_node() else {
            return String::new();
        };
        if root.outcome() == Outcome::Passed {
            return String::new();
        }

        let fixtures = locate_matching(run, |node| node.fail_count() > 0);
        debug!(
            "Failed fixtures: [{}]",
            fixtures
                .iter()
                .map(|&id| run[id].full_name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        fixtures
            .into_iter()
            .flat_map(|fixture| self.fixture_clauses(run, fixture))
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// Distinct clauses for the failed cases directly under `fixture`
    fn fixture_clauses(&self, run: &ResultTree, fixture: NodeId) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut clauses = Vec::new();

        for &child in run[fixture].children() {
            let node = &run[child];
            let failed: Vec<NodeId> = match node.kind() {
                NodeKind::ParameterizedMethod => node
                    .children()
                    .iter()
                    .copied()
                    .filter(|&case| run[case].is_failed())
                    .collect(),
                NodeKind::TestMethod if node.is_failed() => vec![child],
                _ => Vec::new(),
            };

            for case in failed {
                let clause = self.clause(run[case].full_name());
                if seen.insert(clause.clone()) {
                    clauses.push(clause);
                }
            }
        }

        clauses
    }

    fn clause(&self, full_name: &str) -> String {
        if full_name.contains('(') {
            format!("test=={}", self.quote_style.quote(full_name))
        } else {
            format!("test=={full_name}")
        }
    }

    /// Build the query and write it to `path` when it is not empty.
    ///
    /// Returns whether a file was written.
    pub fn write_to_file(&self, run: &ResultTree, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        let query = self.build(run);
        if query.is_empty() {
            debug!("Nothing to retry, skipping {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SuiteError::io(parent, e))?;
        }
        std::fs::write(path, &query).map_err(|e| SuiteError::io(path, e))?;
        info!("Retry query written to {}", path.display());
        Ok(true)
    }
}

/// [`RetryQueryBuilder::build`] with default quoting
pub fn build_retry_query(run: &ResultTree) -> String {
    RetryQueryBuilder::new().build(run)
}
