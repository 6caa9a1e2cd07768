//! Run result models
//!
//! Outcomes attached to a result tree, fail counts and run summaries.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::tree::{Node, NodeKind, Tree, TreeBuilder};

/// Outcome of a test or suite after a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(alias = "passed", alias = "Success")]
    Passed,
    #[serde(alias = "failed", alias = "Failure", alias = "Error")]
    Failed,
    #[serde(alias = "skipped", alias = "Ignored")]
    Skipped,
    #[serde(alias = "inconclusive")]
    Inconclusive,
}

impl Outcome {
    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Passed => "✓",
            Outcome::Failed => "✗",
            Outcome::Skipped => "○",
            Outcome::Inconclusive => "?",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed)
    }

    /// Outcome of an inner node that did not report one itself
    fn derive(children: &[&RunOutcome]) -> Outcome {
        let any = |o: Outcome| children.iter().any(|c| c.outcome == o);
        if any(Outcome::Failed) {
            Outcome::Failed
        } else if any(Outcome::Inconclusive) {
            Outcome::Inconclusive
        } else if any(Outcome::Passed) {
            Outcome::Passed
        } else {
            Outcome::Skipped
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed => write!(f, "PASSED"),
            Outcome::Failed => write!(f, "FAILED"),
            Outcome::Skipped => write!(f, "SKIPPED"),
            Outcome::Inconclusive => write!(f, "INCONCLUSIVE"),
        }
    }
}

/// Outcome data carried by every result node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub outcome: Outcome,
    /// Failed leaf test cases at or below this node
    pub fail_count: usize,
}

pub type ResultNode = Node<RunOutcome>;
pub type ResultTree = Tree<RunOutcome>;

impl Node<RunOutcome> {
    pub fn outcome(&self) -> Outcome {
        self.payload().outcome
    }

    pub fn fail_count(&self) -> usize {
        self.payload().fail_count
    }

    pub fn is_failed(&self) -> bool {
        self.outcome().is_failure()
    }
}

impl TreeBuilder<Option<Outcome>> {
    /// Finish a result tree, filling in fail counts and missing inner outcomes.
    ///
    /// Leaves without a reported outcome count as skipped.
    pub fn build_results(self) -> ResultTree {
        self.build_bottom_up(|node, children| {
            if node.has_children() {
                RunOutcome {
                    outcome: node.payload().unwrap_or_else(|| Outcome::derive(children)),
                    fail_count: children.iter().map(|c| c.fail_count).sum(),
                }
            } else {
                let outcome = node.payload().unwrap_or(Outcome::Skipped);
                let counts = node.kind() == NodeKind::TestMethod && outcome.is_failure();
                RunOutcome {
                    outcome,
                    fail_count: usize::from(counts),
                }
            }
        })
    }
}

/// Leaf-level tally of a result tree
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub inconclusive: usize,
}

impl RunSummary {
    pub fn from_tree(tree: &ResultTree) -> Self {
        let mut summary = RunSummary::default();
        for id in tree.leaves() {
            summary.total += 1;
            match tree[id].outcome() {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Inconclusive => summary.inconclusive += 1,
            }
        }
        summary
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | Passed: {} | Failed: {} | Skipped: {} | Inconclusive: {} | Pass Rate: {:.1}%",
            self.total,
            self.passed,
            self.failed,
            self.skipped,
            self.inconclusive,
            self.pass_rate()
        )
    }
}
