//! Output formatters for command results
//!
//! Provides text and JSON renderings of located fixtures, run summaries and
//! parallel eligibility decisions.

use serde::Serialize;

use crate::models::{NodeId, Outcome, ResultTree, RunSummary, Tree};

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }
}

/// One located fixture as reported by the `fixtures` command
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FixtureEntry {
    pub full_name: String,
    pub cases: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
}

impl FixtureEntry {
    pub fn from_tree<T>(tree: &Tree<T>, fixture: NodeId) -> Self {
        Self {
            full_name: tree[fixture].full_name().to_string(),
            cases: tree.leaves_under(fixture).len(),
            outcome: None,
            failed: None,
        }
    }

    /// Entry that also reports the fixture's outcome and failed leaf count
    pub fn from_results(tree: &ResultTree, fixture: NodeId) -> Self {
        Self {
            outcome: Some(tree[fixture].outcome()),
            failed: Some(tree[fixture].fail_count()),
            ..Self::from_tree(tree, fixture)
        }
    }
}

/// A single parallel eligibility decision
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParallelDecision {
    pub test: String,
    pub parallel: bool,
}

/// Command result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn to_json<S: Serialize>(&self, value: &S) -> String {
        if self.format == OutputFormat::JsonPretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }

    /// Format located fixtures
    pub fn format_fixtures(&self, fixtures: &[FixtureEntry]) -> String {
        if self.format != OutputFormat::Text {
            return self.to_json(&fixtures);
        }

        if fixtures.is_empty() {
            return "No fixtures found.".to_string();
        }

        let mut output = String::new();
        for entry in fixtures {
            let symbol = entry.outcome.map(|o| self.paint_outcome(o)).unwrap_or_default();
            output.push_str(&format!(
                "{:1} {:50} {:4} cases",
                symbol, entry.full_name, entry.cases
            ));
            if let Some(failed) = entry.failed.filter(|&f| f > 0) {
                output.push_str(&format!("  {}", self.paint(&format!("{failed} failed"), RED)));
            }
            output.push('\n');
        }
        output.push_str(&format!("\n{} fixture(s)", fixtures.len()));
        output
    }

    /// Format a run summary
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Text => {
                let colour = if summary.failed > 0 { RED } else { GREEN };
                self.paint(&summary.to_string(), colour)
            }
            _ => self.to_json(summary),
        }
    }

    /// Format a parallel eligibility decision
    pub fn format_decision(&self, decision: &ParallelDecision) -> String {
        match self.format {
            OutputFormat::Text => {
                let verdict = if decision.parallel {
                    self.paint("✓ parallel", GREEN)
                } else {
                    self.paint("○ serial", YELLOW)
                };
                format!("{} {}", decision.test, verdict)
            }
            _ => self.to_json(decision),
        }
    }

    fn paint_outcome(&self, outcome: Outcome) -> String {
        let colour = match outcome {
            Outcome::Passed => GREEN,
            Outcome::Failed => RED,
            Outcome::Skipped | Outcome::Inconclusive => YELLOW,
        };
        self.paint(outcome.symbol(), colour)
    }

    fn paint(&self, text: &str, colour: &str) -> String {
        if self.colorize {
            format!("{colour}{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}
