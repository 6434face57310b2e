#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The workflow graph as data: nodes, branch labels, and a transition table.

use std::fmt::Display;

use serde::Serialize;

use crate::{error::EngineError, record::EvaluationRecord};

/// A step of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Run the submission.
    Execute,
    /// Scan the source for imports, functions and classes.
    Inspect,
    /// Classify the execution error.
    AnalyzeErrors,
    /// Syntax and style stage.
    SyntaxStyle,
    /// Requirements stage.
    Requirements,
    /// Visualization stage.
    Visualization,
    /// Aggregate, render feedback and seal the record.
    Synthesize,
}

impl Node {
    /// Where every walk starts.
    pub const ENTRY: Node = Node::Execute;

    /// Where every walk ends.
    pub const TERMINAL: Node = Node::Synthesize;

    /// Every node, in declaration order.
    pub const ALL: [Node; 7] = [
        Node::Execute,
        Node::Inspect,
        Node::AnalyzeErrors,
        Node::SyntaxStyle,
        Node::Requirements,
        Node::Visualization,
        Node::Synthesize,
    ];

    /// Whether the walk stops here.
    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Node::Execute => "execute",
            Node::Inspect => "inspect",
            Node::AnalyzeErrors => "analyze-errors",
            Node::SyntaxStyle => "syntax-style",
            Node::Requirements => "requirements",
            Node::Visualization => "visualization",
            Node::Synthesize => "synthesize",
        };
        write!(f, "{name}")
    }
}

/// Outcome of a routing predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// Unconditional edge.
    Always,
    /// The submission exited with status zero.
    Succeeded,
    /// The submission failed, crashed or timed out.
    Failed,
    /// At least one visualization library was imported.
    WithVisualizations,
    /// No visualization library was imported.
    WithoutVisualizations,
}

/// `(from, branch, to)` edges. Every non-terminal node has an edge for each
/// branch its predicate can return, and every edge points forward.
pub const TRANSITIONS: &[(Node, Branch, Node)] = &[
    (Node::Execute, Branch::Always, Node::Inspect),
    (Node::Inspect, Branch::Succeeded, Node::SyntaxStyle),
    (Node::Inspect, Branch::Failed, Node::AnalyzeErrors),
    (Node::AnalyzeErrors, Branch::Always, Node::Synthesize),
    (Node::SyntaxStyle, Branch::Always, Node::Requirements),
    (Node::Requirements, Branch::WithVisualizations, Node::Visualization),
    (Node::Requirements, Branch::WithoutVisualizations, Node::Synthesize),
    (Node::Visualization, Branch::Always, Node::Synthesize),
];

/// Next node after `from` along `branch`, if such an edge exists.
pub fn successor(from: Node, branch: Branch) -> Option<Node> {
    TRANSITIONS
        .iter()
        .find(|(src, label, _)| *src == from && *label == branch)
        .map(|(_, _, to)| *to)
}

/// Picks the branch to leave `node` by. Reads the record and nothing else.
pub fn route(node: Node, record: &EvaluationRecord) -> Result<Branch, EngineError> {
    match node {
        Node::Inspect => {
            let outcome = record.execution().ok_or(EngineError::IncompleteRecord {
                node,
                field: "execution",
            })?;
            Ok(if outcome.is_success() {
                Branch::Succeeded
            } else {
                Branch::Failed
            })
        }
        Node::Requirements => {
            let metadata = record.metadata().ok_or(EngineError::IncompleteRecord {
                node,
                field: "metadata",
            })?;
            Ok(if metadata.has_visualizations() {
                Branch::WithVisualizations
            } else {
                Branch::WithoutVisualizations
            })
        }
        _ => Ok(Branch::Always),
    }
}
