#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Errors that can end an evaluation.
//!
//! Execution failures and assessor failures never show up here: the first is
//! routed to the error-analysis path, the second is absorbed by the stage's
//! fallback. What remains is a broken contract somewhere in the workflow.

use thiserror::Error;

use crate::{engine::Node, record::StageKind};

/// A write the evaluation record refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The field was already written by an earlier node.
    #[error("record field `{field}` is already set")]
    AlreadySet {
        /// Field name.
        field: &'static str,
    },
    /// The synthesizer already sealed the record.
    #[error("record is sealed; cannot write `{field}`")]
    Sealed {
        /// Field name.
        field: &'static str,
    },
}

/// Raised by a stage implementation that could not produce a result.
///
/// Built-in stages never return this; they fall back instead.
#[derive(Error, Debug)]
pub enum StageError {
    /// A precondition the stage relies on does not hold.
    #[error("stage precondition failed: {0}")]
    Precondition(String),
    /// Anything else.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Fatal conditions that abort an evaluation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A stage returned an error despite its no-raise contract.
    #[error("{node} stage broke its contract: {source}")]
    ContractViolation {
        /// Node that was running.
        node:   Node,
        /// What the stage reported.
        source: StageError,
    },
    /// A stage returned a result for a different stage.
    #[error("{node} produced a {produced} result")]
    MismatchedResult {
        /// Node that was running.
        node:     Node,
        /// What it produced instead.
        produced: StageKind,
    },
    /// A node wrote to the record in a way the record refused.
    #[error("{node} could not update the record: {source}")]
    Record {
        /// Node that was running.
        node:   Node,
        /// The refused write.
        source: RecordError,
    },
    /// The walk reached a node a second time.
    #[error("{0} was reached twice")]
    NodeRevisited(Node),
    /// No edge leaves a non-terminal node for the chosen branch.
    #[error("no transition out of {0}")]
    MissingTransition(Node),
    /// A node ran before the fields it reads were written.
    #[error("{node} requires `{field}`, which is not set")]
    IncompleteRecord {
        /// Node that was running.
        node:  Node,
        /// Missing field.
        field: &'static str,
    },
}
