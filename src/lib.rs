//! # gradeflow
//!
//! An autograder for Python submissions. A submission is run in a throwaway
//! directory under a hard timeout, scanned for imports and declarations, and
//! then walked through a fixed graph of assessment stages (syntax/style,
//! requirements, visualization). The stage scores are combined into a final
//! grade out of 100 with a rendered feedback document.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Weighted aggregation and letter grades
pub mod aggregate;
/// The external assessment capability
pub mod assessor;
/// Environment-driven configuration
pub mod config;
/// Fixed bounds, weights, ceilings and fallbacks
pub mod constants;
/// The workflow engine
pub mod engine;
/// Error types for the record, the stages and the engine
pub mod error;
/// Classification of execution errors
pub mod error_analysis;
/// Running submissions
pub mod executor;
/// Feedback rendering
pub mod feedback;
/// Line-level scanning of the submission
pub mod metadata;
/// For all parsers used
pub mod parsers;
/// Subprocess helpers
pub mod process;
/// The evaluation record and its parts
pub mod record;
/// Console and JSON output
pub mod report;
/// Grading criteria
pub mod rubric;
/// Bounded scores
pub mod score;
/// Assessment stages
pub mod stages;

pub use crate::{
    config::EvalConfig,
    engine::{Engine, Evaluation},
    error::EngineError,
    record::{EvaluationRecord, Submission},
    report::EvaluationReport,
    rubric::Rubric,
};
