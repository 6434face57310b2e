#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Assessment stages.
//!
//! Each stage asks the assessor for one structured result, enforces its score
//! bounds and the ceiling that applies when the submission did not run, and
//! falls back to a fixed conservative result when the assessor fails. Stages
//! therefore never return an error in normal operation; an `Err` from
//! [`Stage::evaluate`] means a precondition the engine should have ensured
//! does not hold.

/// Requirement fulfilment.
pub mod requirements;
/// Syntax correctness and style, assessed in one call.
pub mod syntax_style;
/// Visualization quality.
pub mod visualization;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

pub use self::{
    requirements::RequirementsStage, syntax_style::SyntaxStyleStage,
    visualization::VisualizationStage,
};
use crate::{
    assessor::{Assessor, AssessorError, StructuredOutput, decode},
    error::StageError,
    record::{EvaluationRecord, ExecutionOutcome, StageKind, StageResult},
};

/// One assessment step of the workflow.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Which result this stage produces.
    fn kind(&self) -> StageKind;

    /// Assesses the submission in `record`.
    async fn evaluate(&self, record: &EvaluationRecord) -> Result<StageResult, StageError>;
}

/// An assessor plus the time the caller is willing to wait for it.
#[derive(Clone)]
pub struct AssessorHandle {
    /// The capability itself.
    assessor: Arc<dyn Assessor>,
    /// Per-call limit.
    timeout:  Duration,
}

impl AssessorHandle {
    /// Wraps `assessor` with a per-call `timeout`.
    pub fn new(assessor: Arc<dyn Assessor>, timeout: Duration) -> Self {
        Self { assessor, timeout }
    }

    /// Sends `instruction` and decodes the reply as `T`.
    pub async fn invoke<T: StructuredOutput>(&self, instruction: &str) -> Result<T, AssessorError> {
        let reply = tokio::time::timeout(self.timeout, self.assessor.assess(instruction, &T::SCHEMA))
            .await
            .map_err(|_| AssessorError::TimedOut(self.timeout))??;
        decode(reply)
    }
}

/// Fills `{name}` placeholders in `template` in a single pass. Substituted
/// text is never scanned again, so braces inside student code are left alone.
/// Unknown placeholders are kept verbatim.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}');
        let replacement = close.and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Reads the execution outcome every stage depends on.
pub(crate) fn execution_of(record: &EvaluationRecord) -> Result<&ExecutionOutcome, StageError> {
    record
        .execution()
        .ok_or_else(|| StageError::Precondition("execution outcome is not recorded".into()))
}
