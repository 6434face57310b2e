#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Requirements fulfilment assessment against the rubric.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::{AssessorHandle, Stage, execution_of, render_template};
use crate::{
    assessor::{FieldKind, FieldSpec, OutputSchema, StructuredOutput},
    constants::{
        FALLBACK_EXPLANATION, REQUIREMENTS_CEILING_ON_FAILURE, REQUIREMENTS_FALLBACK_FAILURE,
        REQUIREMENTS_FALLBACK_SUCCESS, REQUIREMENTS_MAX,
    },
    error::StageError,
    record::{EvaluationRecord, RequirementsFeedback, StageKind, StageResult},
    score::RequirementsScore,
};

/// What the assessor returns for the requirements call.
#[derive(Debug, Deserialize)]
pub struct RequirementsAssessment {
    /// Fulfilment score, out of 100.
    pub requirements_score:      RequirementsScore,
    /// Overall verdict.
    pub overall_assessment:      String,
    /// What the submission gets right.
    pub strengths:               Vec<String>,
    /// What it misses.
    pub weaknesses:              Vec<String>,
    /// How to close the gaps.
    pub improvement_suggestions: Vec<String>,
}

impl StructuredOutput for RequirementsAssessment {
    const SCHEMA: OutputSchema = OutputSchema {
        name:   "RequirementsEvaluation",
        fields: &[
            FieldSpec {
                name:        "requirements_score",
                kind:        FieldKind::Score {
                    max: REQUIREMENTS_MAX,
                },
                description: "Overall score for requirements fulfillment out of 100 points",
            },
            FieldSpec {
                name:        "overall_assessment",
                kind:        FieldKind::Text,
                description: "Overall assessment of how well the code meets requirements",
            },
            FieldSpec {
                name:        "strengths",
                kind:        FieldKind::TextList,
                description: "Key strengths of the code regarding requirements",
            },
            FieldSpec {
                name:        "weaknesses",
                kind:        FieldKind::TextList,
                description: "Key weaknesses of the code regarding requirements",
            },
            FieldSpec {
                name:        "improvement_suggestions",
                kind:        FieldKind::TextList,
                description: "Specific suggestions to better meet requirements",
            },
        ],
    };
}

/// Assesses how well the submission meets its rubric.
pub struct RequirementsStage {
    /// Assessor to consult.
    assessor: AssessorHandle,
    /// Instruction template.
    template: String,
}

impl RequirementsStage {
    /// Creates the stage with its instruction template.
    pub fn new(assessor: AssessorHandle, template: impl Into<String>) -> Self {
        Self {
            assessor,
            template: template.into(),
        }
    }

    /// Result used when the assessor cannot be used.
    pub fn fallback(execution_succeeded: bool) -> RequirementsFeedback {
        let score = if execution_succeeded {
            REQUIREMENTS_FALLBACK_SUCCESS
        } else {
            REQUIREMENTS_FALLBACK_FAILURE
        };

        RequirementsFeedback {
            score:                   RequirementsScore::saturating(score),
            overall_assessment:      FALLBACK_EXPLANATION.to_string(),
            strengths:               vec!["N/A".to_string()],
            weaknesses:              vec!["N/A".to_string()],
            improvement_suggestions: vec![
                "Review assignment requirements and ensure your code addresses them.".to_string(),
            ],
        }
    }
}

#[async_trait]
impl Stage for RequirementsStage {
    fn kind(&self) -> StageKind {
        StageKind::Requirements
    }

    async fn evaluate(&self, record: &EvaluationRecord) -> Result<StageResult, StageError> {
        let execution = execution_of(record)?;
        let succeeded = execution.is_success();
        let instruction = render_template(
            &self.template,
            &[
                ("requirements_text", &record.submission().rubric().render()),
                ("code", record.source()),
                ("execution_status", execution.status_label()),
                (
                    "format_instructions",
                    &RequirementsAssessment::SCHEMA.format_instructions(),
                ),
            ],
        );

        let feedback = match self.assessor.invoke::<RequirementsAssessment>(&instruction).await {
            Ok(a) => RequirementsFeedback {
                score:                   if succeeded {
                    a.requirements_score
                } else {
                    a.requirements_score.capped(REQUIREMENTS_CEILING_ON_FAILURE)
                },
                overall_assessment:      a.overall_assessment,
                strengths:               a.strengths,
                weaknesses:              a.weaknesses,
                improvement_suggestions: a.improvement_suggestions,
            },
            Err(e) => {
                warn!(stage = %self.kind(), error = %e, "assessor failed; using fallback");
                Self::fallback(succeeded)
            }
        };

        info!(requirements = %feedback.score, "requirements assessed");
        Ok(StageResult::Requirements(feedback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_scores() {
        let ok = RequirementsStage::fallback(true);
        assert_eq!(ok.score.value(), 50);
        assert_eq!(ok.strengths, vec!["N/A".to_string()]);
        assert_eq!(RequirementsStage::fallback(false).score.value(), 30);
    }
}
