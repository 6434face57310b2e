#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Visualization quality assessment for plotting submissions.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::{AssessorHandle, Stage, execution_of, render_template};
use crate::{
    assessor::{FieldKind, FieldSpec, OutputSchema, StructuredOutput},
    constants::{
        FALLBACK_EXPLANATION, VISUALIZATION_CEILING_ON_FAILURE, VISUALIZATION_FALLBACK_FAILURE,
        VISUALIZATION_FALLBACK_SUCCESS, VISUALIZATION_MAX,
    },
    error::StageError,
    record::{EvaluationRecord, StageKind, StageResult, VisualizationFeedback},
    score::VisualizationScore,
};

/// What the assessor returns for the visualization call.
#[derive(Debug, Deserialize)]
pub struct VisualizationAssessment {
    /// Overall visualization score, out of 100.
    pub visualization_score:     VisualizationScore,
    /// Labels, titles, chart choice.
    pub clarity_assessment:      String,
    /// Whether the plots reveal anything.
    pub insight_assessment:      String,
    /// Quality of the plotting code.
    pub technical_assessment:    String,
    /// What the plots do well.
    pub strengths:               Vec<String>,
    /// How to improve them.
    pub improvement_suggestions: Vec<String>,
}

impl StructuredOutput for VisualizationAssessment {
    const SCHEMA: OutputSchema = OutputSchema {
        name:   "VisualizationEvaluation",
        fields: &[
            FieldSpec {
                name:        "visualization_score",
                kind:        FieldKind::Score {
                    max: VISUALIZATION_MAX,
                },
                description: "Overall score for visualizations out of 100 points",
            },
            FieldSpec {
                name:        "clarity_assessment",
                kind:        FieldKind::Text,
                description: "Assessment of visual clarity (labels, titles, appropriate chart \
                              types)",
            },
            FieldSpec {
                name:        "insight_assessment",
                kind:        FieldKind::Text,
                description: "Assessment of how well the visualizations generate insights",
            },
            FieldSpec {
                name:        "technical_assessment",
                kind:        FieldKind::Text,
                description: "Assessment of technical implementation of visualizations",
            },
            FieldSpec {
                name:        "strengths",
                kind:        FieldKind::TextList,
                description: "Key strengths of the visualizations",
            },
            FieldSpec {
                name:        "improvement_suggestions",
                kind:        FieldKind::TextList,
                description: "Specific suggestions to improve visualizations",
            },
        ],
    };
}

/// Assesses the quality of the submission's plots. Only reached when the
/// metadata scan found a visualization library.
pub struct VisualizationStage {
    /// Assessor to consult.
    assessor: AssessorHandle,
    /// Instruction template.
    template: String,
}

impl VisualizationStage {
    /// Creates the stage with its instruction template.
    pub fn new(assessor: AssessorHandle, template: impl Into<String>) -> Self {
        Self {
            assessor,
            template: template.into(),
        }
    }

    /// Result used when the assessor cannot be used.
    pub fn fallback(execution_succeeded: bool) -> VisualizationFeedback {
        let score = if execution_succeeded {
            VISUALIZATION_FALLBACK_SUCCESS
        } else {
            VISUALIZATION_FALLBACK_FAILURE
        };

        VisualizationFeedback {
            score:                   VisualizationScore::saturating(score),
            clarity_assessment:      FALLBACK_EXPLANATION.to_string(),
            insight_assessment:      FALLBACK_EXPLANATION.to_string(),
            technical_assessment:    FALLBACK_EXPLANATION.to_string(),
            strengths:               vec![
                "Visualization libraries were imported correctly.".to_string(),
            ],
            improvement_suggestions: vec!["Review visualization best practices.".to_string()],
        }
    }
}

#[async_trait]
impl Stage for VisualizationStage {
    fn kind(&self) -> StageKind {
        StageKind::Visualization
    }

    async fn evaluate(&self, record: &EvaluationRecord) -> Result<StageResult, StageError> {
        let execution = execution_of(record)?;
        let libraries = record.visualization_libraries();
        if libraries.is_empty() {
            return Err(StageError::Precondition(
                "no visualization libraries were detected".into(),
            ));
        }

        let succeeded = execution.is_success();
        let instruction = render_template(
            &self.template,
            &[
                ("libraries", &libraries.join(", ")),
                ("code", record.source()),
                ("execution_status", execution.status_label()),
                (
                    "format_instructions",
                    &VisualizationAssessment::SCHEMA.format_instructions(),
                ),
            ],
        );

        let feedback = match self.assessor.invoke::<VisualizationAssessment>(&instruction).await {
            Ok(a) => VisualizationFeedback {
                score:                   if succeeded {
                    a.visualization_score
                } else {
                    a.visualization_score.capped(VISUALIZATION_CEILING_ON_FAILURE)
                },
                clarity_assessment:      a.clarity_assessment,
                insight_assessment:      a.insight_assessment,
                technical_assessment:    a.technical_assessment,
                strengths:               a.strengths,
                improvement_suggestions: a.improvement_suggestions,
            },
            Err(e) => {
                warn!(stage = %self.kind(), error = %e, "assessor failed; using fallback");
                Self::fallback(succeeded)
            }
        };

        info!(visualization = %feedback.score, "visualization assessed");
        Ok(StageResult::Visualization(feedback))
    }
}
