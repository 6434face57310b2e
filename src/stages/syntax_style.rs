#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Syntax and style assessment.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::{AssessorHandle, Stage, execution_of, render_template};
use crate::{
    assessor::{FieldKind, FieldSpec, OutputSchema, StructuredOutput},
    constants::{
        FALLBACK_EXPLANATION, STYLE_FALLBACK, STYLE_MAX, SYNTAX_CEILING_ON_FAILURE,
        SYNTAX_FALLBACK_FAILURE, SYNTAX_FALLBACK_SUCCESS, SYNTAX_MAX,
    },
    error::StageError,
    record::{EvaluationRecord, StageKind, StageResult, StyleFeedback, SyntaxFeedback},
    score::{StyleScore, SyntaxScore},
};

/// What the assessor returns for the combined syntax/style call.
#[derive(Debug, Deserialize)]
pub struct SyntaxStyleAssessment {
    /// Syntax correctness, out of 60.
    pub syntax_score:        SyntaxScore,
    /// Readability and style, out of 40.
    pub style_score:         StyleScore,
    /// Why the syntax score.
    pub syntax_feedback:     String,
    /// Why the style score.
    pub style_feedback:      String,
    /// How to fix the syntax.
    pub syntax_improvements: Vec<String>,
    /// How to improve the style.
    pub style_improvements:  Vec<String>,
}

impl StructuredOutput for SyntaxStyleAssessment {
    const SCHEMA: OutputSchema = OutputSchema {
        name:   "SyntaxStyleEvaluation",
        fields: &[
            FieldSpec {
                name:        "syntax_score",
                kind:        FieldKind::Score { max: SYNTAX_MAX },
                description: "Score for syntax correctness out of 60 points",
            },
            FieldSpec {
                name:        "style_score",
                kind:        FieldKind::Score { max: STYLE_MAX },
                description: "Score for readability and style out of 40 points",
            },
            FieldSpec {
                name:        "syntax_feedback",
                kind:        FieldKind::Text,
                description: "Explanation of the syntax score",
            },
            FieldSpec {
                name:        "style_feedback",
                kind:        FieldKind::Text,
                description: "Explanation of the style score",
            },
            FieldSpec {
                name:        "syntax_improvements",
                kind:        FieldKind::TextList,
                description: "Suggestions to improve syntax",
            },
            FieldSpec {
                name:        "style_improvements",
                kind:        FieldKind::TextList,
                description: "Suggestions to improve style",
            },
        ],
    };
}

/// Assesses syntax and style together.
pub struct SyntaxStyleStage {
    /// Assessor to consult.
    assessor: AssessorHandle,
    /// Instruction template.
    template: String,
}

impl SyntaxStyleStage {
    /// Creates the stage with its instruction template.
    pub fn new(assessor: AssessorHandle, template: impl Into<String>) -> Self {
        Self {
            assessor,
            template: template.into(),
        }
    }

    /// Result used when the assessor cannot be used.
    pub fn fallback(execution_succeeded: bool) -> StageResult {
        let syntax = if execution_succeeded {
            SYNTAX_FALLBACK_SUCCESS
        } else {
            SYNTAX_FALLBACK_FAILURE
        };

        StageResult::SyntaxStyle {
            syntax: SyntaxFeedback {
                score:        SyntaxScore::saturating(syntax),
                explanation:  FALLBACK_EXPLANATION.to_string(),
                improvements: vec!["Review your code for syntax errors.".to_string()],
            },
            style:  StyleFeedback {
                score:        StyleScore::saturating(STYLE_FALLBACK),
                explanation:  FALLBACK_EXPLANATION.to_string(),
                improvements: vec!["Review your code for style issues.".to_string()],
            },
        }
    }
}

/// Converts a decoded assessment, applying the syntax ceiling for a
/// submission that did not run.
fn into_result(assessment: SyntaxStyleAssessment, execution_succeeded: bool) -> StageResult {
    let syntax = if execution_succeeded {
        assessment.syntax_score
    } else {
        assessment.syntax_score.capped(SYNTAX_CEILING_ON_FAILURE)
    };

    StageResult::SyntaxStyle {
        syntax: SyntaxFeedback {
            score:        syntax,
            explanation:  assessment.syntax_feedback,
            improvements: assessment.syntax_improvements,
        },
        style:  StyleFeedback {
            score:        assessment.style_score,
            explanation:  assessment.style_feedback,
            improvements: assessment.style_improvements,
        },
    }
}

#[async_trait]
impl Stage for SyntaxStyleStage {
    fn kind(&self) -> StageKind {
        StageKind::SyntaxStyle
    }

    async fn evaluate(&self, record: &EvaluationRecord) -> Result<StageResult, StageError> {
        let execution = execution_of(record)?;
        let instruction = render_template(
            &self.template,
            &[
                ("code", record.source()),
                ("execution_status", execution.status_label()),
                (
                    "format_instructions",
                    &SyntaxStyleAssessment::SCHEMA.format_instructions(),
                ),
            ],
        );

        let result = match self.assessor.invoke::<SyntaxStyleAssessment>(&instruction).await {
            Ok(assessment) => into_result(assessment, execution.is_success()),
            Err(e) => {
                warn!(stage = %self.kind(), error = %e, "assessor failed; using fallback");
                Self::fallback(execution.is_success())
            }
        };

        if let StageResult::SyntaxStyle { syntax, style } = &result {
            info!(syntax = %syntax.score, style = %style.score, "syntax/style assessed");
        }
        Ok(result)
    }
}
