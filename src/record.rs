#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The evaluation record threaded through every node of the workflow.
//!
//! A record starts with only its [`Submission`] filled in. Nodes add fields
//! through the `attach_*` methods, which refuse to overwrite anything already
//! written and refuse any write once the synthesizer has sealed the record.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use bon::Builder;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    aggregate::LetterGrade,
    constants::{STYLE_MAX, SYNTAX_MAX},
    error::RecordError,
    error_analysis::ErrorCategory,
    metadata::SourceMetadata,
    rubric::Rubric,
    score::{RequirementsScore, Score, VisualizationScore},
};

/// One student's submitted program and what it is graded against.
#[derive(Debug, Clone, Builder, Serialize)]
#[builder(on(String, into))]
pub struct Submission {
    /// Who submitted it.
    student_name: String,
    /// Where the source was read from, if anywhere.
    file_path:    Option<PathBuf>,
    /// Program text.
    source:       String,
    /// Criteria for the requirements stage.
    #[builder(default)]
    rubric:       Rubric,
}

impl Submission {
    /// Reads a submission from disk, deriving the student name from the file
    /// name.
    pub fn from_path(path: impl AsRef<Path>, rubric: Rubric) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read submission {}", path.display()))?;

        Ok(Self::builder()
            .student_name(student_name_from_path(path))
            .file_path(path.to_path_buf())
            .source(source)
            .rubric(rubric)
            .build())
    }

    /// Replaces the derived student name.
    pub fn with_student_name(mut self, name: impl Into<String>) -> Self {
        self.student_name = name.into();
        self
    }

    /// Name of the submitter.
    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    /// Path the source came from.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Program text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Grading criteria.
    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }
}

/// Student name encoded in a submission file name: everything before the
/// first `_` (`alice_hw1.py` -> `alice`), or the whole file name.
pub fn student_name_from_path(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    match base.split_once('_') {
        Some((name, _)) => name.to_string(),
        None => base,
    }
}

/// How running the submission went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Exit code zero.
    Succeeded {
        /// Captured standard output.
        stdout: String,
    },
    /// Non-zero exit, timeout, or a launch failure.
    Failed {
        /// Whatever standard output was captured, possibly nothing.
        stdout: String,
        /// Standard error, or a synthetic message.
        error:  String,
    },
}

impl ExecutionOutcome {
    /// A successful run.
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self::Succeeded {
            stdout: stdout.into(),
        }
    }

    /// A failed run.
    pub fn failed(stdout: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Failed {
            stdout: stdout.into(),
            error:  error.into(),
        }
    }

    /// Whether the program exited with status zero.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Captured standard output.
    pub fn stdout(&self) -> &str {
        match self {
            Self::Succeeded { stdout } | Self::Failed { stdout, .. } => stdout,
        }
    }

    /// Error text; `None` on success.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    /// Status line used in assessor instructions.
    pub fn status_label(&self) -> &'static str {
        if self.is_success() { "Successful" } else { "Failed" }
    }
}

/// Score plus explanation for one criterion of the syntax/style stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionFeedback<const MAX: u32> {
    /// Awarded score.
    pub score:        Score<MAX>,
    /// Why.
    pub explanation:  String,
    /// Suggestions.
    pub improvements: Vec<String>,
}

/// Syntax feedback, out of 60.
pub type SyntaxFeedback = CriterionFeedback<SYNTAX_MAX>;
/// Style feedback, out of 40.
pub type StyleFeedback = CriterionFeedback<STYLE_MAX>;

/// Result of the requirements stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementsFeedback {
    /// Awarded score.
    pub score:                   RequirementsScore,
    /// Overall assessment against the rubric.
    pub overall_assessment:      String,
    /// What the submission does well.
    pub strengths:               Vec<String>,
    /// Where it falls short.
    pub weaknesses:              Vec<String>,
    /// How to close the gaps.
    pub improvement_suggestions: Vec<String>,
}

/// Result of the visualization stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualizationFeedback {
    /// Awarded score.
    pub score:                   VisualizationScore,
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

/// Which assessment stage produced a [`StageResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Syntax and style, assessed together.
    SyntaxStyle,
    /// Requirement fulfilment.
    Requirements,
    /// Visualization quality.
    Visualization,
}

impl Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::SyntaxStyle => write!(f, "syntax/style"),
            StageKind::Requirements => write!(f, "requirements"),
            StageKind::Visualization => write!(f, "visualization"),
        }
    }
}

/// What an assessment stage hands back to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    /// Both halves of the combined syntax/style call.
    SyntaxStyle {
        /// Syntax half.
        syntax: SyntaxFeedback,
        /// Style half.
        style:  StyleFeedback,
    },
    /// Requirements result.
    Requirements(RequirementsFeedback),
    /// Visualization result.
    Visualization(VisualizationFeedback),
}

impl StageResult {
    /// The stage this result belongs to.
    pub fn kind(&self) -> StageKind {
        match self {
            StageResult::SyntaxStyle { .. } => StageKind::SyntaxStyle,
            StageResult::Requirements(_) => StageKind::Requirements,
            StageResult::Visualization(_) => StageKind::Visualization,
        }
    }
}

/// Final grade written by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalAssessment {
    /// Final score, 0 to 100.
    pub score:    Score<100>,
    /// Letter grade for `score`.
    pub grade:    LetterGrade,
    /// Rendered feedback document.
    pub feedback: String,
}

/// Everything known about one submission's evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRecord {
    /// Identifier used to correlate logs.
    id:             Uuid,
    /// Input fields.
    submission:     Submission,
    /// Written by the metadata node.
    metadata:       Option<SourceMetadata>,
    /// Written by the execution node.
    execution:      Option<ExecutionOutcome>,
    /// Written by the syntax/style stage.
    syntax:         Option<SyntaxFeedback>,
    /// Written by the syntax/style stage.
    style:          Option<StyleFeedback>,
    /// Written by the requirements stage.
    requirements:   Option<RequirementsFeedback>,
    /// Written by the visualization stage; absent when it was skipped.
    visualization:  Option<VisualizationFeedback>,
    /// Written on the error-analysis path only.
    error_analysis: Option<ErrorCategory>,
    /// Written last; seals the record.
    assessment:     Option<FinalAssessment>,
}

/// Writes `value` into an empty slot.
fn fill<T>(slot: &mut Option<T>, value: T, field: &'static str) -> Result<(), RecordError> {
    if slot.is_some() {
        return Err(RecordError::AlreadySet { field });
    }
    *slot = Some(value);
    Ok(())
}

impl EvaluationRecord {
    /// A fresh record holding only the submission.
    pub fn new(submission: Submission) -> Self {
        Self {
            id: Uuid::new_v4(),
            submission,
            metadata: None,
            execution: None,
            syntax: None,
            style: None,
            requirements: None,
            visualization: None,
            error_analysis: None,
            assessment: None,
        }
    }

    /// Refuses writes after sealing.
    fn ensure_open(&self, field: &'static str) -> Result<(), RecordError> {
        if self.assessment.is_some() {
            Err(RecordError::Sealed { field })
        } else {
            Ok(())
        }
    }

    /// Records the execution outcome.
    pub(crate) fn attach_execution(&mut self, outcome: ExecutionOutcome) -> Result<(), RecordError> {
        self.ensure_open("execution")?;
        fill(&mut self.execution, outcome, "execution")
    }

    /// Records the scanned metadata.
    pub(crate) fn attach_metadata(&mut self, metadata: SourceMetadata) -> Result<(), RecordError> {
        self.ensure_open("metadata")?;
        fill(&mut self.metadata, metadata, "metadata")
    }

    /// Records the classified execution error.
    pub(crate) fn attach_error_analysis(
        &mut self,
        category: ErrorCategory,
    ) -> Result<(), RecordError> {
        self.ensure_open("error_analysis")?;
        fill(&mut self.error_analysis, category, "error_analysis")
    }

    /// Records an assessment stage result in the matching fields.
    pub(crate) fn attach_stage(&mut self, result: StageResult) -> Result<(), RecordError> {
        self.ensure_open("stage result")?;
        match result {
            StageResult::SyntaxStyle { syntax, style } => {
                if self.style.is_some() {
                    return Err(RecordError::AlreadySet { field: "style" });
                }
                fill(&mut self.syntax, syntax, "syntax")?;
                fill(&mut self.style, style, "style")
            }
            StageResult::Requirements(r) => fill(&mut self.requirements, r, "requirements"),
            StageResult::Visualization(v) => fill(&mut self.visualization, v, "visualization"),
        }
    }

    /// Writes the final assessment. Nothing can be attached afterwards.
    pub(crate) fn seal(&mut self, assessment: FinalAssessment) -> Result<(), RecordError> {
        fill(&mut self.assessment, assessment, "assessment")
    }

    /// Identifier for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Input fields.
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Shorthand for the submission's source text.
    pub fn source(&self) -> &str {
        self.submission.source()
    }

    /// Scanned metadata, once the metadata node ran.
    pub fn metadata(&self) -> Option<&SourceMetadata> {
        self.metadata.as_ref()
    }

    /// Execution outcome, once the execution node ran.
    pub fn execution(&self) -> Option<&ExecutionOutcome> {
        self.execution.as_ref()
    }

    /// `true` only when an execution outcome exists and it succeeded.
    pub fn execution_succeeded(&self) -> bool {
        self.execution.as_ref().is_some_and(ExecutionOutcome::is_success)
    }

    /// Detected visualization libraries, empty before the metadata node ran.
    pub fn visualization_libraries(&self) -> &[String] {
        self.metadata
            .as_ref()
            .map(SourceMetadata::visualization_libraries)
            .unwrap_or_default()
    }

    /// Syntax result.
    pub fn syntax(&self) -> Option<&SyntaxFeedback> {
        self.syntax.as_ref()
    }

    /// Style result.
    pub fn style(&self) -> Option<&StyleFeedback> {
        self.style.as_ref()
    }

    /// Requirements result.
    pub fn requirements(&self) -> Option<&RequirementsFeedback> {
        self.requirements.as_ref()
    }

    /// Visualization result; `None` means not applicable.
    pub fn visualization(&self) -> Option<&VisualizationFeedback> {
        self.visualization.as_ref()
    }

    /// Error category, present only when execution failed.
    pub fn error_analysis(&self) -> Option<&ErrorCategory> {
        self.error_analysis.as_ref()
    }

    /// Final assessment, present once sealed.
    pub fn assessment(&self) -> Option<&FinalAssessment> {
        self.assessment.as_ref()
    }

    /// Whether the synthesizer has written the final assessment.
    pub fn is_sealed(&self) -> bool {
        self.assessment.is_some()
    }
}
