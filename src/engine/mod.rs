#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Walks the workflow graph for one submission.
//!
//! The engine owns the record for the whole walk and lends it to one node at a
//! time. Nodes run sequentially and at most once. A stage that returns an
//! error, or a node whose write the record refuses, aborts the evaluation;
//! there is no partial result.

/// Nodes, branches and the transition table.
pub mod graph;

use std::sync::Arc;

use anyhow::Result;
use bon::Builder;
use tracing::{Instrument, debug, info, info_span, warn};

pub use self::graph::{Branch, Node, TRANSITIONS, route, successor};
use crate::{
    aggregate::{LetterGrade, SubScores},
    assessor::{Assessor, OpenAiAssessor, UnavailableAssessor},
    config::EvalConfig,
    error::{EngineError, RecordError},
    error_analysis::ErrorCategory,
    executor::{IsolatedExecutor, SourceRunner},
    feedback,
    metadata::SourceMetadata,
    record::{EvaluationRecord, FinalAssessment, StageKind, Submission},
    score::Score,
    stages::{AssessorHandle, RequirementsStage, Stage, SyntaxStyleStage, VisualizationStage},
};

/// A finished evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The sealed record.
    pub record: EvaluationRecord,
    /// Nodes visited, in order.
    pub path:   Vec<Node>,
}

impl Evaluation {
    /// The final assessment; always present on a record the engine returned.
    pub fn assessment(&self) -> Option<&FinalAssessment> {
        self.record.assessment()
    }
}

/// The workflow engine.
#[derive(Clone, Builder)]
pub struct Engine {
    /// Runs the submission.
    runner:        Arc<dyn SourceRunner>,
    /// Syntax and style stage.
    syntax_style:  Arc<dyn Stage>,
    /// Requirements stage.
    requirements:  Arc<dyn Stage>,
    /// Visualization stage.
    visualization: Arc<dyn Stage>,
}

impl Engine {
    /// Wires the built-in stages to `assessor` using the templates and
    /// timeouts from `config`.
    pub fn with_assessor(
        runner: Arc<dyn SourceRunner>,
        assessor: Arc<dyn Assessor>,
        config: &EvalConfig,
    ) -> Self {
        let handle = AssessorHandle::new(assessor, config.assessor_timeout());
        let prompts = config.prompts();

        Self::builder()
            .runner(runner)
            .syntax_style(Arc::new(SyntaxStyleStage::new(handle.clone(), prompts.syntax_style())))
            .requirements(Arc::new(RequirementsStage::new(handle.clone(), prompts.requirements())))
            .visualization(Arc::new(VisualizationStage::new(handle, prompts.visualization())))
            .build()
    }

    /// Builds the production engine: a real interpreter and the OpenAI
    /// assessor, or an always-failing assessor when no key is configured.
    pub fn from_config(config: &EvalConfig) -> Result<Self> {
        let runner = Arc::new(IsolatedExecutor::from_config(config)?);
        let assessor: Arc<dyn Assessor> = match config.openai() {
            Some(env) => Arc::new(OpenAiAssessor::new(env, config.prompts().system())?),
            None => {
                warn!("OPENAI_API_KEY is not set; every stage will use its fallback");
                Arc::new(UnavailableAssessor)
            }
        };
        Ok(Self::with_assessor(runner, assessor, config))
    }

    /// Evaluates one submission from entry to terminal.
    pub async fn evaluate(&self, submission: Submission) -> Result<Evaluation, EngineError> {
        let record = EvaluationRecord::new(submission);
        let span = info_span!(
            "evaluation",
            id = %record.id(),
            student = %record.submission().student_name()
        );
        self.walk(record).instrument(span).await
    }

    /// Visits nodes along the transition table until the terminal node.
    async fn walk(&self, mut record: EvaluationRecord) -> Result<Evaluation, EngineError> {
        let mut path = Vec::with_capacity(Node::ALL.len());
        let mut node = Node::ENTRY;

        loop {
            if path.contains(&node) {
                return Err(EngineError::NodeRevisited(node));
            }
            path.push(node);
            debug!(%node, "entering node");

            self.visit(node, &mut record).await?;
            if node.is_terminal() {
                break;
            }

            let branch = route(node, &record)?;
            node = successor(node, branch).ok_or(EngineError::MissingTransition(node))?;
        }

        Ok(Evaluation { record, path })
    }

    /// Runs one node against the record.
    async fn visit(&self, node: Node, record: &mut EvaluationRecord) -> Result<(), EngineError> {
        let refused = |source: RecordError| EngineError::Record { node, source };

        match node {
            Node::Execute => {
                let outcome = self.runner.run(record.source()).await;
                info!(status = outcome.status_label(), "execution finished");
                record.attach_execution(outcome).map_err(refused)
            }
            Node::Inspect => {
                let metadata = SourceMetadata::extract(record.source());
                info!(
                    imports = metadata.import_count(),
                    functions = metadata.function_count(),
                    classes = metadata.class_count(),
                    size_kb = metadata.size_kb(),
                    "scanned submission"
                );
                if metadata.has_visualizations() {
                    debug!(
                        libraries = ?metadata.visualization_libraries(),
                        "visualization libraries detected"
                    );
                }
                record.attach_metadata(metadata).map_err(refused)
            }
            Node::AnalyzeErrors => {
                let error = record
                    .execution()
                    .and_then(|outcome| outcome.error())
                    .ok_or(EngineError::IncompleteRecord {
                        node,
                        field: "execution",
                    })?;
                let category = ErrorCategory::classify(error);
                info!(category = %category, "execution error classified");
                record.attach_error_analysis(category).map_err(refused)
            }
            Node::SyntaxStyle => {
                self.run_stage(node, StageKind::SyntaxStyle, &self.syntax_style, record)
                    .await
            }
            Node::Requirements => {
                self.run_stage(node, StageKind::Requirements, &self.requirements, record)
                    .await
            }
            Node::Visualization => {
                self.run_stage(node, StageKind::Visualization, &self.visualization, record)
                    .await
            }
            Node::Synthesize => {
                let assessment = synthesize(record)?;
                info!(
                    score = assessment.score.value(),
                    grade = %assessment.grade,
                    "evaluation complete"
                );
                record.seal(assessment).map_err(refused)
            }
        }
    }

    /// Runs a stage and commits its result.
    async fn run_stage(
        &self,
        node: Node,
        expected: StageKind,
        stage: &Arc<dyn Stage>,
        record: &mut EvaluationRecord,
    ) -> Result<(), EngineError> {
        let result = stage
            .evaluate(record)
            .await
            .map_err(|source| EngineError::ContractViolation { node, source })?;

        if result.kind() != expected {
            return Err(EngineError::MismatchedResult {
                node,
                produced: result.kind(),
            });
        }
        record
            .attach_stage(result)
            .map_err(|source| EngineError::Record { node, source })
    }
}

/// Computes the final assessment, checking the record's completion
/// invariants first.
fn synthesize(record: &EvaluationRecord) -> Result<FinalAssessment, EngineError> {
    let node = Node::Synthesize;
    let missing = |field| EngineError::IncompleteRecord { node, field };

    let execution = record.execution().ok_or(missing("execution"))?;
    if !execution.is_success() {
        let category = record.error_analysis().ok_or(missing("error_analysis"))?;
        return Ok(FinalAssessment {
            score:    Score::saturating(0),
            grade:    LetterGrade::F,
            feedback: feedback::failure_paragraph(category),
        });
    }

    let metadata = record.metadata().ok_or(missing("metadata"))?;
    if metadata.has_visualizations() != record.visualization().is_some() {
        return Err(missing("visualization"));
    }

    let scores = SubScores::from_record(record).map_err(missing)?;
    let score = scores.final_score();
    let grade = LetterGrade::for_score(score.value());

    Ok(FinalAssessment {
        score,
        grade,
        feedback: feedback::render(record, score, grade),
    })
}
