//! End-to-end walks of the workflow with a canned runner and scripted
//! assessor.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{FakeRunner, Reply, ScriptedAssessor, config, requirements, syntax_style, visualization};
use gradeflow::{
    Engine, EngineError, Rubric, Submission,
    aggregate::LetterGrade,
    engine::Node,
    error::StageError,
    error_analysis::ErrorCategory,
    record::{EvaluationRecord, ExecutionOutcome, StageKind, StageResult},
    stages::{
        AssessorHandle, RequirementsStage, Stage, SyntaxStyleStage, VisualizationStage,
    },
};

const HELLO: &str = "print(\"hi\")\n";

const PLOTTING: &str = "import matplotlib.pyplot as plt\n\nplt.plot([1, 2], [3, 4])\nplt.show()\n";

fn submission(source: &str) -> Submission {
    Submission::builder()
        .student_name("alice")
        .source(source)
        .rubric(Rubric::new(["Load the CSV file", "Plot the monthly totals"]))
        .build()
}

fn engine(runner: Arc<FakeRunner>, assessor: Arc<ScriptedAssessor>) -> Engine {
    Engine::with_assessor(runner, assessor, &config())
}

#[tokio::test]
async fn plain_program_skips_visualization_and_reweights() {
    let runner = FakeRunner::new(ExecutionOutcome::succeeded("hi\n"));
    let assessor = Arc::new(
        ScriptedAssessor::new()
            .reply("SyntaxStyleEvaluation", syntax_style(45, 30))
            .reply("RequirementsEvaluation", requirements(80)),
    );

    let evaluation = engine(runner.clone(), assessor.clone())
        .evaluate(submission(HELLO))
        .await
        .expect("evaluation");

    assert_eq!(evaluation.path, vec![
        Node::Execute,
        Node::Inspect,
        Node::SyntaxStyle,
        Node::Requirements,
        Node::Synthesize,
    ]);
    assert_eq!(runner.calls(), 1);
    assert_eq!(assessor.schemas_called(), vec![
        "SyntaxStyleEvaluation",
        "RequirementsEvaluation"
    ]);

    let record = &evaluation.record;
    assert!(record.visualization().is_none());
    assert!(record.error_analysis().is_none());

    // 0.2*75 + 0.1*75 + (0.5/0.8)*80 = 78.125
    let assessment = evaluation.assessment().expect("sealed");
    assert_eq!(assessment.score.value(), 78);
    assert_eq!(assessment.grade, LetterGrade::C);
    assert!(assessment.feedback.contains("## Syntax Evaluation: 45"));
    assert!(assessment.feedback.contains("- Syntax Evaluation: Remove the unused variable."));
    assert!(!assessment.feedback.contains("Visualization Evaluation"));
}

#[tokio::test]
async fn failing_program_short_circuits_to_zero() {
    let runner = FakeRunner::new(ExecutionOutcome::failed(
        "",
        "Traceback (most recent call last):\n  File \"submission.py\", line 3, in <module>\n    \
         print(1 / 0)\nZeroDivisionError: division by zero\n",
    ));
    let assessor = Arc::new(ScriptedAssessor::new());
    let source = "import matplotlib.pyplot as plt\n\nprint(1 / 0)\n";

    let evaluation = engine(runner, assessor.clone())
        .evaluate(submission(source))
        .await
        .expect("evaluation");

    assert_eq!(evaluation.path, vec![
        Node::Execute,
        Node::Inspect,
        Node::AnalyzeErrors,
        Node::Synthesize,
    ]);
    assert!(assessor.calls().is_empty());

    let record = &evaluation.record;
    assert_eq!(record.error_analysis(), Some(&ErrorCategory::DivisionByZero));
    assert!(record.syntax().is_none());
    assert!(record.style().is_none());
    assert!(record.requirements().is_none());
    assert!(record.visualization().is_none());
    assert_eq!(record.visualization_libraries(), ["matplotlib".to_string()]);

    let assessment = evaluation.assessment().expect("sealed");
    assert_eq!(assessment.score.value(), 0);
    assert_eq!(assessment.grade, LetterGrade::F);
    assert!(assessment.feedback.contains("division by zero"));
    assert!(assessment.feedback.starts_with("Your code failed to execute."));
}

#[tokio::test]
async fn plotting_program_runs_all_four_stages() {
    let runner = FakeRunner::new(ExecutionOutcome::succeeded(""));
    let assessor = Arc::new(
        ScriptedAssessor::new()
            .reply("SyntaxStyleEvaluation", syntax_style(60, 40))
            .reply("RequirementsEvaluation", requirements(90))
            .reply("VisualizationEvaluation", visualization(80)),
    );

    let evaluation = engine(runner, assessor.clone())
        .evaluate(submission(PLOTTING))
        .await
        .expect("evaluation");

    assert_eq!(evaluation.path.last(), Some(&Node::Synthesize));
    assert!(evaluation.path.contains(&Node::Visualization));

    let calls = assessor.calls();
    let (_, viz_instruction) = calls
        .iter()
        .find(|(name, _)| *name == "VisualizationEvaluation")
        .expect("visualization call");
    assert!(viz_instruction.contains("Libraries detected: matplotlib"));
    assert!(viz_instruction.contains("execution status is: Successful"));

    // 0.2*100 + 0.1*100 + 0.5*90 + 0.2*80 = 91
    let assessment = evaluation.assessment().expect("sealed");
    assert_eq!(assessment.score.value(), 91);
    assert_eq!(assessment.grade, LetterGrade::A);
    assert!(assessment.feedback.contains("### Visual Clarity\nAxes are labelled."));
}

#[tokio::test]
async fn requirements_timeout_uses_fallback_and_still_completes() {
    let runner = FakeRunner::new(ExecutionOutcome::succeeded("hi\n"));
    let assessor = Arc::new(
        ScriptedAssessor::new()
            .reply("SyntaxStyleEvaluation", syntax_style(45, 30))
            .reply("RequirementsEvaluation", Reply::Hang),
    );

    let evaluation = engine(runner, assessor)
        .evaluate(submission(HELLO))
        .await
        .expect("evaluation");

    let requirements = evaluation.record.requirements().expect("fallback present");
    assert_eq!(requirements.score.value(), 50);
    assert_eq!(requirements.overall_assessment, "An error occurred during evaluation.");

    // (9000 + 4500 + 15000) * 100 / 48000 = 59.375
    let assessment = evaluation.assessment().expect("sealed");
    assert_eq!(assessment.score.value(), 59);
    assert_eq!(assessment.grade, LetterGrade::F);
    assert!(
        assessment
            .feedback
            .contains("Requirements Evaluation: Review assignment requirements")
    );
}

#[tokio::test]
async fn out_of_range_scores_fall_back() {
    let runner = FakeRunner::new(ExecutionOutcome::succeeded(""));
    let assessor = Arc::new(
        ScriptedAssessor::new()
            .reply("SyntaxStyleEvaluation", syntax_style(61, 30))
            .reply("RequirementsEvaluation", requirements(80)),
    );

    let evaluation = engine(runner, assessor)
        .evaluate(submission(HELLO))
        .await
        .expect("evaluation");

    let record = &evaluation.record;
    assert_eq!(record.syntax().map(|s| s.score.value()), Some(30));
    assert_eq!(record.style().map(|s| s.score.value()), Some(20));
}

#[tokio::test]
async fn unavailable_assessor_still_grades_every_stage() {
    let runner = FakeRunner::new(ExecutionOutcome::succeeded(""));
    let assessor = Arc::new(ScriptedAssessor::new());

    let evaluation = engine(runner, assessor)
        .evaluate(submission(PLOTTING))
        .await
        .expect("evaluation");

    let record = &evaluation.record;
    assert_eq!(record.visualization().map(|v| v.score.value()), Some(50));
    // 20*30*10 + 10*20*15 + 50*50*6 + 20*50*6 = 30000 -> 50
    assert_eq!(evaluation.assessment().map(|a| a.score.value()), Some(50));
}

#[tokio::test]
async fn rubric_and_status_reach_the_instruction() {
    let runner = FakeRunner::new(ExecutionOutcome::succeeded(""));
    let assessor = Arc::new(ScriptedAssessor::new());
    let source = "data = {\"code\": 1}\nprint(f\"{data}\")\n";

    engine(runner, assessor.clone())
        .evaluate(submission(source))
        .await
        .expect("evaluation");

    let calls = assessor.calls();
    let (_, instruction) = calls
        .iter()
        .find(|(name, _)| *name == "RequirementsEvaluation")
        .expect("requirements call");
    assert!(instruction.contains("1. Load the CSV file\n2. Plot the monthly totals\n"));
    assert!(instruction.contains("execution status is: Successful"));
    // Braces in the submission are not treated as placeholders.
    assert!(instruction.contains("print(f\"{data}\")"));
    assert!(instruction.contains("\"requirements_score\""));
}

/// Stage that breaks the no-error contract.
struct BrokenStage;

#[async_trait]
impl Stage for BrokenStage {
    fn kind(&self) -> StageKind {
        StageKind::Requirements
    }

    async fn evaluate(&self, _record: &EvaluationRecord) -> Result<StageResult, StageError> {
        Err(StageError::Internal(anyhow::anyhow!("boom")))
    }
}

/// Stage that returns another stage's result.
struct ConfusedStage;

#[async_trait]
impl Stage for ConfusedStage {
    fn kind(&self) -> StageKind {
        StageKind::Requirements
    }

    async fn evaluate(&self, _record: &EvaluationRecord) -> Result<StageResult, StageError> {
        Ok(SyntaxStyleStage::fallback(true))
    }
}

fn engine_with_requirements(stage: Arc<dyn Stage>) -> Engine {
    let assessor = Arc::new(ScriptedAssessor::new());
    let handle = AssessorHandle::new(assessor, config().assessor_timeout());
    let prompts = config().prompts().clone();

    Engine::builder()
        .runner(FakeRunner::new(ExecutionOutcome::succeeded("")))
        .syntax_style(Arc::new(SyntaxStyleStage::new(handle.clone(), prompts.syntax_style())))
        .requirements(stage)
        .visualization(Arc::new(VisualizationStage::new(handle, prompts.visualization())))
        .build()
}

#[tokio::test]
async fn stage_error_aborts_the_evaluation() {
    let err = engine_with_requirements(Arc::new(BrokenStage))
        .evaluate(submission(HELLO))
        .await
        .expect_err("contract violation");

    assert!(matches!(err, EngineError::ContractViolation {
        node: Node::Requirements,
        ..
    }));
}

#[tokio::test]
async fn mismatched_stage_result_aborts_the_evaluation() {
    let err = engine_with_requirements(Arc::new(ConfusedStage))
        .evaluate(submission(HELLO))
        .await
        .expect_err("mismatch");

    assert!(matches!(err, EngineError::MismatchedResult {
        node: Node::Requirements,
        produced: StageKind::SyntaxStyle,
    }));
}

#[tokio::test]
async fn built_in_requirements_stage_can_be_swapped_back_in() {
    let assessor = Arc::new(
        ScriptedAssessor::new()
            .reply("SyntaxStyleEvaluation", syntax_style(60, 40))
            .reply("RequirementsEvaluation", requirements(100)),
    );
    let handle = AssessorHandle::new(assessor, config().assessor_timeout());
    let stage = Arc::new(RequirementsStage::new(handle, config().prompts().requirements()));

    let evaluation = engine_with_requirements(stage)
        .evaluate(submission(HELLO))
        .await
        .expect("evaluation");

    // The swapped-in stage talks to its own assessor; syntax falls back.
    assert_eq!(evaluation.record.requirements().map(|r| r.score.value()), Some(100));
    assert_eq!(evaluation.record.syntax().map(|s| s.score.value()), Some(30));
}
