//! Fakes shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use gradeflow::{
    EvalConfig,
    assessor::{Assessor, AssessorError, OutputSchema},
    executor::SourceRunner,
    record::ExecutionOutcome,
};
use serde_json::{Value, json};

/// Runner that returns a canned outcome and counts calls.
pub struct FakeRunner {
    outcome: ExecutionOutcome,
    calls:   Mutex<usize>,
}

impl FakeRunner {
    pub fn new(outcome: ExecutionOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("calls lock")
    }
}

#[async_trait]
impl SourceRunner for FakeRunner {
    async fn run(&self, _source: &str) -> ExecutionOutcome {
        *self.calls.lock().expect("calls lock") += 1;
        self.outcome.clone()
    }
}

/// What the scripted assessor does for one schema.
#[derive(Clone)]
pub enum Reply {
    Value(Value),
    Fail,
    Hang,
}

/// Assessor that answers per schema name and records every instruction.
#[derive(Default)]
pub struct ScriptedAssessor {
    replies:      HashMap<&'static str, Reply>,
    instructions: Mutex<Vec<(&'static str, String)>>,
}

impl ScriptedAssessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, schema: &'static str, reply: Reply) -> Self {
        self.replies.insert(schema, reply);
        self
    }

    /// Calls made so far, as `(schema, instruction)`.
    pub fn calls(&self) -> Vec<(&'static str, String)> {
        self.instructions.lock().expect("instructions lock").clone()
    }

    pub fn schemas_called(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|(name, _)| name).collect()
    }
}

#[async_trait]
impl Assessor for ScriptedAssessor {
    async fn assess(
        &self,
        instruction: &str,
        schema: &OutputSchema,
    ) -> Result<Value, AssessorError> {
        self.instructions
            .lock()
            .expect("instructions lock")
            .push((schema.name, instruction.to_string()));

        match self.replies.get(schema.name).cloned() {
            Some(Reply::Value(value)) => Ok(value),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AssessorError::EmptyResponse)
            }
            Some(Reply::Fail) | None => Err(AssessorError::Unavailable("scripted".into())),
        }
    }
}

pub fn syntax_style(syntax: u32, style: u32) -> Reply {
    Reply::Value(json!({
        "syntax_score": syntax,
        "style_score": style,
        "syntax_feedback": "Syntax is valid.",
        "style_feedback": "Mostly PEP 8.",
        "syntax_improvements": ["Remove the unused variable."],
        "style_improvements": ["Add a module docstring."],
    }))
}

pub fn requirements(score: u32) -> Reply {
    Reply::Value(json!({
        "requirements_score": score,
        "overall_assessment": "Covers the main criteria.",
        "strengths": ["Reads the data file."],
        "weaknesses": ["No summary statistics."],
        "improvement_suggestions": ["Print the mean price."],
    }))
}

pub fn visualization(score: u32) -> Reply {
    Reply::Value(json!({
        "visualization_score": score,
        "clarity_assessment": "Axes are labelled.",
        "insight_assessment": "Shows the trend.",
        "technical_assessment": "Uses subplots well.",
        "strengths": ["Clear titles."],
        "improvement_suggestions": ["Add a legend."],
    }))
}

/// Configuration with a short assessor timeout so hang tests finish quickly.
pub fn config() -> EvalConfig {
    EvalConfig::builder()
        .assessor_timeout(Duration::from_millis(200))
        .build()
}
