#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Console report and the JSON result document.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use crate::{aggregate::LetterGrade, engine::Evaluation, record::EvaluationRecord};

/// The terminal record as written by `--output`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    /// Submitter.
    pub student_name:   String,
    /// Final score, 0 to 100.
    pub final_score:    u32,
    /// Letter grade.
    pub grade:          LetterGrade,
    /// Feedback document.
    pub feedback:       String,
    /// Classified execution error; only set when the submission failed.
    pub error_analysis: Option<String>,
}

impl EvaluationReport {
    /// Builds the report from a finished evaluation.
    pub fn from_evaluation(evaluation: &Evaluation) -> Result<Self> {
        let record = &evaluation.record;
        let assessment = record
            .assessment()
            .context("Evaluation finished without a final assessment")?;

        Ok(Self {
            student_name:   record.submission().student_name().to_string(),
            final_score:    assessment.score.value(),
            grade:          assessment.grade,
            feedback:       assessment.feedback.clone(),
            error_analysis: record.error_analysis().map(ToString::to_string),
        })
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Could not serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Could not write report to {}", path.display()))
    }

    /// Text printed to stdout after an evaluation.
    pub fn render(&self, file_name: &str) -> String {
        let rule = "=".repeat(50);
        let grade = match self.grade {
            LetterGrade::A | LetterGrade::B => self.grade.to_string().green().bold(),
            LetterGrade::C | LetterGrade::D => self.grade.to_string().yellow().bold(),
            LetterGrade::F => self.grade.to_string().red().bold(),
        };

        let mut out = vec![
            rule.clone(),
            format!("EVALUATION RESULTS FOR: {file_name}").bold().to_string(),
            rule.clone(),
            format!("Student: {}", self.student_name),
            format!("Final Score: {}/100", self.final_score),
            format!("Grade: {grade}"),
            String::new(),
            "Feedback:".bold().to_string(),
            self.feedback.clone(),
        ];

        if let Some(analysis) = &self.error_analysis {
            out.push(String::new());
            out.push("Error Analysis:".bold().to_string());
            out.push(analysis.clone());
        }
        out.push(rule);
        out.join("\n")
    }
}

/// One row of the score overview table.
#[derive(Tabled, Debug, Clone, PartialEq, Eq)]
struct OverviewRow {
    /// Stage title.
    #[tabled(rename = "Stage")]
    stage: &'static str,
    /// Score out of the stage bound.
    #[tabled(rename = "Score")]
    score: String,
    /// Explanation excerpt.
    #[tabled(rename = "Notes")]
    notes: String,
}

/// Table of the stage scores present in `record`, or `None` when no stage ran.
pub fn overview_table(record: &EvaluationRecord) -> Option<String> {
    let mut rows = Vec::new();
    if let Some(s) = record.syntax() {
        rows.push(OverviewRow {
            stage: "Syntax",
            score: s.score.to_string(),
            notes: s.explanation.clone(),
        });
    }
    if let Some(s) = record.style() {
        rows.push(OverviewRow {
            stage: "Style",
            score: s.score.to_string(),
            notes: s.explanation.clone(),
        });
    }
    if let Some(r) = record.requirements() {
        rows.push(OverviewRow {
            stage: "Requirements",
            score: r.score.to_string(),
            notes: r.overall_assessment.clone(),
        });
    }
    if let Some(v) = record.visualization() {
        rows.push(OverviewRow {
            stage: "Visualization",
            score: v.score.to_string(),
            notes: v.clarity_assessment.clone(),
        });
    }

    if rows.is_empty() {
        return None;
    }

    let total = record
        .assessment()
        .map(|a| format!("Final: {}/100 ({})", a.score.value(), a.grade))
        .unwrap_or_default();

    Some(
        Table::new(&rows)
            .with(Panel::header("Score Overview"))
            .with(Panel::footer(total))
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(48).keep_words(true)))
            .with(
                Modify::new(Rows::first())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(
                Modify::new(Rows::last())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(Style::modern())
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(error_analysis: Option<&str>) -> EvaluationReport {
        EvaluationReport {
            student_name:   "alice".into(),
            final_score:    0,
            grade:          LetterGrade::F,
            feedback:       "Your code failed to execute.".into(),
            error_analysis: error_analysis.map(String::from),
        }
    }

    #[test]
    fn json_carries_the_terminal_fields() {
        let value = serde_json::to_value(report(Some("boom"))).expect("serialize");
        assert_eq!(value["student_name"], "alice");
        assert_eq!(value["final_score"], 0);
        assert_eq!(value["grade"], "F");
        assert_eq!(value["error_analysis"], "boom");
    }

    #[test]
    fn console_text_mentions_error_analysis_only_when_present() {
        colored::control::set_override(false);
        let with = report(Some("division by zero")).render("alice_hw1.py");
        assert!(with.contains("EVALUATION RESULTS FOR: alice_hw1.py"));
        assert!(with.contains("Final Score: 0/100"));
        assert!(with.contains("Error Analysis:\ndivision by zero"));

        let without = report(None).render("alice_hw1.py");
        assert!(!without.contains("Error Analysis"));
    }

    #[test]
    fn writes_pretty_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("result.json");
        report(None).write_json(&path).expect("write");

        let text = std::fs::read_to_string(&path).expect("read back");
        assert!(text.contains("\n  \"student_name\": \"alice\""));
        assert!(text.contains("\"error_analysis\": null"));
    }
}
