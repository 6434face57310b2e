#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Renders the feedback document written into the sealed record.

use itertools::Itertools;

use crate::{
    aggregate::LetterGrade,
    error_analysis::ErrorCategory,
    record::EvaluationRecord,
    score::Score,
};

/// At most this many strengths are listed.
const MAX_STRENGTHS: usize = 3;

/// At most this many improvement items are listed.
const MAX_IMPROVEMENTS: usize = 5;

/// The single paragraph returned for a submission that did not run.
pub fn failure_paragraph(category: &ErrorCategory) -> String {
    format!(
        "Your code failed to execute. {category} Fix these errors first before addressing other \
         requirements."
    )
}

/// Accumulates the document body plus the pooled strength and improvement
/// lists.
#[derive(Default)]
struct Document {
    /// Output lines.
    lines:        Vec<String>,
    /// Strengths, in stage order.
    strengths:    Vec<String>,
    /// Improvement items, prefixed with their section title.
    improvements: Vec<String>,
}

impl Document {
    /// Opens a section with its score and explanation.
    fn section(&mut self, title: &str, score: u32, explanation: &str) {
        self.lines.push(format!("\n## {title}: {score}"));
        if !explanation.is_empty() {
            self.lines.push(explanation.to_string());
        }
    }

    /// Adds a titled sub-assessment.
    fn subsection(&mut self, title: &str, body: &str) {
        self.lines.push(format!("### {title}\n{body}"));
    }

    /// Pools improvement items under `title`.
    fn improve<'a>(&mut self, title: &str, items: impl IntoIterator<Item = &'a String>) {
        self.improvements
            .extend(items.into_iter().map(|item| format!("{title}: {item}")));
    }

    /// Appends the strengths and improvements lists and joins everything.
    fn finish(mut self) -> String {
        let strengths = self
            .strengths
            .iter()
            .unique()
            .take(MAX_STRENGTHS)
            .map(|s| format!("- {s}"))
            .collect_vec();
        if !strengths.is_empty() {
            self.lines.push("\n## Strengths".to_string());
            self.lines.extend(strengths);
        }

        if !self.improvements.is_empty() {
            self.lines.push("\n## Areas for Improvement".to_string());
            let items = self
                .improvements
                .iter()
                .take(MAX_IMPROVEMENTS)
                .map(|s| format!("- {s}"))
                .collect_vec();
            self.lines.extend(items);
        }

        self.lines.join("\n")
    }
}

/// Renders the full document for a submission that ran.
///
/// Sections appear only for stage results present in `record`; an absent
/// visualization result means the stage did not apply and gets no section.
pub fn render(record: &EvaluationRecord, score: Score<100>, grade: LetterGrade) -> String {
    let mut doc = Document::default();

    doc.lines.push(format!("# Evaluation for {}", record.submission().student_name()));
    doc.lines.push(format!("## Overall Score: {}/100", score.value()));
    doc.lines.push(format!("## Grade: {grade}"));
    doc.lines.push("## Summary".to_string());
    doc.lines.push(if record.execution_succeeded() {
        "✅ Your code executed successfully.".to_string()
    } else {
        "❌ Your code failed to execute. Fix errors first.".to_string()
    });

    if let Some(syntax) = record.syntax() {
        let title = "Syntax Evaluation";
        doc.section(title, syntax.score.value(), &syntax.explanation);
        doc.improve(title, &syntax.improvements);
    }

    if let Some(style) = record.style() {
        let title = "Style Evaluation";
        doc.section(title, style.score.value(), &style.explanation);
        doc.improve(title, &style.improvements);
    }

    if let Some(req) = record.requirements() {
        let title = "Requirements Evaluation";
        doc.section(title, req.score.value(), &req.overall_assessment);
        doc.strengths.extend(req.strengths.iter().cloned());
        doc.improve(title, &req.weaknesses);
        doc.improve(title, &req.improvement_suggestions);
    }

    if let Some(viz) = record.visualization() {
        let title = "Visualization Evaluation";
        doc.section(title, viz.score.value(), "");
        doc.subsection("Visual Clarity", &viz.clarity_assessment);
        doc.subsection("Insight Generation", &viz.insight_assessment);
        doc.subsection("Technical Implementation", &viz.technical_assessment);
        doc.strengths.extend(viz.strengths.iter().cloned());
        doc.improve(title, &viz.improvement_suggestions);
    }

    doc.finish()
}
