#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Weighted aggregation of stage scores into a final grade.
//!
//! Each score is normalised by its stage bound and weighted; a missing
//! visualization score drops out and the remaining weights are scaled up
//! proportionally. Arithmetic is exact: every bound divides 600, so
//! `score * (600 / bound)` is an integer on a common scale and the final floor
//! is a single integer division.

use std::fmt::Display;

use serde::Serialize;

use crate::{
    constants::{
        REQUIREMENTS_MAX, REQUIREMENTS_WEIGHT, STYLE_MAX, STYLE_WEIGHT, SYNTAX_MAX, SYNTAX_WEIGHT,
        VISUALIZATION_MAX, VISUALIZATION_WEIGHT,
    },
    record::EvaluationRecord,
    score::{RequirementsScore, Score, StyleScore, SyntaxScore, VisualizationScore},
};

/// Common multiple of every stage bound.
const SCALE: u64 = 600;

/// Letter grade for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LetterGrade {
    /// 90 and above.
    A,
    /// 80 to 89.
    B,
    /// 70 to 79.
    C,
    /// 60 to 69.
    D,
    /// Below 60.
    F,
}

impl LetterGrade {
    /// Grade for `score`, checking thresholds highest first.
    pub fn for_score(score: u32) -> Self {
        match score {
            90.. => LetterGrade::A,
            80..=89 => LetterGrade::B,
            70..=79 => LetterGrade::C,
            60..=69 => LetterGrade::D,
            _ => LetterGrade::F,
        }
    }
}

impl Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        write!(f, "{letter}")
    }
}

/// The stage scores that feed the final grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubScores {
    /// Syntax score.
    pub syntax:        SyntaxScore,
    /// Style score.
    pub style:         StyleScore,
    /// Requirements score.
    pub requirements:  RequirementsScore,
    /// Visualization score; `None` when the stage did not apply.
    pub visualization: Option<VisualizationScore>,
}

impl SubScores {
    /// Collects the scores from a record, naming the first missing field.
    pub fn from_record(record: &EvaluationRecord) -> Result<Self, &'static str> {
        Ok(Self {
            syntax:        record.syntax().ok_or("syntax")?.score,
            style:         record.style().ok_or("style")?.score,
            requirements:  record.requirements().ok_or("requirements")?.score,
            visualization: record.visualization().map(|v| v.score),
        })
    }

    /// Final score in `[0, 100]`: floor of the weighted sum.
    pub fn final_score(&self) -> Score<100> {
        /// One weighted, scaled term.
        fn term(weight: u32, value: u32, bound: u32) -> u64 {
            u64::from(weight) * u64::from(value) * (SCALE / u64::from(bound))
        }

        let mut numerator = term(SYNTAX_WEIGHT, self.syntax.value(), SYNTAX_MAX)
            + term(STYLE_WEIGHT, self.style.value(), STYLE_MAX)
            + term(REQUIREMENTS_WEIGHT, self.requirements.value(), REQUIREMENTS_MAX);
        let mut total_weight = u64::from(SYNTAX_WEIGHT + STYLE_WEIGHT + REQUIREMENTS_WEIGHT);

        if let Some(viz) = self.visualization {
            numerator += term(VISUALIZATION_WEIGHT, viz.value(), VISUALIZATION_MAX);
            total_weight += u64::from(VISUALIZATION_WEIGHT);
        }

        let raw = numerator * 100 / (SCALE * total_weight);
        Score::saturating(u32::try_from(raw).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(syntax: u32, style: u32, requirements: u32, viz: Option<u32>) -> SubScores {
        SubScores {
            syntax:        SyntaxScore::saturating(syntax),
            style:         StyleScore::saturating(style),
            requirements:  RequirementsScore::saturating(requirements),
            visualization: viz.map(VisualizationScore::saturating),
        }
    }

    #[test]
    fn grade_boundaries_are_inclusive() {
        assert_eq!(LetterGrade::for_score(100), LetterGrade::A);
        assert_eq!(LetterGrade::for_score(90), LetterGrade::A);
        assert_eq!(LetterGrade::for_score(89), LetterGrade::B);
        assert_eq!(LetterGrade::for_score(80), LetterGrade::B);
        assert_eq!(LetterGrade::for_score(79), LetterGrade::C);
        assert_eq!(LetterGrade::for_score(60), LetterGrade::D);
        assert_eq!(LetterGrade::for_score(59), LetterGrade::F);
        assert_eq!(LetterGrade::for_score(0), LetterGrade::F);
    }

    #[test]
    fn perfect_and_empty_scores_hit_the_ends() {
        assert_eq!(scores(60, 40, 100, Some(100)).final_score().value(), 100);
        assert_eq!(scores(60, 40, 100, None).final_score().value(), 100);
        assert_eq!(scores(0, 0, 0, Some(0)).final_score().value(), 0);
    }

    #[test]
    fn missing_visualization_redistributes_weight() {
        // 0.2*75 + 0.1*75 + (0.5/0.8)*80 scaled: (15 + 7.5 + 40) / 0.8 = 78.125
        assert_eq!(scores(45, 30, 80, None).final_score().value(), 78);
    }

    #[test]
    fn all_four_weights_apply_with_visualization() {
        // 0.2*50 + 0.1*50 + 0.5*70 + 0.2*40 = 58
        assert_eq!(scores(30, 20, 70, Some(40)).final_score().value(), 58);
    }

    #[test]
    fn floor_not_round() {
        // 0.2*(59/60*100) + 0.1*100 + 0.5*100 + 0.2*100 = 99.666..
        assert_eq!(scores(59, 40, 100, Some(100)).final_score().value(), 99);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let s = scores(51, 33, 67, Some(72));
        assert_eq!(s.final_score(), s.final_score());
    }
}
