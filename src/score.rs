#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Bounded integer scores.

use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

use crate::constants::{REQUIREMENTS_MAX, STYLE_MAX, SYNTAX_MAX, VISUALIZATION_MAX};

/// Raised when a raw score falls outside `[0, MAX]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("score {value} is outside the range 0..={max}")]
pub struct ScoreError {
    /// The rejected value.
    pub value: i64,
    /// The bound it was checked against.
    pub max:   u32,
}

/// An integer score that can never exceed `MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score<const MAX: u32>(u32);

impl<const MAX: u32> Score<MAX> {
    /// The declared upper bound.
    pub const MAX: u32 = MAX;

    /// Validates a raw integer against `[0, MAX]`.
    pub fn new(value: i64) -> Result<Self, ScoreError> {
        u32::try_from(value)
            .ok()
            .filter(|v| *v <= MAX)
            .map(Self)
            .ok_or(ScoreError { value, max: MAX })
    }

    /// Builds a score from a trusted constant, saturating at `MAX`.
    pub const fn saturating(value: u32) -> Self {
        if value > MAX { Self(MAX) } else { Self(value) }
    }

    /// Lowers the score to `ceiling` if it is above it.
    pub fn capped(self, ceiling: u32) -> Self {
        Self(self.0.min(ceiling))
    }

    /// Returns the raw value.
    pub fn value(self) -> u32 {
        self.0
    }
}

impl<const MAX: u32> Display for Score<MAX> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, MAX)
    }
}

impl<const MAX: u32> Serialize for Score<MAX> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

/// Score as it may appear in assessor output.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    /// A JSON integer.
    Integer(i64),
    /// A JSON number with a fractional part, which must be zero.
    Float(f64),
    /// A number written as a string.
    Text(String),
}

impl RawScore {
    /// Reduces the raw value to an integer, rejecting fractional numbers.
    fn integral(self) -> Result<i64, String> {
        let float = match self {
            Self::Integer(v) => return Ok(v),
            Self::Float(v) => v,
            Self::Text(text) => {
                let text = text.trim();
                if let Ok(v) = text.parse::<i64>() {
                    return Ok(v);
                }
                text.parse::<f64>()
                    .map_err(|_| format!("score {text:?} is not a number"))?
            }
        };

        if float.is_finite() && float.fract() == 0.0 && float.abs() <= i64::MAX as f64 {
            Ok(float as i64)
        } else {
            Err(format!("score {float} is not a whole number"))
        }
    }
}

impl<'de, const MAX: u32> Deserialize<'de> for Score<MAX> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawScore::deserialize(deserializer)?
            .integral()
            .map_err(de::Error::custom)?;
        Self::new(raw).map_err(de::Error::custom)
    }
}

/// Syntax score, out of 60.
pub type SyntaxScore = Score<SYNTAX_MAX>;
/// Style score, out of 40.
pub type StyleScore = Score<STYLE_MAX>;
/// Requirements score, out of 100.
pub type RequirementsScore = Score<REQUIREMENTS_MAX>;
/// Visualization score, out of 100.
pub type VisualizationScore = Score<VISUALIZATION_MAX>;
