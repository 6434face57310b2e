#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Assignment rubrics: an ordered list of natural-language criteria.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CRITERION;

/// Accepted on-disk shapes of a rubric file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RubricFile {
    /// `{"criteria": ["...", "..."]}`
    Object {
        /// Criteria in order; a missing key means no criteria.
        #[serde(default)]
        criteria: Vec<String>,
    },
    /// `["...", "..."]`
    List(Vec<String>),
}

/// Ordered grading criteria for a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubric {
    /// Criteria, in the order they should be presented to the assessor.
    criteria: Vec<String>,
}

impl Rubric {
    /// Creates a rubric from any iterable of criteria.
    pub fn new(criteria: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            criteria: criteria.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a rubric from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let criteria = match serde_json::from_str::<RubricFile>(text)
            .context("Rubric must be a JSON object with a `criteria` array, or a JSON array")?
        {
            RubricFile::Object { criteria } | RubricFile::List(criteria) => criteria,
        };
        Ok(Self::new(criteria))
    }

    /// Reads and parses a rubric file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read rubric file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Could not parse {}", path.display()))
    }

    /// Returns the criteria.
    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    /// Whether no criteria were given.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Renders the criteria as a numbered list, or the default criterion when
    /// the rubric is empty.
    pub fn render(&self) -> String {
        if self.criteria.is_empty() {
            return DEFAULT_CRITERION.to_string();
        }

        self.criteria
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {}\n", i + 1, c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_object_and_list_forms() {
        let object = Rubric::from_json(r#"{"criteria": ["Load the CSV", "Plot a histogram"]}"#)
            .expect("object rubric");
        let list = Rubric::from_json(r#"["Load the CSV", "Plot a histogram"]"#).expect("list");
        assert_eq!(object, list);
        assert_eq!(object.render(), "1. Load the CSV\n2. Plot a histogram\n");
    }

    #[test]
    fn empty_rubric_renders_default_criterion() {
        let rubric = Rubric::from_json("{}").expect("empty object");
        assert!(rubric.is_empty());
        assert_eq!(rubric.render(), DEFAULT_CRITERION);
    }

    #[test]
    fn rejects_non_rubric_json() {
        assert!(Rubric::from_json(r#"{"criteria": 3}"#).is_err());
        assert!(Rubric::from_json("not json").is_err());
    }
}
