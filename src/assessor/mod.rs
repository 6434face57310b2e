#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The external assessment capability the stages consult.
//!
//! An [`Assessor`] takes a rendered instruction and the [`OutputSchema`] the
//! caller expects back, and returns loosely typed JSON. Turning that JSON into
//! a stage's typed result is the caller's job, done statelessly through
//! [`decode`].

/// OpenAI-backed assessor.
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use thiserror::Error;

pub use self::openai::OpenAiAssessor;

/// Why an assessor call produced nothing usable.
#[derive(Error, Debug)]
pub enum AssessorError {
    /// No assessor is configured.
    #[error("assessor unavailable: {0}")]
    Unavailable(String),
    /// The request could not be built or sent, or the service refused it.
    #[error("assessor request failed: {0}")]
    Request(#[from] async_openai::error::OpenAIError),
    /// The reply carried no content.
    #[error("assessor returned an empty response")]
    EmptyResponse,
    /// The reply could not be decoded into the expected shape.
    #[error("assessor output does not match {schema}: {source}")]
    Malformed {
        /// Name of the expected schema.
        schema: &'static str,
        /// Decoder error.
        source: serde_json::Error,
    },
    /// The caller stopped waiting.
    #[error("assessor did not answer within {0:?}")]
    TimedOut(Duration),
}

/// JSON type of one field in an [`OutputSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer in `0..=max`.
    Score {
        /// Inclusive upper bound.
        max: u32,
    },
    /// Free text.
    Text,
    /// List of free-text items.
    TextList,
}

/// One required field of an [`OutputSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// JSON key.
    pub name:        &'static str,
    /// JSON type.
    pub kind:        FieldKind,
    /// What the assessor should put there.
    pub description: &'static str,
}

/// Shape of the JSON object a stage expects back from the assessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSchema {
    /// Name used in instructions and error messages.
    pub name:   &'static str,
    /// Required fields, in the order they are described.
    pub fields: &'static [FieldSpec],
}

impl OutputSchema {
    /// JSON Schema document describing this shape.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in self.fields {
            let spec = match field.kind {
                FieldKind::Score { max } => json!({
                    "type": "integer",
                    "minimum": 0,
                    "maximum": max,
                    "description": field.description,
                }),
                FieldKind::Text => json!({
                    "type": "string",
                    "description": field.description,
                }),
                FieldKind::TextList => json!({
                    "type": "array",
                    "items": { "type": "string" },
                    "description": field.description,
                }),
            };
            properties.insert(field.name.to_string(), spec);
        }

        json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": self.fields.iter().map(|f| f.name).collect::<Vec<_>>(),
        })
    }

    /// Text spliced into instructions at `{format_instructions}`.
    pub fn format_instructions(&self) -> String {
        let schema = serde_json::to_string_pretty(&self.json_schema()).unwrap_or_default();
        format!(
            "The output should be formatted as a JSON instance that conforms to the JSON schema \
             below. Respond with the JSON object only.\n\nHere is the output schema:\n```\n{schema}\n```"
        )
    }
}

/// A typed stage result the assessor can be asked for.
pub trait StructuredOutput: DeserializeOwned {
    /// Shape to request.
    const SCHEMA: OutputSchema;
}

/// Something that can assess a submission given an instruction.
#[async_trait]
pub trait Assessor: Send + Sync {
    /// Sends `instruction` and returns the reply as JSON. A reply that is a
    /// JSON string is decoded again by [`decode`], so text replies work too.
    async fn assess(&self, instruction: &str, schema: &OutputSchema)
    -> Result<Value, AssessorError>;
}

/// Stand-in used when no credentials are configured; every call fails, which
/// sends each stage to its fallback.
#[derive(Debug, Clone, Default)]
pub struct UnavailableAssessor;

#[async_trait]
impl Assessor for UnavailableAssessor {
    async fn assess(
        &self,
        _instruction: &str,
        _schema: &OutputSchema,
    ) -> Result<Value, AssessorError> {
        Err(AssessorError::Unavailable("OPENAI_API_KEY is not set".into()))
    }
}

/// Returns the JSON payload inside a Markdown code fence, or the trimmed text
/// when there is no fence.
pub fn extract_json(text: &str) -> &str {
    if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end) = rest.find("```") {
            return rest[..end].trim();
        }
    }
    text.trim()
}

/// Decodes an assessor reply into `T`. String replies are unwrapped from any
/// code fence and parsed first.
pub fn decode<T: StructuredOutput>(value: Value) -> Result<T, AssessorError> {
    let malformed = |source| AssessorError::Malformed {
        schema: T::SCHEMA.name,
        source,
    };

    let value = match value {
        Value::String(text) => serde_json::from_str(extract_json(&text)).map_err(malformed)?,
        other => other,
    };
    serde_json::from_value(value).map_err(malformed)
}
