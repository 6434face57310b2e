#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Environment-driven configuration and the instruction templates.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use anyhow::{Result, anyhow};
use bon::Builder;

use crate::constants::{DEFAULT_ASSESSOR_TIMEOUT_SECS, DEFAULT_EXECUTION_TIMEOUT_SECS};

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Default sampling temperature; kept low so grades are repeatable.
pub const DEFAULT_OPENAI_TEMPERATURE: f32 = 0.1;

/// OpenAI credentials and tuning parameters sourced from the environment.
#[derive(Clone)]
pub struct OpenAiEnv {
    /// Base URL for the OpenAI-compatible API endpoint.
    api_base:    String,
    /// API key used to authenticate requests.
    api_key:     String,
    /// Chat model identifier.
    model:       String,
    /// Sampling temperature.
    temperature: f32,
}

impl OpenAiEnv {
    /// Creates an environment bundle with default endpoint, model and
    /// temperature.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base:    DEFAULT_OPENAI_ENDPOINT.to_string(),
            api_key:     api_key.into(),
            model:       DEFAULT_OPENAI_MODEL.to_string(),
            temperature: DEFAULT_OPENAI_TEMPERATURE,
        }
    }

    /// Reads `OPENAI_API_KEY` plus the optional `OPENAI_ENDPOINT`,
    /// `OPENAI_MODEL` and `OPENAI_TEMPERATURE`. Returns `None` without a key.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?.trim().to_owned();
        if api_key.is_empty() {
            return None;
        }

        let non_empty = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let mut env = Self::new(api_key);
        if let Some(base) = non_empty("OPENAI_ENDPOINT") {
            env.api_base = base;
        }
        if let Some(model) = non_empty("OPENAI_MODEL") {
            env.model = model;
        }
        if let Some(t) = non_empty("OPENAI_TEMPERATURE").and_then(|s| s.parse::<f32>().ok()) {
            env.temperature = t;
        }
        Some(env)
    }

    /// Returns the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the chat model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the sampling temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

/// Instruction templates handed to the assessor, one per stage.
///
/// Placeholders use `{name}` and are filled by
/// [`crate::stages::render_template`].
#[derive(Clone, Debug)]
pub struct Prompts {
    /// System message sent with every assessor call.
    system:        String,
    /// Syntax and style template.
    syntax_style:  String,
    /// Requirements template.
    requirements:  String,
    /// Visualization template.
    visualization: String,
}

impl Prompts {
    /// Loads the templates bundled with the crate.
    pub fn load() -> Self {
        Self {
            system:        include_str!("prompts/system.md").to_string(),
            syntax_style:  include_str!("prompts/syntax_style.md").to_string(),
            requirements:  include_str!("prompts/requirements.md").to_string(),
            visualization: include_str!("prompts/visualization.md").to_string(),
        }
    }

    /// Returns the system message.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// Returns the syntax and style template.
    pub fn syntax_style(&self) -> &str {
        &self.syntax_style
    }

    /// Returns the requirements template.
    pub fn requirements(&self) -> &str {
        &self.requirements
    }

    /// Returns the visualization template.
    pub fn visualization(&self) -> &str {
        &self.visualization
    }
}

impl Default for Prompts {
    fn default() -> Self {
        Self::load()
    }
}

/// Everything an evaluation needs besides the submission itself.
#[derive(Clone, Builder)]
pub struct EvalConfig {
    /// Wall-clock limit for running the submission.
    #[builder(default = Duration::from_secs(DEFAULT_EXECUTION_TIMEOUT_SECS))]
    execution_timeout: Duration,
    /// Limit for a single assessor call, enforced by the calling stage.
    #[builder(default = Duration::from_secs(DEFAULT_ASSESSOR_TIMEOUT_SECS))]
    assessor_timeout:  Duration,
    /// Interpreter override; `None` means search `PATH`.
    #[builder(into)]
    interpreter:       Option<PathBuf>,
    /// Assessor credentials, if configured.
    openai:            Option<OpenAiEnv>,
    /// Instruction templates.
    #[builder(default)]
    prompts:           Prompts,
}

impl EvalConfig {
    /// Builds a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::builder()
            .execution_timeout(read_timeout_secs(
                "GRADEFLOW_EXEC_TIMEOUT_SECS",
                DEFAULT_EXECUTION_TIMEOUT_SECS,
            ))
            .assessor_timeout(read_timeout_secs(
                "GRADEFLOW_ASSESSOR_TIMEOUT_SECS",
                DEFAULT_ASSESSOR_TIMEOUT_SECS,
            ))
            .maybe_interpreter(
                std::env::var("GRADEFLOW_PYTHON")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(PathBuf::from),
            )
            .maybe_openai(OpenAiEnv::from_env())
            .build()
    }

    /// Returns the execution time limit.
    pub fn execution_timeout(&self) -> Duration {
        self.execution_timeout
    }

    /// Returns the per-call assessor time limit.
    pub fn assessor_timeout(&self) -> Duration {
        self.assessor_timeout
    }

    /// Returns the interpreter override, if any.
    pub fn interpreter(&self) -> Option<&Path> {
        self.interpreter.as_deref()
    }

    /// Returns the OpenAI environment, if configured.
    pub fn openai(&self) -> Option<&OpenAiEnv> {
        self.openai.as_ref()
    }

    /// Returns the instruction templates.
    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }
}

/// Shared configuration handle.
#[derive(Clone)]
pub struct ConfigHandle(Arc<EvalConfig>);

impl std::ops::Deref for ConfigHandle {
    type Target = EvalConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<EvalConfig>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<EvalConfig>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensures the global configuration exists, reading the environment on first
/// use, and returns a handle to it.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let mut guard = slot()
        .lock()
        .map_err(|_| anyhow!("configuration slot poisoned"))?;
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = Arc::new(EvalConfig::from_env());
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
