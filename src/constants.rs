#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Fixed values shared by the stages, the aggregator, and the executor.

/// Upper bound of the syntax score.
pub const SYNTAX_MAX: u32 = 60;

/// Upper bound of the style score.
pub const STYLE_MAX: u32 = 40;

/// Upper bound of the requirements score.
pub const REQUIREMENTS_MAX: u32 = 100;

/// Upper bound of the visualization score.
pub const VISUALIZATION_MAX: u32 = 100;

/// Syntax ceiling applied when the submission failed to execute.
pub const SYNTAX_CEILING_ON_FAILURE: u32 = 40;

/// Requirements ceiling applied when the submission failed to execute.
pub const REQUIREMENTS_CEILING_ON_FAILURE: u32 = 60;

/// Visualization ceiling applied when the submission failed to execute.
pub const VISUALIZATION_CEILING_ON_FAILURE: u32 = 50;

/// Canonical weight of the syntax score, in percent.
pub const SYNTAX_WEIGHT: u32 = 20;

/// Canonical weight of the style score, in percent.
pub const STYLE_WEIGHT: u32 = 10;

/// Canonical weight of the requirements score, in percent.
pub const REQUIREMENTS_WEIGHT: u32 = 50;

/// Canonical weight of the visualization score, in percent.
pub const VISUALIZATION_WEIGHT: u32 = 20;

/// Fallback syntax score when the assessor is unusable and execution succeeded.
pub const SYNTAX_FALLBACK_SUCCESS: u32 = 30;

/// Fallback syntax score when the assessor is unusable and execution failed.
pub const SYNTAX_FALLBACK_FAILURE: u32 = 20;

/// Fallback style score, regardless of execution outcome.
pub const STYLE_FALLBACK: u32 = 20;

/// Fallback requirements score when execution succeeded.
pub const REQUIREMENTS_FALLBACK_SUCCESS: u32 = 50;

/// Fallback requirements score when execution failed.
pub const REQUIREMENTS_FALLBACK_FAILURE: u32 = 30;

/// Fallback visualization score when execution succeeded.
pub const VISUALIZATION_FALLBACK_SUCCESS: u32 = 50;

/// Fallback visualization score when execution failed.
pub const VISUALIZATION_FALLBACK_FAILURE: u32 = 30;

/// Explanation attached to every fallback result.
pub const FALLBACK_EXPLANATION: &str = "An error occurred during evaluation.";

/// Default wall-clock limit for running a submission, in seconds.
pub const DEFAULT_EXECUTION_TIMEOUT_SECS: u64 = 30;

/// Default limit for a single assessor call, in seconds.
pub const DEFAULT_ASSESSOR_TIMEOUT_SECS: u64 = 60;

/// Import roots recognised as visualization libraries, in reporting order.
pub const VISUALIZATION_LIBRARIES: [&str; 6] =
    ["matplotlib", "seaborn", "plotly", "bokeh", "altair", "pygal"];

/// Criterion used when a rubric lists no criteria.
pub const DEFAULT_CRITERION: &str = "Read the data files and extract metrics and visualizations \
                                     to provide significant insights from it.";
