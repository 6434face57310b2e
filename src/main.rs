#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # gradeflow
//!
//! Grades one Python submission and prints a report.
//!
//! ```text
//! gradeflow alice_hw1.py --requirements requirements.json --output result.json
//! ```
//!
//! Set `OPENAI_API_KEY` (a `.env` file works) to enable the assessor; without
//! it every stage falls back to its conservative default score.

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use bpaf::*;
use dotenvy::dotenv;
use gradeflow::{Engine, EvaluationReport, Rubric, Submission, config, report::overview_table};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Command line options.
#[derive(Debug, Clone)]
struct Options {
    /// Rubric file.
    requirements: PathBuf,
    /// Where to write the JSON result, if anywhere.
    output:       Option<PathBuf>,
    /// Overrides the name derived from the file name.
    student:      Option<String>,
    /// Log at DEBUG instead of INFO.
    verbose:      bool,
    /// Submission to grade.
    file:         PathBuf,
}

/// Parse the command line arguments.
fn options() -> Options {
    let requirements = short('r')
        .long("requirements")
        .help("Path to the rubric JSON file")
        .argument::<PathBuf>("PATH")
        .fallback(PathBuf::from("requirements.json"))
        .debug_fallback();

    let output = short('o')
        .long("output")
        .help("Write the result as JSON to this path")
        .argument::<PathBuf>("PATH")
        .optional();

    let student = long("student")
        .help("Student name; defaults to the file name up to the first '_'")
        .argument::<String>("NAME")
        .optional();

    let verbose = short('v')
        .long("verbose")
        .help("Show debug logs")
        .switch();

    let file = positional::<PathBuf>("FILE").help("Python file to grade");

    construct!(Options {
        requirements,
        output,
        student,
        verbose,
        file
    })
    .to_options()
    .descr("Grade a Python submission")
    .run()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = LevelFilter::from_level(if opts.verbose { Level::DEBUG } else { Level::INFO });
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    ensure!(opts.file.is_file(), "Submission file {} does not exist", opts.file.display());
    ensure!(
        opts.requirements.is_file(),
        "Requirements file {} does not exist",
        opts.requirements.display()
    );

    let rubric = Rubric::from_path(&opts.requirements)?;
    let mut submission = Submission::from_path(&opts.file, rubric)?;
    if let Some(name) = opts.student {
        submission = submission.with_student_name(name);
    }

    let cfg = config::ensure_initialized()?;
    let engine = Engine::from_config(&cfg)?;
    let evaluation = engine
        .evaluate(submission)
        .await
        .context("Evaluation aborted")?;

    let report = EvaluationReport::from_evaluation(&evaluation)?;
    let file_name = opts
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| opts.file.display().to_string());

    println!("{}", report.render(&file_name));
    if let Some(table) = overview_table(&evaluation.record) {
        println!("{table}");
    }

    if let Some(path) = opts.output {
        report.write_json(&path)?;
        eprintln!("Results saved to {}", path.display());
    }

    Ok(())
}
