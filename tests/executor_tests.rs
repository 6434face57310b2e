//! Runs real submissions through the isolated executor. Each test skips itself
//! when no Python interpreter is on PATH.

use std::{path::Path, time::Duration};

use gradeflow::{
    error_analysis::ErrorCategory,
    executor::{IsolatedExecutor, SourceRunner, locate_interpreter},
};

fn executor(timeout: Duration) -> Option<IsolatedExecutor> {
    match locate_interpreter() {
        Ok(python) => Some(IsolatedExecutor::new(python, timeout)),
        Err(_) => {
            eprintln!("skipping: no python interpreter on PATH");
            None
        }
    }
}

#[tokio::test]
async fn captures_stdout_on_success() {
    let Some(exec) = executor(Duration::from_secs(30)) else {
        return;
    };

    let outcome = exec.run("print('hi')\n").await;
    assert!(outcome.is_success(), "{outcome:?}");
    assert_eq!(outcome.stdout(), "hi\n");
    assert_eq!(outcome.error(), None);
}

#[tokio::test]
async fn runtime_error_is_a_failure_with_stderr() {
    let Some(exec) = executor(Duration::from_secs(30)) else {
        return;
    };

    let outcome = exec.run("print('before')\nprint(1 / 0)\n").await;
    assert!(!outcome.is_success());
    assert_eq!(outcome.stdout(), "before\n");

    let error = outcome.error().expect("stderr captured");
    assert!(error.contains("ZeroDivisionError"), "{error}");
    assert_eq!(ErrorCategory::classify(error), ErrorCategory::DivisionByZero);
}

#[tokio::test]
async fn syntax_error_is_classified() {
    let Some(exec) = executor(Duration::from_secs(30)) else {
        return;
    };

    let outcome = exec.run("def broken(:\n    pass\n").await;
    let error = outcome.error().expect("failure");
    assert_eq!(ErrorCategory::classify(error), ErrorCategory::Syntax);
}

#[tokio::test]
async fn infinite_loop_times_out() {
    let Some(exec) = executor(Duration::from_secs(1)) else {
        return;
    };

    let outcome = exec.run("while True:\n    pass\n").await;
    assert!(!outcome.is_success());
    assert_eq!(outcome.stdout(), "");

    let error = outcome.error().expect("timeout message");
    assert!(error.contains("Timeout"), "{error}");
    assert_eq!(ErrorCategory::classify(error), ErrorCategory::Timeout);
}

#[tokio::test]
async fn stdin_is_closed() {
    let Some(exec) = executor(Duration::from_secs(10)) else {
        return;
    };

    // input() on a closed stdin raises EOFError instead of blocking.
    let outcome = exec.run("name = input()\nprint(name)\n").await;
    assert!(!outcome.is_success());
    assert!(outcome.error().is_some_and(|e| e.contains("EOFError")));
}

#[tokio::test]
async fn sandbox_is_removed_after_every_run() {
    let Some(exec) = executor(Duration::from_secs(3)) else {
        return;
    };

    let endings = [
        "",
        "raise SystemExit(3)\n",
        "while True:\n    pass\n",
    ];
    for ending in endings {
        // The script records its own directory outside the sandbox first.
        let marker = tempfile::NamedTempFile::new().expect("marker file");
        let source = format!(
            "import os\nwith open({:?}, 'w') as f:\n    f.write(os.path.dirname(os.path.abspath(__file__)))\n{ending}",
            marker.path().display().to_string(),
        );

        let outcome = exec.run(&source).await;
        let dir = std::fs::read_to_string(marker.path()).expect("marker readable");
        assert!(!dir.trim().is_empty(), "script never ran: {outcome:?}");
        assert!(!Path::new(dir.trim()).exists(), "{dir} was left behind after {outcome:?}");
    }
}

#[tokio::test]
async fn sandbox_is_removed_after_a_timeout() {
    let Some(exec) = executor(Duration::from_secs(3)) else {
        return;
    };

    let marker = tempfile::NamedTempFile::new().expect("marker file");
    let source = format!(
        "import os\nwith open({:?}, 'w') as f:\n    f.write(os.path.dirname(os.path.abspath(__file__)))\nwhile True:\n    pass\n",
        marker.path().display().to_string(),
    );

    let outcome = exec.run(&source).await;
    assert!(outcome.error().is_some_and(|e| e.contains("Timeout")), "{outcome:?}");

    let dir = std::fs::read_to_string(marker.path()).expect("marker readable");
    let dir = dir.trim();
    assert!(dir.contains("gradeflow-"), "{dir}");
    assert!(!Path::new(dir).exists(), "{dir} was left behind");
}
