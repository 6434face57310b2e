#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Maps raw failure text from a submission run onto a feedback category.

use std::fmt::Display;

use serde::Serialize;

/// Why a submission failed to run, as far as its error text tells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "category", content = "detail", rename_all = "snake_case")]
pub enum ErrorCategory {
    /// `SyntaxError`
    Syntax,
    /// `NameError`
    UndefinedName,
    /// `ImportError` / `ModuleNotFoundError`
    MissingModule,
    /// `TypeError`
    TypeMismatch,
    /// `IndexError` / `KeyError`
    InvalidAccess,
    /// `ZeroDivisionError`
    DivisionByZero,
    /// The run hit the wall-clock limit.
    Timeout,
    /// Nothing recognisable; carries the raw error text.
    Other(String),
}

impl ErrorCategory {
    /// Classifies `error`. Exactly one category is returned.
    pub fn classify(error: &str) -> Self {
        // Priority order; the first marker found in the text wins.
        let markers: [(&[&str], ErrorCategory); 6] = [
            (&["SyntaxError"], ErrorCategory::Syntax),
            (&["NameError"], ErrorCategory::UndefinedName),
            (&["ImportError", "ModuleNotFoundError"], ErrorCategory::MissingModule),
            (&["TypeError"], ErrorCategory::TypeMismatch),
            (&["IndexError", "KeyError"], ErrorCategory::InvalidAccess),
            (&["ZeroDivisionError"], ErrorCategory::DivisionByZero),
        ];

        for (needles, category) in markers {
            if needles.iter().any(|m| error.contains(m)) {
                return category;
            }
        }

        if error.to_lowercase().contains("timeout") {
            ErrorCategory::Timeout
        } else {
            ErrorCategory::Other(error.to_string())
        }
    }
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(
                f,
                "Your code contains syntax errors. Check for missing colons, parentheses, or \
                 incorrect indentation."
            ),
            ErrorCategory::UndefinedName => {
                write!(f, "Your code references variables or functions that are not defined.")
            }
            ErrorCategory::MissingModule => {
                write!(f, "Your code attempts to import modules that are not available.")
            }
            ErrorCategory::TypeMismatch => write!(
                f,
                "Your code has type mismatches. Check your function arguments and operations."
            ),
            ErrorCategory::InvalidAccess => write!(
                f,
                "Your code attempts to access list indices or dictionary keys that don't exist."
            ),
            ErrorCategory::DivisionByZero => {
                write!(f, "Your code attempts a division by zero.")
            }
            ErrorCategory::Timeout => write!(
                f,
                "Your code took too long to execute. Check for infinite loops or blocking input."
            ),
            ErrorCategory::Other(raw) => {
                write!(f, "Your code failed with the following error: {raw}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_each_marker() {
        let cases = [
            ("  File \"a.py\", line 1\nSyntaxError: invalid syntax", ErrorCategory::Syntax),
            ("NameError: name 'x' is not defined", ErrorCategory::UndefinedName),
            ("ModuleNotFoundError: No module named 'foo'", ErrorCategory::MissingModule),
            ("ImportError: cannot import name 'bar'", ErrorCategory::MissingModule),
            ("TypeError: unsupported operand", ErrorCategory::TypeMismatch),
            ("KeyError: 'price'", ErrorCategory::InvalidAccess),
            ("IndexError: list index out of range", ErrorCategory::InvalidAccess),
            ("ZeroDivisionError: division by zero", ErrorCategory::DivisionByZero),
            ("Timeout: code execution timed out after 30 seconds", ErrorCategory::Timeout),
        ];

        for (text, expected) in cases {
            assert_eq!(ErrorCategory::classify(text), expected, "{text}");
        }
    }

    #[test]
    fn earlier_marker_wins() {
        let text = "TypeError raised while handling\nZeroDivisionError: division by zero";
        assert_eq!(ErrorCategory::classify(text), ErrorCategory::TypeMismatch);

        let text = "SyntaxError: bad input near 'timeout'";
        assert_eq!(ErrorCategory::classify(text), ErrorCategory::Syntax);
    }

    #[test]
    fn timeout_marker_ignores_case() {
        assert_eq!(ErrorCategory::classify("TIMEOUT reached"), ErrorCategory::Timeout);
        // Other markers are case sensitive.
        assert!(matches!(
            ErrorCategory::classify("syntaxerror in lowercase"),
            ErrorCategory::Other(_)
        ));
    }

    #[test]
    fn unknown_errors_echo_raw_text() {
        let category = ErrorCategory::classify("RuntimeError: boom");
        assert_eq!(category, ErrorCategory::Other("RuntimeError: boom".into()));
        assert_eq!(
            category.to_string(),
            "Your code failed with the following error: RuntimeError: boom"
        );
    }

    #[test]
    fn division_message_names_the_problem() {
        assert!(ErrorCategory::DivisionByZero.to_string().contains("division by zero"));
    }
}
