#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Surface metadata scanned from submission source text.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{constants::VISUALIZATION_LIBRARIES, parsers::line};

/// What a line-by-line scan of the source found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceMetadata {
    /// Root module names imported at the top level.
    imports:                 BTreeSet<String>,
    /// Known visualization libraries among `imports`, in
    /// [`VISUALIZATION_LIBRARIES`] order.
    visualization_libraries: Vec<String>,
    /// Top-level `def` lines.
    function_count:          usize,
    /// Top-level `class` lines.
    class_count:             usize,
    /// Size of the source in bytes.
    source_bytes:            usize,
}

impl SourceMetadata {
    /// Scans `source` line by line. Never fails; an empty or unrecognisable
    /// source yields empty sets and zero counts.
    pub fn extract(source: &str) -> Self {
        let mut imports = BTreeSet::new();
        let mut function_count = 0;
        let mut class_count = 0;

        for text in source.lines() {
            if let Ok(root) = line::import_root(text) {
                imports.insert(root.to_string());
            } else if line::function_name(text).is_ok() {
                function_count += 1;
            } else if line::class_name(text).is_ok() {
                class_count += 1;
            }
        }

        let visualization_libraries = VISUALIZATION_LIBRARIES
            .iter()
            .filter(|lib| imports.contains(**lib))
            .map(|lib| lib.to_string())
            .collect();

        Self {
            imports,
            visualization_libraries,
            function_count,
            class_count,
            source_bytes: source.len(),
        }
    }

    /// Whether any known visualization library is imported.
    pub fn has_visualizations(&self) -> bool {
        !self.visualization_libraries.is_empty()
    }

    /// Detected visualization libraries.
    pub fn visualization_libraries(&self) -> &[String] {
        &self.visualization_libraries
    }

    /// Distinct imported root modules.
    pub fn imports(&self) -> &BTreeSet<String> {
        &self.imports
    }

    /// Number of distinct imported root modules.
    pub fn import_count(&self) -> usize {
        self.imports.len()
    }

    /// Number of top-level function definitions.
    pub fn function_count(&self) -> usize {
        self.function_count
    }

    /// Number of top-level class definitions.
    pub fn class_count(&self) -> usize {
        self.class_count
    }

    /// Source size in bytes.
    pub fn source_bytes(&self) -> usize {
        self.source_bytes
    }

    /// Source size in KiB.
    pub fn size_kb(&self) -> f64 {
        self.source_bytes as f64 / 1024.0
    }
}
