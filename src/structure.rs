//! Structural validation of an extracted project tree.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::walk;

/// Generated or log artifacts that may legitimately appear in an extracted
/// tree without being part of the expected manifest. Their presence is not
/// reported as drift.
const IGNORED_EXTRAS: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "npm-debug.log",
    "tsconfig.tsbuildinfo",
    ".env.local",
];

/// Result of a structure or env-var validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether validation passed. Depends only on `missing`.
    pub passed: bool,
    /// Number of entries that were expected.
    pub expected: usize,
    /// Number of expected entries actually present.
    pub found: usize,
    /// Expected entries that were not found.
    pub missing: Vec<String>,
    /// Entries present but not expected. Advisory drift information only;
    /// never affects `passed`.
    pub extra: Vec<String>,
}

/// Checks that every expected file exists under `path` and reports drift.
///
/// Missing files fail validation. Extra files do not: lockfiles and similar
/// artifacts appear as a side effect of installs, so they are surfaced for
/// auditing but never flip `passed`.
pub fn validate_structure(path: &Path, expected_files: &[String]) -> io::Result<ValidationResult> {
    let mut missing = Vec::new();
    for file in expected_files {
        if !path.join(file).exists() {
            missing.push(file.clone());
        }
    }

    let expected_set: HashSet<&str> = expected_files.iter().map(String::as_str).collect();
    let extra: Vec<String> = walk::list_files(path)?
        .into_iter()
        .filter(|f| !expected_set.contains(f.as_str()))
        .filter(|f| !IGNORED_EXTRAS.contains(&f.as_str()))
        .collect();

    let found = expected_files.len() - missing.len();

    Ok(ValidationResult {
        passed: missing.is_empty(),
        expected: expected_files.len(),
        found,
        missing,
        extra,
    })
}
