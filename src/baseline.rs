//! Regression diffing against a trusted baseline tree.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::checksum;
use crate::error::Result;
use crate::walk;

/// Byte-level difference between a candidate tree and a baseline tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// True when no files were added, removed, or modified.
    pub identical: bool,
    /// Relative paths present only in the candidate.
    pub added: Vec<String>,
    /// Relative paths present only in the baseline.
    pub removed: Vec<String>,
    /// Paths present in both trees whose contents differ. A missing baseline
    /// is reported here as a single sentinel entry.
    pub checksum_mismatches: Vec<String>,
}

impl DiffResult {
    /// Alias for [`checksum_mismatches`](Self::checksum_mismatches); some
    /// callers think in terms of modified files.
    pub fn modified(&self) -> &[String] {
        &self.checksum_mismatches
    }
}

/// Compares `candidate` to `baseline` by relative path and content hash.
///
/// Both trees are walked with the shared exclusion rules. If the baseline
/// path does not exist the result is never identical: callers get a single
/// sentinel mismatch explaining why instead of an error.
pub fn compare_to_baseline(candidate: &Path, baseline: &Path) -> Result<DiffResult> {
    if !baseline.exists() {
        return Ok(DiffResult {
            identical: false,
            added: Vec::new(),
            removed: Vec::new(),
            checksum_mismatches: vec![format!("baseline not found: {}", baseline.display())],
        });
    }

    let candidate_files: BTreeSet<String> = walk::list_files(candidate)?.into_iter().collect();
    let baseline_files: BTreeSet<String> = walk::list_files(baseline)?.into_iter().collect();

    let added: Vec<String> = candidate_files.difference(&baseline_files).cloned().collect();
    let removed: Vec<String> = baseline_files.difference(&candidate_files).cloned().collect();

    let mut checksum_mismatches = Vec::new();
    for file in candidate_files.intersection(&baseline_files) {
        let candidate_digest = checksum::file_digest(&candidate.join(file))?;
        let baseline_digest = checksum::file_digest(&baseline.join(file))?;
        if candidate_digest != baseline_digest {
            checksum_mismatches.push(file.clone());
        }
    }

    let identical = added.is_empty() && removed.is_empty() && checksum_mismatches.is_empty();

    tracing::debug!(
        candidate = ?candidate,
        added = added.len(),
        removed = removed.len(),
        modified = checksum_mismatches.len(),
        "baseline comparison complete"
    );

    Ok(DiffResult {
        identical,
        added,
        removed,
        checksum_mismatches,
    })
}
