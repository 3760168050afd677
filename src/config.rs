//! Test suite configuration.
//!
//! A suite is a list of [`TestConfig`] entries, each describing one export
//! scenario: what to request from the export service and what the resulting
//! project must contain. Configs are immutable once loaded.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Priority class of a test, used for report rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
}

impl Priority {
    /// All priorities in rollup order.
    pub const ALL: [Priority; 3] = [Priority::P0, Priority::P1, Priority::P2];

    /// Short label for report lines.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
        }
    }
}

/// Parameters sent to the export service to generate a project.
///
/// Serialized verbatim as the JSON body of the export request, so field
/// renames here are part of the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Template identifier.
    pub template: String,
    /// Name of the generated project.
    #[serde(rename = "projectName")]
    pub project_name: String,
    /// Selected integration identifiers.
    #[serde(default)]
    pub integrations: Vec<String>,
    /// Optional branding payload, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding: Option<serde_json::Value>,
}

/// Configuration for a single export verification test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    /// Unique identifier; also namespaces the on-disk working directory.
    pub id: String,
    /// Human-readable name for reports.
    pub name: String,
    /// Scenario complexity grouping (1-4), used only for report organization.
    pub tier: u8,
    /// Priority class.
    pub priority: Priority,
    /// Generation parameters for the export request.
    pub generation: GenerationRequest,
    /// Relative paths that must exist in the extracted project.
    #[serde(default)]
    pub expected_files: Vec<String>,
    /// Environment variable names that must appear in the env example file.
    #[serde(default)]
    pub expected_env_vars: Vec<String>,
}

/// Validates a suite before a run, catching configuration errors early.
///
/// Rejects empty ids, tiers outside 1-4, and duplicate ids. Duplicate ids
/// would make two tests share a working directory, so they are fatal.
pub fn validate_suite(configs: &[TestConfig]) -> Result<()> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for config in configs {
        if config.id.trim().is_empty() {
            errors.push(format!("test '{}' has an empty id", config.name));
        }
        if !(1..=4).contains(&config.tier) {
            errors.push(format!(
                "test '{}' has tier {} (must be 1-4)",
                config.id, config.tier
            ));
        }
        if !seen.insert(config.id.as_str()) {
            errors.push(format!("duplicate test id '{}'", config.id));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(errors.join("; ")))
    }
}

/// Loads a test suite from a JSON file.
pub fn load_suite(path: &Path) -> Result<Vec<TestConfig>> {
    let text = std::fs::read_to_string(path)?;
    let configs: Vec<TestConfig> = serde_json::from_str(&text)
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    validate_suite(&configs)?;
    Ok(configs)
}
