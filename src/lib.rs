//! Export validation and build-verification pipeline.
//!
//! This library treats a code-generation export service as a black box: it
//! fetches the project archive the service produces for a test
//! configuration, validates the extracted tree and its environment contract,
//! installs and builds the project under bounded wall-clock time, diffs the
//! tree against a trusted baseline, and aggregates everything into reports.

pub mod baseline;
pub mod checksum;
pub mod config;
pub mod envvars;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod process;
pub mod report;
pub mod structure;
pub mod walk;

pub use baseline::{compare_to_baseline, DiffResult};
pub use checksum::{bytes_digest, file_digest, tree_digests};
pub use config::{load_suite, validate_suite, GenerationRequest, Priority, TestConfig};
pub use envvars::{validate_env_vars, ENV_EXAMPLE_FILE};
pub use error::{Error, Result};
pub use fetch::{ArtifactFetcher, ExportClient, HttpExportClient};
pub use orchestrator::{TestOrchestrator, TestResult, TestStatus};
pub use process::{BuildResult, ProcessRunner, BUILD_TIMEOUT, INSTALL_TIMEOUT};
pub use report::{gap_analysis, summary};
pub use structure::{validate_structure, ValidationResult};
