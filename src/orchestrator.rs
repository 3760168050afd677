//! Test orchestration.
//!
//! Drives each test configuration through fetch, validation, install, build,
//! and baseline comparison, sequentially, mutating one [`TestResult`] per
//! stage. The core failure-handling contract lives here: one test's fatal
//! error never prevents evaluation of the others.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::baseline::{self, DiffResult};
use crate::config::{Priority, TestConfig};
use crate::envvars;
use crate::fetch::{ArtifactFetcher, ExportClient};
use crate::process::{BuildResult, ProcessRunner};
use crate::structure::{self, ValidationResult};

/// Final status of one test's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Every attempted stage succeeded.
    Passed,
    /// At least one required stage reported failure.
    Failed,
    /// A prerequisite stage failed, so verification never ran.
    Skipped,
}

/// Outcome of one test configuration's execution.
///
/// Created when the test starts, filled in as stages complete, and frozen
/// once `status` is assigned. Stages that never ran stay `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub name: String,
    pub tier: u8,
    pub priority: Priority,
    pub status: TestStatus,
    /// Structure validation outcome, if the tree was extracted.
    pub structure: Option<ValidationResult>,
    /// Environment contract outcome, if the tree was extracted.
    pub env_vars: Option<ValidationResult>,
    /// Dependency install outcome.
    pub dependencies: Option<BuildResult>,
    /// Build outcome; `None` when the install failed and building was
    /// pointless.
    pub build: Option<BuildResult>,
    /// Baseline diff, when a baseline directory is configured.
    pub baseline: Option<DiffResult>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TestResult {
    fn pending(config: &TestConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            tier: config.tier,
            priority: config.priority,
            status: TestStatus::Skipped,
            structure: None,
            env_vars: None,
            dependencies: None,
            build: None,
            baseline: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Runs test configurations through the full verification pipeline.
pub struct TestOrchestrator<C> {
    fetcher: ArtifactFetcher<C>,
    runner: ProcessRunner,
    baseline_dir: Option<PathBuf>,
}

impl<C: ExportClient> TestOrchestrator<C> {
    /// Creates an orchestrator writing working directories under
    /// `output_dir` and diffing against `{baseline_dir}/{test id}` when a
    /// baseline directory is given.
    pub fn new(client: C, output_dir: impl Into<PathBuf>, baseline_dir: Option<PathBuf>) -> Self {
        Self {
            fetcher: ArtifactFetcher::new(client, output_dir),
            runner: ProcessRunner::new(),
            baseline_dir,
        }
    }

    /// Replaces the process runner (tests use a non-npm binary).
    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Runs every configuration sequentially and collects the results.
    ///
    /// Sequential on purpose: concurrent installs and builds contend for
    /// disk and network and produce misleading timings.
    pub async fn run_suite(&self, configs: &[TestConfig]) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(configs.len());
        for config in configs {
            tracing::info!(test_id = %config.id, name = %config.name, "running test");
            let result = self.run_test(config).await;
            tracing::info!(test_id = %config.id, status = ?result.status, "test complete");
            results.push(result);
        }
        results
    }

    /// Runs a single test end to end.
    pub async fn run_test(&self, config: &TestConfig) -> TestResult {
        match self.fetcher.fetch(config).await {
            Ok(project_dir) => self.verify_tree(&project_dir, config).await,
            Err(e) => {
                // No tree to verify; later stages were never attempted.
                tracing::warn!(test_id = %config.id, error = %e, "fetch failed, skipping test");
                let mut result = TestResult::pending(config);
                result.errors.push(e.to_string());
                result
            }
        }
    }

    /// Verifies an already-extracted project tree.
    ///
    /// Exposed separately so a previously downloaded export can be
    /// re-verified without hitting the service again.
    pub async fn verify_tree(&self, project_dir: &Path, config: &TestConfig) -> TestResult {
        let mut result = TestResult::pending(config);
        let mut failed = false;

        match structure::validate_structure(project_dir, &config.expected_files) {
            Ok(validation) => {
                if !validation.passed {
                    failed = true;
                    result.errors.push(format!(
                        "{} expected file(s) missing",
                        validation.missing.len()
                    ));
                }
                if !validation.extra.is_empty() {
                    result.warnings.push(format!(
                        "{} unexpected file(s) present",
                        validation.extra.len()
                    ));
                }
                result.structure = Some(validation);
            }
            Err(e) => {
                failed = true;
                result.errors.push(format!("structure validation error: {}", e));
            }
        }

        let env = envvars::validate_env_vars(project_dir, &config.expected_env_vars);
        if !env.passed {
            failed = true;
            result
                .errors
                .push(format!("missing env var(s): {}", env.missing.join(", ")));
        }
        result.env_vars = Some(env);

        let install = self.runner.run_install(project_dir).await;
        let install_ok = install.success;
        if !install_ok {
            failed = true;
            result.errors.push(format!(
                "dependency install failed (exit {})",
                install.exit_code
            ));
        }
        result.dependencies = Some(install);

        if install_ok {
            let build = self.runner.run_build(project_dir).await;
            if !build.success {
                failed = true;
                result
                    .errors
                    .push(format!("build failed (exit {})", build.exit_code));
            }
            result.build = Some(build);
        }
        // Building without dependencies would only fail for the wrong
        // reason, so the build stage stays unattempted after a failed
        // install.

        if let Some(baseline_dir) = &self.baseline_dir {
            let baseline_path = baseline_dir.join(&config.id);
            match baseline::compare_to_baseline(project_dir, &baseline_path) {
                Ok(diff) => {
                    if !diff.identical {
                        if baseline_path.exists() {
                            failed = true;
                            result.errors.push(format!(
                                "baseline drift: {} added, {} removed, {} modified",
                                diff.added.len(),
                                diff.removed.len(),
                                diff.checksum_mismatches.len()
                            ));
                        } else {
                            // Nothing captured yet; the sentinel diff records
                            // it, but a missing baseline is not a regression.
                            result.warnings.push(format!(
                                "no baseline captured at {}",
                                baseline_path.display()
                            ));
                        }
                    }
                    result.baseline = Some(diff);
                }
                Err(e) => {
                    failed = true;
                    result
                        .errors
                        .push(format!("baseline comparison error: {}", e));
                }
            }
        }

        result.status = if failed {
            TestStatus::Failed
        } else {
            TestStatus::Passed
        };
        result
    }
}
