//! Integration tests for the verification pipeline.
//!
//! Exercises the orchestrator, validators, and report generators together
//! using a stub export client, without a live export service.

use std::path::PathBuf;

use async_trait::async_trait;
use tempfile::TempDir;

use export_verify::{
    gap_analysis, summary, ExportClient, GenerationRequest, Priority, ProcessRunner, TestConfig,
    TestOrchestrator, TestStatus,
};

/// Export client that always fails, as if the service were down.
struct UnavailableClient;

#[async_trait]
impl ExportClient for UnavailableClient {
    async fn fetch_archive(
        &self,
        _request: &GenerationRequest,
    ) -> export_verify::Result<Vec<u8>> {
        Err(export_verify::Error::Fetch {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

fn test_config(id: &str, tier: u8, priority: Priority) -> TestConfig {
    TestConfig {
        id: id.to_string(),
        name: format!("Tier {}: {}", tier, id),
        tier,
        priority,
        generation: GenerationRequest {
            template: "saas-starter".to_string(),
            project_name: format!("{}-project", id),
            integrations: vec!["stripe".to_string()],
            branding: None,
        },
        expected_files: vec!["package.json".to_string()],
        expected_env_vars: vec!["DATABASE_URL".to_string()],
    }
}

/// Creates a fake extracted project that satisfies `test_config`.
fn populate_project(root: &std::path::Path) {
    std::fs::write(root.join("package.json"), r#"{"name": "demo"}"#).unwrap();
    std::fs::write(
        root.join(".env.local.example"),
        "DATABASE_URL=postgres://localhost/demo\n",
    )
    .unwrap();
}

#[tokio::test]
async fn unreachable_service_skips_every_test_without_aborting() {
    let output = TempDir::new().unwrap();
    let orchestrator = TestOrchestrator::new(UnavailableClient, output.path(), None);

    let configs = vec![
        test_config("tier1-minimal", 1, Priority::P0),
        test_config("tier2-stripe", 2, Priority::P1),
        test_config("tier3-branding", 3, Priority::P2),
    ];

    let results = orchestrator.run_suite(&configs).await;

    assert_eq!(results.len(), 3);
    for result in &results {
        assert_eq!(result.status, TestStatus::Skipped);
        assert!(result.errors.iter().any(|e| e.contains("503")));
        assert!(result.structure.is_none());
        assert!(result.dependencies.is_none());
    }
}

#[tokio::test]
async fn verified_tree_flows_into_passing_report() {
    let output = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    populate_project(project.path());

    let orchestrator = TestOrchestrator::new(UnavailableClient, output.path(), None)
        .with_runner(ProcessRunner::with_package_manager("echo"));
    let config = test_config("tier1-minimal", 1, Priority::P0);

    let result = orchestrator.verify_tree(project.path(), &config).await;
    assert_eq!(result.status, TestStatus::Passed);

    let text = summary(&[result]);
    assert!(text.contains("Total: 1  Passed: 1  Failed: 0  Skipped: 0"));
    assert!(text.contains("P0: 1/1 passed (100%) ✅"));
    assert!(text.contains("files: 1/1"));
}

#[tokio::test]
async fn incomplete_tree_flows_into_gap_analysis() {
    let output = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    // package.json and the env contract file are both missing.

    let orchestrator = TestOrchestrator::new(UnavailableClient, output.path(), None)
        .with_runner(ProcessRunner::with_package_manager("echo"));
    let config = test_config("tier1-minimal", 1, Priority::P0);

    let result = orchestrator.verify_tree(project.path(), &config).await;
    assert_eq!(result.status, TestStatus::Failed);

    let gap = gap_analysis(&[result]);
    assert!(gap.contains("## Missing Files"));
    assert!(gap.contains("package.json"));
    assert!(gap.contains("### Tier 1: tier1-minimal"));
    assert!(gap.contains("missing env var(s): DATABASE_URL"));
}

#[tokio::test]
async fn mixed_suite_report_counts_are_exact() {
    let output = TempDir::new().unwrap();
    let passing_project = TempDir::new().unwrap();
    populate_project(passing_project.path());
    let failing_project = TempDir::new().unwrap();

    let orchestrator = TestOrchestrator::new(UnavailableClient, output.path(), None)
        .with_runner(ProcessRunner::with_package_manager("echo"));

    let passing = orchestrator
        .verify_tree(passing_project.path(), &test_config("tier1-a", 1, Priority::P0))
        .await;
    let failing = orchestrator
        .verify_tree(failing_project.path(), &test_config("tier2-b", 2, Priority::P0))
        .await;
    let skipped = orchestrator
        .run_test(&test_config("tier3-c", 3, Priority::P1))
        .await;

    let results = vec![passing, failing, skipped];
    let text = summary(&results);

    assert!(text.contains("Total: 3  Passed: 1  Failed: 1  Skipped: 1"));
    assert!(text.contains("P0: 1/2 passed (50%) ❌"));
    assert!(text.contains("P1: 0/1 passed (0%) ❌"));
}

#[tokio::test]
async fn baseline_regression_is_detected_across_the_pipeline() {
    let output = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    populate_project(project.path());

    // Baseline captured with different file contents.
    let baselines = TempDir::new().unwrap();
    let baseline_tree: PathBuf = baselines.path().join("tier1-minimal");
    std::fs::create_dir_all(&baseline_tree).unwrap();
    std::fs::write(baseline_tree.join("package.json"), r#"{"name": "old"}"#).unwrap();
    std::fs::write(
        baseline_tree.join(".env.local.example"),
        "DATABASE_URL=postgres://localhost/demo\n",
    )
    .unwrap();

    let orchestrator = TestOrchestrator::new(
        UnavailableClient,
        output.path(),
        Some(baselines.path().to_path_buf()),
    )
    .with_runner(ProcessRunner::with_package_manager("echo"));
    let config = test_config("tier1-minimal", 1, Priority::P0);

    let result = orchestrator.verify_tree(project.path(), &config).await;

    assert_eq!(result.status, TestStatus::Failed);
    let diff = result.baseline.as_ref().unwrap();
    assert!(!diff.identical);
    assert_eq!(diff.checksum_mismatches, vec!["package.json"]);
    assert!(result.errors.iter().any(|e| e.contains("baseline drift")));
}
