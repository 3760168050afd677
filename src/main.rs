//! Export verification CLI.
//!
//! Runs a suite of export verification tests against a live export service
//! and prints the summary report.

use std::path::PathBuf;
use std::process::ExitCode;

use export_verify::{
    gap_analysis, load_suite, summary, HttpExportClient, TestOrchestrator, TestStatus,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <suite.json>", args[0]);
        eprintln!("\nRuns every test in the suite against the export service.");
        eprintln!("\nEnvironment variables:");
        eprintln!("  EXPORT_BASE_URL      Export service base URL (default: http://localhost:3000)");
        eprintln!("  EXPORT_OUTPUT_DIR    Working directory for downloads (default: ./export-verify-output)");
        eprintln!("  EXPORT_BASELINE_DIR  Baseline trees, one subdirectory per test id (optional)");
        return ExitCode::FAILURE;
    }

    let suite_path = PathBuf::from(&args[1]);
    let configs = match load_suite(&suite_path) {
        Ok(configs) => configs,
        Err(e) => {
            eprintln!("Failed to load suite: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let base_url =
        std::env::var("EXPORT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let output_dir = std::env::var("EXPORT_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("export-verify-output"));
    let baseline_dir = std::env::var("EXPORT_BASELINE_DIR").ok().map(PathBuf::from);

    tracing::info!(
        suite = %suite_path.display(),
        tests = configs.len(),
        base_url = %base_url,
        "starting verification run"
    );

    let client = HttpExportClient::new(base_url);
    let orchestrator = TestOrchestrator::new(client, output_dir.clone(), baseline_dir);
    let results = orchestrator.run_suite(&configs).await;

    println!("{}", summary(&results));

    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        eprintln!("Failed to create output directory: {}", e);
        return ExitCode::FAILURE;
    }

    let any_failed = results.iter().any(|r| r.status != TestStatus::Passed);
    if any_failed {
        let gap_path = output_dir.join("gap-analysis.md");
        if let Err(e) = std::fs::write(&gap_path, gap_analysis(&results)) {
            eprintln!("Failed to write gap analysis: {}", e);
        } else {
            println!("Gap analysis: {}", gap_path.display());
        }
    }

    match serde_json::to_string_pretty(&results) {
        Ok(json) => {
            let results_path = output_dir.join("results.json");
            if let Err(e) = std::fs::write(&results_path, json) {
                eprintln!("Failed to write results: {}", e);
            }
        }
        Err(e) => eprintln!("Failed to serialize results: {}", e),
    }

    if any_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
