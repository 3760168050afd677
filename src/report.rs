//! Report generation.
//!
//! Pure functions from test results to text: a console-friendly summary and
//! a Markdown gap-analysis for remediation. No I/O happens here; callers
//! decide where the strings go.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::Priority;
use crate::orchestrator::{TestResult, TestStatus};
use crate::process::BuildResult;

const RULE_WIDTH: usize = 60;

/// How many missing files a gap-analysis table cell shows before truncating.
const MISSING_FILES_SHOWN: usize = 3;

fn status_glyph(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "✅",
        TestStatus::Failed => "❌",
        TestStatus::Skipped => "⏭️",
    }
}

/// Three-tier health glyph for a priority rollup.
fn rate_glyph(percent: u32) -> &'static str {
    if percent == 100 {
        "✅"
    } else if percent >= 75 {
        "⚠️"
    } else {
        "❌"
    }
}

fn build_status_text(result: &TestResult) -> &'static str {
    match (&result.dependencies, &result.build) {
        (_, Some(build)) if build.success => "ok",
        (_, Some(_)) => "failed",
        (Some(install), None) if !install.success => "install failed",
        _ => "skipped",
    }
}

fn file_ratio(result: &TestResult) -> String {
    match &result.structure {
        Some(structure) => format!("{}/{}", structure.found, structure.expected),
        None => "-/-".to_string(),
    }
}

/// Renders the human-readable run summary, grouped by tier.
pub fn summary(results: &[TestResult]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    out.push_str(&rule);
    out.push_str("\nEXPORT VERIFICATION SUMMARY\n");
    out.push_str(&rule);
    out.push('\n');

    for tier in 1..=4u8 {
        let tier_results: Vec<&TestResult> = results.iter().filter(|r| r.tier == tier).collect();
        if tier_results.is_empty() {
            continue;
        }

        out.push_str(&format!("\nTier {}\n", tier));
        for result in tier_results {
            out.push_str(&format!(
                "  {} {} [{}] build: {} files: {}\n",
                status_glyph(result.status),
                result.name,
                result.priority.label(),
                build_status_text(result),
                file_ratio(result),
            ));
            for error in &result.errors {
                out.push_str(&format!("       - {}\n", error));
            }
        }
    }

    let total = results.len();
    let passed = results.iter().filter(|r| r.status == TestStatus::Passed).count();
    let failed = results.iter().filter(|r| r.status == TestStatus::Failed).count();
    let skipped = results.iter().filter(|r| r.status == TestStatus::Skipped).count();

    out.push('\n');
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push_str(&format!(
        "\nTotal: {}  Passed: {}  Failed: {}  Skipped: {}\n",
        total, passed, failed, skipped
    ));

    out.push_str("\nPriority rollup:\n");
    for priority in Priority::ALL {
        let of_priority: Vec<&TestResult> =
            results.iter().filter(|r| r.priority == priority).collect();
        if of_priority.is_empty() {
            continue;
        }
        let priority_passed = of_priority
            .iter()
            .filter(|r| r.status == TestStatus::Passed)
            .count();
        let percent =
            ((priority_passed as f64 / of_priority.len() as f64) * 100.0).round() as u32;
        out.push_str(&format!(
            "  {}: {}/{} passed ({}%) {}\n",
            priority.label(),
            priority_passed,
            of_priority.len(),
            percent,
            rate_glyph(percent),
        ));
    }

    out.push_str(&rule);
    out.push('\n');
    out
}

/// Heuristic root cause: the first `error: ...`-shaped line in the captured
/// output, stderr preferred.
fn root_cause_hint(build: &BuildResult) -> Option<String> {
    static ERROR_LINE: OnceLock<Regex> = OnceLock::new();
    let re = ERROR_LINE
        .get_or_init(|| Regex::new(r"(?mi)^.*error[: ].*$").expect("static pattern"));
    re.find(&build.stderr)
        .or_else(|| re.find(&build.stdout))
        .map(|m| m.as_str().trim().to_string())
}

fn truncated_list(items: &[String], limit: usize) -> String {
    if items.len() <= limit {
        items.join(", ")
    } else {
        format!(
            "{} (+{} more)",
            items[..limit].join(", "),
            items.len() - limit
        )
    }
}

/// Renders the Markdown gap analysis covering failing tests only.
pub fn gap_analysis(results: &[TestResult]) -> String {
    let failing: Vec<&TestResult> = results
        .iter()
        .filter(|r| r.status != TestStatus::Passed)
        .collect();

    let mut out = String::from("# Gap Analysis\n");
    if failing.is_empty() {
        out.push_str("\nNo failing tests.\n");
        return out;
    }

    let missing_rows: Vec<(&str, &Vec<String>)> = failing
        .iter()
        .filter_map(|r| {
            r.structure
                .as_ref()
                .filter(|s| !s.missing.is_empty())
                .map(|s| (r.name.as_str(), &s.missing))
        })
        .collect();
    if !missing_rows.is_empty() {
        out.push_str("\n## Missing Files\n\n");
        out.push_str("| Test | Missing |\n| --- | --- |\n");
        for (name, missing) in &missing_rows {
            out.push_str(&format!(
                "| {} | {} |\n",
                name,
                truncated_list(missing, MISSING_FILES_SHOWN)
            ));
        }
    }

    let build_failures: Vec<(&&TestResult, &'static str, &BuildResult)> = failing
        .iter()
        .filter_map(|r| {
            if let Some(install) = r.dependencies.as_ref().filter(|b| !b.success) {
                Some((r, "install", install))
            } else if let Some(build) = r.build.as_ref().filter(|b| !b.success) {
                Some((r, "build", build))
            } else {
                None
            }
        })
        .collect();
    if !build_failures.is_empty() {
        out.push_str("\n## Build Failures\n\n");
        out.push_str("| Test | Stage | Hint |\n| --- | --- | --- |\n");
        for (result, stage, build) in &build_failures {
            let hint = root_cause_hint(build)
                .unwrap_or_else(|| format!("exit code {}", build.exit_code));
            out.push_str(&format!("| {} | {} | {} |\n", result.name, stage, hint));
        }
    }

    out.push_str("\n## Remediation\n");
    for result in &failing {
        out.push_str(&format!("\n### {}\n\n", result.name));
        if let Some(structure) = result.structure.as_ref().filter(|s| !s.missing.is_empty()) {
            out.push_str(&format!(
                "- Restore missing files: {}\n",
                truncated_list(&structure.missing, MISSING_FILES_SHOWN)
            ));
        }
        for error in &result.errors {
            out.push_str(&format!("- {}\n", error));
        }
    }

    out
}
