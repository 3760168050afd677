//! Dependency-install and build subprocess execution.
//!
//! Both stages share one shape: spawn the package manager with piped output,
//! stream stdout/stderr incrementally, and enforce a wall-clock deadline with
//! guaranteed termination. Timeouts and spawn failures are never propagated
//! as errors; they are encoded into the returned [`BuildResult`] so one
//! test's environment problem cannot abort the suite.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

/// Wall-clock limit for dependency installation.
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Wall-clock limit for the production build.
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(180);

const INSTALL_ARGS: &[&str] = &["install", "--legacy-peer-deps"];
const BUILD_ARGS: &[&str] = &["run", "build"];

/// Result of one install or build subprocess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResult {
    /// Whether the process exited with code zero.
    pub success: bool,
    /// Wall-clock duration of the stage.
    pub duration: Duration,
    /// Captured stdout, possibly truncated by a timeout.
    pub stdout: String,
    /// Captured stderr. A forced kill appends a `[TIMEOUT ...]` marker so
    /// "produced output then hung" is distinguishable from "failed fast".
    pub stderr: String,
    /// Real exit code, or -1 for timeout, signal death, or spawn failure.
    pub exit_code: i32,
}

/// Runs package-manager subprocesses for a single extracted project.
pub struct ProcessRunner {
    /// Package manager binary, `npm` by default.
    package_manager: String,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    /// Creates a runner using the default `npm` binary.
    pub fn new() -> Self {
        Self {
            package_manager: "npm".to_string(),
        }
    }

    /// Creates a runner with a custom package-manager binary.
    pub fn with_package_manager(package_manager: impl Into<String>) -> Self {
        Self {
            package_manager: package_manager.into(),
        }
    }

    /// Installs dependencies in `path`, bounded by [`INSTALL_TIMEOUT`].
    pub async fn run_install(&self, path: &Path) -> BuildResult {
        run_command(path, &self.package_manager, INSTALL_ARGS, INSTALL_TIMEOUT).await
    }

    /// Runs the production build in `path`, bounded by [`BUILD_TIMEOUT`].
    pub async fn run_build(&self, path: &Path) -> BuildResult {
        run_command(path, &self.package_manager, BUILD_ARGS, BUILD_TIMEOUT).await
    }
}

/// Spawns `program args` in `dir` and waits for exit or deadline.
///
/// The child runs in its own process group (Unix) so a timeout can terminate
/// descendants too; `kill_on_drop` backstops every other exit path. Output
/// captured before a forced kill is preserved.
pub async fn run_command(
    dir: &Path,
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> BuildResult {
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    tracing::info!(program = %program, args = ?args, dir = ?dir, "spawning command");

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(program = %program, error = %e, "failed to spawn command");
            return BuildResult {
                success: false,
                duration: start.elapsed(),
                stdout: String::new(),
                stderr: format!("failed to spawn {}: {}", program, e),
                exit_code: -1,
            };
        }
    };

    let pid = child.id();
    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");
    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();

    let mut stdout_buf = String::new();
    let mut stderr_buf = String::new();
    let mut stdout_done = false;
    let mut stderr_done = false;

    // Drain both pipes, then reap. Wrapping the whole thing in a timeout
    // releases the child borrow on expiry so the kill path can take over,
    // with everything captured so far still in the buffers.
    let wait_result = tokio::time::timeout(timeout, async {
        while !(stdout_done && stderr_done) {
            tokio::select! {
                line = stdout_reader.next_line(), if !stdout_done => {
                    match line {
                        Ok(Some(line)) => {
                            stdout_buf.push_str(&line);
                            stdout_buf.push('\n');
                        }
                        Ok(None) => stdout_done = true,
                        Err(e) => {
                            tracing::debug!(error = %e, "error reading stdout");
                            stdout_done = true;
                        }
                    }
                }
                line = stderr_reader.next_line(), if !stderr_done => {
                    match line {
                        Ok(Some(line)) => {
                            stderr_buf.push_str(&line);
                            stderr_buf.push('\n');
                        }
                        Ok(None) => stderr_done = true,
                        Err(e) => {
                            tracing::debug!(error = %e, "error reading stderr");
                            stderr_done = true;
                        }
                    }
                }
            }
        }
        child.wait().await
    })
    .await;

    match wait_result {
        Ok(Ok(status)) => {
            // Signal death has no exit code; report it as -1 like a timeout.
            let exit_code = status.code().unwrap_or(-1);
            BuildResult {
                success: exit_code == 0,
                duration: start.elapsed(),
                stdout: stdout_buf,
                stderr: stderr_buf,
                exit_code,
            }
        }
        Ok(Err(e)) => BuildResult {
            success: false,
            duration: start.elapsed(),
            stdout: stdout_buf,
            stderr: format!("{}\nfailed to wait for {}: {}", stderr_buf, program, e),
            exit_code: -1,
        },
        Err(_elapsed) => {
            kill_process_tree(&mut child, pid).await;
            stderr_buf.push_str(&format!(
                "\n[TIMEOUT: exceeded {}s limit, process killed]",
                timeout.as_secs()
            ));
            tracing::warn!(
                program = %program,
                timeout_secs = timeout.as_secs(),
                "command timed out"
            );
            BuildResult {
                success: false,
                duration: start.elapsed(),
                stdout: stdout_buf,
                stderr: stderr_buf,
                exit_code: -1,
            }
        }
    }
}

/// Terminates the child and, on Unix, its whole process group.
///
/// npm spawns its own children; signalling only the direct child would leave
/// them running past the deadline.
async fn kill_process_tree(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        let _ = Command::new("kill")
            .arg("-KILL")
            .arg("--")
            .arg(format!("-{}", pid))
            .status()
            .await;
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Err(e) = child.kill().await {
        tracing::debug!(error = %e, "kill after timeout failed");
    }
}
