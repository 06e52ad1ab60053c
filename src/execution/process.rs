//! Child process lifecycle: spawn, drain, deadline, reap

use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use log::{debug, warn};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::Config;
use crate::errors::{Result, ServiceError};
use crate::execution::capture::{drain_capped, CapturedStream};
use crate::validation::ExecutionRequest;

/// Interpreter for caller-supplied command lines. The contract is a shell
/// command line, not an argument vector: pipes, redirection, and globbing
/// are expected to work.
const SHELL: &str = "/bin/sh";

/// Outcome of one command execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated instead of exiting on its own
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
    /// Elapsed wall-clock time
    pub duration: Duration,
}

/// Runs validated requests as child processes
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Execute a command line and capture its outcome.
    ///
    /// The child is placed in its own process group so any descendants it
    /// spawns are reachable as a unit when the deadline fires. Both output
    /// pipes are drained while waiting; a child that fills its pipe buffer
    /// cannot deadlock the wait.
    pub async fn execute(request: &ExecutionRequest, config: &Config) -> Result<ExecutionResult> {
        let start = Instant::now();

        let mut child = Command::new(SHELL)
            .arg("-c")
            .arg(&request.command)
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .map_err(ServiceError::Spawn)?;

        // Group id equals the child pid; grab it before the child is reaped.
        let pid = child.id();

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ServiceError::Internal("child stdout pipe missing".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ServiceError::Internal("child stderr pipe missing".to_string()))?;

        let cap = config.max_output_bytes;
        let stdout_task = tokio::spawn(drain_capped(stdout, cap));
        let stderr_task = tokio::spawn(drain_capped(stderr, cap));

        let (exit_code, timed_out) = match time::timeout(request.timeout, child.wait()).await {
            Ok(Ok(status)) => (Some(exit_code_of(status)), false),
            Ok(Err(e)) => {
                return Err(ServiceError::Internal(format!(
                    "waiting for child failed: {}",
                    e
                )))
            }
            Err(_) => {
                terminate_group(&mut child, pid, config.kill_grace).await;
                (None, true)
            }
        };

        let (stdout, stderr) = futures::future::try_join(
            finish_capture(stdout_task),
            finish_capture(stderr_task),
        )
        .await?;

        Ok(ExecutionResult {
            stdout: stdout.text,
            stderr: stderr.text,
            exit_code,
            timed_out,
            stdout_truncated: stdout.truncated,
            stderr_truncated: stderr.truncated,
            duration: start.elapsed(),
        })
    }
}

/// Map an exit status to a single code; deaths by signal become `128 + signo`.
fn exit_code_of(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => 128 + status.signal().unwrap_or(0),
    }
}

/// Stop a timed-out child: SIGTERM to the whole group, a short grace
/// interval, then SIGKILL if the group has not exited, and finally reap.
async fn terminate_group(child: &mut Child, pid: Option<u32>, grace: Duration) {
    let Some(pid) = pid else {
        // Already reaped between the deadline firing and this call.
        return;
    };
    let group = Pid::from_raw(pid as i32);

    if let Err(e) = killpg(group, Signal::SIGTERM) {
        debug!("SIGTERM to process group {} failed: {}", pid, e);
    }

    if time::timeout(grace, child.wait()).await.is_err() {
        warn!("Process group {} survived SIGTERM, sending SIGKILL", pid);
        if let Err(e) = killpg(group, Signal::SIGKILL) {
            debug!("SIGKILL to process group {} failed: {}", pid, e);
        }
        let _ = child.wait().await;
    }
}

async fn finish_capture(
    task: JoinHandle<std::io::Result<CapturedStream>>,
) -> Result<CapturedStream> {
    match task.await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(ServiceError::Internal(format!(
            "output capture failed: {}",
            e
        ))),
        Err(e) => Err(ServiceError::Internal(format!("capture task aborted: {}", e))),
    }
}
