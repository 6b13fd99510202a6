//! Shared FUSE helper invocation.
//!
//! Every mounter variant ends up here: locate the helper binary, run it with
//! the assembled arguments under a timeout and a cancellation token, and
//! wait until the target shows up in the mount table.
//!
//! Helpers such as s3fs and `rclone --daemon` fork a background process that
//! keeps serving the filesystem. Output is therefore captured into an
//! anonymous file rather than pipes, so the daemon inheriting the descriptors
//! cannot keep us waiting for EOF.

mod mounts;

pub use mounts::{is_mount_point, parse_mount_points};

use crate::constants::{envs, timing};
use crate::errors::MountInvocationError;
use crate::options::HelperOptions;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Helper Command
// ============================================================================

/// One invocation of an external mount helper.
#[derive(Clone, PartialEq, Eq)]
pub struct HelperCommand {
    /// Program name (looked up) or path (used as is).
    pub program: String,
    pub args: Vec<String>,
    /// Added on top of the inherited environment.
    pub envs: Vec<(String, String)>,
}

impl HelperCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

// Env values may carry credentials; only their names are printed.
impl fmt::Debug for HelperCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_keys: Vec<&str> = self.envs.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("HelperCommand")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("envs", &env_keys)
            .finish()
    }
}

// ============================================================================
// Helper Lookup
// ============================================================================

/// Find the helper binary.
///
/// A program containing `/` is used as a path. Otherwise `helper_dir` is
/// searched first, then every `PATH` entry.
///
/// # Returns
/// * `Ok(PathBuf)` - Path to an executable file
/// * `Err(HelperNotFound)` - Not found; the error lists every location tried
pub fn locate_helper(
    program: &str,
    helper_dir: Option<&Path>,
) -> Result<PathBuf, MountInvocationError> {
    let mut candidates = Vec::new();

    if program.contains('/') {
        candidates.push(PathBuf::from(program));
    } else {
        if let Some(dir) = helper_dir {
            candidates.push(dir.join(program));
        }
        if let Some(path_var) = std::env::var_os(envs::PATH) {
            candidates.extend(std::env::split_paths(&path_var).map(|dir| dir.join(program)));
        }
    }

    for candidate in &candidates {
        if is_executable(candidate) {
            tracing::debug!(helper = %candidate.display(), "Found mount helper");
            return Ok(candidate.clone());
        }
    }

    Err(MountInvocationError::HelperNotFound {
        program: program.to_string(),
        searched: candidates,
    })
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

// ============================================================================
// Invocation
// ============================================================================

/// Run a mount helper and wait for `target` to become a mount point.
///
/// Failures are reported as-is: helper diagnostics end up in
/// [`MountInvocationError::HelperFailed`], nothing is retried, and partial
/// state left behind by the helper is not cleaned up.
pub async fn fuse_mount(
    target: &Path,
    command: &HelperCommand,
    options: &HelperOptions,
    cancel: &CancellationToken,
) -> Result<(), MountInvocationError> {
    let program = command.program.as_str();
    let binary = locate_helper(program, options.helper_dir.as_deref())?;

    tracing::info!(
        program,
        mount_point = %target.display(),
        "Mounting with FUSE helper"
    );
    tracing::debug!(command = ?command, "Helper invocation");

    // Resolved while the target is still a plain directory; once the helper
    // has mounted over it, lookups go through the FUSE daemon.
    let resolved = tokio::fs::canonicalize(target)
        .await
        .unwrap_or_else(|_| target.to_path_buf());

    let spawn_err = |source: std::io::Error| MountInvocationError::Spawn {
        program: program.to_string(),
        source,
    };

    let mut log = tempfile::tempfile().map_err(spawn_err)?;
    let mut cmd = Command::new(&binary);
    cmd.args(&command.args)
        .envs(command.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(log.try_clone().map_err(spawn_err)?)
        .stderr(log.try_clone().map_err(spawn_err)?)
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(spawn_err)?;
    tracing::debug!(program, pid = ?child.id(), "Mount helper started");

    let status = supervise(&mut child, program, options.helper_timeout(), cancel).await?;
    if !status.success() {
        let output = read_output(&mut log);
        tracing::warn!(
            program,
            status = ?status.code(),
            output = %output,
            "Mount helper failed"
        );
        return Err(MountInvocationError::HelperFailed {
            program: program.to_string(),
            status: status.code(),
            output,
        });
    }

    if let Some(wait) = options.mount_wait() {
        wait_for_mount(&resolved, program, wait, cancel).await?;
    }

    tracing::info!(program, mount_point = %target.display(), "Mounted");
    Ok(())
}

async fn supervise(
    child: &mut Child,
    program: &str,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<ExitStatus, MountInvocationError> {
    let deadline = async {
        match timeout {
            Some(t) => tokio::time::sleep(t).await,
            None => std::future::pending().await,
        }
    };

    let outcome = tokio::select! {
        status = child.wait() => {
            return status.map_err(|source| MountInvocationError::Spawn {
                program: program.to_string(),
                source,
            });
        }
        _ = cancel.cancelled() => MountInvocationError::Cancelled {
            program: program.to_string(),
        },
        _ = deadline => MountInvocationError::TimedOut {
            program: program.to_string(),
            // deadline only fires when a timeout is set
            timeout: timeout.unwrap_or_default(),
        },
    };

    tracing::warn!(program, error = %outcome, "Killing mount helper");
    if let Err(e) = child.start_kill() {
        tracing::debug!(program, error = %e, "Failed to kill mount helper");
    }
    let _ = child.wait().await;
    Err(outcome)
}

fn read_output(log: &mut File) -> String {
    let mut output = Vec::new();
    if let Err(e) = log
        .seek(SeekFrom::Start(0))
        .and_then(|_| log.read_to_end(&mut output))
    {
        tracing::debug!(error = %e, "Failed to read mount helper output");
    }
    String::from_utf8_lossy(&output).trim().to_string()
}

/// Poll the mount table until `target` is mounted or `wait` elapses.
///
/// `target` is compared against the mount table as given, so it must
/// already be canonical.
pub async fn wait_for_mount(
    target: &Path,
    program: &str,
    wait: Duration,
    cancel: &CancellationToken,
) -> Result<(), MountInvocationError> {
    let interval = Duration::from_millis(timing::MOUNT_POLL_INTERVAL_MS);
    let deadline = tokio::time::Instant::now() + wait;

    for attempt in 0u32.. {
        if is_mount_point(target).await {
            tracing::debug!(mount_point = %target.display(), attempt, "Mount ready");
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            break;
        }
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(MountInvocationError::Cancelled {
                    program: program.to_string(),
                });
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    Err(MountInvocationError::MountNotReady {
        target: target.to_path_buf(),
        waited: wait,
    })
}
