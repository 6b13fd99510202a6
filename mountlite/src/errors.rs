//! Hierarchical error types for mount operations.
//!
//! Errors are categorized by where the mount failed:
//! - [`CredentialError`]: credential provisioning (nothing was spawned)
//! - [`MountInvocationError`]: the external helper or the mount itself
//!
//! Both are wrapped by [`MountError`] without altering their message, so a
//! caller sees exactly what the failing layer reported.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Top-Level Error
// ============================================================================

/// Errors returned by a [`Mounter`](crate::mounter::Mounter).
///
/// ```ignore
/// match mounter.mount(target, volume_id).await {
///     Err(MountError::Credentials(_)) => { /* no helper was started */ }
///     Err(MountError::Invocation(_)) => { /* helper diagnostics in message */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Error)]
pub enum MountError {
    /// Credentials could not be put in place for the helper.
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// The helper could not be run or did not produce a mount.
    #[error(transparent)]
    Invocation(#[from] MountInvocationError),

    /// Mounter selection or construction failed.
    #[error("config: {0}")]
    Config(String),

    /// Target path cannot be passed on the helper command line.
    #[error("target path is not valid UTF-8: {}", .0.display())]
    InvalidTarget(PathBuf),
}

pub type MountResult<T> = Result<T, MountError>;

// ============================================================================
// Credential Errors
// ============================================================================

/// Errors while writing the credentials profile read by the helper.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Home directory of the invoking user is unknown.
    #[error("failed to get home directory")]
    HomeDirResolution,

    /// Credentials directory could not be created.
    #[error("failed to create credentials directory {}: {source}", .path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Credentials file could not be written.
    #[error("failed to write credentials to {}: {source}", .path.display())]
    CredentialWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// Invocation Errors
// ============================================================================

/// Errors from running the external mount helper.
#[derive(Debug, Error)]
pub enum MountInvocationError {
    /// Helper binary is not installed where we looked.
    #[error("mount helper '{program}' not found (searched: {})", format_searched(.searched))]
    HelperNotFound {
        program: String,
        searched: Vec<PathBuf>,
    },

    /// Helper binary exists but could not be started.
    #[error("failed to spawn mount helper '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Helper ran and exited unsuccessfully.
    #[error("mount helper '{program}' failed ({}): {output}", format_status(.status))]
    HelperFailed {
        program: String,
        status: Option<i32>,
        output: String,
    },

    /// Helper did not finish in time and was killed.
    #[error("mount helper '{program}' timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    /// Caller cancelled the mount; helper was killed.
    #[error("mount helper '{program}' cancelled")]
    Cancelled { program: String },

    /// Helper exited successfully but the mount never showed up.
    #[error("{} did not become a mount point within {waited:?}", .target.display())]
    MountNotReady { target: PathBuf, waited: Duration },
}

fn format_searched(searched: &[PathBuf]) -> String {
    searched
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl CredentialError {
    /// Create a directory creation error.
    pub fn directory_create(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Create a credentials write error.
    pub fn credential_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CredentialWrite {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_hierarchy() {
        let cred_err = CredentialError::HomeDirResolution;
        let mount_err: MountError = cred_err.into();
        assert!(matches!(mount_err, MountError::Credentials(_)));

        let inv_err = MountInvocationError::Cancelled {
            program: "s3fs".into(),
        };
        let mount_err: MountError = inv_err.into();
        assert!(matches!(mount_err, MountError::Invocation(_)));
    }

    #[test]
    fn test_wrapped_message_is_unchanged() {
        let inner = CredentialError::directory_create(
            "/home/user/.aws",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let expected = inner.to_string();
        let outer: MountError = inner.into();
        assert_eq!(outer.to_string(), expected);
        assert_eq!(
            expected,
            "failed to create credentials directory /home/user/.aws: denied"
        );
    }

    #[test]
    fn test_helper_failed_display() {
        let err = MountInvocationError::HelperFailed {
            program: "s3fs".into(),
            status: Some(1),
            output: "s3fs: bucket not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "mount helper 's3fs' failed (exit status 1): s3fs: bucket not found"
        );

        let err = MountInvocationError::HelperFailed {
            program: "s3fs".into(),
            status: None,
            output: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_helper_not_found_lists_locations() {
        let err = MountInvocationError::HelperNotFound {
            program: "s3fs".into(),
            searched: vec![PathBuf::from("/usr/bin/s3fs"), PathBuf::from("/bin/s3fs")],
        };
        assert_eq!(
            err.to_string(),
            "mount helper 's3fs' not found (searched: /usr/bin/s3fs, /bin/s3fs)"
        );
    }
}
