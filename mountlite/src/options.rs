//! Configuration for mounters.

use crate::constants::timing;
use crate::volume::{StorageConfig, VolumeMetadata};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Credential Scope
// ============================================================================

/// Where provisioned credentials live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialScope {
    /// `~/.aws/credentials` of the invoking user, shared by every mount.
    ///
    /// Concurrent mounts with different credentials race on this file and
    /// the last writer wins.
    #[default]
    User,

    /// A private scratch home per mount call, exposed to that helper only
    /// through its `HOME` variable. Removed once the helper has finished.
    PerMount,
}

// ============================================================================
// Helper Options
// ============================================================================

/// Options controlling how helpers are located, supervised and fed
/// credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperOptions {
    /// Directory searched for helper binaries before `PATH`.
    #[serde(default)]
    pub helper_dir: Option<PathBuf>,

    /// Home directory used by [`CredentialScope::User`].
    ///
    /// Default: the invoking user's home directory.
    #[serde(default)]
    pub home_dir: Option<PathBuf>,

    /// Parent directory for [`CredentialScope::PerMount`] scratch homes.
    ///
    /// Default: the system temp directory.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    #[serde(default)]
    pub credential_scope: CredentialScope,

    /// Kill the helper if it runs longer than this. `None` waits forever.
    ///
    /// Default: 120000
    #[serde(default = "default_helper_timeout_ms")]
    pub helper_timeout_ms: Option<u64>,

    /// How long to wait for the target to show up in the mount table after
    /// the helper exits. `None` skips the check.
    ///
    /// Default: 10000
    #[serde(default = "default_mount_wait_ms")]
    pub mount_wait_ms: Option<u64>,
}

fn default_helper_timeout_ms() -> Option<u64> {
    Some(timing::DEFAULT_HELPER_TIMEOUT_MS)
}

fn default_mount_wait_ms() -> Option<u64> {
    Some(timing::DEFAULT_MOUNT_WAIT_MS)
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for HelperOptions {
    fn default() -> Self {
        Self {
            helper_dir: None,
            home_dir: None,
            scratch_dir: None,
            credential_scope: CredentialScope::default(),
            helper_timeout_ms: default_helper_timeout_ms(),
            mount_wait_ms: default_mount_wait_ms(),
        }
    }
}

impl HelperOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn helper_timeout(&self) -> Option<Duration> {
        self.helper_timeout_ms.map(Duration::from_millis)
    }

    pub fn mount_wait(&self) -> Option<Duration> {
        self.mount_wait_ms.map(Duration::from_millis)
    }

    pub fn with_helper_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.helper_dir = Some(dir.into());
        self
    }

    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn with_credential_scope(mut self, scope: CredentialScope) -> Self {
        self.credential_scope = scope;
        self
    }

    pub fn with_helper_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.helper_timeout_ms = timeout.map(saturating_millis);
        self
    }

    pub fn with_mount_wait(mut self, wait: Option<Duration>) -> Self {
        self.mount_wait_ms = wait.map(saturating_millis);
        self
    }
}

// ============================================================================
// Mounter Config
// ============================================================================

/// Everything a mounter variant is constructed from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MounterConfig {
    pub meta: VolumeMetadata,
    pub storage: StorageConfig,
    #[serde(default)]
    pub options: HelperOptions,
}

impl MounterConfig {
    pub fn new(meta: VolumeMetadata, storage: StorageConfig) -> Self {
        Self {
            meta,
            storage,
            options: HelperOptions::default(),
        }
    }

    pub fn with_options(mut self, options: HelperOptions) -> Self {
        self.options = options;
        self
    }
}
