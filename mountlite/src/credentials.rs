//! AWS shared-credentials provisioning for mount helpers.
//!
//! Helpers such as s3fs read `~/.aws/credentials` at startup. Provisioning
//! overwrites that file with a single `default` profile; it is never read
//! back here.

use crate::constants::{credentials as consts, envs};
use crate::errors::CredentialError;
use crate::options::{CredentialScope, HelperOptions};
use std::fs::{self, DirBuilder, Permissions};
use std::io::Write;
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Where the home directory comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeDir {
    /// Home directory of the invoking user.
    Current,
    /// An explicit directory.
    Fixed(PathBuf),
}

impl HomeDir {
    fn resolve(&self) -> Result<PathBuf, CredentialError> {
        let home = match self {
            HomeDir::Current => dirs::home_dir(),
            HomeDir::Fixed(path) => Some(path.clone()),
        };
        home.filter(|p| !p.as_os_str().is_empty())
            .ok_or(CredentialError::HomeDirResolution)
    }
}

/// Writes the credentials profile a helper reads at mount time.
#[derive(Debug, Clone)]
pub struct CredentialProvisioner {
    home: HomeDir,
}

impl Default for CredentialProvisioner {
    fn default() -> Self {
        Self::for_current_user()
    }
}

impl CredentialProvisioner {
    pub fn for_current_user() -> Self {
        Self {
            home: HomeDir::Current,
        }
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: HomeDir::Fixed(home.into()),
        }
    }

    /// Path of the credentials file, without touching the filesystem.
    pub fn credentials_path(&self) -> Result<PathBuf, CredentialError> {
        Ok(self
            .home
            .resolve()?
            .join(consts::DIR_NAME)
            .join(consts::FILE_NAME))
    }

    /// Overwrite the credentials file with one `default` profile.
    ///
    /// The directory is created with mode 0700 (and tightened to it if it
    /// already existed); the file ends up with mode 0600. The new content
    /// replaces the old file by rename, so concurrent readers see either
    /// the previous profile or the new one.
    ///
    /// Returns the path of the written file.
    pub fn provision(
        &self,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Result<PathBuf, CredentialError> {
        let home = self.home.resolve()?;
        let dir = home.join(consts::DIR_NAME);
        let path = dir.join(consts::FILE_NAME);

        ensure_private_dir(&dir)?;
        write_private_file(&dir, &path, &render_profile(access_key_id, secret_access_key))?;

        tracing::debug!(path = %path.display(), "Wrote credentials profile");
        Ok(path)
    }
}

/// Render the credentials file content.
pub fn render_profile(access_key_id: &str, secret_access_key: &str) -> String {
    format!(
        "[{}]\naws_access_key_id = {}\naws_secret_access_key = {}\n",
        consts::DEFAULT_PROFILE,
        access_key_id,
        secret_access_key
    )
}

fn ensure_private_dir(dir: &Path) -> Result<(), CredentialError> {
    DirBuilder::new()
        .recursive(true)
        .mode(consts::DIR_MODE)
        .create(dir)
        .map_err(|e| CredentialError::directory_create(dir, e))?;

    fs::set_permissions(dir, Permissions::from_mode(consts::DIR_MODE))
        .map_err(|e| CredentialError::directory_create(dir, e))
}

fn write_private_file(dir: &Path, path: &Path, content: &str) -> Result<(), CredentialError> {
    let write_err = |e: std::io::Error| CredentialError::credential_write(path, e);

    let mut tmp = tempfile::Builder::new()
        .prefix(".credentials-")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.as_file()
        .set_permissions(Permissions::from_mode(consts::FILE_MODE))
        .map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

// ============================================================================
// Per-invocation provisioning
// ============================================================================

/// Credentials provisioned for a single helper invocation.
///
/// Holds the per-mount scratch home (if any) alive until dropped.
#[derive(Debug)]
pub struct ProvisionedCredentials {
    path: PathBuf,
    envs: Vec<(String, String)>,
    _scratch: Option<TempDir>,
}

impl ProvisionedCredentials {
    /// Path of the credentials file the helper will read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Environment overrides pointing the helper at the credentials.
    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }
}

/// Provision credentials according to `options.credential_scope`.
pub fn provision_for_mount(
    options: &HelperOptions,
    access_key_id: &str,
    secret_access_key: &str,
) -> Result<ProvisionedCredentials, CredentialError> {
    match options.credential_scope {
        CredentialScope::User => {
            // An overridden home must also be the helper's HOME, or it would
            // look for the file somewhere else.
            let (provisioner, envs) = match &options.home_dir {
                Some(home) => (CredentialProvisioner::with_home(home), vec![home_env(home)?]),
                None => (CredentialProvisioner::for_current_user(), Vec::new()),
            };
            let path = provisioner.provision(access_key_id, secret_access_key)?;
            Ok(ProvisionedCredentials {
                path,
                envs,
                _scratch: None,
            })
        }
        CredentialScope::PerMount => {
            let scratch = create_scratch_home(options.scratch_dir.as_deref())?;
            let envs = vec![home_env(scratch.path())?];
            let path = CredentialProvisioner::with_home(scratch.path())
                .provision(access_key_id, secret_access_key)?;
            Ok(ProvisionedCredentials {
                path,
                envs,
                _scratch: Some(scratch),
            })
        }
    }
}

/// `HOME` override for the helper. The value must name exactly the directory
/// that was written, so non-UTF-8 paths are refused.
fn home_env(home: &Path) -> Result<(String, String), CredentialError> {
    let home = home.to_str().ok_or(CredentialError::HomeDirResolution)?;
    Ok((envs::HOME.to_string(), home.to_string()))
}

fn create_scratch_home(parent: Option<&Path>) -> Result<TempDir, CredentialError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(consts::SCRATCH_PREFIX);

    let result = match parent {
        Some(parent) => builder.tempdir_in(parent),
        None => builder.tempdir(),
    };
    let scratch = result.map_err(|e| {
        let parent = parent.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        CredentialError::directory_create(parent, e)
    })?;

    fs::set_permissions(scratch.path(), Permissions::from_mode(consts::DIR_MODE))
        .map_err(|e| CredentialError::directory_create(scratch.path(), e))?;
    Ok(scratch)
}
