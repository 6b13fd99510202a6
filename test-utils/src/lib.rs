//! Test fixtures for mountlite.
//!
//! [`FakeHelper`] stands in for s3fs/rclone: a shell script that records its
//! arguments, environment and the credentials file it can see, then exits
//! the way the test asks it to.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-writer tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `warn`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Fake helper
// ============================================================================

/// A fake mount helper living in its own directory.
///
/// Point `HelperOptions::helper_dir` at [`FakeHelper::dir`] so the mounter
/// picks it up instead of a real binary.
pub struct FakeHelper {
    dir: TempDir,
    name: String,
}

impl FakeHelper {
    /// Helper that records its invocation and exits 0.
    pub fn succeeding(name: &str) -> Self {
        Self::with_tail(name, "exit 0")
    }

    /// Helper that prints `message` to stderr and exits with `code`.
    pub fn failing(name: &str, code: i32, message: &str) -> Self {
        Self::with_tail(name, &format!("echo '{}' >&2\nexit {}", message, code))
    }

    /// Helper that never finishes on its own.
    pub fn hanging(name: &str) -> Self {
        Self::with_tail(name, "exec sleep 600")
    }

    fn with_tail(name: &str, tail: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create helper dir");
        let record = dir.path().join(name);
        let script = format!(
            r#"#!/bin/sh
out="{record}"
echo $$ > "$out.pid"
: > "$out.args"
for arg in "$@"; do
    printf '%s\n' "$arg" >> "$out.args"
done
env > "$out.env"
if [ -f "$HOME/.aws/credentials" ]; then
    cp "$HOME/.aws/credentials" "$out.credentials"
fi
{tail}
"#,
            record = record.display(),
            tail = tail,
        );

        let path = dir.path().join(name);
        fs::write(&path, script).expect("Failed to write fake helper");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake helper executable");

        Self {
            dir,
            name: name.to_string(),
        }
    }

    /// Directory containing the helper binary.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    fn record_path(&self, suffix: &str) -> PathBuf {
        self.dir.path().join(format!("{}.{}", self.name, suffix))
    }

    /// Whether the helper has been run.
    pub fn invoked(&self) -> bool {
        self.record_path("args").exists()
    }

    /// Arguments of the last run, one per element.
    pub fn recorded_args(&self) -> Vec<String> {
        fs::read_to_string(self.record_path("args"))
            .expect("Fake helper was not invoked")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Value of `key` in the environment of the last run.
    pub fn recorded_env(&self, key: &str) -> Option<String> {
        let env = fs::read_to_string(self.record_path("env")).ok()?;
        let prefix = format!("{}=", key);
        env.lines()
            .find_map(|line| line.strip_prefix(&prefix).map(str::to_string))
    }

    /// Process id of the last run. Hanging helpers `exec` into their final
    /// command, so this is also the pid that ends up being killed.
    pub fn recorded_pid(&self) -> Option<u32> {
        fs::read_to_string(self.record_path("pid"))
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    /// Whether the process of the last run still exists.
    pub fn is_running(&self) -> bool {
        self.recorded_pid()
            .is_some_and(|pid| Path::new(&format!("/proc/{}", pid)).exists())
    }

    /// Contents of `$HOME/.aws/credentials` as seen by the last run.
    pub fn captured_credentials(&self) -> Option<String> {
        fs::read_to_string(self.record_path("credentials")).ok()
    }
}

// ============================================================================
// Home directory
// ============================================================================

/// An isolated home directory.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create test home"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.path().join(".aws").join("credentials")
    }

    /// Contents of the credentials file, if written.
    pub fn credentials(&self) -> Option<String> {
        fs::read_to_string(self.credentials_path()).ok()
    }

    /// Mode bits (0o777 mask) of a path relative to the home.
    pub fn mode(&self, relative: &str) -> u32 {
        fs::metadata(self.dir.path().join(relative))
            .expect("Path does not exist")
            .permissions()
            .mode()
            & 0o777
    }
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}
