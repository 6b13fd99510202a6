//! Constants for mountlite
//!
//! Centralized location for helper program names, helper option strings,
//! credential file layout and timing defaults. The option strings are part
//! of each helper's command-line grammar and must match it byte for byte.

/// External helper programs.
pub mod helpers {
    pub const S3FS: &str = "s3fs";
    pub const RCLONE: &str = "rclone";
}

/// s3fs `-o` options.
pub mod s3fs_options {
    pub const OPTION_FLAG: &str = "-o";
    pub const USE_PATH_REQUEST_STYLE: &str = "use_path_request_style";
    pub const ALLOW_OTHER: &str = "allow_other";
    pub const MP_UMASK_ALL: &str = "mp_umask=000";
    pub const URL_PREFIX: &str = "url=";
    /// s3fs names its region option `endpoint`.
    pub const REGION_PREFIX: &str = "endpoint=";
}

/// rclone `mount` flags.
pub mod rclone_flags {
    pub const SUBCOMMAND: &str = "mount";
    pub const DAEMON: &str = "--daemon";
    pub const PROVIDER_AWS: &str = "--s3-provider=AWS";
    pub const ENV_AUTH: &str = "--s3-env-auth=true";
    pub const ENDPOINT_PREFIX: &str = "--s3-endpoint=";
    pub const ALLOW_OTHER: &str = "--allow-other";
    pub const VFS_CACHE_WRITES: &str = "--vfs-cache-mode=writes";
    pub const REGION_PREFIX: &str = "--s3-region=";
}

/// Environment variables handed to helpers.
pub mod envs {
    pub const HOME: &str = "HOME";
    pub const PATH: &str = "PATH";
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
}

/// AWS shared credentials file layout.
pub mod credentials {
    /// Directory under the home directory.
    pub const DIR_NAME: &str = ".aws";

    /// File inside [`DIR_NAME`].
    pub const FILE_NAME: &str = "credentials";

    pub const DEFAULT_PROFILE: &str = "default";

    pub const DIR_MODE: u32 = 0o700;
    pub const FILE_MODE: u32 = 0o600;

    /// Prefix for per-mount scratch homes.
    pub const SCRATCH_PREFIX: &str = "mountlite-creds-";
}

/// Timing defaults for helper supervision.
pub mod timing {
    /// Default limit on helper execution (ms).
    pub const DEFAULT_HELPER_TIMEOUT_MS: u64 = 120_000;

    /// Default wait for the mount to appear after the helper exits (ms).
    pub const DEFAULT_MOUNT_WAIT_MS: u64 = 10_000;

    /// Mount table polling interval (ms).
    pub const MOUNT_POLL_INTERVAL_MS: u64 = 100;
}

/// Mount table of the current process.
pub const PROC_SELF_MOUNTS: &str = "/proc/self/mounts";
