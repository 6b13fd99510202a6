//! Mount backend abstraction.
//!
//! Each variant drives one external FUSE helper binary behind the same
//! [`Mounter`] contract, so callers can switch helpers without code changes.
//! Variants register themselves with the [`registry`] at compile time.

use crate::errors::MountError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod engine;
pub mod factory;
pub mod rclone;
pub mod registry;
pub mod s3fs;

pub use engine::Mounter;
pub use factory::MounterFactory;
pub use rclone::RcloneMounter;
pub use registry::{available_mounters, create_mounter, is_registered};
pub use s3fs::S3fsMounter;

/// Available mounter implementations, one per helper binary.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MounterKind {
    S3fs,
    Rclone,
}

impl MounterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MounterKind::S3fs => "s3fs",
            MounterKind::Rclone => "rclone",
        }
    }
}

impl fmt::Display for MounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MounterKind {
    type Err = MountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3fs" => Ok(MounterKind::S3fs),
            "rclone" => Ok(MounterKind::Rclone),
            _ => Err(MountError::Config(format!(
                "Unknown mounter type: '{}'. Supported: s3fs, rclone",
                s
            ))),
        }
    }
}
