//! rclone mounter.
//!
//! Uses rclone's on-the-fly `:s3:` remote, so no rclone config file is
//! needed. Credentials go to the helper through `AWS_ACCESS_KEY_ID` and
//! `AWS_SECRET_ACCESS_KEY` in its environment (`--s3-env-auth`); nothing is
//! written to disk.

mod factory;

pub use factory::RcloneFactory;

use crate::constants::{envs, helpers, rclone_flags as flags};
use crate::errors::MountResult;
use crate::fuse::{self, HelperCommand};
use crate::mounter::engine::target_arg;
use crate::mounter::{Mounter, MounterKind};
use crate::options::{HelperOptions, MounterConfig};
use crate::volume::{StorageConfig, VolumeMetadata};
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Mounts a bucket through `rclone mount --daemon`.
#[derive(Debug, Clone)]
pub struct RcloneMounter {
    meta: VolumeMetadata,
    storage: StorageConfig,
    options: HelperOptions,
}

impl RcloneMounter {
    pub fn new(config: MounterConfig) -> Self {
        Self {
            meta: config.meta,
            storage: config.storage,
            options: config.options,
        }
    }

    /// Remote path, `:s3:<bucket>/<prefix>` (just the bucket if no prefix).
    pub fn remote(&self) -> String {
        let prefix = self.meta.prefix.trim_matches('/');
        if prefix.is_empty() {
            format!(":s3:{}", self.meta.bucket_name)
        } else {
            format!(":s3:{}/{}", self.meta.bucket_name, prefix)
        }
    }

    /// Full rclone argument vector for `target`.
    pub fn helper_args(&self, target: &str) -> Vec<String> {
        let mut args = vec![
            flags::SUBCOMMAND.to_string(),
            self.remote(),
            target.to_string(),
            flags::DAEMON.to_string(),
            flags::PROVIDER_AWS.to_string(),
            flags::ENV_AUTH.to_string(),
            format!("{}{}", flags::ENDPOINT_PREFIX, self.storage.endpoint),
            flags::ALLOW_OTHER.to_string(),
            flags::VFS_CACHE_WRITES.to_string(),
        ];

        if let Some(region) = self.storage.region() {
            args.push(format!("{}{}", flags::REGION_PREFIX, region));
        }

        args.extend(self.meta.mount_options.iter().cloned());
        args
    }
}

#[async_trait]
impl Mounter for RcloneMounter {
    fn kind(&self) -> MounterKind {
        MounterKind::Rclone
    }

    fn helper_command(&self, target: &str) -> HelperCommand {
        HelperCommand::new(helpers::RCLONE).args(self.helper_args(target))
    }

    async fn mount_with_cancel(
        &self,
        target: &Path,
        volume_id: &str,
        cancel: &CancellationToken,
    ) -> MountResult<()> {
        let target_str = target_arg(target)?;

        tracing::info!(
            volume_id,
            bucket = %self.meta.bucket_name,
            prefix = %self.meta.prefix,
            mount_point = target_str,
            "Mounting volume with rclone"
        );

        let command = self
            .helper_command(target_str)
            .env(envs::AWS_ACCESS_KEY_ID, self.storage.access_key_id.expose())
            .env(
                envs::AWS_SECRET_ACCESS_KEY,
                self.storage.secret_access_key.expose(),
            );

        fuse::fuse_mount(target, &command, &self.options, cancel).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounter(prefix: &str, region: &str) -> RcloneMounter {
        let meta = VolumeMetadata::new("data", prefix).with_mount_options(["--read-only"]);
        let storage =
            StorageConfig::new("http://minio.local:9000", "ak", "sk").with_region(region);
        RcloneMounter::new(MounterConfig::new(meta, storage))
    }

    #[test]
    fn test_remote() {
        assert_eq!(mounter("images", "").remote(), ":s3:data/images");
        assert_eq!(mounter("", "").remote(), ":s3:data");
        assert_eq!(mounter("/nested/dir/", "").remote(), ":s3:data/nested/dir");
    }

    #[test]
    fn test_args() {
        let args = mounter("images", "eu-west-1").helper_args("/mnt/target");
        assert_eq!(
            args,
            vec![
                "mount",
                ":s3:data/images",
                "/mnt/target",
                "--daemon",
                "--s3-provider=AWS",
                "--s3-env-auth=true",
                "--s3-endpoint=http://minio.local:9000",
                "--allow-other",
                "--vfs-cache-mode=writes",
                "--s3-region=eu-west-1",
                "--read-only",
            ]
        );
    }

    #[test]
    fn test_args_without_region() {
        let args = mounter("images", "").helper_args("/mnt/target");
        assert!(!args.iter().any(|a| a.starts_with("--s3-region")));
        assert_eq!(args.last().map(String::as_str), Some("--read-only"));
    }
}
