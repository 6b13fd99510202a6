//! s3fs mounter.
//!
//! s3fs reads credentials from the AWS shared credentials file, so every
//! mount first rewrites that file, then runs:
//!
//! ```text
//! s3fs <bucket>:/<prefix> <target> \
//!     -o use_path_request_style -o url=<endpoint> -o allow_other -o mp_umask=000 \
//!     [-o endpoint=<region>] [extra options...]
//! ```
//!
//! Path-style requests are needed for S3-compatible endpoints that do not
//! serve virtual-host buckets. `allow_other` lets processes of other users
//! reach the mount. The object store has no POSIX permissions, so
//! `mp_umask=000` makes everything readable and writable instead of leaving
//! s3fs defaults in place. Extra options come last; s3fs gives later options
//! precedence, so callers can override the defaults.

mod factory;

pub use factory::S3fsFactory;

use crate::constants::{helpers, s3fs_options as opts};
use crate::credentials::provision_for_mount;
use crate::errors::MountResult;
use crate::fuse::{self, HelperCommand};
use crate::mounter::engine::target_arg;
use crate::mounter::{Mounter, MounterKind};
use crate::options::{HelperOptions, MounterConfig};
use crate::volume::{StorageConfig, VolumeMetadata};
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Mounts a bucket through the `s3fs` helper.
#[derive(Debug, Clone)]
pub struct S3fsMounter {
    meta: VolumeMetadata,
    storage: StorageConfig,
    options: HelperOptions,
}

impl S3fsMounter {
    pub fn new(config: MounterConfig) -> Self {
        Self {
            meta: config.meta,
            storage: config.storage,
            options: config.options,
        }
    }

    /// Positional source argument, `<bucket>:/<prefix>`.
    ///
    /// An empty prefix leaves a bare trailing slash.
    pub fn source(&self) -> String {
        format!("{}:/{}", self.meta.bucket_name, self.meta.prefix)
    }

    /// Full s3fs argument vector for `target`.
    pub fn helper_args(&self, target: &str) -> Vec<String> {
        let mut args = vec![
            self.source(),
            target.to_string(),
            opts::OPTION_FLAG.to_string(),
            opts::USE_PATH_REQUEST_STYLE.to_string(),
            opts::OPTION_FLAG.to_string(),
            format!("{}{}", opts::URL_PREFIX, self.storage.endpoint),
            opts::OPTION_FLAG.to_string(),
            opts::ALLOW_OTHER.to_string(),
            opts::OPTION_FLAG.to_string(),
            opts::MP_UMASK_ALL.to_string(),
        ];

        if let Some(region) = self.storage.region() {
            args.push(opts::OPTION_FLAG.to_string());
            args.push(format!("{}{}", opts::REGION_PREFIX, region));
        }

        args.extend(self.meta.mount_options.iter().cloned());
        args
    }
}

#[async_trait]
impl Mounter for S3fsMounter {
    fn kind(&self) -> MounterKind {
        MounterKind::S3fs
    }

    fn helper_command(&self, target: &str) -> HelperCommand {
        HelperCommand::new(helpers::S3FS).args(self.helper_args(target))
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
            scope = ?self.options.credential_scope,
            "Mounting volume with s3fs"
        );

        // Held until the helper is done with the scratch home, if any.
        let credentials = provision_for_mount(
            &self.options,
            self.storage.access_key_id.expose(),
            self.storage.secret_access_key.expose(),
        )?;

        let mut command = self.helper_command(target_str);
        command.envs.extend(credentials.envs().iter().cloned());

        fuse::fuse_mount(target, &command, &self.options, cancel).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mounter(prefix: &str, region: &str, extras: &[&str]) -> S3fsMounter {
        let meta = VolumeMetadata::new("data", prefix).with_mount_options(extras.iter().copied());
        let storage =
            StorageConfig::new("http://minio.local:9000", "ak", "sk").with_region(region);
        S3fsMounter::new(MounterConfig::new(meta, storage))
    }

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_args_without_region() {
        let m = mounter("images", "", &["-o", "nonempty"]);
        assert_eq!(
            m.helper_args("/mnt/target"),
            strings(&[
                "data:/images",
                "/mnt/target",
                "-o",
                "use_path_request_style",
                "-o",
                "url=http://minio.local:9000",
                "-o",
                "allow_other",
                "-o",
                "mp_umask=000",
                "-o",
                "nonempty",
            ])
        );
    }

    #[test]
    fn test_args_with_region() {
        let m = mounter("images", "us-east-1", &["-o", "nonempty"]);
        assert_eq!(
            m.helper_args("/mnt/target"),
            strings(&[
                "data:/images",
                "/mnt/target",
                "-o",
                "use_path_request_style",
                "-o",
                "url=http://minio.local:9000",
                "-o",
                "allow_other",
                "-o",
                "mp_umask=000",
                "-o",
                "endpoint=us-east-1",
                "-o",
                "nonempty",
            ])
        );
    }

    #[test]
    fn test_empty_prefix_keeps_trailing_slash() {
        assert_eq!(mounter("", "", &[]).source(), "data:/");
    }

    #[test]
    fn test_helper_command() {
        let cmd = mounter("p", "", &[]).helper_command("/mnt/t");
        assert_eq!(cmd.program, "s3fs");
        assert_eq!(cmd.args[0], "data:/p");
        assert!(cmd.envs.is_empty());
    }

    proptest! {
        #[test]
        fn prop_source_format(bucket in "[a-z0-9][a-z0-9.-]{0,20}", prefix in "[a-zA-Z0-9/_.-]{0,30}") {
            let meta = VolumeMetadata::new(bucket.clone(), prefix.clone());
            let m = S3fsMounter::new(MounterConfig::new(meta, StorageConfig::new("http://s3", "a", "b")));
            let args = m.helper_args("/mnt/t");
            prop_assert_eq!(&args[0], &format!("{}:/{}", bucket, prefix));
            prop_assert_eq!(&args[1], "/mnt/t");
        }

        #[test]
        fn prop_region_and_extras_placement(
            region in proptest::option::of("[a-z]{2}-[a-z]{4,9}-[0-9]"),
            extras in proptest::collection::vec("[a-z_=0-9-]{1,12}", 0..6),
        ) {
            let meta = VolumeMetadata::new("data", "p").with_mount_options(extras.clone());
            let mut storage = StorageConfig::new("http://s3", "a", "b");
            if let Some(r) = &region {
                storage = storage.with_region(r.clone());
            }
            let args = S3fsMounter::new(MounterConfig::new(meta, storage)).helper_args("/mnt/t");

            // source, target and four fixed option pairs
            let fixed = 10;
            let region_len = if region.is_some() { 2 } else { 0 };
            prop_assert_eq!(args.len(), fixed + region_len + extras.len());

            let region_opts = args[..fixed + region_len]
                .iter()
                .filter(|a| a.starts_with("endpoint="))
                .count();
            match &region {
                Some(r) => {
                    prop_assert_eq!(region_opts, 1);
                    prop_assert_eq!(&args[fixed], "-o");
                    prop_assert_eq!(&args[fixed + 1], &format!("endpoint={}", r));
                }
                None => prop_assert_eq!(region_opts, 0),
            }

            prop_assert_eq!(&args[fixed + region_len..], &extras[..]);
        }
    }
}
