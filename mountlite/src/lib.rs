//! mountlite - mount object-storage buckets through external FUSE helpers.
//!
//! A [`Mounter`] is bound to one bucket location ([`VolumeMetadata`]) and one
//! endpoint/credential set ([`StorageConfig`]). Calling
//! [`mount`](Mounter::mount) puts the credentials where the helper expects
//! them, assembles the helper's command line and runs it until the target
//! directory is a live mount.
//!
//! ```rust,no_run
//! use mountlite::{create_mounter, MounterConfig, MounterKind, StorageConfig, VolumeMetadata};
//! use std::path::Path;
//!
//! # async fn run() -> mountlite::MountResult<()> {
//! let config = MounterConfig::new(
//!     VolumeMetadata::new("data", "images"),
//!     StorageConfig::new("http://minio.local:9000", "access", "secret"),
//! );
//! let mounter = create_mounter(MounterKind::S3fs, config)?;
//! mounter.mount(Path::new("/mnt/data"), "pvc-1234").await?;
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod credentials;
pub mod errors;
pub mod fuse;
pub mod mounter;
pub mod options;
pub mod volume;

pub use credentials::CredentialProvisioner;
pub use errors::{CredentialError, MountError, MountInvocationError, MountResult};
pub use fuse::HelperCommand;
pub use mounter::{
    Mounter, MounterKind, RcloneMounter, S3fsMounter, available_mounters, create_mounter,
};
pub use options::{CredentialScope, HelperOptions, MounterConfig};
pub use tokio_util::sync::CancellationToken;
pub use volume::{Secret, StorageConfig, VolumeMetadata};
