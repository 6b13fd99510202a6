//! Mounter registry using the inventory pattern for compile-time registration.
//!
//! Variants register themselves with `inventory::submit!`; selecting one is
//! a lookup by [`MounterKind`].

use crate::errors::{MountError, MountResult};
use crate::mounter::{Mounter, MounterKind};
use crate::options::MounterConfig;

/// Type alias for mounter factory functions.
pub type MounterFactoryFn = fn(MounterConfig) -> MountResult<Box<dyn Mounter>>;

/// Registration entry submitted by mounter implementations via inventory.
pub struct MounterRegistration {
    pub kind: MounterKind,
    pub factory: MounterFactoryFn,
}

inventory::collect!(MounterRegistration);

/// Create a mounter by looking up the registered factory.
///
/// # Arguments
/// * `kind` - The helper to mount with
/// * `config` - Volume, storage and helper options the mounter is bound to
///
/// # Returns
/// * `Ok(Box<dyn Mounter>)` - Mounter ready for `mount()`
/// * `Err(MountError::Config)` - Kind not registered or construction failed
///
/// # Example
/// ```rust,no_run
/// use mountlite::mounter::{self, MounterKind};
/// use mountlite::{MounterConfig, StorageConfig, VolumeMetadata};
///
/// let config = MounterConfig::new(
///     VolumeMetadata::new("data", "images"),
///     StorageConfig::new("http://minio.local:9000", "access", "secret"),
/// );
/// let mounter = mounter::create_mounter(MounterKind::S3fs, config)?;
/// # Ok::<(), mountlite::MountError>(())
/// ```
pub fn create_mounter(kind: MounterKind, config: MounterConfig) -> MountResult<Box<dyn Mounter>> {
    for registration in inventory::iter::<MounterRegistration> {
        if registration.kind == kind {
            tracing::debug!(mounter = %kind, bucket = %config.meta.bucket_name, "Creating mounter");
            return (registration.factory)(config);
        }
    }

    Err(MountError::Config(format!(
        "Mounter {} is not registered. Available mounters: {:?}",
        kind,
        available_mounters()
    )))
}

/// Check if a mounter kind is registered.
pub fn is_registered(kind: MounterKind) -> bool {
    inventory::iter::<MounterRegistration>().any(|r| r.kind == kind)
}

/// Get a list of all registered mounter kinds.
pub fn available_mounters() -> Vec<MounterKind> {
    inventory::iter::<MounterRegistration>()
        .map(|r| r.kind)
        .collect()
}
