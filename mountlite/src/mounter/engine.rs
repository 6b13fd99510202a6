//! Mounter trait implemented by every helper-backed variant.

use super::MounterKind;
use crate::errors::{MountError, MountResult};
use crate::fuse::HelperCommand;
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// A mount backend bound to one volume and one storage configuration.
///
/// Only the target path and the volume id vary between calls; everything
/// else is fixed when the variant is constructed. Implementations hold no
/// state shared with other instances.
#[async_trait]
pub trait Mounter: Send + Sync + std::fmt::Debug {
    /// Which helper this variant drives.
    fn kind(&self) -> MounterKind;

    /// The helper invocation for `target`, without credential environment.
    fn helper_command(&self, target: &str) -> HelperCommand;

    /// Mount the volume at `target`.
    ///
    /// `volume_id` is used for tracing only. Returns once the helper has
    /// finished and the mount is in place, or with the first error.
    async fn mount(&self, target: &Path, volume_id: &str) -> MountResult<()> {
        self.mount_with_cancel(target, volume_id, &CancellationToken::new())
            .await
    }

    /// Like [`mount`](Mounter::mount), but gives up (killing the helper)
    /// when `cancel` fires.
    async fn mount_with_cancel(
        &self,
        target: &Path,
        volume_id: &str,
        cancel: &CancellationToken,
    ) -> MountResult<()>;
}

/// Borrow `target` as the UTF-8 string placed on the helper command line.
pub(crate) fn target_arg(target: &Path) -> MountResult<&str> {
    target
        .to_str()
        .ok_or_else(|| MountError::InvalidTarget(target.to_path_buf()))
}
