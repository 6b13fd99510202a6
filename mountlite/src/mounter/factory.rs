//! Mounter factory pattern for variant construction.

use crate::errors::MountResult;
use crate::mounter::Mounter;
use crate::options::MounterConfig;

/// Factory trait for creating mounters.
pub trait MounterFactory {
    type Mounter: Mounter;

    /// Create a mounter bound to the given volume and storage configuration
    fn create(config: MounterConfig) -> MountResult<Self::Mounter>;
}
