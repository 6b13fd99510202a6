//! rclone mounter factory implementation.

use crate::errors::MountResult;
use crate::mounter::{
    MounterKind, factory::MounterFactory, rclone::RcloneMounter, registry::MounterRegistration,
};
use crate::options::MounterConfig;

pub struct RcloneFactory;

impl MounterFactory for RcloneFactory {
    type Mounter = RcloneMounter;

    fn create(config: MounterConfig) -> MountResult<Self::Mounter> {
        Ok(RcloneMounter::new(config))
    }
}

inventory::submit! {
    MounterRegistration {
        kind: MounterKind::Rclone,
        factory: |config| {
            Ok(Box::new(RcloneFactory::create(config)?))
        }
    }
}
