//! s3fs mounter factory implementation.

use crate::errors::MountResult;
use crate::mounter::{
    MounterKind, factory::MounterFactory, registry::MounterRegistration, s3fs::S3fsMounter,
};
use crate::options::MounterConfig;

pub struct S3fsFactory;

impl MounterFactory for S3fsFactory {
    type Mounter = S3fsMounter;

    fn create(config: MounterConfig) -> MountResult<Self::Mounter> {
        Ok(S3fsMounter::new(config))
    }
}

inventory::submit! {
    MounterRegistration {
        kind: MounterKind::S3fs,
        factory: |config| {
            Ok(Box::new(S3fsFactory::create(config)?))
        }
    }
}
