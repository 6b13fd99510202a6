//! Volume and storage descriptions consumed by mounters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Object-storage location backing a volume.
///
/// Already parsed by the caller; mounters only read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMetadata {
    /// Bucket name.
    pub bucket_name: String,
    /// Key prefix inside the bucket (may be empty).
    #[serde(default)]
    pub prefix: String,
    /// Extra helper options, passed through verbatim and in order.
    #[serde(default)]
    pub mount_options: Vec<String>,
}

impl VolumeMetadata {
    pub fn new(bucket_name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            prefix: prefix.into(),
            mount_options: Vec::new(),
        }
    }

    /// Set the extra helper options.
    pub fn with_mount_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mount_options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// A secret string that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret value. Keep it out of logs.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Resolved object-storage endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Endpoint URL, e.g. `http://minio.local:9000`.
    pub endpoint: String,
    /// Region; `None` or empty means the helper gets no region option.
    #[serde(default)]
    pub region: Option<String>,
    pub access_key_id: Secret,
    pub secret_access_key: Secret,
}

impl StorageConfig {
    pub fn new(
        endpoint: impl Into<String>,
        access_key_id: impl Into<Secret>,
        secret_access_key: impl Into<Secret>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: None,
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Region to pass to the helper, if any.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let cfg = StorageConfig::new("http://minio.local:9000", "AKIDEXAMPLE", "wJalrXUtnFEMI");
        let debug = format!("{:?}", cfg);
        assert!(debug.contains("http://minio.local:9000"));
        assert!(!debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("wJalrXUtnFEMI"));
    }

    #[test]
    fn test_empty_region_is_absent() {
        let cfg = StorageConfig::new("http://s3", "a", "b");
        assert_eq!(cfg.region(), None);
        assert_eq!(cfg.clone().with_region("").region(), None);
        assert_eq!(cfg.with_region("us-east-1").region(), Some("us-east-1"));
    }

    #[test]
    fn test_deserialize_volume_metadata_defaults() {
        let meta: VolumeMetadata = serde_json::from_str(r#"{"bucket_name":"data"}"#).unwrap();
        assert_eq!(meta, VolumeMetadata::new("data", ""));
    }

    #[test]
    fn test_deserialize_storage_config() {
        let cfg: StorageConfig = serde_json::from_str(
            r#"{
                "endpoint": "http://minio.local:9000",
                "region": "us-east-1",
                "access_key_id": "ak",
                "secret_access_key": "sk"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.region(), Some("us-east-1"));
        assert_eq!(cfg.access_key_id.expose(), "ak");
        assert_eq!(cfg.secret_access_key.expose(), "sk");
    }
}
