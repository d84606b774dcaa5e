//! Per-product version manifest (`ssb.json`)
//!
//! The source of truth for one product's build history. It is written next
//! to the build directories and later folded into the products catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Document, ProductVersion};

/// Version manifest of a single product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductManifest {
    /// Product name, used to join the manifest to its configuration
    pub name: String,

    /// End-of-life as a string-encoded Unix epoch
    #[serde(rename = "expiry", default, skip_serializing_if = "Option::is_none")]
    pub support_eol: Option<String>,

    /// Versions keyed by build directory name
    #[serde(default)]
    pub versions: BTreeMap<String, ProductVersion>,
}

impl Document for ProductManifest {}

impl ProductManifest {
    /// Create an empty manifest for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            support_eol: None,
            versions: BTreeMap::new(),
        }
    }

    /// Expiry as seconds since the epoch, if set and numeric.
    pub fn support_eol_epoch(&self) -> Option<i64> {
        self.support_eol.as_deref().and_then(|s| s.parse().ok())
    }

    /// Names of all versions in ascending order.
    pub fn version_names(&self) -> Vec<&str> {
        self.versions.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProductVersionItem;
    use tempfile::TempDir;

    fn sample() -> ProductManifest {
        let mut manifest = ProductManifest::new("alpine-3.18-amd64");
        manifest.support_eol = Some("1700000000".to_string());

        let mut version = ProductVersion::new();
        let mut item = ProductVersionItem::new("squashfs", "alpine/20230101_10:00/rootfs.squashfs", 3);
        item.md5 = Some("m".to_string());
        item.sha256 = Some("s".to_string());
        version.insert_item("root.squashfs", item);
        manifest.versions.insert("20230101_10:00".to_string(), version);
        manifest
    }

    #[test]
    fn test_json_field_names() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"name\": \"alpine-3.18-amd64\""));
        assert!(json.contains("\"expiry\": \"1700000000\""));
        assert!(json.contains("\"versions\""));
        assert!(json.contains("\"items\""));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let manifest = sample();
        let first = manifest.to_json().unwrap();
        let parsed = ProductManifest::from_json(&first).unwrap();
        let second = parsed.to_json().unwrap();

        assert_eq!(parsed, manifest);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_expiry_and_versions() {
        let parsed = ProductManifest::from_json(r#"{"name": "debian"}"#).unwrap();
        assert_eq!(parsed.support_eol, None);
        assert!(parsed.versions.is_empty());

        let json = parsed.to_json().unwrap();
        assert!(!json.contains("expiry"));
    }

    #[test]
    fn test_support_eol_epoch() {
        assert_eq!(sample().support_eol_epoch(), Some(1_700_000_000));
        assert_eq!(ProductManifest::new("x").support_eol_epoch(), None);
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alpine").join("ssb.json");

        let manifest = sample();
        manifest.write_to_file(&path).unwrap();

        let loaded = ProductManifest::from_file(&path).unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.version_names(), vec!["20230101_10:00"]);
    }
}
