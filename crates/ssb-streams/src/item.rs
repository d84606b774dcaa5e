//! A single downloadable file of a product version.

use serde::{Deserialize, Serialize};

/// An item (file) of a product version.
///
/// The combined hashes let a client validate a multi-file download as if
/// it were one concatenated blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVersionItem {
    #[serde(
        rename = "combined_disk1-img_sha256",
        skip_serializing_if = "Option::is_none"
    )]
    pub combined_disk_img_sha256: Option<String>,

    #[serde(
        rename = "combined_disk-kvm-img_sha256",
        skip_serializing_if = "Option::is_none"
    )]
    pub combined_disk_kvm_img_sha256: Option<String>,

    #[serde(
        rename = "combined_uefi1-img_sha256",
        skip_serializing_if = "Option::is_none"
    )]
    pub combined_uefi_img_sha256: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_rootxz_sha256: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_sha256: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_squashfs_sha256: Option<String>,

    /// File type tag (e.g. `lxd.tar.xz`, `squashfs`, `root.tar.xz`)
    pub ftype: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,

    /// Path relative to the server root
    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Size in bytes
    pub size: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_base: Option<String>,
}

impl ProductVersionItem {
    /// Create an item with no hashes attached yet.
    pub fn new(ftype: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        Self {
            ftype: ftype.into(),
            path: path.into(),
            size,
            ..Default::default()
        }
    }

    /// True if any combined hash field is set.
    pub fn has_combined_hashes(&self) -> bool {
        self.combined_sha256.is_some()
            || self.combined_rootxz_sha256.is_some()
            || self.combined_squashfs_sha256.is_some()
            || self.combined_disk_img_sha256.is_some()
            || self.combined_disk_kvm_img_sha256.is_some()
            || self.combined_uefi_img_sha256.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_omitted() {
        let item = ProductVersionItem::new("squashfs", "alpine/20230101_10:00/rootfs.squashfs", 42);
        let json = serde_json::to_value(&item).unwrap();

        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["ftype"], "squashfs");
        assert_eq!(obj["size"], 42);
        assert!(!item.has_combined_hashes());
    }

    #[test]
    fn test_combined_field_names() {
        let mut item = ProductVersionItem::new("lxd.tar.xz", "a/lxd.tar.xz", 1);
        item.combined_rootxz_sha256 = Some("aa".to_string());
        item.combined_squashfs_sha256 = Some("bb".to_string());
        item.combined_disk_kvm_img_sha256 = Some("cc".to_string());

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"combined_rootxz_sha256\":\"aa\""));
        assert!(json.contains("\"combined_squashfs_sha256\":\"bb\""));
        assert!(json.contains("\"combined_disk-kvm-img_sha256\":\"cc\""));
        assert!(item.has_combined_hashes());
    }

    #[test]
    fn test_parses_foreign_item() {
        let json = r#"{
            "ftype": "disk-kvm.img",
            "path": "images/debian/disk.qcow2",
            "size": 1024,
            "sha256": "abc",
            "delta_base": "20230101_10:00"
        }"#;
        let item: ProductVersionItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.ftype, "disk-kvm.img");
        assert_eq!(item.delta_base.as_deref(), Some("20230101_10:00"));
        assert_eq!(item.md5, None);
    }
}
