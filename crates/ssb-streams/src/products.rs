//! Products catalog (`images.json`)
//!
//! Rebuilt in full on every run from the product configuration and the
//! per-product version manifests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Document, ProductVersion, DEFAULT_DATATYPE, DEFAULT_PRODUCTS_FORMAT};

/// The products catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductsDocument {
    #[serde(default)]
    pub content_id: String,

    pub datatype: String,

    pub format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default)]
    pub products: BTreeMap<String, CatalogProduct>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl Document for ProductsDocument {}

impl Default for ProductsDocument {
    fn default() -> Self {
        Self::new(DEFAULT_DATATYPE, DEFAULT_PRODUCTS_FORMAT)
    }
}

impl ProductsDocument {
    /// Create an empty catalog.
    pub fn new(datatype: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            content_id: String::new(),
            datatype: datatype.into(),
            format: format.into(),
            license: None,
            products: BTreeMap::new(),
            updated: None,
        }
    }

    /// Look up a product by name.
    pub fn get(&self, name: &str) -> Option<&CatalogProduct> {
        self.products.get(name)
    }

    /// True if the catalog contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.products.contains_key(name)
    }

    /// Product names in ascending order.
    pub fn product_names(&self) -> Vec<&str> {
        self.products.keys().map(String::as_str).collect()
    }
}

/// A product entry of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Comma-separated alias list
    #[serde(default)]
    pub aliases: String,

    #[serde(rename = "arch")]
    pub architecture: String,

    #[serde(rename = "os")]
    pub operating_system: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lxd_requirements: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub incus_requirements: BTreeMap<String, String>,

    pub release: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_codename: Option<String>,

    #[serde(default)]
    pub release_title: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub supported: bool,

    #[serde(rename = "support_eol", default, skip_serializing_if = "Option::is_none")]
    pub support_eol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub versions: BTreeMap<String, ProductVersion>,

    /// Non-standard field used by some image servers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProductsDocument {
        let mut doc = ProductsDocument::default();
        doc.content_id = "images".to_string();
        doc.products.insert(
            "alpine-3.18-amd64".to_string(),
            CatalogProduct {
                aliases: "alpine/3.18,alpine/3.18/amd64".to_string(),
                architecture: "amd64".to_string(),
                operating_system: "Alpine".to_string(),
                release: "3.18".to_string(),
                release_title: "3.18".to_string(),
                ..Default::default()
            },
        );
        doc
    }

    #[test]
    fn test_defaults() {
        let doc = ProductsDocument::default();
        assert_eq!(doc.datatype, "image-downloads");
        assert_eq!(doc.format, "products:1.0");
        assert!(doc.products.is_empty());
    }

    #[test]
    fn test_wire_names() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"arch\": \"amd64\""));
        assert!(json.contains("\"os\": \"Alpine\""));
        assert!(json.contains("\"aliases\": \"alpine/3.18,alpine/3.18/amd64\""));
        assert!(json.contains("\"content_id\": \"images\""));
        assert!(!json.contains("supported"));
        assert!(!json.contains("support_eol"));
        assert!(!json.contains("lxd_requirements"));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let doc = sample();
        let first = doc.to_json().unwrap();
        let parsed = ProductsDocument::from_json(&first).unwrap();
        assert_eq!(parsed, doc);
        assert_eq!(parsed.to_json().unwrap(), first);
    }

    #[test]
    fn test_lookup() {
        let doc = sample();
        assert!(doc.contains("alpine-3.18-amd64"));
        assert!(!doc.contains("debian"));
        assert_eq!(doc.product_names(), vec!["alpine-3.18-amd64"]);
    }
}
