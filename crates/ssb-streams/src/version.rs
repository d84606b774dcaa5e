//! A dated build of a product.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ProductVersionItem;

/// Item key of the LXD container envelope.
pub const LXD_ITEM: &str = "lxd.tar.xz";

/// Item key of the Incus container envelope.
pub const INCUS_ITEM: &str = "incus.tar.xz";

/// A product version: the items of one build keyed by artifact kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVersion {
    pub items: BTreeMap<String, ProductVersionItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, rename = "pubname", skip_serializing_if = "Option::is_none")]
    pub public_name: Option<String>,
}

impl ProductVersion {
    /// Create an empty version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item under `key`, returning any item it replaced.
    pub fn insert_item(
        &mut self,
        key: impl Into<String>,
        item: ProductVersionItem,
    ) -> Option<ProductVersionItem> {
        self.items.insert(key.into(), item)
    }

    /// True if the version has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mirror the LXD and Incus envelope items.
    ///
    /// LXD and Incus read the same container format under different item
    /// keys. When exactly one of the two is present, a copy is added under
    /// the other key with its `ftype` rewritten. Versions holding both or
    /// neither are left untouched.
    pub fn bridge_incus_lxd(&mut self) {
        let has_lxd = self.items.contains_key(LXD_ITEM);
        let has_incus = self.items.contains_key(INCUS_ITEM);

        let (from, to) = match (has_lxd, has_incus) {
            (true, false) => (LXD_ITEM, INCUS_ITEM),
            (false, true) => (INCUS_ITEM, LXD_ITEM),
            _ => return,
        };

        if let Some(mut item) = self.items.get(from).cloned() {
            item.ftype = to.to_string();
            self.items.insert(to.to_string(), item);
        }
    }
}
