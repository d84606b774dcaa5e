//! Root index (`index.json`)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Document, IMAGES_STREAM, INDEX_FORMAT};

/// The root index listing the available streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub format: String,

    #[serde(default)]
    pub index: BTreeMap<String, StreamIndex>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl Document for IndexDocument {}

impl Default for IndexDocument {
    fn default() -> Self {
        Self {
            format: INDEX_FORMAT.to_string(),
            index: BTreeMap::new(),
            updated: None,
        }
    }
}

impl IndexDocument {
    /// Create an index holding only the images stream.
    pub fn with_images(stream: StreamIndex) -> Self {
        let mut doc = Self::default();
        doc.index.insert(IMAGES_STREAM.to_string(), stream);
        doc
    }

    /// The images stream, if present.
    pub fn images(&self) -> Option<&StreamIndex> {
        self.index.get(IMAGES_STREAM)
    }
}

/// A stream entry of the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamIndex {
    pub datatype: String,

    /// Path of the products catalog relative to the server root
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    #[serde(default)]
    pub products: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}
