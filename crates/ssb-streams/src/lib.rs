//! Simplestreams document types
//!
//! Defines the JSON documents a Simplestreams image server publishes:
//! the per-product version manifest (`ssb.json`), the products catalog
//! (`images.json`) and the root index (`index.json`).

pub mod document;
pub mod error;
pub mod index;
pub mod item;
pub mod manifest;
pub mod products;
pub mod version;

pub use document::Document;
pub use error::StreamsError;
pub use index::{IndexDocument, StreamIndex};
pub use item::ProductVersionItem;
pub use manifest::ProductManifest;
pub use products::{CatalogProduct, ProductsDocument};
pub use version::{ProductVersion, INCUS_ITEM, LXD_ITEM};

/// Format literal of the root index document.
pub const INDEX_FORMAT: &str = "index:1.0";

/// Stream key under which the images catalog is published.
pub const IMAGES_STREAM: &str = "images";

/// Default datatype of the images stream.
pub const DEFAULT_DATATYPE: &str = "image-downloads";

/// Default format of the products catalog.
pub const DEFAULT_PRODUCTS_FORMAT: &str = "products:1.0";

/// File name of the per-product version manifest.
pub const MANIFEST_FILENAME: &str = "ssb.json";

/// File name of the products catalog.
pub const PRODUCTS_FILENAME: &str = "images.json";

/// File name of the root index.
pub const INDEX_FILENAME: &str = "index.json";
