//! Catalog documents built from the product manifests: the products
//! catalog (`images.json`) and the root index (`index.json`).

pub mod aggregate;
pub mod fetch;
pub mod index;

pub use aggregate::{
    catalog_product, AggregateError, Aggregation, ProductAggregator, ProductOutcome, SkipReason,
};
pub use fetch::{FetchError, ManifestFetcher};
pub use index::IndexAssembler;
