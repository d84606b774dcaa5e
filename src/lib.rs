//! Simplestreams builder
//!
//! Generates the Simplestreams documents an LXD/Incus image server
//! publishes: per-product version manifests (`ssb.json`) built by hashing
//! dated build directories, the products catalog (`images.json`) and the
//! root index (`index.json`). Also purges old builds.

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod manifest;
pub mod output;
pub mod retention;
pub mod scan;

pub use artifact::{ArtifactHasher, ArtifactKind, CombinedHashBuilder, HashError};
pub use catalog::{AggregateError, Aggregation, IndexAssembler, ProductAggregator, SkipReason};
pub use config::{ConfigError, FetchSettings, ProductConfig, TreeConfig};
pub use manifest::{AssembleError, AssembleOptions, VersionManifestAssembler};
pub use output::{Output, OutputError};
pub use retention::{PurgeResult, RetentionPolicy, RetentionPurger};
pub use scan::{BuildDir, BuildDirScanner};
