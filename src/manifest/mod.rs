//! Per-product version manifests (`ssb.json`)

pub mod assemble;
pub mod definition;
pub mod expiry;

pub use assemble::{
    item_base_path, AssembleError, AssembleOptions, AssembledManifest, SkippedVersion,
    VersionManifestAssembler,
};
pub use definition::{DefinitionError, DefinitionImage, ImageDefinition};
pub use expiry::{expiry_after, parse_expiry_duration, ExpiryError};
