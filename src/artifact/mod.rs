//! Artifact hashing
//!
//! Streams each build artifact once, producing its MD5 and SHA-256 digests
//! and feeding the combined-hash accumulators of its version.

mod combined;
mod hasher;
mod kind;

pub use combined::{CombinedHashBuilder, CombinedHashes};
pub use hasher::{ArtifactDigest, ArtifactHasher, HashError, DEFAULT_CHUNK_SIZE};
pub use kind::ArtifactKind;
