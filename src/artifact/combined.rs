//! Combined SHA-256 accumulators of a product version.
//!
//! LXD/Incus validate a split image (envelope plus rootfs) against a digest
//! of the envelope bytes followed by the rootfs bytes. One builder value
//! lives for the duration of one version and is threaded through every
//! artifact hash of that version.

use sha2::{Digest, Sha256};

use super::ArtifactKind;

/// Running combined digests for one version.
#[derive(Debug, Clone, Default)]
pub struct CombinedHashBuilder {
    rootxz: Sha256,
    squashfs: Sha256,
    rootxz_present: bool,
    squashfs_present: bool,
}

/// Finalized combined digests, present only for lineages that had a
/// contributing rootfs artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedHashes {
    pub rootxz_sha256: Option<String>,
    pub squashfs_sha256: Option<String>,
}

impl CombinedHashBuilder {
    /// Create a builder with empty accumulators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk read from an artifact of `kind`.
    pub fn absorb(mut self, kind: ArtifactKind, chunk: &[u8]) -> Self {
        if kind.feeds_rootxz() {
            self.rootxz.update(chunk);
        }
        if kind.feeds_squashfs() {
            self.squashfs.update(chunk);
        }
        self
    }

    /// Record that an artifact of `kind` was fully hashed.
    ///
    /// Only rootfs artifacts activate a lineage; the envelope alone never
    /// yields a combined digest.
    pub fn mark_present(mut self, kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::TarballRootfs => self.rootxz_present = true,
            ArtifactKind::SquashfsRootfs => self.squashfs_present = true,
            ArtifactKind::Envelope => {}
        }
        self
    }

    /// True if a tarball rootfs contributed.
    pub fn has_rootxz(&self) -> bool {
        self.rootxz_present
    }

    /// True if a squashfs rootfs contributed.
    pub fn has_squashfs(&self) -> bool {
        self.squashfs_present
    }

    /// Finalize the active lineages.
    pub fn finish(self) -> CombinedHashes {
        CombinedHashes {
            rootxz_sha256: self
                .rootxz_present
                .then(|| hex::encode(self.rootxz.finalize())),
            squashfs_sha256: self
                .squashfs_present
                .then(|| hex::encode(self.squashfs.finalize())),
        }
    }
}

impl CombinedHashes {
    /// Attach the digests to the envelope item.
    ///
    /// The root-xz digest is published both as `combined_rootxz_sha256`
    /// and as the generic `combined_sha256`.
    pub fn apply_to(&self, item: &mut ssb_streams::ProductVersionItem) {
        if let Some(sha) = &self.squashfs_sha256 {
            item.combined_squashfs_sha256 = Some(sha.clone());
        }
        if let Some(sha) = &self.rootxz_sha256 {
            item.combined_rootxz_sha256 = Some(sha.clone());
            item.combined_sha256 = Some(sha.clone());
        }
    }
}
