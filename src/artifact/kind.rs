//! Known artifact kinds and their fixed on-disk names.

use std::fmt;

/// A kind of file produced by an image build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// Container envelope (metadata tarball) read by LXD/Incus
    Envelope,
    /// Root filesystem as squashfs
    SquashfsRootfs,
    /// Root filesystem as xz tarball
    TarballRootfs,
}

impl ArtifactKind {
    /// All kinds, in the order they are hashed within a version.
    ///
    /// The envelope comes first so its bytes lead every combined digest.
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Envelope,
        ArtifactKind::SquashfsRootfs,
        ArtifactKind::TarballRootfs,
    ];

    /// File name inside a dated build directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Envelope => "lxd.tar.xz",
            Self::SquashfsRootfs => "rootfs.squashfs",
            Self::TarballRootfs => "rootfs.tar.xz",
        }
    }

    /// Key of the item in the version's item map.
    pub fn item_key(self) -> &'static str {
        match self {
            Self::Envelope => "lxd.tar.xz",
            Self::SquashfsRootfs => "root.squashfs",
            Self::TarballRootfs => "root.tar.xz",
        }
    }

    /// `ftype` tag written in the manifest.
    pub fn ftype(self) -> &'static str {
        match self {
            Self::Envelope => "lxd.tar.xz",
            Self::SquashfsRootfs => "squashfs",
            Self::TarballRootfs => "root.tar.xz",
        }
    }

    /// Feeds the root-xz combined accumulator.
    pub fn feeds_rootxz(self) -> bool {
        matches!(self, Self::Envelope | Self::TarballRootfs)
    }

    /// Feeds the squashfs combined accumulator.
    pub fn feeds_squashfs(self) -> bool {
        matches!(self, Self::Envelope | Self::SquashfsRootfs)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
