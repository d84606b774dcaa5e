//! Single-pass MD5 + SHA-256 hashing of build artifacts.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::{ArtifactKind, CombinedHashBuilder};

/// Default read size.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Digests of one artifact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDigest {
    pub kind: ArtifactKind,
    pub size: u64,
    pub md5: String,
    pub sha256: String,
}

/// Errors for artifact hashing
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// The artifact is not part of this build.
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),

    /// The artifact exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// True for the non-fatal "artifact absent" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Streams an artifact through its digests exactly once.
#[derive(Debug, Clone)]
pub struct ArtifactHasher {
    chunk_size: usize,
}

impl Default for ArtifactHasher {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ArtifactHasher {
    /// Create a hasher with the default chunk size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher reading `chunk_size` bytes at a time (minimum 1).
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Hash the file at `path` as an artifact of `kind`.
    ///
    /// Every chunk also goes into `combined`. The builder is handed back in
    /// all cases so the caller can continue with the next artifact when this
    /// one is absent.
    pub fn hash_file(
        &self,
        path: &Path,
        kind: ArtifactKind,
        combined: CombinedHashBuilder,
    ) -> (CombinedHashBuilder, Result<ArtifactDigest, HashError>) {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return (combined, Err(HashError::NotFound(path.to_path_buf())));
            }
            Err(source) => {
                return (
                    combined,
                    Err(HashError::Io {
                        path: path.to_path_buf(),
                        source,
                    }),
                );
            }
        };

        let (combined, result) = self.hash_reader(file, kind, combined);
        let result = result.map_err(|source| HashError::Io {
            path: path.to_path_buf(),
            source,
        });
        (combined, result)
    }

    /// Hash everything `reader` yields as an artifact of `kind`.
    pub fn hash_reader<R: Read>(
        &self,
        mut reader: R,
        kind: ArtifactKind,
        mut combined: CombinedHashBuilder,
    ) -> (CombinedHashBuilder, io::Result<ArtifactDigest>) {
        let mut md5 = Md5::new();
        let mut sha256 = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];
        let mut size = 0u64;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return (combined, Err(e)),
            };
            let chunk = &buffer[..n];
            md5.update(chunk);
            sha256.update(chunk);
            combined = combined.absorb(kind, chunk);
            size += n as u64;
        }

        let digest = ArtifactDigest {
            kind,
            size,
            md5: hex::encode(md5.finalize()),
            sha256: hex::encode(sha256.finalize()),
        };
        (combined.mark_present(kind), Ok(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    const HELLO_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

    #[test]
    fn test_hash_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rootfs.squashfs");
        fs::write(&path, b"hello world").unwrap();

        let (_, result) =
            ArtifactHasher::new().hash_file(&path, ArtifactKind::SquashfsRootfs, CombinedHashBuilder::new());
        let digest = result.unwrap();

        assert_eq!(digest.size, 11);
        assert_eq!(digest.sha256, HELLO_SHA256);
        assert_eq!(digest.md5, HELLO_MD5);
    }

    #[test]
    fn test_chunk_size_does_not_change_digest() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let whole = ArtifactHasher::new()
            .hash_reader(&data[..], ArtifactKind::TarballRootfs, CombinedHashBuilder::new())
            .1
            .unwrap();

        for chunk_size in [1, 7, 256, 4096, 1 << 20] {
            let (combined, result) = ArtifactHasher::with_chunk_size(chunk_size).hash_reader(
                &data[..],
                ArtifactKind::TarballRootfs,
                CombinedHashBuilder::new(),
            );
            assert_eq!(result.unwrap(), whole, "chunk size {}", chunk_size);
            assert_eq!(
                combined.finish().rootxz_sha256.as_deref(),
                Some(whole.sha256.as_str())
            );
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let (combined, result) = ArtifactHasher::new().hash_file(
            &dir.path().join("lxd.tar.xz"),
            ArtifactKind::Envelope,
            CombinedHashBuilder::new(),
        );

        assert!(result.unwrap_err().is_not_found());
        assert!(!combined.has_rootxz());
        assert!(!combined.has_squashfs());
    }

    #[test]
    fn test_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rootfs.tar.xz");
        fs::create_dir(&path).unwrap();

        let (combined, result) =
            ArtifactHasher::new().hash_file(&path, ArtifactKind::TarballRootfs, CombinedHashBuilder::new());

        assert!(matches!(result, Err(HashError::Io { .. })));
        assert!(!combined.has_rootxz());
    }

    #[test]
    fn test_empty_file() {
        let (combined, result) = ArtifactHasher::new().hash_reader(
            &b""[..],
            ArtifactKind::SquashfsRootfs,
            CombinedHashBuilder::new(),
        );
        let digest = result.unwrap();
        assert_eq!(digest.size, 0);
        assert_eq!(
            digest.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(combined.has_squashfs());
    }
}
