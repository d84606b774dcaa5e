//! Version manifest assembly
//!
//! Turns the dated build directories of one product into its `ssb.json`
//! manifest: every known artifact present in a build is hashed, combined
//! digests land on the envelope item, and the product expiry is resolved
//! from the image definition or a forced duration.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ssb_streams::{ProductManifest, ProductVersion, ProductVersionItem};
use tracing::{debug, info, warn};

use super::definition::{DefinitionError, ImageDefinition};
use super::expiry::{expiry_after, ExpiryError};
use crate::artifact::{ArtifactHasher, ArtifactKind, CombinedHashBuilder, HashError};
use crate::scan::{BuildDir, BuildDirScanner};

/// Errors that abort a whole manifest
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("Failed to read product directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Expiry(#[from] ExpiryError),
}

/// Inputs of one manifest assembly.
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    /// Directory holding the product's dated builds
    pub product_dir: PathBuf,
    /// Tree prefix; item paths are relative to it
    pub path_prefix: String,
    /// Forced expiry duration; wins over the image definition
    pub force_expire: Option<String>,
    /// Image definition declaring the expiry
    pub image_file: Option<PathBuf>,
}

/// A build left out of the manifest.
#[derive(Debug)]
pub struct SkippedVersion {
    pub version: String,
    pub error: HashError,
}

/// Result of a manifest assembly.
#[derive(Debug)]
pub struct AssembledManifest {
    pub manifest: ProductManifest,
    /// Builds whose artifacts could not be read
    pub skipped: Vec<SkippedVersion>,
}

/// Builds per-product version manifests.
#[derive(Debug, Clone, Default)]
pub struct VersionManifestAssembler {
    hasher: ArtifactHasher,
}

impl VersionManifestAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the manifest of `product` as of `now`.
    pub fn assemble(
        &self,
        product: &str,
        directory: &str,
        options: &AssembleOptions,
        now: DateTime<Utc>,
    ) -> Result<AssembledManifest, AssembleError> {
        let mut manifest = ProductManifest::new(product);

        if let Some((source, expr)) = self.expiry_expression(options)? {
            let expiry = expiry_after(now, &expr).map_err(|e| {
                warn!(product, source = %source, expr = %expr, error = %e, "rejected expiry");
                e
            })?;
            if let Some(eol) = expiry {
                let epoch = eol.timestamp().to_string();
                info!(product, expiry = %epoch, duration = %expr, "using support EOL");
                manifest.support_eol = Some(epoch);
            }
        }

        let scanner =
            BuildDirScanner::open(&options.product_dir).map_err(|source| AssembleError::Io {
                path: options.product_dir.clone(),
                source,
            })?;

        let mut skipped = Vec::new();
        for build in scanner {
            let base = item_base_path(&options.path_prefix, directory, &build.name);
            debug!(product, version = %build.name, base = %base, "assembling version");

            match self.assemble_version(&build, &base) {
                Ok(version) => {
                    manifest.versions.insert(build.name, version);
                }
                Err(error) => {
                    warn!(product, version = %build.name, error = %error, "skipping version");
                    skipped.push(SkippedVersion {
                        version: build.name,
                        error,
                    });
                }
            }
        }

        Ok(AssembledManifest { manifest, skipped })
    }

    /// Expiry expression together with where it came from.
    fn expiry_expression(
        &self,
        options: &AssembleOptions,
    ) -> Result<Option<(String, String)>, AssembleError> {
        if let Some(forced) = options.force_expire.as_deref().filter(|e| !e.is_empty()) {
            return Ok(Some(("force-expire".to_string(), forced.to_string())));
        }
        let Some(image_file) = &options.image_file else {
            return Ok(None);
        };
        let prefix = Path::new(&options.path_prefix);
        let definition = ImageDefinition::load(image_file, Some(prefix))?;
        Ok(definition
            .expiry()
            .map(|expr| (image_file.display().to_string(), expr.to_string())))
    }

    /// Hash every known artifact of one build.
    ///
    /// Absent artifacts are left out; a read failure drops the build.
    pub fn assemble_version(
        &self,
        build: &BuildDir,
        base_path: &str,
    ) -> Result<ProductVersion, HashError> {
        let mut version = ProductVersion::new();
        let mut combined = CombinedHashBuilder::new();
        let mut envelope: Option<ProductVersionItem> = None;

        for kind in ArtifactKind::ALL {
            let file = build.path.join(kind.file_name());
            let (next, result) = self.hasher.hash_file(&file, kind, combined);
            combined = next;

            let digest = match result {
                Ok(digest) => digest,
                Err(e) if e.is_not_found() => {
                    debug!(file = %file.display(), "artifact not present");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mut item = ProductVersionItem::new(
                kind.ftype(),
                format!("{}/{}", base_path, kind.file_name()),
                digest.size,
            );
            item.md5 = Some(digest.md5);
            item.sha256 = Some(digest.sha256);

            match kind {
                ArtifactKind::Envelope => envelope = Some(item),
                _ => {
                    version.insert_item(kind.item_key(), item);
                }
            }
        }

        if let Some(mut item) = envelope {
            combined.finish().apply_to(&mut item);
            version.insert_item(ArtifactKind::Envelope.item_key(), item);
        }

        Ok(version)
    }
}

/// Item path of a build: `<prefix>/<directory>/<build>`, relative when the
/// prefix is just "/".
pub fn item_base_path(prefix: &str, directory: &str, build: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let tail = format!("{}/{}", directory.trim_matches('/'), build);
    if prefix.is_empty() {
        tail
    } else {
        format!("{}/{}", prefix, tail)
    }
}
