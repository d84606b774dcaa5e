//! Product catalog aggregation (`images.json`)
//!
//! Each visible product's version manifest is resolved from disk or from
//! its remote prefix, checked against the configured name and merged with
//! the static product settings. A product that cannot be resolved is
//! skipped with a reason; only structural problems abort the run.

use std::io;
use std::path::{Path, PathBuf};

use ssb_streams::{CatalogProduct, Document, ProductManifest, ProductsDocument, StreamsError};
use tracing::{debug, info, warn};

use super::fetch::{FetchError, ManifestFetcher};
use crate::config::{ConfigError, FetchSettings, ProductConfig, TreeConfig};

/// Why a product was left out of the catalog
#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("manifest {0} not found")]
    ManifestMissing(PathBuf),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest belongs to '{found}', expected '{expected}'")]
    NameMismatch { expected: String, found: String },
}

/// Errors that abort aggregation
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Product {0} has no prefix_path but no source directory was given")]
    MissingSourceDir(String),

    #[error(transparent)]
    Client(FetchError),
}

/// Outcome of resolving one product.
pub type ProductOutcome = Result<ProductManifest, SkipReason>;

/// Catalog plus the products left out of it.
#[derive(Debug)]
pub struct Aggregation {
    pub products: ProductsDocument,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Resolves and merges product manifests.
pub struct ProductAggregator<'a> {
    config: &'a TreeConfig,
    source_dir: Option<&'a Path>,
    fetcher: Option<ManifestFetcher>,
}

impl<'a> ProductAggregator<'a> {
    /// Prepare aggregation over the visible products of `config`.
    ///
    /// Fails before any I/O when the catalog settings are incomplete or a
    /// local product has nowhere to be read from.
    pub fn new(
        config: &'a TreeConfig,
        source_dir: Option<&'a Path>,
        settings: &FetchSettings,
    ) -> Result<Self, AggregateError> {
        config.require_catalog_settings()?;

        let mut needs_fetcher = false;
        for product in config.visible_products() {
            if product.remote_manifest_url().is_some() {
                needs_fetcher = true;
            } else if source_dir.is_none() {
                return Err(AggregateError::MissingSourceDir(product.name.clone()));
            }
        }

        let fetcher = if needs_fetcher {
            Some(ManifestFetcher::new(settings).map_err(AggregateError::Client)?)
        } else {
            None
        };

        Ok(Self {
            config,
            source_dir,
            fetcher,
        })
    }

    /// Resolve the manifest of every visible product, in configuration order.
    pub fn resolve_all(&self) -> Vec<(&'a ProductConfig, ProductOutcome)> {
        self.config
            .visible_products()
            .map(|product| (product, self.resolve(product)))
            .collect()
    }

    /// Resolve and validate one product's manifest.
    pub fn resolve(&self, product: &ProductConfig) -> ProductOutcome {
        let manifest = match (product.remote_manifest_url(), &self.fetcher) {
            (Some(url), Some(fetcher)) => {
                info!(product = %product.name, url = %url, "fetching manifest");
                fetcher.fetch(&url)?
            }
            _ => self.read_local(product)?,
        };

        if manifest.name != product.name {
            return Err(SkipReason::NameMismatch {
                expected: product.name.clone(),
                found: manifest.name,
            });
        }
        Ok(manifest)
    }

    fn read_local(&self, product: &ProductConfig) -> ProductOutcome {
        let source_dir = self.source_dir.unwrap_or_else(|| Path::new("."));
        let path = product.local_manifest_path(source_dir);
        debug!(product = %product.name, path = %path.display(), "checking manifest");

        if !path.is_file() {
            return Err(SkipReason::ManifestMissing(path));
        }

        ProductManifest::from_file(&path).map_err(|e| match e {
            StreamsError::Io(source) => SkipReason::Read { path, source },
            StreamsError::Json(source) => SkipReason::Parse { path, source },
        })
    }

    /// Build the products catalog.
    pub fn aggregate(&self) -> Aggregation {
        let mut products = ProductsDocument::new(&self.config.datatype, &self.config.format);
        products.content_id = self.config.content_id.clone();
        products.license = self.config.license.clone();

        let mut skipped = Vec::new();
        for (product, outcome) in self.resolve_all() {
            match outcome {
                Ok(manifest) => {
                    let entry = catalog_product(product, manifest, self.config.bridge_incus_lxd);
                    products.products.insert(product.name.clone(), entry);
                }
                Err(reason) => {
                    warn!(product = %product.name, reason = %reason, "product skipped");
                    skipped.push((product.name.clone(), reason));
                }
            }
        }

        Aggregation { products, skipped }
    }
}

/// Merge a product's settings with its version manifest.
pub fn catalog_product(
    product: &ProductConfig,
    manifest: ProductManifest,
    bridge_incus_lxd: bool,
) -> CatalogProduct {
    let mut versions = manifest.versions;
    if bridge_incus_lxd {
        for version in versions.values_mut() {
            version.bridge_incus_lxd();
        }
    }

    CatalogProduct {
        aliases: product.joined_aliases(),
        architecture: product.architecture.clone(),
        operating_system: product.operating_system.clone(),
        release: product.release.clone(),
        release_codename: product.release_codename.clone(),
        release_title: product.release_title.clone(),
        support_eol: manifest.support_eol.filter(|eol| !eol.is_empty()),
        version: product.version.clone().filter(|v| !v.is_empty()),
        versions,
        variant: product.variant.clone(),
        ..Default::default()
    }
}
