//! Tree configuration file
//!
//! Describes the Simplestreams tree being built: catalog settings plus the
//! list of products. Each product name must be unique; it is the only key
//! joining a product to its version manifest.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ssb_streams::{DEFAULT_DATATYPE, DEFAULT_PRODUCTS_FORMAT};

/// Tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// URL path prefix of the tree on the image server
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Directory of the stream documents relative to the prefix
    #[serde(default = "default_images_path")]
    pub images_path: String,

    #[serde(default = "default_datatype")]
    pub datatype: String,

    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_content_id")]
    pub content_id: String,

    #[serde(default)]
    pub license: Option<String>,

    /// Credential sent when fetching remote version manifests
    #[serde(default)]
    pub apikey: Option<String>,

    /// Publish LXD envelopes under the Incus key too (and vice versa)
    #[serde(default)]
    pub bridge_incus_lxd: bool,

    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

fn default_prefix() -> String {
    "/".to_string()
}

fn default_images_path() -> String {
    "streams/v1".to_string()
}

fn default_datatype() -> String {
    DEFAULT_DATATYPE.to_string()
}

fn default_format() -> String {
    DEFAULT_PRODUCTS_FORMAT.to_string()
}

fn default_content_id() -> String {
    "images".to_string()
}

/// A product of the tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductConfig {
    /// Unique product name
    pub name: String,

    #[serde(rename = "arch", default)]
    pub architecture: String,

    #[serde(default)]
    pub release: String,

    #[serde(default)]
    pub release_title: String,

    #[serde(default)]
    pub release_codename: Option<String>,

    #[serde(rename = "os", default)]
    pub operating_system: String,

    /// Directory holding the product's dated builds (defaults to the name)
    #[serde(default)]
    pub directory: String,

    /// Overrides the catalog version field
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub variant: Option<String>,

    /// Remote location of the version manifest; local lookup when unset
    #[serde(default)]
    pub prefix_path: Option<String>,

    #[serde(default)]
    pub build_script_hook: Option<String>,

    #[serde(default)]
    pub aliases: Vec<String>,

    /// Hidden products are left out of the catalog and index
    #[serde(default)]
    pub hidden: bool,

    /// Number of dated builds to keep
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    1
}

/// Errors that can occur when loading or validating the tree configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Missing configuration file")]
    MissingPath,

    #[error("No products defined")]
    Empty,

    #[error("Duplicate product name: '{0}'")]
    DuplicateName(String),

    #[error("Product '{name}': missing required field '{field}'")]
    MissingField { name: String, field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("No product found with name '{0}'")]
    UnknownProduct(String),
}

impl TreeConfig {
    /// Load the configuration from a YAML (`.yaml`/`.yml`) or TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            Self::parse_toml(&content)
        } else {
            Self::parse_yaml(&content)
        }
    }

    /// Parse a YAML configuration.
    pub fn parse_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: TreeConfig = serde_yaml::from_str(content)?;
        config.normalized()
    }

    /// Parse a TOML configuration.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: TreeConfig = toml::from_str(content)?;
        config.normalized()
    }

    /// Fill derived defaults and validate.
    fn normalized(mut self) -> Result<Self, ConfigError> {
        for product in &mut self.products {
            if product.days <= 0 {
                product.days = 1;
            }
            if product.directory.is_empty() {
                product.directory = product.name.clone();
            }
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen_names = HashSet::new();
        for product in &self.products {
            if product.name.is_empty() {
                return Err(ConfigError::MissingField {
                    name: "(unnamed)".to_string(),
                    field: "name".to_string(),
                });
            }
            if !seen_names.insert(product.name.as_str()) {
                return Err(ConfigError::DuplicateName(product.name.clone()));
            }
        }
        Ok(())
    }

    /// Check the settings required to build catalog documents.
    pub fn require_catalog_settings(&self) -> Result<(), ConfigError> {
        if self.datatype.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "datatype".to_string(),
                reason: "datatype cannot be empty".to_string(),
            });
        }
        if self.images_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "images_path".to_string(),
                reason: "images path cannot be empty".to_string(),
            });
        }
        if self.products.is_empty() {
            return Err(ConfigError::Empty);
        }
        Ok(())
    }

    /// Get a product by name
    pub fn product(&self, name: &str) -> Result<&ProductConfig, ConfigError> {
        self.products
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::UnknownProduct(name.to_string()))
    }

    /// Products that are published in the catalog, in configuration order
    pub fn visible_products(&self) -> impl Iterator<Item = &ProductConfig> {
        self.products.iter().filter(|p| !p.hidden)
    }

    /// Path of the products catalog relative to the server root.
    ///
    /// `prefix` "/" and `images_path` "streams/v1" give
    /// `streams/v1/images.json`.
    pub fn products_document_path(&self) -> String {
        let prefix = self.prefix.trim_end_matches('/');
        let images_path = self.images_path.trim_start_matches('/');
        let joined = join_url_path(prefix, images_path);
        format!(
            "{}/{}",
            joined.trim_end_matches('/'),
            ssb_streams::PRODUCTS_FILENAME
        )
    }
}

impl ProductConfig {
    /// Retention count, never below one.
    pub fn retention(&self) -> usize {
        self.days.max(1) as usize
    }

    /// Remote version manifest URL, if the product lives on another server.
    pub fn remote_manifest_url(&self) -> Option<String> {
        let prefix = self.prefix_path.as_deref().filter(|p| !p.is_empty())?;
        Some(format!(
            "{}/{}/{}",
            prefix.trim_end_matches('/'),
            self.directory.trim_end_matches('/'),
            ssb_streams::MANIFEST_FILENAME
        ))
    }

    /// Local version manifest path under `source_dir`.
    pub fn local_manifest_path(&self, source_dir: &Path) -> PathBuf {
        source_dir
            .join(&self.directory)
            .join(ssb_streams::MANIFEST_FILENAME)
    }

    /// Aliases joined the way the catalog expects them.
    pub fn joined_aliases(&self) -> String {
        self.aliases.join(",")
    }
}

/// Join two URL path fragments, dropping empty ones.
pub(crate) fn join_url_path(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            rest.trim_start_matches('/')
        ),
    }
}

impl fmt::Display for TreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "prefix: {}", self.prefix)?;
        writeln!(f, "images_path: {}", self.images_path)?;
        writeln!(f, "datatype: {}", self.datatype)?;
        writeln!(f, "format: {}", self.format)?;
        writeln!(f, "content_id: {}", self.content_id)?;
        writeln!(f, "bridge_incus_lxd: {}", self.bridge_incus_lxd)?;
        writeln!(f, "products:")?;
        for product in &self.products {
            write!(f, "{}", product)?;
        }
        Ok(())
    }
}

impl fmt::Display for ProductConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  - name: {}", self.name)?;
        writeln!(f, "    arch: {}", self.architecture)?;
        writeln!(f, "    release: {}", self.release)?;
        writeln!(f, "    release_title: {}", self.release_title)?;
        writeln!(f, "    os: {}", self.operating_system)?;
        writeln!(f, "    directory: {}", self.directory)?;
        writeln!(f, "    version: {}", self.version.as_deref().unwrap_or(""))?;
        writeln!(f, "    prefix_path: {}", self.prefix_path.as_deref().unwrap_or(""))?;
        writeln!(f, "    hidden: {}", self.hidden)?;
        writeln!(f, "    days: {}", self.days)?;
        writeln!(
            f,
            "    build_script_hook: {}",
            self.build_script_hook.as_deref().unwrap_or("")
        )?;
        writeln!(f, "    aliases: [{}]", self.aliases.join(", "))
    }
}
