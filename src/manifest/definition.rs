//! Image definition file (distrobuilder YAML)
//!
//! Only the `image` section is read; the expiry it declares sets the
//! end-of-life of a product's builds.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors for image definition files
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("Image file {0} not found")]
    NotFound(PathBuf),

    #[error("Failed to read image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse image file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// The parts of an image definition the builder cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageDefinition {
    #[serde(default)]
    pub image: DefinitionImage,
}

/// The `image` section of a definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefinitionImage {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub distribution: String,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    /// Expiry duration expression, e.g. `30d`
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
}

impl ImageDefinition {
    /// Parse definition YAML.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Locate and load an image file.
    ///
    /// `<prefix>/<image_file>` is tried first, then `image_file` as given.
    pub fn load(image_file: &Path, prefix: Option<&Path>) -> Result<Self, DefinitionError> {
        let path = resolve_image_file(image_file, prefix)?;
        let content = std::fs::read_to_string(&path).map_err(|source| DefinitionError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content).map_err(|source| DefinitionError::Parse { path, source })
    }

    /// Declared expiry expression, if any.
    pub fn expiry(&self) -> Option<&str> {
        self.image.expiry.as_deref().filter(|e| !e.trim().is_empty())
    }
}

fn resolve_image_file(image_file: &Path, prefix: Option<&Path>) -> Result<PathBuf, DefinitionError> {
    if let Some(prefix) = prefix {
        let candidate = prefix.join(image_file);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    if image_file.is_file() {
        return Ok(image_file.to_path_buf());
    }
    Err(DefinitionError::NotFound(image_file.to_path_buf()))
}
