//! Where generated documents go.

use std::io;
use std::path::{Path, PathBuf};

use ssb_streams::{Document, StreamsError, INDEX_FILENAME, MANIFEST_FILENAME, PRODUCTS_FILENAME};
use tracing::info;

/// Directory of the stream documents below a target directory.
pub const STREAMS_DIR: &str = "streams/v1";

/// Destination of a generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

/// Invalid choice of destination
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutputError {
    #[error("missing target-dir or stdout option")]
    Missing,

    #[error("use target-dir or stdout option, not both")]
    Conflict,
}

impl Output {
    /// Pick the destination of a tree document: exactly one of a target
    /// file and stdout.
    pub fn select(target: Option<PathBuf>, stdout: bool) -> Result<Self, OutputError> {
        match (target, stdout) {
            (Some(_), true) => Err(OutputError::Conflict),
            (Some(path), false) => Ok(Output::File(path)),
            (None, true) => Ok(Output::Stdout),
            (None, false) => Err(OutputError::Missing),
        }
    }

    /// Write `doc` as pretty JSON.
    pub fn emit<D: Document>(&self, doc: &D) -> Result<(), StreamsError> {
        match self {
            Output::Stdout => doc.write_to(io::stdout().lock()),
            Output::File(path) => {
                doc.write_to_file(path)?;
                info!(path = %path.display(), "wrote document");
                Ok(())
            }
        }
    }
}

/// Location of a product's `ssb.json`: below the target directory when one
/// is given, otherwise inside the product's build directory.
pub fn manifest_path(target_dir: Option<&Path>, product_dir: &Path, directory: &str) -> PathBuf {
    match target_dir {
        Some(target) => target.join(directory).join(MANIFEST_FILENAME),
        None => product_dir.join(MANIFEST_FILENAME),
    }
}

/// Location of `images.json` below a target directory.
pub fn products_path(target_dir: &Path) -> PathBuf {
    target_dir.join(STREAMS_DIR).join(PRODUCTS_FILENAME)
}

/// Location of `index.json` below a target directory.
pub fn index_path(target_dir: &Path) -> PathBuf {
    target_dir.join(STREAMS_DIR).join(INDEX_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssb_streams::{IndexDocument, ProductManifest};
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let target = Path::new("/srv/tree");
        assert_eq!(
            manifest_path(Some(target), Path::new("/builds/alpine"), "alpine"),
            PathBuf::from("/srv/tree/alpine/ssb.json")
        );
        assert_eq!(
            manifest_path(None, Path::new("/builds/alpine"), "alpine"),
            PathBuf::from("/builds/alpine/ssb.json")
        );
        assert_eq!(
            products_path(target),
            PathBuf::from("/srv/tree/streams/v1/images.json")
        );
        assert_eq!(
            index_path(target),
            PathBuf::from("/srv/tree/streams/v1/index.json")
        );
    }

    #[test]
    fn test_select() {
        let target = Some(PathBuf::from("/srv/tree/streams/v1/index.json"));
        assert_eq!(
            Output::select(target.clone(), false),
            Ok(Output::File(PathBuf::from("/srv/tree/streams/v1/index.json")))
        );
        assert_eq!(Output::select(None, true), Ok(Output::Stdout));
        assert_eq!(Output::select(target, true), Err(OutputError::Conflict));
        assert_eq!(Output::select(None, false), Err(OutputError::Missing));
    }

    #[test]
    fn test_emit_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = index_path(dir.path());

        Output::File(path.clone())
            .emit(&IndexDocument::default())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("}\n"));
        assert_eq!(IndexDocument::from_json(&content).unwrap(), IndexDocument::default());
    }

    #[test]
    fn test_emit_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alpine").join("ssb.json");
        let output = Output::File(path.clone());

        output.emit(&ProductManifest::new("old-name-that-is-long")).unwrap();
        output.emit(&ProductManifest::new("alpine")).unwrap();

        assert_eq!(ProductManifest::from_file(&path).unwrap().name, "alpine");
    }
}
