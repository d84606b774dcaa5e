//! Shared JSON encoding for all Simplestreams documents.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::StreamsError;

/// A top-level JSON document.
///
/// Every map in the document types is a `BTreeMap`, so encoding the same
/// value twice yields byte-identical output.
pub trait Document: Serialize + DeserializeOwned {
    /// Serialize to pretty JSON.
    fn to_json(&self) -> Result<String, StreamsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON text.
    fn from_json(json: &str) -> Result<Self, StreamsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from raw bytes (e.g. an HTTP response body).
    fn from_slice(bytes: &[u8]) -> Result<Self, StreamsError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Write pretty JSON followed by a newline.
    fn write_to<W: Write>(&self, mut out: W) -> Result<(), StreamsError> {
        let json = self.to_json()?;
        out.write_all(json.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    /// Write to a file, creating parent directories as needed.
    fn write_to_file(&self, path: &Path) -> Result<(), StreamsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
    }

    /// Load from a file.
    fn from_file(path: &Path) -> Result<Self, StreamsError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
