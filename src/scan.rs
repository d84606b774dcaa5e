//! Dated build directory scanning
//!
//! A product directory holds one subdirectory per build, named after the
//! build time (`YYYYMMDD_HH:MM`). Only the leading 8-digit date is required
//! for a directory to count as a build; anything else is skipped.

use chrono::{DateTime, NaiveDate, TimeZone};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Format of new build directory names.
pub const BUILD_DIR_FORMAT: &str = "%Y%m%d_%H:%M";

/// A dated build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDir {
    /// Directory name (the version key)
    pub name: String,
    /// Date parsed from the first 8 characters
    pub date: NaiveDate,
    /// Full path
    pub path: PathBuf,
}

/// Parse the build date from the first 8 characters of a directory name.
pub fn parse_build_date(name: &str) -> Option<NaiveDate> {
    let prefix = name.get(..8)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y%m%d").ok()
}

/// Directory name for a build created at `at`.
pub fn build_dir_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format(BUILD_DIR_FORMAT).to_string()
}

/// Lazy scan over the build directories of one product.
///
/// Yields entries in directory listing order, which is not chronological.
/// Use [`sorted_build_dirs`] when order matters.
pub struct BuildDirScanner {
    entries: fs::ReadDir,
}

impl BuildDirScanner {
    /// Start scanning `product_dir`.
    pub fn open(product_dir: &Path) -> io::Result<Self> {
        Ok(Self {
            entries: fs::read_dir(product_dir)?,
        })
    }
}

impl Iterator for BuildDirScanner {
    type Item = BuildDir;

    fn next(&mut self) -> Option<BuildDir> {
        for entry in self.entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "failed to read directory entry");
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                debug!(entry = %name, "skipping non-directory entry");
                continue;
            }

            debug!(dir = %name, "checking directory");

            match parse_build_date(&name) {
                Some(date) => {
                    return Some(BuildDir {
                        name,
                        date,
                        path: entry.path(),
                    })
                }
                None => debug!(dir = %name, "skipping directory without build date"),
            }
        }
        None
    }
}

/// All build directories of `product_dir`, oldest first.
///
/// Builds of the same day are ordered by name, which for the
/// `YYYYMMDD_HH:MM` convention is their time of day.
pub fn sorted_build_dirs(product_dir: &Path) -> io::Result<Vec<BuildDir>> {
    let mut dirs: Vec<_> = BuildDirScanner::open(product_dir)?.collect();
    dirs.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
    Ok(dirs)
}
