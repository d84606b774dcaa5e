//! Build retention
//!
//! Keeps the newest N dated builds of a product and deletes the rest,
//! oldest first. Only directories that count as builds (see
//! [`crate::scan`]) are considered; anything else in the product directory
//! is left alone.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::scan::sorted_build_dirs;

/// How many builds to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Builds to keep (at least 1)
    pub keep: usize,
    /// Log but don't delete
    pub dry_run: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::keep_last_n(1)
    }
}

impl RetentionPolicy {
    /// Keep the newest `count` builds. Zero is treated as one.
    pub fn keep_last_n(count: usize) -> Self {
        Self {
            keep: count.max(1),
            dry_run: false,
        }
    }

    /// Set dry-run mode.
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Result of a purge.
#[derive(Debug, Clone, Default)]
pub struct PurgeResult {
    /// Number of builds found
    pub scanned: usize,
    /// Builds deleted (or that would be, in dry-run mode), oldest first
    pub deleted: Vec<String>,
    /// Bytes reclaimed
    pub bytes_reclaimed: u64,
    /// Errors encountered (non-fatal)
    pub errors: Vec<String>,
}

/// Removes one build directory.
pub type Remover = fn(&Path) -> io::Result<()>;

fn remove_build(path: &Path) -> io::Result<()> {
    std::fs::remove_dir_all(path)
}

/// Deletes old builds of one product.
#[derive(Clone)]
pub struct RetentionPurger {
    product_dir: PathBuf,
    policy: RetentionPolicy,
    remove: Remover,
}

impl fmt::Debug for RetentionPurger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetentionPurger")
            .field("product_dir", &self.product_dir)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetentionPurger {
    pub fn new(product_dir: PathBuf, policy: RetentionPolicy) -> Self {
        Self {
            product_dir,
            policy,
            remove: remove_build,
        }
    }

    /// Delete builds with `remove` instead of `remove_dir_all`.
    pub fn with_remover(mut self, remove: Remover) -> Self {
        self.remove = remove;
        self
    }

    /// Delete the oldest builds until at most `keep` remain.
    ///
    /// Fails only if the product directory cannot be listed; a build that
    /// cannot be deleted is recorded in `errors` and the purge goes on.
    pub fn run(&self) -> io::Result<PurgeResult> {
        let builds = sorted_build_dirs(&self.product_dir)?;
        let mut result = PurgeResult {
            scanned: builds.len(),
            ..Default::default()
        };

        let excess = builds.len().saturating_sub(self.policy.keep);
        for build in builds.into_iter().take(excess) {
            let size = dir_size(&build.path);

            if self.policy.dry_run {
                info!(build = %build.name, bytes = size, "dry-run: would delete build");
            } else if let Err(e) = (self.remove)(&build.path) {
                warn!(build = %build.name, error = %e, "failed to delete build");
                result
                    .errors
                    .push(format!("Failed to delete {}: {}", build.name, e));
                continue;
            } else {
                info!(build = %build.name, bytes = size, "deleted build");
            }

            result.deleted.push(build.name);
            result.bytes_reclaimed += size;
        }

        Ok(result)
    }
}

/// Total size of the regular files below `path`.
fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
