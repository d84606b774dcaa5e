//! Shared test fixtures: fixture file paths and build directory helpers.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Path of a file under tests/fixtures
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Create a dated build directory holding `files`.
pub fn make_build(product_dir: &Path, build: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let dir = product_dir.join(build);
    fs::create_dir_all(&dir).unwrap();
    for (name, data) in files {
        fs::write(dir.join(name), data).unwrap();
    }
    dir
}

/// A complete build: envelope, squashfs and tarball rootfs.
pub fn make_full_build(product_dir: &Path, build: &str) -> PathBuf {
    make_build(
        product_dir,
        build,
        &[
            ("lxd.tar.xz", b"envelope"),
            ("rootfs.squashfs", b"squashfs-bytes"),
            ("rootfs.tar.xz", b"tarball-bytes"),
        ],
    )
}

/// SHA-256 of bytes as hex
pub fn sha256_hex(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(data))
}
