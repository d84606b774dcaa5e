//! Builder configuration
//!
//! The tree configuration (products and catalog settings) is read from a
//! YAML or TOML file; remote fetch settings come from `SSBUILDER_*`
//! environment variables.

mod env;
mod tree;

pub use env::{FetchSettings, ENV_PREFIX};
pub use tree::{ConfigError, ProductConfig, TreeConfig};
