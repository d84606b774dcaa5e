//! Simplestreams builder CLI
//!
//! Entry point for the `ssbuilder` command-line tool.

use chrono::Utc;
use clap::{Parser, Subcommand};
use simplestreams_builder::catalog::Aggregation;
use simplestreams_builder::manifest::AssembleOptions;
use simplestreams_builder::output::{self, Output};
use simplestreams_builder::{
    ConfigError, FetchSettings, IndexAssembler, ProductAggregator, RetentionPolicy,
    RetentionPurger, TreeConfig, VersionManifestAssembler,
};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ssbuilder")]
#[command(about = "Simplestreams tree builder for LXD/Incus images", version)]
struct Cli {
    /// Path to the tree configuration file (YAML or TOML)
    #[arg(long, short = 'c', global = true, env = "SSBUILDER_CONFIG")]
    config: Option<PathBuf>,

    /// Target directory of generated files
    #[arg(long, short = 't', global = true)]
    target_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the loaded configuration
    Print,

    /// Build the ssb.json file of one product
    BuildVersionsManifest {
        /// Name of the product
        #[arg(long, short = 'p')]
        product: String,

        /// Directory holding the product build directories
        #[arg(long, short = 's')]
        source_dir: PathBuf,

        /// Print ssb.json to stdout
        #[arg(long)]
        stdout: bool,

        /// Image definition declaring the expiry
        #[arg(long, short = 'i')]
        image_file: Option<PathBuf>,

        /// Expiry duration overriding the image definition (e.g. 30d)
        #[arg(long)]
        force_expire: Option<String>,
    },

    /// Build the images.json catalog of the tree
    BuildImagesFile {
        /// Directory holding the product ssb.json files
        #[arg(long, short = 's')]
        source_dir: Option<PathBuf>,

        /// Print images.json to stdout
        #[arg(long)]
        stdout: bool,
    },

    /// Build the index.json file of the tree
    BuildIndex {
        /// Directory holding the product ssb.json files
        #[arg(long, short = 's')]
        source_dir: Option<PathBuf>,

        /// Print index.json to stdout
        #[arg(long)]
        stdout: bool,
    },

    /// Delete old builds of a product
    Purge {
        /// Name of the product
        #[arg(long, short = 'p')]
        product: String,

        /// Directory holding the product build directories
        #[arg(long, short = 's')]
        source_dir: PathBuf,

        /// Only report what would be deleted
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());
    let target_dir = cli.target_dir.as_deref();

    match cli.command {
        Commands::Print => {
            print!("{}", config);
        }
        Commands::BuildVersionsManifest {
            product,
            source_dir,
            stdout,
            image_file,
            force_expire,
        } => {
            run_build_versions_manifest(
                &config,
                target_dir,
                &product,
                &source_dir,
                stdout,
                image_file,
                force_expire,
            );
        }
        Commands::BuildImagesFile { source_dir, stdout } => {
            run_build_images_file(&config, target_dir, source_dir.as_deref(), stdout);
        }
        Commands::BuildIndex { source_dir, stdout } => {
            run_build_index(&config, target_dir, source_dir.as_deref(), stdout);
        }
        Commands::Purge {
            product,
            source_dir,
            dry_run,
        } => {
            run_purge(&config, &product, &source_dir, dry_run);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn fail(context: &str, err: impl Display) -> ! {
    error!("{}: {}", context, err);
    process::exit(1);
}

fn load_config(path: Option<&Path>) -> TreeConfig {
    let Some(path) = path else {
        fail("Error loading config", ConfigError::MissingPath);
    };
    match TreeConfig::load(path) {
        Ok(config) => config,
        Err(e) => fail("Error loading config", e),
    }
}

fn select_output(target: Option<PathBuf>, stdout: bool) -> Output {
    match Output::select(target, stdout) {
        Ok(out) => out,
        Err(e) => fail("Error", e),
    }
}

fn run_build_versions_manifest(
    config: &TreeConfig,
    target_dir: Option<&Path>,
    product_name: &str,
    source_dir: &Path,
    stdout: bool,
    image_file: Option<PathBuf>,
    force_expire: Option<String>,
) {
    let product = match config.product(product_name) {
        Ok(p) => p,
        Err(e) => fail("Error", e),
    };

    let product_dir = source_dir.join(&product.directory);
    let options = AssembleOptions {
        product_dir: product_dir.clone(),
        path_prefix: config.prefix.clone(),
        force_expire,
        image_file,
    };

    let assembled = match VersionManifestAssembler::new().assemble(
        &product.name,
        &product.directory,
        &options,
        Utc::now(),
    ) {
        Ok(a) => a,
        Err(e) => fail("Error building versions manifest", e),
    };

    for skipped in &assembled.skipped {
        warn!(version = %skipped.version, error = %skipped.error, "version skipped");
    }

    let out = if stdout {
        Output::Stdout
    } else {
        Output::File(output::manifest_path(target_dir, &product_dir, &product.directory))
    };
    if let Err(e) = out.emit(&assembled.manifest) {
        fail("Error writing ssb.json", e);
    }
}

fn aggregate(config: &TreeConfig, source_dir: Option<&Path>) -> Aggregation {
    let settings = FetchSettings::from_env(config.apikey.as_deref());
    let aggregator = match ProductAggregator::new(config, source_dir, &settings) {
        Ok(a) => a,
        Err(e) => fail("Error", e),
    };

    let aggregation = aggregator.aggregate();
    info!(
        products = aggregation.products.products.len(),
        skipped = aggregation.skipped.len(),
        "catalog aggregated"
    );
    aggregation
}

fn run_build_images_file(
    config: &TreeConfig,
    target_dir: Option<&Path>,
    source_dir: Option<&Path>,
    stdout: bool,
) {
    let out = select_output(target_dir.map(output::products_path), stdout);

    let aggregation = aggregate(config, source_dir);
    if let Err(e) = out.emit(&aggregation.products) {
        fail("Error writing images.json", e);
    }
}

fn run_build_index(
    config: &TreeConfig,
    target_dir: Option<&Path>,
    source_dir: Option<&Path>,
    stdout: bool,
) {
    let out = select_output(target_dir.map(output::index_path), stdout);

    let aggregation = aggregate(config, source_dir);
    let index = match IndexAssembler::new(config).assemble(&aggregation.products) {
        Ok(i) => i,
        Err(e) => fail("Error building index", e),
    };
    if let Err(e) = out.emit(&index) {
        fail("Error writing index.json", e);
    }
}

fn run_purge(config: &TreeConfig, product_name: &str, source_dir: &Path, dry_run: bool) {
    let product = match config.product(product_name) {
        Ok(p) => p,
        Err(e) => fail("Error", e),
    };

    let mut policy = RetentionPolicy::keep_last_n(product.retention());
    if dry_run {
        policy = policy.with_dry_run();
    }

    let product_dir = source_dir.join(&product.directory);
    let result = match RetentionPurger::new(product_dir, policy).run() {
        Ok(r) => r,
        Err(e) => fail("Error purging builds", e),
    };

    info!(
        product = %product.name,
        scanned = result.scanned,
        deleted = result.deleted.len(),
        bytes = result.bytes_reclaimed,
        "purge complete"
    );
    for err in &result.errors {
        warn!(product = %product.name, "{}", err);
    }
}
