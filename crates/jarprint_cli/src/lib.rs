// jarprint_cli - command-line front end (library interface for testing)
use anyhow::{bail, Context, Result};
use clap::Parser;
use jarprint_core::{extract_libraries, fingerprint, serialize, LibraryCoordinates};
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub mod config;
pub mod logging;
pub mod supplier;

pub use config::{ExtractConfig, JarBinding, DEFAULT_DOWNLOAD_DIR};
pub use supplier::LocalArchiveSupplier;

#[derive(Parser)]
#[command(name = "jarprint")]
#[command(about = "Canonical API surface and fingerprint of compiled Java libraries")]
#[command(version)]
pub struct Cli {
    /// Log decoding progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Print the canonical API description of one or more libraries
    Extract {
        #[command(flatten)]
        input: InputArgs,
        /// Write the canonical text to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the SHA-256 fingerprint of the canonical API description
    Hash {
        #[command(flatten)]
        input: InputArgs,
        /// Fail when the fingerprint differs from this value
        #[arg(long, value_name = "HEX")]
        expect: Option<String>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Library to describe, as groupId:artifactId:version
    #[arg(long = "library", value_name = "COORDS", required = true)]
    pub libraries: Vec<LibraryCoordinates>,
    /// Dependency that must be present next to the libraries
    #[arg(long = "dependency", value_name = "COORDS")]
    pub dependencies: Vec<LibraryCoordinates>,
    /// Directory holding {artifactId}-{version}.jar archives
    #[arg(long, default_value = DEFAULT_DOWNLOAD_DIR)]
    pub download_dir: PathBuf,
    /// Read a library from an explicit archive path
    #[arg(long = "jar", value_name = "COORDS=PATH")]
    pub jars: Vec<JarBinding>,
    /// Fail when a library contains no type records
    #[arg(long)]
    pub strict: bool,
}

impl InputArgs {
    pub fn into_config(self) -> ExtractConfig {
        ExtractConfig {
            download_dir: self.download_dir,
            libraries: self.libraries,
            dependencies: self.dependencies,
            jars: self.jars,
            output: None,
            strict: self.strict,
        }
    }
}

/// Decodes every configured library and renders the canonical text.
pub fn canonical_text(config: &ExtractConfig) -> Result<String> {
    if config.libraries.is_empty() {
        bail!("no libraries to extract");
    }

    let supplier = LocalArchiveSupplier::from_config(config);
    for dependency in &config.dependencies {
        supplier.check_dependency(dependency)?;
    }

    let mut inputs = Vec::with_capacity(config.libraries.len());
    for library in &config.libraries {
        inputs.push((library.clone(), supplier.supply(library)?));
    }

    let results = extract_libraries(&config.extract_options(), inputs)
        .context("failed to extract API surface")?;
    serialize(&results).context("failed to render canonical text")
}

/// Runs `extract` and returns what should be printed to stdout.
pub fn run_extract(config: &ExtractConfig) -> Result<String> {
    let text = canonical_text(config)?;
    match &config.output {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "canonical text written");
            Ok(format!("API extracted to: {}", path.display()))
        }
        None => Ok(text),
    }
}

/// Runs `hash`, checking against `expect` when given.
pub fn run_hash(config: &ExtractConfig, expect: Option<&str>) -> Result<String> {
    let digest = fingerprint(&canonical_text(config)?);
    if let Some(expected) = expect {
        let expected = expected.trim();
        if !expected.eq_ignore_ascii_case(&digest) {
            bail!("API drift: expected fingerprint {expected}, found {digest}");
        }
    }
    Ok(digest)
}
