//! Resolves library coordinates to jars on the local filesystem.

use crate::config::ExtractConfig;
use anyhow::{bail, Context, Result};
use jarprint_core::archive::read_archive;
use jarprint_core::LibraryCoordinates;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct LocalArchiveSupplier {
    download_dir: PathBuf,
    overrides: Vec<(LibraryCoordinates, PathBuf)>,
}

impl LocalArchiveSupplier {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            overrides: Vec::new(),
        }
    }

    pub fn from_config(config: &ExtractConfig) -> Self {
        config
            .jars
            .iter()
            .fold(Self::new(&config.download_dir), |supplier, binding| {
                supplier.with_override(binding.library.clone(), binding.path.clone())
            })
    }

    /// Later bindings for the same library replace earlier ones.
    pub fn with_override(mut self, library: LibraryCoordinates, path: impl Into<PathBuf>) -> Self {
        self.overrides.retain(|(bound, _)| bound != &library);
        self.overrides.push((library, path.into()));
        self
    }

    /// `{download_dir}/{artifactId}-{version}.jar` unless explicitly bound.
    pub fn archive_path(&self, library: &LibraryCoordinates) -> PathBuf {
        self.overrides
            .iter()
            .find(|(bound, _)| bound == library)
            .map(|(_, path)| path.clone())
            .unwrap_or_else(|| self.download_dir.join(library.jar_name()))
    }

    /// Reads every entry of the library's archive into memory.
    pub fn supply(&self, library: &LibraryCoordinates) -> Result<Vec<(String, Vec<u8>)>> {
        let path = self.locate(library)?;
        info!(library = %library, path = %path.display(), "reading archive");
        let entries = read_archive(&path)
            .with_context(|| format!("failed to read archive for {}", library))?;
        debug!(library = %library, entries = entries.len(), "archive loaded");
        Ok(entries)
    }

    /// Dependencies are only required to be present; nothing is linked against them.
    pub fn check_dependency(&self, dependency: &LibraryCoordinates) -> Result<PathBuf> {
        let path = self
            .locate(dependency)
            .with_context(|| format!("dependency {} is not available", dependency))?;
        debug!(dependency = %dependency, path = %path.display(), "dependency present");
        Ok(path)
    }

    fn locate(&self, library: &LibraryCoordinates) -> Result<PathBuf> {
        let path = self.archive_path(library);
        if !path.is_file() {
            bail!(
                "archive for {} not found at {}",
                library,
                path.display()
            );
        }
        Ok(path)
    }
}
