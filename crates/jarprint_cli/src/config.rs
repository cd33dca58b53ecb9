use jarprint_core::{ExtractOptions, LibraryCoordinates};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DOWNLOAD_DIR: &str = "download";

/// Binds a library to an explicit archive path (`group:artifact:version=path/to.jar`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarBinding {
    pub library: LibraryCoordinates,
    pub path: PathBuf,
}

impl FromStr for JarBinding {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (coords, path) = value
            .split_once('=')
            .ok_or_else(|| format!("expected COORDS=PATH, got '{value}'"))?;
        if path.is_empty() {
            return Err(format!("missing archive path in '{value}'"));
        }
        let library = coords.parse().map_err(|error| format!("{error}"))?;
        Ok(Self {
            library,
            path: PathBuf::from(path),
        })
    }
}

impl fmt::Display for JarBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.library, self.path.display())
    }
}

/// Everything one `extract`/`hash` run needs.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub download_dir: PathBuf,
    pub libraries: Vec<LibraryCoordinates>,
    pub dependencies: Vec<LibraryCoordinates>,
    pub jars: Vec<JarBinding>,
    pub output: Option<PathBuf>,
    pub strict: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            libraries: vec![],
            dependencies: vec![],
            jars: vec![],
            output: None,
            strict: false,
        }
    }
}

impl ExtractConfig {
    pub fn with_download_dir(mut self, download_dir: impl Into<PathBuf>) -> Self {
        self.download_dir = download_dir.into();
        self
    }

    pub fn with_library(mut self, library: LibraryCoordinates) -> Self {
        self.libraries.push(library);
        self
    }

    pub fn with_dependency(mut self, dependency: LibraryCoordinates) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_jar(mut self, binding: JarBinding) -> Self {
        self.jars.push(binding);
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            strict: self.strict,
        }
    }
}
