//! Archive entry enumeration.
//!
//! Selects the class-file entries of a jar and derives each type's qualified
//! name from its path. Entry order is whatever the archive yields; nothing
//! downstream depends on it.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{trace, warn};
use zip::result::ZipError;
use zip::ZipArchive;

const CLASS_SUFFIX: &str = ".class";
const MODULE_DESCRIPTOR: &str = "module-info.class";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error while reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ZIP error while reading {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

/// Package and simple name derived from an entry path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntryName {
    pub package_name: String,
    pub simple_name: String,
}

impl ClassEntryName {
    pub fn fully_qualified_name(&self) -> String {
        if self.package_name.is_empty() {
            self.simple_name.clone()
        } else {
            format!("{}.{}", self.package_name, self.simple_name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    TypeRecord(ClassEntryName),
    /// Directories, resources, module descriptors and `META-INF/` content.
    Ignored,
    Malformed(&'static str),
}

pub fn classify_entry(entry_name: &str) -> EntryKind {
    if entry_name.ends_with('/') || entry_name.starts_with("META-INF/") {
        return EntryKind::Ignored;
    }
    let Some(stem) = entry_name.strip_suffix(CLASS_SUFFIX) else {
        return EntryKind::Ignored;
    };
    if entry_name == MODULE_DESCRIPTOR || entry_name.ends_with("/module-info.class") {
        return EntryKind::Ignored;
    }

    let (directory, simple_name) = stem.rsplit_once('/').unwrap_or(("", stem));
    if simple_name.is_empty() {
        return EntryKind::Malformed("empty class name");
    }
    let empty_segment = stem.starts_with('/')
        || (!directory.is_empty() && directory.split('/').any(str::is_empty));
    if empty_segment {
        return EntryKind::Malformed("empty package segment");
    }

    EntryKind::TypeRecord(ClassEntryName {
        package_name: directory.replace('/', "."),
        simple_name: simple_name.to_string(),
    })
}

/// A class-file entry selected from an archive.
#[derive(Debug, Clone)]
pub struct ClassEntry<B> {
    pub entry_name: String,
    pub name: ClassEntryName,
    pub bytes: B,
}

/// Lazily filters `(entry_name, bytes)` pairs down to type records.
/// Malformed names are logged and skipped.
pub fn class_entries<I, N, B>(entries: I) -> impl Iterator<Item = ClassEntry<B>>
where
    I: IntoIterator<Item = (N, B)>,
    N: AsRef<str>,
{
    entries.into_iter().filter_map(|(entry_name, bytes)| {
        let entry_name = entry_name.as_ref();
        match classify_entry(entry_name) {
            EntryKind::TypeRecord(name) => Some(ClassEntry {
                entry_name: entry_name.to_string(),
                name,
                bytes,
            }),
            EntryKind::Ignored => {
                trace!(entry = entry_name, "ignoring non-type entry");
                None
            }
            EntryKind::Malformed(reason) => {
                warn!(entry = entry_name, reason, "skipping malformed class entry name");
                None
            }
        }
    })
}

/// Reads the candidate type-record entries of a jar on disk into memory.
pub fn read_archive(path: &Path) -> Result<Vec<(String, Vec<u8>)>, ArchiveError> {
    let file = File::open(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_archive_from(BufReader::new(file), path)
}

/// Reads the candidate type-record entries of a zip stream; resources and
/// other ignored entries are never decompressed. `origin` only labels errors.
pub fn read_archive_from<R: Read + Seek>(
    reader: R,
    origin: &Path,
) -> Result<Vec<(String, Vec<u8>)>, ArchiveError> {
    let zip_error = |source| ArchiveError::Zip {
        path: origin.to_path_buf(),
        source,
    };
    let mut archive = ZipArchive::new(reader).map_err(zip_error)?;

    let mut entries = Vec::with_capacity(archive.len());
    for idx in 0..archive.len() {
        let mut entry = archive.by_index(idx).map_err(zip_error)?;
        if !entry.is_file() {
            continue;
        }
        let name = entry.name().to_string();
        if classify_entry(&name) == EntryKind::Ignored {
            trace!(entry = %name, "not reading non-type entry");
            continue;
        }
        // declared sizes come from the archive and are not trusted for allocation
        let mut buffer = Vec::new();
        entry
            .read_to_end(&mut buffer)
            .map_err(|source| ArchiveError::Io {
                path: archive_entry_path(origin, &name),
                source,
            })?;
        entries.push((name, buffer));
    }
    Ok(entries)
}

/// `lib.jar!/com/acme/Widget.class`
pub fn archive_entry_path(archive: &Path, entry: &str) -> PathBuf {
    let mut display = archive.display().to_string();
    display.push('!');
    display.push('/');
    display.push_str(entry);
    PathBuf::from(display)
}
