//! Per-library extraction pipeline: enumerate, decode, canonicalize.

use crate::archive::{self, class_entries, ArchiveError};
use crate::classfile::{decode_type_record, ClassParseError};
use crate::model::{LibraryCoordinates, LibraryResult};
use std::collections::HashMap;
use std::path::Path;
use std::thread;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed type record {entry}: {source}")]
    MalformedRecord {
        entry: String,
        #[source]
        source: ClassParseError,
    },
    #[error("malformed descriptor in {entry}: {source}")]
    MalformedDescriptor {
        entry: String,
        #[source]
        source: ClassParseError,
    },
    #[error("library {library} contains no type records")]
    EmptyInput { library: LibraryCoordinates },
    #[error("type {type_name} is declared by both {first} and {second}")]
    DuplicateType {
        type_name: String,
        first: String,
        second: String,
    },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl ExtractError {
    /// Entry label (`library!/path/Type.class`) of the record that failed, if any.
    pub fn entry(&self) -> Option<&str> {
        match self {
            ExtractError::MalformedRecord { entry, .. }
            | ExtractError::MalformedDescriptor { entry, .. } => Some(entry),
            ExtractError::DuplicateType { second, .. } => Some(second),
            ExtractError::EmptyInput { .. } | ExtractError::Archive(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Treat a library without any type record as an error instead of a warning.
    pub strict: bool,
}

impl ExtractOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Decodes every type record among `entries` into a canonical [`LibraryResult`].
pub fn extract_library<I, N, B>(
    library: LibraryCoordinates,
    entries: I,
) -> Result<LibraryResult, ExtractError>
where
    I: IntoIterator<Item = (N, B)>,
    N: AsRef<str>,
    B: AsRef<[u8]>,
{
    extract_library_with(&ExtractOptions::default(), library, entries)
}

pub fn extract_library_with<I, N, B>(
    options: &ExtractOptions,
    library: LibraryCoordinates,
    entries: I,
) -> Result<LibraryResult, ExtractError>
where
    I: IntoIterator<Item = (N, B)>,
    N: AsRef<str>,
    B: AsRef<[u8]>,
{
    let mut types = Vec::new();
    let mut declared_by: HashMap<String, String> = HashMap::new();

    for entry in class_entries(entries) {
        let label = format!("{}!/{}", library, entry.entry_name);
        let ty = decode_type_record(entry.bytes.as_ref()).map_err(|source| {
            if source.is_descriptor_error() {
                ExtractError::MalformedDescriptor {
                    entry: label.clone(),
                    source,
                }
            } else {
                ExtractError::MalformedRecord {
                    entry: label.clone(),
                    source,
                }
            }
        })?;

        let expected = entry.name.fully_qualified_name();
        if ty.fully_qualified_name != expected {
            warn!(
                entry = %label,
                record = %ty.fully_qualified_name,
                "entry path does not match the record's own class name"
            );
        }

        if let Some(first) = declared_by.insert(ty.fully_qualified_name.clone(), label.clone()) {
            return Err(ExtractError::DuplicateType {
                type_name: ty.fully_qualified_name,
                first,
                second: label,
            });
        }
        types.push(ty);
    }

    if types.is_empty() {
        if options.strict {
            return Err(ExtractError::EmptyInput { library });
        }
        warn!(library = %library, "library contains no type records");
    }

    debug!(library = %library, types = types.len(), "decoded library");
    Ok(LibraryResult::new(library, types))
}

/// Reads a jar from disk and extracts it.
pub fn extract_archive(
    options: &ExtractOptions,
    library: LibraryCoordinates,
    path: &Path,
) -> Result<LibraryResult, ExtractError> {
    info!(library = %library, path = %path.display(), "reading archive");
    let entries = archive::read_archive(path)?;
    extract_library_with(options, library, entries)
}

/// Extracts independent libraries on separate threads. Results come back in
/// input order; the first failing library (in input order) wins.
pub fn extract_libraries(
    options: &ExtractOptions,
    inputs: Vec<(LibraryCoordinates, Vec<(String, Vec<u8>)>)>,
) -> Result<Vec<LibraryResult>, ExtractError> {
    thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .into_iter()
            .map(|(library, entries)| {
                scope.spawn(move || extract_library_with(options, library, entries))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
