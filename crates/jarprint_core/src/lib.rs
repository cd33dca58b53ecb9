//! jarprint_core - API surface fingerprints for compiled Java libraries.
//!
//! The pipeline reads class files straight out of a jar, decodes each type's
//! declared structure (kind, modifiers, supertype, interfaces, fields and
//! methods) without loading or linking anything, puts every collection into a
//! total order, renders canonical JSON and hashes it with SHA-256. Two builds
//! with the same public structure produce byte-identical text and the same
//! fingerprint regardless of how their archives were laid out.

pub mod archive;
pub mod classfile;
pub mod descriptor;
pub mod extract;
pub mod fingerprint;
pub mod model;
pub mod ordering;
pub mod serialize;
pub mod testing;

pub use archive::{ArchiveError, ClassEntryName, EntryKind};
pub use classfile::{decode_type_record, ClassParseError};
pub use descriptor::{DescriptorError, JavaType, MethodDescriptor};
pub use extract::{
    extract_archive, extract_libraries, extract_library, extract_library_with, ExtractError,
    ExtractOptions,
};
pub use fingerprint::{fingerprint, FINGERPRINT_LEN};
pub use model::{
    CoordinatesError, FieldMetadata, LibraryCoordinates, LibraryResult, MethodMetadata, Modifier,
    ParameterMetadata, TypeKind, TypeMetadata,
};
pub use serialize::serialize;
