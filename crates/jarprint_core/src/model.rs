use crate::ordering;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoordinatesError {
    #[error("invalid library coordinates '{0}', expected groupId:artifactId:version")]
    Format(String),
}

/// Identity of one input library (`groupId:artifactId:version`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl LibraryCoordinates {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// File name the archive is published under, e.g. `lucene-core-4.8.1.jar`.
    pub fn jar_name(&self) -> String {
        format!("{}-{}.jar", self.artifact_id, self.version)
    }
}

impl FromStr for LibraryCoordinates {
    type Err = CoordinatesError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.trim().split(':').collect();
        match parts.as_slice() {
            [group, artifact, version]
                if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
            {
                Ok(Self::new(*group, *artifact, *version))
            }
            _ => Err(CoordinatesError::Format(value.to_string())),
        }
    }
}

impl fmt::Display for LibraryCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Abstract,
    Final,
    Private,
    Protected,
    Public,
    Static,
    Synchronized,
    Transient,
    Volatile,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Abstract => "abstract",
            Modifier::Final => "final",
            Modifier::Private => "private",
            Modifier::Protected => "protected",
            Modifier::Public => "public",
            Modifier::Static => "static",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMetadata {
    pub package_name: String,
    pub kind: TypeKind,
    pub simple_name: String,
    pub fully_qualified_name: String,
    pub super_type: Option<String>,
    pub interfaces: Vec<String>,
    pub modifiers: Vec<Modifier>,
    pub methods: Vec<MethodMetadata>,
    pub fields: Vec<FieldMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodMetadata {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<ParameterMetadata>,
    pub modifiers: Vec<Modifier>,
    pub is_variadic: bool,
}

/// One positional parameter; `name` is the binary type name (`[I`) and
/// `type_name` the readable one (`int[]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMetadata {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub name: String,
    pub type_name: String,
    pub modifiers: Vec<Modifier>,
}

/// Extracted surface of one library. Every collection is in canonical order
/// once constructed, and the value is read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryResult {
    library: LibraryCoordinates,
    types: Vec<TypeMetadata>,
}

impl LibraryResult {
    pub fn new(library: LibraryCoordinates, mut types: Vec<TypeMetadata>) -> Self {
        ordering::canonicalize_types(&mut types);
        Self { library, types }
    }

    pub fn library(&self) -> &LibraryCoordinates {
        &self.library
    }

    pub fn types(&self) -> &[TypeMetadata] {
        &self.types
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_maven_style_coordinates() {
        let coords: LibraryCoordinates = "org.apache.lucene:lucene-core:4.8.1".parse().unwrap();
        assert_eq!(coords.group_id, "org.apache.lucene");
        assert_eq!(coords.artifact_id, "lucene-core");
        assert_eq!(coords.version, "4.8.1");
        assert_eq!(coords.jar_name(), "lucene-core-4.8.1.jar");
        assert_eq!(coords.to_string(), "org.apache.lucene:lucene-core:4.8.1");
    }

    #[test]
    fn rejects_incomplete_coordinates() {
        for raw in ["lucene-core", "a:b", "a:b:c:d", "a::c", ":b:c"] {
            assert_eq!(
                raw.parse::<LibraryCoordinates>(),
                Err(CoordinatesError::Format(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn modifier_names_are_lowercase_keywords() {
        let json = serde_json::to_string(&[Modifier::Public, Modifier::Synchronized]).unwrap();
        assert_eq!(json, r#"["public","synchronized"]"#);
        assert_eq!(TypeKind::Interface.to_string(), "interface");
    }
}
