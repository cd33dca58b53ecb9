//! Type record decoder.
//!
//! Reads the structural surface of one compiled class file straight from its
//! constant pool and member tables. No other type is loaded or resolved; every
//! name printed comes from this record's own constant pool.

mod constant_pool;
mod flags;
mod reader;

use crate::descriptor::{parse_field_descriptor, parse_method_descriptor, DescriptorError};
use crate::model::{FieldMetadata, MethodMetadata, ParameterMetadata, TypeKind, TypeMetadata};
use constant_pool::ConstantPool;
use flags::AccessFlags;
use reader::ClassReader;
use thiserror::Error;
use tracing::trace;

const MAGIC: u32 = 0xCAFE_BABE;
/// JDK 1.0.2; anything older is not a class file this decoder understands.
const MIN_MAJOR_VERSION: u16 = 45;
const ROOT_TYPE: &str = "java/lang/Object";

#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file at offset {offset} (needed {needed} more bytes)")]
    UnexpectedEof { offset: usize, needed: usize },
    #[error("invalid class file magic header {found:#010x}")]
    InvalidMagic { found: u32 },
    #[error("unsupported class file major version {major}")]
    UnsupportedVersion { major: u16 },
    #[error("constant pool count is zero")]
    EmptyConstantPool,
    #[error("unsupported constant pool tag {tag} at index {index}")]
    UnsupportedConstant { tag: u8, index: u16 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("constant pool index {index} is {found}, expected {expected}")]
    ConstantKindMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid method handle kind {kind}")]
    InvalidMethodHandleKind { kind: u8 },
    #[error("invalid modified UTF-8 string at constant pool index {index}")]
    InvalidUtf8 { index: u16 },
    #[error("record has an empty class name")]
    EmptyClassName,
    #[error("class {class} has no superclass but is not java.lang.Object")]
    MissingSuperclass { class: String },
    #[error("record is a module descriptor, not a type")]
    ModuleDescriptor,
    #[error("{count} trailing bytes after offset {offset}")]
    TrailingBytes { offset: usize, count: usize },
    #[error("malformed descriptor for member `{member}`: {source}")]
    Descriptor {
        member: String,
        #[source]
        source: DescriptorError,
    },
}

impl ClassParseError {
    /// True when the record itself was sound but a descriptor string in it
    /// did not parse.
    pub fn is_descriptor_error(&self) -> bool {
        matches!(self, ClassParseError::Descriptor { .. })
    }
}

/// Decodes one class file into unsorted [`TypeMetadata`]. Ordering is
/// applied separately by [`crate::ordering`].
pub fn decode_type_record(bytes: &[u8]) -> Result<TypeMetadata, ClassParseError> {
    let mut reader = ClassReader::new(bytes);

    let magic = reader.read_u4()?;
    if magic != MAGIC {
        return Err(ClassParseError::InvalidMagic { found: magic });
    }
    let _minor_version = reader.read_u2()?;
    let major_version = reader.read_u2()?;
    if major_version < MIN_MAJOR_VERSION {
        return Err(ClassParseError::UnsupportedVersion {
            major: major_version,
        });
    }

    let pool = ConstantPool::parse(&mut reader)?;
    trace!(constants = pool.len(), "constant pool decoded");

    let access_flags = AccessFlags(reader.read_u2()?);
    if access_flags.is_module() {
        return Err(ClassParseError::ModuleDescriptor);
    }

    let this_class = pool.class_name(reader.read_u2()?)?;
    if this_class.is_empty() {
        return Err(ClassParseError::EmptyClassName);
    }

    let super_index = reader.read_u2()?;
    let super_type = if super_index == 0 {
        if this_class != ROOT_TYPE {
            return Err(ClassParseError::MissingSuperclass {
                class: binary_name(this_class),
            });
        }
        None
    } else {
        Some(binary_name(pool.class_name(super_index)?))
    };

    let interfaces_count = reader.read_u2()?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        interfaces.push(binary_name(pool.class_name(reader.read_u2()?)?));
    }

    let fields_count = reader.read_u2()?;
    let mut fields = Vec::with_capacity(fields_count as usize);
    for _ in 0..fields_count {
        let member = read_member(&mut reader, &pool)?;
        let ty = parse_field_descriptor(member.descriptor).map_err(|source| {
            ClassParseError::Descriptor {
                member: member.name.to_string(),
                source,
            }
        })?;
        fields.push(FieldMetadata {
            name: member.name.to_string(),
            type_name: ty.type_name(),
            modifiers: member.access_flags.field_modifiers(),
        });
    }

    let methods_count = reader.read_u2()?;
    let mut methods = Vec::with_capacity(methods_count as usize);
    for _ in 0..methods_count {
        let member = read_member(&mut reader, &pool)?;
        let signature = parse_method_descriptor(member.descriptor).map_err(|source| {
            ClassParseError::Descriptor {
                member: member.name.to_string(),
                source,
            }
        })?;

        if member.name == "<init>" || member.name == "<clinit>" {
            continue;
        }
        if member.access_flags.is_bridge() {
            trace!(method = member.name, "skipping bridge method");
            continue;
        }

        methods.push(MethodMetadata {
            name: member.name.to_string(),
            return_type: signature.return_type.binary_name(),
            parameters: signature
                .parameters
                .iter()
                .map(|parameter| ParameterMetadata {
                    name: parameter.binary_name(),
                    type_name: parameter.type_name(),
                })
                .collect(),
            modifiers: member.access_flags.method_modifiers(),
            is_variadic: member.access_flags.is_varargs(),
        });
    }

    let attributes_count = reader.read_u2()?;
    skip_attributes(&mut reader, &pool, attributes_count)?;

    if reader.remaining() != 0 {
        return Err(ClassParseError::TrailingBytes {
            offset: reader.position(),
            count: reader.remaining(),
        });
    }

    let (package_name, simple_name) = split_internal_name(this_class);
    let kind = if access_flags.is_interface() {
        TypeKind::Interface
    } else {
        TypeKind::Class
    };

    Ok(TypeMetadata {
        package_name,
        kind,
        simple_name,
        fully_qualified_name: binary_name(this_class),
        super_type,
        interfaces,
        modifiers: access_flags.type_modifiers(),
        methods,
        fields,
    })
}

struct RawMember<'p> {
    access_flags: AccessFlags,
    name: &'p str,
    descriptor: &'p str,
}

fn read_member<'p>(
    reader: &mut ClassReader<'_>,
    pool: &'p ConstantPool,
) -> Result<RawMember<'p>, ClassParseError> {
    let access_flags = AccessFlags(reader.read_u2()?);
    let name = pool.utf8(reader.read_u2()?)?;
    let descriptor = pool.utf8(reader.read_u2()?)?;
    let attributes_count = reader.read_u2()?;
    skip_attributes(reader, pool, attributes_count)?;
    Ok(RawMember {
        access_flags,
        name,
        descriptor,
    })
}

fn skip_attributes(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
    count: u16,
) -> Result<(), ClassParseError> {
    for _ in 0..count {
        pool.utf8(reader.read_u2()?)?;
        let length = reader.read_u4()? as usize;
        reader.skip(length)?;
    }
    Ok(())
}

fn binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// `com/acme/Widget` -> (`com.acme`, `Widget`); the default package is empty.
fn split_internal_name(internal: &str) -> (String, String) {
    match internal.rsplit_once('/') {
        Some((package, simple)) => (binary_name(package), simple.to_string()),
        None => (String::new(), internal.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Modifier;
    use crate::testing::{access, ClassFileBuilder};

    #[test]
    fn decodes_type_header_and_members() {
        let bytes = ClassFileBuilder::new("com/acme/Widget")
            .access(access::PUBLIC | access::FINAL | access::SUPER)
            .interface("java/io/Serializable")
            .field(access::PRIVATE, "count", "I")
            .method(access::PUBLIC, "get", "()I")
            .method(access::PUBLIC, "<init>", "()V")
            .source_file("Widget.java")
            .build();

        let ty = decode_type_record(&bytes).unwrap();
        assert_eq!(ty.package_name, "com.acme");
        assert_eq!(ty.simple_name, "Widget");
        assert_eq!(ty.fully_qualified_name, "com.acme.Widget");
        assert_eq!(ty.kind, TypeKind::Class);
        assert_eq!(ty.super_type.as_deref(), Some("java.lang.Object"));
        assert_eq!(ty.interfaces, vec!["java.io.Serializable"]);
        assert_eq!(ty.modifiers, vec![Modifier::Public, Modifier::Final]);

        assert_eq!(ty.fields.len(), 1);
        assert_eq!(ty.fields[0].name, "count");
        assert_eq!(ty.fields[0].type_name, "int");
        assert_eq!(ty.fields[0].modifiers, vec![Modifier::Private]);

        assert_eq!(ty.methods.len(), 1);
        assert_eq!(ty.methods[0].name, "get");
        assert_eq!(ty.methods[0].return_type, "int");
        assert!(ty.methods[0].parameters.is_empty());
        assert!(!ty.methods[0].is_variadic);
    }

    #[test]
    fn interface_flag_becomes_kind() {
        let bytes = ClassFileBuilder::new("com/acme/Shape")
            .access(access::PUBLIC | access::INTERFACE | access::ABSTRACT)
            .method(access::PUBLIC | access::ABSTRACT, "area", "()D")
            .build();

        let ty = decode_type_record(&bytes).unwrap();
        assert_eq!(ty.kind, TypeKind::Interface);
        assert_eq!(ty.modifiers, vec![Modifier::Public, Modifier::Abstract]);
        assert_eq!(
            ty.methods[0].modifiers,
            vec![Modifier::Public, Modifier::Abstract]
        );
    }

    #[test]
    fn excludes_bridge_methods_only() {
        let bytes = ClassFileBuilder::new("com/acme/Box")
            .method(access::PUBLIC, "get", "()Ljava/lang/String;")
            .method(
                access::PUBLIC | access::BRIDGE | access::SYNTHETIC,
                "get",
                "()Ljava/lang/Object;",
            )
            .method(access::PRIVATE | access::STATIC | access::SYNTHETIC, "lambda$run$0", "()V")
            .method(
                access::STATIC | access::SYNTHETIC,
                "access$000",
                "(Lcom/acme/Box;)I",
            )
            .build();

        let ty = decode_type_record(&bytes).unwrap();
        let names: Vec<(&str, &str)> = ty
            .methods
            .iter()
            .map(|m| (m.name.as_str(), m.return_type.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("get", "java.lang.String"),
                ("lambda$run$0", "void"),
                ("access$000", "int"),
            ]
        );
        assert_eq!(
            ty.methods[1].modifiers,
            vec![Modifier::Private, Modifier::Static]
        );
    }

    #[test]
    fn variadic_parameters_keep_array_names() {
        let bytes = ClassFileBuilder::new("com/acme/Fmt")
            .method(
                access::PUBLIC | access::STATIC | access::VARARGS,
                "format",
                "(Ljava/lang/String;[Ljava/lang/Object;)[B",
            )
            .build();

        let method = &decode_type_record(&bytes).unwrap().methods[0];
        assert!(method.is_variadic);
        assert_eq!(method.return_type, "[B");
        assert_eq!(method.modifiers, vec![Modifier::Public, Modifier::Static]);
        let params: Vec<(&str, &str)> = method
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.type_name.as_str()))
            .collect();
        assert_eq!(
            params,
            vec![
                ("java.lang.String", "java.lang.String"),
                ("[Ljava.lang.Object;", "java.lang.Object[]"),
            ]
        );
    }

    #[test]
    fn root_type_has_no_superclass() {
        let bytes = ClassFileBuilder::new("java/lang/Object")
            .super_class(None)
            .build();
        assert_eq!(decode_type_record(&bytes).unwrap().super_type, None);

        let orphan = ClassFileBuilder::new("com/acme/Orphan")
            .super_class(None)
            .build();
        assert!(matches!(
            decode_type_record(&orphan).unwrap_err(),
            ClassParseError::MissingSuperclass { .. }
        ));
    }

    #[test]
    fn default_package_types_have_empty_package() {
        let bytes = ClassFileBuilder::new("Main").build();
        let ty = decode_type_record(&bytes).unwrap();
        assert_eq!(ty.package_name, "");
        assert_eq!(ty.simple_name, "Main");
        assert_eq!(ty.fully_qualified_name, "Main");
    }

    #[test]
    fn rejects_bad_magic_and_truncation() {
        let mut bytes = ClassFileBuilder::new("com/acme/Widget").build();
        assert!(matches!(
            decode_type_record(&bytes[..bytes.len() - 1]).unwrap_err(),
            ClassParseError::UnexpectedEof { .. }
        ));

        bytes[0] = 0xCB;
        assert!(matches!(
            decode_type_record(&bytes).unwrap_err(),
            ClassParseError::InvalidMagic { found: 0xCBFE_BABE }
        ));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = ClassFileBuilder::new("com/acme/Widget").build();
        bytes.push(0);
        assert!(matches!(
            decode_type_record(&bytes).unwrap_err(),
            ClassParseError::TrailingBytes { count: 1, .. }
        ));
    }

    #[test]
    fn malformed_field_descriptor_is_reported_as_descriptor_error() {
        let bytes = ClassFileBuilder::new("com/acme/Widget")
            .field(access::PUBLIC, "broken", "Ljava/lang/String")
            .build();
        let error = decode_type_record(&bytes).unwrap_err();
        assert!(error.is_descriptor_error());
        assert!(error.to_string().contains("broken"));
    }

    #[test]
    fn module_descriptors_are_not_types() {
        let bytes = ClassFileBuilder::new("module-info")
            .access(access::MODULE)
            .super_class(None)
            .build();
        assert!(matches!(
            decode_type_record(&bytes).unwrap_err(),
            ClassParseError::ModuleDescriptor
        ));
    }
}
