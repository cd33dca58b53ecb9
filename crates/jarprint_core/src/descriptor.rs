//! Field and method descriptor grammar.
//!
//! Descriptors are the compact, erased type encodings stored in the constant
//! pool (`I`, `[Ljava/lang/String;`, `(JZ)V`, ...). Decoding is a pure
//! function of the input string.

use std::fmt;
use thiserror::Error;

/// JVM limit on array dimensions in a descriptor.
const MAX_ARRAY_DIMENSIONS: usize = 255;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("empty descriptor")]
    Empty,
    #[error("unexpected descriptor tag '{tag}' at offset {offset} in `{descriptor}`")]
    UnknownTag {
        descriptor: String,
        tag: char,
        offset: usize,
    },
    #[error("expected '{expected}' at offset {offset} in `{descriptor}`")]
    Expected {
        descriptor: String,
        expected: char,
        offset: usize,
    },
    #[error("descriptor `{descriptor}` ends before a type code")]
    Truncated { descriptor: String },
    #[error("unterminated class name in `{descriptor}`")]
    UnterminatedClassName { descriptor: String },
    #[error("empty class name in `{descriptor}`")]
    EmptyClassName { descriptor: String },
    #[error("void is only valid as a method return type in `{descriptor}`")]
    MisplacedVoid { descriptor: String },
    #[error("array with more than 255 dimensions in `{descriptor}`")]
    TooManyDimensions { descriptor: String },
    #[error("trailing characters after offset {offset} in `{descriptor}`")]
    Trailing { descriptor: String, offset: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    fn from_code(code: u8) -> Option<Self> {
        let primitive = match code {
            b'Z' => PrimitiveType::Boolean,
            b'B' => PrimitiveType::Byte,
            b'C' => PrimitiveType::Char,
            b'S' => PrimitiveType::Short,
            b'I' => PrimitiveType::Int,
            b'J' => PrimitiveType::Long,
            b'F' => PrimitiveType::Float,
            b'D' => PrimitiveType::Double,
            _ => return None,
        };
        Some(primitive)
    }

    pub fn code(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Char => 'C',
            PrimitiveType::Short => 'S',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

/// An erased type as it appears in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Primitive(PrimitiveType),
    Void,
    /// Dot-separated binary name, e.g. `java.util.Map$Entry`.
    Reference(String),
    /// `element` is never itself an array.
    Array {
        element: Box<JavaType>,
        dimensions: usize,
    },
}

impl JavaType {
    /// Readable name: `int`, `java.lang.String`, `byte[][]`.
    pub fn type_name(&self) -> String {
        match self {
            JavaType::Primitive(primitive) => primitive.name().to_string(),
            JavaType::Void => "void".to_string(),
            JavaType::Reference(name) => name.clone(),
            JavaType::Array {
                element,
                dimensions,
            } => {
                let mut name = element.type_name();
                for _ in 0..*dimensions {
                    name.push_str("[]");
                }
                name
            }
        }
    }

    /// Binary name in the runtime's `Class#getName` form: `int`,
    /// `java.lang.String`, `[[B`, `[Ljava.lang.String;`.
    pub fn binary_name(&self) -> String {
        match self {
            JavaType::Array {
                element,
                dimensions,
            } => {
                let mut name = "[".repeat(*dimensions);
                match element.as_ref() {
                    JavaType::Primitive(primitive) => name.push(primitive.code()),
                    JavaType::Reference(class) => {
                        name.push('L');
                        name.push_str(class);
                        name.push(';');
                    }
                    other => name.push_str(&other.binary_name()),
                }
                name
            }
            other => other.type_name(),
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<JavaType>,
    pub return_type: JavaType,
}

pub fn parse_field_descriptor(descriptor: &str) -> Result<JavaType, DescriptorError> {
    let mut parser = DescriptorParser::new(descriptor)?;
    let ty = parser.parse_type()?;
    parser.finish()?;
    Ok(ty)
}

pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor, DescriptorError> {
    let mut parser = DescriptorParser::new(descriptor)?;
    parser.expect(b'(')?;
    let mut parameters = Vec::new();
    while !parser.peek_is(b')')? {
        parameters.push(parser.parse_type()?);
    }
    parser.expect(b')')?;

    let return_type = if parser.peek_is(b'V')? {
        parser.pos += 1;
        JavaType::Void
    } else {
        parser.parse_type()?
    };
    parser.finish()?;

    Ok(MethodDescriptor {
        parameters,
        return_type,
    })
}

struct DescriptorParser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DescriptorParser<'a> {
    fn new(source: &'a str) -> Result<Self, DescriptorError> {
        if source.is_empty() {
            return Err(DescriptorError::Empty);
        }
        Ok(Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        })
    }

    fn descriptor(&self) -> String {
        self.source.to_string()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_is(&self, expected: u8) -> Result<bool, DescriptorError> {
        match self.peek() {
            Some(byte) => Ok(byte == expected),
            None => Err(DescriptorError::Expected {
                descriptor: self.descriptor(),
                expected: expected as char,
                offset: self.pos,
            }),
        }
    }

    fn expect(&mut self, expected: u8) -> Result<(), DescriptorError> {
        if self.peek() != Some(expected) {
            return Err(DescriptorError::Expected {
                descriptor: self.descriptor(),
                expected: expected as char,
                offset: self.pos,
            });
        }
        self.pos += 1;
        Ok(())
    }

    fn finish(&self) -> Result<(), DescriptorError> {
        if self.pos != self.bytes.len() {
            return Err(DescriptorError::Trailing {
                descriptor: self.descriptor(),
                offset: self.pos,
            });
        }
        Ok(())
    }

    fn parse_type(&mut self) -> Result<JavaType, DescriptorError> {
        let Some(tag) = self.peek() else {
            return Err(DescriptorError::Truncated {
                descriptor: self.descriptor(),
            });
        };

        if let Some(primitive) = PrimitiveType::from_code(tag) {
            self.pos += 1;
            return Ok(JavaType::Primitive(primitive));
        }

        match tag {
            b'L' => self.parse_reference_type(),
            b'[' => self.parse_array_type(),
            b'V' => Err(DescriptorError::MisplacedVoid {
                descriptor: self.descriptor(),
            }),
            _ => Err(DescriptorError::UnknownTag {
                descriptor: self.descriptor(),
                tag: self.source[self.pos..].chars().next().unwrap_or('?'),
                offset: self.pos,
            }),
        }
    }

    fn parse_reference_type(&mut self) -> Result<JavaType, DescriptorError> {
        self.expect(b'L')?;
        let start = self.pos;
        let Some(length) = self.bytes[start..].iter().position(|byte| *byte == b';') else {
            return Err(DescriptorError::UnterminatedClassName {
                descriptor: self.descriptor(),
            });
        };
        if length == 0 {
            return Err(DescriptorError::EmptyClassName {
                descriptor: self.descriptor(),
            });
        }
        let internal = &self.source[start..start + length];
        self.pos = start + length + 1;
        Ok(JavaType::Reference(internal.replace('/', ".")))
    }

    fn parse_array_type(&mut self) -> Result<JavaType, DescriptorError> {
        let mut dimensions = 0;
        while self.peek() == Some(b'[') {
            dimensions += 1;
            self.pos += 1;
        }
        if dimensions > MAX_ARRAY_DIMENSIONS {
            return Err(DescriptorError::TooManyDimensions {
                descriptor: self.descriptor(),
            });
        }
        let element = self.parse_type()?;
        Ok(JavaType::Array {
            element: Box::new(element),
            dimensions,
        })
    }
}
