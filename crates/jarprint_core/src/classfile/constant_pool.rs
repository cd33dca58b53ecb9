use super::reader::ClassReader;
use super::ClassParseError;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Constant {
    Utf8(String),
    Literal,
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    MemberRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        kind: u8,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    Dynamic {
        name_and_type_index: u16,
    },
    Module {
        name_index: u16,
    },
    Package {
        name_index: u16,
    },
    /// Slot 0 and the slot following a long or double.
    Unusable,
}

impl Constant {
    fn kind(&self) -> &'static str {
        match self {
            Constant::Utf8(_) => "Utf8",
            Constant::Literal => "literal",
            Constant::Class { .. } => "Class",
            Constant::String { .. } => "String",
            Constant::MemberRef { .. } => "member reference",
            Constant::NameAndType { .. } => "NameAndType",
            Constant::MethodHandle { .. } => "MethodHandle",
            Constant::MethodType { .. } => "MethodType",
            Constant::Dynamic { .. } => "Dynamic",
            Constant::Module { .. } => "Module",
            Constant::Package { .. } => "Package",
            Constant::Unusable => "unusable",
        }
    }
}

/// Index-addressed constant table of a single record. Entries are numbered
/// from 1; references are checked once the whole table has been read.
#[derive(Debug)]
pub(super) struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub(super) fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        if count == 0 {
            return Err(ClassParseError::EmptyConstantPool);
        }
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable);

        while entries.len() < count {
            let index = entries.len() as u16;
            let tag = reader.read_u1()?;
            let entry = match tag {
                TAG_UTF8 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    Constant::Utf8(decode_modified_utf8(bytes, index)?)
                }
                TAG_INTEGER | TAG_FLOAT => {
                    reader.skip(4)?;
                    Constant::Literal
                }
                TAG_LONG | TAG_DOUBLE => {
                    reader.skip(8)?;
                    if entries.len() + 1 >= count {
                        return Err(ClassParseError::InvalidConstantIndex { index });
                    }
                    entries.push(Constant::Literal);
                    entries.push(Constant::Unusable);
                    continue;
                }
                TAG_CLASS => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                TAG_STRING => Constant::String {
                    string_index: reader.read_u2()?,
                },
                TAG_FIELDREF | TAG_METHODREF | TAG_INTERFACE_METHODREF => Constant::MemberRef {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                TAG_NAME_AND_TYPE => Constant::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                TAG_METHOD_HANDLE => Constant::MethodHandle {
                    kind: reader.read_u1()?,
                    reference_index: reader.read_u2()?,
                },
                TAG_METHOD_TYPE => Constant::MethodType {
                    descriptor_index: reader.read_u2()?,
                },
                TAG_DYNAMIC | TAG_INVOKE_DYNAMIC => {
                    // bootstrap_method_attr_index points into an attribute, not the pool
                    reader.read_u2()?;
                    Constant::Dynamic {
                        name_and_type_index: reader.read_u2()?,
                    }
                }
                TAG_MODULE => Constant::Module {
                    name_index: reader.read_u2()?,
                },
                TAG_PACKAGE => Constant::Package {
                    name_index: reader.read_u2()?,
                },
                other => return Err(ClassParseError::UnsupportedConstant { tag: other, index }),
            };
            entries.push(entry);
        }

        let pool = Self { entries };
        pool.validate()?;
        Ok(pool)
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(ClassParseError::InvalidConstantIndex { index }),
            Some(entry) => Ok(entry),
        }
    }

    fn mismatch(&self, index: u16, expected: &'static str) -> ClassParseError {
        let found = self
            .entries
            .get(index as usize)
            .map(Constant::kind)
            .unwrap_or("nothing");
        ClassParseError::ConstantKindMismatch {
            index,
            expected,
            found,
        }
    }

    pub(super) fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(self.mismatch(index, "Utf8")),
        }
    }

    /// Internal (slash-separated) name of a Class entry.
    pub(super) fn class_name(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(self.mismatch(index, "Class")),
        }
    }

    fn expect_kind(
        &self,
        index: u16,
        expected: &'static str,
        matches: fn(&Constant) -> bool,
    ) -> Result<(), ClassParseError> {
        if matches(self.get(index)?) {
            Ok(())
        } else {
            Err(self.mismatch(index, expected))
        }
    }

    fn validate(&self) -> Result<(), ClassParseError> {
        let is_utf8 = |c: &Constant| matches!(c, Constant::Utf8(_));
        let is_class = |c: &Constant| matches!(c, Constant::Class { .. });
        let is_member = |c: &Constant| matches!(c, Constant::MemberRef { .. });
        let is_name_and_type = |c: &Constant| matches!(c, Constant::NameAndType { .. });

        for entry in &self.entries {
            match *entry {
                Constant::Class { name_index }
                | Constant::Module { name_index }
                | Constant::Package { name_index } => {
                    self.expect_kind(name_index, "Utf8", is_utf8)?;
                }
                Constant::String { string_index } => {
                    self.expect_kind(string_index, "Utf8", is_utf8)?;
                }
                Constant::MethodType { descriptor_index } => {
                    self.expect_kind(descriptor_index, "Utf8", is_utf8)?;
                }
                Constant::MemberRef {
                    class_index,
                    name_and_type_index,
                } => {
                    self.expect_kind(class_index, "Class", is_class)?;
                    self.expect_kind(name_and_type_index, "NameAndType", is_name_and_type)?;
                }
                Constant::NameAndType {
                    name_index,
                    descriptor_index,
                } => {
                    self.expect_kind(name_index, "Utf8", is_utf8)?;
                    self.expect_kind(descriptor_index, "Utf8", is_utf8)?;
                }
                Constant::MethodHandle {
                    kind,
                    reference_index,
                } => {
                    if !(1..=9).contains(&kind) {
                        return Err(ClassParseError::InvalidMethodHandleKind { kind });
                    }
                    self.expect_kind(reference_index, "member reference", is_member)?;
                }
                Constant::Dynamic {
                    name_and_type_index,
                } => {
                    self.expect_kind(name_and_type_index, "NameAndType", is_name_and_type)?;
                }
                Constant::Utf8(_) | Constant::Literal | Constant::Unusable => {}
            }
        }
        Ok(())
    }
}

/// Decodes the class-file string encoding: UTF-8 with NUL as `C0 80` and
/// supplementary characters stored as two encoded surrogates.
fn decode_modified_utf8(bytes: &[u8], index: u16) -> Result<String, ClassParseError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let invalid = || ClassParseError::InvalidUtf8 { index };
    let continuation = |byte: Option<&u8>| match byte {
        Some(byte) if byte & 0xC0 == 0x80 => Ok(u16::from(byte & 0x3F)),
        _ => Err(invalid()),
    };

    let mut units = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let lead = bytes[pos];
        if lead & 0x80 == 0 {
            units.push(u16::from(lead));
            pos += 1;
        } else if lead & 0xE0 == 0xC0 {
            let low = continuation(bytes.get(pos + 1))?;
            units.push((u16::from(lead & 0x1F) << 6) | low);
            pos += 2;
        } else if lead & 0xF0 == 0xE0 {
            let mid = continuation(bytes.get(pos + 1))?;
            let low = continuation(bytes.get(pos + 2))?;
            units.push((u16::from(lead & 0x0F) << 12) | (mid << 6) | low);
            pos += 3;
        } else {
            return Err(invalid());
        }
    }

    String::from_utf16(&units).map_err(|_| invalid())
}
