//! In-memory class file and jar writers for fixtures.
//!
//! Produces minimal but well-formed records: a constant pool, the type
//! header, member tables without `Code` attributes and an optional
//! `SourceFile` attribute.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

pub mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SUPER: u16 = 0x0020;
    pub const SYNCHRONIZED: u16 = 0x0020;
    pub const VOLATILE: u16 = 0x0040;
    pub const BRIDGE: u16 = 0x0040;
    pub const TRANSIENT: u16 = 0x0080;
    pub const VARARGS: u16 = 0x0080;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const MODULE: u16 = 0x8000;
}

const JAVA_8_MAJOR: u16 = 52;

struct Member {
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
}

pub struct ClassFileBuilder {
    pool: Vec<u8>,
    pool_count: u16,
    utf8_entries: HashMap<String, u16>,
    class_entries: HashMap<String, u16>,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    source_file: Option<(u16, u16)>,
}

impl ClassFileBuilder {
    /// Starts a public class extending `java/lang/Object`.
    pub fn new(internal_name: &str) -> Self {
        let mut builder = Self {
            pool: Vec::new(),
            pool_count: 1,
            utf8_entries: HashMap::new(),
            class_entries: HashMap::new(),
            access_flags: access::PUBLIC | access::SUPER,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            source_file: None,
        };
        builder.this_class = builder.class(internal_name);
        builder.super_class = builder.class("java/lang/Object");
        builder
    }

    pub fn access(mut self, access_flags: u16) -> Self {
        self.access_flags = access_flags;
        self
    }

    pub fn super_class(mut self, internal_name: Option<&str>) -> Self {
        let index = match internal_name {
            Some(name) => self.class(name),
            None => 0,
        };
        self.super_class = index;
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        let index = self.class(internal_name);
        self.interfaces.push(index);
        self
    }

    pub fn field(mut self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        let member = self.member(access_flags, name, descriptor);
        self.fields.push(member);
        self
    }

    pub fn method(mut self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        let member = self.member(access_flags, name, descriptor);
        self.methods.push(member);
        self
    }

    pub fn source_file(mut self, file_name: &str) -> Self {
        let attribute = self.utf8("SourceFile");
        let value = self.utf8(file_name);
        self.source_file = Some((attribute, value));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&JAVA_8_MAJOR.to_be_bytes());
        out.extend_from_slice(&self.pool_count.to_be_bytes());
        out.extend_from_slice(&self.pool);

        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        push_u2_list(&mut out, &self.interfaces);

        for members in [&self.fields, &self.methods] {
            out.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for member in members {
                out.extend_from_slice(&member.access_flags.to_be_bytes());
                out.extend_from_slice(&member.name_index.to_be_bytes());
                out.extend_from_slice(&member.descriptor_index.to_be_bytes());
                out.extend_from_slice(&0u16.to_be_bytes());
            }
        }

        match self.source_file {
            Some((attribute, value)) => {
                out.extend_from_slice(&1u16.to_be_bytes());
                out.extend_from_slice(&attribute.to_be_bytes());
                out.extend_from_slice(&2u32.to_be_bytes());
                out.extend_from_slice(&value.to_be_bytes());
            }
            None => out.extend_from_slice(&0u16.to_be_bytes()),
        }
        out
    }

    fn member(&mut self, access_flags: u16, name: &str, descriptor: &str) -> Member {
        Member {
            access_flags,
            name_index: self.utf8(name),
            descriptor_index: self.utf8(descriptor),
        }
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8_entries.get(value) {
            return *index;
        }
        self.pool.push(1);
        self.pool
            .extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(value.as_bytes());
        let index = self.next_index();
        self.utf8_entries.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(index) = self.class_entries.get(internal_name) {
            return *index;
        }
        let name_index = self.utf8(internal_name);
        self.pool.push(7);
        self.pool.extend_from_slice(&name_index.to_be_bytes());
        let index = self.next_index();
        self.class_entries.insert(internal_name.to_string(), index);
        index
    }

    fn next_index(&mut self) -> u16 {
        let index = self.pool_count;
        self.pool_count += 1;
        index
    }
}

fn push_u2_list(out: &mut Vec<u8>, values: &[u16]) {
    out.extend_from_slice(&(values.len() as u16).to_be_bytes());
    for value in values {
        out.extend_from_slice(&value.to_be_bytes());
    }
}

/// Packs `(entry_name, bytes)` pairs into an in-memory jar, in the given order.
pub fn write_jar(entries: &[(&str, Vec<u8>)]) -> zip::result::ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    for (name, bytes) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options)?;
        } else {
            writer.start_file(*name, options)?;
            writer.write_all(bytes)?;
        }
    }
    Ok(writer.finish()?.into_inner())
}
