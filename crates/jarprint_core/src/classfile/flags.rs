use crate::model::Modifier;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_PRIVATE: u16 = 0x0002;
const ACC_PROTECTED: u16 = 0x0004;
const ACC_STATIC: u16 = 0x0008;
const ACC_FINAL: u16 = 0x0010;
const ACC_SYNCHRONIZED: u16 = 0x0020;
const ACC_VOLATILE: u16 = 0x0040;
const ACC_BRIDGE: u16 = 0x0040;
const ACC_TRANSIENT: u16 = 0x0080;
const ACC_VARARGS: u16 = 0x0080;
const ACC_INTERFACE: u16 = 0x0200;
const ACC_ABSTRACT: u16 = 0x0400;
const ACC_MODULE: u16 = 0x8000;

const TYPE_MODIFIERS: &[(u16, Modifier)] = &[
    (ACC_PUBLIC, Modifier::Public),
    (ACC_ABSTRACT, Modifier::Abstract),
    (ACC_FINAL, Modifier::Final),
];

const FIELD_MODIFIERS: &[(u16, Modifier)] = &[
    (ACC_PUBLIC, Modifier::Public),
    (ACC_PRIVATE, Modifier::Private),
    (ACC_PROTECTED, Modifier::Protected),
    (ACC_STATIC, Modifier::Static),
    (ACC_FINAL, Modifier::Final),
    (ACC_TRANSIENT, Modifier::Transient),
    (ACC_VOLATILE, Modifier::Volatile),
];

const METHOD_MODIFIERS: &[(u16, Modifier)] = &[
    (ACC_PUBLIC, Modifier::Public),
    (ACC_PRIVATE, Modifier::Private),
    (ACC_PROTECTED, Modifier::Protected),
    (ACC_STATIC, Modifier::Static),
    (ACC_FINAL, Modifier::Final),
    (ACC_ABSTRACT, Modifier::Abstract),
    (ACC_SYNCHRONIZED, Modifier::Synchronized),
];

/// Raw `access_flags` word. Several bits mean different things on types,
/// fields and methods, so modifiers are always decoded for a member kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    fn contains(self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    fn collect(self, table: &[(u16, Modifier)]) -> Vec<Modifier> {
        table
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, modifier)| *modifier)
            .collect()
    }

    pub fn type_modifiers(self) -> Vec<Modifier> {
        self.collect(TYPE_MODIFIERS)
    }

    pub fn field_modifiers(self) -> Vec<Modifier> {
        self.collect(FIELD_MODIFIERS)
    }

    pub fn method_modifiers(self) -> Vec<Modifier> {
        self.collect(METHOD_MODIFIERS)
    }

    pub fn is_interface(self) -> bool {
        self.contains(ACC_INTERFACE)
    }

    pub fn is_module(self) -> bool {
        self.contains(ACC_MODULE)
    }

    /// Erasure or covariant-return bridge. Other synthetic methods
    /// (`access$NNN`, `lambda$...`) still count as declared.
    pub fn is_bridge(self) -> bool {
        self.contains(ACC_BRIDGE)
    }

    pub fn is_varargs(self) -> bool {
        self.contains(ACC_VARARGS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_flags_ignore_super_and_interface_bits() {
        // public | final | super
        assert_eq!(
            AccessFlags(0x0031).type_modifiers(),
            vec![Modifier::Public, Modifier::Final]
        );
        // public | interface | abstract
        let interface = AccessFlags(0x0601);
        assert!(interface.is_interface());
        assert_eq!(
            interface.type_modifiers(),
            vec![Modifier::Public, Modifier::Abstract]
        );
    }

    #[test]
    fn overlapping_bits_are_read_per_member_kind() {
        // 0x00C0 is volatile|transient on a field, bridge|varargs on a method
        let flags = AccessFlags(0x00C1);
        assert_eq!(
            flags.field_modifiers(),
            vec![Modifier::Public, Modifier::Transient, Modifier::Volatile]
        );
        assert_eq!(flags.method_modifiers(), vec![Modifier::Public]);
        assert!(flags.is_bridge());
        assert!(flags.is_varargs());
    }

    #[test]
    fn synthetic_without_bridge_is_not_a_bridge() {
        // private | static | synthetic, as emitted for lambda bodies
        let lambda = AccessFlags(0x100A);
        assert!(!lambda.is_bridge());
        assert_eq!(
            lambda.method_modifiers(),
            vec![Modifier::Private, Modifier::Static]
        );
    }

    #[test]
    fn unknown_bits_are_ignored() {
        // native | strict | enum | annotation
        assert!(AccessFlags(0x6900).method_modifiers().is_empty());
        assert!(AccessFlags(0x6900).type_modifiers().is_empty());
    }
}
