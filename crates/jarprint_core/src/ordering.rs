//! Total orderings that make the canonical text independent of archive and
//! class-file enumeration order.
//!
//! All comparisons are plain codepoint comparisons on the rendered names.
//! Sorting uses the stable `sort_by`, so the one documented tie (methods that
//! differ only in return type or variadic flag) keeps class-file order.

use crate::model::{
    FieldMetadata, LibraryCoordinates, LibraryResult, MethodMetadata, Modifier, TypeMetadata,
};
use std::cmp::Ordering;

pub fn compare_modifiers(left: &Modifier, right: &Modifier) -> Ordering {
    left.as_str().cmp(right.as_str())
}

pub fn compare_fields(left: &FieldMetadata, right: &FieldMetadata) -> Ordering {
    left.name
        .cmp(&right.name)
        .then_with(|| left.type_name.cmp(&right.type_name))
}

/// Name, then arity, then parameter type names position by position.
/// Return type and variadic flag do not participate.
pub fn compare_methods(left: &MethodMetadata, right: &MethodMetadata) -> Ordering {
    left.name
        .cmp(&right.name)
        .then_with(|| left.parameters.len().cmp(&right.parameters.len()))
        .then_with(|| {
            left.parameters
                .iter()
                .zip(&right.parameters)
                .map(|(l, r)| l.type_name.cmp(&r.type_name))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

/// Package, kind, simple name, then supertype (absent sorts first).
pub fn compare_types(left: &TypeMetadata, right: &TypeMetadata) -> Ordering {
    left.package_name
        .cmp(&right.package_name)
        .then_with(|| left.kind.as_str().cmp(right.kind.as_str()))
        .then_with(|| left.simple_name.cmp(&right.simple_name))
        .then_with(|| left.super_type.cmp(&right.super_type))
}

pub fn compare_libraries(left: &LibraryCoordinates, right: &LibraryCoordinates) -> Ordering {
    left.group_id
        .cmp(&right.group_id)
        .then_with(|| left.artifact_id.cmp(&right.artifact_id))
        .then_with(|| left.version.cmp(&right.version))
}

pub fn sort_modifiers(modifiers: &mut Vec<Modifier>) {
    modifiers.sort_by(compare_modifiers);
    modifiers.dedup();
}

/// Puts every sub-collection of one type into canonical order.
pub fn canonicalize_type(ty: &mut TypeMetadata) {
    sort_modifiers(&mut ty.modifiers);

    ty.interfaces.sort();
    ty.interfaces.dedup();

    for field in &mut ty.fields {
        sort_modifiers(&mut field.modifiers);
    }
    ty.fields.sort_by(compare_fields);

    for method in &mut ty.methods {
        sort_modifiers(&mut method.modifiers);
    }
    ty.methods.sort_by(compare_methods);
}

pub fn canonicalize_types(types: &mut [TypeMetadata]) {
    for ty in types.iter_mut() {
        canonicalize_type(ty);
    }
    types.sort_by(compare_types);
}

/// Library results in identity order, ready for serialization.
pub fn sorted_libraries(libraries: &[LibraryResult]) -> Vec<&LibraryResult> {
    let mut sorted: Vec<&LibraryResult> = libraries.iter().collect();
    sorted.sort_by(|left, right| compare_libraries(left.library(), right.library()));
    sorted
}
