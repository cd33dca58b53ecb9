//! Canonical text rendering.
//!
//! The canonical form is pretty-printed JSON: keys in declaration order,
//! two-space indentation, `\n` line breaks, no trailing newline. Every
//! collection is already ordered by the time a [`LibraryResult`] exists, and
//! libraries are ordered here by their coordinates.

use crate::model::LibraryResult;
use crate::ordering::sorted_libraries;

pub fn serialize(libraries: &[LibraryResult]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&sorted_libraries(libraries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LibraryCoordinates;

    #[test]
    fn empty_library_still_serializes() {
        let library = LibraryResult::new(LibraryCoordinates::new("g", "a", "1"), Vec::new());
        let text = serialize(&[library]).unwrap();
        assert_eq!(
            text,
            "[\n  {\n    \"library\": {\n      \"groupId\": \"g\",\n      \"artifactId\": \"a\",\n      \"version\": \"1\"\n    },\n    \"types\": []\n  }\n]"
        );
    }

    #[test]
    fn no_libraries_is_an_empty_array() {
        assert_eq!(serialize(&[]).unwrap(), "[]");
    }

    #[test]
    fn library_order_does_not_depend_on_input_order() {
        let a = LibraryResult::new(LibraryCoordinates::new("org.a", "x", "1"), Vec::new());
        let b = LibraryResult::new(LibraryCoordinates::new("org.b", "x", "1"), Vec::new());
        assert_eq!(
            serialize(&[a.clone(), b.clone()]).unwrap(),
            serialize(&[b, a]).unwrap()
        );
    }
}
