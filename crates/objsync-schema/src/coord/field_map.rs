// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire field name <-> native field name lookup.

use crate::error::{Result, SchemaError};
use std::collections::BTreeMap;

/// Bidirectional field-name mapping for one type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMappings {
    wire_to_native: BTreeMap<String, String>,
    native_to_wire: BTreeMap<String, String>,
}

impl FieldMappings {
    pub fn to_native<'a>(&'a self, wire: &'a str) -> &'a str {
        self.wire_to_native.get(wire).map_or(wire, String::as_str)
    }

    pub fn to_wire<'a>(&'a self, native: &'a str) -> Option<&'a str> {
        self.native_to_wire.get(native).map(String::as_str)
    }

    /// Native names of `fields`, in the same order.
    pub fn native_names(&self, fields: &[String]) -> Vec<String> {
        fields.iter().map(|f| self.to_native(f).to_string()).collect()
    }
}

/// Build the mapping for wire `fields`, renaming those listed in `field_map`
/// (wire name -> native name). Unlisted fields keep their wire name.
///
/// The mapping must be injective: two wire fields landing on the same native
/// name would make one of them unreachable, so that is rejected.
pub fn get_field_mappings(
    type_name: &str,
    fields: &[String],
    field_map: &BTreeMap<String, String>,
) -> Result<FieldMappings> {
    for wire in field_map.keys() {
        if !fields.contains(wire) {
            return Err(SchemaError::unknown_field(type_name, wire));
        }
    }

    let mut mappings = FieldMappings::default();
    for wire in fields {
        let native = field_map.get(wire).unwrap_or(wire);
        if let Some(first) = mappings.native_to_wire.get(native) {
            return Err(SchemaError::AliasedNativeField {
                type_name: type_name.to_string(),
                native: native.clone(),
                first: first.clone(),
                second: wire.clone(),
            });
        }
        mappings
            .wire_to_native
            .insert(wire.clone(), native.clone());
        mappings
            .native_to_wire
            .insert(native.clone(), wire.clone());
    }
    Ok(mappings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<String> {
        vec!["x".into(), "y".into(), "z".into()]
    }

    #[test]
    fn test_identity_mapping() {
        let m = get_field_mappings("Vector3", &fields(), &BTreeMap::new()).unwrap();
        assert_eq!(m.to_native("y"), "y");
        assert_eq!(m.to_wire("z"), Some("z"));
    }

    #[test]
    fn test_renamed_fields() {
        let map = BTreeMap::from([("x".to_string(), "X".to_string())]);
        let m = get_field_mappings("Vector3", &fields(), &map).unwrap();
        assert_eq!(m.to_native("x"), "X");
        assert_eq!(m.to_wire("X"), Some("x"));
        assert_eq!(m.to_wire("x"), None);
        assert_eq!(m.native_names(&fields()), vec!["X", "y", "z"]);
    }

    #[test]
    fn test_aliasing_rejected() {
        let map = BTreeMap::from([("x".to_string(), "y".to_string())]);
        let err = get_field_mappings("Vector3", &fields(), &map).unwrap_err();
        assert!(matches!(err, SchemaError::AliasedNativeField { .. }));
    }

    #[test]
    fn test_unknown_wire_field_rejected() {
        let map = BTreeMap::from([("w".to_string(), "W".to_string())]);
        assert!(get_field_mappings("Vector3", &fields(), &map).is_err());
    }
}
