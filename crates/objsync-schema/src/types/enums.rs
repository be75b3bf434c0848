// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enumerations carried as `u32` on the wire.

use super::{MetaType, TypeDefinition, TypeKind, WireKind};
use crate::error::{Result, SchemaError};
use crate::value::Value;
use serde_json::json;

/// Named values, numbered from 0 in declaration order. Wire form is `u32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub values: Vec<String>,
}

impl EnumDef {
    pub fn value_of(&self, name: &str) -> Option<u32> {
        self.values.iter().position(|v| v == name).map(|i| i as u32)
    }

    pub fn name_of(&self, value: u32) -> Option<&str> {
        self.values.get(value as usize).map(String::as_str)
    }

    /// Accepts a value name or its number; yields the wire number.
    pub(crate) fn normalize(&self, type_name: &str, value: &Value) -> Result<Value> {
        let n = match value {
            Value::Str(name) => self.value_of(name),
            Value::UInt(n) => u32::try_from(*n).ok().filter(|n| self.name_of(*n).is_some()),
            _ => None,
        };
        n.map(|n| Value::UInt(u64::from(n))).ok_or_else(|| {
            SchemaError::value_shape(type_name, format!("no enum value matches {value:?}"))
        })
    }

    pub(crate) fn to_local(&self, type_name: &str, value: &Value) -> Result<Value> {
        match self.normalize(type_name, value)? {
            Value::UInt(n) => Ok(self.name_of(n as u32).map_or(Value::UInt(n), Value::from)),
            other => Ok(other),
        }
    }

    pub(crate) fn hash_data(&self) -> serde_json::Value {
        json!({ "values": self.values })
    }
}

impl TypeDefinition {
    pub fn enumeration(name: impl Into<String>, values: Vec<String>) -> Result<Self> {
        let name = name.into();
        if values.is_empty() {
            return Err(SchemaError::EmptyDeclaration {
                name,
                reason: "enum has no values".into(),
            });
        }
        for (i, v) in values.iter().enumerate() {
            if values[..i].contains(v) {
                return Err(SchemaError::DuplicateField {
                    type_name: name,
                    field: v.clone(),
                });
            }
        }
        Ok(Self::new(
            name,
            MetaType::GetSet,
            TypeKind::Enum(EnumDef { values }),
            WireKind::U32,
            WireKind::U32.size(),
            Value::UInt(0),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TypeDefinition {
        TypeDefinition::enumeration("State", vec!["Idle".into(), "Running".into()]).unwrap()
    }

    #[test]
    fn test_enum_wire_is_u32() {
        let ty = state();
        assert_eq!(ty.wire(), WireKind::U32);
        assert_eq!(ty.get_type_size().static_size, 4);
        assert_eq!(ty.get_internal_default_value(), &Value::UInt(0));
    }

    #[test]
    fn test_enum_names_convert() {
        let ty = state();
        assert_eq!(
            ty.convert_value_from_local(&Value::from("Running")).unwrap(),
            Value::UInt(1)
        );
        assert_eq!(
            ty.convert_value_to_local(&Value::UInt(1)).unwrap(),
            Value::from("Running")
        );
        assert!(ty.normalize_default(&Value::from("Flying")).is_err());
        assert!(ty.normalize_default(&Value::UInt(2)).is_err());
    }

    #[test]
    fn test_enum_rejects_empty_and_duplicates() {
        assert!(TypeDefinition::enumeration("E", vec![]).is_err());
        let err = TypeDefinition::enumeration("E", vec!["A".into(), "A".into()]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }
}
