// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ordered field layouts shared by every struct-like variant.

use super::{MetaType, NativeRepr, TypeDefinition, TypeKind, TypeSize, WireKind, MAX_STATE_FIELDS};
use crate::error::{Result, SchemaError};
use crate::value::Value;
use serde_json::json;
use std::sync::Arc;

/// One field of a struct-like type.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: Arc<TypeDefinition>,
    /// Wire-form default, already normalized against `ty`.
    pub default: Value,
    pub description: Option<String>,
    /// Type that introduced the field (differs from the owner for inherited fields).
    pub declared_in: String,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: Arc<TypeDefinition>) -> Self {
        let default = ty.get_internal_default_value().clone();
        Self {
            name: name.into(),
            ty,
            default,
            description: None,
            declared_in: String::new(),
        }
    }

    /// Polled, bitmask-tracked field.
    pub fn is_state(&self) -> bool {
        self.ty.meta_type().is_state()
    }
}

/// Ordered field list. Order fixes wire offsets and state-field bits.
#[derive(Debug, Clone)]
pub struct StructDef {
    fields: Vec<FieldDef>,
    size: TypeSize,
}

impl StructDef {
    /// Check field legality. `owner` names the type being built.
    pub fn new(owner: &str, mut fields: Vec<FieldDef>) -> Result<Self> {
        for field in fields.iter_mut() {
            if field.ty.meta_type().is_object() {
                return Err(SchemaError::IllegalFieldType {
                    type_name: owner.to_string(),
                    field: field.name.clone(),
                    field_type: field.ty.name().to_string(),
                });
            }
            if field.declared_in.is_empty() {
                field.declared_in = owner.to_string();
            }
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    type_name: owner.to_string(),
                    field: field.name.clone(),
                });
            }
        }
        // Streamed fields have no slot in the polled layout.
        let size = fields
            .iter()
            .filter(|f| f.is_state())
            .try_fold(TypeSize::ZERO, |acc, f| acc.checked_add(f.ty.get_type_size()))
            .and_then(TypeSize::bounded)
            .ok_or_else(|| SchemaError::size_overflow(owner))?;
        Ok(Self { fields, size })
    }

    /// Objects carry a 64-bit change mask.
    pub(crate) fn check_state_capacity(&self, owner: &str) -> Result<()> {
        let count = self.state_field_count();
        if count > MAX_STATE_FIELDS {
            return Err(SchemaError::TooManyStateFields {
                type_name: owner.to_string(),
                count,
                max: MAX_STATE_FIELDS,
            });
        }
        Ok(())
    }

    /// All fields in declaration order, inherited ones first.
    pub fn all_fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn state_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_state())
    }

    /// Message and signal fields.
    pub fn stream_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.is_state())
    }

    pub fn state_field_count(&self) -> usize {
        self.state_fields().count()
    }

    /// Ordinal among state fields.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.state_fields().position(|f| f.name == name)
    }

    pub fn field_bit_mask(&self, name: &str) -> u64 {
        self.field_index(name)
            .and_then(|i| 1u64.checked_shl(i as u32))
            .unwrap_or(0)
    }

    /// Every state field's bit.
    pub fn full_state_mask(&self) -> u64 {
        match self.state_field_count() {
            n if n >= 64 => u64::MAX,
            n => (1u64 << n) - 1,
        }
    }

    /// Packed byte offset of a state field in the polled layout.
    pub fn field_offset(&self, name: &str) -> Option<u32> {
        let mut offset = 0u32;
        for field in self.state_fields() {
            if field.name == name {
                return Some(offset);
            }
            offset += field.ty.get_type_size().static_size;
        }
        None
    }

    /// Sum of state field sizes.
    pub fn size(&self) -> TypeSize {
        self.size
    }

    pub fn default_value(&self) -> Value {
        Value::Struct(
            self.fields
                .iter()
                .map(|f| (f.name.clone(), f.default.clone()))
                .collect(),
        )
    }

    pub(crate) fn hash_data(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.fields
                .iter()
                .map(|f| {
                    json!({
                        "name": f.name,
                        "type": f.ty.name(),
                        "meta": f.ty.meta_type(),
                        "size": [f.ty.get_type_size().static_size, f.ty.get_type_size().dynamic_size_estimate],
                    })
                })
                .collect(),
        )
    }

    /// Positional array or named struct -> wire struct in declaration order.
    pub(crate) fn normalize_value(&self, owner: &str, value: &Value) -> Result<Value> {
        match value {
            Value::Array(items) => {
                if items.len() != self.fields.len() {
                    return Err(SchemaError::DefaultArity {
                        type_name: owner.to_string(),
                        expected: self.fields.len(),
                        actual: items.len(),
                    });
                }
                let out = self
                    .fields
                    .iter()
                    .zip(items)
                    .map(|(f, v)| Ok((f.name.clone(), f.ty.normalize_default(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Struct(out))
            }
            Value::Struct(named) => {
                if let Some((unknown, _)) = named.iter().find(|(n, _)| !self.has_field(n)) {
                    return Err(SchemaError::unknown_field(owner, unknown));
                }
                let out = self
                    .fields
                    .iter()
                    .map(|f| {
                        let v = match value.field(&f.name) {
                            Some(v) => f.ty.normalize_default(v)?,
                            None => f.default.clone(),
                        };
                        Ok((f.name.clone(), v))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Struct(out))
            }
            other => Err(SchemaError::value_shape(
                owner,
                format!("expected array or struct, got {}", other.shape()),
            )),
        }
    }

    /// Native value (named by native field names, or positional in native
    /// order) -> wire struct.
    pub(crate) fn from_local(&self, owner: &str, native: &NativeRepr, value: &Value) -> Result<Value> {
        let mut wire: Vec<(String, Value)> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect();
        let mut set = |wire_name: &str, v: &Value| -> Result<()> {
            let idx = self
                .fields
                .iter()
                .position(|f| f.name == wire_name)
                .ok_or_else(|| SchemaError::unknown_field(owner, wire_name))?;
            wire[idx].1 = self.fields[idx].ty.convert_value_from_local(v)?;
            Ok(())
        };

        match value {
            Value::Array(items) => {
                if items.len() != native.field_order.len() {
                    return Err(SchemaError::DefaultArity {
                        type_name: owner.to_string(),
                        expected: native.field_order.len(),
                        actual: items.len(),
                    });
                }
                for (wire_name, v) in native.field_order.iter().zip(items) {
                    set(wire_name, v)?;
                }
            }
            Value::Struct(named) => {
                for (native_name, v) in named {
                    let wire_name = self
                        .fields
                        .iter()
                        .find(|f| native.mappings.to_native(&f.name) == native_name)
                        .map(|f| f.name.clone())
                        .ok_or_else(|| SchemaError::unknown_field(owner, native_name))?;
                    set(&wire_name, v)?;
                }
            }
            other => {
                return Err(SchemaError::value_shape(
                    owner,
                    format!("expected array or struct, got {}", other.shape()),
                ))
            }
        }
        Ok(Value::Struct(wire))
    }

    /// Wire struct -> native struct keyed by native names in native order.
    pub(crate) fn to_local(&self, owner: &str, native: &NativeRepr, value: &Value) -> Result<Value> {
        if !matches!(value, Value::Struct(_)) {
            return Err(SchemaError::value_shape(
                owner,
                format!("expected struct, got {}", value.shape()),
            ));
        }
        native
            .field_order
            .iter()
            .map(|wire_name| {
                let field = self
                    .field(wire_name)
                    .ok_or_else(|| SchemaError::unknown_field(owner, wire_name))?;
                let v = match value.field(wire_name) {
                    Some(v) => field.ty.convert_value_to_local(v)?,
                    None => field.ty.convert_value_to_local(&field.default)?,
                };
                Ok((native.mappings.to_native(wire_name).to_string(), v))
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Struct)
    }
}

impl TypeDefinition {
    /// Nested fixed-layout aggregate.
    pub fn structure(name: impl Into<String>, fields: StructDef) -> Self {
        let size = fields.size();
        let default = fields.default_value();
        Self::new(
            name,
            MetaType::Struct,
            TypeKind::Struct(fields),
            WireKind::Composite,
            size,
            default,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAX_TYPE_SIZE;

    fn scalar() -> Arc<TypeDefinition> {
        Arc::new(TypeDefinition::primitive("Scalar", WireKind::F32, Value::Float(0.0)))
    }

    fn message() -> Arc<TypeDefinition> {
        let fields = StructDef::new("Hit", vec![FieldDef::new("damage", scalar())]).unwrap();
        Arc::new(TypeDefinition::new(
            "Hit",
            MetaType::MessageData,
            TypeKind::Struct(fields.clone()),
            WireKind::Composite,
            fields.size(),
            fields.default_value(),
        ))
    }

    fn layout() -> StructDef {
        StructDef::new(
            "Player",
            vec![
                FieldDef::new("health", scalar()),
                FieldDef::new("hit", message()),
                FieldDef::new(
                    "alive",
                    Arc::new(TypeDefinition::primitive("Boolean", WireKind::Bool, Value::Bool(false))),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_state_field_bits_skip_messages() {
        let s = layout();
        assert_eq!(s.state_field_count(), 2);
        assert_eq!(s.field_bit_mask("health"), 0b01);
        assert_eq!(s.field_bit_mask("alive"), 0b10);
        assert_eq!(s.field_bit_mask("hit"), 0);
        assert_eq!(s.full_state_mask(), 0b11);
        assert_eq!(s.stream_fields().count(), 1);
    }

    #[test]
    fn test_offsets_are_packed() {
        let s = layout();
        assert_eq!(s.field_offset("health"), Some(0));
        assert_eq!(s.field_offset("alive"), Some(4));
        assert_eq!(s.field_offset("hit"), None);
        assert_eq!(s.size(), TypeSize::fixed(5));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = StructDef::new(
            "Pair",
            vec![FieldDef::new("a", scalar()), FieldDef::new("a", scalar())],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn test_oversized_layout_rejected() {
        let blob = Arc::new(TypeDefinition::byte_array("Blob", MAX_TYPE_SIZE).unwrap());
        let err = StructDef::new(
            "Twice",
            vec![FieldDef::new("a", blob.clone()), FieldDef::new("b", blob)],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::SizeOverflow { .. }));
    }

    #[test]
    fn test_normalize_positional_and_named() {
        let s = StructDef::new(
            "Pair",
            vec![FieldDef::new("a", scalar()), FieldDef::new("b", scalar())],
        )
        .unwrap();
        let v = s
            .normalize_value("Pair", &Value::Array(vec![Value::Int(1), Value::Float(2.5)]))
            .unwrap();
        assert_eq!(v.field("a"), Some(&Value::Float(1.0)));

        let named = Value::Struct(vec![("b".into(), Value::Float(3.0))]);
        let v = s.normalize_value("Pair", &named).unwrap();
        assert_eq!(v.field("a"), Some(&Value::Float(0.0)));
        assert_eq!(v.field("b"), Some(&Value::Float(3.0)));

        let err = s
            .normalize_value("Pair", &Value::Array(vec![Value::Float(1.0)]))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DefaultArity { expected: 2, actual: 1, .. }));
        assert!(s.normalize_value("Pair", &Value::Float(1.0)).is_err());
    }
}
