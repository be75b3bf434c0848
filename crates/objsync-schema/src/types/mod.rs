// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type definition graph.
//!
//! Every wire-compatible type is a [`TypeDefinition`]: a name, a
//! [`MetaType`] tag, wire and native representation descriptors, a
//! [`TypeSize`], a default value, and a variant payload ([`TypeKind`]).
//! Definitions are immutable once built and shared through `Arc`, the way
//! nested descriptors are shared in a dynamic type tree.
//!
//! # Variants
//!
//! | MetaType | payload | notes |
//! |---|---|---|
//! | `GET_SET` | `Primitive`, `Enum` | always transmitted |
//! | `CLEAR_SET` | `Primitive` | separate clear and set values |
//! | `STRUCT` | `Struct`, `NumericSemantic`, `FixedArray` | fixed layout |
//! | `MESSAGE_DATA` | `Message` | streamed, not in the polled layout |
//! | `SIGNAL_DATA` | `Signal` | raw stream, zero static bytes |
//! | `INTERFACE` | `Interface` | abstract, extendable |
//! | `COLLECTION` | `Collection` | concrete, has id and capacity |
//! | `TYPE_REFERENCE` | `Reference` | 16-byte handle |

mod array;
mod enums;
mod event;
mod numeric;
mod object;
mod reference;
mod structs;

pub use array::FixedArrayDef;
pub use enums::EnumDef;
pub use event::{MessageDef, SignalDef};
pub use numeric::NumericSemanticDef;
pub use object::{CollectionDef, InterfaceDef};
pub use reference::ReferenceDef;
pub use structs::{FieldDef, StructDef};

pub(crate) use numeric::TransformerPair;

use crate::config::NativeTypeOverride;
use crate::coord::{get_field_mappings, FieldMappings};
use crate::error::{Result, SchemaError};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Wire size of a reference handle (two 64-bit words).
pub const REFERENCE_SIZE: u32 = 16;
/// Static part of a string: offset + length into the dynamic area.
pub const STRING_HANDLE_SIZE: u32 = 8;
pub const STRING_DYNAMIC_ESTIMATE: u32 = 32;
pub const BYTE_ARRAY_DYNAMIC_ESTIMATE: u32 = 256;
/// Element count stored ahead of every fixed array.
pub const FIXED_ARRAY_HEADER_SIZE: u32 = 4;
/// Width of the per-object change bitmask.
pub const MAX_STATE_FIELDS: usize = 64;
/// Upper bound on a type's static size plus dynamic estimate, and on
/// byte-array and fixed-array lengths.
pub const MAX_TYPE_SIZE: u32 = 1 << 20;

/// Discriminant of a [`TypeDefinition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetaType {
    GetSet,
    ClearSet,
    TypeReference,
    Struct,
    MessageData,
    SignalData,
    Interface,
    Collection,
}

impl MetaType {
    /// Polled, bitmask-tracked fields. Message and signal fields are streamed.
    pub const fn is_state(self) -> bool {
        !matches!(self, MetaType::MessageData | MetaType::SignalData)
    }

    /// Interfaces and collections may only be pointed at through references.
    pub const fn is_object(self) -> bool {
        matches!(self, MetaType::Interface | MetaType::Collection)
    }
}

/// Byte size of a type: fixed part plus an estimate of its variable part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TypeSize {
    pub static_size: u32,
    pub dynamic_size_estimate: u32,
}

impl TypeSize {
    pub const ZERO: TypeSize = TypeSize::new(0, 0);

    pub const fn new(static_size: u32, dynamic_size_estimate: u32) -> Self {
        Self {
            static_size,
            dynamic_size_estimate,
        }
    }

    pub const fn fixed(static_size: u32) -> Self {
        Self::new(static_size, 0)
    }

    pub fn total(&self) -> u64 {
        u64::from(self.static_size) + u64::from(self.dynamic_size_estimate)
    }

    pub fn checked_add(self, rhs: TypeSize) -> Option<Self> {
        Some(Self::new(
            self.static_size.checked_add(rhs.static_size)?,
            self.dynamic_size_estimate.checked_add(rhs.dynamic_size_estimate)?,
        ))
    }

    pub fn checked_times(self, n: u32) -> Option<Self> {
        Some(Self::new(
            self.static_size.checked_mul(n)?,
            self.dynamic_size_estimate.checked_mul(n)?,
        ))
    }

    /// `None` past [`MAX_TYPE_SIZE`].
    pub fn bounded(self) -> Option<Self> {
        (self.total() <= u64::from(MAX_TYPE_SIZE)).then_some(self)
    }
}

/// Wire encoding of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WireKind {
    Bool,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    String,
    Bytes { len: Option<u32> },
    Handle128,
    Composite,
    Stream,
}

impl WireKind {
    /// Size of a scalar wire kind. Composite sizes come from their fields.
    pub const fn size(self) -> TypeSize {
        match self {
            WireKind::Bool => TypeSize::fixed(1),
            WireKind::I32 | WireKind::U32 | WireKind::F32 => TypeSize::fixed(4),
            WireKind::I64 | WireKind::U64 | WireKind::F64 => TypeSize::fixed(8),
            WireKind::String => TypeSize::new(STRING_HANDLE_SIZE, STRING_DYNAMIC_ESTIMATE),
            WireKind::Bytes { len: Some(n) } => TypeSize::fixed(n),
            WireKind::Bytes { len: None } => {
                TypeSize::new(STRING_HANDLE_SIZE, BYTE_ARRAY_DYNAMIC_ESTIMATE)
            }
            WireKind::Handle128 => TypeSize::fixed(REFERENCE_SIZE),
            WireKind::Composite | WireKind::Stream => TypeSize::ZERO,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, WireKind::F32 | WireKind::F64)
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            WireKind::I32 | WireKind::U32 | WireKind::I64 | WireKind::U64
        )
    }
}

/// Native (target language) representation of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeRepr {
    pub api_name: String,
    pub type_name: String,
    /// Wire field names in native order.
    pub field_order: Vec<String>,
    #[serde(skip)]
    pub mappings: FieldMappings,
}

impl NativeRepr {
    pub fn named(api_name: &str, type_name: &str, wire_fields: &[String]) -> Self {
        Self {
            api_name: api_name.to_string(),
            type_name: type_name.to_string(),
            field_order: wire_fields.to_vec(),
            mappings: FieldMappings::default(),
        }
    }

    /// Apply a type-map override to the wire fields of `type_name`.
    pub fn resolve(
        api_name: &str,
        type_name: &str,
        wire_fields: &[String],
        native: Option<&NativeTypeOverride>,
    ) -> Result<Self> {
        let mut repr = Self::named(api_name, type_name, wire_fields);
        let Some(native) = native else {
            return Ok(repr);
        };
        if let Some(name) = &native.native_name {
            repr.type_name = name.clone();
        }
        repr.mappings = get_field_mappings(type_name, wire_fields, &native.field_map)?;
        if let Some(order) = &native.field_order {
            let is_permutation = order.len() == wire_fields.len()
                && wire_fields.iter().all(|f| order.contains(f));
            if !is_permutation {
                let missing = wire_fields
                    .iter()
                    .find(|f| !order.contains(f))
                    .or_else(|| order.iter().find(|f| !wire_fields.contains(f)))
                    .cloned()
                    .unwrap_or_default();
                return Err(SchemaError::FieldOrderMismatch {
                    type_name: type_name.to_string(),
                    field: missing,
                });
            }
            repr.field_order = order.clone();
        }
        Ok(repr)
    }

    /// Native field names in native order.
    pub fn native_field_names(&self) -> Vec<String> {
        self.mappings.native_names(&self.field_order)
    }
}

/// Variant payload of a [`TypeDefinition`].
#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive,
    Enum(EnumDef),
    Struct(StructDef),
    Interface(InterfaceDef),
    Collection(CollectionDef),
    Reference(ReferenceDef),
    NumericSemantic(NumericSemanticDef),
    FixedArray(FixedArrayDef),
    Message(MessageDef),
    Signal(SignalDef),
}

/// A wire-compatible type.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    name: String,
    meta: MetaType,
    kind: TypeKind,
    wire: WireKind,
    native: NativeRepr,
    size: TypeSize,
    internal_default: Value,
    set_default: Option<Value>,
    description: Option<String>,
}

impl TypeDefinition {
    pub(crate) fn new(
        name: impl Into<String>,
        meta: MetaType,
        kind: TypeKind,
        wire: WireKind,
        size: TypeSize,
        internal_default: Value,
    ) -> Self {
        let name = name.into();
        let wire_fields = match &kind {
            TypeKind::Struct(s)
            | TypeKind::NumericSemantic(NumericSemanticDef { fields: s, .. })
            | TypeKind::FixedArray(FixedArrayDef { fields: s, .. })
            | TypeKind::Message(MessageDef { fields: s, .. }) => s.field_names(),
            TypeKind::Interface(i) => i.fields.field_names(),
            TypeKind::Collection(c) => c.interface.fields.field_names(),
            _ => Vec::new(),
        };
        Self {
            native: NativeRepr::named("", &name, &wire_fields),
            name,
            meta,
            kind,
            wire,
            size,
            internal_default,
            set_default: None,
            description: None,
        }
    }

    /// A scalar builtin.
    pub fn primitive(name: impl Into<String>, wire: WireKind, default: Value) -> Self {
        Self::new(
            name,
            MetaType::GetSet,
            TypeKind::Primitive,
            wire,
            wire.size(),
            default,
        )
    }

    /// A fixed-length byte array.
    pub fn byte_array(name: impl Into<String>, byte_count: u32) -> Result<Self> {
        let name = name.into();
        if byte_count == 0 {
            return Err(SchemaError::EmptyDeclaration {
                name,
                reason: "byte array length is zero".into(),
            });
        }
        if byte_count > MAX_TYPE_SIZE {
            return Err(SchemaError::size_overflow(&name));
        }
        Ok(Self::primitive(
            name,
            WireKind::Bytes {
                len: Some(byte_count),
            },
            Value::Bytes(vec![0; byte_count as usize]),
        ))
    }

    /// A self-clearing variant of a primitive: rests at the base default,
    /// writers set it to `set_value`, or to the base's own set value.
    pub fn clear_set(name: impl Into<String>, base: &TypeDefinition, set_value: Option<&Value>) -> Result<Self> {
        let name = name.into();
        if !matches!(base.kind, TypeKind::Primitive) || base.meta != MetaType::GetSet {
            return Err(SchemaError::value_shape(
                &name,
                format!("clear-set base '{}' must be a plain primitive", base.name),
            ));
        }
        let set_default = match set_value {
            Some(value) => base.normalize_default(value)?,
            None => base.set_default.clone().ok_or_else(|| {
                SchemaError::value_shape(&name, format!("base '{}' has no set value", base.name))
            })?,
        };
        let mut def = Self::new(
            name,
            MetaType::ClearSet,
            TypeKind::Primitive,
            base.wire,
            base.size,
            base.internal_default.clone(),
        );
        def.set_default = Some(set_default);
        Ok(def)
    }

    /// Value a writer stores by default, distinct from the rest value.
    #[must_use]
    pub fn with_set_default(mut self, value: Value) -> Self {
        self.set_default = Some(value);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    #[must_use]
    pub(crate) fn with_native(mut self, native: NativeRepr) -> Self {
        self.native = native;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta_type(&self) -> MetaType {
        self.meta
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn wire(&self) -> WireKind {
        self.wire
    }

    pub fn native(&self) -> &NativeRepr {
        &self.native
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn get_type_size(&self) -> TypeSize {
        self.size
    }

    pub fn get_internal_default_value(&self) -> &Value {
        &self.internal_default
    }

    /// Default in native representation.
    pub fn get_local_default_value(&self) -> Result<Value> {
        self.convert_value_to_local(&self.internal_default)
    }

    /// Value a writer stores into the field when no value is given.
    pub fn get_set_default_value(&self) -> Option<&Value> {
        self.set_default.as_ref()
    }

    /// Field layout, for every struct-like variant.
    pub fn struct_def(&self) -> Option<&StructDef> {
        match &self.kind {
            TypeKind::Struct(s) => Some(s),
            TypeKind::Interface(i) => Some(&i.fields),
            TypeKind::Collection(c) => Some(&c.interface.fields),
            TypeKind::NumericSemantic(n) => Some(&n.fields),
            TypeKind::FixedArray(a) => Some(&a.fields),
            TypeKind::Message(m) => Some(&m.fields),
            _ => None,
        }
    }

    /// Interface view of interfaces and collections.
    pub fn interface_def(&self) -> Option<&InterfaceDef> {
        match &self.kind {
            TypeKind::Interface(i) => Some(i),
            TypeKind::Collection(c) => Some(&c.interface),
            _ => None,
        }
    }

    pub fn collection_def(&self) -> Option<&CollectionDef> {
        match &self.kind {
            TypeKind::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn collection_id(&self) -> Option<u32> {
        self.collection_def().map(|c| c.collection_id)
    }

    pub fn max_count(&self) -> Option<u32> {
        self.collection_def().map(|c| c.max_count)
    }

    pub fn is_interface(&self) -> bool {
        self.meta == MetaType::Interface
    }

    pub fn is_collection(&self) -> bool {
        self.meta == MetaType::Collection
    }

    /// True if a value of `self` can be referenced where `interface` is expected.
    pub fn satisfies(&self, interface: &str) -> bool {
        self.name == interface
            || self
                .interface_def()
                .is_some_and(|i| i.ancestors.iter().any(|a| a == interface))
    }

    /// State fields (polled, bitmask-tracked), empty for non-struct types.
    pub fn get_state_fields(&self) -> Vec<&FieldDef> {
        self.struct_def()
            .map(|s| s.state_fields().collect())
            .unwrap_or_default()
    }

    /// `1 << ordinal` among state fields; 0 for unknown or streamed fields.
    pub fn get_field_bit_mask(&self, field: &str) -> u64 {
        self.struct_def().map_or(0, |s| s.field_bit_mask(field))
    }

    /// Ordinal among state fields.
    pub fn get_field_index(&self, field: &str) -> Option<usize> {
        self.struct_def().and_then(|s| s.field_index(field))
    }

    /// Structural fingerprint. Leaves out anything that does not change the
    /// wire contract: descriptions, defaults, native naming, and the local
    /// coordinate system.
    pub fn get_hash_data(&self) -> serde_json::Value {
        let detail = match &self.kind {
            TypeKind::Primitive => serde_json::Value::Null,
            TypeKind::Enum(e) => e.hash_data(),
            TypeKind::Struct(s) => s.hash_data(),
            TypeKind::Interface(i) => i.hash_data(),
            TypeKind::Collection(c) => c.hash_data(),
            TypeKind::Reference(r) => r.hash_data(),
            TypeKind::NumericSemantic(n) => n.hash_data(),
            TypeKind::FixedArray(a) => a.hash_data(),
            TypeKind::Message(m) => m.hash_data(),
            TypeKind::Signal(s) => s.hash_data(),
        };
        json!({
            "name": self.name,
            "meta": self.meta,
            "wire": self.wire,
            "size": [self.size.static_size, self.size.dynamic_size_estimate],
            "detail": detail,
        })
    }

    /// Check and canonicalize a user-supplied default for this type.
    pub fn normalize_default(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(self.internal_default.clone());
        }
        if let TypeKind::Enum(e) = &self.kind {
            return e.normalize(&self.name, value);
        }
        match self.struct_def() {
            Some(s) => s.normalize_value(&self.name, value),
            None => normalize_scalar(&self.name, self.wire, value),
        }
    }

    /// Native value -> wire value.
    pub fn convert_value_from_local(&self, native: &Value) -> Result<Value> {
        if native.is_null() {
            return Ok(self.internal_default.clone());
        }
        match &self.kind {
            TypeKind::NumericSemantic(n) => n.from_local(&self.name, &self.native, native),
            TypeKind::Enum(e) => e.normalize(&self.name, native),
            _ => match self.struct_def() {
                Some(s) => s.from_local(&self.name, &self.native, native),
                None => normalize_scalar(&self.name, self.wire, native),
            },
        }
    }

    /// Wire value -> native value.
    pub fn convert_value_to_local(&self, wire: &Value) -> Result<Value> {
        match &self.kind {
            TypeKind::NumericSemantic(n) => n.to_local(&self.name, &self.native, wire),
            TypeKind::Enum(e) => e.to_local(&self.name, wire),
            _ => match self.struct_def() {
                Some(s) => s.to_local(&self.name, &self.native, wire),
                None => Ok(wire.clone()),
            },
        }
    }
}

fn normalize_scalar(type_name: &str, wire: WireKind, value: &Value) -> Result<Value> {
    let mismatch = || {
        SchemaError::value_shape(
            type_name,
            format!("{} does not fit wire kind {:?}", value.shape(), wire),
        )
    };
    match (wire, value) {
        (WireKind::Bool, Value::Bool(_)) => Ok(value.clone()),
        (w, Value::Int(_) | Value::UInt(_)) if w.is_integer() => Ok(value.clone()),
        (w, v) if w.is_float() => v.as_f64().map(Value::Float).ok_or_else(mismatch),
        (WireKind::String, Value::Str(_)) => Ok(value.clone()),
        (WireKind::Bytes { len }, Value::Bytes(bytes)) => check_byte_len(type_name, len, bytes.clone()),
        (WireKind::Bytes { len }, Value::Array(items)) => {
            let bytes = items
                .iter()
                .map(|v| match v {
                    Value::UInt(b) => u8::try_from(*b).ok(),
                    _ => None,
                })
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(mismatch)?;
            check_byte_len(type_name, len, bytes)
        }
        (WireKind::Handle128, Value::Array(items))
            if items.len() == 2 && items.iter().all(|v| matches!(v, Value::UInt(_))) =>
        {
            Ok(value.clone())
        }
        _ => Err(mismatch()),
    }
}

fn check_byte_len(type_name: &str, len: Option<u32>, mut bytes: Vec<u8>) -> Result<Value> {
    if let Some(len) = len {
        if bytes.len() > len as usize {
            return Err(SchemaError::DefaultArity {
                type_name: type_name.to_string(),
                expected: len as usize,
                actual: bytes.len(),
            });
        }
        bytes.resize(len as usize, 0);
    }
    Ok(Value::Bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_type_state() {
        assert!(MetaType::GetSet.is_state());
        assert!(MetaType::Struct.is_state());
        assert!(MetaType::TypeReference.is_state());
        assert!(!MetaType::MessageData.is_state());
        assert!(!MetaType::SignalData.is_state());
        assert!(MetaType::Collection.is_object());
    }

    #[test]
    fn test_wire_sizes() {
        assert_eq!(WireKind::Bool.size(), TypeSize::fixed(1));
        assert_eq!(WireKind::Handle128.size(), TypeSize::fixed(16));
        assert_eq!(WireKind::String.size(), TypeSize::new(8, 32));
        assert_eq!(WireKind::Stream.size(), TypeSize::ZERO);
    }

    #[test]
    fn test_clear_set_defaults() {
        let base = TypeDefinition::primitive("Boolean", WireKind::Bool, Value::Bool(false));
        let trigger = TypeDefinition::clear_set("Trigger", &base, Some(&Value::Bool(true))).unwrap();
        assert_eq!(trigger.meta_type(), MetaType::ClearSet);
        assert_eq!(trigger.get_internal_default_value(), &Value::Bool(false));
        assert_eq!(trigger.get_set_default_value(), Some(&Value::Bool(true)));

        let err = TypeDefinition::clear_set("Bad", &base, Some(&Value::Float(1.0))).unwrap_err();
        assert!(matches!(err, SchemaError::ValueShape { .. }));

        // No explicit value and none on the base.
        let err = TypeDefinition::clear_set("Bare", &base, None).unwrap_err();
        assert!(matches!(err, SchemaError::ValueShape { .. }));

        let flag = base.with_set_default(Value::Bool(true));
        let latch = TypeDefinition::clear_set("Latch", &flag, None).unwrap();
        assert_eq!(latch.get_set_default_value(), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_byte_array_default_padding() {
        let ty = TypeDefinition::byte_array("Hash", 4).unwrap();
        assert_eq!(ty.get_type_size(), TypeSize::fixed(4));
        let v = ty.normalize_default(&Value::Bytes(vec![1, 2])).unwrap();
        assert_eq!(v, Value::Bytes(vec![1, 2, 0, 0]));
        let err = ty.normalize_default(&Value::Bytes(vec![0; 5])).unwrap_err();
        assert!(matches!(err, SchemaError::DefaultArity { expected: 4, actual: 5, .. }));
    }

    #[test]
    fn test_size_arithmetic_is_checked() {
        let big = TypeSize::fixed(u32::MAX / 2 + 1);
        assert_eq!(big.checked_times(2), None);
        assert_eq!(big.checked_add(big), None);
        assert_eq!(TypeSize::fixed(4).checked_times(3), Some(TypeSize::fixed(12)));
        assert_eq!(TypeSize::fixed(MAX_TYPE_SIZE).bounded(), Some(TypeSize::fixed(MAX_TYPE_SIZE)));
        assert_eq!(TypeSize::new(MAX_TYPE_SIZE, 1).bounded(), None);

        let err = TypeDefinition::byte_array("Blob", u32::MAX).unwrap_err();
        assert!(matches!(err, SchemaError::SizeOverflow { .. }));
    }

    #[test]
    fn test_hash_data_ignores_description() {
        let a = TypeDefinition::primitive("Count", WireKind::I32, Value::Int(0));
        let b = a.clone().with_description(Some("number of things".into()));
        assert_eq!(a.get_hash_data(), b.get_hash_data());
    }
}
