// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-length arrays of one inner type.

use super::{FieldDef, MetaType, StructDef, TypeDefinition, TypeKind, TypeSize, WireKind};
use super::{FIXED_ARRAY_HEADER_SIZE, MAX_TYPE_SIZE};
use crate::error::{Result, SchemaError};
use serde_json::json;
use std::sync::Arc;

/// `length` positional fields `_0.._{n-1}` of one inner type.
#[derive(Debug, Clone)]
pub struct FixedArrayDef {
    pub inner: Arc<TypeDefinition>,
    pub length: u32,
    pub fields: StructDef,
}

impl FixedArrayDef {
    pub(crate) fn hash_data(&self) -> serde_json::Value {
        json!({
            "inner": self.inner.get_hash_data(),
            "length": self.length,
        })
    }
}

pub(crate) fn element_name(i: u32) -> String {
    format!("_{i}")
}

impl TypeDefinition {
    pub fn fixed_array(name: impl Into<String>, inner: Arc<TypeDefinition>, length: u32) -> Result<Self> {
        let name = name.into();
        if length == 0 {
            return Err(SchemaError::EmptyDeclaration {
                name,
                reason: "fixed array length is zero".into(),
            });
        }
        // Checked before any element is built.
        let size = Some(length)
            .filter(|n| *n <= MAX_TYPE_SIZE)
            .and_then(|n| inner.get_type_size().checked_times(n))
            .and_then(|s| s.checked_add(TypeSize::fixed(FIXED_ARRAY_HEADER_SIZE)))
            .and_then(TypeSize::bounded)
            .ok_or_else(|| SchemaError::size_overflow(&name))?;
        let fields = StructDef::new(
            &name,
            (0..length)
                .map(|i| FieldDef::new(element_name(i), inner.clone()))
                .collect(),
        )?;
        let default = fields.default_value();
        Ok(Self::new(
            name,
            MetaType::Struct,
            TypeKind::FixedArray(FixedArrayDef {
                inner,
                length,
                fields,
            }),
            WireKind::Composite,
            size,
            default,
        ))
    }
}
