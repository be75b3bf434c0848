// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reference handles to interfaces and collections.

use super::{MetaType, TypeDefinition, TypeKind, WireKind};
use crate::error::{Result, SchemaError};
use crate::value::Value;
use serde_json::json;

/// Non-owning 128-bit handle to an object satisfying `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDef {
    /// Interface or collection name.
    pub target: String,
}

impl ReferenceDef {
    pub(crate) fn hash_data(&self) -> serde_json::Value {
        json!({ "target": self.target })
    }
}

impl TypeDefinition {
    pub fn reference(name: impl Into<String>, target: &TypeDefinition) -> Result<Self> {
        if !target.meta_type().is_object() {
            return Err(SchemaError::NotAnInterface {
                name: target.name().to_string(),
            });
        }
        Ok(Self::new(
            name,
            MetaType::TypeReference,
            TypeKind::Reference(ReferenceDef {
                target: target.name().to_string(),
            }),
            WireKind::Handle128,
            WireKind::Handle128.size(),
            Value::Array(vec![Value::UInt(0), Value::UInt(0)]),
        ))
    }

    /// Target interface of a reference type.
    pub fn reference_target(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Reference(r) => Some(&r.target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InterfaceDef;

    #[test]
    fn test_reference_is_sixteen_bytes() {
        let iface = TypeDefinition::interface("Target", InterfaceDef::new("Target", vec![], &[]).unwrap());
        let r = TypeDefinition::reference("TargetRef", &iface).unwrap();
        assert_eq!(r.meta_type(), MetaType::TypeReference);
        assert_eq!(r.get_type_size().static_size, 16);
        assert_eq!(r.reference_target(), Some("Target"));
    }

    #[test]
    fn test_reference_needs_object_target() {
        let scalar = TypeDefinition::primitive("Scalar", WireKind::F32, Value::Float(0.0));
        assert!(TypeDefinition::reference("Bad", &scalar).is_err());
    }
}
