// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interfaces and collections.

use super::{FieldDef, MetaType, StructDef, TypeDefinition, TypeKind, WireKind};
use crate::error::{Result, SchemaError};
use serde_json::json;
use std::sync::Arc;

/// Abstract object layout. Inherited fields come first, in parent order.
#[derive(Debug, Clone)]
pub struct InterfaceDef {
    pub fields: StructDef,
    /// Direct parents, as declared.
    pub extends: Vec<String>,
    /// Every interface reachable through `extends`, nearest first.
    pub ancestors: Vec<String>,
}

impl InterfaceDef {
    pub fn new(name: &str, own_fields: Vec<FieldDef>, parents: &[Arc<TypeDefinition>]) -> Result<Self> {
        let mut fields: Vec<FieldDef> = Vec::new();
        let mut ancestors: Vec<String> = Vec::new();

        for parent in parents {
            let Some(iface) = parent.interface_def().filter(|_| parent.is_interface()) else {
                return Err(SchemaError::NotAnInterface {
                    name: parent.name().to_string(),
                });
            };

            // Diamond: the same field reached through two parents is kept once.
            for f in iface.fields.all_fields() {
                let seen = fields
                    .iter()
                    .any(|g| g.name == f.name && g.declared_in == f.declared_in);
                if !seen {
                    fields.push(f.clone());
                }
            }
            for a in std::iter::once(parent.name().to_string()).chain(iface.ancestors.iter().cloned()) {
                if !ancestors.contains(&a) {
                    ancestors.push(a);
                }
            }
        }

        fields.extend(own_fields.into_iter().map(|mut f| {
            f.declared_in = name.to_string();
            f
        }));
        let fields = StructDef::new(name, fields)?;
        fields.check_state_capacity(name)?;

        Ok(Self {
            fields,
            extends: parents.iter().map(|p| p.name().to_string()).collect(),
            ancestors,
        })
    }

    pub(crate) fn hash_data(&self) -> serde_json::Value {
        json!({
            "extends": self.extends,
            "fields": self.fields.hash_data(),
        })
    }
}

/// Concrete, instantiable object type.
#[derive(Debug, Clone)]
pub struct CollectionDef {
    pub interface: InterfaceDef,
    pub collection_id: u32,
    /// Upper bound on live objects.
    pub max_count: u32,
}

impl CollectionDef {
    pub(crate) fn hash_data(&self) -> serde_json::Value {
        json!({
            "collection_id": self.collection_id,
            "max_count": self.max_count,
            "interface": self.interface.hash_data(),
        })
    }
}

impl TypeDefinition {
    pub fn interface(name: impl Into<String>, def: InterfaceDef) -> Self {
        let size = def.fields.size();
        let default = def.fields.default_value();
        Self::new(
            name,
            MetaType::Interface,
            TypeKind::Interface(def),
            WireKind::Composite,
            size,
            default,
        )
    }

    pub fn collection(name: impl Into<String>, def: InterfaceDef, collection_id: u32, max_count: u32) -> Self {
        let size = def.fields.size();
        let default = def.fields.default_value();
        Self::new(
            name,
            MetaType::Collection,
            TypeKind::Collection(CollectionDef {
                interface: def,
                collection_id,
                max_count,
            }),
            WireKind::Composite,
            size,
            default,
        )
    }
}
