// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Component-binding metadata.
//!
//! Declared per interface or collection; a collection's effective binding is
//! its own declaration merged with those of its ancestors, nearest first.

use crate::types::TypeDefinition;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How fields of one object type attach to a host component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Host component class the object is bound to.
    #[serde(default)]
    pub component_name: Option<String>,

    /// Field -> host property it is bound to. Never serialized.
    #[serde(default)]
    pub intrinsic: BTreeMap<String, String>,

    /// In-memory only fields.
    #[serde(default)]
    pub ephemeral: BTreeSet<String>,
}

impl BindingConfig {
    pub fn is_empty(&self) -> bool {
        self.component_name.is_none() && self.intrinsic.is_empty() && self.ephemeral.is_empty()
    }

    fn mentions(&self, field: &str) -> bool {
        self.intrinsic.contains_key(field) || self.ephemeral.contains(field)
    }

    /// Fields named anywhere in this binding.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.intrinsic
            .keys()
            .chain(self.ephemeral.iter())
            .map(String::as_str)
    }

    /// Fill gaps from a farther declaration. Entries already present win.
    pub fn inherit(&mut self, ancestor: &BindingConfig) {
        if self.component_name.is_none() {
            self.component_name = ancestor.component_name.clone();
        }
        for (field, property) in &ancestor.intrinsic {
            if !self.mentions(field) {
                self.intrinsic.insert(field.clone(), property.clone());
            }
        }
        for field in &ancestor.ephemeral {
            if !self.mentions(field) {
                self.ephemeral.insert(field.clone());
            }
        }
    }

    /// Effective binding of `object`: its own declaration, then each
    /// ancestor interface's, nearest first.
    pub fn propagate(object: &TypeDefinition, declared: &BTreeMap<String, BindingConfig>) -> BindingConfig {
        let mut out = declared.get(object.name()).cloned().unwrap_or_default();
        if let Some(iface) = object.interface_def() {
            for ancestor in &iface.ancestors {
                if let Some(b) = declared.get(ancestor) {
                    out.inherit(b);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDef, InterfaceDef, WireKind};
    use crate::value::Value;
    use std::sync::Arc;

    fn object() -> TypeDefinition {
        let f = Arc::new(TypeDefinition::primitive("Scalar", WireKind::F32, Value::Float(0.0)));
        let base_def = InterfaceDef::new("Actor", vec![FieldDef::new("pos", f.clone())], &[]).unwrap();
        let base = Arc::new(TypeDefinition::interface("Actor", base_def));
        let def = InterfaceDef::new("Npc", vec![FieldDef::new("mood", f)], &[base]).unwrap();
        TypeDefinition::collection("Npc", def, 0, 4)
    }

    #[test]
    fn test_nearest_declaration_wins() {
        let mut declared = BTreeMap::new();
        declared.insert(
            "Actor".to_string(),
            BindingConfig {
                component_name: Some("ActorComponent".into()),
                intrinsic: BTreeMap::from([("pos".to_string(), "transform.position".to_string())]),
                ephemeral: BTreeSet::from(["mood".to_string()]),
            },
        );
        declared.insert(
            "Npc".to_string(),
            BindingConfig {
                component_name: None,
                intrinsic: BTreeMap::from([("mood".to_string(), "ai.mood".to_string())]),
                ephemeral: BTreeSet::new(),
            },
        );

        let b = BindingConfig::propagate(&object(), &declared);
        assert_eq!(b.component_name.as_deref(), Some("ActorComponent"));
        assert_eq!(b.intrinsic["mood"], "ai.mood");
        assert_eq!(b.intrinsic["pos"], "transform.position");
        assert!(b.ephemeral.is_empty());
    }

    #[test]
    fn test_no_declarations() {
        let b = BindingConfig::propagate(&object(), &BTreeMap::new());
        assert!(b.is_empty());
    }
}
