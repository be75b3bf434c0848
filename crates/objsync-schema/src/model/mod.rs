// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data model: the per-schema type registry.
//!
//! Types live in an arena (`Vec<Arc<TypeDefinition>>`) indexed by
//! [`TypeId`], with a name index on the side. Registering a name twice is
//! accepted only if both definitions have identical structural hash data.
//!
//! ```
//! use objsync_schema::{CompilerConfig, DataModel, StructSpec};
//!
//! let mut model = DataModel::new(CompilerConfig::default()).unwrap();
//! model
//!     .add_collection(
//!         "Player",
//!         StructSpec::new().field("position", "Vector3").field("health", "Scalar"),
//!         &[],
//!         32,
//!     )
//!     .unwrap();
//! let player = model.get_collections()[0].clone();
//! assert_eq!(player.collection_id(), Some(0));
//! assert_eq!(player.get_field_bit_mask("health"), 0b10);
//! ```

mod capacity;
mod declare;
mod hash;

pub use capacity::{CHANGE_EVENT_HEADER_SIZE, MESSAGE_EVENT_HEADER_SIZE, SIGNAL_PACKET_HEADER_SIZE};
pub use declare::{FieldInput, StructSpec, TypeRef};
pub use hash::SchemaHash;

use crate::config::CompilerConfig;
use crate::error::{Result, SchemaError};
use crate::semantic::{is_builtin_type, SemanticCatalogue};
use crate::types::TypeDefinition;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Stable handle of a registered type (arena index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registry of every type in one schema.
#[derive(Debug, Clone)]
pub struct DataModel {
    config: CompilerConfig,
    catalogue: SemanticCatalogue,
    types: Vec<Arc<TypeDefinition>>,
    by_name: BTreeMap<String, TypeId>,
    /// Interface name -> collections satisfying it, in declaration order.
    implementations: BTreeMap<String, Vec<String>>,
    next_collection_id: u32,
}

impl DataModel {
    /// Create an empty model. The configuration is validated first.
    pub fn new(config: CompilerConfig) -> Result<Self> {
        config.validate()?;
        let catalogue = SemanticCatalogue::new(&config)?;
        Ok(Self {
            config,
            catalogue,
            types: Vec::new(),
            by_name: BTreeMap::new(),
            implementations: BTreeMap::new(),
            next_collection_id: 0,
        })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Look up `name`, instantiating builtins on first use.
    pub fn get_type(&mut self, name: &str) -> Result<Arc<TypeDefinition>> {
        if let Some(ty) = self.find_type(name) {
            return Ok(ty);
        }
        let Some(ty) = self.catalogue.build(name)? else {
            return Err(SchemaError::UnknownType {
                name: name.to_string(),
            });
        };
        tracing::debug!(name, "memoized builtin type");
        self.insert(Arc::new(ty))
    }

    /// Registered type by name, without instantiating builtins.
    pub fn find_type(&self, name: &str) -> Option<Arc<TypeDefinition>> {
        self.by_name.get(name).map(|id| self.types[id.index()].clone())
    }

    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn get_type_by_id(&self, id: TypeId) -> Option<&Arc<TypeDefinition>> {
        self.types.get(id.index())
    }

    /// Every registered type in registration order.
    pub fn get_all_type_definitions(&self) -> &[Arc<TypeDefinition>] {
        &self.types
    }

    /// Collections in id order.
    pub fn get_collections(&self) -> Vec<Arc<TypeDefinition>> {
        let mut out: Vec<_> = self
            .types
            .iter()
            .filter(|t| t.is_collection())
            .cloned()
            .collect();
        out.sort_by_key(|t| t.collection_id());
        out
    }

    pub fn get_interfaces(&self) -> Vec<Arc<TypeDefinition>> {
        self.types
            .iter()
            .filter(|t| t.is_interface())
            .cloned()
            .collect()
    }

    pub fn collection_by_id(&self, collection_id: u32) -> Option<Arc<TypeDefinition>> {
        self.types
            .iter()
            .find(|t| t.collection_id() == Some(collection_id))
            .cloned()
    }

    /// Collections implementing interface `name`, directly or transitively.
    pub fn get_interface_implementations(&self, name: &str) -> &[String] {
        self.implementations.get(name).map_or(&[], Vec::as_slice)
    }

    /// Concrete collections a reference type may point at.
    pub fn get_referenced_type_list(&self, reference_name: &str) -> Result<Vec<Arc<TypeDefinition>>> {
        let reference = self
            .find_type(reference_name)
            .ok_or_else(|| SchemaError::UnknownType {
                name: reference_name.to_string(),
            })?;
        let target = reference
            .reference_target()
            .ok_or_else(|| SchemaError::value_shape(reference_name, "not a reference type"))?;
        Ok(self
            .get_collections()
            .into_iter()
            .filter(|c| c.satisfies(target))
            .collect())
    }

    /// Run one declaration. On error every type it registered is dropped
    /// again, so a failed declaration leaves no partial schema behind.
    fn atomically<T>(&mut self, declare: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mark = self.types.len();
        let next_collection_id = self.next_collection_id;
        let implementations = self.implementations.clone();
        let out = declare(self);
        if out.is_err() {
            for ty in self.types.drain(mark..) {
                self.by_name.remove(ty.name());
            }
            self.next_collection_id = next_collection_id;
            self.implementations = implementations;
        }
        out
    }

    /// Register `ty`. Identical re-registration returns the existing entry.
    fn insert(&mut self, ty: Arc<TypeDefinition>) -> Result<Arc<TypeDefinition>> {
        if let Some(existing) = self.find_type(ty.name()) {
            if existing.get_hash_data() == ty.get_hash_data() {
                return Ok(existing);
            }
            return Err(SchemaError::DuplicateType {
                name: ty.name().to_string(),
            });
        }

        let id = TypeId(self.types.len() as u32);
        if let Some(iface) = ty.interface_def().filter(|_| ty.is_collection()) {
            for target in std::iter::once(ty.name()).chain(iface.ancestors.iter().map(String::as_str)) {
                self.implementations
                    .entry(target.to_string())
                    .or_default()
                    .push(ty.name().to_string());
            }
            self.next_collection_id += 1;
            tracing::debug!(
                name = ty.name(),
                collection_id = ?ty.collection_id(),
                "assigned collection id"
            );
        }
        tracing::debug!(name = ty.name(), id = %id, meta = ?ty.meta_type(), "registered type");
        self.by_name.insert(ty.name().to_string(), id);
        self.types.push(ty.clone());
        Ok(ty)
    }

    /// User declarations may not shadow builtins.
    fn check_user_name(&self, name: &str) -> Result<()> {
        if is_builtin_type(name) {
            return Err(SchemaError::DuplicateType {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetaType;

    #[test]
    fn test_builtin_memoized_once() {
        let mut model = DataModel::new(CompilerConfig::default()).unwrap();
        let a = model.get_type("Vector3").unwrap();
        let b = model.get_type("Vector3").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(model.get_all_type_definitions().len(), 1);
        assert_eq!(model.type_id("Vector3"), Some(TypeId(0)));
        assert_eq!(model.get_type_by_id(TypeId(0)).unwrap().name(), "Vector3");
    }

    #[test]
    fn test_unknown_type() {
        let mut model = DataModel::new(CompilerConfig::default()).unwrap();
        let err = model.get_type("Spaceship").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
        assert!(model.find_type("Spaceship").is_none());
    }

    #[test]
    fn test_builtin_names_reserved() {
        let mut model = DataModel::new(CompilerConfig::default()).unwrap();
        let err = model
            .add_struct("Vector3", StructSpec::new().field("x", "Scalar"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType { .. }));
    }

    #[test]
    fn test_collection_ids_sequential() {
        let mut model = DataModel::new(CompilerConfig::default()).unwrap();
        for (i, name) in ["A", "B", "C"].iter().enumerate() {
            let c = model
                .add_collection(name, StructSpec::new().field("v", "Count"), &[], 4)
                .unwrap();
            assert_eq!(c.collection_id(), Some(i as u32));
            assert_eq!(c.meta_type(), MetaType::Collection);
        }
        // Identical re-declaration keeps its id and does not consume a new one.
        let again = model
            .add_collection("B", StructSpec::new().field("v", "Count"), &[], 4)
            .unwrap();
        assert_eq!(again.collection_id(), Some(1));
        let d = model
            .add_collection("D", StructSpec::new().field("v", "Count"), &[], 4)
            .unwrap();
        assert_eq!(d.collection_id(), Some(3));
        assert_eq!(model.collection_by_id(2).unwrap().name(), "C");
    }
}
