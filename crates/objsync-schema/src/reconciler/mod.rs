// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reconciler definitions.
//!
//! A reconciler partitions one collection's fields by data-flow direction:
//!
//! - **Input**: the listed fields are outbound, all others inbound.
//! - **Output**: the listed fields are inbound, all others outbound.
//!
//! Inbound and outbound change bits are disjoint and together cover every
//! state field, so the runtime knows which bytes it reads and which it must
//! write each tick.

mod binding;
mod index;

pub use binding::BindingConfig;
pub use index::IndexConfig;

use crate::error::{Result, SchemaError};
use crate::types::{MetaType, TypeDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Direction of a reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// Persistence class of a field, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Bound to a host property; never serialized.
    BoundToIntrinsic,
    /// In-memory only.
    Ephemeral,
    /// Serialized, resets itself after being read.
    ClearSet,
    Serialized,
}

#[derive(Debug, Clone)]
pub struct ReconcilerDefinition {
    collection: Arc<TypeDefinition>,
    direction: Direction,
    /// Outbound fields for Input, inbound fields for Output.
    listed: BTreeSet<String>,
    indexes: Vec<IndexConfig>,
    binding: BindingConfig,
}

impl ReconcilerDefinition {
    /// Build a reconciler. Every named field must exist on the collection,
    /// inherited fields included.
    pub fn new(
        collection: Arc<TypeDefinition>,
        direction: Direction,
        listed: impl IntoIterator<Item = String>,
        indexes: Vec<IndexConfig>,
        binding: BindingConfig,
    ) -> Result<Self> {
        if !collection.is_collection() {
            return Err(SchemaError::NotACollection {
                name: collection.name().to_string(),
            });
        }
        let listed: BTreeSet<String> = listed.into_iter().collect();
        let owner = collection.name();
        let has = |f: &str| collection.struct_def().is_some_and(|s| s.has_field(f));
        let named = listed
            .iter()
            .map(String::as_str)
            .chain(indexes.iter().map(|i| i.index_field_name.as_str()))
            .chain(binding.field_names());
        for field in named {
            if !has(field) {
                return Err(SchemaError::unknown_field(owner, field));
            }
        }

        tracing::debug!(
            collection = owner,
            ?direction,
            listed = listed.len(),
            indexes = indexes.len(),
            "reconciler defined"
        );
        Ok(Self {
            collection,
            direction,
            listed,
            indexes,
            binding,
        })
    }

    /// Input reconciler with explicit outbound fields.
    pub fn input(
        collection: Arc<TypeDefinition>,
        outbound: impl IntoIterator<Item = String>,
        indexes: Vec<IndexConfig>,
        binding: BindingConfig,
    ) -> Result<Self> {
        Self::new(collection, Direction::Input, outbound, indexes, binding)
    }

    /// Output reconciler with explicit inbound fields.
    pub fn output(
        collection: Arc<TypeDefinition>,
        inbound: impl IntoIterator<Item = String>,
        indexes: Vec<IndexConfig>,
        binding: BindingConfig,
    ) -> Result<Self> {
        Self::new(collection, Direction::Output, inbound, indexes, binding)
    }

    pub fn collection(&self) -> &Arc<TypeDefinition> {
        &self.collection
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn binding(&self) -> &BindingConfig {
        &self.binding
    }

    pub fn indexes(&self) -> &[IndexConfig] {
        &self.indexes
    }

    fn has_field(&self, name: &str) -> bool {
        self.collection
            .struct_def()
            .is_some_and(|s| s.has_field(name))
    }

    pub fn is_inbound_field(&self, name: &str) -> bool {
        self.has_field(name)
            && match self.direction {
                Direction::Input => !self.listed.contains(name),
                Direction::Output => self.listed.contains(name),
            }
    }

    pub fn is_outbound_field(&self, name: &str) -> bool {
        self.has_field(name) && !self.is_inbound_field(name)
    }

    fn change_bits(&self, inbound: bool) -> u64 {
        self.collection
            .get_state_fields()
            .iter()
            .filter(|f| self.is_inbound_field(&f.name) == inbound)
            .fold(0, |mask, f| mask | self.collection.get_field_bit_mask(&f.name))
    }

    /// Bits of state fields this side reads.
    pub fn get_inbound_change_bits(&self) -> u64 {
        self.change_bits(true)
    }

    /// Bits of state fields this side must write.
    pub fn get_outbound_change_bits(&self) -> u64 {
        self.change_bits(false)
    }

    pub fn classify_field(&self, name: &str) -> Option<FieldClass> {
        let field = self.collection.struct_def()?.field(name)?;
        Some(if self.binding.intrinsic.contains_key(name) {
            FieldClass::BoundToIntrinsic
        } else if self.binding.ephemeral.contains(name) {
            FieldClass::Ephemeral
        } else if field.ty.meta_type() == MetaType::ClearSet {
            FieldClass::ClearSet
        } else {
            FieldClass::Serialized
        })
    }

    /// Inbound fields persist only when index-bound to an external class;
    /// outbound fields persist unless bound, ephemeral, or clear-set.
    pub fn is_serialized_field(&self, name: &str) -> bool {
        if self.is_inbound_field(name) {
            self.bound_index(name).is_some()
        } else {
            self.classify_field(name) == Some(FieldClass::Serialized)
        }
    }

    pub fn indexed_fields(&self) -> impl Iterator<Item = &str> {
        self.indexes.iter().map(|i| i.index_field_name.as_str())
    }

    /// Index on `name` that is bound to an external class.
    pub fn bound_index(&self, name: &str) -> Option<&IndexConfig> {
        self.indexes
            .iter()
            .find(|i| i.index_field_name == name && i.is_bound())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::model::{DataModel, StructSpec};
    use std::collections::BTreeMap;

    fn player() -> Arc<TypeDefinition> {
        let mut m = DataModel::new(CompilerConfig::default()).unwrap();
        m.add_clear_set("Trigger", "Boolean", None).unwrap();
        m.add_message_struct("Chat", StructSpec::new().field("text", "String"), 5)
            .unwrap();
        m.add_collection(
            "Player",
            StructSpec::new()
                .field("id", "Count")
                .field("position", "Vector3")
                .field("chat", "Chat")
                .field("jump", "Trigger")
                .field("health", "Scalar"),
            &[],
            16,
        )
        .unwrap()
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_input_partition() {
        let r = ReconcilerDefinition::input(player(), strings(&["jump"]), vec![], BindingConfig::default())
            .unwrap();
        assert!(r.is_outbound_field("jump"));
        assert!(r.is_inbound_field("position"));
        assert!(!r.is_inbound_field("missing"));
        assert!(!r.is_outbound_field("missing"));
        // id, position, jump, health -> bits 0..3; chat is streamed.
        assert_eq!(r.get_outbound_change_bits(), 0b0100);
        assert_eq!(r.get_inbound_change_bits(), 0b1011);
    }

    #[test]
    fn test_output_partition_covers_state() {
        let r = ReconcilerDefinition::output(player(), strings(&["id", "health"]), vec![], BindingConfig::default())
            .unwrap();
        let full = r.collection().struct_def().unwrap().full_state_mask();
        assert_eq!(r.get_inbound_change_bits() & r.get_outbound_change_bits(), 0);
        assert_eq!(r.get_inbound_change_bits() | r.get_outbound_change_bits(), full);
        assert_eq!(r.get_inbound_change_bits(), 0b1001);
    }

    #[test]
    fn test_unknown_fields_rejected_eagerly() {
        let err = ReconcilerDefinition::input(player(), strings(&["mana"]), vec![], BindingConfig::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { .. }));

        let err = ReconcilerDefinition::input(player(), vec![], vec![IndexConfig::new("mana")], BindingConfig::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { .. }));

        let binding = BindingConfig {
            ephemeral: ["mana".to_string()].into(),
            ..Default::default()
        };
        assert!(ReconcilerDefinition::input(player(), vec![], vec![], binding).is_err());
    }

    #[test]
    fn test_needs_collection() {
        let mut m = DataModel::new(CompilerConfig::default()).unwrap();
        let s = m.add_struct("Pt", StructSpec::new().field("x", "Scalar")).unwrap();
        let err = ReconcilerDefinition::input(s, vec![], vec![], BindingConfig::default()).unwrap_err();
        assert!(matches!(err, SchemaError::NotACollection { .. }));
    }

    #[test]
    fn test_classification_priority() {
        let binding = BindingConfig {
            component_name: Some("PlayerActor".into()),
            intrinsic: BTreeMap::from([("position".to_string(), "location".to_string())]),
            ephemeral: ["health".to_string(), "position".to_string()].into(),
        };
        let r = ReconcilerDefinition::output(
            player(),
            strings(&["id"]),
            vec![IndexConfig::new("id").bound_to("PlayerState")],
            binding,
        )
        .unwrap();
        assert_eq!(r.classify_field("position"), Some(FieldClass::BoundToIntrinsic));
        assert_eq!(r.classify_field("health"), Some(FieldClass::Ephemeral));
        assert_eq!(r.classify_field("jump"), Some(FieldClass::ClearSet));
        assert_eq!(r.classify_field("chat"), Some(FieldClass::Serialized));
        assert_eq!(r.classify_field("missing"), None);

        // Inbound: serialized only via a bound index.
        assert!(r.is_serialized_field("id"));
        // Outbound: serialized only when plain.
        assert!(!r.is_serialized_field("position"));
        assert!(!r.is_serialized_field("health"));
        assert!(!r.is_serialized_field("jump"));
        assert!(r.is_serialized_field("chat"));
        assert_eq!(r.indexed_fields().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn test_inherited_fields_accepted() {
        let mut m = DataModel::new(CompilerConfig::default()).unwrap();
        m.add_interface("Named", StructSpec::new().field("label", "String"), &[])
            .unwrap();
        let c = m
            .add_collection("Sign", StructSpec::new().field("lit", "Boolean"), &["Named"], 4)
            .unwrap();
        let r = ReconcilerDefinition::input(c, strings(&["label"]), vec![IndexConfig::new("label")], BindingConfig::default())
            .unwrap();
        assert_eq!(r.get_outbound_change_bits(), 0b01);
        assert!(!r.is_serialized_field("lit"));
    }
}
