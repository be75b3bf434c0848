// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declarative schema manifests.
//!
//! A manifest is the ordered list of declaration calls plus reconciler
//! definitions, in TOML or JSON:
//!
//! ```toml
//! [[declarations]]
//! kind = "interface"
//! name = "Actor"
//! fields = [{ name = "position", type = "Vector3" }]
//!
//! [[declarations]]
//! kind = "collection"
//! name = "Player"
//! extends = ["Actor"]
//! max_count = 32
//! fields = [{ name = "health", type = "Scalar", default = 100.0 }]
//!
//! [[reconcilers]]
//! collection = "Player"
//! direction = "input"
//! fields = ["health"]
//! ```

use crate::config::CompilerConfig;
use crate::error::{Result, SchemaError};
use crate::model::{DataModel, FieldInput, SchemaHash, StructSpec};
use crate::reconciler::{BindingConfig, Direction, IndexConfig, ReconcilerDefinition};
use crate::types::MetaType;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One field of a struct-like declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub type_name: String,

    /// Native-form default.
    #[serde(default)]
    pub default: Option<serde_json::Value>,

    #[serde(default)]
    pub description: Option<String>,
}

impl FieldDecl {
    fn to_input(&self) -> FieldInput {
        FieldInput {
            ty: self.type_name.as_str().into(),
            default: self.default.clone().map(Value::from),
            description: self.description.clone(),
        }
    }
}

fn to_spec(fields: &[FieldDecl], description: &Option<String>) -> StructSpec {
    StructSpec {
        fields: fields.iter().map(|f| (f.name.clone(), f.to_input())).collect(),
        description: description.clone(),
    }
}

/// One declaration call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Struct {
        name: String,
        #[serde(default)]
        description: Option<String>,
        fields: Vec<FieldDecl>,
    },
    MessageStruct {
        name: String,
        #[serde(default)]
        description: Option<String>,
        fields: Vec<FieldDecl>,
        expected_rate_per_second: u32,
    },
    Interface {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        extends: Vec<String>,
        #[serde(default)]
        fields: Vec<FieldDecl>,
        #[serde(default)]
        binding: Option<BindingConfig>,
    },
    Collection {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        extends: Vec<String>,
        #[serde(default)]
        fields: Vec<FieldDecl>,
        max_count: u32,
        #[serde(default)]
        binding: Option<BindingConfig>,
    },
    Enum {
        name: String,
        values: Vec<String>,
    },
    FixedArray {
        name: String,
        inner: String,
        length: u32,
    },
    ByteArray {
        name: String,
        byte_count: u32,
    },
    Reference {
        name: String,
        target: String,
    },
    ClearSet {
        name: String,
        base: String,
        /// Falls back to the base type's set value.
        #[serde(default)]
        set_value: Option<serde_json::Value>,
    },
    Signal {
        name: String,
        expected_bytes_per_second: u32,
    },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Struct { name, .. }
            | Declaration::MessageStruct { name, .. }
            | Declaration::Interface { name, .. }
            | Declaration::Collection { name, .. }
            | Declaration::Enum { name, .. }
            | Declaration::FixedArray { name, .. }
            | Declaration::ByteArray { name, .. }
            | Declaration::Reference { name, .. }
            | Declaration::ClearSet { name, .. }
            | Declaration::Signal { name, .. } => name,
        }
    }

    fn apply(&self, model: &mut DataModel) -> Result<()> {
        fn strs(list: &[String]) -> Vec<&str> {
            list.iter().map(String::as_str).collect()
        }
        match self {
            Declaration::Struct {
                name,
                description,
                fields,
            } => model.add_struct(name, to_spec(fields, description))?,
            Declaration::MessageStruct {
                name,
                description,
                fields,
                expected_rate_per_second,
            } => model.add_message_struct(name, to_spec(fields, description), *expected_rate_per_second)?,
            Declaration::Interface {
                name,
                description,
                extends,
                fields,
                ..
            } => model.add_interface(name, to_spec(fields, description), &strs(extends))?,
            Declaration::Collection {
                name,
                description,
                extends,
                fields,
                max_count,
                ..
            } => model.add_collection(name, to_spec(fields, description), &strs(extends), *max_count)?,
            Declaration::Enum { name, values } => model.add_enum(name, values.clone())?,
            Declaration::FixedArray {
                name,
                inner,
                length,
            } => model.add_fixed_array(name, inner.as_str(), *length)?,
            Declaration::ByteArray { name, byte_count } => model.add_byte_array(name, *byte_count)?,
            Declaration::Reference { name, target } => model.add_reference(name, target)?,
            Declaration::ClearSet {
                name,
                base,
                set_value,
            } => model.add_clear_set(name, base, set_value.clone().map(Value::from))?,
            Declaration::Signal {
                name,
                expected_bytes_per_second,
            } => model.add_signal(name, *expected_bytes_per_second)?,
        };
        Ok(())
    }

    fn binding(&self) -> Option<&BindingConfig> {
        match self {
            Declaration::Interface { binding, .. } | Declaration::Collection { binding, .. } => {
                binding.as_ref()
            }
            _ => None,
        }
    }
}

/// One reconciler of a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcilerDecl {
    pub collection: String,
    pub direction: Direction,

    /// Outbound fields of an input reconciler, inbound fields of an output one.
    #[serde(default)]
    pub fields: Vec<String>,

    #[serde(default)]
    pub indexes: Vec<IndexConfig>,
}

/// Ordered declarations and reconcilers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaManifest {
    #[serde(default)]
    pub declarations: Vec<Declaration>,

    #[serde(default)]
    pub reconcilers: Vec<ReconcilerDecl>,
}

impl SchemaManifest {
    /// Load a manifest; `.json` files are JSON, anything else TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Run every declaration in order, then build the reconcilers.
    /// The first fault aborts; no partial schema is returned.
    pub fn apply(&self, config: &CompilerConfig) -> Result<CompiledSchema> {
        let mut model = DataModel::new(config.clone())?;
        let mut bindings: BTreeMap<String, BindingConfig> = BTreeMap::new();

        for decl in &self.declarations {
            tracing::debug!(name = decl.name(), "applying declaration");
            decl.apply(&mut model)?;
            if let Some(b) = decl.binding() {
                bindings.insert(decl.name().to_string(), b.clone());
            }
        }

        let mut reconcilers = Vec::with_capacity(self.reconcilers.len());
        for r in &self.reconcilers {
            let collection = model
                .find_type(&r.collection)
                .ok_or_else(|| SchemaError::UnknownType {
                    name: r.collection.clone(),
                })?;
            let binding = BindingConfig::propagate(&collection, &bindings);
            reconcilers.push(ReconcilerDefinition::new(
                collection,
                r.direction,
                r.fields.iter().cloned(),
                r.indexes.clone(),
                binding,
            )?);
        }

        let compiled = CompiledSchema { model, reconcilers };
        tracing::info!(
            types = compiled.model.get_all_type_definitions().len(),
            collections = compiled.model.get_collections().len(),
            hash = %compiled.model.get_hash()?,
            "schema compiled"
        );
        Ok(compiled)
    }
}

/// A finalized data model and its reconcilers.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub model: DataModel,
    pub reconcilers: Vec<ReconcilerDefinition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaSummary {
    pub hash: SchemaHash,
    pub message_pool_size: u64,
    pub changelog_size: u64,
    pub types: Vec<TypeSummary>,
    pub collections: Vec<CollectionSummary>,
    pub reconcilers: Vec<ReconcilerSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeSummary {
    pub name: String,
    pub meta: MetaType,
    pub static_size: u32,
    pub dynamic_size_estimate: u32,
    pub native_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub type_name: String,
    pub bit_mask: u64,
    pub offset: Option<u32>,
    pub default: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub collection_id: u32,
    pub max_count: u32,
    pub full_state_mask: u64,
    pub implements: Vec<String>,
    pub fields: Vec<FieldSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcilerSummary {
    pub collection: String,
    pub direction: Direction,
    pub inbound_change_bits: u64,
    pub outbound_change_bits: u64,
    pub serialized_fields: Vec<String>,
    pub indexed_fields: Vec<String>,
}

impl CompiledSchema {
    /// Serializable view for code generators.
    pub fn summary(&self) -> Result<SchemaSummary> {
        let types = self
            .model
            .get_all_type_definitions()
            .iter()
            .map(|t| TypeSummary {
                name: t.name().to_string(),
                meta: t.meta_type(),
                static_size: t.get_type_size().static_size,
                dynamic_size_estimate: t.get_type_size().dynamic_size_estimate,
                native_name: t.native().type_name.clone(),
            })
            .collect();

        let mut collections = Vec::new();
        for c in self.model.get_collections() {
            let (Some(iface), Some(collection_id), Some(max_count)) =
                (c.interface_def(), c.collection_id(), c.max_count())
            else {
                continue;
            };
            let fields = iface
                .fields
                .all_fields()
                .iter()
                .map(|f| {
                    Ok(FieldSummary {
                        name: f.name.clone(),
                        type_name: f.ty.name().to_string(),
                        bit_mask: iface.fields.field_bit_mask(&f.name),
                        offset: iface.fields.field_offset(&f.name),
                        default: f.ty.convert_value_to_local(&f.default)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            collections.push(CollectionSummary {
                name: c.name().to_string(),
                collection_id,
                max_count,
                full_state_mask: iface.fields.full_state_mask(),
                implements: iface.ancestors.clone(),
                fields,
            });
        }

        let reconcilers = self
            .reconcilers
            .iter()
            .map(|r| {
                let names = r
                    .collection()
                    .struct_def()
                    .map(|s| s.field_names())
                    .unwrap_or_default();
                ReconcilerSummary {
                    collection: r.collection().name().to_string(),
                    direction: r.direction(),
                    inbound_change_bits: r.get_inbound_change_bits(),
                    outbound_change_bits: r.get_outbound_change_bits(),
                    serialized_fields: names
                        .into_iter()
                        .filter(|n| r.is_serialized_field(n))
                        .collect(),
                    indexed_fields: r.indexed_fields().map(str::to_string).collect(),
                }
            })
            .collect();

        Ok(SchemaSummary {
            hash: self.model.get_hash()?,
            message_pool_size: self.model.calc_message_pool_size(),
            changelog_size: self.model.calc_changelog_size(),
            types,
            collections,
            reconcilers,
        })
    }
}
