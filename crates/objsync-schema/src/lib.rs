// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! objsync schema compiler core
//!
//! Turns ordered schema declarations into an immutable type graph with fixed
//! wire layouts, per-field change bits, coordinate conversion rules and a
//! wire-compatibility hash.
//!
//! # Features
//!
//! - **Type graph**: structs, interfaces, collections, enums, references,
//!   fixed arrays, messages and signals, shared through `Arc`
//! - **Change bitmasks**: one bit per polled field, at most 64 per object
//! - **Coordinate conversion**: axis/handedness/unit remapping between a
//!   local and a stored coordinate system
//! - **Capacity planning**: message pool and change log sizes
//! - **Reconcilers**: inbound/outbound field partitions per collection
//!
//! # Quick Start
//!
//! ```
//! use objsync_schema::{CompilerConfig, DataModel, ReconcilerDefinition, StructSpec};
//! use objsync_schema::reconciler::BindingConfig;
//!
//! let mut model = DataModel::new(CompilerConfig::default()).unwrap();
//! let door = model
//!     .add_collection("Door", StructSpec::new().field("open", "Boolean"), &[], 128)
//!     .unwrap();
//! let input = ReconcilerDefinition::input(door, vec![], vec![], BindingConfig::default()).unwrap();
//! assert_eq!(input.get_inbound_change_bits(), 0b1);
//! println!("schema {}", model.get_hash().unwrap());
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! api_name = "cpp"
//!
//! [local]
//! up = "+Y"
//! right = "+X"
//! forward = "-Z"
//! spatial_unit = "meter"
//! angular_unit = "radian"
//!
//! [type_map.Quaternion]
//! native_name = "glm::quat"
//! field_order = ["w", "x", "y", "z"]
//! ```

pub mod config;
pub mod coord;
pub mod error;
pub mod manifest;
pub mod model;
pub mod reconciler;
pub mod semantic;
pub mod types;
pub mod value;

pub use config::{CompilerConfig, NativeTypeOverride, TypeMap};
pub use error::{ErrorKind, Result, SchemaError};
pub use manifest::{CompiledSchema, SchemaManifest, SchemaSummary};
pub use model::{DataModel, FieldInput, SchemaHash, StructSpec, TypeId, TypeRef};
pub use reconciler::{Direction, FieldClass, ReconcilerDefinition};
pub use semantic::{get_semantic_type, is_builtin_type};
pub use types::{MetaType, TypeDefinition, TypeSize};
pub use value::Value;
