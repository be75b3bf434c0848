// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Coordinate and unit conversion between a local and a stored system.
//!
//! Pure functions only. A [`CoordTransformer`] is built once per
//! (local, stored) pair; numeric semantic types then derive a
//! [`RemapTable`] from it and evaluate that table against values or
//! against symbolic field references.
//!
//! ```
//! use objsync_schema::coord::*;
//!
//! let local = CoordinateSystemDef::new(
//!     Axis::PosY, Axis::PosX, Axis::NegZ, SpatialUnit::Meter, AngularUnit::Radian,
//! );
//! let stored = CoordinateSystemDef::new(
//!     Axis::PosZ, Axis::PosY, Axis::PosX, SpatialUnit::Centimeter, AngularUnit::Degree,
//! );
//! let t = build_coord_transformer(&local, &stored, &StandardUnits).unwrap();
//! let xyz: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
//! let table = remap_coordinates(
//!     "Vector3", &CoordTypeConfig::coords(UnitKind::Spatial), 3, &xyz, &xyz, &t,
//! ).unwrap();
//! let out = perform_semantic_conversion(&table, &[0.0, 1.0, 0.0]).unwrap();
//! assert_eq!(out, vec![0.0, 0.0, 100.0]);
//! ```

mod field_map;
mod remap;
mod system;
mod transformer;

pub use field_map::{get_field_mappings, FieldMappings};
pub use remap::{
    gen_semantic_conversion, perform_semantic_conversion, remap_coordinates, CoordTypeConfig,
    RemapElement, RemapTable,
};
pub use system::{AngularUnit, Axis, CoordinateSystemDef, SpatialUnit};
pub use transformer::{
    build_coord_transformer, AxisMapping, CoordTransformer, StandardUnits, UnitKind,
    UnitMultipliers, UnitScale,
};
