// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builtin type catalogue.
//!
//! A closed set of names. Primitives are coordinate-independent; numeric
//! semantic types are built against one (local, stored) pair and carry the
//! remap tables for it. Every default is the neutral element of its type
//! (zero position, unit scale, identity rotation) so an unwritten record is
//! always physically valid.

use crate::config::{CompilerConfig, TypeMap};
use crate::coord::{CoordTypeConfig, CoordinateSystemDef, StandardUnits, UnitKind};
use crate::error::Result;
use crate::types::{
    FieldDef, NativeRepr, StructDef, TransformerPair, TypeDefinition, WireKind,
};
use crate::value::Value;
use std::sync::Arc;

/// Builtin `Signal` stream rate.
pub const SIGNAL_BYTES_PER_SECOND: u32 = 32_000;

/// Every builtin type name.
pub const BUILTIN_TYPE_NAMES: &[&str] = &[
    "Boolean",
    "Count",
    "BitField",
    "Scalar",
    "Timestamp",
    "HiResTimestamp",
    "String",
    "Signal",
    "ByteArray",
    "Float3",
    "ColorSRGBA",
    "ColorLinear",
    "Angle",
    "Distance",
    "Vector2",
    "UnitVector2",
    "Distance2",
    "Scale2",
    "Matrix3x2",
    "Vector3",
    "UnitVector3",
    "Distance3",
    "Scale3",
    "Matrix4x3",
    "Matrix4x4",
    "Quaternion",
    "EulerAngles",
];

pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPE_NAMES.contains(&name)
}

fn scalar() -> TypeDefinition {
    TypeDefinition::primitive("Scalar", WireKind::F32, Value::Float(0.0))
}

fn float_struct(name: &str, fields: &[&str], defaults: &[f64]) -> Result<TypeDefinition> {
    let component = Arc::new(scalar());
    let fields = fields
        .iter()
        .zip(defaults)
        .map(|(f, d)| {
            let mut field = FieldDef::new(*f, component.clone());
            field.default = Value::Float(*d);
            field
        })
        .collect();
    Ok(TypeDefinition::structure(name, StructDef::new(name, fields)?))
}

fn build_primitive(name: &str) -> Result<Option<TypeDefinition>> {
    let ty = match name {
        "Boolean" => TypeDefinition::primitive(name, WireKind::Bool, Value::Bool(false))
            .with_set_default(Value::Bool(true)),
        "Count" => TypeDefinition::primitive(name, WireKind::I32, Value::Int(0)),
        "BitField" => TypeDefinition::primitive(name, WireKind::U64, Value::UInt(0)),
        "Scalar" => scalar(),
        "Timestamp" => TypeDefinition::primitive(name, WireKind::F64, Value::Float(0.0)),
        "HiResTimestamp" => TypeDefinition::primitive(name, WireKind::I64, Value::Int(0)),
        "String" => TypeDefinition::primitive(name, WireKind::String, Value::Str(String::new())),
        "Signal" => TypeDefinition::signal(name, SIGNAL_BYTES_PER_SECOND),
        "ByteArray" => {
            TypeDefinition::primitive(name, WireKind::Bytes { len: None }, Value::Bytes(Vec::new()))
        }
        "Float3" => float_struct(name, &["x", "y", "z"], &[0.0; 3])?,
        // Packed 0xRRGGBBAA, opaque black.
        "ColorSRGBA" => TypeDefinition::primitive(name, WireKind::U32, Value::UInt(0xFF)),
        "ColorLinear" => float_struct(name, &["r", "g", "b", "a"], &[0.0, 0.0, 0.0, 1.0])?,
        _ => return Ok(None),
    };
    Ok(Some(ty))
}

/// The coordinate-independent builtins.
pub fn gen_primitive_types() -> Result<Vec<TypeDefinition>> {
    let mut out = Vec::new();
    for name in BUILTIN_TYPE_NAMES {
        if let Some(ty) = build_primitive(name)? {
            out.push(ty);
        }
    }
    Ok(out)
}

struct NumericShape {
    components: Vec<String>,
    config: CoordTypeConfig,
    defaults: Vec<f64>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn matrix(cols: usize, rows: usize) -> NumericShape {
    let mut components = Vec::with_capacity(cols * rows);
    let mut defaults = Vec::with_capacity(cols * rows);
    for col in 0..cols {
        for row in 0..rows {
            components.push(format!("c{col}r{row}"));
            defaults.push(if col == row { 1.0 } else { 0.0 });
        }
    }
    let config = if cols >= 3 && rows >= 3 {
        CoordTypeConfig::matrix(cols, rows)
    } else {
        CoordTypeConfig::plain(UnitKind::None)
    };
    NumericShape {
        components,
        config,
        defaults,
    }
}

fn numeric_shape(name: &str, stored: &CoordinateSystemDef) -> Option<NumericShape> {
    let shape = |c: &[&str], config: CoordTypeConfig, defaults: &[f64]| NumericShape {
        components: names(c),
        config,
        defaults: defaults.to_vec(),
    };
    let xy = ["x", "y"];
    let xyz = ["x", "y", "z"];
    Some(match name {
        "Angle" => shape(&["value"], CoordTypeConfig::plain(UnitKind::Angular).scalar(), &[0.0]),
        "Distance" => shape(&["value"], CoordTypeConfig::plain(UnitKind::Spatial).scalar(), &[0.0]),
        "Vector2" => shape(&xy, CoordTypeConfig::plain(UnitKind::None), &[0.0, 0.0]),
        "UnitVector2" => shape(&xy, CoordTypeConfig::plain(UnitKind::None), &[1.0, 0.0]),
        "Distance2" => shape(&xy, CoordTypeConfig::plain(UnitKind::Spatial), &[0.0, 0.0]),
        "Scale2" => shape(&xy, CoordTypeConfig::plain(UnitKind::None), &[1.0, 1.0]),
        "Matrix3x2" => matrix(3, 2),
        "Vector3" => shape(&xyz, CoordTypeConfig::coords(UnitKind::Spatial), &[0.0; 3]),
        "UnitVector3" => {
            let fwd = stored.forward.unit_vector().map(f64::from);
            shape(&xyz, CoordTypeConfig::coords(UnitKind::None), &fwd)
        }
        "Distance3" => shape(&xyz, CoordTypeConfig::coords(UnitKind::Spatial).scalar(), &[0.0; 3]),
        "Scale3" => shape(&xyz, CoordTypeConfig::coords(UnitKind::None).scalar(), &[1.0; 3]),
        "Matrix4x3" => matrix(4, 3),
        "Matrix4x4" => matrix(4, 4),
        "Quaternion" => shape(
            &["x", "y", "z", "w"],
            CoordTypeConfig::coords(UnitKind::None).flip_with_handedness(),
            &[0.0, 0.0, 0.0, 1.0],
        ),
        "EulerAngles" => shape(
            &xyz,
            CoordTypeConfig::coords(UnitKind::Angular).flip_with_handedness(),
            &[0.0; 3],
        ),
        _ => return None,
    })
}

/// Builtin factory bound to one compiler configuration. The transformer
/// pair is computed once and shared by every numeric type it builds.
#[derive(Debug, Clone)]
pub struct SemanticCatalogue {
    api_name: String,
    type_map: TypeMap,
    stored: CoordinateSystemDef,
    transformers: TransformerPair,
}

impl SemanticCatalogue {
    pub fn new(config: &CompilerConfig) -> Result<Self> {
        Ok(Self {
            api_name: config.api_name.clone(),
            type_map: config.type_map.clone(),
            stored: config.stored,
            transformers: TransformerPair::new(&config.local, &config.stored, &StandardUnits)?,
        })
    }

    /// Build builtin `name`, or `None` if it is not a builtin.
    pub fn build(&self, name: &str) -> Result<Option<TypeDefinition>> {
        let native_override = self.type_map.get(name);
        if let Some(ty) = build_primitive(name)? {
            let wire_fields = ty.struct_def().map(StructDef::field_names).unwrap_or_default();
            let native = NativeRepr::resolve(&self.api_name, name, &wire_fields, native_override)?;
            return Ok(Some(ty.with_native(native)));
        }
        let Some(shape) = numeric_shape(name, &self.stored) else {
            return Ok(None);
        };
        let native = NativeRepr::resolve(&self.api_name, name, &shape.components, native_override)?;
        TypeDefinition::numeric_semantic(
            name,
            &Arc::new(scalar()),
            &shape.components,
            shape.config,
            &shape.defaults,
            native,
            &self.transformers,
        )
        .map(Some)
    }
}

/// Build one coordinate-aware builtin for a (local, stored) pair.
pub fn get_semantic_type(
    name: &str,
    api_name: &str,
    type_map: &TypeMap,
    local: &CoordinateSystemDef,
    stored: &CoordinateSystemDef,
) -> Result<Option<TypeDefinition>> {
    let config = CompilerConfig {
        api_name: api_name.to_string(),
        local: *local,
        stored: *stored,
        type_map: type_map.clone(),
    };
    SemanticCatalogue::new(&config)?.build(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NativeTypeOverride;
    use crate::coord::{AngularUnit, Axis, SpatialUnit};
    use crate::types::MetaType;

    fn scenario() -> CompilerConfig {
        CompilerConfig::with_systems(
            CoordinateSystemDef::new(Axis::PosY, Axis::PosX, Axis::NegZ, SpatialUnit::Meter, AngularUnit::Radian),
            CoordinateSystemDef::new(Axis::PosZ, Axis::PosY, Axis::PosX, SpatialUnit::Centimeter, AngularUnit::Degree),
        )
    }

    #[test]
    fn test_every_builtin_builds() {
        let catalogue = SemanticCatalogue::new(&scenario()).unwrap();
        for name in BUILTIN_TYPE_NAMES {
            let ty = catalogue.build(name).unwrap();
            assert_eq!(ty.map(|t| t.name().to_string()), Some(name.to_string()));
        }
        assert!(catalogue.build("Spaceship").unwrap().is_none());
        assert!(!is_builtin_type("Spaceship"));
    }

    #[test]
    fn test_boolean_set_value_differs_from_rest() {
        let prims = gen_primitive_types().unwrap();
        let boolean = prims.iter().find(|t| t.name() == "Boolean").unwrap();
        assert_eq!(boolean.meta_type(), MetaType::GetSet);
        assert_eq!(boolean.get_internal_default_value(), &Value::Bool(false));
        assert_eq!(boolean.get_set_default_value(), Some(&Value::Bool(true)));
        let count = prims.iter().find(|t| t.name() == "Count").unwrap();
        assert_eq!(count.get_set_default_value(), None);
    }

    #[test]
    fn test_primitive_subset() {
        let prims = gen_primitive_types().unwrap();
        assert_eq!(prims.len(), 12);
        let signal = prims.iter().find(|t| t.name() == "Signal").unwrap();
        assert_eq!(signal.meta_type(), MetaType::SignalData);
        assert!(prims.iter().all(|t| t.name() != "Vector3"));
    }

    #[test]
    fn test_quaternion_identity_survives_handedness_flip() {
        let catalogue = SemanticCatalogue::new(&scenario()).unwrap();
        let quat = catalogue.build("Quaternion").unwrap().unwrap();
        let xyzw = names(&["x", "y", "z", "w"]);
        let stored = quat
            .convert_value_from_local(&Value::from(vec![0.0, 0.0, 0.0, 1.0]))
            .unwrap();
        assert_eq!(stored, Value::floats(&xyzw, &[0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_vector3_scenario() {
        let v3 = get_semantic_type(
            "Vector3",
            "cpp",
            &TypeMap::new(),
            &scenario().local,
            &scenario().stored,
        )
        .unwrap()
        .unwrap();
        let stored = v3
            .convert_value_from_local(&Value::from(vec![0.0, 1.0, 0.0]))
            .unwrap();
        assert_eq!(stored, Value::floats(&names(&["x", "y", "z"]), &[0.0, 0.0, 100.0]));
    }

    #[test]
    fn test_defaults_are_neutral() {
        let catalogue = SemanticCatalogue::new(&CompilerConfig::default()).unwrap();
        let m = catalogue.build("Matrix4x4").unwrap().unwrap();
        let d = m.get_internal_default_value();
        assert_eq!(d.field("c0r0"), Some(&Value::Float(1.0)));
        assert_eq!(d.field("c3r3"), Some(&Value::Float(1.0)));
        assert_eq!(d.field("c3r0"), Some(&Value::Float(0.0)));
        assert_eq!(m.get_type_size().static_size, 64);

        let scale = catalogue.build("Scale3").unwrap().unwrap();
        assert_eq!(scale.get_internal_default_value().field("y"), Some(&Value::Float(1.0)));

        // Default stored forward is +Z.
        let fwd = catalogue.build("UnitVector3").unwrap().unwrap();
        assert_eq!(fwd.get_internal_default_value().field("z"), Some(&Value::Float(1.0)));
    }

    #[test]
    fn test_type_map_applies_to_builtins() {
        let config = scenario().map_type(
            "Quaternion",
            NativeTypeOverride::named("glm::quat").with_order(["w", "x", "y", "z"]),
        );
        let quat = SemanticCatalogue::new(&config)
            .unwrap()
            .build("Quaternion")
            .unwrap()
            .unwrap();
        assert_eq!(quat.native().type_name, "glm::quat");
        let local = quat.get_local_default_value().unwrap();
        assert_eq!(local, Value::floats(&names(&["w", "x", "y", "z"]), &[1.0, 0.0, 0.0, 0.0]));

        let bad = scenario().map_type("Quaternion", NativeTypeOverride::default().with_order(["w", "x"]));
        assert!(SemanticCatalogue::new(&bad).unwrap().build("Quaternion").is_err());
    }
}
