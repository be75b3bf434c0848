// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Numeric semantic types: homogeneous float components with coordinate
//! meaning (vectors, rotations, matrices). Conversions go through remap
//! tables instead of a field-by-field copy.

use super::{FieldDef, MetaType, NativeRepr, StructDef, TypeDefinition, TypeKind, WireKind};
use crate::coord::{
    build_coord_transformer, gen_semantic_conversion, perform_semantic_conversion,
    remap_coordinates, CoordTransformer, CoordTypeConfig, CoordinateSystemDef, RemapTable,
    UnitScale,
};
use crate::error::{Result, SchemaError};
use crate::value::Value;
use serde_json::json;
use std::sync::Arc;

/// Transformers for one (local, stored) pair, built once per model.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransformerPair {
    pub to_stored: CoordTransformer,
    pub to_local: CoordTransformer,
}

impl TransformerPair {
    pub fn new(
        local: &CoordinateSystemDef,
        stored: &CoordinateSystemDef,
        units: &dyn UnitScale,
    ) -> Result<Self> {
        Ok(Self {
            to_stored: build_coord_transformer(local, stored, units)?,
            to_local: build_coord_transformer(stored, local, units)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NumericSemanticDef {
    pub fields: StructDef,
    pub config: CoordTypeConfig,
    /// Local (wire-ordered) -> stored (wire-ordered).
    pub from_local_table: RemapTable,
    /// Stored (wire-ordered) -> local (native-ordered).
    pub to_local_table: RemapTable,
}

impl NumericSemanticDef {
    fn is_single(&self) -> bool {
        self.fields.len() == 1
    }

    fn components(&self, owner: &str, order: &[String], value: &Value, mapped: &NativeRepr) -> Result<Vec<f64>> {
        let wire_names = self.fields.field_names();
        let count_err = |actual| SchemaError::DefaultArity {
            type_name: owner.to_string(),
            expected: wire_names.len(),
            actual,
        };
        let mut out: Vec<f64> = self
            .fields
            .all_fields()
            .iter()
            .map(|f| f.default.as_f64().unwrap_or_default())
            .collect();
        match value {
            v if self.is_single() && v.as_f64().is_some() => {
                out[0] = v.as_f64().unwrap_or_default();
            }
            Value::Array(items) => {
                if items.len() != order.len() {
                    return Err(count_err(items.len()));
                }
                for (name, item) in order.iter().zip(items) {
                    let idx = wire_names
                        .iter()
                        .position(|w| w == name)
                        .ok_or_else(|| SchemaError::unknown_field(owner, name))?;
                    out[idx] = item.as_f64().ok_or_else(|| {
                        SchemaError::value_shape(owner, format!("component '{name}' is {}", item.shape()))
                    })?;
                }
            }
            Value::Struct(named) => {
                for (name, item) in named {
                    let idx = wire_names
                        .iter()
                        .position(|w| mapped.mappings.to_native(w) == name)
                        .ok_or_else(|| SchemaError::unknown_field(owner, name))?;
                    out[idx] = item.as_f64().ok_or_else(|| {
                        SchemaError::value_shape(owner, format!("component '{name}' is {}", item.shape()))
                    })?;
                }
            }
            other => {
                return Err(SchemaError::value_shape(
                    owner,
                    format!("expected numeric components, got {}", other.shape()),
                ))
            }
        }
        Ok(out)
    }

    pub(crate) fn from_local(&self, owner: &str, native: &NativeRepr, value: &Value) -> Result<Value> {
        let local = self.components(owner, &native.field_order, value, native)?;
        let stored = perform_semantic_conversion(&self.from_local_table, &local)?;
        Ok(Value::floats(&self.fields.field_names(), &stored))
    }

    pub(crate) fn to_local(&self, owner: &str, native: &NativeRepr, wire: &Value) -> Result<Value> {
        let wire_names = self.fields.field_names();
        let stored = self.components(owner, &wire_names, wire, &NativeRepr::named("", owner, &wire_names))?;
        let local = perform_semantic_conversion(&self.to_local_table, &stored)?;
        if self.is_single() {
            return Ok(Value::Float(local[0]));
        }
        Ok(Value::floats(&native.native_field_names(), &local))
    }

    pub(crate) fn hash_data(&self) -> serde_json::Value {
        json!({
            "components": self.fields.hash_data(),
            "config": self.config,
        })
    }
}

impl TypeDefinition {
    /// Build a numeric semantic type. `defaults` are stored-space values in
    /// wire order.
    pub(crate) fn numeric_semantic(
        name: &str,
        component: &Arc<TypeDefinition>,
        components: &[String],
        config: CoordTypeConfig,
        defaults: &[f64],
        native: NativeRepr,
        transformers: &TransformerPair,
    ) -> Result<Self> {
        if defaults.len() != components.len() {
            return Err(SchemaError::DefaultArity {
                type_name: name.to_string(),
                expected: components.len(),
                actual: defaults.len(),
            });
        }
        let fields = StructDef::new(
            name,
            components
                .iter()
                .zip(defaults)
                .map(|(c, d)| {
                    let mut f = FieldDef::new(c.as_str(), component.clone());
                    f.default = Value::Float(*d);
                    f
                })
                .collect(),
        )?;
        let n = components.len();
        let from_local_table =
            remap_coordinates(name, &config, n, components, components, &transformers.to_stored)?;
        let to_local_table = remap_coordinates(
            name,
            &config,
            n,
            components,
            &native.field_order,
            &transformers.to_local,
        )?;
        let size = fields.size();
        let default = fields.default_value();
        Ok(Self::new(
            name,
            MetaType::Struct,
            TypeKind::NumericSemantic(NumericSemanticDef {
                fields,
                config,
                from_local_table,
                to_local_table,
            }),
            WireKind::Composite,
            size,
            default,
        )
        .with_native(native))
    }

    pub fn numeric_def(&self) -> Option<&NumericSemanticDef> {
        match &self.kind {
            TypeKind::NumericSemantic(n) => Some(n),
            _ => None,
        }
    }

    /// Expressions computing each wire component (wire order) from the
    /// native value `var`.
    pub fn gen_conversion_from_local(&self, var: &str) -> Result<Vec<String>> {
        let Some(n) = self.numeric_def() else {
            return Ok(self.copy_exprs(var, true));
        };
        let sources: Vec<String> = if n.is_single() {
            vec![var.to_string()]
        } else {
            n.fields
                .field_names()
                .iter()
                .map(|w| format!("{var}.{}", self.native.mappings.to_native(w)))
                .collect()
        };
        gen_semantic_conversion(&n.from_local_table, &sources)
    }

    /// Expressions computing each native component (native order) from the
    /// wire value `var`.
    pub fn gen_conversion_to_local(&self, var: &str) -> Result<Vec<String>> {
        let Some(n) = self.numeric_def() else {
            return Ok(self.copy_exprs(var, false));
        };
        let sources: Vec<String> = n
            .fields
            .field_names()
            .iter()
            .map(|w| format!("{var}.{w}"))
            .collect();
        gen_semantic_conversion(&n.to_local_table, &sources)
    }

    fn copy_exprs(&self, var: &str, from_local: bool) -> Vec<String> {
        match self.struct_def() {
            None => vec![var.to_string()],
            Some(s) => s
                .field_names()
                .iter()
                .map(|w| {
                    let src = if from_local { self.native.mappings.to_native(w) } else { w.as_str() };
                    format!("{var}.{src}")
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{AngularUnit, Axis, SpatialUnit, StandardUnits, UnitKind};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn pair() -> TransformerPair {
        let local = CoordinateSystemDef::new(Axis::PosY, Axis::PosX, Axis::NegZ, SpatialUnit::Meter, AngularUnit::Radian);
        let stored = CoordinateSystemDef::new(Axis::PosZ, Axis::PosY, Axis::PosX, SpatialUnit::Centimeter, AngularUnit::Degree);
        TransformerPair::new(&local, &stored, &StandardUnits).unwrap()
    }

    fn scalar() -> Arc<TypeDefinition> {
        Arc::new(TypeDefinition::primitive("Scalar", WireKind::F32, Value::Float(0.0)))
    }

    #[test]
    fn test_vector_converts_both_ways() {
        let xyz = names(&["x", "y", "z"]);
        let ty = TypeDefinition::numeric_semantic(
            "Vector3",
            &scalar(),
            &xyz,
            CoordTypeConfig::coords(UnitKind::Spatial),
            &[0.0; 3],
            NativeRepr::named("cpp", "Vector3", &xyz),
            &pair(),
        )
        .unwrap();
        let stored = ty
            .convert_value_from_local(&Value::from(vec![0.0, 1.0, 0.0]))
            .unwrap();
        assert_eq!(stored, Value::floats(&xyz, &[0.0, 0.0, 100.0]));
        let back = ty.convert_value_to_local(&stored).unwrap();
        assert_eq!(back, Value::floats(&xyz, &[0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_native_order_and_names() {
        let wire = names(&["x", "y", "z", "w"]);
        let mut native = NativeRepr::named("cpp", "quat", &wire);
        native.field_order = names(&["w", "x", "y", "z"]);
        let ty = TypeDefinition::numeric_semantic(
            "Quaternion",
            &scalar(),
            &wire,
            CoordTypeConfig::coords(UnitKind::None).flip_with_handedness(),
            &[0.0, 0.0, 0.0, 1.0],
            native,
            &pair(),
        )
        .unwrap();
        // Positional input follows native order: w first.
        let stored = ty
            .convert_value_from_local(&Value::from(vec![1.0, 0.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(stored, Value::floats(&wire, &[0.0, 0.0, 0.0, 1.0]));
        let local = ty.get_local_default_value().unwrap();
        assert_eq!(local, Value::floats(&names(&["w", "x", "y", "z"]), &[1.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_single_component_is_bare_float() {
        let v = names(&["value"]);
        let ty = TypeDefinition::numeric_semantic(
            "Angle",
            &scalar(),
            &v,
            CoordTypeConfig::plain(UnitKind::Angular).scalar(),
            &[0.0],
            NativeRepr::named("cpp", "Angle", &v),
            &pair(),
        )
        .unwrap();
        let stored = ty
            .convert_value_from_local(&Value::Float(std::f64::consts::PI))
            .unwrap();
        let deg = stored.field("value").and_then(Value::as_f64).unwrap();
        assert!((deg - 180.0).abs() < 1e-9);
        let back = ty.convert_value_to_local(&stored).unwrap().as_f64().unwrap();
        assert!((back - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(ty.gen_conversion_from_local("a").unwrap().len(), 1);
    }

    #[test]
    fn test_gen_conversion_uses_native_names() {
        let xyz = names(&["x", "y", "z"]);
        let map = [("x".to_string(), "X".to_string())].into_iter().collect();
        let native = NativeRepr {
            api_name: "cpp".into(),
            type_name: "Vec3".into(),
            field_order: xyz.clone(),
            mappings: crate::coord::get_field_mappings("Vector3", &xyz, &map).unwrap(),
        };
        let ty = TypeDefinition::numeric_semantic(
            "Vector3",
            &scalar(),
            &xyz,
            CoordTypeConfig::coords(UnitKind::Spatial),
            &[0.0; 3],
            native,
            &pair(),
        )
        .unwrap();
        let exprs = ty.gen_conversion_from_local("v").unwrap();
        assert_eq!(exprs.len(), 3);
        assert!(exprs.iter().any(|e| e.contains("v.X")));
        assert!(exprs.iter().all(|e| !e.contains("v.x")));
    }
}
