// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Remap tables: per-component source index, negation and unit multiplier.
//!
//! A table is computed once per (type, transformer) pair and then evaluated
//! either against concrete numbers ([`perform_semantic_conversion`]) or
//! against symbolic field references ([`gen_semantic_conversion`]).

use super::transformer::{CoordTransformer, UnitKind};
use crate::error::{Result, SchemaError};
use serde::{Deserialize, Serialize};

/// Coordinate semantics of a numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordTypeConfig {
    pub units: UnitKind,
    /// Magnitudes: permuted with the axes but never negated.
    #[serde(default)]
    pub is_scalar: bool,
    /// First three components are an x/y/z axis quantity.
    #[serde(default)]
    pub is_coords: bool,
    /// Column-major `[cols, rows]` matrix.
    #[serde(default)]
    pub coord_matrix_dims: Option<[usize; 2]>,
    /// Pseudovector: negate the axis components when handedness changes.
    #[serde(default)]
    pub flip_sign_with_handedness: bool,
}

impl CoordTypeConfig {
    pub const fn plain(units: UnitKind) -> Self {
        Self {
            units,
            is_scalar: false,
            is_coords: false,
            coord_matrix_dims: None,
            flip_sign_with_handedness: false,
        }
    }

    pub const fn coords(units: UnitKind) -> Self {
        Self {
            is_coords: true,
            ..Self::plain(units)
        }
    }

    pub const fn scalar(mut self) -> Self {
        self.is_scalar = true;
        self
    }

    pub const fn flip_with_handedness(mut self) -> Self {
        self.flip_sign_with_handedness = true;
        self
    }

    pub const fn matrix(cols: usize, rows: usize) -> Self {
        Self {
            coord_matrix_dims: Some([cols, rows]),
            ..Self::plain(UnitKind::None)
        }
    }
}

/// One destination component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemapElement {
    pub src_idx: usize,
    pub negate: bool,
    pub multiplier: f64,
}

/// Destination components in destination field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemapTable {
    pub elements: Vec<RemapElement>,
}

impl RemapTable {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True when every component copies straight through.
    pub fn is_passthrough(&self) -> bool {
        self.elements
            .iter()
            .enumerate()
            .all(|(i, e)| e.src_idx == i && !e.negate && e.multiplier == 1.0)
    }
}

/// Compute the remap table for `elem_count` components of a type with
/// `config` semantics.
///
/// Axis math indexes components by their position in `from_field_order`;
/// the result is laid out in `to_field_order`.
pub fn remap_coordinates(
    type_name: &str,
    config: &CoordTypeConfig,
    elem_count: usize,
    from_field_order: &[String],
    to_field_order: &[String],
    transformer: &CoordTransformer,
) -> Result<RemapTable> {
    let count_mismatch = |actual: usize| SchemaError::ComponentCountMismatch {
        type_name: type_name.to_string(),
        expected: elem_count,
        actual,
    };
    if from_field_order.len() != elem_count {
        return Err(count_mismatch(from_field_order.len()));
    }
    if to_field_order.len() != elem_count {
        return Err(count_mismatch(to_field_order.len()));
    }

    let multiplier = transformer.multiplier.for_units(config.units);
    let mut elems: Vec<RemapElement> = (0..elem_count)
        .map(|src_idx| RemapElement {
            src_idx,
            negate: false,
            multiplier,
        })
        .collect();

    if config.is_coords {
        if elem_count < 3 {
            return Err(count_mismatch(elem_count));
        }
        let orig = elems.clone();
        for (i, mapping) in transformer.axis_map.iter().enumerate() {
            let mut negate = !config.is_scalar && mapping.sign < 0;
            if config.flip_sign_with_handedness && transformer.handedness_flip {
                negate = !negate;
            }
            elems[i] = RemapElement {
                src_idx: orig[mapping.idx].src_idx,
                negate,
                multiplier,
            };
        }
    } else if let Some([cols, rows]) = config.coord_matrix_dims {
        if cols < 3 || rows < 3 || cols * rows != elem_count {
            return Err(count_mismatch(cols * rows));
        }

        // Whole columns first.
        let orig = elems.clone();
        for (col, mapping) in transformer.axis_map.iter().enumerate() {
            for row in 0..rows {
                let src = orig[mapping.idx * rows + row];
                elems[col * rows + row] = RemapElement {
                    negate: src.negate ^ (mapping.sign < 0),
                    ..src
                };
            }
        }

        // Then the three axis rows inside every column.
        let orig = elems.clone();
        for col in 0..cols {
            for (row, mapping) in transformer.axis_map.iter().enumerate() {
                let src = orig[col * rows + mapping.idx];
                elems[col * rows + row] = RemapElement {
                    negate: src.negate ^ (mapping.sign < 0),
                    ..src
                };
            }
        }

        if cols > 3 {
            for row in 0..3 {
                elems[3 * rows + row].multiplier = transformer.multiplier.spatial;
            }
        }
    }

    let mut out = Vec::with_capacity(elem_count);
    for name in to_field_order {
        let pos = from_field_order
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| SchemaError::FieldOrderMismatch {
                type_name: type_name.to_string(),
                field: name.clone(),
            })?;
        out.push(elems[pos]);
    }

    tracing::trace!(type_name, ?out, "remap table");
    Ok(RemapTable { elements: out })
}

/// Apply a remap table to concrete component values (negate, then multiply).
pub fn perform_semantic_conversion(table: &RemapTable, values: &[f64]) -> Result<Vec<f64>> {
    if values.len() != table.len() {
        return Err(SchemaError::ComponentCountMismatch {
            type_name: "value".into(),
            expected: table.len(),
            actual: values.len(),
        });
    }
    Ok(table
        .elements
        .iter()
        .map(|e| {
            let v = values[e.src_idx];
            let v = if e.negate { -v } else { v };
            v * e.multiplier
        })
        .collect())
}

/// Apply a remap table to symbolic source expressions, one per component.
pub fn gen_semantic_conversion(table: &RemapTable, sources: &[String]) -> Result<Vec<String>> {
    if sources.len() != table.len() {
        return Err(SchemaError::ComponentCountMismatch {
            type_name: "expression".into(),
            expected: table.len(),
            actual: sources.len(),
        });
    }
    Ok(table
        .elements
        .iter()
        .map(|e| {
            let base = &sources[e.src_idx];
            let term = if e.negate {
                format!("-{base}")
            } else {
                base.clone()
            };
            if e.multiplier == 1.0 {
                term
            } else {
                format!("{term} * {:?}", e.multiplier)
            }
        })
        .collect())
}
