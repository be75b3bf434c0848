// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Axis and unit transformer between two coordinate systems.

use super::system::{AngularUnit, CoordinateSystemDef, SpatialUnit};
use crate::error::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Which unit multiplier a quantity scales by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Angular,
    Spatial,
    None,
}

/// Scale factors between units.
pub trait UnitScale {
    fn spatial(&self, from: SpatialUnit, to: SpatialUnit) -> f64;
    fn angular(&self, from: AngularUnit, to: AngularUnit) -> f64;
}

/// SI length and angle conversions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardUnits;

impl UnitScale for StandardUnits {
    fn spatial(&self, from: SpatialUnit, to: SpatialUnit) -> f64 {
        match (from, to) {
            (SpatialUnit::Meter, SpatialUnit::Centimeter) => 100.0,
            (SpatialUnit::Centimeter, SpatialUnit::Meter) => 0.01,
            _ => 1.0,
        }
    }

    fn angular(&self, from: AngularUnit, to: AngularUnit) -> f64 {
        match (from, to) {
            (AngularUnit::Radian, AngularUnit::Degree) => 180.0 / PI,
            (AngularUnit::Degree, AngularUnit::Radian) => PI / 180.0,
            _ => 1.0,
        }
    }
}

/// Multipliers applied per [`UnitKind`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitMultipliers {
    pub angular: f64,
    pub spatial: f64,
    pub none: f64,
}

impl UnitMultipliers {
    pub fn for_units(&self, units: UnitKind) -> f64 {
        match units {
            UnitKind::Angular => self.angular,
            UnitKind::Spatial => self.spatial,
            UnitKind::None => self.none,
        }
    }
}

/// Destination component `i` takes source component `idx`, times `sign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisMapping {
    pub idx: usize,
    pub sign: i8,
}

/// Precomputed conversion from one coordinate system to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoordTransformer {
    pub multiplier: UnitMultipliers,
    pub axis_map: [AxisMapping; 3],
    pub handedness_flip: bool,
}

impl CoordTransformer {
    /// Transformer that changes nothing.
    pub const fn identity() -> Self {
        Self {
            multiplier: UnitMultipliers {
                angular: 1.0,
                spatial: 1.0,
                none: 1.0,
            },
            axis_map: [
                AxisMapping { idx: 0, sign: 1 },
                AxisMapping { idx: 1, sign: 1 },
                AxisMapping { idx: 2, sign: 1 },
            ],
            handedness_flip: false,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

/// Build the transformer taking values expressed in `from` to `to`.
///
/// For each logical axis (up, right, forward) the destination component
/// `to.axis.index()` reads source component `from.axis.index()` with the
/// product of both signs.
pub fn build_coord_transformer(
    from: &CoordinateSystemDef,
    to: &CoordinateSystemDef,
    units: &dyn UnitScale,
) -> Result<CoordTransformer> {
    from.validate()?;
    to.validate()?;

    let mut axis_map = [AxisMapping { idx: 0, sign: 1 }; 3];
    for (src, dst) in from.logical_axes().into_iter().zip(to.logical_axes()) {
        axis_map[dst.index()] = AxisMapping {
            idx: src.index(),
            sign: src.sign() * dst.sign(),
        };
    }

    let mut seen = [false; 3];
    for m in &axis_map {
        seen[m.idx] = true;
    }
    if seen.contains(&false) {
        return Err(SchemaError::InvalidCoordinateSystem(
            "axis map does not cover all three components".into(),
        ));
    }

    Ok(CoordTransformer {
        multiplier: UnitMultipliers {
            angular: units.angular(from.angular_unit, to.angular_unit),
            spatial: units.spatial(from.spatial_unit, to.spatial_unit),
            none: 1.0,
        },
        axis_map,
        handedness_flip: from.handedness() != to.handedness(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::system::Axis;

    fn local() -> CoordinateSystemDef {
        CoordinateSystemDef::new(
            Axis::PosY,
            Axis::PosX,
            Axis::NegZ,
            SpatialUnit::Meter,
            AngularUnit::Radian,
        )
    }

    fn stored() -> CoordinateSystemDef {
        CoordinateSystemDef::new(
            Axis::PosZ,
            Axis::PosY,
            Axis::PosX,
            SpatialUnit::Centimeter,
            AngularUnit::Degree,
        )
    }

    #[test]
    fn test_same_system_is_identity() {
        let t = build_coord_transformer(&local(), &local(), &StandardUnits).unwrap();
        assert!(t.is_identity());
    }

    #[test]
    fn test_axis_map_composition() {
        let t = build_coord_transformer(&local(), &stored(), &StandardUnits).unwrap();
        // stored X (forward) <- -local Z
        assert_eq!(t.axis_map[0], AxisMapping { idx: 2, sign: -1 });
        // stored Y (right) <- local X
        assert_eq!(t.axis_map[1], AxisMapping { idx: 0, sign: 1 });
        // stored Z (up) <- local Y
        assert_eq!(t.axis_map[2], AxisMapping { idx: 1, sign: 1 });
        assert!(t.handedness_flip);
        assert_eq!(t.multiplier.spatial, 100.0);
        assert!((t.multiplier.angular - 57.295_779_513_082_32).abs() < 1e-12);
        assert_eq!(t.multiplier.none, 1.0);
    }

    #[test]
    fn test_invalid_system_rejected() {
        let mut bad = local();
        bad.forward = Axis::NegY;
        assert!(build_coord_transformer(&bad, &stored(), &StandardUnits).is_err());
    }
}
