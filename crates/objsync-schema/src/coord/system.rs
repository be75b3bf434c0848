// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Coordinate system definitions: axis assignment, units, handedness.

use crate::error::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed principal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "+X")]
    PosX,
    #[serde(rename = "-X")]
    NegX,
    #[serde(rename = "+Y")]
    PosY,
    #[serde(rename = "-Y")]
    NegY,
    #[serde(rename = "+Z")]
    PosZ,
    #[serde(rename = "-Z")]
    NegZ,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::PosX,
        Axis::NegX,
        Axis::PosY,
        Axis::NegY,
        Axis::PosZ,
        Axis::NegZ,
    ];

    /// Component index (X=0, Y=1, Z=2).
    pub const fn index(self) -> usize {
        match self {
            Axis::PosX | Axis::NegX => 0,
            Axis::PosY | Axis::NegY => 1,
            Axis::PosZ | Axis::NegZ => 2,
        }
    }

    /// +1 or -1.
    pub const fn sign(self) -> i8 {
        match self {
            Axis::PosX | Axis::PosY | Axis::PosZ => 1,
            Axis::NegX | Axis::NegY | Axis::NegZ => -1,
        }
    }

    /// Unit basis vector for this axis.
    pub fn unit_vector(self) -> [i32; 3] {
        let mut v = [0; 3];
        v[self.index()] = i32::from(self.sign());
        v
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.sign() > 0 { '+' } else { '-' };
        let name = ['X', 'Y', 'Z'][self.index()];
        write!(f, "{sign}{name}")
    }
}

/// Unit of spatial (length) quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpatialUnit {
    Meter,
    Centimeter,
}

/// Unit of angular quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngularUnit {
    Degree,
    Radian,
}

/// A 3D coordinate system: which signed axis is up/right/forward, plus units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordinateSystemDef {
    pub up: Axis,
    pub right: Axis,
    pub forward: Axis,
    pub spatial_unit: SpatialUnit,
    pub angular_unit: AngularUnit,
}

impl CoordinateSystemDef {
    pub const fn new(
        up: Axis,
        right: Axis,
        forward: Axis,
        spatial_unit: SpatialUnit,
        angular_unit: AngularUnit,
    ) -> Self {
        Self {
            up,
            right,
            forward,
            spatial_unit,
            angular_unit,
        }
    }

    /// Axes in logical order: up, right, forward.
    pub const fn logical_axes(&self) -> [Axis; 3] {
        [self.up, self.right, self.forward]
    }

    /// `sign(dot(cross(right, forward), up))`: +1 or -1 for a valid system,
    /// 0 when two logical axes share a component.
    pub fn handedness(&self) -> i32 {
        let r = self.right.unit_vector();
        let f = self.forward.unit_vector();
        let u = self.up.unit_vector();
        let cross = [
            r[1] * f[2] - r[2] * f[1],
            r[2] * f[0] - r[0] * f[2],
            r[0] * f[1] - r[1] * f[0],
        ];
        let dot = cross[0] * u[0] + cross[1] * u[1] + cross[2] * u[2];
        dot.signum()
    }

    /// Reject axis triples that do not span 3D space.
    pub fn validate(&self) -> Result<()> {
        if self.handedness() == 0 {
            return Err(SchemaError::InvalidCoordinateSystem(format!(
                "up={} right={} forward={} are not orthogonal",
                self.up, self.right, self.forward
            )));
        }
        Ok(())
    }

    /// Every orthogonal axis assignment with every unit combination.
    pub fn enumerate_all() -> Vec<CoordinateSystemDef> {
        let mut out = Vec::with_capacity(192);
        for up in Axis::ALL {
            for right in Axis::ALL {
                for forward in Axis::ALL {
                    for spatial_unit in [SpatialUnit::Meter, SpatialUnit::Centimeter] {
                        for angular_unit in [AngularUnit::Degree, AngularUnit::Radian] {
                            let sys =
                                Self::new(up, right, forward, spatial_unit, angular_unit);
                            if sys.handedness() != 0 {
                                out.push(sys);
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

impl Default for CoordinateSystemDef {
    /// Y-up, X-right, Z-forward, meters and radians.
    fn default() -> Self {
        Self::new(
            Axis::PosY,
            Axis::PosX,
            Axis::PosZ,
            SpatialUnit::Meter,
            AngularUnit::Radian,
        )
    }
}
