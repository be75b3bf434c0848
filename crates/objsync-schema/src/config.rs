// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiler configuration.
//!
//! Supports both programmatic and file-based configuration.

use crate::coord::CoordinateSystemDef;
use crate::error::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Native-type overrides, keyed by wire type name.
pub type TypeMap = BTreeMap<String, NativeTypeOverride>;

/// How one wire type is represented in the target language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTypeOverride {
    /// Native type name (defaults to the wire name).
    #[serde(default)]
    pub native_name: Option<String>,

    /// Wire field name -> native field name.
    #[serde(default)]
    pub field_map: BTreeMap<String, String>,

    /// Wire field names in native declaration order.
    #[serde(default)]
    pub field_order: Option<Vec<String>>,
}

impl NativeTypeOverride {
    pub fn named(native_name: impl Into<String>) -> Self {
        Self {
            native_name: Some(native_name.into()),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, wire: impl Into<String>, native: impl Into<String>) -> Self {
        self.field_map.insert(wire.into(), native.into());
        self
    }

    pub fn with_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    /// Checks that need no knowledge of the wire fields. The permutation
    /// check happens when the type is built.
    fn validate(&self, type_name: &str) -> Result<()> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for (wire, native) in &self.field_map {
            if let Some(first) = seen.insert(native.as_str(), wire.as_str()) {
                return Err(SchemaError::AliasedNativeField {
                    type_name: type_name.to_string(),
                    native: native.clone(),
                    first: first.to_string(),
                    second: wire.clone(),
                });
            }
        }
        if let Some(order) = &self.field_order {
            for (i, f) in order.iter().enumerate() {
                if order[..i].contains(f) {
                    return Err(SchemaError::DuplicateField {
                        type_name: type_name.to_string(),
                        field: f.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Compiler configuration: target API, coordinate systems and type map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Target language/API the native representations are for.
    #[serde(default = "default_api_name")]
    pub api_name: String,

    /// Coordinate system of the native side.
    #[serde(default)]
    pub local: CoordinateSystemDef,

    /// Coordinate system of the wire. Part of the schema hash.
    #[serde(default)]
    pub stored: CoordinateSystemDef,

    #[serde(default)]
    pub type_map: TypeMap,
}

fn default_api_name() -> String {
    "native".to_string()
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            api_name: default_api_name(),
            local: CoordinateSystemDef::default(),
            stored: CoordinateSystemDef::default(),
            type_map: TypeMap::new(),
        }
    }
}

impl CompilerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    pub fn with_systems(local: CoordinateSystemDef, stored: CoordinateSystemDef) -> Self {
        Self {
            local,
            stored,
            ..Default::default()
        }
    }

    /// Add a type override.
    pub fn map_type(mut self, wire_name: impl Into<String>, native: NativeTypeOverride) -> Self {
        self.type_map.insert(wire_name.into(), native);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.local.validate()?;
        self.stored.validate()?;
        for (type_name, native) in &self.type_map {
            native.validate(type_name)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for CompilerConfig {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
