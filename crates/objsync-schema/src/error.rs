// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema compilation errors.
//!
//! Every fault is synchronous and aborts compilation. Variants are grouped
//! into three kinds (see [`ErrorKind`]) so callers can report the violated
//! rule family without matching on every variant.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Family of a [`SchemaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Structural defect in the declarations themselves.
    Declaration,
    /// Coordinate conversion could not be planned.
    SemanticType,
    /// User-supplied configuration or default value is malformed.
    Configuration,
}

/// Errors raised while declaring or finalizing a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("type '{name}' is already declared with a different definition")]
    DuplicateType { name: String },

    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    #[error("type '{type_name}' has no field '{field}'")]
    UnknownField { type_name: String, field: String },

    #[error("field '{field}' is declared more than once in '{type_name}'")]
    DuplicateField { type_name: String, field: String },

    #[error(
        "field '{field}' of '{type_name}' uses {field_type} directly; wrap it in a reference type"
    )]
    IllegalFieldType {
        type_name: String,
        field: String,
        field_type: String,
    },

    #[error("type '{name}' is not an interface")]
    NotAnInterface { name: String },

    #[error("type '{name}' is not a collection")]
    NotACollection { name: String },

    #[error("type '{type_name}' has {count} state fields; a change bitmask holds at most {max}")]
    TooManyStateFields {
        type_name: String,
        count: usize,
        max: usize,
    },

    #[error("declaration '{name}' is empty: {reason}")]
    EmptyDeclaration { name: String, reason: String },

    #[error("type '{type_name}' exceeds the maximum wire size of {max} bytes")]
    SizeOverflow { type_name: String, max: u32 },

    #[error("field '{field}' of '{type_name}' is missing from the source field order")]
    FieldOrderMismatch { type_name: String, field: String },

    #[error("'{type_name}' expects {expected} numeric components, got {actual}")]
    ComponentCountMismatch {
        type_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("default value for '{type_name}' has {actual} elements, expected {expected}")]
    DefaultArity {
        type_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("value for '{type_name}' has the wrong shape: {reason}")]
    ValueShape { type_name: String, reason: String },

    #[error("invalid coordinate system: {0}")]
    InvalidCoordinateSystem(String),

    #[error("native field '{native}' of '{type_name}' is mapped from both '{first}' and '{second}'")]
    AliasedNativeField {
        type_name: String,
        native: String,
        first: String,
        second: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

impl SchemaError {
    /// Rule family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaError::DuplicateType { .. }
            | SchemaError::UnknownType { .. }
            | SchemaError::UnknownField { .. }
            | SchemaError::DuplicateField { .. }
            | SchemaError::IllegalFieldType { .. }
            | SchemaError::NotAnInterface { .. }
            | SchemaError::NotACollection { .. }
            | SchemaError::TooManyStateFields { .. }
            | SchemaError::EmptyDeclaration { .. }
            | SchemaError::SizeOverflow { .. } => ErrorKind::Declaration,
            SchemaError::FieldOrderMismatch { .. } | SchemaError::ComponentCountMismatch { .. } => {
                ErrorKind::SemanticType
            }
            SchemaError::DefaultArity { .. }
            | SchemaError::ValueShape { .. }
            | SchemaError::InvalidCoordinateSystem(_)
            | SchemaError::AliasedNativeField { .. }
            | SchemaError::Io(_)
            | SchemaError::Parse(_) => ErrorKind::Configuration,
        }
    }

    pub(crate) fn value_shape(type_name: &str, reason: impl Into<String>) -> Self {
        SchemaError::ValueShape {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn size_overflow(type_name: &str) -> Self {
        SchemaError::SizeOverflow {
            type_name: type_name.to_string(),
            max: crate::types::MAX_TYPE_SIZE,
        }
    }

    pub(crate) fn unknown_field(type_name: &str, field: &str) -> Self {
        SchemaError::UnknownField {
            type_name: type_name.to_string(),
            field: field.to_string(),
        }
    }
}

impl From<toml::de::Error> for SchemaError {
    fn from(err: toml::de::Error) -> Self {
        SchemaError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = SchemaError::DuplicateType {
            name: "Pose".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Declaration);
        assert_eq!(SchemaError::size_overflow("Blob").kind(), ErrorKind::Declaration);

        let err = SchemaError::FieldOrderMismatch {
            type_name: "Vector3".into(),
            field: "w".into(),
        };
        assert_eq!(err.kind(), ErrorKind::SemanticType);

        let err = SchemaError::DefaultArity {
            type_name: "Vector3".into(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_error_message_names_field() {
        let err = SchemaError::unknown_field("Player", "health");
        assert_eq!(err.to_string(), "type 'Player' has no field 'health'");
    }
}
