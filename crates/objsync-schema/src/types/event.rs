// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Streamed field types: messages and signals.

use super::{MetaType, StructDef, TypeDefinition, TypeKind, TypeSize, WireKind};
use crate::value::Value;
use serde_json::json;

/// Event-style struct delivered per occurrence instead of at a fixed offset.
#[derive(Debug, Clone)]
pub struct MessageDef {
    pub fields: StructDef,
    /// Used for capacity planning only.
    pub expected_rate_per_second: u32,
}

impl MessageDef {
    pub(crate) fn hash_data(&self) -> serde_json::Value {
        json!({
            "fields": self.fields.hash_data(),
            "rate": self.expected_rate_per_second,
        })
    }
}

/// Raw byte stream, e.g. audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalDef {
    pub expected_bytes_per_second: u32,
}

impl SignalDef {
    pub(crate) fn hash_data(&self) -> serde_json::Value {
        json!({ "bytes_per_second": self.expected_bytes_per_second })
    }
}

impl TypeDefinition {
    pub fn message(name: impl Into<String>, fields: StructDef, expected_rate_per_second: u32) -> Self {
        let size = fields.size();
        let default = fields.default_value();
        Self::new(
            name,
            MetaType::MessageData,
            TypeKind::Message(MessageDef {
                fields,
                expected_rate_per_second,
            }),
            WireKind::Composite,
            size,
            default,
        )
    }

    pub fn signal(name: impl Into<String>, expected_bytes_per_second: u32) -> Self {
        Self::new(
            name,
            MetaType::SignalData,
            TypeKind::Signal(SignalDef {
                expected_bytes_per_second,
            }),
            WireKind::Stream,
            TypeSize::ZERO,
            Value::Bytes(Vec::new()),
        )
    }

    pub fn message_def(&self) -> Option<&MessageDef> {
        match &self.kind {
            TypeKind::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn signal_def(&self) -> Option<&SignalDef> {
        match &self.kind {
            TypeKind::Signal(s) => Some(s),
            _ => None,
        }
    }
}
