// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared-buffer sizing for the runtime.
//!
//! Both figures are conservative over-estimates. Messages are buffered for
//! 100 ms; every live object may have a create and an update in flight.

use super::DataModel;
use crate::types::{StructDef, TypeDefinition, TypeKind};

pub const MESSAGE_EVENT_HEADER_SIZE: u64 = 36;
pub const SIGNAL_PACKET_HEADER_SIZE: u64 = 16;
pub const CHANGE_EVENT_HEADER_SIZE: u64 = 36;
/// Signal packets assumed per buffering window.
const SIGNAL_PACKETS_PER_WINDOW: u64 = 100;
/// 1 / 10 s.
const WINDOWS_PER_SECOND: f64 = 10.0;

/// Bytes buffered per object for every streamed field of `fields`, nested
/// structs included.
fn stream_bytes(fields: &StructDef) -> f64 {
    fields
        .all_fields()
        .iter()
        .map(|f| field_stream_bytes(&f.ty))
        .sum()
}

fn field_stream_bytes(ty: &TypeDefinition) -> f64 {
    match ty.kind() {
        TypeKind::Message(m) => {
            let per_event = ty.get_type_size().total() + MESSAGE_EVENT_HEADER_SIZE;
            (per_event * u64::from(m.expected_rate_per_second)) as f64 / WINDOWS_PER_SECOND
        }
        TypeKind::Signal(s) => {
            let headers = SIGNAL_PACKETS_PER_WINDOW
                * (MESSAGE_EVENT_HEADER_SIZE + SIGNAL_PACKET_HEADER_SIZE);
            (headers + u64::from(s.expected_bytes_per_second)) as f64 / WINDOWS_PER_SECOND
        }
        TypeKind::Struct(s) => stream_bytes(s),
        TypeKind::FixedArray(a) => stream_bytes(&a.fields),
        _ => 0.0,
    }
}

impl DataModel {
    /// Message pool bytes: per collection, `max_count` objects each
    /// buffering every streamed field for one window.
    pub fn calc_message_pool_size(&self) -> u64 {
        let total: f64 = self
            .get_collections()
            .iter()
            .filter_map(|c| {
                let max = c.max_count()?;
                Some(stream_bytes(c.struct_def()?) * f64::from(max))
            })
            .sum();
        total.ceil() as u64
    }

    /// Change log bytes: the message pool plus two change events per object.
    pub fn calc_changelog_size(&self) -> u64 {
        let changes: u64 = self
            .get_collections()
            .iter()
            .map(|c| {
                let max = u64::from(c.max_count().unwrap_or(0));
                2 * max * (c.get_type_size().total() + CHANGE_EVENT_HEADER_SIZE)
            })
            .sum();
        self.calc_message_pool_size() + changes
    }
}
