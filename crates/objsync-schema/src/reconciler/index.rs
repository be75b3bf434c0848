// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Index declarations of a reconciler.

use serde::{Deserialize, Serialize};

/// A queryable field, optionally bound 1:1 to instances of an external class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub index_field_name: String,

    #[serde(default)]
    pub bound_class_name: Option<String>,
}

impl IndexConfig {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            index_field_name: field.into(),
            bound_class_name: None,
        }
    }

    #[must_use]
    pub fn bound_to(mut self, class_name: impl Into<String>) -> Self {
        self.bound_class_name = Some(class_name.into());
        self
    }

    pub fn is_bound(&self) -> bool {
        self.bound_class_name.is_some()
    }
}
