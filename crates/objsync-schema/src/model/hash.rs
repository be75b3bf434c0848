// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema hash: the wire-compatibility version check.

use super::DataModel;
use crate::error::Result;
use serde::{Serialize, Serializer};
use std::fmt;

/// MD5 digest over the stored coordinate system and every type's structural
/// fingerprint, in type-name order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaHash(pub [u8; 16]);

impl SchemaHash {
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SchemaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for SchemaHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl DataModel {
    /// Deterministic digest; equal digests mean wire-compatible schemas.
    pub fn get_hash(&self) -> Result<SchemaHash> {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(serde_json::to_vec(&self.config.stored)?);
        // by_name iterates in name order, independent of declaration order.
        for id in self.by_name.values() {
            let data = self.types[id.index()].get_hash_data();
            hasher.update(serde_json::to_vec(&data)?);
        }
        let result = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&result);
        Ok(SchemaHash(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_display() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0xab;
        bytes[15] = 0x01;
        let h = SchemaHash(bytes);
        assert_eq!(h.to_hex(), "ab000000000000000000000000000001");
        assert_eq!(serde_json::to_string(&h).unwrap(), "\"ab000000000000000000000000000001\"");
    }
}
