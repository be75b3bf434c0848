// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Change-bit partition across random collections and field lists.

use objsync_schema::reconciler::BindingConfig;
use objsync_schema::{
    CompilerConfig, DataModel, Direction, ReconcilerDefinition, SchemaError, StructSpec,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Collection with `state` polled fields and one message field in the middle.
fn collection(model: &mut DataModel, name: &str, state: usize) -> Arc<objsync_schema::TypeDefinition> {
    model
        .add_message_struct("Ping", StructSpec::new().field("seq", "Count"), 4)
        .unwrap();
    let mut spec = StructSpec::new();
    for i in 0..state {
        if i == state / 2 {
            spec = spec.field("ping", "Ping");
        }
        let ty = if i % 3 == 0 { "Vector3" } else { "Scalar" };
        spec = spec.field(format!("f{i}"), ty);
    }
    model.add_collection(name, spec, &[], 8).unwrap()
}

#[test]
fn test_bits_partition_state_fields() {
    let mut rng = fastrand::Rng::with_seed(7);
    for state in [1usize, 2, 5, 17, 63, 64] {
        let mut model = DataModel::new(CompilerConfig::default()).unwrap();
        let c = collection(&mut model, "Thing", state);
        let layout = c.struct_def().unwrap();

        let masks: Vec<u64> = (0..state)
            .map(|i| c.get_field_bit_mask(&format!("f{i}")))
            .collect();
        let distinct: BTreeSet<u64> = masks.iter().copied().collect();
        assert_eq!(distinct.len(), state);
        assert!(masks.iter().all(|m| m.is_power_of_two()));
        assert_eq!(c.get_field_bit_mask("ping"), 0);

        for _ in 0..20 {
            let listed: Vec<String> = (0..state)
                .filter(|_| rng.bool())
                .map(|i| format!("f{i}"))
                .collect();
            for direction in [Direction::Input, Direction::Output] {
                let r = ReconcilerDefinition::new(
                    c.clone(),
                    direction,
                    listed.clone(),
                    vec![],
                    BindingConfig::default(),
                )
                .unwrap();
                let inbound = r.get_inbound_change_bits();
                let outbound = r.get_outbound_change_bits();
                assert_eq!(inbound & outbound, 0);
                assert_eq!(inbound | outbound, layout.full_state_mask());

                for i in 0..state {
                    let f = format!("f{i}");
                    assert_ne!(r.is_inbound_field(&f), r.is_outbound_field(&f));
                }
            }
        }
    }
}

#[test]
fn test_input_and_output_mirror() {
    let mut model = DataModel::new(CompilerConfig::default()).unwrap();
    let c = collection(&mut model, "Thing", 6);
    let listed = vec!["f1".to_string(), "f4".to_string()];

    let input = ReconcilerDefinition::input(c.clone(), listed.clone(), vec![], BindingConfig::default())
        .unwrap();
    let output = ReconcilerDefinition::output(c, listed, vec![], BindingConfig::default()).unwrap();
    assert_eq!(input.get_inbound_change_bits(), output.get_outbound_change_bits());
    assert_eq!(input.get_outbound_change_bits(), output.get_inbound_change_bits());
}

#[test]
fn test_full_mask_at_capacity() {
    let mut model = DataModel::new(CompilerConfig::default()).unwrap();
    let c = collection(&mut model, "Wide", 64);
    assert_eq!(c.struct_def().unwrap().full_state_mask(), u64::MAX);
    assert_eq!(c.get_field_bit_mask("f63"), 1 << 63);

    let mut spec = StructSpec::new();
    for i in 0..65 {
        spec = spec.field(format!("f{i}"), "Boolean");
    }
    let err = model.add_collection("TooWide", spec, &[], 1).unwrap_err();
    assert!(matches!(err, SchemaError::TooManyStateFields { count: 65, .. }));
}
