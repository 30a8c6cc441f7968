mod common;

use approx::assert_abs_diff_eq;
use circuit::{apply_layer, generate_unitaries, LayerStack, SynthesisConfig};
use common::{reference, trunc};
use quantum::states::{aklt_interpolated, ghz, random_mps};
use rng::ONDRng;

#[test]
fn last_layer_is_applied_first() {
    let mut rng = ONDRng::new(b"stack-order");
    let snapshots = [ghz(4), random_mps(4, 2, 2, &mut rng)];
    let config = SynthesisConfig::default();
    let stack = LayerStack::synthesize(&snapshots, &config).unwrap();
    assert_eq!(stack.len(), 2);

    let l0 = generate_unitaries(&snapshots[0], &config).unwrap();
    let l1 = generate_unitaries(&snapshots[1], &config).unwrap();
    let zero = reference(4, 2);
    let manual = apply_layer(&l0, &apply_layer(&l1, &zero, trunc()).unwrap(), trunc()).unwrap();

    let out = stack.apply(&zero, trunc()).unwrap();
    assert_abs_diff_eq!(out.normalized_overlap(&manual), 1.0, epsilon = 1e-9);

    let back = stack.apply_inverse(&out).unwrap();
    assert_abs_diff_eq!(back.normalized_overlap(&zero), 1.0, epsilon = 1e-9);
}

#[test]
fn pushed_layers_keep_order() {
    let config = SynthesisConfig::default();
    let mut stack = LayerStack::new();
    assert!(stack.is_empty());
    for s in [0.0, 0.5, 1.0] {
        stack.push(generate_unitaries(&aklt_interpolated(4, s), &config).unwrap());
    }

    let from_snapshots = LayerStack::synthesize(
        &[
            aklt_interpolated(4, 0.0),
            aklt_interpolated(4, 0.5),
            aklt_interpolated(4, 1.0),
        ],
        &config,
    )
    .unwrap();

    let zero = reference(4, 4);
    let a = stack.apply(&zero, trunc()).unwrap();
    let b = from_snapshots.apply(&zero, trunc()).unwrap();
    assert_abs_diff_eq!(a.normalized_overlap(&b), 1.0, epsilon = 1e-9);
}

#[test]
fn single_layer_stack_prepares_snapshot() {
    let psi = aklt_interpolated(5, 0.6);
    let stack = LayerStack::synthesize(std::slice::from_ref(&psi), &SynthesisConfig::default()).unwrap();
    let out = stack.apply(&reference(5, 4), trunc()).unwrap();
    assert_abs_diff_eq!(out.normalized_overlap(&psi), 1.0, epsilon = 1e-9);
}

#[test]
fn stats_per_layer() {
    let stack = LayerStack::synthesize(&[ghz(4), reference(3, 2)], &SynthesisConfig::default()).unwrap();
    let stats = stack.stats();
    assert_eq!(stats[0].segments, 1);
    assert_eq!(stats[0].gates, 4);
    assert_eq!(stats[0].two_site_gates, 3);
    assert_eq!(stats[0].depth, 4);
    assert_eq!(stats[1].segments, 3);
    assert_eq!(stats[1].depth, 1);
}

#[test]
fn empty_stack_is_identity() {
    let psi = ghz(3);
    let out = LayerStack::new().apply(&psi, trunc()).unwrap();
    assert_eq!(out.to_dense(), psi.to_dense());
}
