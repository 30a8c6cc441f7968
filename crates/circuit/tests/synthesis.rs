mod common;

use approx::assert_abs_diff_eq;
use circuit::{
    apply_layer, generate_unitaries, segments, CircuitError, GateRole, GateSupport,
    SynthesisConfig,
};
use common::{reference, trunc};
use quantum::states::{aklt_interpolated, aklt_spin1, bell_pairs, ghz, random_mps};
use rng::ONDRng;
use tn::mps::{Tensor3, C64, MPS};
use tn::truncation::Truncation;
use tn::TnError;

#[test]
fn product_state_gives_diagonal_phase_gates() {
    let psi = reference(3, 2);
    let layer = generate_unitaries(&psi, &SynthesisConfig::default()).unwrap();

    let segs: Vec<_> = layer.segments.iter().map(|s| (s.segment.start, s.segment.end)).collect();
    assert_eq!(segs, vec![(0, 0), (1, 1), (2, 2)]);

    for gate in layer.gates() {
        assert_eq!(gate.role, GateRole::Single);
        for i in 0..2 {
            for j in 0..2 {
                let v = gate.matrix.read(i, j);
                if i == j {
                    assert_abs_diff_eq!(v.norm(), 1.0, epsilon = 1e-12);
                } else {
                    assert_abs_diff_eq!(v.norm(), 0.0, epsilon = 1e-12);
                }
            }
        }
    }

    let out = apply_layer(&layer, &psi, trunc()).unwrap();
    assert_abs_diff_eq!(out.normalized_overlap(&psi), 1.0, epsilon = 1e-12);
}

#[test]
fn bell_pair_is_one_segment_and_is_reproduced() {
    let bell = bell_pairs(1);
    assert_eq!(segments(&bell).unwrap().len(), 1);

    let layer = generate_unitaries(&bell, &SynthesisConfig::default()).unwrap();
    assert_eq!(layer.segments.len(), 1);
    assert_eq!(layer.segments[0].segment.start, 0);
    assert_eq!(layer.segments[0].segment.end, 1);

    let roles: Vec<_> = layer.gates().map(|g| g.role).collect();
    assert_eq!(roles, vec![GateRole::First, GateRole::Last]);

    let out = apply_layer(&layer, &reference(2, 2), trunc()).unwrap();
    assert_abs_diff_eq!(out.normalized_overlap(&bell), 1.0, epsilon = 1e-10);
}

#[test]
fn single_site_chain() {
    let site = Tensor3::from_fn(1, 2, 1, |_, p, _| C64::new(0.6 * (1 - p) as f64, 0.8 * p as f64));
    let psi = MPS::from_sites(vec![site]).unwrap();

    let layer = generate_unitaries(&psi, &SynthesisConfig::default()).unwrap();
    assert_eq!(layer.segments.len(), 1);
    assert_eq!(layer.segments[0].gates.len(), 1);
    assert_eq!(layer.segments[0].gates[0].support, GateSupport::Site(0));
    assert!(layer.segments[0].isometries[0].is_none());

    let out = apply_layer(&layer, &reference(1, 2), trunc()).unwrap();
    assert_abs_diff_eq!(out.normalized_overlap(&psi), 1.0, epsilon = 1e-12);
}

#[test]
fn every_gate_is_unitary() {
    let mut rng = ONDRng::new(b"unitarity");
    let targets = [
        random_mps(6, 2, 2, &mut rng),
        ghz(5),
        aklt_spin1(5),
        aklt_interpolated(5, 0.4),
    ];
    for psi in &targets {
        let layer = generate_unitaries(psi, &SynthesisConfig::default()).unwrap();
        let worst = layer.check_unitarity(1e-10).unwrap();
        assert!(worst < 1e-10, "worst deviation {}", worst);
    }
}

#[test]
fn gates_carry_site_tensors_on_reference_inputs() {
    let mut rng = ONDRng::new(b"leg-order");
    let psi = random_mps(5, 2, 2, &mut rng);
    let layer = generate_unitaries(&psi, &SynthesisConfig::default()).unwrap();

    let mut canonical = psi.clone();
    canonical.right_canonicalize(Truncation::exact(), true);

    for gate in layer.gates() {
        let k = gate.support.first_site();
        let a = &canonical.sites[k];
        match gate.support {
            GateSupport::Pair(_) => {
                for l in 0..a.dl {
                    for p in 0..2 {
                        for r in 0..a.dr {
                            let u = gate.element(&[p, r], &[l, 0]);
                            assert!(
                                (u - a.get(l, p, r)).norm() < 1e-10,
                                "site {}: U[({},{}),({},0)] = {} vs {}",
                                k,
                                p,
                                r,
                                l,
                                u,
                                a.get(l, p, r)
                            );
                        }
                    }
                }
            }
            GateSupport::Site(_) => {
                for l in 0..a.dl {
                    for p in 0..2 {
                        let u = gate.element(&[p], &[l]);
                        assert!((u - a.get(l, p, 0)).norm() < 1e-10);
                    }
                }
            }
        }
    }
}

#[test]
fn kernels_and_isometries_are_kept_for_two_site_gates() {
    let layer = generate_unitaries(&ghz(4), &SynthesisConfig::default()).unwrap();
    let seg = &layer.segments[0];

    for (gate, (iso, kernel)) in seg.gates.iter().zip(seg.isometries.iter().zip(&seg.kernels)) {
        match gate.role {
            GateRole::First => {
                assert_eq!(kernel.as_ref().map(|k| k.ncols()), Some(3));
                assert_eq!(iso.as_ref().map(|m| m.ncols()), Some(3));
            }
            GateRole::Interior => {
                assert_eq!(kernel.as_ref().map(|k| k.ncols()), Some(2));
                assert_eq!(iso.as_ref().map(|m| m.ncols()), Some(2));
            }
            _ => {
                assert!(kernel.is_none() && iso.is_none());
            }
        }
    }
}

#[test]
fn layer_stats() {
    let mut sites = bell_pairs(1).sites;
    sites.push(Tensor3::from_fn(1, 2, 1, |_, p, _| C64::new(p as f64, 0.0)));
    sites.extend(ghz(3).sites);
    let psi = MPS::from_sites(sites).unwrap();

    let stats = generate_unitaries(&psi, &SynthesisConfig::default())
        .unwrap()
        .stats();
    assert_eq!(stats.segments, 3);
    assert_eq!(stats.gates, 6);
    assert_eq!(stats.two_site_gates, 3);
    assert_eq!(stats.depth, 3);
}

#[test]
fn rejects_bond_larger_than_local_dimension() {
    let mut rng = ONDRng::new(b"too-large");
    let psi = random_mps(6, 2, 4, &mut rng);
    assert!(matches!(
        generate_unitaries(&psi, &SynthesisConfig::default()),
        Err(CircuitError::BondTooLarge { d: 2, .. })
    ));
}

#[test]
fn rejects_unterminated_segment() {
    let psi = MPS {
        sites: vec![Tensor3::zeros(1, 2, 2), Tensor3::zeros(1, 2, 1)],
    };
    assert!(matches!(
        segments(&psi),
        Err(CircuitError::UnterminatedSegment { start: 0 })
    ));
    assert!(matches!(
        generate_unitaries(&psi, &SynthesisConfig::default()),
        Err(CircuitError::Tn(TnError::BondMismatch { site: 0, .. }))
    ));
}

#[test]
fn rejects_degenerate_inputs() {
    let zero = MPS {
        sites: vec![Tensor3::zeros(1, 2, 1), Tensor3::zeros(1, 2, 1)],
    };
    assert!(matches!(
        generate_unitaries(&zero, &SynthesisConfig::default()),
        Err(CircuitError::ZeroNorm)
    ));

    let mixed = MPS::from_sites(vec![Tensor3::zeros(1, 2, 1), Tensor3::zeros(1, 3, 1)]).unwrap();
    assert!(matches!(
        generate_unitaries(&mixed, &SynthesisConfig::default()),
        Err(CircuitError::PhysicalDimMismatch {
            site: 1,
            expected: 2,
            got: 3
        })
    ));

    assert!(matches!(
        generate_unitaries(&MPS { sites: vec![] }, &SynthesisConfig::default()),
        Err(CircuitError::EmptyChain)
    ));
}

#[test]
fn small_norm_input_keeps_its_bonds() {
    let mut rng = ONDRng::new(b"small-norm");
    let target = random_mps(6, 2, 2, &mut rng);
    let mut small = target.clone();
    for t in small.sites.iter_mut() {
        t.scale(C64::new(1e-4, 0.0));
    }

    let layer = generate_unitaries(&small, &SynthesisConfig::default()).unwrap();
    assert_eq!(layer.stats().segments, 1);

    let prepared = apply_layer(&layer, &reference(6, 2), trunc()).unwrap();
    assert_abs_diff_eq!(prepared.normalized_overlap(&target), 1.0, epsilon = 1e-9);
}

#[test]
fn check_unitarity_names_the_corrupted_gate() {
    let mut layer = generate_unitaries(&ghz(4), &SynthesisConfig::default()).unwrap();
    assert!(layer.check_unitarity(1e-10).unwrap() < 1e-10);

    let gate = &mut layer.segments[0].gates[2];
    assert_eq!(gate.role, GateRole::Interior);
    let v = gate.matrix.read(0, 0);
    gate.matrix.write(0, 0, v * 2.0 + C64::new(0.5, 0.0));

    match layer.check_unitarity(1e-10) {
        Err(CircuitError::NonUnitaryGate {
            start,
            end,
            site,
            row,
            col,
        }) => {
            assert_eq!((start, end, site), (0, 3, 2));
            assert!(row > 1e-3 && col > 1e-3);
        }
        other => panic!("expected NonUnitaryGate, got {:?}", other),
    }
}

#[test]
fn zero_unitarity_tolerance_fails_on_first_gate() {
    let config = SynthesisConfig {
        unitarity_tol: 0.0,
        ..SynthesisConfig::default()
    };
    assert!(matches!(
        generate_unitaries(&bell_pairs(2), &config),
        Err(CircuitError::NonUnitaryGate {
            start: 0,
            end: 1,
            site: 0,
            ..
        })
    ));
}

#[test]
fn oversized_null_space_tolerance_is_reported() {
    // rcond above 1 treats every singular value as zero, so the kernel is
    // the full column space.
    let config = SynthesisConfig {
        null_rcond: Some(2.0),
        ..SynthesisConfig::default()
    };
    assert!(matches!(
        generate_unitaries(&bell_pairs(1), &config),
        Err(CircuitError::KernelDimension {
            site: 0,
            expected: 3,
            found: 4
        })
    ));
}
