use quantum::{
    operators::{aklt_theta, spin, spin_dot},
    states::{aklt_spin1, bell_pairs, interpolated_bulk, random_mps, spin1_bulk},
    Hamiltonian, Mpo, TermSum,
};
use rng::ONDRng;
use tn::mps::{C64, MPS};

fn both(h: TermSum) -> [Hamiltonian; 2] {
    let mpo = Mpo::from_terms(&h);
    [Hamiltonian::Terms(h), Hamiltonian::Mpo(mpo)]
}

#[test]
fn spin_half_bell_pair_is_a_triplet() {
    let psi = bell_pairs(1);
    let mut h = TermSum::new(2, 2);
    h.add(0, spin_dot(2));

    for h in both(h) {
        let e = h.expectation(&psi);
        assert!((e - 0.25).abs() < 1e-12, "E = {}", e);
    }
}

#[test]
fn mpo_and_terms_agree_on_random_spin_one_chain() {
    let mut rng = ONDRng::new(b"energy-agree");
    let psi = random_mps(5, 3, 3, &mut rng);

    let mut h = TermSum::aklt(5, 0.7);
    let [_, _, sz] = spin(3);
    h.add(2, sz.clone());
    h.add(4, sz);

    let [terms, mpo] = both(h);
    let (et, em) = (terms.expectation(&psi), mpo.expectation(&psi));
    assert!((et - em).abs() < 1e-10, "terms = {}, mpo = {}", et, em);
}

#[test]
fn aklt_chain_energy_at_the_aklt_point() {
    // every bond sits in total spin 0 or 1, where S·S + (S·S)²/3 = -2/3
    let theta = aklt_theta();
    for n in [2, 4, 6] {
        let psi = aklt_spin1(n);
        let expected = -2.0 / 3.0 * theta.cos() * (n - 1) as f64;
        for h in both(TermSum::aklt(n, theta)) {
            let e = h.expectation(&psi);
            assert!((e - expected).abs() < 1e-10, "n = {}: E = {}, expected {}", n, e, expected);
        }
    }
}

#[test]
fn parent_hamiltonian_annihilates_interpolation_snapshots() {
    for s in [0.0, 0.3, 0.7, 1.0] {
        let bulk = interpolated_bulk(s);
        let psi = bulk.chain(6);
        for h in both(TermSum::parent(6, &bulk)) {
            let e = h.expectation(&psi);
            assert!(e.abs() < 1e-10, "s = {}: E = {}", s, e);
        }
    }
}

#[test]
fn parent_hamiltonian_of_spin_one_chain() {
    let bulk = spin1_bulk();
    let h = Hamiltonian::Mpo(Mpo::parent(5, &bulk));
    assert!(h.expectation(&aklt_spin1(5)).abs() < 1e-10);

    let mut rng = ONDRng::new(b"parent-excited");
    let other = random_mps(5, 3, 2, &mut rng);
    assert!(h.expectation(&other) > 1e-3);
}

#[test]
fn parent_energy_separates_snapshots() {
    let start = interpolated_bulk(0.0);
    let h = Hamiltonian::Terms(TermSum::parent(4, &start));
    assert!(h.expectation(&interpolated_bulk(1.0).chain(4)) > 1e-3);
}

#[test]
fn single_site_operator() {
    let psi = MPS::basis_state(&[2], 3);
    let [_, _, sz] = spin(3);
    let mut h = TermSum::new(1, 3);
    h.add(0, sz);

    for h in both(h) {
        let e = h.expectation(&psi);
        assert!((e + 1.0).abs() < 1e-12, "E = {}", e);
    }
}

#[test]
fn null_state_has_zero_energy() {
    let mut psi = aklt_spin1(3);
    psi.sites[1].scale(C64::new(0.0, 0.0));
    for h in both(TermSum::aklt(3, 0.2)) {
        assert_eq!(h.expectation(&psi), 0.0);
    }
}
