#![allow(dead_code)]

use tn::mps::{C64, MPS};
use tn::truncation::Truncation;

pub fn trunc() -> Truncation {
    Truncation {
        max_bond: 64,
        cutoff: 1e-12,
    }
}

pub fn reference(n: usize, d: usize) -> MPS {
    MPS::basis_state(&vec![0; n], d)
}

pub fn max_diff(a: &[C64], b: &[C64]) -> f64 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y).norm()).fold(0.0, f64::max)
}

/// `|⟨a|b⟩| / (‖a‖·‖b‖)` for dense vectors.
pub fn dense_fidelity(a: &[C64], b: &[C64]) -> f64 {
    let mut dot = C64::new(0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        dot += x.conj() * y;
    }
    let na: f64 = a.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
    let nb: f64 = b.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
    dot.norm() / (na * nb)
}
