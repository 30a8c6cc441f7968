//! Local spin operators for any local dimension.
//!
//! Basis level `k` of a `d`-level site is the spin projection
//! `m = j − k` with `j = (d − 1)/2`, so level 0 is the highest weight state.

use faer::Mat;
use tn::linalg::kron;
use tn::mps::C64;

/// `(S^x, S^y, S^z)` for spin `(d − 1)/2`.
pub fn spin(d: usize) -> [Mat<C64>; 3] {
    assert!(d >= 2, "spin operators need at least two levels");
    let j = (d as f64 - 1.0) / 2.0;
    let m = |k: usize| j - k as f64;

    // ⟨m + 1|S⁺|m⟩ sits at (k − 1, k)
    let raise = |row: usize, col: usize| -> f64 {
        if col == row + 1 {
            let mk = m(col);
            (j * (j + 1.0) - mk * (mk + 1.0)).sqrt()
        } else {
            0.0
        }
    };

    let sx = Mat::from_fn(d, d, |r, c| C64::new(0.5 * (raise(r, c) + raise(c, r)), 0.0));
    let sy = Mat::from_fn(d, d, |r, c| C64::new(0.0, -0.5 * (raise(r, c) - raise(c, r))));
    let sz = Mat::from_fn(d, d, |r, c| C64::new(if r == c { m(r) } else { 0.0 }, 0.0));
    [sx, sy, sz]
}

/// Two-site Heisenberg coupling `S·S = Σ_a S^a ⊗ S^a`.
pub fn spin_dot(d: usize) -> Mat<C64> {
    let s = spin(d);
    let mut out = Mat::zeros(d * d, d * d);
    for a in &s {
        out = &out + &kron(a, a);
    }
    out
}

/// Angle of the AKLT point of the bilinear-biquadratic chain,
/// `tan θ = 1/3`.
pub fn aklt_theta() -> f64 {
    (1.0_f64 / 3.0).atan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn::linalg::{adjoint, frobenius_norm};

    #[test]
    fn spin_one_commutator() {
        let [sx, sy, sz] = spin(3);
        // [Sx, Sy] = i Sz
        let comm = &(&sx * &sy) - &(&sy * &sx);
        let isz = Mat::from_fn(3, 3, |r, c| C64::new(0.0, 1.0) * sz.read(r, c));
        assert!(frobenius_norm(&(&comm - &isz)) < 1e-12);
    }

    #[test]
    fn casimir_is_j_times_j_plus_one() {
        for d in [2, 3, 4] {
            let j = (d as f64 - 1.0) / 2.0;
            let s = spin(d);
            let mut cas = Mat::<C64>::zeros(d, d);
            for a in &s {
                assert!(frobenius_norm(&(a - &adjoint(a))) < 1e-14, "spin operator must be Hermitian");
                cas = &cas + &(a * a);
            }
            for r in 0..d {
                for c in 0..d {
                    let expected = if r == c { j * (j + 1.0) } else { 0.0 };
                    assert!((cas.read(r, c) - C64::new(expected, 0.0)).norm() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn spin_half_matches_pauli_over_two() {
        let [sx, sy, sz] = spin(2);
        assert!((sx.read(0, 1) - C64::new(0.5, 0.0)).norm() < 1e-14);
        assert!((sy.read(0, 1) - C64::new(0.0, -0.5)).norm() < 1e-14);
        assert!((sz.read(1, 1) - C64::new(-0.5, 0.0)).norm() < 1e-14);
    }
}
