use crate::env::mpo_sandwich;
use crate::hamiltonian::{Hamiltonian, Mpo, TermSum};
use tn::mps::MPS;
use tn::truncation::Truncation;

impl Hamiltonian {
    /// `⟨ψ|H|ψ⟩ / ⟨ψ|ψ⟩`, zero for the null state.
    pub fn expectation(&self, psi: &MPS) -> f64 {
        match self {
            Hamiltonian::Mpo(h) => energy_mpo(psi, h),
            Hamiltonian::Terms(h) => energy_terms(psi, h),
        }
    }
}

/// Expectation value of an MPO Hamiltonian.
pub fn energy_mpo(psi: &MPS, h: &Mpo) -> f64 {
    let denom = psi.overlap(psi).re;
    if denom == 0.0 {
        return 0.0;
    }
    mpo_sandwich(psi, h).re / denom
}

/// Expectation value of a term list: every term is applied to a private
/// copy of the state and overlapped with the original. Two-site terms are
/// applied through an exact SVD split.
pub fn energy_terms(psi: &MPS, h: &TermSum) -> f64 {
    assert_eq!(psi.len(), h.n_sites, "state/Hamiltonian length mismatch");
    let denom = psi.overlap(psi).re;
    if denom == 0.0 {
        return 0.0;
    }

    let mut e = 0.0;
    for term in &h.terms {
        let mut psi_op = psi.clone();
        match term.width {
            1 => psi_op.apply_1q(term.site, &term.op),
            _ => psi_op.apply_2q_svd(term.site, &term.op, Truncation::exact()),
        }
        e += psi.overlap(&psi_op).re / denom;
    }
    e
}
