//! Dense state-vector replay of gate layers, for validating the sequential
//! path on small chains. Site 0 is the most significant digit, as in
//! [`MPS::to_dense`](tn::mps::MPS::to_dense).

use crate::error::{CircuitError, CircuitResult};
use crate::gate::Gate;
use crate::layer::GateLayer;
use faer::Mat;
use tn::mps::C64;
use tn::TnError;

/// Largest state vector the dense path will build.
pub const MAX_DENSE_DIM: usize = 1 << 22;
/// Largest matrix side [`layer_unitary`] will build.
pub const MAX_UNITARY_DIM: usize = 1 << 10;

fn dense_dim(layer: &GateLayer, max: usize) -> CircuitResult<usize> {
    match layer.d.checked_pow(layer.n_sites as u32) {
        Some(dim) if dim <= max => Ok(dim),
        other => Err(CircuitError::DenseTooLarge {
            dim: other.unwrap_or(usize::MAX),
            max,
        }),
    }
}

/// `gate` applied to a dense state of `n_sites` sites.
pub fn apply_gate_dense(state: &[C64], n_sites: usize, gate: &Gate) -> Vec<C64> {
    let d = gate.d;
    let k = gate.support.first_site();
    let w = gate.support.width();
    assert!(k + w <= n_sites, "gate outside the chain");

    let block = d.pow(w as u32);
    let inner = d.pow((n_sites - k - w) as u32);
    assert_eq!(state.len() % (block * inner), 0, "state length is not a power of d");
    let outer = state.len() / (block * inner);

    let zero = C64::new(0.0, 0.0);
    let mut out = vec![zero; state.len()];
    let mut buf = vec![zero; block];
    for o in 0..outer {
        for i in 0..inner {
            for (b, slot) in buf.iter_mut().enumerate() {
                *slot = state[(o * block + b) * inner + i];
            }
            for row in 0..block {
                let mut acc = zero;
                for (col, &v) in buf.iter().enumerate() {
                    acc += gate.matrix.read(row, col) * v;
                }
                out[(o * block + row) * inner + i] = acc;
            }
        }
    }
    out
}

fn run_dense(layer: &GateLayer, gates: &[Gate], state: &[C64]) -> CircuitResult<Vec<C64>> {
    let dim = dense_dim(layer, MAX_DENSE_DIM)?;
    if state.len() != dim {
        return Err(TnError::DenseLength {
            expected: dim,
            got: state.len(),
        }
        .into());
    }
    let mut psi = state.to_vec();
    for gate in gates {
        psi = apply_gate_dense(&psi, layer.n_sites, gate);
    }
    Ok(psi)
}

pub fn apply_layer_dense(layer: &GateLayer, state: &[C64]) -> CircuitResult<Vec<C64>> {
    run_dense(layer, &layer.circuit(), state)
}

pub fn apply_inverse_layer_dense(layer: &GateLayer, state: &[C64]) -> CircuitResult<Vec<C64>> {
    run_dense(layer, &layer.inverse_circuit(), state)
}

/// The full `d^L × d^L` unitary of `layer`.
///
/// Built column by column: basis state `j` is pushed through the gates with
/// [`apply_gate_dense`], so column `j` is its image. This gives the same
/// matrix as contracting the gates onto an identity operator and is the
/// only construction offered; it is limited to [`MAX_UNITARY_DIM`].
pub fn layer_unitary(layer: &GateLayer) -> CircuitResult<Mat<C64>> {
    let dim = dense_dim(layer, MAX_UNITARY_DIM)?;
    let gates = layer.circuit();

    let mut columns = Vec::with_capacity(dim);
    for j in 0..dim {
        let mut e = vec![C64::new(0.0, 0.0); dim];
        e[j] = C64::new(1.0, 0.0);
        for gate in &gates {
            e = apply_gate_dense(&e, layer.n_sites, gate);
        }
        columns.push(e);
    }
    Ok(Mat::from_fn(dim, dim, |i, j| columns[j][i]))
}
