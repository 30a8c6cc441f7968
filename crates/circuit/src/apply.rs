//! Sequential replay of a gate layer on an MPS.

use crate::error::{CircuitError, CircuitResult};
use crate::gate::{Gate, GateSupport};
use crate::layer::GateLayer;
use tn::mps::MPS;
use tn::truncation::Truncation;
use tracing::debug;

/// Applies `layer` to a copy of `psi` and compresses the result into
/// right-canonical form under `trunc`.
///
/// Two-site gates are merged, applied and re-split without truncation, so
/// `trunc` only acts in the final compression.
pub fn apply_layer(layer: &GateLayer, psi: &MPS, trunc: Truncation) -> CircuitResult<MPS> {
    run(layer, &layer.circuit(), psi, trunc)
}

/// Undoes [`apply_layer`]: adjoint gates, each staircase in reverse.
///
/// The result is only re-canonicalized with [`Truncation::exact`], so no
/// weight is dropped and the inverse stays exact whatever budget the
/// forward pass used.
pub fn apply_inverse_layer(layer: &GateLayer, psi: &MPS) -> CircuitResult<MPS> {
    run(layer, &layer.inverse_circuit(), psi, Truncation::exact())
}

fn check_state(layer: &GateLayer, psi: &MPS) -> CircuitResult<()> {
    if psi.len() != layer.n_sites {
        return Err(CircuitError::LayerSizeMismatch {
            layer: layer.n_sites,
            state: psi.len(),
        });
    }
    psi.validate()?;
    for (site, t) in psi.sites.iter().enumerate() {
        if t.dp != layer.d {
            return Err(CircuitError::PhysicalDimMismatch {
                site,
                expected: layer.d,
                got: t.dp,
            });
        }
    }
    Ok(())
}

fn run(layer: &GateLayer, gates: &[Gate], psi: &MPS, trunc: Truncation) -> CircuitResult<MPS> {
    check_state(layer, psi)?;

    let mut out = psi.clone();
    for gate in gates {
        match gate.support {
            GateSupport::Site(k) => out.apply_1q(k, &gate.matrix),
            GateSupport::Pair(k) => out.apply_2q_svd(k, &gate.matrix, Truncation::exact()),
        }
    }
    let discarded = out.compress(trunc);
    debug!(
        gates = gates.len(),
        max_bond = out.max_bond(),
        discarded,
        "applied gate layer"
    );
    Ok(out)
}
