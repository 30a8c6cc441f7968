use crate::error::{CircuitError, CircuitResult};
use crate::gate::Gate;
use crate::segment::Segment;
use faer::Mat;
use tn::linalg::unitarity_deviation;
use tn::mps::C64;

/// Gates of one segment in site order, with the synthesis byproducts.
///
/// `isometries[i]` and `kernels[i]` belong to `gates[i]`; they are `None`
/// for one-site gates.
#[derive(Clone, Debug)]
pub struct SegmentGates {
    pub segment: Segment,
    pub gates: Vec<Gate>,
    pub isometries: Vec<Option<Mat<C64>>>,
    pub kernels: Vec<Option<Mat<C64>>>,
}

/// One circuit layer: the gates of every segment of a single snapshot.
#[derive(Clone, Debug)]
pub struct GateLayer {
    pub n_sites: usize,
    pub d: usize,
    pub segments: Vec<SegmentGates>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerStats {
    pub segments: usize,
    pub gates: usize,
    pub two_site_gates: usize,
    /// Gates in the longest staircase.
    pub depth: usize,
}

impl GateLayer {
    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.segments.iter().flat_map(|s| s.gates.iter())
    }

    /// Gates in application order.
    pub fn circuit(&self) -> Vec<Gate> {
        self.gates().cloned().collect()
    }

    /// Adjoint gates in application order: every staircase is undone from
    /// its last site back to its first.
    pub fn inverse_circuit(&self) -> Vec<Gate> {
        self.segments
            .iter()
            .flat_map(|s| s.gates.iter().rev().map(Gate::adjoint))
            .collect()
    }

    pub fn stats(&self) -> LayerStats {
        LayerStats {
            segments: self.segments.len(),
            gates: self.gates().count(),
            two_site_gates: self.gates().filter(|g| g.is_two_site()).count(),
            depth: self.segments.iter().map(|s| s.gates.len()).max().unwrap_or(0),
        }
    }

    /// Largest Frobenius deviation from unitarity over all gates; fails on
    /// the first gate at or above `tol`.
    pub fn check_unitarity(&self, tol: f64) -> CircuitResult<f64> {
        let mut worst: f64 = 0.0;
        for seg in &self.segments {
            for gate in &seg.gates {
                let (row, col) = unitarity_deviation(&gate.matrix);
                if !(row < tol && col < tol) {
                    return Err(CircuitError::NonUnitaryGate {
                        start: seg.segment.start,
                        end: seg.segment.end,
                        site: gate.support.first_site(),
                        row,
                        col,
                    });
                }
                worst = worst.max(row).max(col);
            }
        }
        Ok(worst)
    }
}
