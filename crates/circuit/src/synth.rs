//! Staircase synthesis of a gate layer from a matrix product state.

use crate::config::SynthesisConfig;
use crate::error::{CircuitError, CircuitResult};
use crate::gate::{Gate, GateRole, GateSupport};
use crate::layer::{GateLayer, SegmentGates};
use crate::segment::{segments, Segment};
use faer::Mat;
use tn::linalg::{adjoint, conj, null_space, psd_eigen, select_columns, unitarity_deviation};
use tn::mps::{Tensor3, C64, MPS};
use tracing::{debug, warn};

/// Eigenvalues of `K·K†` between the isometry threshold and this value are
/// neither clearly kept nor clearly dropped.
const AMBIGUOUS_EIGENVALUE: f64 = 1e-6;

/// Builds the gate layer that maps `|0…0⟩` onto `psi / ‖psi‖`.
///
/// `psi` is left untouched: a private copy is brought into normalized
/// right-canonical form, cut into segments, and every segment is turned
/// into a staircase of unitaries whose leading rows are the site tensors.
/// Bonds smaller than the local dimension are zero-padded; larger ones are
/// rejected. Every gate is checked for unitarity before it is returned.
pub fn generate_unitaries(psi: &MPS, config: &SynthesisConfig) -> CircuitResult<GateLayer> {
    if psi.is_empty() {
        return Err(CircuitError::EmptyChain);
    }
    psi.validate()?;

    let d = psi.sites[0].dp;
    for (site, t) in psi.sites.iter().enumerate() {
        if t.dp != d {
            return Err(CircuitError::PhysicalDimMismatch {
                site,
                expected: d,
                got: t.dp,
            });
        }
    }

    let mut work = psi.clone();
    let norm = work.right_canonicalize(config.canonical, true);
    if !(norm > 0.0 && norm.is_finite()) {
        return Err(CircuitError::ZeroNorm);
    }

    for (site, t) in work.sites.iter().enumerate() {
        let bond = t.dl.max(t.dr);
        if bond > d {
            return Err(CircuitError::BondTooLarge { site, bond, d });
        }
    }

    let segs = segments(&work)?;
    let mut layer = Vec::with_capacity(segs.len());
    for seg in segs {
        layer.push(synthesize_segment(&work, seg, d, config)?);
    }

    Ok(GateLayer {
        n_sites: work.len(),
        d,
        segments: layer,
    })
}

fn synthesize_segment(
    psi: &MPS,
    seg: Segment,
    d: usize,
    config: &SynthesisConfig,
) -> CircuitResult<SegmentGates> {
    let mut gates = Vec::with_capacity(seg.len());
    let mut isometries = Vec::with_capacity(seg.len());
    let mut kernels = Vec::with_capacity(seg.len());

    for site in seg.sites() {
        let t = &psi.sites[site];
        let role = if seg.is_single() {
            GateRole::Single
        } else if site == seg.start {
            GateRole::First
        } else if site == seg.end {
            GateRole::Last
        } else {
            GateRole::Interior
        };

        let (gate, kernel) = match role {
            GateRole::Single | GateRole::Last => (one_site_gate(t, site, role, d, config)?, None),
            GateRole::First => {
                let (g, k) = opening_gate(t, site, d, config)?;
                (g, Some(k))
            }
            GateRole::Interior => {
                let (g, k) = interior_gate(t, site, d, config)?;
                (g, Some(k))
            }
        };

        let (row, col) = unitarity_deviation(&gate.matrix);
        if !(row < config.unitarity_tol && col < config.unitarity_tol) {
            return Err(CircuitError::NonUnitaryGate {
                start: seg.start,
                end: seg.end,
                site,
                row,
                col,
            });
        }

        isometries.push(
            kernel
                .as_ref()
                .map(|k| isometry(k, site, config.isometry_threshold)),
        );
        kernels.push(kernel);
        gates.push(gate);
    }

    debug!(
        start = seg.start,
        end = seg.end,
        gates = gates.len(),
        "synthesized segment"
    );

    Ok(SegmentGates {
        segment: seg,
        gates,
        isometries,
        kernels,
    })
}

/// Site tensor as a `dl × (d·d)` matrix with the right bond padded to `d`.
fn padded_rows(t: &Tensor3, d: usize) -> Mat<C64> {
    Mat::from_fn(t.dl, d * d, |l, c| {
        let (p, r) = (c / d, c % d);
        if r < t.dr {
            t.get(l, p, r)
        } else {
            C64::new(0.0, 0.0)
        }
    })
}

/// Orthonormal completion of the rows of `a`, checked for the expected size.
fn completion(a: &Mat<C64>, site: usize, config: &SynthesisConfig) -> CircuitResult<Mat<C64>> {
    let k = null_space(&conj(a), config.null_rcond);
    let expected = a.ncols() - a.nrows();
    if k.ncols() != expected {
        return Err(CircuitError::KernelDimension {
            site,
            expected,
            found: k.ncols(),
        });
    }
    Ok(k)
}

/// Closing gate of a segment, or the only gate of a length-1 segment: the
/// `dl` rows of the site tensor followed by their completion.
fn one_site_gate(
    t: &Tensor3,
    site: usize,
    role: GateRole,
    d: usize,
    config: &SynthesisConfig,
) -> CircuitResult<Gate> {
    let a = t.left_matrix();
    let k = completion(&a, site, config)?;

    let w = Mat::from_fn(d, d, |row, col| {
        if row < t.dl {
            a.read(row, col)
        } else {
            k.read(col, row - t.dl)
        }
    });
    Ok(Gate::from_rows(GateSupport::Site(site), role, d, &w))
}

/// Opening gate: row `(0, 0)` is the flattened site tensor, the remaining
/// rows take the completion in row order.
fn opening_gate(
    t: &Tensor3,
    site: usize,
    d: usize,
    config: &SynthesisConfig,
) -> CircuitResult<(Gate, Mat<C64>)> {
    let a = padded_rows(t, d);
    let k = completion(&a, site, config)?;

    let w = Mat::from_fn(d * d, d * d, |row, col| {
        if row == 0 {
            a.read(0, col)
        } else {
            k.read(col, row - 1)
        }
    });
    Ok((
        Gate::from_rows(GateSupport::Pair(site), GateRole::First, d, &w),
        k,
    ))
}

/// Interior gate: rows `(0, l)` hold the site tensor, the rest take the
/// phase-normalized completion. Unused bond rows `(0, l ≥ dl)` come first,
/// then `(1 + c2, c1)` with `c1` outer and `c2` inner.
fn interior_gate(
    t: &Tensor3,
    site: usize,
    d: usize,
    config: &SynthesisConfig,
) -> CircuitResult<(Gate, Mat<C64>)> {
    let a = padded_rows(t, d);
    let mut k = completion(&a, site, config)?;
    normalize_phases(&mut k);

    let mut order: Vec<usize> = (t.dl..d).collect();
    for c1 in 0..d {
        for c2 in 0..d - 1 {
            order.push((1 + c2) * d + c1);
        }
    }

    let mut w = Mat::<C64>::zeros(d * d, d * d);
    for l in 0..t.dl {
        for col in 0..d * d {
            w.write(l, col, a.read(l, col));
        }
    }
    for (m, &row) in order.iter().enumerate() {
        for col in 0..d * d {
            w.write(row, col, k.read(col, m));
        }
    }

    Ok((
        Gate::from_rows(GateSupport::Pair(site), GateRole::Interior, d, &w),
        k,
    ))
}

/// Rotates each column so that its first entry is real and non-negative.
fn normalize_phases(k: &mut Mat<C64>) {
    for j in 0..k.ncols() {
        let c0 = k.read(0, j);
        if c0.norm() == 0.0 {
            continue;
        }
        let phase = C64::from_polar(1.0, -c0.arg());
        for i in 0..k.nrows() {
            let v = k.read(i, j) * phase;
            k.write(i, j, v);
        }
    }
}

/// Orthonormal basis of the range of `K·K†`, from the eigenvectors whose
/// eigenvalue exceeds `threshold`.
fn isometry(k: &Mat<C64>, site: usize, threshold: f64) -> Mat<C64> {
    let h = k * &adjoint(k);
    let (values, vectors) = psd_eigen(&h);

    let mut keep = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        if v > threshold {
            if v <= AMBIGUOUS_EIGENVALUE {
                warn!(
                    site,
                    eigenvalue = v,
                    threshold,
                    "ambiguous eigenvalue while extracting isometry"
                );
            }
            keep.push(i);
        }
    }
    select_columns(&vectors, &keep)
}
