//! Matrix product states used as synthesis targets.
//!
//! Constructors return unnormalized chains where normalization is not free;
//! circuit synthesis normalizes its own copy.

use rng::ONDRng;
use std::f64::consts::FRAC_1_SQRT_2;
use tn::mps::{Tensor3, C64, MPS};

fn c(re: f64) -> C64 {
    C64::new(re, 0.0)
}

/// Qubit chain of `n_pairs` disjoint Bell pairs `(|00⟩ + |11⟩)/√2` on
/// sites `(2k, 2k+1)`.
pub fn bell_pairs(n_pairs: usize) -> MPS {
    let mut sites = Vec::with_capacity(2 * n_pairs);
    for _ in 0..n_pairs {
        sites.push(Tensor3::from_fn(1, 2, 2, |_, p, r| {
            if p == r {
                c(FRAC_1_SQRT_2)
            } else {
                c(0.0)
            }
        }));
        sites.push(Tensor3::from_fn(2, 2, 1, |l, p, _| if l == p { c(1.0) } else { c(0.0) }));
    }
    MPS { sites }
}

/// `(|0…0⟩ + |1…1⟩)/√2` on `n ≥ 2` qubits.
pub fn ghz(n: usize) -> MPS {
    assert!(n >= 2, "GHZ state needs at least two qubits");
    let sites = (0..n)
        .map(|k| {
            if k == 0 {
                Tensor3::from_fn(1, 2, 2, |_, p, r| if p == r { c(FRAC_1_SQRT_2) } else { c(0.0) })
            } else if k == n - 1 {
                Tensor3::from_fn(2, 2, 1, |l, p, _| if l == p { c(1.0) } else { c(0.0) })
            } else {
                Tensor3::from_fn(2, 2, 2, |l, p, r| if l == p && p == r { c(1.0) } else { c(0.0) })
            }
        })
        .collect();
    MPS { sites }
}

/// Principal square root of the singlet `√½ [[0, −1], [1, 0]]`, a rotation
/// by π/4 scaled by 2^(−1/4).
fn singlet_sqrt() -> [[f64; 2]; 2] {
    let a = 2.0_f64.powf(-0.25) * FRAC_1_SQRT_2;
    [[a, -a], [a, a]]
}

/// Projector onto the symmetric (triplet) subspace of two spin-½,
/// indexed `[(x, y)][(a, b)]` with composite index `2x + y`.
fn triplet_projector() -> [[f64; 4]; 4] {
    let mut p = [[0.0; 4]; 4];
    p[0][0] = 1.0;
    p[3][3] = 1.0;
    for i in [1, 2] {
        for j in [1, 2] {
            p[i][j] = 0.5;
        }
    }
    p
}

/// Isometry from the triplet subspace onto spin-1 levels `m = 0, 1, 2`.
fn triplet_isometry() -> [[f64; 3]; 4] {
    let mut iso = [[0.0; 3]; 4];
    iso[0][0] = 1.0;
    iso[1][1] = FRAC_1_SQRT_2;
    iso[2][1] = FRAC_1_SQRT_2;
    iso[3][2] = 1.0;
    iso
}

/// Translation-invariant bulk tensor `Q[l][r][p]` of an open chain.
#[derive(Clone, Debug)]
pub struct Bulk {
    pub chi: usize,
    pub d: usize,
    data: Vec<C64>,
}

impl Bulk {
    pub fn from_fn(chi: usize, d: usize, f: impl Fn(usize, usize, usize) -> C64) -> Self {
        let mut data = Vec::with_capacity(chi * chi * d);
        for l in 0..chi {
            for r in 0..chi {
                for p in 0..d {
                    data.push(f(l, r, p));
                }
            }
        }
        Self { chi, d, data }
    }

    #[inline]
    pub fn get(&self, l: usize, r: usize, p: usize) -> C64 {
        self.data[(l * self.chi + r) * self.d + p]
    }

    /// `n`-site chain; the open ends keep the `l = 0` row and the `r = 0`
    /// column.
    pub fn chain(&self, n: usize) -> MPS {
        assert!(n > 0, "chain needs at least one site");
        let sites = (0..n)
            .map(|k| {
                let dl = if k == 0 { 1 } else { self.chi };
                let dr = if k == n - 1 { 1 } else { self.chi };
                Tensor3::from_fn(dl, self.d, dr, |l, p, r| self.get(l, r, p))
            })
            .collect();
        MPS { sites }
    }
}

/// Bulk AKLT tensor in the two-spin-½-per-site representation, with
/// `p = 2a + b`.
fn aklt_pair_tensor() -> [[[f64; 4]; 2]; 2] {
    let s = singlet_sqrt();
    let proj = triplet_projector();
    let mut q = [[[0.0; 4]; 2]; 2];
    for l in 0..2 {
        for r in 0..2 {
            for p in 0..4 {
                let mut acc = 0.0;
                for x in 0..2 {
                    for y in 0..2 {
                        acc += proj[2 * x + y][p] * s[l][x] * s[y][r];
                    }
                }
                q[l][r][p] = acc;
            }
        }
    }
    q
}

/// `Q(s) = (1 − s)·I + s·Q_aklt`: the Bell-pair chain at `s = 0`, the AKLT
/// state at `s = 1`. Local dimension 4, bond 2.
pub fn interpolated_bulk(s: f64) -> Bulk {
    let q_aklt = aklt_pair_tensor();
    Bulk::from_fn(2, 4, |l, r, p| {
        let id = if p == 2 * l + r { 1.0 } else { 0.0 };
        c((1.0 - s) * id + s * q_aklt[l][r][p])
    })
}

/// Spin-1 AKLT bulk tensor, local dimension 3, bond 2.
pub fn spin1_bulk() -> Bulk {
    let s = singlet_sqrt();
    let iso = triplet_isometry();
    Bulk::from_fn(2, 3, |l, r, m| {
        let mut acc = 0.0;
        for x in 0..2 {
            for y in 0..2 {
                acc += s[l][x] * iso[2 * x + y][m] * s[y][r];
            }
        }
        c(acc)
    })
}

pub fn aklt_interpolated(n: usize, s: f64) -> MPS {
    interpolated_bulk(s).chain(n)
}

/// Chain of Bell pairs shared between neighbouring sites, each site
/// holding the two spin-½ ends `(left, right)`.
pub fn bell_pair_chain(n: usize) -> MPS {
    aklt_interpolated(n, 0.0)
}

pub fn aklt_spin1(n: usize) -> MPS {
    spin1_bulk().chain(n)
}

/// Random complex-normal MPS. Bond `k` gets `min(bond, d^k, d^(n−k))`.
pub fn random_mps(n: usize, d: usize, bond: usize, rng: &mut ONDRng) -> MPS {
    assert!(n > 0 && d > 1 && bond > 0, "invalid random MPS shape");

    let bond_dim = |k: usize| -> usize {
        if k == 0 || k == n {
            return 1;
        }
        bond.min(d.saturating_pow(k as u32))
            .min(d.saturating_pow((n - k) as u32))
    };

    let sites = (0..n)
        .map(|k| {
            let mut t = Tensor3::zeros(bond_dim(k), d, bond_dim(k + 1));
            for v in t.data.iter_mut() {
                *v = rng.next_c64(b"MPS_ENTRY");
            }
            t
        })
        .collect();
    MPS { sites }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singlet_sqrt_squares_to_singlet() {
        let s = singlet_sqrt();
        let mut sq = [[0.0; 2]; 2];
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    sq[i][j] += s[i][k] * s[k][j];
                }
            }
        }
        let h = FRAC_1_SQRT_2;
        let singlet = [[0.0, -h], [h, 0.0]];
        for i in 0..2 {
            for j in 0..2 {
                assert!((sq[i][j] - singlet[i][j]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn projector_is_idempotent() {
        let p = triplet_projector();
        for i in 0..4 {
            for j in 0..4 {
                let mut acc = 0.0;
                for k in 0..4 {
                    acc += p[i][k] * p[k][j];
                }
                assert!((acc - p[i][j]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn isometry_spans_triplet() {
        let iso = triplet_isometry();
        let p = triplet_projector();
        for i in 0..4 {
            for j in 0..4 {
                let mut acc = 0.0;
                for m in 0..3 {
                    acc += iso[i][m] * iso[j][m];
                }
                assert!((acc - p[i][j]).abs() < 1e-14);
            }
        }
    }
}
