//! Gates and their leg-order contract.
//!
//! Every gate matrix has rows as outputs and columns as inputs. A two-site
//! gate on sites `(k, k+1)` uses the composite index `q_k · d + q_{k+1}` on
//! both sides, the same convention as [`MPS::apply_2q_svd`].
//!
//! The legs of a staircase gate carry different meanings on each side:
//!
//! | leg               | two-site gate                 | one-site gate          |
//! |-------------------|-------------------------------|------------------------|
//! | input, site `k`   | incoming bond `l`             | incoming bond `l`      |
//! | input, site `k+1` | ancilla `a` (fresh, `|0⟩`)    |                        |
//! | output, site `k`  | physical level `p`            | physical level `p`     |
//! | output, site `k+1`| outgoing bond `r`             |                        |
//!
//! so that `U[(p, r), (l, 0)] = A[l, p, r]` for a right-canonical site
//! tensor `A`. The synthesizer assembles a gate as a unitary *row matrix*
//! `W` whose rows are indexed by `(a, l)` (composite `a · d + l`) and whose
//! columns are the flattened outputs; [`Gate::from_rows`] performs the
//! transposition `U[(p, r), (l, a)] = W[(a, l), (p, r)]`.
//!
//! [`MPS::apply_2q_svd`]: tn::mps::MPS::apply_2q_svd

use faer::Mat;
use tn::linalg::adjoint;
use tn::mps::C64;

/// Position of a gate inside its segment's staircase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateRole {
    /// Only gate of a length-1 segment.
    Single,
    /// Two-site gate opening a segment.
    First,
    /// Two-site gate strictly inside a segment.
    Interior,
    /// One-site gate closing a multi-site segment.
    Last,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateSupport {
    Site(usize),
    /// Sites `(k, k+1)`.
    Pair(usize),
}

impl GateSupport {
    pub fn first_site(&self) -> usize {
        match *self {
            GateSupport::Site(k) | GateSupport::Pair(k) => k,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            GateSupport::Site(_) => 1,
            GateSupport::Pair(_) => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Gate {
    pub support: GateSupport,
    pub role: GateRole,
    /// Local dimension of each leg.
    pub d: usize,
    pub matrix: Mat<C64>,
}

impl Gate {
    /// Builds a gate from its row matrix `W` (see the module docs).
    pub fn from_rows(support: GateSupport, role: GateRole, d: usize, w: &Mat<C64>) -> Self {
        let matrix = match support {
            GateSupport::Site(_) => {
                assert!(w.nrows() == d && w.ncols() == d, "one-site rows must be {}x{}", d, d);
                Mat::from_fn(d, d, |p, l| w.read(l, p))
            }
            GateSupport::Pair(_) => {
                let dd = d * d;
                assert!(w.nrows() == dd && w.ncols() == dd, "two-site rows must be {}x{}", dd, dd);
                Mat::from_fn(dd, dd, |out, inp| {
                    let (l, a) = (inp / d, inp % d);
                    w.read(a * d + l, out)
                })
            }
        };
        Self {
            support,
            role,
            d,
            matrix,
        }
    }

    /// Matrix element for output levels `out` and input levels `inp`, one
    /// entry per site of the support in site order.
    pub fn element(&self, out: &[usize], inp: &[usize]) -> C64 {
        let w = self.support.width();
        assert!(out.len() == w && inp.len() == w, "gate acts on {} sites", w);
        let flat = |levels: &[usize]| levels.iter().fold(0, |acc, &q| acc * self.d + q);
        self.matrix.read(flat(out), flat(inp))
    }

    /// The inverse gate on the same support.
    pub fn adjoint(&self) -> Self {
        Self {
            support: self.support,
            role: self.role,
            d: self.d,
            matrix: adjoint(&self.matrix),
        }
    }

    pub fn is_two_site(&self) -> bool {
        matches!(self.support, GateSupport::Pair(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_site_transposition_swaps_input_legs() {
        let d = 2;
        let w = Mat::from_fn(4, 4, |i, j| C64::new((4 * i + j) as f64, 0.0));
        let g = Gate::from_rows(GateSupport::Pair(3), GateRole::Interior, d, &w);

        for (a, l, p, r) in [(0, 1, 1, 0), (1, 0, 0, 1), (1, 1, 1, 1)] {
            assert_eq!(g.element(&[p, r], &[l, a]), w.read(a * d + l, p * d + r));
        }
    }

    #[test]
    fn one_site_is_plain_transpose() {
        let w = Mat::from_fn(3, 3, |i, j| C64::new(i as f64, j as f64));
        let g = Gate::from_rows(GateSupport::Site(0), GateRole::Single, 3, &w);
        assert_eq!(g.element(&[2], &[1]), w.read(1, 2));
    }
}
