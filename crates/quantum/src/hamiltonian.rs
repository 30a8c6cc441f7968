use crate::operators::spin_dot;
use crate::states::Bulk;
use faer::Mat;
use tn::error::{TnError, TnResult};
use tn::linalg::{adjoint, conj, identity, null_space};
use tn::mps::C64;

/// Operator-Schmidt weights at or below this fraction of the largest one are
/// dropped when a bond operator is split into MPO factors.
const SCHMIDT_CUTOFF: f64 = 1e-12;

/// Operator on `width` consecutive sites starting at `site`, stored as a
/// `d^width × d^width` matrix with rows as output legs.
#[derive(Clone, Debug)]
pub struct LocalTerm {
    pub site: usize,
    pub width: usize,
    pub op: Mat<C64>,
}

/// Sum of one- and two-site operators on a chain of `n_sites` sites with
/// local dimension `d`.
#[derive(Clone, Debug)]
pub struct TermSum {
    pub n_sites: usize,
    pub d: usize,
    pub terms: Vec<LocalTerm>,
}

impl TermSum {
    pub fn new(n_sites: usize, d: usize) -> Self {
        Self {
            n_sites,
            d,
            terms: Vec::new(),
        }
    }

    /// Adds `op` starting at `site`; its width follows from its size.
    pub fn add(&mut self, site: usize, op: Mat<C64>) -> &mut Self {
        assert_eq!(op.nrows(), op.ncols(), "local operator must be square");
        let width = if op.nrows() == self.d {
            1
        } else if op.nrows() == self.d * self.d {
            2
        } else {
            panic!("operator of size {} does not act on one or two sites of dimension {}", op.nrows(), self.d);
        };
        assert!(site + width <= self.n_sites, "operator leaves the chain");
        self.terms.push(LocalTerm { site, width, op });
        self
    }

    /// `Σ_k bond(k)` with `bond(k)` acting on sites `(k, k + 1)`.
    pub fn nearest_neighbour(n_sites: usize, d: usize, bond: impl Fn(usize) -> Mat<C64>) -> Self {
        let mut sum = Self::new(n_sites, d);
        for k in 0..n_sites.saturating_sub(1) {
            sum.add(k, bond(k));
        }
        sum
    }

    /// Spin-1 bilinear-biquadratic chain `Σ cos θ (S·S) + sin θ (S·S)²`.
    pub fn aklt(n_sites: usize, theta: f64) -> Self {
        let h = bilinear_biquadratic(theta);
        Self::nearest_neighbour(n_sites, 3, |_| h.clone())
    }

    /// Parent Hamiltonian of `bulk.chain(n_sites)`: a sum of bond
    /// projectors, each annihilating every two-site state the chain can hold
    /// on that bond. The chain is a zero-energy ground state.
    pub fn parent(n_sites: usize, bulk: &Bulk) -> Self {
        assert!(n_sites >= 2, "parent Hamiltonian needs at least one bond");
        Self::nearest_neighbour(n_sites, bulk.d, |k| {
            parent_projector(bulk, k == 0, k + 2 == n_sites)
        })
    }
}

/// `cos θ (S·S) + sin θ (S·S)²` on two spin-1 sites.
pub fn bilinear_biquadratic(theta: f64) -> Mat<C64> {
    let ss = spin_dot(3);
    let ss2 = &ss * &ss;
    let (c, s) = (theta.cos(), theta.sin());
    Mat::from_fn(9, 9, |i, j| ss.read(i, j) * c + ss2.read(i, j) * s)
}

/// Projector onto the orthogonal complement of the two-site states
/// `Σ_m Q[l][m][p1] Q[m][r][p2]`. `open_left` keeps only `l = 0` and
/// `open_right` only `r = 0`, matching the ends of [`Bulk::chain`].
pub fn parent_projector(bulk: &Bulk, open_left: bool, open_right: bool) -> Mat<C64> {
    let (chi, d) = (bulk.chi, bulk.d);
    let ls = if open_left { 1 } else { chi };
    let rs = if open_right { 1 } else { chi };

    let map = Mat::from_fn(ls * rs, d * d, |row, col| {
        let (l, r) = (row / rs, row % rs);
        let (p1, p2) = (col / d, col % d);
        (0..chi).fold(C64::new(0.0, 0.0), |acc, m| acc + bulk.get(l, m, p1) * bulk.get(m, r, p2))
    });

    let k = null_space(&conj(&map), None);
    &k * &adjoint(&k)
}

/// MPO site tensor with legs `(left bond, out, in, right bond)`.
#[derive(Clone, Debug)]
pub struct Tensor4 {
    pub data: Vec<C64>,
    pub dl: usize,
    pub dout: usize,
    pub din: usize,
    pub dr: usize,
}

impl Tensor4 {
    pub fn zeros(dl: usize, dout: usize, din: usize, dr: usize) -> Self {
        Self {
            data: vec![C64::new(0.0, 0.0); dl * dout * din * dr],
            dl,
            dout,
            din,
            dr,
        }
    }

    #[inline]
    fn idx(&self, l: usize, o: usize, i: usize, r: usize) -> usize {
        ((l * self.dout + o) * self.din + i) * self.dr + r
    }

    pub fn get(&self, l: usize, o: usize, i: usize, r: usize) -> C64 {
        self.data[self.idx(l, o, i, r)]
    }

    /// Adds `op` into the `(l, r)` block.
    fn add_block(&mut self, l: usize, r: usize, op: &Mat<C64>) {
        for o in 0..self.dout {
            for i in 0..self.din {
                let k = self.idx(l, o, i, r);
                self.data[k] += op.read(o, i);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Mpo {
    pub sites: Vec<Tensor4>,
}

impl Mpo {
    pub fn from_sites(sites: Vec<Tensor4>) -> TnResult<Self> {
        let n = sites.len();
        if n == 0 {
            return Err(TnError::EmptyChain);
        }
        if sites[0].dl != 1 {
            return Err(TnError::OpenBoundary {
                site: 0,
                dim: sites[0].dl,
            });
        }
        if sites[n - 1].dr != 1 {
            return Err(TnError::OpenBoundary {
                site: n - 1,
                dim: sites[n - 1].dr,
            });
        }
        for (k, pair) in sites.windows(2).enumerate() {
            if pair[0].dr != pair[1].dl {
                return Err(TnError::BondMismatch {
                    site: k,
                    left: pair[0].dr,
                    right: pair[1].dl,
                });
            }
        }
        Ok(Self { sites })
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Finite-state MPO of a [`TermSum`].
    ///
    /// Terms on the same bond are summed and split by an operator-Schmidt
    /// SVD, `h_k = Σ_a A_a ⊗ B_a`. Bond `k` carries `2 + K_k` channels:
    /// 0 = finished, `1..=K_k` = waiting for `B_a`, last = not started.
    pub fn from_terms(h: &TermSum) -> Self {
        let (n, d) = (h.n_sites, h.d);
        assert!(n > 0, "MPO needs at least one site");

        let mut onsite = vec![Mat::<C64>::zeros(d, d); n];
        let mut bonds = vec![Mat::<C64>::zeros(d * d, d * d); n - 1];
        for term in &h.terms {
            let slot = match term.width {
                1 => &mut onsite[term.site],
                _ => &mut bonds[term.site],
            };
            *slot = &*slot + &term.op;
        }
        let factors: Vec<_> = bonds.iter().map(|b| operator_schmidt(b, d)).collect();

        let id = identity(d);
        let sites = (0..n)
            .map(|k| {
                let rows = if k == 0 { 1 } else { factors[k - 1].len() + 2 };
                let cols = if k == n - 1 { 1 } else { factors[k].len() + 2 };
                let start = rows - 1;
                let mut t = Tensor4::zeros(rows, d, d, cols);

                t.add_block(start, 0, &onsite[k]);
                if k > 0 {
                    t.add_block(0, 0, &id);
                    for (a, (_, b)) in factors[k - 1].iter().enumerate() {
                        t.add_block(1 + a, 0, b);
                    }
                }
                if k < n - 1 {
                    t.add_block(start, cols - 1, &id);
                    for (a, (op, _)) in factors[k].iter().enumerate() {
                        t.add_block(start, 1 + a, op);
                    }
                }
                t
            })
            .collect();

        Self { sites }
    }

    /// MPO form of [`TermSum::aklt`].
    pub fn aklt(n_sites: usize, theta: f64) -> Self {
        Self::from_terms(&TermSum::aklt(n_sites, theta))
    }

    /// MPO form of [`TermSum::parent`].
    pub fn parent(n_sites: usize, bulk: &Bulk) -> Self {
        Self::from_terms(&TermSum::parent(n_sites, bulk))
    }

    /// Largest bond dimension.
    pub fn max_bond(&self) -> usize {
        self.sites.iter().map(|w| w.dr).max().unwrap_or(1)
    }
}

/// `h[(p1 p2), (q1 q2)] = Σ_a A_a[p1, q1] · B_a[p2, q2]`.
fn operator_schmidt(h: &Mat<C64>, d: usize) -> Vec<(Mat<C64>, Mat<C64>)> {
    let r = Mat::from_fn(d * d, d * d, |row, col| {
        let (p1, q1) = (row / d, row % d);
        let (p2, q2) = (col / d, col % d);
        h.read(p1 * d + p2, q1 * d + q2)
    });

    let svd = r.thin_svd();
    let s = svd.s_diagonal();
    let (u, v) = (svd.u(), svd.v());
    let s_max = if s.nrows() > 0 { s.read(0).re } else { 0.0 };

    (0..s.nrows())
        .filter(|&a| s.read(a).re > SCHMIDT_CUTOFF * s_max)
        .map(|a| {
            let sv = s.read(a).re;
            let left = Mat::from_fn(d, d, |p, q| u.read(p * d + q, a) * sv);
            let right = Mat::from_fn(d, d, |p, q| v.read(p * d + q, a).conj());
            (left, right)
        })
        .collect()
}

/// Two interchangeable representations of a Hamiltonian, each able to
/// produce `⟨ψ|H|ψ⟩ / ⟨ψ|ψ⟩`.
#[derive(Clone, Debug)]
pub enum Hamiltonian {
    Mpo(Mpo),
    Terms(TermSum),
}
