use crate::error::{TnError, TnResult};
use crate::truncation::Truncation;
use faer::Mat;
use num_complex::Complex64;
use tracing::debug;

pub type C64 = Complex64;

/// Site tensor with legs `(left bond, physical, right bond)`, row-major.
#[derive(Clone, Debug)]
pub struct Tensor3 {
    pub data: Vec<C64>,
    pub dl: usize,
    pub dp: usize,
    pub dr: usize,
}

impl Tensor3 {
    pub fn zeros(dl: usize, dp: usize, dr: usize) -> Self {
        Self {
            data: vec![C64::new(0.0, 0.0); dl * dp * dr],
            dl,
            dp,
            dr,
        }
    }

    pub fn from_fn(dl: usize, dp: usize, dr: usize, f: impl Fn(usize, usize, usize) -> C64) -> Self {
        let mut t = Self::zeros(dl, dp, dr);
        for l in 0..dl {
            for p in 0..dp {
                for r in 0..dr {
                    t.set(l, p, r, f(l, p, r));
                }
            }
        }
        t
    }

    #[inline]
    fn idx(&self, l: usize, p: usize, r: usize) -> usize {
        (l * self.dp + p) * self.dr + r
    }

    pub fn get(&self, l: usize, p: usize, r: usize) -> C64 {
        self.data[self.idx(l, p, r)]
    }

    pub fn set(&mut self, l: usize, p: usize, r: usize, v: C64) {
        let i = self.idx(l, p, r);
        self.data[i] = v;
    }

    pub fn norm_sqr(&self) -> f64 {
        self.data.iter().map(|v| v.norm_sqr()).sum()
    }

    pub fn scale(&mut self, factor: C64) {
        for v in self.data.iter_mut() {
            *v *= factor;
        }
    }

    /// `dl × (dp·dr)` matrix, rows indexed by the left bond.
    pub fn left_matrix(&self) -> Mat<C64> {
        Mat::from_fn(self.dl, self.dp * self.dr, |l, c| self.data[l * self.dp * self.dr + c])
    }

    /// `(dl·dp) × dr` matrix, columns indexed by the right bond.
    pub fn right_matrix(&self) -> Mat<C64> {
        Mat::from_fn(self.dl * self.dp, self.dr, |row, r| self.data[row * self.dr + r])
    }
}

#[derive(Clone, Debug)]
pub struct MPS {
    pub sites: Vec<Tensor3>,
}

impl MPS {
    /// Builds a chain after checking bond consistency and trivial outer bonds.
    pub fn from_sites(sites: Vec<Tensor3>) -> TnResult<Self> {
        let mps = Self { sites };
        mps.validate()?;
        Ok(mps)
    }

    pub fn validate(&self) -> TnResult<()> {
        let n = self.sites.len();
        if n == 0 {
            return Err(TnError::EmptyChain);
        }
        if self.sites[0].dl != 1 {
            return Err(TnError::OpenBoundary {
                site: 0,
                dim: self.sites[0].dl,
            });
        }
        if self.sites[n - 1].dr != 1 {
            return Err(TnError::OpenBoundary {
                site: n - 1,
                dim: self.sites[n - 1].dr,
            });
        }
        for (k, pair) in self.sites.windows(2).enumerate() {
            if pair[0].dr != pair[1].dl {
                return Err(TnError::BondMismatch {
                    site: k,
                    left: pair[0].dr,
                    right: pair[1].dl,
                });
            }
        }
        Ok(())
    }

    /// Computational basis state `|levels[0] levels[1] …⟩` with local dimension `d`.
    pub fn basis_state(levels: &[usize], d: usize) -> Self {
        let sites = levels
            .iter()
            .map(|&level| {
                assert!(level < d, "level {} out of range for d = {}", level, d);
                let mut t = Tensor3::zeros(1, d, 1);
                t.set(0, level, 0, C64::new(1.0, 0.0));
                t
            })
            .collect();
        Self { sites }
    }

    /// Qubit reference state `|0…0⟩`.
    pub fn new_zero(n: usize) -> Self {
        Self::basis_state(&vec![0; n], 2)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Dimensions of the `len() - 1` internal bonds.
    pub fn bond_dims(&self) -> Vec<usize> {
        self.sites.iter().take(self.len().saturating_sub(1)).map(|s| s.dr).collect()
    }

    pub fn max_bond(&self) -> usize {
        self.sites.iter().map(|s| s.dl.max(s.dr)).max().unwrap_or(1)
    }

    pub fn phys_dims(&self) -> Vec<usize> {
        self.sites.iter().map(|s| s.dp).collect()
    }

    /// Applies `u` (`dp × dp`, rows are outputs) to the physical leg of site `k`.
    pub fn apply_1q(&mut self, k: usize, u: &Mat<C64>) {
        let s = &self.sites[k];
        let d = s.dp;
        assert!(
            u.nrows() == d && u.ncols() == d,
            "one-site gate must be {}x{}, got {}x{}",
            d,
            d,
            u.nrows(),
            u.ncols()
        );

        let mut out = Tensor3::zeros(s.dl, d, s.dr);
        for l in 0..s.dl {
            for r in 0..s.dr {
                for p in 0..d {
                    let mut acc = C64::new(0.0, 0.0);
                    for pp in 0..d {
                        acc += u.read(p, pp) * s.get(l, pp, r);
                    }
                    out.set(l, p, r, acc);
                }
            }
        }
        self.sites[k] = out;
    }

    /// Applies `u` to sites `(k, k+1)` and re-splits the pair with an SVD.
    ///
    /// `u` is `(d1·d2) × (d1·d2)` with composite index `p1 · d2 + p2`.
    /// Singular values are absorbed into the left site.
    pub fn apply_2q_svd(&mut self, k: usize, u: &Mat<C64>, trunc: Truncation) {
        let a = &self.sites[k];
        let b = &self.sites[k + 1];

        let dl = a.dl;
        let dr = b.dr;
        let chi = a.dr;
        let (d1, d2) = (a.dp, b.dp);
        assert!(
            u.nrows() == d1 * d2 && u.ncols() == d1 * d2,
            "two-site gate must be {}x{}",
            d1 * d2,
            d1 * d2
        );

        let mut ab = vec![C64::new(0.0, 0.0); dl * d1 * d2 * dr];
        for l in 0..dl {
            for q1 in 0..d1 {
                for m in 0..chi {
                    let av = a.get(l, q1, m);
                    if av == C64::new(0.0, 0.0) {
                        continue;
                    }
                    for q2 in 0..d2 {
                        for r in 0..dr {
                            ab[((l * d1 + q1) * d2 + q2) * dr + r] += av * b.get(m, q2, r);
                        }
                    }
                }
            }
        }

        let theta = Mat::from_fn(dl * d1, d2 * dr, |row, col| {
            let (l, p1) = (row / d1, row % d1);
            let (p2, r) = (col / dr, col % dr);
            let mut v = C64::new(0.0, 0.0);
            for q1 in 0..d1 {
                for q2 in 0..d2 {
                    v += u.read(p1 * d2 + p2, q1 * d2 + q2) * ab[((l * d1 + q1) * d2 + q2) * dr + r];
                }
            }
            v
        });

        let svd = theta.thin_svd();
        let s = svd.s_diagonal();
        let mut s_vals = Vec::with_capacity(s.nrows());
        for i in 0..s.nrows() {
            s_vals.push(s.read(i).re);
        }
        let kept = trunc.keep(&s_vals);

        let u_mat = svd.u();
        let v_mat = svd.v();

        let mut new_a = Tensor3::zeros(dl, d1, kept);
        for l in 0..dl {
            for p in 0..d1 {
                for m in 0..kept {
                    new_a.set(l, p, m, u_mat.read(l * d1 + p, m) * s_vals[m]);
                }
            }
        }

        let mut new_b = Tensor3::zeros(kept, d2, dr);
        for m in 0..kept {
            for p in 0..d2 {
                for r in 0..dr {
                    new_b.set(m, p, r, v_mat.read(p * dr + r, m).conj());
                }
            }
        }

        self.sites[k] = new_a;
        self.sites[k + 1] = new_b;
    }

    /// Left-to-right SVD sweep; every site but the last becomes
    /// left-orthonormal. Returns the norm left in the last site.
    pub fn left_canonicalize(&mut self, trunc: Truncation) -> f64 {
        let n = self.len();
        for i in 0..n.saturating_sub(1) {
            let t = &self.sites[i];
            let (dl, dp) = (t.dl, t.dp);
            let svd = t.right_matrix().thin_svd();
            let s = svd.s_diagonal();
            let mut s_vals = Vec::with_capacity(s.nrows());
            for j in 0..s.nrows() {
                s_vals.push(s.read(j).re);
            }
            let kept = trunc.keep(&s_vals);
            let u = svd.u();
            let v = svd.v();

            let new_t = Tensor3::from_fn(dl, dp, kept, |l, p, j| u.read(l * dp + p, j));

            // S·V† carried into the next site
            let next = &self.sites[i + 1];
            let new_next = Tensor3::from_fn(kept, next.dp, next.dr, |j, p, rr| {
                let mut acc = C64::new(0.0, 0.0);
                for r in 0..next.dl {
                    acc += v.read(r, j).conj() * next.get(r, p, rr);
                }
                acc * s_vals[j]
            });

            self.sites[i] = new_t;
            self.sites[i + 1] = new_next;
        }
        self.sites[n - 1].norm_sqr().sqrt()
    }

    /// Right-to-left SVD sweep; every site but the first becomes
    /// right-orthonormal (`Σ_{p,r} B[l,p,r]·conj(B[l',p,r]) = δ`).
    ///
    /// Returns the norm carried by the first site before normalization.
    pub fn right_canonicalize(&mut self, trunc: Truncation, normalize: bool) -> f64 {
        let n = self.len();
        for i in (1..n).rev() {
            let t = &self.sites[i];
            let (dp, dr) = (t.dp, t.dr);
            let svd = t.left_matrix().thin_svd();
            let s = svd.s_diagonal();
            let mut s_vals = Vec::with_capacity(s.nrows());
            for j in 0..s.nrows() {
                s_vals.push(s.read(j).re);
            }
            let kept = trunc.keep(&s_vals);
            let u = svd.u();
            let v = svd.v();

            let new_t = Tensor3::from_fn(kept, dp, dr, |j, p, r| v.read(p * dr + r, j).conj());

            // U·S carried into the previous site
            let prev = &self.sites[i - 1];
            let new_prev = Tensor3::from_fn(prev.dl, prev.dp, kept, |ll, p, j| {
                let mut acc = C64::new(0.0, 0.0);
                for l in 0..prev.dr {
                    acc += prev.get(ll, p, l) * u.read(l, j);
                }
                acc * s_vals[j]
            });

            self.sites[i] = new_t;
            self.sites[i - 1] = new_prev;
        }

        let norm = self.sites[0].norm_sqr().sqrt();
        if normalize && norm > 0.0 {
            self.sites[0].scale(C64::new(1.0 / norm, 0.0));
        }
        norm
    }

    /// Bounded-bond compression into right-canonical form: an exact left
    /// sweep followed by a truncating right sweep. Returns the discarded
    /// weight `‖ψ‖² − ‖ψ̃‖²`.
    pub fn compress(&mut self, trunc: Truncation) -> f64 {
        let before = self.left_canonicalize(Truncation::exact());
        let after = self.right_canonicalize(trunc, false);
        let discarded = (before * before - after * after).max(0.0);
        debug!(
            max_bond = self.max_bond(),
            discarded, "compressed MPS into right-canonical form"
        );
        discarded
    }

    /// `⟨self|other⟩`.
    pub fn overlap(&self, other: &MPS) -> C64 {
        assert_eq!(self.len(), other.len(), "MPS length mismatch");
        let mut env = vec![C64::new(0.0, 0.0); self.sites[0].dl * other.sites[0].dl];
        env[0] = C64::new(1.0, 0.0);

        for (sa, sb) in self.sites.iter().zip(other.sites.iter()) {
            let mut next = vec![C64::new(0.0, 0.0); sa.dr * sb.dr];
            for la in 0..sa.dl {
                for lb in 0..sb.dl {
                    let env_val = env[la * sb.dl + lb];
                    if env_val == C64::new(0.0, 0.0) {
                        continue;
                    }
                    for ra in 0..sa.dr {
                        for rb in 0..sb.dr {
                            let mut acc = C64::new(0.0, 0.0);
                            for p in 0..sa.dp {
                                acc += sa.get(la, p, ra).conj() * sb.get(lb, p, rb);
                            }
                            next[ra * sb.dr + rb] += env_val * acc;
                        }
                    }
                }
            }
            env = next;
        }

        env.into_iter().fold(C64::new(0.0, 0.0), |a, b| a + b)
    }

    pub fn norm(&self) -> f64 {
        self.overlap(self).re.max(0.0).sqrt()
    }

    /// `|⟨self|other⟩| / (‖self‖·‖other‖)`, insensitive to global phase.
    pub fn normalized_overlap(&self, other: &MPS) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        self.overlap(other).norm() / denom
    }

    /// Full amplitude vector; site 0 is the most significant digit.
    pub fn to_dense(&self) -> Vec<C64> {
        let mut state = vec![C64::new(1.0, 0.0)];
        let mut bond = 1usize;
        for t in &self.sites {
            assert_eq!(t.dl, bond, "bond mismatch while contracting");
            let outer = state.len() / bond;
            let mut next = vec![C64::new(0.0, 0.0); outer * t.dp * t.dr];
            for idx in 0..outer {
                for l in 0..t.dl {
                    let sv = state[idx * bond + l];
                    if sv == C64::new(0.0, 0.0) {
                        continue;
                    }
                    for p in 0..t.dp {
                        for r in 0..t.dr {
                            next[(idx * t.dp + p) * t.dr + r] += sv * t.get(l, p, r);
                        }
                    }
                }
            }
            state = next;
            bond = t.dr;
        }
        state
    }

    /// Factors a dense state by successive SVDs into left-canonical form.
    pub fn from_dense(state: &[C64], dims: &[usize], trunc: Truncation) -> TnResult<Self> {
        if dims.is_empty() {
            return Err(TnError::EmptyChain);
        }
        let expected: usize = dims.iter().product();
        if state.len() != expected {
            return Err(TnError::DenseLength {
                expected,
                got: state.len(),
            });
        }

        let n = dims.len();
        let mut sites = Vec::with_capacity(n);
        // q holds the not yet factored remainder, shape bond × rest
        let mut bond = 1usize;
        let mut q: Vec<C64> = state.to_vec();

        for &d in dims.iter().take(n - 1) {
            let rows = bond * d;
            let cols = q.len() / rows;
            let m = Mat::from_fn(rows, cols, |i, j| q[i * cols + j]);
            let svd = m.thin_svd();
            let s = svd.s_diagonal();
            let mut s_vals = Vec::with_capacity(s.nrows());
            for j in 0..s.nrows() {
                s_vals.push(s.read(j).re);
            }
            let kept = trunc.keep(&s_vals);
            let u = svd.u();
            let v = svd.v();

            sites.push(Tensor3::from_fn(bond, d, kept, |l, p, j| u.read(l * d + p, j)));

            let mut rest = vec![C64::new(0.0, 0.0); kept * cols];
            for j in 0..kept {
                for c in 0..cols {
                    rest[j * cols + c] = v.read(c, j).conj() * s_vals[j];
                }
            }
            q = rest;
            bond = kept;
        }

        let d_last = dims[n - 1];
        sites.push(Tensor3::from_fn(bond, d_last, 1, |l, p, _| q[l * d_last + p]));
        Ok(Self { sites })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_state_dense() {
        let psi = MPS::basis_state(&[1, 0, 2], 3);
        let dense = psi.to_dense();
        assert_eq!(dense.len(), 27);
        // |1 0 2> = 1*9 + 0*3 + 2
        for (i, v) in dense.iter().enumerate() {
            let expected = if i == 11 { 1.0 } else { 0.0 };
            assert!((v.re - expected).abs() < 1e-15 && v.im.abs() < 1e-15);
        }
    }

    #[test]
    fn validate_rejects_bond_mismatch() {
        let sites = vec![Tensor3::zeros(1, 2, 2), Tensor3::zeros(3, 2, 1)];
        match MPS::from_sites(sites) {
            Err(TnError::BondMismatch { site, left, right }) => {
                assert_eq!((site, left, right), (0, 2, 3));
            }
            other => panic!("expected bond mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn validate_rejects_open_boundary() {
        let sites = vec![Tensor3::zeros(2, 2, 1)];
        assert!(matches!(
            MPS::from_sites(sites),
            Err(TnError::OpenBoundary { site: 0, dim: 2 })
        ));
    }
}
