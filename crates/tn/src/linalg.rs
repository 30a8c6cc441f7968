//! Dense complex linear algebra on `faer::Mat<C64>`.

use crate::mps::C64;
use faer::Mat;

pub fn identity(n: usize) -> Mat<C64> {
    Mat::from_fn(n, n, |i, j| {
        if i == j {
            C64::new(1.0, 0.0)
        } else {
            C64::new(0.0, 0.0)
        }
    })
}

/// Conjugate transpose.
pub fn adjoint(m: &Mat<C64>) -> Mat<C64> {
    Mat::from_fn(m.ncols(), m.nrows(), |i, j| m.read(j, i).conj())
}

pub fn conj(m: &Mat<C64>) -> Mat<C64> {
    Mat::from_fn(m.nrows(), m.ncols(), |i, j| m.read(i, j).conj())
}

pub fn from_array<const N: usize>(a: [[C64; N]; N]) -> Mat<C64> {
    Mat::from_fn(N, N, |i, j| a[i][j])
}

pub fn frobenius_norm(m: &Mat<C64>) -> f64 {
    let mut acc = 0.0;
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            acc += m.read(i, j).norm_sqr();
        }
    }
    acc.sqrt()
}

/// Frobenius distances `(‖U·U† − I‖, ‖U†·U − I‖)`.
pub fn unitarity_deviation(u: &Mat<C64>) -> (f64, f64) {
    let n = u.nrows();
    assert_eq!(n, u.ncols(), "unitarity is defined for square matrices");

    let ud = adjoint(u);
    let id = identity(n);
    let row = frobenius_norm(&(&(u * &ud) - &id));
    let col = frobenius_norm(&(&(&ud * u) - &id));
    (row, col)
}

/// Orthonormal basis of the kernel of `m`, one basis vector per column.
///
/// The numerical rank counts singular values above `rcond · σ_max`;
/// `rcond` defaults to `max(rows, cols) · ε`.
pub fn null_space(m: &Mat<C64>, rcond: Option<f64>) -> Mat<C64> {
    let (rows, cols) = (m.nrows(), m.ncols());
    let svd = m.svd();
    let s = svd.s_diagonal();

    let mut s_vals = Vec::with_capacity(s.nrows());
    for i in 0..s.nrows() {
        s_vals.push(s.read(i).re);
    }
    let s_max = s_vals.iter().cloned().fold(0.0, f64::max);
    let rcond = rcond.unwrap_or(rows.max(cols) as f64 * f64::EPSILON);
    let tol = s_max * rcond;
    let rank = s_vals.iter().filter(|&&sv| sv > tol).count();

    let v = svd.v();
    Mat::from_fn(cols, cols - rank, |i, j| v.read(i, rank + j))
}

/// Eigen-decomposition of a Hermitian positive semidefinite matrix.
///
/// For such matrices the SVD coincides with the eigen-decomposition, so the
/// eigenvalues come back sorted in descending order with the eigenvectors
/// as matching columns.
pub fn psd_eigen(h: &Mat<C64>) -> (Vec<f64>, Mat<C64>) {
    assert_eq!(h.nrows(), h.ncols(), "eigen-decomposition needs a square matrix");

    let svd = h.svd();
    let s = svd.s_diagonal();
    let mut values = Vec::with_capacity(s.nrows());
    for i in 0..s.nrows() {
        values.push(s.read(i).re);
    }
    let u = svd.u();
    let vectors = Mat::from_fn(u.nrows(), u.ncols(), |i, j| u.read(i, j));
    (values, vectors)
}

/// Copy of the selected columns of `m`, in the given order.
pub fn select_columns(m: &Mat<C64>, cols: &[usize]) -> Mat<C64> {
    Mat::from_fn(m.nrows(), cols.len(), |i, j| m.read(i, cols[j]))
}

/// Kronecker product `a ⊗ b`; row `(i, k)` of the result is `i·b.nrows() + k`.
pub fn kron(a: &Mat<C64>, b: &Mat<C64>) -> Mat<C64> {
    let (br, bc) = (b.nrows(), b.ncols());
    Mat::from_fn(a.nrows() * br, a.ncols() * bc, |i, j| {
        a.read(i / br, j / bc) * b.read(i % br, j % bc)
    })
}
