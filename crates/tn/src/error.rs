use thiserror::Error;

#[derive(Debug, Error)]
pub enum TnError {
    /// An MPS needs at least one site.
    #[error("MPS must contain at least one site")]
    EmptyChain,

    /// Adjacent site tensors disagree on the shared bond.
    #[error("bond mismatch after site {site}: right bond {left} vs next left bond {right}")]
    BondMismatch {
        site: usize,
        left: usize,
        right: usize,
    },

    /// The outer bond of a boundary site must be trivial.
    #[error("open boundary at site {site} has bond dimension {dim}, expected 1")]
    OpenBoundary { site: usize, dim: usize },

    /// Dense vector length does not match the product of local dimensions.
    #[error("dense state has {got} amplitudes, local dimensions require {expected}")]
    DenseLength { expected: usize, got: usize },
}

pub type TnResult<T> = Result<T, TnError>;
