use thiserror::Error;
use tn::TnError;

#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("cannot synthesize a circuit for an empty chain")]
    EmptyChain,

    /// An entangled run opened at `start` never reached a trivial bond.
    #[error("segment opened at site {start} is never closed by a trivial bond")]
    UnterminatedSegment { start: usize },

    /// A site closes an entangled run that was never opened.
    #[error("site {site} closes a segment that was never opened")]
    UnopenedSegment { site: usize },

    #[error("bond dimension {bond} at site {site} exceeds the local dimension {d}")]
    BondTooLarge { site: usize, bond: usize, d: usize },

    #[error("site {site} has local dimension {got}, expected {expected}")]
    PhysicalDimMismatch {
        site: usize,
        expected: usize,
        got: usize,
    },

    /// The numerical null space has the wrong size, usually because the
    /// site tensor is rank deficient at the chosen threshold.
    #[error("kernel at site {site} has {found} vectors, expected {expected}")]
    KernelDimension {
        site: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "gate at site {site} of segment [{start}, {end}] is not unitary \
         (|UU^+ - I| = {row:.3e}, |U^+U - I| = {col:.3e})"
    )]
    NonUnitaryGate {
        start: usize,
        end: usize,
        site: usize,
        row: f64,
        col: f64,
    },

    #[error("state has zero norm")]
    ZeroNorm,

    #[error("layer acts on {layer} sites but the state has {state}")]
    LayerSizeMismatch { layer: usize, state: usize },

    #[error("dense dimension {dim} exceeds the limit {max}")]
    DenseTooLarge { dim: usize, max: usize },

    #[error(transparent)]
    Tn(#[from] TnError),
}

pub type CircuitResult<T> = Result<T, CircuitError>;
