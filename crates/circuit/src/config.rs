use tn::truncation::Truncation;

/// Numerical knobs of [`generate_unitaries`](crate::generate_unitaries).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthesisConfig {
    /// Truncation used when bringing the private copy of the target into
    /// right-canonical form.
    pub canonical: Truncation,
    /// Relative rank threshold for null spaces; `None` uses
    /// `max(rows, cols) · ε`.
    pub null_rcond: Option<f64>,
    /// Eigenvalues of `K·K†` above this value span the stored isometry.
    pub isometry_threshold: f64,
    /// Largest accepted Frobenius deviation of a gate from unitarity.
    pub unitarity_tol: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            canonical: Truncation::exact(),
            null_rcond: None,
            isometry_threshold: 1e-12,
            unitarity_tol: 1e-10,
        }
    }
}
