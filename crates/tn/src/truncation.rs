/// Bond-dimension budget for SVD splits.
///
/// Singular values at or below `cutoff · s_max` are dropped, at most
/// `max_bond` are kept, and at least one always survives. The cutoff is
/// relative, so the kept rank does not depend on the overall scale of the
/// state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Truncation {
    pub max_bond: usize,
    pub cutoff: f64,
}

impl Truncation {
    /// Drops only numerically vanishing singular values.
    pub fn exact() -> Self {
        Self {
            max_bond: usize::MAX,
            cutoff: 1e-14,
        }
    }

    /// Number of leading singular values to keep. `s` must be sorted in
    /// descending order.
    pub fn keep(&self, s: &[f64]) -> usize {
        let tol = self.cutoff * s.first().copied().unwrap_or(0.0);
        let kept = s
            .iter()
            .take_while(|&&sv| sv > tol)
            .count()
            .min(self.max_bond);
        kept.max(1).min(s.len().max(1))
    }
}

impl Default for Truncation {
    fn default() -> Self {
        Self {
            max_bond: 64,
            cutoff: 1e-8,
        }
    }
}
