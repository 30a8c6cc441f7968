//! Partition of a chain into independently preparable segments.

use crate::error::{CircuitError, CircuitResult};
use tn::mps::MPS;

/// Inclusive site range `[start, end]` whose outer bonds are trivial and
/// whose inner bonds are all non-trivial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    pub fn sites(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Splits `psi` into segments, sorted by `start`, that cover every site
/// exactly once.
///
/// Each site is classified by its left and right bond (the outer bonds of
/// the boundary sites count as trivial): both trivial gives a single-site
/// segment, trivial-to-entangled opens a segment, entangled-to-trivial
/// closes it. Runs that never close or close without opening are reported
/// instead of silently dropping sites.
pub fn segments(psi: &MPS) -> CircuitResult<Vec<Segment>> {
    let n = psi.len();
    if n == 0 {
        return Err(CircuitError::EmptyChain);
    }
    if n == 1 {
        return Ok(vec![Segment { start: 0, end: 0 }]);
    }

    let mut out = Vec::new();
    let mut open: Option<usize> = None;

    for (k, t) in psi.sites.iter().enumerate() {
        let dl = if k == 0 { 1 } else { t.dl };
        let dr = if k == n - 1 { 1 } else { t.dr };

        match (dl < 2, dr < 2) {
            (true, true) => {
                if let Some(start) = open {
                    return Err(CircuitError::UnterminatedSegment { start });
                }
                out.push(Segment { start: k, end: k });
            }
            (true, false) => {
                if let Some(start) = open {
                    return Err(CircuitError::UnterminatedSegment { start });
                }
                open = Some(k);
            }
            (false, true) => match open.take() {
                Some(start) => out.push(Segment { start, end: k }),
                None => return Err(CircuitError::UnopenedSegment { site: k }),
            },
            (false, false) => {
                if open.is_none() {
                    return Err(CircuitError::UnopenedSegment { site: k });
                }
            }
        }
    }

    if let Some(start) = open {
        return Err(CircuitError::UnterminatedSegment { start });
    }
    Ok(out)
}
