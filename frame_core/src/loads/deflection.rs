//! Piecewise polynomial curves
//!
//! Rotation and deflection along a loaded span are piecewise polynomials of
//! degree at most 4, with breakpoints where the load description changes.
//! Each segment stores its domain and coefficients against the local offset
//! from the segment start (numerically better conditioned than global-x
//! coefficients); evaluation dispatches on domain membership.

use serde::{Deserialize, Serialize};

/// One polynomial segment: value = sum of coeffs[k] * (x - start)^k.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolySegment {
    pub start: f64,
    pub end: f64,
    pub coeffs: [f64; 5],
}

impl PolySegment {
    pub fn new(start: f64, end: f64, coeffs: [f64; 5]) -> Self {
        PolySegment { start, end, coeffs }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x <= self.end
    }

    /// Horner evaluation at global position x.
    pub fn eval(&self, x: f64) -> f64 {
        let t = x - self.start;
        self.coeffs
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * t + c)
    }

    /// Highest power with a nonzero coefficient.
    pub fn degree(&self) -> usize {
        self.coeffs
            .iter()
            .rposition(|&c| c != 0.0)
            .unwrap_or(0)
    }
}

/// An ordered sequence of contiguous polynomial segments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PiecewisePoly {
    segments: Vec<PolySegment>,
}

impl PiecewisePoly {
    /// Wrap an ordered, contiguous segment list. The builder functions in
    /// this module family are the intended producers.
    pub fn new(segments: Vec<PolySegment>) -> Self {
        PiecewisePoly { segments }
    }

    pub fn segments(&self) -> &[PolySegment] {
        &self.segments
    }

    /// The interior breakpoints (segment boundaries, excluding the ends).
    pub fn breakpoints(&self) -> Vec<f64> {
        self.segments
            .iter()
            .skip(1)
            .map(|segment| segment.start)
            .collect()
    }

    /// Domain covered by the curve, if any.
    pub fn domain(&self) -> Option<(f64, f64)> {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => Some((first.start, last.end)),
            _ => None,
        }
    }

    /// Evaluate at x. The first segment whose domain contains x wins, so
    /// interior breakpoints are owned by the segment to their left.
    /// Returns None outside the curve's domain.
    pub fn eval(&self, x: f64) -> Option<f64> {
        self.segments
            .iter()
            .find(|segment| segment.contains(x))
            .map(|segment| segment.eval(x))
    }
}
