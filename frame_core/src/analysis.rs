//! # Analysis Interface
//!
//! The engine does not solve the global linear system itself: it hands a
//! validated model plus per-bar flexibility coefficients to an external
//! [`Solver`] collaborator and memoizes the returned solution in a single
//! project-wide [`AnalysisCache`] slot. Any model mutation discards the
//! slot (coarse invalidation); the next results request re-solves.
//!
//! Solver failures are non-fatal to the model: only the pending analysis is
//! affected.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, ModelResult};
use crate::model::bar::BarId;
use crate::model::node::NodeId;
use crate::model::Model;
use crate::units::MegaPascals;

/// Per-sub-span flexibility coefficients consumed by the stiffness
/// assembler. Lengths in meters, moduli converted to pascals, so the
/// rotational coefficients come out in rad per N·m.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanFlexibility {
    /// l / (3 E Iy)
    pub ay: f64,
    /// l / (6 E Iy)
    pub by: f64,
    /// l / (3 E Iy)
    pub cy: f64,
    /// l / (3 E Iz)
    pub az: f64,
    /// l / (6 E Iz)
    pub bz: f64,
    /// l / (3 E Iz)
    pub cz: f64,
    /// E S / l (axial stiffness, N/m)
    pub ea_l: f64,
    /// G J / l (torsional stiffness, N·m/rad)
    pub gj_l: f64,
}

/// Compute the flexibility coefficients of one sub-span.
///
/// `e`/`g` in MPa, section properties in meter-based units.
pub fn span_flexibility(
    length: f64,
    e: MegaPascals,
    g: MegaPascals,
    iy: f64,
    iz: f64,
    area: f64,
    j: f64,
) -> ModelResult<SpanFlexibility> {
    for (field, value) in [
        ("length", length),
        ("e", e.0),
        ("g", g.0),
        ("iy", iy),
        ("iz", iz),
        ("area", area),
        ("j", j),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ModelError::domain(
                field,
                value.to_string(),
                "span stiffness inputs must be positive",
            ));
        }
    }
    let e = e.pascals();
    let g = g.pascals();
    Ok(SpanFlexibility {
        ay: length / (3.0 * e * iy),
        by: length / (6.0 * e * iy),
        cy: length / (3.0 * e * iy),
        az: length / (3.0 * e * iz),
        bz: length / (6.0 * e * iz),
        cz: length / (3.0 * e * iz),
        ea_l: e * area / length,
        gj_l: g * j / length,
    })
}

/// Forces at both ends of a bar, as (Fx, Fy, Fz, Mx, My, Mz) in the bar's
/// local frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BarEndForces {
    pub start: [f64; 6],
    pub end: [f64; 6],
}

/// A solved analysis: nodal displacements (ux, uy, uz, rx, ry, rz) and bar
/// end forces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Solution {
    pub displacements: HashMap<NodeId, [f64; 6]>,
    pub bar_end_forces: HashMap<BarId, BarEndForces>,
}

/// The external linear-system solver collaborator.
pub trait Solver {
    fn solve(&mut self, model: &Model) -> ModelResult<Solution>;
}

/// Lazily rebuilt memo slot for the project-wide analysis.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    slot: Option<Solution>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&Solution> {
        self.slot.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.slot.is_some()
    }

    pub fn store(&mut self, solution: Solution) {
        self.slot = Some(solution);
    }

    /// Discard the cached solution. Returns whether one was present.
    pub fn invalidate(&mut self) -> bool {
        let was_valid = self.slot.is_some();
        if was_valid {
            log::debug!("analysis cache invalidated");
        }
        self.slot = None;
        was_valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_flexibility_relations() {
        let f = span_flexibility(
            4.0,
            MegaPascals(210_000.0),
            MegaPascals(80_769.0),
            1.943e-5,
            1.424e-6,
            28.5e-4,
            6.98e-8,
        )
        .unwrap();
        assert_eq!(f.ay, f.cy);
        assert_eq!(f.az, f.cz);
        assert!((f.by - f.ay / 2.0).abs() < 1e-18);
        // weak axis is more flexible
        assert!(f.az > f.ay);
        // spot value: l / (3 E Iy)
        let expected = 4.0 / (3.0 * 210_000.0e6 * 1.943e-5);
        assert!((f.ay - expected).abs() < 1e-18);
    }

    #[test]
    fn test_span_flexibility_rejects_degenerate_input() {
        assert!(span_flexibility(
            0.0,
            MegaPascals(210_000.0),
            MegaPascals(80_769.0),
            1e-5,
            1e-6,
            1e-3,
            1e-8
        )
        .is_err());
        assert!(span_flexibility(
            4.0,
            MegaPascals(0.0),
            MegaPascals(80_769.0),
            1e-5,
            1e-6,
            1e-3,
            1e-8
        )
        .is_err());
    }

    #[test]
    fn test_cache_lifecycle() {
        let mut cache = AnalysisCache::new();
        assert!(!cache.is_valid());
        assert!(!cache.invalidate());

        cache.store(Solution::default());
        assert!(cache.is_valid());
        assert!(cache.invalidate());
        assert!(cache.get().is_none());
    }
}
