//! # Unit Types
//!
//! Type-safe wrappers for the engineering units the engine works in, plus
//! the tolerance-based comparisons shared by all range checks.
//!
//! ## Design Philosophy
//!
//! Simple newtype wrappers rather than a full units library:
//! - The engine uses one consistent SI unit set throughout
//! - JSON serialization stays clean (just numbers)
//! - Zero runtime overhead
//!
//! ## SI Units (Primary)
//!
//! - Length: meters (m), millimeters (mm)
//! - Stress: megapascals (MPa), gigapascals (GPa)
//! - Force: kilonewtons (kN); moments: kilonewton-meters (kNm)
//!
//! ## Example
//!
//! ```rust
//! use frame_core::units::{GigaPascals, MegaPascals, Meters, Millimeters};
//!
//! let e: MegaPascals = GigaPascals(210.0).into();
//! assert_eq!(e.0, 210_000.0);
//!
//! let depth: Meters = Millimeters(200.0).into();
//! assert!((depth.0 - 0.2).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Tolerance comparisons
// ============================================================================

/// Relative tolerance used throughout for range and position checks.
pub const REL_TOL: f64 = 1.0e-9;

/// `a <= b` up to a relative tolerance scaled by the magnitudes involved.
///
/// Used for all "within bounds" checks so that positions computed from
/// floating-point arithmetic (e.g. `a + b == length`) are accepted at the
/// boundary.
pub fn approx_le(a: f64, b: f64) -> bool {
    a <= b + REL_TOL * a.abs().max(b.abs()).max(1.0)
}

/// `a == b` up to a relative tolerance.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= REL_TOL * a.abs().max(b.abs()).max(1.0)
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

// ============================================================================
// Stress Units
// ============================================================================

/// Stress in megapascals (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MegaPascals(pub f64);

impl MegaPascals {
    /// The value in base pascals, for mixing with meter-based section
    /// properties.
    pub fn pascals(&self) -> f64 {
        self.0 * 1.0e6
    }
}

/// Stress in gigapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GigaPascals(pub f64);

impl From<GigaPascals> for MegaPascals {
    fn from(gpa: GigaPascals) -> Self {
        MegaPascals(gpa.0 * 1000.0)
    }
}

impl From<MegaPascals> for GigaPascals {
    fn from(mpa: MegaPascals) -> Self {
        GigaPascals(mpa.0 / 1000.0)
    }
}

// ============================================================================
// Force / Moment Units
// ============================================================================

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtons(pub f64);

/// Moment in kilonewton-meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtonMeters(pub f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let m: Meters = Millimeters(2500.0).into();
        assert!((m.0 - 2.5).abs() < 1e-12);

        let mm: Millimeters = Meters(0.06).into();
        assert!((mm.0 - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_stress_conversions() {
        let mpa: MegaPascals = GigaPascals(31.476).into();
        assert!((mpa.0 - 31_476.0).abs() < 1e-6);

        let gpa: GigaPascals = MegaPascals(210_000.0).into();
        assert!((gpa.0 - 210.0).abs() < 1e-9);
    }

    #[test]
    fn test_approx_le_at_boundary() {
        // exact boundary passes
        assert!(approx_le(4.0, 4.0));
        // tiny float noise above the boundary passes
        assert!(approx_le(4.0 + 1e-12, 4.0));
        // a real violation does not
        assert!(!approx_le(4.001, 4.0));
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(0.1 + 0.2, 0.3));
        assert!(!approx_eq(0.30001, 0.3));
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&MegaPascals(25.0)).unwrap();
        assert_eq!(json, "25.0");
    }
}
