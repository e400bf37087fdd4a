//! # Standard Profile Library
//!
//! A built-in table of common European rolled profiles (IPE, HEA) for use
//! without an external profile database. Each record carries the published
//! section properties - taken as supplied data, not recomputed - plus the
//! nominal dimensions needed to build the outline polygon.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::sections::profiles::find_profile;
//!
//! let ipe200 = find_profile("IPE 200").unwrap();
//! assert!((ipe200.iy - 1.943e-5).abs() < 1e-8);
//! let outline = ipe200.outline().unwrap();
//! assert_eq!(outline.rings().len(), 1);
//! ```

use once_cell::sync::Lazy;

use crate::errors::ModelResult;
use crate::sections::polygon::{OutlinePoint, PolygonOutline};
use crate::units::{Meters, Millimeters};

/// A standard rolled profile: published properties plus nominal dimensions.
///
/// Properties are in SI base units (m², m⁴); dimensions in millimeters as
/// printed in the profile tables.
#[derive(Debug, Clone)]
pub struct ProfileRecord {
    pub name: &'static str,
    /// Overall depth (mm)
    pub h: f64,
    /// Flange width (mm)
    pub b: f64,
    /// Web thickness (mm)
    pub tw: f64,
    /// Flange thickness (mm)
    pub tf: f64,
    /// Torsion constant (m⁴)
    pub j: f64,
    /// Second moment about the strong axis (m⁴)
    pub iy: f64,
    /// Second moment about the weak axis (m⁴)
    pub iz: f64,
    /// Cross-sectional area (m²)
    pub area: f64,
}

impl ProfileRecord {
    /// Extreme-fiber distances: the rolled shapes are doubly symmetric.
    pub fn vy(&self) -> f64 {
        Meters::from(Millimeters(self.b)).0 / 2.0
    }

    pub fn vz(&self) -> f64 {
        Meters::from(Millimeters(self.h)).0 / 2.0
    }

    /// Build the 12-point I-outline (fillets omitted), in meters, with the
    /// section centroid at the origin and z running down the depth.
    pub fn outline(&self) -> ModelResult<PolygonOutline> {
        let half_b = Meters::from(Millimeters(self.b)).0 / 2.0;
        let half_h = Meters::from(Millimeters(self.h)).0 / 2.0;
        let half_tw = Meters::from(Millimeters(self.tw)).0 / 2.0;
        let tf = Meters::from(Millimeters(self.tf)).0;

        let ring = vec![
            OutlinePoint::new(-half_b, -half_h),
            OutlinePoint::new(half_b, -half_h),
            OutlinePoint::new(half_b, -half_h + tf),
            OutlinePoint::new(half_tw, -half_h + tf),
            OutlinePoint::new(half_tw, half_h - tf),
            OutlinePoint::new(half_b, half_h - tf),
            OutlinePoint::new(half_b, half_h),
            OutlinePoint::new(-half_b, half_h),
            OutlinePoint::new(-half_b, half_h - tf),
            OutlinePoint::new(-half_tw, half_h - tf),
            OutlinePoint::new(-half_tw, -half_h + tf),
            OutlinePoint::new(-half_b, -half_h + tf),
        ];
        PolygonOutline::new(vec![ring])
    }
}

/// Built-in profile table. Values from the standard European profile tables
/// (cm-based units converted to meters).
static PROFILES: Lazy<Vec<ProfileRecord>> = Lazy::new(|| {
    // (name, h, b, tw, tf, It cm4, Iy cm4, Iz cm4, A cm2)
    let rows: [(&'static str, f64, f64, f64, f64, f64, f64, f64, f64); 8] = [
        ("IPE 100", 100.0, 55.0, 4.1, 5.7, 1.20, 171.0, 15.92, 10.3),
        ("IPE 160", 160.0, 82.0, 5.0, 7.4, 3.60, 869.3, 68.31, 20.1),
        ("IPE 200", 200.0, 100.0, 5.6, 8.5, 6.98, 1943.0, 142.4, 28.5),
        ("IPE 270", 270.0, 135.0, 6.6, 10.2, 15.94, 5790.0, 419.9, 45.9),
        ("IPE 300", 300.0, 150.0, 7.1, 10.7, 20.12, 8356.0, 603.8, 53.8),
        ("IPE 400", 400.0, 180.0, 8.6, 13.5, 51.08, 23130.0, 1318.0, 84.5),
        ("HEA 200", 190.0, 200.0, 6.5, 10.0, 20.98, 3692.0, 1336.0, 53.8),
        ("HEA 300", 290.0, 300.0, 8.5, 14.0, 85.17, 18260.0, 6310.0, 112.5),
    ];

    const CM2: f64 = 1.0e-4;
    const CM4: f64 = 1.0e-8;
    rows.iter()
        .map(|&(name, h, b, tw, tf, it, iy, iz, a)| ProfileRecord {
            name,
            h,
            b,
            tw,
            tf,
            j: it * CM4,
            iy: iy * CM4,
            iz: iz * CM4,
            area: a * CM2,
        })
        .collect()
});

/// All built-in profiles, in table order.
pub fn standard_profiles() -> &'static [ProfileRecord] {
    &PROFILES
}

/// Look up a profile by its exact table name (e.g. "IPE 200").
pub fn find_profile(name: &str) -> Option<&'static ProfileRecord> {
    PROFILES.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(find_profile("IPE 200").is_some());
        assert!(find_profile("HEA 300").is_some());
        assert!(find_profile("IPE 9999").is_none());
    }

    #[test]
    fn test_units_converted() {
        let ipe200 = find_profile("IPE 200").unwrap();
        assert!((ipe200.area - 28.5e-4).abs() < 1e-12);
        assert!((ipe200.iy - 1943.0e-8).abs() < 1e-12);
        assert!((ipe200.vz() - 0.1).abs() < 1e-12);
        assert!((ipe200.vy() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_all_outlines_validate() {
        for profile in standard_profiles() {
            let outline = profile.outline().unwrap();
            assert_eq!(outline.rings()[0].len(), 12, "{}", profile.name);
        }
    }

    #[test]
    fn test_strong_axis_dominates() {
        for profile in standard_profiles().iter().filter(|p| p.name.starts_with("IPE")) {
            assert!(profile.iy > profile.iz, "{}", profile.name);
        }
    }
}
