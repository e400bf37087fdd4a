//! # Cross-Section Property Formulas
//!
//! Closed-form geometric properties for the parametric section shapes.
//! All lengths in meters; areas/inertias in the corresponding SI powers.
//!
//! ## Notation
//!
//! - `area` = cross-sectional area
//! - `iy`, `iz` = second moments of area about the section's y/z axes
//! - `j` = St-Venant torsion constant
//! - `vy`, `vy'` = extreme-fiber distances along y (both sides)
//! - `vz`, `vz'` = extreme-fiber distances along z (top/bottom)
//!
//! ## References
//!
//! - Roark's Formulas for Stress and Strain, Chapter 10 (torsion of
//!   rectangular sections)
//! - Any structural mechanics textbook for the inertia formulas

use std::f64::consts::PI;

/// Raw derived properties of a parametric shape, before provenance tagging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeProperties {
    pub j: f64,
    pub iy: f64,
    pub iz: f64,
    pub area: f64,
    pub vy: f64,
    pub vy_prime: f64,
    pub vz: f64,
    pub vz_prime: f64,
}

/// St-Venant torsion constant of a solid rectangle.
///
/// # Formula
/// With a = long side, b = short side:
/// J = a·b³/16 · (16/3 − 3.364·(b/a)·(1 − b⁴/(12·a⁴)))
///
/// For a square (b/a = 1) this reduces to c⁴/16·(16/3 − 3.364·(1 − 1/12)),
/// i.e. the classical 0.1406·c⁴.
#[inline]
pub fn rect_torsion_constant(side1: f64, side2: f64) -> f64 {
    let a = side1.max(side2);
    let b = side1.min(side2);
    let ratio = b / a;
    a * b.powi(3) / 16.0 * (16.0 / 3.0 - 3.364 * ratio * (1.0 - b.powi(4) / (12.0 * a.powi(4))))
}

/// Second moment of area of a rectangle about its centroidal axis
/// perpendicular to `depth`.
///
/// # Formula
/// I = width·depth³/12
#[inline]
pub fn rect_inertia(width: f64, depth: f64) -> f64 {
    width * depth.powi(3) / 12.0
}

/// Solid rectangle, `width` along y, `height` along z.
pub fn rectangle(width: f64, height: f64) -> ShapeProperties {
    ShapeProperties {
        j: rect_torsion_constant(width, height),
        iy: rect_inertia(width, height),
        iz: rect_inertia(height, width),
        area: width * height,
        vy: width / 2.0,
        vy_prime: width / 2.0,
        vz: height / 2.0,
        vz_prime: height / 2.0,
    }
}

/// Square of side `c`. Same formulas as the rectangle with both sides equal.
pub fn square(side: f64) -> ShapeProperties {
    rectangle(side, side)
}

/// Solid circle of diameter `d`.
pub fn circle(diameter: f64) -> ShapeProperties {
    let d = diameter;
    ShapeProperties {
        j: PI * d.powi(4) / 32.0,
        iy: PI * d.powi(4) / 64.0,
        iz: PI * d.powi(4) / 64.0,
        area: PI * d.powi(2) / 4.0,
        vy: d / 2.0,
        vy_prime: d / 2.0,
        vz: d / 2.0,
        vz_prime: d / 2.0,
    }
}

/// T-shape: flange rectangle (lt × ht) sitting on top of a web rectangle
/// (lr × hr). z runs downward from the top fiber.
///
/// Iy combines both rectangles about the area-weighted centroid
/// (parallel-axis theorem); J sums the St-Venant constants of the two
/// rectangles; vz/vz' are the centroid distances to the top/bottom fibers.
pub fn t_section(
    flange_width: f64,
    flange_height: f64,
    web_width: f64,
    web_height: f64,
) -> ShapeProperties {
    let (lt, ht, lr, hr) = (flange_width, flange_height, web_width, web_height);
    let flange_area = lt * ht;
    let web_area = lr * hr;
    let area = flange_area + web_area;

    // centroid depth measured from the top fiber
    let centroid = (flange_area * ht / 2.0 + web_area * (ht + hr / 2.0)) / area;

    let iy = rect_inertia(lt, ht)
        + flange_area * (centroid - ht / 2.0).powi(2)
        + rect_inertia(lr, hr)
        + web_area * (ht + hr / 2.0 - centroid).powi(2);

    ShapeProperties {
        j: rect_torsion_constant(lt, ht) + rect_torsion_constant(lr, hr),
        iy,
        iz: rect_inertia(ht, lt) + rect_inertia(hr, lr),
        area,
        vy: lt.max(lr) / 2.0,
        vy_prime: lt.max(lr) / 2.0,
        vz: centroid,
        vz_prime: ht + hr - centroid,
    }
}
