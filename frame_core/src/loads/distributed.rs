//! Distributed-load beam formulas
//!
//! Closed-form results for a uniform distributed load acting on the active
//! span [a, L-b] of a bar: torsional fixed-end moments, bending end
//! rotations (Mohr integrals of the influence functions), the resultant
//! position, and the piecewise rotation/deflection curves consumed by the
//! stiffness assembler and deformed-shape rendering.
//!
//! ## Sign Convention
//!
//! - x runs from end A (x = 0) to end B (x = L)
//! - deflection v is positive in the direction of the applied force
//! - the internal moment diagram is sagging-positive; EI θ' = -M
//! - fixed-end rotations are positive when the ends rotate toward each
//!   other (so a downward load gives positive rotations at both ends);
//!   the y plane carries the opposite handedness and flips both signs
//! - the rotation curve is the plain derivative of the deflection curve

use crate::errors::{ModelError, ModelResult};
use crate::loads::deflection::{PiecewisePoly, PolySegment};
use crate::model::release::Restraint;
use crate::units::approx_le;

/// Validate the offset pair against the span: 0 <= a, 0 <= b, a + b <= L,
/// all tolerance-based.
pub fn check_span(a: f64, b: f64, length: f64) -> ModelResult<()> {
    if !length.is_finite() || length <= 0.0 {
        return Err(ModelError::domain(
            "length",
            length.to_string(),
            "span length must be positive",
        ));
    }
    if !a.is_finite() || !approx_le(0.0, a) || !approx_le(a, length) {
        return Err(ModelError::domain(
            "a",
            a.to_string(),
            "start offset must lie within the span",
        ));
    }
    if !b.is_finite() || !approx_le(0.0, b) || !approx_le(b, length) {
        return Err(ModelError::domain(
            "b",
            b.to_string(),
            "end offset must lie within the span",
        ));
    }
    if !approx_le(a + b, length) {
        return Err(ModelError::domain(
            "a+b",
            (a + b).to_string(),
            "offsets overlap: a + b exceeds the span length",
        ));
    }
    Ok(())
}

fn check_stiffness(field: &'static str, value: f64) -> ModelResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ModelError::domain(
            field,
            value.to_string(),
            "stiffness must be positive",
        ));
    }
    Ok(())
}

/// Fixed-end torque pair (Ma, Mb) for a uniform distributed torque `mx`
/// over [a, L-b], with the end restraints taken from the bar's release.
///
/// With both ends effective the split follows the twist-compatibility
/// formula; a fully released end routes the torque per the end-naming
/// convention of the closed form. Both ends released is rejected.
pub fn torsional_fixed_end_moments(
    mx: f64,
    a: f64,
    b: f64,
    length: f64,
    gj: f64,
    start: Restraint,
    end: Restraint,
) -> ModelResult<(f64, f64)> {
    check_span(a, b, length)?;
    check_stiffness("gj", gj)?;

    let total = mx * (length - a - b);
    let mb = match (start.flexibility(), end.flexibility()) {
        (Some(ka), Some(kb)) => {
            (length - a - b) * mx * (a - b + 2.0 * gj * ka + length)
                / (2.0 * (gj * (ka + kb) + length))
        }
        (Some(_), None) => total,
        (None, Some(_)) => 0.0,
        (None, None) => {
            return Err(ModelError::parameter(
                "release",
                "released/released",
                "torsion may be fully released at one end only",
            ))
        }
    };
    Ok((total - mb, mb))
}

/// End rotations (phiA, phiB) of the simply supported span under a uniform
/// transverse force `fz` plus a uniform distributed couple `my`, both over
/// [a, L-b]. Quartic (force) and cubic (couple) Mohr-integral closed forms.
pub fn fixed_end_rotations_z(
    fz: f64,
    my: f64,
    a: f64,
    b: f64,
    length: f64,
    ei: f64,
) -> ModelResult<(f64, f64)> {
    check_span(a, b, length)?;
    check_stiffness("ei", ei)?;

    let l = length;
    let c = l - b;

    // force part: integral of the point-load influence functions
    let force_a = fz
        * (2.0 * l * l * ((l - a).powi(2) - b * b) - ((l - a).powi(4) - b.powi(4)))
        / (24.0 * l * ei);
    let force_b = fz
        * (2.0 * l * l * ((l - b).powi(2) - a * a) - ((l - b).powi(4) - a.powi(4)))
        / (24.0 * l * ei);

    // couple part: integral of the point-couple influence functions
    let ga = |x: f64| 2.0 * l * l * x - 3.0 * l * x * x + x * x * x;
    let gb = |x: f64| l * l * x - x * x * x;
    let couple_a = my * (ga(c) - ga(a)) / (6.0 * l * ei);
    let couple_b = my * (gb(c) - gb(a)) / (6.0 * l * ei);

    Ok((force_a + couple_a, force_b + couple_b))
}

/// The y-z analogue of [`fixed_end_rotations_z`] for loads (fy, mz); the
/// opposite frame handedness flips both rotation signs.
pub fn fixed_end_rotations_y(
    fy: f64,
    mz: f64,
    a: f64,
    b: f64,
    length: f64,
    ei: f64,
) -> ModelResult<(f64, f64)> {
    let (phi_a, phi_b) = fixed_end_rotations_z(fy, mz, a, b, length, ei)?;
    Ok((-phi_a, -phi_b))
}

/// Position of the load resultant along the axis for a constant section:
/// the midpoint of the active span, (a + L - b) / 2.
pub fn resultant_position(a: f64, b: f64, length: f64) -> ModelResult<f64> {
    check_span(a, b, length)?;
    Ok((a + length - b) / 2.0)
}

/// State at the start of the span, parameterizing the deformation curves.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EndActions {
    /// Internal shear at x = 0
    pub shear: f64,
    /// Internal (sagging-positive) moment at x = 0
    pub moment: f64,
    /// Rotation at x = 0
    pub rotation: f64,
    /// Deflection at x = 0
    pub deflection: f64,
}

/// Double integration of a list of quadratic moment segments
/// (start, end, [m0, m1, m2] in the local offset) into rotation (degree 3)
/// and deflection (degree 4) segments.
fn integrate_moment_segments(
    moment_segments: &[(f64, f64, [f64; 3])],
    ei: f64,
    start: &EndActions,
) -> (Vec<PolySegment>, Vec<PolySegment>) {
    let mut rotation_segments = Vec::new();
    let mut deflection_segments = Vec::new();
    let mut theta = start.rotation;
    let mut v = start.deflection;

    for &(seg_start, seg_end, [m0, m1, m2]) in moment_segments {
        let width = seg_end - seg_start;
        if width <= 0.0 {
            continue;
        }
        rotation_segments.push(PolySegment::new(
            seg_start,
            seg_end,
            [theta, -m0 / ei, -m1 / (2.0 * ei), -m2 / (3.0 * ei), 0.0],
        ));
        deflection_segments.push(PolySegment::new(
            seg_start,
            seg_end,
            [
                v,
                theta,
                -m0 / (2.0 * ei),
                -m1 / (6.0 * ei),
                -m2 / (12.0 * ei),
            ],
        ));
        let d = width;
        v += theta * d - (m0 * d * d / 2.0 + m1 * d.powi(3) / 6.0 + m2 * d.powi(4) / 12.0) / ei;
        theta -= (m0 * d + m1 * d * d / 2.0 + m2 * d.powi(3) / 3.0) / ei;
    }

    (rotation_segments, deflection_segments)
}

/// Rotation and deflection curves for the span under (fz, my) over
/// [a, L-b], given the end actions at x = 0. Breakpoints at a and L-b;
/// degenerate (zero-width) outer segments are omitted.
pub fn deformation_curves(
    fz: f64,
    my: f64,
    a: f64,
    b: f64,
    length: f64,
    ei: f64,
    start: &EndActions,
) -> ModelResult<(PiecewisePoly, PiecewisePoly)> {
    check_span(a, b, length)?;
    check_stiffness("ei", ei)?;

    let c = length - b;
    let loaded = c - a;
    let (va, ma) = (start.shear, start.moment);

    // sagging-positive moment diagram, quadratic per region
    let moment_segments = [
        (0.0, a, [ma, va, 0.0]),
        (a, c, [ma + va * a, va + my, -fz / 2.0]),
        (
            c,
            length,
            [
                ma + va * c + my * loaded - fz * loaded * loaded / 2.0,
                va - fz * loaded,
                0.0,
            ],
        ),
    ];

    let (rotation, deflection) = integrate_moment_segments(&moment_segments, ei, start);
    Ok((
        PiecewisePoly::new(rotation),
        PiecewisePoly::new(deflection),
    ))
}

/// Rotation as a function of position. See [`deformation_curves`].
pub fn rotation_curve(
    fz: f64,
    my: f64,
    a: f64,
    b: f64,
    length: f64,
    ei: f64,
    start: &EndActions,
) -> ModelResult<PiecewisePoly> {
    deformation_curves(fz, my, a, b, length, ei, start).map(|(rotation, _)| rotation)
}

/// Deflection as a function of position. See [`deformation_curves`].
pub fn deflection_curve(
    fz: f64,
    my: f64,
    a: f64,
    b: f64,
    length: f64,
    ei: f64,
    start: &EndActions,
) -> ModelResult<PiecewisePoly> {
    deformation_curves(fz, my, a, b, length, ei, start).map(|(_, deflection)| deflection)
}
