//! Point-load beam formulas
//!
//! Counterparts of the distributed-load closed forms for a concentrated
//! force/couple at distance d from end A. Same sign convention as
//! [`crate::loads::distributed`].

use crate::errors::{ModelError, ModelResult};
use crate::loads::deflection::{PiecewisePoly, PolySegment};
use crate::loads::distributed::EndActions;
use crate::model::release::Restraint;
use crate::units::approx_le;

/// Validate the load position: 0 <= d <= L (tolerance-based).
pub fn check_position(d: f64, length: f64) -> ModelResult<()> {
    if !length.is_finite() || length <= 0.0 {
        return Err(ModelError::domain(
            "length",
            length.to_string(),
            "span length must be positive",
        ));
    }
    if !d.is_finite() || !approx_le(0.0, d) || !approx_le(d, length) {
        return Err(ModelError::domain(
            "position",
            d.to_string(),
            "load position must lie within the span",
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

/// Fixed-end torque pair (Ma, Mb) for a concentrated torque `t` at distance
/// `d`. The distributed formula's point limit: with springs,
/// Mb = T (d + G·J·kA) / (L + G·J·(kA + kB)); released ends follow the same
/// end-naming convention as the distributed case.
pub fn torsional_fixed_end_moments(
    t: f64,
    d: f64,
    length: f64,
    gj: f64,
    start: Restraint,
    end: Restraint,
) -> ModelResult<(f64, f64)> {
    check_position(d, length)?;
    check_stiffness("gj", gj)?;

    let mb = match (start.flexibility(), end.flexibility()) {
        (Some(ka), Some(kb)) => t * (d + gj * ka) / (length + gj * (ka + kb)),
        (Some(_), None) => t,
        (None, Some(_)) => 0.0,
        (None, None) => {
            return Err(ModelError::parameter(
                "release",
                "released/released",
                "torsion may be fully released at one end only",
            ))
        }
    };
    Ok((t - mb, mb))
}

/// End rotations (phiA, phiB) of the simply supported span under a point
/// force `p` plus a point couple `m` at distance `d`: the classic influence
/// functions.
pub fn fixed_end_rotations_z(
    p: f64,
    m: f64,
    d: f64,
    length: f64,
    ei: f64,
) -> ModelResult<(f64, f64)> {
    check_position(d, length)?;
    check_stiffness("ei", ei)?;

    let l = length;
    let e = l - d;

    let force_a = p * e * (l * l - e * e) / (6.0 * l * ei);
    let force_b = p * d * (l * l - d * d) / (6.0 * l * ei);

    let couple_a = m * (2.0 * l * l - 6.0 * l * d + 3.0 * d * d) / (6.0 * l * ei);
    let couple_b = m * (l * l - 3.0 * d * d) / (6.0 * l * ei);

    Ok((force_a + couple_a, force_b + couple_b))
}

/// The y-z analogue of [`fixed_end_rotations_z`]; the opposite frame
/// handedness flips both rotation signs.
pub fn fixed_end_rotations_y(
    p: f64,
    m: f64,
    d: f64,
    length: f64,
    ei: f64,
) -> ModelResult<(f64, f64)> {
    let (phi_a, phi_b) = fixed_end_rotations_z(p, m, d, length, ei)?;
    Ok((-phi_a, -phi_b))
}

/// Rotation and deflection curves for the span under (p, m) at distance d,
/// given the end actions at x = 0. Two segments with the breakpoint at d.
pub fn deformation_curves(
    p: f64,
    m: f64,
    d: f64,
    length: f64,
    ei: f64,
    start: &EndActions,
) -> ModelResult<(PiecewisePoly, PiecewisePoly)> {
    check_position(d, length)?;
    check_stiffness("ei", ei)?;

    let (va, ma) = (start.shear, start.moment);

    // sagging-positive moment diagram, linear per region; the couple jumps
    // the diagram by +m at d, the force kinks the slope by -p
    let moment_segments = [
        (0.0, d, [ma, va]),
        (d, length, [ma + va * d + m, va - p]),
    ];

    let mut rotation_segments = Vec::new();
    let mut deflection_segments = Vec::new();
    let mut theta = start.rotation;
    let mut v = start.deflection;

    for &(seg_start, seg_end, [m0, m1]) in &moment_segments {
        let width = seg_end - seg_start;
        if width <= 0.0 {
            continue;
        }
        rotation_segments.push(PolySegment::new(
            seg_start,
            seg_end,
            [theta, -m0 / ei, -m1 / (2.0 * ei), 0.0, 0.0],
        ));
        deflection_segments.push(PolySegment::new(
            seg_start,
            seg_end,
            [v, theta, -m0 / (2.0 * ei), -m1 / (6.0 * ei), 0.0],
        ));
        let w = width;
        v += theta * w - (m0 * w * w / 2.0 + m1 * w.powi(3) / 6.0) / ei;
        theta -= (m0 * w + m1 * w * w / 2.0) / ei;
    }

    Ok((
        PiecewisePoly::new(rotation_segments),
        PiecewisePoly::new(deflection_segments),
    ))
}
