//! # Custom Polygon Outlines
//!
//! A custom section stores its outline as one or more closed rings of
//! points in the section plane (y across, z down). The outline is only a
//! shape description - the section's numeric properties are supplied by the
//! caller - but it must still be a valid closed shape: rings of at least
//! three points, no coincident consecutive points, and no two edges
//! crossing anywhere, within a ring or between rings.
//!
//! The edge check is a pairwise segment-intersection scan (O(n²) over all
//! edge pairs, run synchronously at construction). Adjacent edges of a ring
//! share their common vertex; that contact is allowed, but folding back
//! along the same line is not.

use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, ModelResult};

/// Absolute geometric tolerance for point coincidence and collinearity.
const GEOM_TOL: f64 = 1.0e-9;

/// A point of a section outline, in section-plane coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlinePoint {
    pub y: f64,
    pub z: f64,
}

impl OutlinePoint {
    pub fn new(y: f64, z: f64) -> Self {
        OutlinePoint { y, z }
    }

    fn distance(&self, other: &OutlinePoint) -> f64 {
        ((self.y - other.y).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }
}

/// A validated multi-ring closed outline.
///
/// The first ring is conventionally the outer boundary, further rings are
/// holes; the engine only enforces that the rings form a valid closed shape
/// and leaves the outer/hole interpretation to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonOutline {
    rings: Vec<Vec<OutlinePoint>>,
}

impl PolygonOutline {
    /// Validate and wrap a ring list. Fails with `Geometry` otherwise.
    pub fn new(rings: Vec<Vec<OutlinePoint>>) -> ModelResult<Self> {
        validate_rings(&rings)?;
        Ok(PolygonOutline { rings })
    }

    pub fn rings(&self) -> &[Vec<OutlinePoint>] {
        &self.rings
    }

    /// Total number of edges over all rings.
    pub fn edge_count(&self) -> usize {
        self.rings.iter().map(|ring| ring.len()).sum()
    }
}

/// Cross product of (q - p) x (r - p); zero means collinear.
fn cross(p: &OutlinePoint, q: &OutlinePoint, r: &OutlinePoint) -> f64 {
    (q.y - p.y) * (r.z - p.z) - (q.z - p.z) * (r.y - p.y)
}

/// Collinearity test scaled by the segment lengths involved, so it behaves
/// for vertical segments and tiny or large outlines alike.
fn collinear(p: &OutlinePoint, q: &OutlinePoint, r: &OutlinePoint) -> bool {
    let scale = p.distance(q).max(p.distance(r)).max(1.0);
    cross(p, q, r).abs() <= GEOM_TOL * scale
}

/// Is r within the axis-aligned box spanned by p and q (r assumed collinear)?
fn on_segment(p: &OutlinePoint, q: &OutlinePoint, r: &OutlinePoint) -> bool {
    r.y >= p.y.min(q.y) - GEOM_TOL
        && r.y <= p.y.max(q.y) + GEOM_TOL
        && r.z >= p.z.min(q.z) - GEOM_TOL
        && r.z <= p.z.max(q.z) + GEOM_TOL
}

/// Full segment-intersection test, covering proper crossings, endpoint
/// touches and collinear overlap. Vertical segments need no special casing
/// because the test works on cross products, not slopes.
fn segments_intersect(
    a1: &OutlinePoint,
    a2: &OutlinePoint,
    b1: &OutlinePoint,
    b2: &OutlinePoint,
) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    let scale_a = a1.distance(a2).max(1.0);
    let scale_b = b1.distance(b2).max(1.0);
    let zero1 = d1.abs() <= GEOM_TOL * scale_b;
    let zero2 = d2.abs() <= GEOM_TOL * scale_b;
    let zero3 = d3.abs() <= GEOM_TOL * scale_a;
    let zero4 = d4.abs() <= GEOM_TOL * scale_a;

    // proper crossing: strictly opposite sides both ways
    if !zero1 && !zero2 && !zero3 && !zero4 {
        return (d1 > 0.0) != (d2 > 0.0) && (d3 > 0.0) != (d4 > 0.0);
    }

    // degenerate cases: an endpoint lies on the other segment
    (zero1 && on_segment(b1, b2, a1))
        || (zero2 && on_segment(b1, b2, a2))
        || (zero3 && on_segment(a1, a2, b1))
        || (zero4 && on_segment(a1, a2, b2))
}

/// Do two segments sharing the endpoint `shared` overlap collinearly beyond
/// the shared point? `tip_a`/`tip_b` are the far endpoints.
fn folds_back(shared: &OutlinePoint, tip_a: &OutlinePoint, tip_b: &OutlinePoint) -> bool {
    if !collinear(shared, tip_a, tip_b) {
        return false;
    }
    // same direction along the shared line means the edges retrace each other
    let dot = (tip_a.y - shared.y) * (tip_b.y - shared.y)
        + (tip_a.z - shared.z) * (tip_b.z - shared.z);
    dot > 0.0
}

/// Validate a ring list: ring sizes, consecutive-point separation and the
/// pairwise edge-intersection scan.
pub fn validate_rings(rings: &[Vec<OutlinePoint>]) -> ModelResult<()> {
    if rings.is_empty() {
        return Err(ModelError::geometry("outline has no rings"));
    }
    for (ring_index, ring) in rings.iter().enumerate() {
        if ring.len() < 3 {
            return Err(ModelError::geometry(format!(
                "ring {} has {} points, at least 3 required",
                ring_index,
                ring.len()
            )));
        }
        for i in 0..ring.len() {
            let next = (i + 1) % ring.len();
            if ring[i].distance(&ring[next]) <= GEOM_TOL {
                return Err(ModelError::geometry(format!(
                    "ring {} points {} and {} coincide",
                    ring_index, i, next
                )));
            }
        }
    }

    // flatten edges as (ring, start-index) pairs
    let mut edges: Vec<(usize, usize)> = Vec::new();
    for (ring_index, ring) in rings.iter().enumerate() {
        for i in 0..ring.len() {
            edges.push((ring_index, i));
        }
    }

    for (n, &(ring_a, i)) in edges.iter().enumerate() {
        let len_a = rings[ring_a].len();
        let a1 = &rings[ring_a][i];
        let a2 = &rings[ring_a][(i + 1) % len_a];

        for &(ring_b, j) in edges.iter().skip(n + 1) {
            let len_b = rings[ring_b].len();
            let b1 = &rings[ring_b][j];
            let b2 = &rings[ring_b][(j + 1) % len_b];

            if ring_a == ring_b {
                let forward_adjacent = (i + 1) % len_a == j;
                let backward_adjacent = (j + 1) % len_b == i;
                if forward_adjacent || backward_adjacent {
                    // shared vertex is fine; retracing the same line is not
                    let (shared, tip_a, tip_b) = if forward_adjacent {
                        (a2, a1, b2)
                    } else {
                        (a1, a2, b1)
                    };
                    if folds_back(shared, tip_a, tip_b) {
                        return Err(ModelError::geometry(format!(
                            "ring {} edges {} and {} fold back on each other",
                            ring_a, i, j
                        )));
                    }
                    continue;
                }
            }

            if segments_intersect(a1, a2, b1, b2) {
                return Err(ModelError::geometry(format!(
                    "edge {} of ring {} intersects edge {} of ring {}",
                    i, ring_a, j, ring_b
                )));
            }
        }
    }
    Ok(())
}
