//! Nodes of the structural graph
//!
//! A node is an identity plus a position in space. The distance between two
//! nodes is the geometric primitive everything else (bar lengths, load
//! offsets, subdivision spacing) is built on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable opaque handle to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn generate() -> Self {
        NodeId(Uuid::new_v4())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// A position in global coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point3) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }

    /// Linear interpolation toward `other`, t in [0, 1].
    pub fn lerp(&self, other: &Point3, t: f64) -> Point3 {
        Point3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// Where a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeOrigin {
    /// Created explicitly by the user.
    User,
    /// Generated as an interior subdivision point of a bar; removed with the
    /// bar unless something else still references it.
    Subdivision,
}

/// A node of the structural graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub position: Point3,
    pub origin: NodeOrigin,
}

impl Node {
    pub fn user(position: Point3) -> Self {
        Node {
            position,
            origin: NodeOrigin::User,
        }
    }

    pub fn subdivision(position: Point3) -> Self {
        Node {
            position,
            origin: NodeOrigin::Subdivision,
        }
    }
}
