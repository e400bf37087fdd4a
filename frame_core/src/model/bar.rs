//! Bars of the structural graph
//!
//! A bar spans two nodes and references its section, material and optional
//! end release by handle; it never owns the referenced entities. Bar length
//! is always derived from the endpoint positions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::materials::MaterialId;
use crate::model::node::NodeId;
use crate::model::release::ReleaseId;
use crate::sections::SectionId;

/// Stable opaque handle to a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BarId(pub Uuid);

impl BarId {
    pub fn generate() -> Self {
        BarId(Uuid::new_v4())
    }
}

impl std::fmt::Display for BarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bar:{}", self.0)
    }
}

/// Structural role of a bar. Purely descriptive; the formulas treat all
/// kinds alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarKind {
    #[default]
    Beam,
    Column,
    Brace,
}

impl std::fmt::Display for BarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BarKind::Beam => "beam",
            BarKind::Column => "column",
            BarKind::Brace => "brace",
        };
        write!(f, "{}", name)
    }
}

/// A bar element between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub kind: BarKind,
    pub node_a: NodeId,
    pub node_b: NodeId,
    pub section: SectionId,
    pub material: MaterialId,
    pub release: Option<ReleaseId>,
    /// Number of internal sub-spans the bar is discretized into (>= 1).
    pub subdivisions: u32,
    /// Roll angle about the bar axis (radians).
    pub rotation: f64,
    /// Interior nodes generated by the discretization, in axis order
    /// (`subdivisions - 1` of them). Owned by the bar unless something else
    /// references them.
    pub interior_nodes: Vec<NodeId>,
}

impl Bar {
    /// All nodes the bar touches: endpoints plus interior subdivision nodes.
    pub fn all_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        [self.node_a, self.node_b]
            .into_iter()
            .chain(self.interior_nodes.iter().copied())
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.all_nodes().any(|n| n == node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            kind: BarKind::Beam,
            node_a: NodeId::generate(),
            node_b: NodeId::generate(),
            section: SectionId(Uuid::new_v4()),
            material: MaterialId(Uuid::new_v4()),
            release: None,
            subdivisions: 1,
            rotation: 0.0,
            interior_nodes: Vec::new(),
        }
    }

    #[test]
    fn test_all_nodes_includes_interior() {
        let mut bar = sample_bar();
        let interior = NodeId::generate();
        bar.interior_nodes.push(interior);

        let nodes: Vec<NodeId> = bar.all_nodes().collect();
        assert_eq!(nodes.len(), 3);
        assert!(bar.touches(interior));
        assert!(bar.touches(bar.node_a));
        assert!(!bar.touches(NodeId::generate()));
    }
}
