//! # Actions and Loads
//!
//! An action is a named group of loads (self weight, imposed, wind, ...).
//! A load references one or more nodes or bars by handle and carries its
//! force/moment components. The closed-form beam formulas the loads feed
//! into the stiffness method live in [`distributed`] and [`point`];
//! [`deflection`] holds the piecewise curve representation they produce.

pub mod deflection;
pub mod distributed;
pub mod point;

pub use deflection::{PiecewisePoly, PolySegment};
pub use distributed::EndActions;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{CatalogEntry, CatalogId, NamedArena};
use crate::errors::{EntityKind, ModelError, ModelResult};
use crate::model::bar::BarId;
use crate::model::node::NodeId;

/// Stable opaque handle to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub Uuid);

impl CatalogId for ActionId {
    fn generate() -> Self {
        ActionId(Uuid::new_v4())
    }
    fn raw(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "action:{}", self.0)
    }
}

/// Stable opaque handle to a load within its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadId(pub Uuid);

impl LoadId {
    pub fn generate() -> Self {
        LoadId(Uuid::new_v4())
    }
}

impl std::fmt::Display for LoadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "load:{}", self.0)
    }
}

/// Reference frame for bar load components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frame {
    /// Global model axes.
    #[default]
    Global,
    /// The bar's local axes.
    Local,
}

/// A load entry. Components are (x, y, z) triples: forces in kN (or kN/m
/// for distributed), moments in kNm (or kNm/m).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Load {
    /// Concentrated forces/moments applied directly at nodes, resolved in
    /// the global frame.
    Nodal {
        nodes: Vec<NodeId>,
        force: [f64; 3],
        moment: [f64; 3],
    },
    /// Concentrated force/couple on bars at a distance from the start node.
    BarPoint {
        bars: Vec<BarId>,
        /// Distance from the bar's start node (m).
        position: f64,
        force: [f64; 3],
        moment: [f64; 3],
        frame: Frame,
    },
    /// Uniform distributed force/couple on bars over the active span
    /// [a, L-b].
    BarDistributed {
        bars: Vec<BarId>,
        /// Offset from the start node (m).
        start_offset: f64,
        /// Offset from the end node (m).
        end_offset: f64,
        force: [f64; 3],
        moment: [f64; 3],
        frame: Frame,
        /// Apply the intensity to the projection of the bar onto the global
        /// plane normal to the load instead of the bar length. Mutually
        /// exclusive with the local frame.
        projected: bool,
    },
}

impl Load {
    pub fn load_type(&self) -> &'static str {
        match self {
            Load::Nodal { .. } => "Nodal",
            Load::BarPoint { .. } => "BarPoint",
            Load::BarDistributed { .. } => "BarDistributed",
        }
    }

    /// Bars this load references (empty for nodal loads).
    pub fn bars(&self) -> &[BarId] {
        match self {
            Load::Nodal { .. } => &[],
            Load::BarPoint { bars, .. } => bars,
            Load::BarDistributed { bars, .. } => bars,
        }
    }

    /// Nodes this load references (empty for bar loads).
    pub fn nodes(&self) -> &[NodeId] {
        match self {
            Load::Nodal { nodes, .. } => nodes,
            _ => &[],
        }
    }

    /// Structural validation that needs no model context: non-empty
    /// reference list, finite components, frame/projection exclusivity.
    pub fn validate_standalone(&self) -> ModelResult<()> {
        let components: Vec<f64> = match self {
            Load::Nodal { force, moment, .. } => force.iter().chain(moment).copied().collect(),
            Load::BarPoint { force, moment, .. } => force.iter().chain(moment).copied().collect(),
            Load::BarDistributed { force, moment, .. } => {
                force.iter().chain(moment).copied().collect()
            }
        };
        if components.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::parameter(
                "components",
                "non-finite",
                "load components must be finite",
            ));
        }
        match self {
            Load::Nodal { nodes, .. } if nodes.is_empty() => Err(ModelError::parameter(
                "nodes",
                "[]",
                "a nodal load must reference at least one node",
            )),
            Load::BarPoint { bars, .. } | Load::BarDistributed { bars, .. } if bars.is_empty() => {
                Err(ModelError::parameter(
                    "bars",
                    "[]",
                    "a bar load must reference at least one bar",
                ))
            }
            Load::BarDistributed {
                frame: Frame::Local,
                projected: true,
                ..
            } => Err(ModelError::parameter(
                "projected",
                "true",
                "projection and local frame are mutually exclusive",
            )),
            _ => Ok(()),
        }
    }

    /// Drop references to the given bars. Returns false when the load no
    /// longer references anything and should be removed.
    pub fn retain_bars(&mut self, keep: impl Fn(BarId) -> bool) -> bool {
        match self {
            Load::Nodal { nodes, .. } => !nodes.is_empty(),
            Load::BarPoint { bars, .. } | Load::BarDistributed { bars, .. } => {
                bars.retain(|bar| keep(*bar));
                !bars.is_empty()
            }
        }
    }

    /// Drop references to the given nodes (nodal loads only). Returns false
    /// when nothing remains.
    pub fn retain_nodes(&mut self, keep: impl Fn(NodeId) -> bool) -> bool {
        match self {
            Load::Nodal { nodes, .. } => {
                nodes.retain(|node| keep(*node));
                !nodes.is_empty()
            }
            _ => !self.bars().is_empty(),
        }
    }
}

/// A named group of loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub loads: HashMap<LoadId, Load>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Action {
            name: name.into(),
            loads: HashMap::new(),
        }
    }

    pub fn add_load(&mut self, load: Load) -> LoadId {
        let id = LoadId::generate();
        self.loads.insert(id, load);
        id
    }

    pub fn remove_load(&mut self, id: LoadId) -> Option<Load> {
        self.loads.remove(&id)
    }

    pub fn load(&self, id: LoadId) -> Option<&Load> {
        self.loads.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }
}

impl CatalogEntry for Action {
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Name-sorted catalog of actions.
pub type ActionCatalog = NamedArena<ActionId, Action>;

/// Fresh action catalog.
pub fn action_catalog() -> ActionCatalog {
    NamedArena::new(EntityKind::Action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_excludes_local_frame() {
        let load = Load::BarDistributed {
            bars: vec![BarId::generate()],
            start_offset: 0.0,
            end_offset: 0.0,
            force: [0.0, 0.0, -10.0],
            moment: [0.0; 3],
            frame: Frame::Local,
            projected: true,
        };
        let err = load.validate_standalone().unwrap_err();
        assert_eq!(err.error_code(), "PARAMETER");

        let load = Load::BarDistributed {
            bars: vec![BarId::generate()],
            start_offset: 0.0,
            end_offset: 0.0,
            force: [0.0, 0.0, -10.0],
            moment: [0.0; 3],
            frame: Frame::Global,
            projected: true,
        };
        assert!(load.validate_standalone().is_ok());
    }

    #[test]
    fn test_empty_reference_list_rejected() {
        let load = Load::Nodal {
            nodes: vec![],
            force: [1.0, 0.0, 0.0],
            moment: [0.0; 3],
        };
        assert!(load.validate_standalone().is_err());

        let load = Load::BarPoint {
            bars: vec![],
            position: 1.0,
            force: [0.0; 3],
            moment: [0.0; 3],
            frame: Frame::Global,
        };
        assert!(load.validate_standalone().is_err());
    }

    #[test]
    fn test_non_finite_components_rejected() {
        let load = Load::Nodal {
            nodes: vec![NodeId::generate()],
            force: [f64::NAN, 0.0, 0.0],
            moment: [0.0; 3],
        };
        assert!(load.validate_standalone().is_err());
    }

    #[test]
    fn test_retain_bars_partial_survival() {
        let keep_bar = BarId::generate();
        let drop_bar = BarId::generate();
        let mut load = Load::BarDistributed {
            bars: vec![keep_bar, drop_bar],
            start_offset: 0.0,
            end_offset: 0.0,
            force: [0.0, 0.0, -10.0],
            moment: [0.0; 3],
            frame: Frame::Global,
            projected: false,
        };
        assert!(load.retain_bars(|bar| bar != drop_bar));
        assert_eq!(load.bars(), &[keep_bar]);
        assert!(!load.retain_bars(|bar| bar != keep_bar));
    }

    #[test]
    fn test_action_catalog_sorted() {
        let mut catalog = action_catalog();
        catalog.insert(Action::new("Wind")).unwrap();
        catalog.insert(Action::new("Dead")).unwrap();
        catalog.insert(Action::new("Imposed")).unwrap();
        let names: Vec<&str> = catalog.iter_sorted().iter().map(|(_, a)| a.name()).collect();
        assert_eq!(names, vec!["Dead", "Imposed", "Wind"]);
    }
}
