//! # Dependency Index
//!
//! One query answers both reference questions the editor workflow needs:
//! "what does this entity depend on" (upstream, for safe edits) and "what
//! depends on this entity" (downstream, for blocking or cascading
//! deletions). The traversal is a breadth-first closure over the reference
//! edges of the whole model, returning typed sets per entity kind; the
//! seeds themselves are not included.

use std::collections::BTreeSet;

use crate::loads::{ActionId, LoadId};
use crate::materials::MaterialId;
use crate::model::bar::BarId;
use crate::model::node::NodeId;
use crate::model::release::ReleaseId;
use crate::model::Model;
use crate::sections::SectionId;

/// A reference to any model entity, for seeding dependency queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityRef {
    Material(MaterialId),
    Section(SectionId),
    Release(ReleaseId),
    Node(NodeId),
    Bar(BarId),
    Action(ActionId),
    Load(ActionId, LoadId),
}

/// Query direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// What the seeds depend on (follow references outward).
    Upstream,
    /// What depends on the seeds (follow references inward).
    Downstream,
}

/// Typed result sets of a dependency query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySet {
    pub materials: BTreeSet<MaterialId>,
    pub sections: BTreeSet<SectionId>,
    pub releases: BTreeSet<ReleaseId>,
    pub nodes: BTreeSet<NodeId>,
    pub bars: BTreeSet<BarId>,
    pub actions: BTreeSet<ActionId>,
    pub loads: BTreeSet<(ActionId, LoadId)>,
}

impl EntitySet {
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
            && self.sections.is_empty()
            && self.releases.is_empty()
            && self.nodes.is_empty()
            && self.bars.is_empty()
            && self.actions.is_empty()
            && self.loads.is_empty()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
            + self.sections.len()
            + self.releases.len()
            + self.nodes.len()
            + self.bars.len()
            + self.actions.len()
            + self.loads.len()
    }

    fn insert(&mut self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Material(id) => self.materials.insert(id),
            EntityRef::Section(id) => self.sections.insert(id),
            EntityRef::Release(id) => self.releases.insert(id),
            EntityRef::Node(id) => self.nodes.insert(id),
            EntityRef::Bar(id) => self.bars.insert(id),
            EntityRef::Action(id) => self.actions.insert(id),
            EntityRef::Load(action, load) => self.loads.insert((action, load)),
        }
    }

    /// Human-readable identifiers of everything in the set, for InUse
    /// errors: enough for the caller to cascade or cancel.
    pub fn identifiers(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.materials.iter().map(|id| id.to_string()));
        out.extend(self.sections.iter().map(|id| id.to_string()));
        out.extend(self.releases.iter().map(|id| id.to_string()));
        out.extend(self.nodes.iter().map(|id| id.to_string()));
        out.extend(self.bars.iter().map(|id| id.to_string()));
        out.extend(self.actions.iter().map(|id| id.to_string()));
        out.extend(
            self.loads
                .iter()
                .map(|(action, load)| format!("{}/{}", action, load)),
        );
        out
    }
}

impl Model {
    /// Breadth-first dependency closure from the seed set in the given
    /// direction. Seeds are not part of the result.
    pub fn find_dependents(&self, seeds: &[EntityRef], direction: Direction) -> EntitySet {
        let mut visited = EntitySet::default();
        let mut result = EntitySet::default();
        let mut queue: Vec<EntityRef> = Vec::new();

        for seed in seeds {
            if visited.insert(*seed) {
                queue.push(*seed);
            }
        }

        // seeds sit in `visited` from the start, so they never enter the
        // result even when one seed references another
        while let Some(current) = queue.pop() {
            for neighbor in self.reference_edges(&current, direction) {
                if visited.insert(neighbor) {
                    result.insert(neighbor);
                    queue.push(neighbor);
                }
            }
        }
        result
    }

    /// Direct neighbors of an entity along the reference edges.
    fn reference_edges(&self, entity: &EntityRef, direction: Direction) -> Vec<EntityRef> {
        let mut edges = Vec::new();
        match direction {
            Direction::Downstream => match entity {
                EntityRef::Material(id) => {
                    for (bar_id, bar) in self.bars_iter() {
                        if bar.material == *id {
                            edges.push(EntityRef::Bar(bar_id));
                        }
                    }
                }
                EntityRef::Section(id) => {
                    for (bar_id, bar) in self.bars_iter() {
                        if bar.section == *id {
                            edges.push(EntityRef::Bar(bar_id));
                        }
                    }
                }
                EntityRef::Release(id) => {
                    for (bar_id, bar) in self.bars_iter() {
                        if bar.release == Some(*id) {
                            edges.push(EntityRef::Bar(bar_id));
                        }
                    }
                }
                EntityRef::Node(id) => {
                    for (bar_id, bar) in self.bars_iter() {
                        if bar.touches(*id) {
                            edges.push(EntityRef::Bar(bar_id));
                        }
                    }
                    for (action_id, load_id, load) in self.loads_iter() {
                        if load.nodes().contains(id) {
                            edges.push(EntityRef::Load(action_id, load_id));
                        }
                    }
                }
                EntityRef::Bar(id) => {
                    for (action_id, load_id, load) in self.loads_iter() {
                        if load.bars().contains(id) {
                            edges.push(EntityRef::Load(action_id, load_id));
                        }
                    }
                }
                EntityRef::Action(_) | EntityRef::Load(..) => {}
            },
            Direction::Upstream => match entity {
                EntityRef::Bar(id) => {
                    if let Some(bar) = self.bar_opt(*id) {
                        for node in bar.all_nodes() {
                            edges.push(EntityRef::Node(node));
                        }
                        edges.push(EntityRef::Material(bar.material));
                        edges.push(EntityRef::Section(bar.section));
                        if let Some(release) = bar.release {
                            edges.push(EntityRef::Release(release));
                        }
                    }
                }
                EntityRef::Load(action_id, load_id) => {
                    if let Some(load) = self.load_opt(*action_id, *load_id) {
                        for bar in load.bars() {
                            edges.push(EntityRef::Bar(*bar));
                        }
                        for node in load.nodes() {
                            edges.push(EntityRef::Node(*node));
                        }
                    }
                }
                EntityRef::Action(id) => {
                    for (action_id, load_id, _) in self.loads_iter() {
                        if action_id == *id {
                            edges.push(EntityRef::Load(action_id, load_id));
                        }
                    }
                }
                EntityRef::Material(_)
                | EntityRef::Section(_)
                | EntityRef::Release(_)
                | EntityRef::Node(_) => {}
            },
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bar::BarKind;
    use crate::model::node::Point3;
    use crate::loads::Frame;

    fn two_bar_model() -> (Model, [NodeId; 3], [BarId; 2], MaterialId, SectionId, ActionId) {
        let mut model = Model::new();
        let material = model.add_steel("S235", 235.0, 360.0).unwrap();
        let section = model
            .add_section(
                crate::sections::Section::from_shape(
                    "R",
                    crate::sections::SectionShape::Rectangular {
                        width: 0.3,
                        height: 0.5,
                    },
                )
                .unwrap(),
            )
            .unwrap();
        let n0 = model.add_node(Point3::new(0.0, 0.0, 0.0)).unwrap();
        let n1 = model.add_node(Point3::new(4.0, 0.0, 0.0)).unwrap();
        let n2 = model.add_node(Point3::new(8.0, 0.0, 0.0)).unwrap();
        let b0 = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        let b1 = model
            .add_bar(BarKind::Beam, section, material, n1, n2, None, 1, 0.0)
            .unwrap();
        let action = model.add_action("Dead").unwrap();
        (model, [n0, n1, n2], [b0, b1], material, section, action)
    }

    #[test]
    fn test_downstream_of_material_reaches_bars_and_loads() {
        let (mut model, _, [b0, b1], material, _, action) = two_bar_model();
        let load = model
            .add_bar_distributed_load(
                action,
                vec![b0],
                0.0,
                0.0,
                [0.0, 0.0, -10.0],
                [0.0; 3],
                Frame::Global,
                false,
            )
            .unwrap();

        let set = model.find_dependents(&[EntityRef::Material(material)], Direction::Downstream);
        assert!(set.bars.contains(&b0));
        assert!(set.bars.contains(&b1));
        assert!(set.loads.contains(&(action, load)));
        assert!(set.materials.is_empty(), "seed not in result");
    }

    #[test]
    fn test_downstream_of_shared_node() {
        let (model, [_, n1, _], [b0, b1], ..) = two_bar_model();
        let set = model.find_dependents(&[EntityRef::Node(n1)], Direction::Downstream);
        assert_eq!(set.bars.len(), 2);
        assert!(set.bars.contains(&b0) && set.bars.contains(&b1));
    }

    #[test]
    fn test_upstream_of_bar() {
        let (model, [n0, n1, _], [b0, _], material, section, _) = two_bar_model();
        let set = model.find_dependents(&[EntityRef::Bar(b0)], Direction::Upstream);
        assert!(set.nodes.contains(&n0) && set.nodes.contains(&n1));
        assert!(set.materials.contains(&material));
        assert!(set.sections.contains(&section));
        assert!(set.bars.is_empty());
    }

    #[test]
    fn test_upstream_of_load_reaches_model_roots() {
        let (mut model, [n0, n1, _], [b0, _], material, section, action) = two_bar_model();
        let load = model
            .add_bar_point_load(
                action,
                vec![b0],
                2.0,
                [0.0, 0.0, -5.0],
                [0.0; 3],
                Frame::Global,
            )
            .unwrap();

        let set = model.find_dependents(&[EntityRef::Load(action, load)], Direction::Upstream);
        assert!(set.bars.contains(&b0));
        assert!(set.nodes.contains(&n0) && set.nodes.contains(&n1));
        assert!(set.materials.contains(&material));
        assert!(set.sections.contains(&section));
    }

    #[test]
    fn test_unreferenced_entity_has_no_dependents() {
        let (mut model, ..) = two_bar_model();
        let lonely = model.add_steel("S355", 355.0, 490.0).unwrap();
        let set = model.find_dependents(&[EntityRef::Material(lonely)], Direction::Downstream);
        assert!(set.is_empty());
    }
}
