//! # Structural Model
//!
//! The [`Model`] is the root of the editable entity graph: material, section
//! and release catalogs, nodes, bars and load actions, plus the analysis
//! cache and the change-notification registry.
//!
//! Every mutating operation follows validate-then-commit: all checks run
//! before any state changes, so a failed call leaves the model exactly as it
//! was. Committed mutations emit one [`ModelChange`](crate::events::ModelChange)
//! each and discard the cached analysis where the change can affect results.
//!
//! Deletions consult the dependency index first: removing an entity that
//! others still reference fails with `InUse` (carrying the blocking
//! identifiers) unless the caller explicitly asks for the cascade.

pub mod bar;
pub mod node;
pub mod release;

pub use bar::{Bar, BarId, BarKind};
pub use node::{Node, NodeId, NodeOrigin, Point3};
pub use release::{release_catalog, EndRestraints, Release, ReleaseCatalog, ReleaseId, Restraint};

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{span_flexibility, AnalysisCache, Solution, Solver, SpanFlexibility};
use crate::catalog::{CatalogEntry, CatalogId};
use crate::deps::{Direction, EntityRef};
use crate::errors::{EntityKind, ModelError, ModelResult};
use crate::events::{ChangeKind, ModelChange, ObserverRegistry};
use crate::loads::{
    action_catalog, distributed, point, Action, ActionCatalog, ActionId, Frame, Load, LoadId,
};
use crate::materials::{
    material_catalog, ConcreteOverrides, Material, MaterialCatalog, MaterialId, SteelOverrides,
};
use crate::sections::{Section, SectionCatalog, SectionId, SectionOverrides, SectionShape,
    section_catalog};
use crate::units::MegaPascals;

/// Minimum admissible bar length (m); endpoints closer than this count as
/// coincident.
const MIN_BAR_LENGTH: f64 = 1.0e-9;

/// The editable structural model.
#[derive(Debug, Serialize, Deserialize)]
pub struct Model {
    pub(crate) materials: MaterialCatalog,
    pub(crate) sections: SectionCatalog,
    pub(crate) releases: ReleaseCatalog,
    pub(crate) nodes: HashMap<NodeId, Node>,
    pub(crate) bars: HashMap<BarId, Bar>,
    pub(crate) actions: ActionCatalog,
    #[serde(skip)]
    cache: AnalysisCache,
    #[serde(skip)]
    observers: ObserverRegistry,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Model {
    /// Clones the entity graph. The analysis cache and the observer registry
    /// belong to the original; the clone starts with fresh empty ones.
    fn clone(&self) -> Self {
        Model {
            materials: self.materials.clone(),
            sections: self.sections.clone(),
            releases: self.releases.clone(),
            nodes: self.nodes.clone(),
            bars: self.bars.clone(),
            actions: self.actions.clone(),
            cache: AnalysisCache::default(),
            observers: ObserverRegistry::default(),
        }
    }
}

impl Model {
    pub fn new() -> Self {
        Model {
            materials: material_catalog(),
            sections: section_catalog(),
            releases: release_catalog(),
            nodes: HashMap::new(),
            bars: HashMap::new(),
            actions: action_catalog(),
            cache: AnalysisCache::default(),
            observers: ObserverRegistry::default(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn materials(&self) -> &MaterialCatalog {
        &self.materials
    }

    pub fn sections(&self) -> &SectionCatalog {
        &self.sections
    }

    pub fn releases(&self) -> &ReleaseCatalog {
        &self.releases
    }

    pub fn actions(&self) -> &ActionCatalog {
        &self.actions
    }

    pub fn node(&self, id: NodeId) -> ModelResult<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| ModelError::not_found(EntityKind::Node, id))
    }

    pub fn bar(&self, id: BarId) -> ModelResult<&Bar> {
        self.bars
            .get(&id)
            .ok_or_else(|| ModelError::not_found(EntityKind::Bar, id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub(crate) fn bar_opt(&self, id: BarId) -> Option<&Bar> {
        self.bars.get(&id)
    }

    pub(crate) fn load_opt(&self, action: ActionId, load: LoadId) -> Option<&Load> {
        self.actions.get_opt(action).and_then(|a| a.load(load))
    }

    pub(crate) fn bars_iter(&self) -> impl Iterator<Item = (BarId, &Bar)> {
        self.bars.iter().map(|(id, bar)| (*id, bar))
    }

    pub(crate) fn loads_iter(&self) -> impl Iterator<Item = (ActionId, LoadId, &Load)> {
        self.actions.iter().flat_map(|(action_id, action)| {
            action
                .loads
                .iter()
                .map(move |(load_id, load)| (action_id, *load_id, load))
        })
    }

    /// Length of a bar, derived from its endpoint positions.
    pub fn bar_length(&self, id: BarId) -> ModelResult<f64> {
        let bar = self.bar(id)?;
        let a = self.node(bar.node_a)?.position;
        let b = self.node(bar.node_b)?.position;
        Ok(a.distance(&b))
    }

    /// Flexibility coefficients of one sub-span of a bar, for the external
    /// stiffness assembler.
    pub fn bar_span_flexibility(&self, id: BarId) -> ModelResult<SpanFlexibility> {
        let bar = self.bar(id)?;
        let length = self.bar_length(id)? / bar.subdivisions as f64;
        let material = self.materials.get(bar.material)?;
        let section = self.sections.get(bar.section)?;
        span_flexibility(
            length,
            MegaPascals(material.elastic_modulus()),
            MegaPascals(material.shear_modulus()),
            section.properties.iy.value,
            section.properties.iz.value,
            section.properties.area.value,
            section.properties.j.value,
        )
    }

    // ========================================================================
    // Observers & cache
    // ========================================================================

    /// Register a change observer (e.g. a presentation-layer mirror).
    pub fn subscribe(&mut self, observer: impl FnMut(&ModelChange) + 'static) {
        self.observers.subscribe(observer);
    }

    pub fn has_cached_results(&self) -> bool {
        self.cache.is_valid()
    }

    fn emit(&mut self, entity: EntityKind, id: Uuid, change: ChangeKind) {
        let event = ModelChange::new(entity, id, change);
        self.observers.notify(&event);
    }

    fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Request analysis results, re-solving through the external solver if
    /// no cached solution exists. A solver failure leaves the model intact.
    pub fn results(&mut self, solver: &mut dyn Solver) -> ModelResult<&Solution> {
        if self.cache.get().is_none() {
            log::debug!("no cached analysis, invoking solver");
            let solution = solver.solve(self)?;
            self.cache.store(solution);
        }
        self.cache
            .get()
            .ok_or_else(|| ModelError::solver("solver produced no solution"))
    }

    // ========================================================================
    // Materials
    // ========================================================================

    /// Add a concrete grade derived from fck (see
    /// [`ConcreteMaterial`](crate::materials::ConcreteMaterial)).
    pub fn add_concrete(&mut self, name: impl Into<String>, fck: f64) -> ModelResult<MaterialId> {
        let id = self.materials.add_concrete(name, fck)?;
        self.emit(EntityKind::Material, id.raw(), ChangeKind::Added);
        Ok(id)
    }

    /// Add a steel grade.
    pub fn add_steel(
        &mut self,
        name: impl Into<String>,
        fy: f64,
        fu: f64,
    ) -> ModelResult<MaterialId> {
        let id = self.materials.add_steel(name, fy, fu)?;
        self.emit(EntityKind::Material, id.raw(), ChangeKind::Added);
        Ok(id)
    }

    pub fn modify_concrete(
        &mut self,
        id: MaterialId,
        overrides: &ConcreteOverrides,
    ) -> ModelResult<()> {
        self.materials.modify_concrete(id, overrides)?;
        self.invalidate();
        self.emit(EntityKind::Material, id.raw(), ChangeKind::Modified);
        Ok(())
    }

    pub fn modify_steel(&mut self, id: MaterialId, overrides: &SteelOverrides) -> ModelResult<()> {
        self.materials.modify_steel(id, overrides)?;
        self.invalidate();
        self.emit(EntityKind::Material, id.raw(), ChangeKind::Modified);
        Ok(())
    }

    /// Rename a material. The catalog repositions in sorted order; a name
    /// change alone does not touch the cached analysis.
    pub fn rename_material(&mut self, id: MaterialId, name: impl Into<String>) -> ModelResult<()> {
        self.materials.rename(id, name)?;
        self.emit(EntityKind::Material, id.raw(), ChangeKind::Modified);
        Ok(())
    }

    /// The user-overridden fields of a material, for descriptions.
    pub fn describe_material(&self, id: MaterialId) -> ModelResult<Vec<&'static str>> {
        Ok(self.materials.get(id)?.customized_fields())
    }

    /// Remove a material. Fails with `InUse` if bars reference it, unless
    /// `cascade` deletes those bars (and their loads) too.
    pub fn remove_material(&mut self, id: MaterialId, cascade: bool) -> ModelResult<()> {
        let name = self.materials.get(id)?.name().to_string();
        self.remove_referenced(EntityRef::Material(id), EntityKind::Material, &name, cascade)?;
        self.materials.remove(id);
        self.invalidate();
        self.emit(EntityKind::Material, id.raw(), ChangeKind::Removed);
        Ok(())
    }

    // ========================================================================
    // Sections
    // ========================================================================

    /// Add a section built via [`Section::from_shape`] or
    /// [`Section::from_polygon`].
    pub fn add_section(&mut self, section: Section) -> ModelResult<SectionId> {
        let id = self.sections.insert(section)?;
        self.emit(EntityKind::Section, id.raw(), ChangeKind::Added);
        Ok(id)
    }

    /// Import a built-in standard profile (see
    /// [`profiles`](crate::sections::profiles)).
    pub fn add_standard_profile(&mut self, profile_name: &str) -> ModelResult<SectionId> {
        let id = self.sections.add_standard_profile(profile_name)?;
        self.emit(EntityKind::Section, id.raw(), ChangeKind::Added);
        Ok(id)
    }

    pub fn modify_section(
        &mut self,
        id: SectionId,
        overrides: &SectionOverrides,
    ) -> ModelResult<()> {
        self.sections.get_mut(id)?.apply_overrides(overrides)?;
        self.invalidate();
        self.emit(EntityKind::Section, id.raw(), ChangeKind::Modified);
        Ok(())
    }

    /// Replace a section's shape (new dimensions or outline).
    pub fn set_section_shape(&mut self, id: SectionId, shape: SectionShape) -> ModelResult<()> {
        self.sections.get_mut(id)?.set_shape(shape)?;
        self.invalidate();
        self.emit(EntityKind::Section, id.raw(), ChangeKind::Modified);
        Ok(())
    }

    pub fn rename_section(&mut self, id: SectionId, name: impl Into<String>) -> ModelResult<()> {
        self.sections.rename(id, name)?;
        self.emit(EntityKind::Section, id.raw(), ChangeKind::Modified);
        Ok(())
    }

    pub fn describe_section(&self, id: SectionId) -> ModelResult<Vec<&'static str>> {
        Ok(self.sections.get(id)?.customized_fields())
    }

    pub fn remove_section(&mut self, id: SectionId, cascade: bool) -> ModelResult<()> {
        let name = self.sections.get(id)?.name().to_string();
        self.remove_referenced(EntityRef::Section(id), EntityKind::Section, &name, cascade)?;
        self.sections.remove(id);
        self.invalidate();
        self.emit(EntityKind::Section, id.raw(), ChangeKind::Removed);
        Ok(())
    }

    // ========================================================================
    // Releases
    // ========================================================================

    pub fn add_release(&mut self, release: Release) -> ModelResult<ReleaseId> {
        let id = self.releases.insert(release)?;
        self.emit(EntityKind::Release, id.raw(), ChangeKind::Added);
        Ok(id)
    }

    pub fn rename_release(&mut self, id: ReleaseId, name: impl Into<String>) -> ModelResult<()> {
        self.releases.rename(id, name)?;
        self.emit(EntityKind::Release, id.raw(), ChangeKind::Modified);
        Ok(())
    }

    pub fn remove_release(&mut self, id: ReleaseId, cascade: bool) -> ModelResult<()> {
        let name = self.releases.get(id)?.name().to_string();
        self.remove_referenced(EntityRef::Release(id), EntityKind::Release, &name, cascade)?;
        self.releases.remove(id);
        self.invalidate();
        self.emit(EntityKind::Release, id.raw(), ChangeKind::Removed);
        Ok(())
    }

    /// Shared InUse/cascade handling for catalog entities referenced by bars.
    fn remove_referenced(
        &mut self,
        seed: EntityRef,
        kind: EntityKind,
        name: &str,
        cascade: bool,
    ) -> ModelResult<()> {
        let dependents = self.find_dependents(&[seed], Direction::Downstream);
        if dependents.is_empty() {
            return Ok(());
        }
        if !cascade {
            return Err(ModelError::in_use(kind, name, dependents.identifiers()));
        }
        let bars: Vec<BarId> = dependents.bars.iter().copied().collect();
        log::debug!(
            "cascading removal of {} '{}': deleting {} dependent bar(s)",
            kind,
            name,
            bars.len()
        );
        self.delete_bars(&bars)
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    pub fn add_node(&mut self, position: Point3) -> ModelResult<NodeId> {
        check_position_finite(&position)?;
        let id = NodeId::generate();
        self.nodes.insert(id, Node::user(position));
        self.emit(EntityKind::Node, id.0, ChangeKind::Added);
        Ok(id)
    }

    /// Move a node. Re-validates every bar hanging off it (no collapsed
    /// bars, load offsets still within the new lengths) before committing;
    /// interior subdivision nodes of the affected bars follow.
    pub fn move_node(&mut self, id: NodeId, position: Point3) -> ModelResult<()> {
        check_position_finite(&position)?;
        let node = self.node(id)?;
        if node.origin == NodeOrigin::Subdivision {
            return Err(ModelError::parameter(
                "node",
                id.to_string(),
                "subdivision nodes follow their bar and cannot be moved directly",
            ));
        }

        let affected: Vec<BarId> = self
            .bars_iter()
            .filter(|(_, bar)| bar.node_a == id || bar.node_b == id)
            .map(|(bar_id, _)| bar_id)
            .collect();

        for bar_id in &affected {
            let bar = self.bar(*bar_id)?;
            let a = if bar.node_a == id {
                position
            } else {
                self.node(bar.node_a)?.position
            };
            let b = if bar.node_b == id {
                position
            } else {
                self.node(bar.node_b)?.position
            };
            let new_length = a.distance(&b);
            if new_length <= MIN_BAR_LENGTH {
                return Err(ModelError::domain(
                    "position",
                    format!("{:?}", position),
                    "move would collapse a bar to zero length",
                ));
            }
            self.check_bar_loads_against_length(*bar_id, new_length)?;
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = position;
        }
        for bar_id in &affected {
            self.refresh_interior_positions(*bar_id);
        }
        self.invalidate();
        self.emit(EntityKind::Node, id.0, ChangeKind::Modified);
        Ok(())
    }

    /// Remove a node. Fails with `InUse` while bars or loads reference it,
    /// unless `cascade` removes those dependents first.
    pub fn remove_node(&mut self, id: NodeId, cascade: bool) -> ModelResult<()> {
        self.node(id)?;
        let dependents = self.find_dependents(&[EntityRef::Node(id)], Direction::Downstream);
        if !dependents.is_empty() {
            if !cascade {
                return Err(ModelError::in_use(
                    EntityKind::Node,
                    id.to_string(),
                    dependents.identifiers(),
                ));
            }
            let bars: Vec<BarId> = dependents.bars.iter().copied().collect();
            self.delete_bars(&bars)?;
            self.prune_loads_referencing_node(id);
        }
        self.nodes.remove(&id);
        self.invalidate();
        self.emit(EntityKind::Node, id.0, ChangeKind::Removed);
        Ok(())
    }

    fn prune_loads_referencing_node(&mut self, id: NodeId) {
        let mut removed: Vec<(ActionId, LoadId)> = Vec::new();
        let action_ids = self.actions.ids();
        for action_id in action_ids {
            if let Ok(action) = self.actions.get_mut(action_id) {
                let load_ids: Vec<LoadId> = action.loads.keys().copied().collect();
                for load_id in load_ids {
                    if let Some(load) = action.loads.get_mut(&load_id) {
                        if !load.retain_nodes(|node| node != id) {
                            action.loads.remove(&load_id);
                            removed.push((action_id, load_id));
                        }
                    }
                }
            }
        }
        for (_, load_id) in removed {
            self.emit(EntityKind::Load, load_id.0, ChangeKind::Removed);
        }
    }

    // ========================================================================
    // Bars
    // ========================================================================

    /// Add a bar. All four references must exist; the endpoints must be
    /// distinct and apart; `subdivisions` interior sub-spans are generated
    /// eagerly as subdivision nodes owned by the bar.
    #[allow(clippy::too_many_arguments)]
    pub fn add_bar(
        &mut self,
        kind: BarKind,
        section: SectionId,
        material: MaterialId,
        node_a: NodeId,
        node_b: NodeId,
        release: Option<ReleaseId>,
        subdivisions: u32,
        rotation: f64,
    ) -> ModelResult<BarId> {
        self.sections.get(section)?;
        self.materials.get(material)?;
        if let Some(release_id) = release {
            self.releases.get(release_id)?;
        }
        let a = self.node(node_a)?.position;
        let b = self.node(node_b)?.position;
        if node_a == node_b {
            return Err(ModelError::parameter(
                "node_b",
                node_b.to_string(),
                "bar endpoints must be distinct nodes",
            ));
        }
        if a.distance(&b) <= MIN_BAR_LENGTH {
            return Err(ModelError::domain(
                "length",
                a.distance(&b).to_string(),
                "bar endpoints coincide",
            ));
        }
        if subdivisions == 0 {
            return Err(ModelError::domain(
                "subdivisions",
                "0",
                "a bar has at least one sub-span",
            ));
        }
        if !rotation.is_finite() {
            return Err(ModelError::domain(
                "rotation",
                rotation.to_string(),
                "rotation angle must be finite",
            ));
        }

        let interior_nodes = self.create_interior_nodes(a, b, subdivisions);
        let id = BarId::generate();
        self.bars.insert(
            id,
            Bar {
                kind,
                node_a,
                node_b,
                section,
                material,
                release,
                subdivisions,
                rotation,
                interior_nodes: interior_nodes.clone(),
            },
        );
        self.invalidate();
        for node_id in interior_nodes {
            self.emit(EntityKind::Node, node_id.0, ChangeKind::Added);
        }
        self.emit(EntityKind::Bar, id.0, ChangeKind::Added);
        Ok(id)
    }

    pub fn change_bar_section(&mut self, id: BarId, section: SectionId) -> ModelResult<()> {
        self.sections.get(section)?;
        self.bar(id)?;
        if let Some(bar) = self.bars.get_mut(&id) {
            bar.section = section;
        }
        self.invalidate();
        self.emit(EntityKind::Bar, id.0, ChangeKind::Modified);
        Ok(())
    }

    pub fn change_bar_material(&mut self, id: BarId, material: MaterialId) -> ModelResult<()> {
        self.materials.get(material)?;
        self.bar(id)?;
        if let Some(bar) = self.bars.get_mut(&id) {
            bar.material = material;
        }
        self.invalidate();
        self.emit(EntityKind::Bar, id.0, ChangeKind::Modified);
        Ok(())
    }

    pub fn change_bar_release(&mut self, id: BarId, release: Option<ReleaseId>) -> ModelResult<()> {
        if let Some(release_id) = release {
            self.releases.get(release_id)?;
        }
        self.bar(id)?;
        if let Some(bar) = self.bars.get_mut(&id) {
            bar.release = release;
        }
        self.invalidate();
        self.emit(EntityKind::Bar, id.0, ChangeKind::Modified);
        Ok(())
    }

    pub fn change_bar_rotation(&mut self, id: BarId, rotation: f64) -> ModelResult<()> {
        if !rotation.is_finite() {
            return Err(ModelError::domain(
                "rotation",
                rotation.to_string(),
                "rotation angle must be finite",
            ));
        }
        self.bar(id)?;
        if let Some(bar) = self.bars.get_mut(&id) {
            bar.rotation = rotation;
        }
        self.invalidate();
        self.emit(EntityKind::Bar, id.0, ChangeKind::Modified);
        Ok(())
    }

    /// Re-seat a bar on different endpoints, regenerating its subdivision
    /// nodes and re-validating the loads that ride on it.
    pub fn change_bar_nodes(
        &mut self,
        id: BarId,
        node_a: NodeId,
        node_b: NodeId,
    ) -> ModelResult<()> {
        let subdivisions = self.bar(id)?.subdivisions;
        self.rebuild_bar_geometry(id, node_a, node_b, subdivisions)
    }

    /// Change the discretization count, regenerating the subdivision nodes.
    pub fn change_bar_subdivisions(&mut self, id: BarId, subdivisions: u32) -> ModelResult<()> {
        let bar = self.bar(id)?;
        let (node_a, node_b) = (bar.node_a, bar.node_b);
        self.rebuild_bar_geometry(id, node_a, node_b, subdivisions)
    }

    fn rebuild_bar_geometry(
        &mut self,
        id: BarId,
        node_a: NodeId,
        node_b: NodeId,
        subdivisions: u32,
    ) -> ModelResult<()> {
        let a = self.node(node_a)?.position;
        let b = self.node(node_b)?.position;
        if node_a == node_b {
            return Err(ModelError::parameter(
                "node_b",
                node_b.to_string(),
                "bar endpoints must be distinct nodes",
            ));
        }
        let new_length = a.distance(&b);
        if new_length <= MIN_BAR_LENGTH {
            return Err(ModelError::domain(
                "length",
                new_length.to_string(),
                "bar endpoints coincide",
            ));
        }
        if subdivisions == 0 {
            return Err(ModelError::domain(
                "subdivisions",
                "0",
                "a bar has at least one sub-span",
            ));
        }
        self.check_bar_loads_against_length(id, new_length)?;

        // the old subdivision nodes must not be pinned down by anything else
        let old_interior = self.bar(id)?.interior_nodes.clone();
        let mut blocking: Vec<String> = Vec::new();
        for node_id in &old_interior {
            let used_elsewhere = self
                .bars_iter()
                .any(|(other_id, other)| other_id != id && other.touches(*node_id))
                || self
                    .loads_iter()
                    .any(|(_, _, load)| load.nodes().contains(node_id));
            if used_elsewhere {
                blocking.push(node_id.to_string());
            }
        }
        if !blocking.is_empty() {
            return Err(ModelError::in_use(EntityKind::Bar, id.to_string(), blocking));
        }

        for node_id in &old_interior {
            self.nodes.remove(node_id);
        }
        let interior_nodes = self.create_interior_nodes(a, b, subdivisions);
        if let Some(bar) = self.bars.get_mut(&id) {
            bar.node_a = node_a;
            bar.node_b = node_b;
            bar.subdivisions = subdivisions;
            bar.interior_nodes = interior_nodes.clone();
        }
        self.invalidate();
        for node_id in old_interior {
            self.emit(EntityKind::Node, node_id.0, ChangeKind::Removed);
        }
        for node_id in interior_nodes {
            self.emit(EntityKind::Node, node_id.0, ChangeKind::Added);
        }
        self.emit(EntityKind::Bar, id.0, ChangeKind::Modified);
        Ok(())
    }

    fn create_interior_nodes(&mut self, a: Point3, b: Point3, subdivisions: u32) -> Vec<NodeId> {
        let mut interior = Vec::new();
        for i in 1..subdivisions {
            let t = i as f64 / subdivisions as f64;
            let node_id = NodeId::generate();
            self.nodes.insert(node_id, Node::subdivision(a.lerp(&b, t)));
            interior.push(node_id);
        }
        interior
    }

    fn refresh_interior_positions(&mut self, id: BarId) {
        let Some(bar) = self.bars.get(&id) else {
            return;
        };
        let (Some(a), Some(b)) = (self.nodes.get(&bar.node_a), self.nodes.get(&bar.node_b)) else {
            return;
        };
        let (a, b) = (a.position, b.position);
        let count = bar.subdivisions as f64;
        let interior = bar.interior_nodes.clone();
        for (i, node_id) in interior.iter().enumerate() {
            let t = (i as f64 + 1.0) / count;
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.position = a.lerp(&b, t);
            }
        }
    }

    /// Validate every load riding on a bar against a (new) length.
    fn check_bar_loads_against_length(&self, id: BarId, length: f64) -> ModelResult<()> {
        for (_, _, load) in self.loads_iter() {
            if !load.bars().contains(&id) {
                continue;
            }
            match load {
                Load::BarPoint { position, .. } => point::check_position(*position, length)?,
                Load::BarDistributed {
                    start_offset,
                    end_offset,
                    ..
                } => distributed::check_span(*start_offset, *end_offset, length)?,
                Load::Nodal { .. } => {}
            }
        }
        Ok(())
    }

    /// Delete bars, the subdivision nodes only they own, and update the
    /// loads that referenced them: a load whose bar set empties is removed,
    /// one referencing surviving bars stays (trimmed).
    pub fn delete_bars(&mut self, bar_ids: &[BarId]) -> ModelResult<()> {
        for id in bar_ids {
            self.bar(*id)?;
        }
        let removing: BTreeSet<BarId> = bar_ids.iter().copied().collect();

        let mut candidate_nodes: BTreeSet<NodeId> = BTreeSet::new();
        for id in &removing {
            if let Some(bar) = self.bars.get(id) {
                candidate_nodes.extend(bar.interior_nodes.iter().copied());
            }
        }

        for id in &removing {
            self.bars.remove(id);
        }

        // prune loads
        let mut removed_loads: Vec<(ActionId, LoadId)> = Vec::new();
        let action_ids = self.actions.ids();
        for action_id in action_ids {
            if let Ok(action) = self.actions.get_mut(action_id) {
                let load_ids: Vec<LoadId> = action.loads.keys().copied().collect();
                for load_id in load_ids {
                    if let Some(load) = action.loads.get_mut(&load_id) {
                        if !load.retain_bars(|bar| !removing.contains(&bar)) {
                            action.loads.remove(&load_id);
                            removed_loads.push((action_id, load_id));
                        }
                    }
                }
            }
        }

        // subdivision nodes nothing references anymore go with their bars
        let mut removed_nodes: Vec<NodeId> = Vec::new();
        for node_id in candidate_nodes {
            let still_used = self.bars.values().any(|bar| bar.touches(node_id))
                || self
                    .loads_iter()
                    .any(|(_, _, load)| load.nodes().contains(&node_id));
            if !still_used {
                self.nodes.remove(&node_id);
                removed_nodes.push(node_id);
            }
        }

        log::debug!(
            "deleted {} bar(s), {} load(s), {} subdivision node(s)",
            removing.len(),
            removed_loads.len(),
            removed_nodes.len()
        );
        self.invalidate();
        for id in &removing {
            self.emit(EntityKind::Bar, id.0, ChangeKind::Removed);
        }
        for (_, load_id) in removed_loads {
            self.emit(EntityKind::Load, load_id.0, ChangeKind::Removed);
        }
        for node_id in removed_nodes {
            self.emit(EntityKind::Node, node_id.0, ChangeKind::Removed);
        }
        Ok(())
    }

    /// Delete every bar touching the given nodes, together with the
    /// explicitly listed bars. Convenience over [`Model::delete_bars`]; the
    /// nodes themselves stay.
    pub fn delete_bars_touching(&mut self, nodes: &[NodeId], bars: &[BarId]) -> ModelResult<()> {
        let mut selected: BTreeSet<BarId> = bars.iter().copied().collect();
        for node_id in nodes {
            self.node(*node_id)?;
            for (bar_id, bar) in self.bars_iter() {
                if bar.touches(*node_id) {
                    selected.insert(bar_id);
                }
            }
        }
        let selected: Vec<BarId> = selected.into_iter().collect();
        self.delete_bars(&selected)
    }

    // ========================================================================
    // Actions & loads
    // ========================================================================

    pub fn add_action(&mut self, name: impl Into<String>) -> ModelResult<ActionId> {
        let id = self.actions.insert(Action::new(name))?;
        self.emit(EntityKind::Action, id.raw(), ChangeKind::Added);
        Ok(id)
    }

    pub fn rename_action(&mut self, id: ActionId, name: impl Into<String>) -> ModelResult<()> {
        self.actions.rename(id, name)?;
        self.emit(EntityKind::Action, id.raw(), ChangeKind::Modified);
        Ok(())
    }

    /// Remove an action and every load in it.
    pub fn remove_action(&mut self, id: ActionId) -> ModelResult<()> {
        self.actions.get(id)?;
        self.actions.remove(id);
        self.invalidate();
        self.emit(EntityKind::Action, id.raw(), ChangeKind::Removed);
        Ok(())
    }

    /// Add a load to an action, validating its references and positions
    /// against every bar it rides on.
    pub fn add_load(&mut self, action: ActionId, load: Load) -> ModelResult<LoadId> {
        load.validate_standalone()?;
        self.actions.get(action)?;
        for node_id in load.nodes() {
            self.node(*node_id)?;
        }
        for bar_id in load.bars() {
            let length = self.bar_length(*bar_id)?;
            match &load {
                Load::BarPoint { position, .. } => point::check_position(*position, length)?,
                Load::BarDistributed {
                    start_offset,
                    end_offset,
                    ..
                } => distributed::check_span(*start_offset, *end_offset, length)?,
                Load::Nodal { .. } => {}
            }
        }
        let id = match self.actions.get_mut(action) {
            Ok(entry) => entry.add_load(load),
            Err(error) => return Err(error),
        };
        self.invalidate();
        self.emit(EntityKind::Load, id.0, ChangeKind::Added);
        Ok(id)
    }

    pub fn add_nodal_load(
        &mut self,
        action: ActionId,
        nodes: Vec<NodeId>,
        force: [f64; 3],
        moment: [f64; 3],
    ) -> ModelResult<LoadId> {
        self.add_load(
            action,
            Load::Nodal {
                nodes,
                force,
                moment,
            },
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_bar_point_load(
        &mut self,
        action: ActionId,
        bars: Vec<BarId>,
        position: f64,
        force: [f64; 3],
        moment: [f64; 3],
        frame: Frame,
    ) -> ModelResult<LoadId> {
        self.add_load(
            action,
            Load::BarPoint {
                bars,
                position,
                force,
                moment,
                frame,
            },
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_bar_distributed_load(
        &mut self,
        action: ActionId,
        bars: Vec<BarId>,
        start_offset: f64,
        end_offset: f64,
        force: [f64; 3],
        moment: [f64; 3],
        frame: Frame,
        projected: bool,
    ) -> ModelResult<LoadId> {
        self.add_load(
            action,
            Load::BarDistributed {
                bars,
                start_offset,
                end_offset,
                force,
                moment,
                frame,
                projected,
            },
        )
    }

    pub fn remove_load(&mut self, action: ActionId, load: LoadId) -> ModelResult<()> {
        let entry = self.actions.get_mut(action)?;
        if entry.remove_load(load).is_none() {
            return Err(ModelError::not_found(EntityKind::Load, load));
        }
        self.invalidate();
        self.emit(EntityKind::Load, load.0, ChangeKind::Removed);
        Ok(())
    }

    // ========================================================================
    // Integrity
    // ========================================================================

    /// Full integrity re-check, for freshly deserialized models: catalog
    /// name uniqueness, reference integrity, load positions.
    pub fn validate(&self) -> ModelResult<()> {
        check_unique_names(
            self.materials.iter().map(|(_, m)| m.name()),
            EntityKind::Material,
        )?;
        check_unique_names(
            self.sections.iter().map(|(_, s)| s.name()),
            EntityKind::Section,
        )?;
        check_unique_names(
            self.releases.iter().map(|(_, r)| r.name()),
            EntityKind::Release,
        )?;
        check_unique_names(
            self.actions.iter().map(|(_, a)| a.name()),
            EntityKind::Action,
        )?;

        for (bar_id, bar) in self.bars_iter() {
            self.materials.get(bar.material)?;
            self.sections.get(bar.section)?;
            if let Some(release) = bar.release {
                self.releases.get(release)?;
            }
            for node_id in bar.all_nodes() {
                self.node(node_id)?;
            }
            if bar.node_a == bar.node_b {
                return Err(ModelError::parameter(
                    "bar",
                    bar_id.to_string(),
                    "bar endpoints must be distinct nodes",
                ));
            }
            if bar.subdivisions == 0 {
                return Err(ModelError::domain(
                    "subdivisions",
                    "0",
                    "a bar has at least one sub-span",
                ));
            }
            if bar.interior_nodes.len() != (bar.subdivisions - 1) as usize {
                return Err(ModelError::parameter(
                    "bar",
                    bar_id.to_string(),
                    "subdivision node count does not match the discretization",
                ));
            }
            if self.bar_length(bar_id)? <= MIN_BAR_LENGTH {
                return Err(ModelError::domain(
                    "length",
                    "0",
                    "bar endpoints coincide",
                ));
            }
        }

        for (_, _, load) in self.loads_iter() {
            load.validate_standalone()?;
            for node_id in load.nodes() {
                self.node(*node_id)?;
            }
            for bar_id in load.bars() {
                let length = self.bar_length(*bar_id)?;
                match load {
                    Load::BarPoint { position, .. } => point::check_position(*position, length)?,
                    Load::BarDistributed {
                        start_offset,
                        end_offset,
                        ..
                    } => distributed::check_span(*start_offset, *end_offset, length)?,
                    Load::Nodal { .. } => {}
                }
            }
        }
        Ok(())
    }
}

fn check_position_finite(position: &Point3) -> ModelResult<()> {
    if !(position.x.is_finite() && position.y.is_finite() && position.z.is_finite()) {
        return Err(ModelError::domain(
            "position",
            format!("{:?}", position),
            "node coordinates must be finite",
        ));
    }
    Ok(())
}

fn check_unique_names<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: EntityKind,
) -> ModelResult<()> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ModelError::duplicate_name(kind, name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Solution;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct CountingSolver {
        calls: usize,
    }

    impl Solver for CountingSolver {
        fn solve(&mut self, _model: &Model) -> ModelResult<Solution> {
            self.calls += 1;
            Ok(Solution::default())
        }
    }

    struct FailingSolver;

    impl Solver for FailingSolver {
        fn solve(&mut self, _model: &Model) -> ModelResult<Solution> {
            Err(ModelError::solver("singular stiffness matrix"))
        }
    }

    fn basic_model() -> (Model, MaterialId, SectionId, NodeId, NodeId) {
        let mut model = Model::new();
        let material = model.add_concrete("C25/30", 25.0).unwrap();
        let section = model
            .add_section(
                Section::from_shape(
                    "R30x50",
                    SectionShape::Rectangular {
                        width: 0.3,
                        height: 0.5,
                    },
                )
                .unwrap(),
            )
            .unwrap();
        let n0 = model.add_node(Point3::new(0.0, 0.0, 0.0)).unwrap();
        let n1 = model.add_node(Point3::new(4.0, 0.0, 0.0)).unwrap();
        (model, material, section, n0, n1)
    }

    #[test]
    fn test_add_bar_validates_references() {
        let (mut model, material, section, n0, n1) = basic_model();
        let ghost_section = SectionId(Uuid::new_v4());
        assert!(model
            .add_bar(BarKind::Beam, ghost_section, material, n0, n1, None, 1, 0.0)
            .is_err());
        assert!(model
            .add_bar(BarKind::Beam, section, material, n0, n0, None, 1, 0.0)
            .is_err());
        assert!(model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 0, 0.0)
            .is_err());

        let bar = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        assert_eq!(model.bar_length(bar).unwrap(), 4.0);
    }

    #[test]
    fn test_subdivisions_create_interior_nodes() {
        let (mut model, material, section, n0, n1) = basic_model();
        let bar = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 4, 0.0)
            .unwrap();
        let interior = model.bar(bar).unwrap().interior_nodes.clone();
        assert_eq!(interior.len(), 3);
        let mid = model.node(interior[1]).unwrap();
        assert_eq!(mid.origin, NodeOrigin::Subdivision);
        assert!((mid.position.x - 2.0).abs() < 1e-12);

        // deleting the bar sweeps its subdivision nodes
        model.delete_bars(&[bar]).unwrap();
        assert!(model.node(interior[1]).is_err());
        assert_eq!(model.node_count(), 2);
    }

    #[test]
    fn test_distributed_load_offset_bounds() {
        let (mut model, material, section, n0, n1) = basic_model();
        let bar = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        let action = model.add_action("Dead").unwrap();

        let down = [0.0, 0.0, -10.0];
        assert!(model
            .add_bar_distributed_load(
                action, vec![bar], -0.1, 0.0, down, [0.0; 3], Frame::Global, false
            )
            .is_err());
        assert!(model
            .add_bar_distributed_load(
                action, vec![bar], 0.0, -0.1, down, [0.0; 3], Frame::Global, false
            )
            .is_err());
        assert!(model
            .add_bar_distributed_load(
                action, vec![bar], 2.5, 1.6, down, [0.0; 3], Frame::Global, false
            )
            .is_err());
        // offsets meeting exactly at the bar length are fine
        assert!(model
            .add_bar_distributed_load(
                action, vec![bar], 2.5, 1.5, down, [0.0; 3], Frame::Global, false
            )
            .is_ok());
    }

    #[test]
    fn test_remove_material_in_use_then_cascade() {
        let (mut model, material, section, n0, n1) = basic_model();
        let bar = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();

        let err = model.remove_material(material, false).unwrap_err();
        match &err {
            ModelError::InUse { dependents, .. } => {
                assert!(dependents.iter().any(|d| d.contains(&bar.0.to_string())));
            }
            other => panic!("expected InUse, got {:?}", other),
        }
        assert!(model.materials().contains(material), "failed delete left the catalog alone");

        // removing the referencing bar unblocks the delete
        model.delete_bars(&[bar]).unwrap();
        model.remove_material(material, false).unwrap();
        assert!(!model.materials().contains(material));
    }

    #[test]
    fn test_remove_section_cascade_deletes_bars_and_loads() {
        let (mut model, material, section, n0, n1) = basic_model();
        let bar = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        let action = model.add_action("Dead").unwrap();
        model
            .add_bar_distributed_load(
                action,
                vec![bar],
                0.0,
                0.0,
                [0.0, 0.0, -10.0],
                [0.0; 3],
                Frame::Global,
                false,
            )
            .unwrap();

        model.remove_section(section, true).unwrap();
        assert_eq!(model.bar_count(), 0);
        assert!(model.actions().get(action).unwrap().is_empty());
    }

    #[test]
    fn test_load_survives_partial_bar_deletion() {
        let (mut model, material, section, n0, n1) = basic_model();
        let n2 = model.add_node(Point3::new(8.0, 0.0, 0.0)).unwrap();
        let b0 = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        let b1 = model
            .add_bar(BarKind::Beam, section, material, n1, n2, None, 1, 0.0)
            .unwrap();
        let action = model.add_action("Dead").unwrap();
        let load = model
            .add_bar_distributed_load(
                action,
                vec![b0, b1],
                0.0,
                0.0,
                [0.0, 0.0, -10.0],
                [0.0; 3],
                Frame::Global,
                false,
            )
            .unwrap();

        model.delete_bars(&[b0]).unwrap();
        let survivor = model.actions().get(action).unwrap().load(load).unwrap();
        assert_eq!(survivor.bars(), &[b1]);

        model.delete_bars(&[b1]).unwrap();
        assert!(model.actions().get(action).unwrap().load(load).is_none());
    }

    #[test]
    fn test_delete_bars_touching_node() {
        let (mut model, material, section, n0, n1) = basic_model();
        let n2 = model.add_node(Point3::new(8.0, 0.0, 0.0)).unwrap();
        let b0 = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        let b1 = model
            .add_bar(BarKind::Beam, section, material, n1, n2, None, 1, 0.0)
            .unwrap();

        // n1 is shared: both bars go, the nodes stay
        model.delete_bars_touching(&[n1], &[]).unwrap();
        assert!(model.bar(b0).is_err());
        assert!(model.bar(b1).is_err());
        assert!(model.node(n1).is_ok());
    }

    #[test]
    fn test_solver_called_again_after_mutation() {
        let (mut model, material, section, n0, n1) = basic_model();
        model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        let mut solver = CountingSolver { calls: 0 };

        model.results(&mut solver).unwrap();
        assert_eq!(solver.calls, 1);

        // cached: no extra call
        model.results(&mut solver).unwrap();
        assert_eq!(solver.calls, 1);
        assert!(model.has_cached_results());

        // a numeric material change discards the cache
        model
            .modify_concrete(
                material,
                &ConcreteOverrides {
                    fctm: Some(3.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!model.has_cached_results());
        model.results(&mut solver).unwrap();
        assert_eq!(solver.calls, 2);

        // moving a node discards it too
        model.move_node(n1, Point3::new(5.0, 0.0, 0.0)).unwrap();
        model.results(&mut solver).unwrap();
        assert_eq!(solver.calls, 3);
    }

    #[test]
    fn test_solver_failure_is_non_fatal() {
        let (mut model, material, section, n0, n1) = basic_model();
        model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        let err = model.results(&mut FailingSolver).unwrap_err();
        assert_eq!(err.error_code(), "SOLVER");
        // the model is untouched and a later solve can succeed
        assert_eq!(model.bar_count(), 1);
        let mut solver = CountingSolver { calls: 0 };
        assert!(model.results(&mut solver).is_ok());
    }

    #[test]
    fn test_move_node_blocked_by_load_bounds() {
        let (mut model, material, section, n0, n1) = basic_model();
        let bar = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        let action = model.add_action("Dead").unwrap();
        model
            .add_bar_distributed_load(
                action,
                vec![bar],
                2.0,
                1.5,
                [0.0, 0.0, -10.0],
                [0.0; 3],
                Frame::Global,
                false,
            )
            .unwrap();

        // shortening the bar to 3 m would leave a+b=3.5 out of bounds
        let err = model.move_node(n1, Point3::new(3.0, 0.0, 0.0)).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN");
        assert_eq!(model.bar_length(bar).unwrap(), 4.0, "rejected move left the node");

        // a longer bar is fine and the interior geometry follows
        model.move_node(n1, Point3::new(6.0, 0.0, 0.0)).unwrap();
        assert_eq!(model.bar_length(bar).unwrap(), 6.0);
    }

    #[test]
    fn test_move_subdivision_node_rejected() {
        let (mut model, material, section, n0, n1) = basic_model();
        let bar = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 2, 0.0)
            .unwrap();
        let interior = model.bar(bar).unwrap().interior_nodes[0];
        assert!(model
            .move_node(interior, Point3::new(1.0, 1.0, 0.0))
            .is_err());
    }

    #[test]
    fn test_change_bar_subdivisions_regenerates() {
        let (mut model, material, section, n0, n1) = basic_model();
        let bar = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 2, 0.0)
            .unwrap();
        let old_interior = model.bar(bar).unwrap().interior_nodes.clone();
        assert_eq!(old_interior.len(), 1);

        model.change_bar_subdivisions(bar, 3).unwrap();
        let new_interior = model.bar(bar).unwrap().interior_nodes.clone();
        assert_eq!(new_interior.len(), 2);
        assert!(model.node(old_interior[0]).is_err(), "old nodes swept");
        let third = model.node(new_interior[0]).unwrap();
        assert!((third.position.x - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_remove_node_in_use_and_cascade() {
        let (mut model, material, section, n0, n1) = basic_model();
        model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();

        assert!(model.remove_node(n0, false).is_err());
        model.remove_node(n0, true).unwrap();
        assert_eq!(model.bar_count(), 0);
        assert!(model.node(n0).is_err());
        assert!(model.node(n1).is_ok());
    }

    #[test]
    fn test_events_emitted_on_committed_mutations() {
        let seen: Rc<RefCell<Vec<(EntityKind, ChangeKind)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let (mut model, material, ..) = basic_model();
        model.subscribe(move |change| {
            sink.borrow_mut().push((change.entity, change.change));
        });

        model.rename_material(material, "C25/30 (site)").unwrap();
        assert_eq!(
            seen.borrow().as_slice(),
            &[(EntityKind::Material, ChangeKind::Modified)]
        );

        // a rejected mutation emits nothing
        let before = seen.borrow().len();
        assert!(model.add_concrete("C25/30 (site)", 120.0).is_err());
        assert_eq!(seen.borrow().len(), before);
    }

    #[test]
    fn test_rename_repositions_catalog_order() {
        let (mut model, material, ..) = basic_model();
        model.add_concrete("A-grade", 30.0).unwrap();
        model.rename_material(material, "Z-grade").unwrap();
        let names: Vec<&str> = model
            .materials()
            .iter_sorted()
            .iter()
            .map(|(_, m)| m.name())
            .collect();
        assert_eq!(names, vec!["A-grade", "Z-grade"]);
    }

    #[test]
    fn test_span_flexibility_through_model() {
        let (mut model, material, section, n0, n1) = basic_model();
        let bar = model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 2, 0.0)
            .unwrap();
        let f = model.bar_span_flexibility(bar).unwrap();
        // two sub-spans of 2 m each
        let e = model.materials().get(material).unwrap().elastic_modulus() * 1.0e6;
        let iy = model.sections().get(section).unwrap().properties.iy.value;
        assert!((f.ay - 2.0 / (3.0 * e * iy)).abs() < 1e-18);
        assert_eq!(f.ay, f.cy);
    }

    #[test]
    fn test_validate_catches_corruption() {
        let (mut model, material, section, n0, n1) = basic_model();
        model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        assert!(model.validate().is_ok());

        // sever a node behind the model's back, as a corrupt file would
        model.nodes.remove(&n1);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_model_serialization_roundtrip() {
        let (mut model, material, section, n0, n1) = basic_model();
        model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 2, 0.0)
            .unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let parsed: Model = serde_json::from_str(&json).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.bar_count(), 1);
        assert_eq!(parsed.node_count(), 3);
    }
}
