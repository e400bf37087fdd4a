//! # Materials
//!
//! Concrete (EN 1992-1-1) and steel (EN 1993-1-1) material definitions with
//! derived property sets and per-field provenance tracking.
//!
//! ## Provenance
//!
//! Every numeric field is a [`Prop`]: a value plus a tag saying whether it
//! was derived from the governing input (fck for concrete, the code defaults
//! for steel) or supplied by the user. Overriding a field flips its tag and
//! suppresses future re-derivation of that field, so a customized value
//! survives edits to the rest of the material.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::materials::{ConcreteMaterial, Material};
//!
//! let material = Material::Concrete(ConcreteMaterial::from_fck("C25/30", 25.0).unwrap());
//! assert_eq!(material.name(), "C25/30");
//! assert!((material.elastic_modulus() - 31_476.0).abs() < 1.0); // MPa
//! ```

pub mod concrete;
pub mod steel;

pub use concrete::{ConcreteMaterial, ConcreteOverrides, NU_CONCRETE};
pub use steel::{SteelMaterial, SteelOverrides, E_STEEL, NU_STEEL};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{CatalogEntry, CatalogId, NamedArena};
use crate::errors::{EntityKind, ModelError, ModelResult};
use crate::units::{GigaPascals, MegaPascals};

/// Stable opaque handle to a catalog material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub Uuid);

impl CatalogId for MaterialId {
    fn generate() -> Self {
        MaterialId(Uuid::new_v4())
    }
    fn raw(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "material:{}", self.0)
    }
}

/// How a numeric property value came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Computed from the governing input; tracks it on re-derivation.
    Derived,
    /// Explicitly set by the user; re-derivation leaves it alone.
    UserSupplied,
}

/// A numeric property with provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    pub value: f64,
    pub provenance: Provenance,
}

impl Prop {
    pub fn derived(value: f64) -> Self {
        Prop {
            value,
            provenance: Provenance::Derived,
        }
    }

    pub fn user(value: f64) -> Self {
        Prop {
            value,
            provenance: Provenance::UserSupplied,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.provenance == Provenance::UserSupplied
    }

    /// Overwrite with a user-supplied value, flipping provenance.
    pub fn set_user(&mut self, value: f64) {
        self.value = value;
        self.provenance = Provenance::UserSupplied;
    }

    /// Replace the value only while still derived.
    pub fn rederive(&mut self, value: f64) {
        if self.provenance == Provenance::Derived {
            self.value = value;
        }
    }
}

/// A catalog material: concrete or steel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Material {
    Concrete(ConcreteMaterial),
    Steel(SteelMaterial),
}

impl Material {
    pub fn name(&self) -> &str {
        match self {
            Material::Concrete(c) => &c.name,
            Material::Steel(s) => &s.name,
        }
    }

    /// Elastic modulus in MPa (concrete: Ecm converted from GPa).
    pub fn elastic_modulus(&self) -> f64 {
        match self {
            Material::Concrete(c) => MegaPascals::from(GigaPascals(c.ecm.value)).0,
            Material::Steel(s) => s.e.value,
        }
    }

    pub fn poisson_ratio(&self) -> f64 {
        match self {
            Material::Concrete(c) => c.nu.value,
            Material::Steel(s) => s.nu.value,
        }
    }

    /// Shear modulus G = E / (2 (1 + nu)) in MPa.
    pub fn shear_modulus(&self) -> f64 {
        self.elastic_modulus() / (2.0 * (1.0 + self.poisson_ratio()))
    }

    /// Names of user-overridden fields, for presentation-layer descriptions.
    pub fn customized_fields(&self) -> Vec<&'static str> {
        match self {
            Material::Concrete(c) => c.customized_fields(),
            Material::Steel(s) => s.customized_fields(),
        }
    }

    pub fn material_type(&self) -> &'static str {
        match self {
            Material::Concrete(_) => "Concrete",
            Material::Steel(_) => "Steel",
        }
    }
}

impl CatalogEntry for Material {
    fn name(&self) -> &str {
        Material::name(self)
    }
    fn set_name(&mut self, name: String) {
        match self {
            Material::Concrete(c) => c.name = name,
            Material::Steel(s) => s.name = name,
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Material::Concrete(c) => c.fmt(f),
            Material::Steel(s) => s.fmt(f),
        }
    }
}

impl From<ConcreteMaterial> for Material {
    fn from(material: ConcreteMaterial) -> Self {
        Material::Concrete(material)
    }
}

impl From<SteelMaterial> for Material {
    fn from(material: SteelMaterial) -> Self {
        Material::Steel(material)
    }
}

/// Name-sorted catalog of materials.
pub type MaterialCatalog = NamedArena<MaterialId, Material>;

impl MaterialCatalog {
    /// Add a concrete grade derived from fck. Nothing is inserted on failure.
    pub fn add_concrete(&mut self, name: impl Into<String>, fck: f64) -> ModelResult<MaterialId> {
        let material = ConcreteMaterial::from_fck(name, fck)?;
        self.insert(Material::Concrete(material))
    }

    /// Add a steel grade.
    pub fn add_steel(
        &mut self,
        name: impl Into<String>,
        fy: f64,
        fu: f64,
    ) -> ModelResult<MaterialId> {
        let material = SteelMaterial::new(name, fy, fu)?;
        self.insert(Material::Steel(material))
    }

    /// Apply concrete overrides to a material that must be concrete.
    pub fn modify_concrete(
        &mut self,
        id: MaterialId,
        overrides: &ConcreteOverrides,
    ) -> ModelResult<()> {
        match self.get_mut(id)? {
            Material::Concrete(c) => c.apply_overrides(overrides),
            Material::Steel(_) => Err(ModelError::parameter(
                "material",
                id.to_string(),
                "concrete overrides applied to a steel material",
            )),
        }
    }

    /// Apply steel overrides to a material that must be steel.
    pub fn modify_steel(&mut self, id: MaterialId, overrides: &SteelOverrides) -> ModelResult<()> {
        match self.get_mut(id)? {
            Material::Steel(s) => s.apply_overrides(overrides),
            Material::Concrete(_) => Err(ModelError::parameter(
                "material",
                id.to_string(),
                "steel overrides applied to a concrete material",
            )),
        }
    }
}

/// Fresh material catalog.
pub fn material_catalog() -> MaterialCatalog {
    NamedArena::new(EntityKind::Material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sorted_iteration() {
        let mut catalog = material_catalog();
        catalog.add_concrete("C30/37", 30.0).unwrap();
        catalog.add_steel("S235", 235.0, 360.0).unwrap();
        catalog.add_concrete("C25/30", 25.0).unwrap();

        let names: Vec<&str> = catalog
            .iter_sorted()
            .iter()
            .map(|(_, m)| m.name())
            .collect();
        assert_eq!(names, vec!["C25/30", "C30/37", "S235"]);
    }

    #[test]
    fn test_duplicate_name_across_variants() {
        let mut catalog = material_catalog();
        catalog.add_concrete("M1", 25.0).unwrap();
        let err = catalog.add_steel("M1", 235.0, 360.0).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_NAME");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_rejected_concrete_not_inserted() {
        let mut catalog = material_catalog();
        assert!(catalog.add_concrete("bad", 120.0).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_elastic_constants_through_enum() {
        let mut catalog = material_catalog();
        let concrete = catalog.add_concrete("C25/30", 25.0).unwrap();
        let steel = catalog.add_steel("S235", 235.0, 360.0).unwrap();

        let c = catalog.get(concrete).unwrap();
        assert!((c.elastic_modulus() - 31_475.8).abs() < 1.0);
        assert!((c.shear_modulus() - c.elastic_modulus() / 2.4).abs() < 1e-9);

        let s = catalog.get(steel).unwrap();
        assert_eq!(s.elastic_modulus(), 210_000.0);
        assert!((s.shear_modulus() - 80_769.23).abs() < 0.01);
    }

    #[test]
    fn test_modify_wrong_variant() {
        let mut catalog = material_catalog();
        let steel = catalog.add_steel("S235", 235.0, 360.0).unwrap();
        let err = catalog
            .modify_concrete(steel, &ConcreteOverrides::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "PARAMETER");
    }

    #[test]
    fn test_material_serialization_tagged() {
        let material = Material::Steel(SteelMaterial::new("S355", 355.0, 490.0).unwrap());
        let json = serde_json::to_string(&material).unwrap();
        assert!(json.contains("\"type\":\"Steel\""));
        let parsed: Material = serde_json::from_str(&json).unwrap();
        assert_eq!(material, parsed);
    }
}
