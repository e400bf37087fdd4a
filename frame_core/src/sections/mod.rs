//! # Sections
//!
//! Cross-section definitions with uniformly exposed geometric properties.
//! Parametric shapes (rectangle, T, square, circle) derive their properties
//! from their dimensions; custom polygon sections accept supplied
//! properties and only validate the outline geometry.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::sections::{section_catalog, SectionCatalog};
//!
//! let mut catalog = section_catalog();
//! let id = catalog.add_rectangular("R30x50", 0.3, 0.5).unwrap();
//! let section = catalog.get(id).unwrap();
//! assert!((section.properties.area.value - 0.15).abs() < 1e-12);
//! ```

pub mod polygon;
pub mod profiles;
pub mod shapes;

pub use polygon::{OutlinePoint, PolygonOutline};
pub use profiles::{find_profile, standard_profiles, ProfileRecord};
pub use shapes::ShapeProperties;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{CatalogEntry, CatalogId, NamedArena};
use crate::errors::{EntityKind, ModelError, ModelResult};
use crate::materials::{Prop, Provenance};

/// Stable opaque handle to a catalog section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub Uuid);

impl CatalogId for SectionId {
    fn generate() -> Self {
        SectionId(Uuid::new_v4())
    }
    fn raw(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "section:{}", self.0)
    }
}

/// The parametric (or custom) shape of a section. Dimensions in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SectionShape {
    Rectangular {
        width: f64,
        height: f64,
    },
    T {
        flange_width: f64,
        flange_height: f64,
        web_width: f64,
        web_height: f64,
    },
    Square {
        side: f64,
    },
    Circular {
        diameter: f64,
    },
    /// Custom outline with supplied properties.
    Polygon {
        outline: PolygonOutline,
    },
}

impl SectionShape {
    pub fn shape_type(&self) -> &'static str {
        match self {
            SectionShape::Rectangular { .. } => "Rectangular",
            SectionShape::T { .. } => "T",
            SectionShape::Square { .. } => "Square",
            SectionShape::Circular { .. } => "Circular",
            SectionShape::Polygon { .. } => "Polygon",
        }
    }

    fn check_positive(field: &'static str, value: f64) -> ModelResult<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ModelError::domain(
                field,
                value.to_string(),
                "dimension must be positive",
            ));
        }
        Ok(())
    }

    /// Validate the shape's dimensions (or outline).
    pub fn validate(&self) -> ModelResult<()> {
        match self {
            SectionShape::Rectangular { width, height } => {
                Self::check_positive("width", *width)?;
                Self::check_positive("height", *height)
            }
            SectionShape::T {
                flange_width,
                flange_height,
                web_width,
                web_height,
            } => {
                Self::check_positive("flange_width", *flange_width)?;
                Self::check_positive("flange_height", *flange_height)?;
                Self::check_positive("web_width", *web_width)?;
                Self::check_positive("web_height", *web_height)
            }
            SectionShape::Square { side } => Self::check_positive("side", *side),
            SectionShape::Circular { diameter } => Self::check_positive("diameter", *diameter),
            SectionShape::Polygon { outline } => polygon::validate_rings(outline.rings()),
        }
    }

    /// Closed-form properties for parametric shapes; None for polygons.
    pub fn derive(&self) -> Option<ShapeProperties> {
        match self {
            SectionShape::Rectangular { width, height } => Some(shapes::rectangle(*width, *height)),
            SectionShape::T {
                flange_width,
                flange_height,
                web_width,
                web_height,
            } => Some(shapes::t_section(
                *flange_width,
                *flange_height,
                *web_width,
                *web_height,
            )),
            SectionShape::Square { side } => Some(shapes::square(*side)),
            SectionShape::Circular { diameter } => Some(shapes::circle(*diameter)),
            SectionShape::Polygon { .. } => None,
        }
    }
}

/// The uniform property set every section exposes, provenance-tagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Torsion constant (m⁴)
    pub j: Prop,
    /// Second moment about y (m⁴)
    pub iy: Prop,
    /// Second moment about z (m⁴)
    pub iz: Prop,
    /// Cross-sectional area (m²)
    pub area: Prop,
    /// Extreme-fiber distance along +y (m)
    pub vy: Prop,
    /// Extreme-fiber distance along -y (m)
    pub vy_prime: Prop,
    /// Extreme-fiber distance along +z (m)
    pub vz: Prop,
    /// Extreme-fiber distance along -z (m)
    pub vz_prime: Prop,
}

impl SectionProperties {
    fn from_derived(shape: ShapeProperties) -> Self {
        SectionProperties {
            j: Prop::derived(shape.j),
            iy: Prop::derived(shape.iy),
            iz: Prop::derived(shape.iz),
            area: Prop::derived(shape.area),
            vy: Prop::derived(shape.vy),
            vy_prime: Prop::derived(shape.vy_prime),
            vz: Prop::derived(shape.vz),
            vz_prime: Prop::derived(shape.vz_prime),
        }
    }

    fn from_supplied(shape: ShapeProperties) -> Self {
        SectionProperties {
            j: Prop::user(shape.j),
            iy: Prop::user(shape.iy),
            iz: Prop::user(shape.iz),
            area: Prop::user(shape.area),
            vy: Prop::user(shape.vy),
            vy_prime: Prop::user(shape.vy_prime),
            vz: Prop::user(shape.vz),
            vz_prime: Prop::user(shape.vz_prime),
        }
    }

    /// All fields with their names.
    pub fn fields(&self) -> [(&'static str, &Prop); 8] {
        [
            ("j", &self.j),
            ("iy", &self.iy),
            ("iz", &self.iz),
            ("area", &self.area),
            ("vy", &self.vy),
            ("vy_prime", &self.vy_prime),
            ("vz", &self.vz),
            ("vz_prime", &self.vz_prime),
        ]
    }
}

/// Optional per-field overrides for `modify` operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionOverrides {
    pub j: Option<f64>,
    pub iy: Option<f64>,
    pub iz: Option<f64>,
    pub area: Option<f64>,
    pub vy: Option<f64>,
    pub vy_prime: Option<f64>,
    pub vz: Option<f64>,
    pub vz_prime: Option<f64>,
}

/// A catalog section: named shape plus its property set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub shape: SectionShape,
    pub properties: SectionProperties,
}

impl Section {
    /// Create a section from a parametric shape, deriving its properties.
    pub fn from_shape(name: impl Into<String>, shape: SectionShape) -> ModelResult<Self> {
        shape.validate()?;
        let name = name.into();
        let properties = match shape.derive() {
            Some(derived) => SectionProperties::from_derived(derived),
            None => {
                return Err(ModelError::parameter(
                    "shape",
                    "Polygon",
                    "polygon sections require supplied properties",
                ))
            }
        };
        let section = Section {
            name,
            shape,
            properties,
        };
        section.check_finite()?;
        Ok(section)
    }

    /// Create a custom polygon section: the outline is validated, the
    /// numeric properties are trusted as supplied.
    pub fn from_polygon(
        name: impl Into<String>,
        outline: PolygonOutline,
        supplied: ShapeProperties,
    ) -> ModelResult<Self> {
        let section = Section {
            name: name.into(),
            shape: SectionShape::Polygon { outline },
            properties: SectionProperties::from_supplied(supplied),
        };
        section.check_finite()?;
        Ok(section)
    }

    fn check_finite(&self) -> ModelResult<()> {
        for (field, prop) in self.properties.fields() {
            if !prop.value.is_finite() {
                return Err(ModelError::non_finite(
                    EntityKind::Section,
                    &self.name,
                    field,
                ));
            }
        }
        Ok(())
    }

    /// Replace the shape (new dimensions or outline) and re-derive the
    /// still-derived properties.
    pub fn set_shape(&mut self, shape: SectionShape) -> ModelResult<()> {
        shape.validate()?;
        match shape.derive() {
            Some(derived) => {
                self.shape = shape;
                let fresh = SectionProperties::from_derived(derived);
                self.properties.j.rederive(fresh.j.value);
                self.properties.iy.rederive(fresh.iy.value);
                self.properties.iz.rederive(fresh.iz.value);
                self.properties.area.rederive(fresh.area.value);
                self.properties.vy.rederive(fresh.vy.value);
                self.properties.vy_prime.rederive(fresh.vy_prime.value);
                self.properties.vz.rederive(fresh.vz.value);
                self.properties.vz_prime.rederive(fresh.vz_prime.value);
            }
            None => {
                // polygon: keep the supplied property set, swap the outline
                self.shape = shape;
            }
        }
        self.check_finite()
    }

    /// Apply explicit property overrides, flipping provenance on each.
    pub fn apply_overrides(&mut self, overrides: &SectionOverrides) -> ModelResult<()> {
        let pairs: [(&Option<f64>, &mut Prop); 8] = [
            (&overrides.j, &mut self.properties.j),
            (&overrides.iy, &mut self.properties.iy),
            (&overrides.iz, &mut self.properties.iz),
            (&overrides.area, &mut self.properties.area),
            (&overrides.vy, &mut self.properties.vy),
            (&overrides.vy_prime, &mut self.properties.vy_prime),
            (&overrides.vz, &mut self.properties.vz),
            (&overrides.vz_prime, &mut self.properties.vz_prime),
        ];
        for (value, prop) in pairs {
            if let Some(value) = value {
                prop.set_user(*value);
            }
        }
        self.check_finite()
    }

    /// Names of user-overridden properties. For polygon sections every
    /// property is supplied, so all of them report as customized.
    pub fn customized_fields(&self) -> Vec<&'static str> {
        self.properties
            .fields()
            .into_iter()
            .filter(|(_, prop)| prop.provenance == Provenance::UserSupplied)
            .map(|(field, _)| field)
            .collect()
    }
}

impl CatalogEntry for Section {
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] (A={:.4} m², Iy={:.3e} m⁴)",
            self.name,
            self.shape.shape_type(),
            self.properties.area.value,
            self.properties.iy.value
        )
    }
}

/// Name-sorted catalog of sections.
pub type SectionCatalog = NamedArena<SectionId, Section>;

impl SectionCatalog {
    pub fn add_rectangular(
        &mut self,
        name: impl Into<String>,
        width: f64,
        height: f64,
    ) -> ModelResult<SectionId> {
        let section = Section::from_shape(name, SectionShape::Rectangular { width, height })?;
        self.insert(section)
    }

    pub fn add_t(
        &mut self,
        name: impl Into<String>,
        flange_width: f64,
        flange_height: f64,
        web_width: f64,
        web_height: f64,
    ) -> ModelResult<SectionId> {
        let section = Section::from_shape(
            name,
            SectionShape::T {
                flange_width,
                flange_height,
                web_width,
                web_height,
            },
        )?;
        self.insert(section)
    }

    pub fn add_square(&mut self, name: impl Into<String>, side: f64) -> ModelResult<SectionId> {
        let section = Section::from_shape(name, SectionShape::Square { side })?;
        self.insert(section)
    }

    pub fn add_circular(
        &mut self,
        name: impl Into<String>,
        diameter: f64,
    ) -> ModelResult<SectionId> {
        let section = Section::from_shape(name, SectionShape::Circular { diameter })?;
        self.insert(section)
    }

    pub fn add_polygon(
        &mut self,
        name: impl Into<String>,
        outline: PolygonOutline,
        supplied: ShapeProperties,
    ) -> ModelResult<SectionId> {
        let section = Section::from_polygon(name, outline, supplied)?;
        self.insert(section)
    }

    /// Import a built-in standard profile as a polygon section, using its
    /// published properties and generated outline.
    pub fn add_standard_profile(&mut self, profile_name: &str) -> ModelResult<SectionId> {
        let profile = find_profile(profile_name).ok_or_else(|| {
            ModelError::parameter(
                "profile",
                profile_name,
                "not in the built-in profile library",
            )
        })?;
        let supplied = ShapeProperties {
            j: profile.j,
            iy: profile.iy,
            iz: profile.iz,
            area: profile.area,
            vy: profile.vy(),
            vy_prime: profile.vy(),
            vz: profile.vz(),
            vz_prime: profile.vz(),
        };
        self.add_polygon(profile.name, profile.outline()?, supplied)
    }
}

/// Fresh section catalog.
pub fn section_catalog() -> SectionCatalog {
    NamedArena::new(EntityKind::Section)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parametric_sections_derive() {
        let mut catalog = section_catalog();
        let rect = catalog.add_rectangular("R", 0.3, 0.5).unwrap();
        let circle = catalog.add_circular("D40", 0.4).unwrap();

        let r = catalog.get(rect).unwrap();
        assert!((r.properties.iy.value - 0.3 * 0.125 / 12.0).abs() < 1e-12);
        assert!(r.customized_fields().is_empty());

        let c = catalog.get(circle).unwrap();
        assert!((c.properties.j.value - 2.0 * c.properties.iy.value).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_dimension_rejected() {
        let mut catalog = section_catalog();
        assert!(catalog.add_rectangular("bad", -0.3, 0.5).is_err());
        assert!(catalog.add_square("bad", 0.0).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_polygon_section_trusts_supplied_properties() {
        let mut catalog = section_catalog();
        let id = catalog.add_standard_profile("IPE 200").unwrap();
        let section = catalog.get(id).unwrap();
        // published value, not recomputed from the outline
        assert!((section.properties.iy.value - 1.943e-5).abs() < 1e-9);
        // supplied properties all count as customized
        assert_eq!(section.customized_fields().len(), 8);
    }

    #[test]
    fn test_unknown_profile() {
        let mut catalog = section_catalog();
        assert!(catalog.add_standard_profile("IPE 123").is_err());
    }

    #[test]
    fn test_set_shape_rederives_but_keeps_overrides() {
        let mut catalog = section_catalog();
        let id = catalog.add_rectangular("R", 0.3, 0.5).unwrap();

        let section = catalog.get_mut(id).unwrap();
        section
            .apply_overrides(&SectionOverrides {
                j: Some(1.0e-3),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(section.customized_fields(), vec!["j"]);

        section
            .set_shape(SectionShape::Rectangular {
                width: 0.4,
                height: 0.6,
            })
            .unwrap();
        assert!((section.properties.iy.value - 0.4 * 0.216 / 12.0).abs() < 1e-12);
        assert_eq!(section.properties.j.value, 1.0e-3, "override survives");
    }

    #[test]
    fn test_sorted_iteration() {
        let mut catalog = section_catalog();
        catalog.add_rectangular("R50", 0.3, 0.5).unwrap();
        catalog.add_circular("D40", 0.4).unwrap();
        catalog.add_square("Q30", 0.3).unwrap();
        let names: Vec<&str> = catalog.iter_sorted().iter().map(|(_, s)| s.name()).collect();
        assert_eq!(names, vec!["D40", "Q30", "R50"]);
    }

    #[test]
    fn test_section_serialization_roundtrip() {
        let section = Section::from_shape(
            "T1",
            SectionShape::T {
                flange_width: 0.5,
                flange_height: 0.1,
                web_width: 0.2,
                web_height: 0.4,
            },
        )
        .unwrap();
        let json = serde_json::to_string(&section).unwrap();
        let parsed: Section = serde_json::from_str(&json).unwrap();
        assert_eq!(section, parsed);
    }
}
