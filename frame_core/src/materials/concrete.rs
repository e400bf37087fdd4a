//! Concrete material properties per EN 1992-1-1
//!
//! A concrete grade is defined by its characteristic cylinder strength fck;
//! everything else in Table 3.1 follows from it. Each derived field keeps a
//! provenance tag so user overrides survive later re-derivation.
//!
//! Units: strengths and moduli of rupture in MPa, Ecm in GPa, strains
//! dimensionless (the per-mille table values are divided by 1000).
//!
//! ## Example
//!
//! ```rust
//! use frame_core::materials::ConcreteMaterial;
//!
//! let c25 = ConcreteMaterial::from_fck("C25/30", 25.0).unwrap();
//! assert_eq!(c25.fcm.value, 33.0);
//! assert!((c25.fctm.value - 2.5649).abs() < 1e-3);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::errors::{EntityKind, ModelError, ModelResult};
use crate::materials::{Prop, Provenance};
use crate::units::REL_TOL;

/// Poisson's ratio for uncracked concrete (EN 1992-1-1 §3.1.3(4)).
pub const NU_CONCRETE: f64 = 0.2;

/// Upper bound of the admissible fck range (MPa).
pub const FCK_MAX: f64 = 90.0;

/// Characteristic cube strengths of the strength classes in
/// EN 1992-1-1 Table 3.1, as (fck, fck_cube) anchor points.
const CUBE_ANCHORS: [(f64, f64); 14] = [
    (12.0, 15.0),
    (16.0, 20.0),
    (20.0, 25.0),
    (25.0, 30.0),
    (30.0, 37.0),
    (35.0, 45.0),
    (40.0, 50.0),
    (45.0, 55.0),
    (50.0, 60.0),
    (55.0, 67.0),
    (60.0, 75.0),
    (70.0, 85.0),
    (80.0, 95.0),
    (90.0, 105.0),
];

/// Cube strength for an arbitrary fck, linear between the class anchors.
/// Below C12 the first anchor's through-origin line applies.
pub fn fck_cube_from(fck: f64) -> f64 {
    let (first_fck, first_cube) = CUBE_ANCHORS[0];
    if fck < first_fck {
        return fck * first_cube / first_fck;
    }
    for pair in CUBE_ANCHORS.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if fck < x1 {
            return y0 + (fck - x0) * (y1 - y0) / (x1 - x0);
        }
    }
    let (x0, y0) = CUBE_ANCHORS[CUBE_ANCHORS.len() - 2];
    let (x1, y1) = CUBE_ANCHORS[CUBE_ANCHORS.len() - 1];
    y0 + (fck - x0) * (y1 - y0) / (x1 - x0)
}

/// Mean tensile strength fctm (MPa).
pub fn fctm_from(fck: f64, fcm: f64) -> f64 {
    if fck <= 50.0 {
        0.3 * fck.powf(2.0 / 3.0)
    } else {
        2.12 * (1.0 + fcm / 10.0).ln()
    }
}

/// Secant modulus of elasticity Ecm (GPa).
pub fn ecm_from(fcm: f64) -> f64 {
    22.0 * (fcm / 10.0).powf(0.3)
}

/// Strain at peak stress ec1 (parabola-rectangle base curve).
pub fn ec1_from(fcm: f64) -> f64 {
    (0.7 * fcm.powf(0.31)).min(2.8) / 1000.0
}

/// Ultimate strain ecu1.
pub fn ecu1_from(fck: f64, fcm: f64) -> f64 {
    if fck < 50.0 {
        3.5 / 1000.0
    } else {
        (2.8 + 27.0 * ((98.0 - fcm) / 100.0).powi(4)) / 1000.0
    }
}

/// Strain at peak stress ec2 (parabola-rectangle diagram).
pub fn ec2_from(fck: f64) -> f64 {
    if fck < 50.0 {
        2.0 / 1000.0
    } else {
        (2.0 + 0.085 * (fck - 50.0).powf(0.53)) / 1000.0
    }
}

/// Ultimate strain ecu2.
pub fn ecu2_from(fck: f64) -> f64 {
    if fck < 50.0 {
        3.5 / 1000.0
    } else {
        (2.6 + 35.0 * ((90.0 - fck) / 100.0).powi(4)) / 1000.0
    }
}

/// Strain at peak stress ec3 (bilinear diagram).
pub fn ec3_from(fck: f64) -> f64 {
    if fck < 50.0 {
        1.75 / 1000.0
    } else {
        (1.75 + 0.55 * (fck - 50.0) / 40.0) / 1000.0
    }
}

/// Ultimate strain ecu3. Table 3.1 gives the same limit expression as ecu2.
pub fn ecu3_from(fck: f64) -> f64 {
    ecu2_from(fck)
}

/// Exponent n of the parabola-rectangle diagram.
pub fn n_from(fck: f64) -> f64 {
    if fck < 50.0 {
        2.0
    } else {
        1.4 + 23.4 * ((90.0 - fck) / 100.0).powi(4)
    }
}

/// A concrete grade with its Table 3.1 property set.
///
/// Fields whose provenance is `Derived` track fck: changing fck (or calling
/// [`ConcreteMaterial::rederive`]) recomputes them. A `UserSupplied` field
/// keeps its value until the user changes it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteMaterial {
    /// Catalog name, e.g. "C25/30"
    pub name: String,
    /// Characteristic cylinder strength (MPa)
    pub fck: Prop,
    /// Characteristic cube strength (MPa)
    pub fck_cube: Prop,
    /// Mean cylinder strength fcm = fck + 8 (MPa)
    pub fcm: Prop,
    /// Mean axial tensile strength (MPa)
    pub fctm: Prop,
    /// 5% fractile tensile strength (MPa)
    pub fctk_005: Prop,
    /// 95% fractile tensile strength (MPa)
    pub fctk_095: Prop,
    /// Secant modulus of elasticity (GPa)
    pub ecm: Prop,
    /// Strain at peak stress, base curve
    pub ec1: Prop,
    /// Ultimate strain, base curve
    pub ecu1: Prop,
    /// Strain at peak stress, parabola-rectangle diagram
    pub ec2: Prop,
    /// Ultimate strain, parabola-rectangle diagram
    pub ecu2: Prop,
    /// Strain at peak stress, bilinear diagram
    pub ec3: Prop,
    /// Ultimate strain, bilinear diagram
    pub ecu3: Prop,
    /// Parabola-rectangle exponent
    pub n: Prop,
    /// Poisson's ratio
    pub nu: Prop,
}

impl ConcreteMaterial {
    /// Create a concrete grade from its characteristic strength, deriving
    /// the full Table 3.1 property set.
    ///
    /// fck must lie in (0, 90] MPa (relative-tolerance upper bound). Any
    /// non-finite derived value rejects the whole material.
    pub fn from_fck(name: impl Into<String>, fck: f64) -> ModelResult<Self> {
        let name = name.into();
        if !fck.is_finite() || fck <= 0.0 || fck > FCK_MAX * (1.0 + REL_TOL) {
            return Err(ModelError::domain(
                "fck",
                fck.to_string(),
                "fck must lie in (0, 90] MPa",
            ));
        }
        let mut material = ConcreteMaterial {
            name,
            fck: Prop::user(fck),
            fck_cube: Prop::derived(0.0),
            fcm: Prop::derived(0.0),
            fctm: Prop::derived(0.0),
            fctk_005: Prop::derived(0.0),
            fctk_095: Prop::derived(0.0),
            ecm: Prop::derived(0.0),
            ec1: Prop::derived(0.0),
            ecu1: Prop::derived(0.0),
            ec2: Prop::derived(0.0),
            ecu2: Prop::derived(0.0),
            ec3: Prop::derived(0.0),
            ecu3: Prop::derived(0.0),
            n: Prop::derived(0.0),
            nu: Prop::derived(NU_CONCRETE),
        };
        material.rederive()?;
        Ok(material)
    }

    /// Recompute every still-derived field from the current fck.
    /// User-supplied fields are left untouched.
    pub fn rederive(&mut self) -> ModelResult<()> {
        let fck = self.fck.value;
        let fcm = fck + 8.0;

        self.fck_cube.rederive(fck_cube_from(fck));
        self.fcm.rederive(fcm);
        self.fctm.rederive(fctm_from(fck, fcm));
        self.fctk_005.rederive(0.7 * self.fctm.value);
        self.fctk_095.rederive(1.3 * self.fctm.value);
        self.ecm.rederive(ecm_from(fcm));
        self.ec1.rederive(ec1_from(fcm));
        self.ecu1.rederive(ecu1_from(fck, fcm));
        self.ec2.rederive(ec2_from(fck));
        self.ecu2.rederive(ecu2_from(fck));
        self.ec3.rederive(ec3_from(fck));
        self.ecu3.rederive(ecu3_from(fck));
        self.n.rederive(n_from(fck));
        self.nu.rederive(NU_CONCRETE);

        for (field, prop) in self.fields() {
            if !prop.value.is_finite() {
                return Err(ModelError::non_finite(
                    EntityKind::Material,
                    &self.name,
                    field,
                ));
            }
        }
        Ok(())
    }

    /// All numeric fields with their names, in derivation order.
    pub fn fields(&self) -> [(&'static str, &Prop); 15] {
        [
            ("fck", &self.fck),
            ("fck_cube", &self.fck_cube),
            ("fcm", &self.fcm),
            ("fctm", &self.fctm),
            ("fctk_005", &self.fctk_005),
            ("fctk_095", &self.fctk_095),
            ("ecm", &self.ecm),
            ("ec1", &self.ec1),
            ("ecu1", &self.ecu1),
            ("ec2", &self.ec2),
            ("ecu2", &self.ecu2),
            ("ec3", &self.ec3),
            ("ecu3", &self.ecu3),
            ("n", &self.n),
            ("nu", &self.nu),
        ]
    }

    /// Names of the fields the user has overridden: exactly the set whose
    /// values would differ from a fresh derivation. fck itself is always
    /// user input and is not reported.
    pub fn customized_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .skip(1)
            .filter(|(_, prop)| prop.provenance == Provenance::UserSupplied)
            .map(|(field, _)| field)
            .collect()
    }
}

impl CatalogEntry for ConcreteMaterial {
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

impl std::fmt::Display for ConcreteMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (fck={:.0} MPa, fcm={:.0} MPa, Ecm={:.1} GPa)",
            self.name, self.fck.value, self.fcm.value, self.ecm.value
        )
    }
}

/// Optional per-field overrides for `modify` operations. Every populated
/// field overwrites the stored value and flips its provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcreteOverrides {
    pub fck: Option<f64>,
    pub fck_cube: Option<f64>,
    pub fcm: Option<f64>,
    pub fctm: Option<f64>,
    pub fctk_005: Option<f64>,
    pub fctk_095: Option<f64>,
    pub ecm: Option<f64>,
    pub ec1: Option<f64>,
    pub ecu1: Option<f64>,
    pub ec2: Option<f64>,
    pub ecu2: Option<f64>,
    pub ec3: Option<f64>,
    pub ecu3: Option<f64>,
    pub n: Option<f64>,
    pub nu: Option<f64>,
}

impl ConcreteOverrides {
    pub fn is_empty(&self) -> bool {
        self.fck.is_none()
            && self.fck_cube.is_none()
            && self.fcm.is_none()
            && self.fctm.is_none()
            && self.fctk_005.is_none()
            && self.fctk_095.is_none()
            && self.ecm.is_none()
            && self.ec1.is_none()
            && self.ecu1.is_none()
            && self.ec2.is_none()
            && self.ecu2.is_none()
            && self.ec3.is_none()
            && self.ecu3.is_none()
            && self.n.is_none()
            && self.nu.is_none()
    }
}

impl ConcreteMaterial {
    /// Apply explicit field overrides, then re-derive the remaining derived
    /// fields. A new fck is range-checked like at construction.
    pub fn apply_overrides(&mut self, overrides: &ConcreteOverrides) -> ModelResult<()> {
        if let Some(fck) = overrides.fck {
            if !fck.is_finite() || fck <= 0.0 || fck > FCK_MAX * (1.0 + REL_TOL) {
                return Err(ModelError::domain(
                    "fck",
                    fck.to_string(),
                    "fck must lie in (0, 90] MPa",
                ));
            }
            self.fck.set_user(fck);
        }
        let pairs: [(&Option<f64>, &mut Prop); 14] = [
            (&overrides.fck_cube, &mut self.fck_cube),
            (&overrides.fcm, &mut self.fcm),
            (&overrides.fctm, &mut self.fctm),
            (&overrides.fctk_005, &mut self.fctk_005),
            (&overrides.fctk_095, &mut self.fctk_095),
            (&overrides.ecm, &mut self.ecm),
            (&overrides.ec1, &mut self.ec1),
            (&overrides.ecu1, &mut self.ecu1),
            (&overrides.ec2, &mut self.ec2),
            (&overrides.ecu2, &mut self.ecu2),
            (&overrides.ec3, &mut self.ec3),
            (&overrides.ecu3, &mut self.ecu3),
            (&overrides.n, &mut self.n),
            (&overrides.nu, &mut self.nu),
        ];
        for (value, prop) in pairs {
            if let Some(value) = value {
                prop.set_user(*value);
            }
        }
        self.rederive()
    }
}
