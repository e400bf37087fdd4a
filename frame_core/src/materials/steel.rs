//! Structural steel properties per EN 1993-1-1
//!
//! Steel grades store their yield and ultimate strengths as given; the
//! elastic constants take the code's fixed design values unless overridden.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::errors::{ModelError, ModelResult};
use crate::materials::{Prop, Provenance};
use crate::units::approx_le;

/// Modulus of elasticity for structural steel (MPa), EN 1993-1-1 §3.2.6.
pub const E_STEEL: f64 = 210_000.0;

/// Poisson's ratio in the elastic range.
pub const NU_STEEL: f64 = 0.3;

/// A structural steel grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteelMaterial {
    /// Catalog name, e.g. "S235"
    pub name: String,
    /// Yield strength (MPa)
    pub fy: Prop,
    /// Ultimate tensile strength (MPa)
    pub fu: Prop,
    /// Modulus of elasticity (MPa)
    pub e: Prop,
    /// Poisson's ratio
    pub nu: Prop,
}

impl SteelMaterial {
    /// Create a steel grade. fy and fu are stored as given; E and nu take
    /// the code defaults with derived provenance.
    pub fn new(name: impl Into<String>, fy: f64, fu: f64) -> ModelResult<Self> {
        if !fy.is_finite() || fy <= 0.0 {
            return Err(ModelError::domain(
                "fy",
                fy.to_string(),
                "yield strength must be positive",
            ));
        }
        if !fu.is_finite() || !approx_le(fy, fu) {
            return Err(ModelError::domain(
                "fu",
                fu.to_string(),
                "ultimate strength must not fall below the yield strength",
            ));
        }
        Ok(SteelMaterial {
            name: name.into(),
            fy: Prop::user(fy),
            fu: Prop::user(fu),
            e: Prop::derived(E_STEEL),
            nu: Prop::derived(NU_STEEL),
        })
    }

    /// Shear modulus G = E / (2 (1 + nu)) (MPa), derived on demand.
    pub fn shear_modulus(&self) -> f64 {
        self.e.value / (2.0 * (1.0 + self.nu.value))
    }

    /// All numeric fields with their names.
    pub fn fields(&self) -> [(&'static str, &Prop); 4] {
        [
            ("fy", &self.fy),
            ("fu", &self.fu),
            ("e", &self.e),
            ("nu", &self.nu),
        ]
    }

    /// Names of the fields whose stored value no longer matches the code
    /// default derivation. fy and fu are always user input and not reported.
    pub fn customized_fields(&self) -> Vec<&'static str> {
        [("e", &self.e), ("nu", &self.nu)]
            .into_iter()
            .filter(|(_, prop)| prop.provenance == Provenance::UserSupplied)
            .map(|(field, _)| field)
            .collect()
    }
}

impl CatalogEntry for SteelMaterial {
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

impl std::fmt::Display for SteelMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (fy={:.0} MPa, fu={:.0} MPa)",
            self.name, self.fy.value, self.fu.value
        )
    }
}

/// Optional per-field overrides for `modify` operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SteelOverrides {
    pub fy: Option<f64>,
    pub fu: Option<f64>,
    pub e: Option<f64>,
    pub nu: Option<f64>,
}

impl SteelOverrides {
    pub fn is_empty(&self) -> bool {
        self.fy.is_none() && self.fu.is_none() && self.e.is_none() && self.nu.is_none()
    }
}

impl SteelMaterial {
    /// Apply explicit field overrides, flipping provenance on each.
    pub fn apply_overrides(&mut self, overrides: &SteelOverrides) -> ModelResult<()> {
        let fy = overrides.fy.unwrap_or(self.fy.value);
        let fu = overrides.fu.unwrap_or(self.fu.value);
        if !fy.is_finite() || fy <= 0.0 {
            return Err(ModelError::domain(
                "fy",
                fy.to_string(),
                "yield strength must be positive",
            ));
        }
        if !fu.is_finite() || !approx_le(fy, fu) {
            return Err(ModelError::domain(
                "fu",
                fu.to_string(),
                "ultimate strength must not fall below the yield strength",
            ));
        }
        if overrides.fy.is_some() {
            self.fy.set_user(fy);
        }
        if overrides.fu.is_some() {
            self.fu.set_user(fu);
        }
        if let Some(e) = overrides.e {
            self.e.set_user(e);
        }
        if let Some(nu) = overrides.nu {
            self.nu.set_user(nu);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s235_defaults() {
        let s = SteelMaterial::new("S235", 235.0, 360.0).unwrap();
        assert_eq!(s.e.value, 210_000.0);
        assert_eq!(s.nu.value, 0.3);
        assert!((s.shear_modulus() - 80_769.23).abs() < 0.01);
        assert!(s.customized_fields().is_empty());
    }

    #[test]
    fn test_invalid_strengths() {
        assert!(SteelMaterial::new("bad", 0.0, 360.0).is_err());
        assert!(SteelMaterial::new("bad", -235.0, 360.0).is_err());
        // fu below fy is inconsistent
        assert!(SteelMaterial::new("bad", 355.0, 235.0).is_err());
        // fu == fy is accepted
        assert!(SteelMaterial::new("edge", 235.0, 235.0).is_ok());
    }

    #[test]
    fn test_override_elastic_modulus() {
        let mut s = SteelMaterial::new("S355", 355.0, 490.0).unwrap();
        s.apply_overrides(&SteelOverrides {
            e: Some(200_000.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(s.customized_fields(), vec!["e"]);
        assert_eq!(s.e.value, 200_000.0);
    }

    #[test]
    fn test_failed_override_leaves_material_unchanged() {
        let mut s = SteelMaterial::new("S355", 355.0, 490.0).unwrap();
        let before = s.clone();
        assert!(s
            .apply_overrides(&SteelOverrides {
                fu: Some(100.0),
                ..Default::default()
            })
            .is_err());
        assert_eq!(s, before);
    }
}
