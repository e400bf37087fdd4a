//! End releases
//!
//! A release describes how a bar connects to its end nodes: rigidly, through
//! a rotational spring, or not at all (hinged/free for that component).
//! Releases are catalog entities referenced by bars, one record covering
//! both ends for the torsional and the two bending components.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{CatalogEntry, CatalogId, NamedArena};
use crate::errors::{EntityKind, ModelError, ModelResult};

/// Stable opaque handle to a catalog release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseId(pub Uuid);

impl CatalogId for ReleaseId {
    fn generate() -> Self {
        ReleaseId(Uuid::new_v4())
    }
    fn raw(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "release:{}", self.0)
    }
}

/// Restraint of one rotational component at one bar end.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Restraint {
    /// Fully rigid connection (zero flexibility).
    #[default]
    Rigid,
    /// Fully released (infinitely flexible; the end transmits nothing for
    /// this component).
    Released,
    /// Rotational spring, given as flexibility (rad per unit moment).
    Spring { flexibility: f64 },
}

impl Restraint {
    pub fn is_released(&self) -> bool {
        matches!(self, Restraint::Released)
    }

    /// Flexibility for the closed-form formulas; None when fully released.
    pub fn flexibility(&self) -> Option<f64> {
        match self {
            Restraint::Rigid => Some(0.0),
            Restraint::Released => None,
            Restraint::Spring { flexibility } => Some(*flexibility),
        }
    }
}

/// Rotational restraints of one bar end.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EndRestraints {
    /// Torsion about the bar axis
    pub torsion: Restraint,
    /// Bending about the local y axis
    pub bend_y: Restraint,
    /// Bending about the local z axis
    pub bend_z: Restraint,
}

/// A named release: restraints at both bar ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    pub start: EndRestraints,
    pub end: EndRestraints,
}

impl Release {
    /// Create a release. For each component at most one end may be fully
    /// released; both ends released would leave the span floating.
    pub fn new(name: impl Into<String>, start: EndRestraints, end: EndRestraints) -> ModelResult<Self> {
        let components = [
            ("torsion", start.torsion, end.torsion),
            ("bend_y", start.bend_y, end.bend_y),
            ("bend_z", start.bend_z, end.bend_z),
        ];
        for (component, at_start, at_end) in components {
            if at_start.is_released() && at_end.is_released() {
                return Err(ModelError::parameter(
                    component,
                    "released/released",
                    "a component may be fully released at one end only",
                ));
            }
        }
        for (component, at_start, at_end) in components {
            for restraint in [at_start, at_end] {
                if let Restraint::Spring { flexibility } = restraint {
                    if !flexibility.is_finite() || flexibility < 0.0 {
                        return Err(ModelError::domain(
                            component,
                            flexibility.to_string(),
                            "spring flexibility must be finite and non-negative",
                        ));
                    }
                }
            }
        }
        Ok(Release {
            name: name.into(),
            start,
            end,
        })
    }

    /// A fully hinged end at `end`, rigid at `start` - the common pinned case
    /// for both bending components (torsion stays rigid).
    pub fn pinned_end(name: impl Into<String>) -> Self {
        Release {
            name: name.into(),
            start: EndRestraints::default(),
            end: EndRestraints {
                torsion: Restraint::Rigid,
                bend_y: Restraint::Released,
                bend_z: Restraint::Released,
            },
        }
    }
}

impl CatalogEntry for Release {
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Name-sorted catalog of releases.
pub type ReleaseCatalog = NamedArena<ReleaseId, Release>;

/// Fresh release catalog.
pub fn release_catalog() -> ReleaseCatalog {
    NamedArena::new(EntityKind::Release)
}
