//! # Error Types
//!
//! Structured error types for frame_core. Every fallible operation in the
//! engine returns one of these variants so callers (editors, scripts,
//! persistence layers) can react programmatically instead of parsing text.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::errors::{ModelError, ModelResult};
//!
//! fn validate_diameter(d: f64) -> ModelResult<()> {
//!     if d <= 0.0 {
//!         return Err(ModelError::parameter(
//!             "diameter",
//!             d.to_string(),
//!             "diameter must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for frame_core operations
pub type ModelResult<T> = Result<T, ModelError>;

/// The kind of model entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Material,
    Section,
    Release,
    Node,
    Bar,
    Action,
    Load,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Material => "material",
            EntityKind::Section => "section",
            EntityKind::Release => "release",
            EntityKind::Node => "node",
            EntityKind::Bar => "bar",
            EntityKind::Action => "action",
            EntityKind::Load => "load",
        };
        write!(f, "{}", name)
    }
}

/// Structured error type for model operations.
///
/// Each variant provides specific context about what went wrong. Validation
/// failures are returned before any state is mutated, so a failed operation
/// always leaves the model unchanged.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ModelError {
    /// An argument is invalid (wrong combination, missing reference slot, etc.)
    #[error("Invalid parameter '{field}': {value} - {reason}")]
    Parameter {
        field: String,
        value: String,
        reason: String,
    },

    /// A numeric input is outside its admissible range
    #[error("Value out of range for '{field}': {value} - {reason}")]
    Domain {
        field: String,
        value: String,
        reason: String,
    },

    /// A catalog entry with this name already exists
    #[error("Duplicate {kind} name: '{name}'")]
    DuplicateName { kind: EntityKind, name: String },

    /// A referenced entity does not exist
    #[error("Unknown {kind}: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// The entity is referenced by others and cannot be deleted without cascading
    #[error("{kind} '{name}' is in use by {count} dependent(s)", count = dependents.len())]
    InUse {
        kind: EntityKind,
        name: String,
        /// Identifiers of the blocking dependents, enough for the caller to
        /// either cascade the deletion or cancel it.
        dependents: Vec<String>,
    },

    /// A custom polygon outline is geometrically invalid
    #[error("Invalid outline geometry: {reason}")]
    Geometry { reason: String },

    /// The external linear-system solver reported a failure
    #[error("Solver failed: {reason}")]
    Solver { reason: String },

    /// A derived property evaluated to a non-finite value; the entity is
    /// rejected and never inserted into any catalog.
    #[error("Derived property '{field}' of {kind} '{name}' is not finite")]
    NonFinite {
        kind: EntityKind,
        name: String,
        field: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    File {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Schema version mismatch when loading a project file
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl ModelError {
    /// Create a Parameter error
    pub fn parameter(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ModelError::Parameter {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a Domain error
    pub fn domain(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ModelError::Domain {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DuplicateName error
    pub fn duplicate_name(kind: EntityKind, name: impl Into<String>) -> Self {
        ModelError::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        ModelError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create an InUse error
    pub fn in_use(kind: EntityKind, name: impl Into<String>, dependents: Vec<String>) -> Self {
        ModelError::InUse {
            kind,
            name: name.into(),
            dependents,
        }
    }

    /// Create a Geometry error
    pub fn geometry(reason: impl Into<String>) -> Self {
        ModelError::Geometry {
            reason: reason.into(),
        }
    }

    /// Create a Solver error
    pub fn solver(reason: impl Into<String>) -> Self {
        ModelError::Solver {
            reason: reason.into(),
        }
    }

    /// Create a NonFinite error
    pub fn non_finite(kind: EntityKind, name: impl Into<String>, field: impl Into<String>) -> Self {
        ModelError::NonFinite {
            kind,
            name: name.into(),
            field: field.into(),
        }
    }

    /// Create a File error
    pub fn file(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ModelError::File {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ModelError::Parameter { .. } => "PARAMETER",
            ModelError::Domain { .. } => "DOMAIN",
            ModelError::DuplicateName { .. } => "DUPLICATE_NAME",
            ModelError::NotFound { .. } => "NOT_FOUND",
            ModelError::InUse { .. } => "IN_USE",
            ModelError::Geometry { .. } => "GEOMETRY",
            ModelError::Solver { .. } => "SOLVER",
            ModelError::NonFinite { .. } => "NON_FINITE",
            ModelError::File { .. } => "FILE_ERROR",
            ModelError::Serialization { .. } => "SERIALIZATION_ERROR",
            ModelError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}
