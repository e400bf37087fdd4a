//! # Project Container
//!
//! The `Project` struct is the root container a host application works with:
//! file metadata plus the structural [`Model`]. Projects serialize to
//! human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, name, engineer, timestamps)
//! └── model: Model (catalogs, nodes, bars, actions)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use frame_core::project::Project;
//!
//! let mut project = Project::new("Warehouse frame", "Jane Engineer");
//! project.model.add_concrete("C25/30", 25.0).unwrap();
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("C25/30"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Model;

/// Current schema version for project files.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Project metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version of the file format
    pub version: String,
    /// Project name
    pub name: String,
    /// Responsible engineer
    pub engineer: String,
    /// Creation timestamp
    pub created: DateTime<Utc>,
    /// Last-modified timestamp
    pub modified: DateTime<Utc>,
}

/// Root project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,
    pub model: Model,
}

impl Project {
    /// Create a new empty project.
    pub fn new(name: impl Into<String>, engineer: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                name: name.into(),
                engineer: engineer.into(),
                created: now,
                modified: now,
            },
            model: Model::new(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}
