//! # frame_core - Eurocode Frame Analysis Engine
//!
//! `frame_core` is the calculation core of Framecalc: materials derived per
//! EN 1992-1-1 (concrete) and EN 1993-1-1 (steel), cross-section property
//! derivation, the editable structural graph of nodes, bars and loads, the
//! closed-form beam formulas that feed the stiffness method, and the
//! invalidation policy that keeps a solved analysis consistent with the
//! model.
//!
//! ## Design Philosophy
//!
//! - **Validate-then-commit**: every mutating operation checks everything
//!   first; a failed call leaves the model untouched
//! - **JSON-First**: all model types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **External collaborators**: the linear-system solver, the GUI and the
//!   persistence UI live outside this crate and talk to it through traits,
//!   events and plain data
//!
//! ## Quick Start
//!
//! ```rust
//! use frame_core::model::{BarKind, Model, Point3};
//! use frame_core::sections::{Section, SectionShape};
//!
//! let mut model = Model::new();
//! let concrete = model.add_concrete("C25/30", 25.0).unwrap();
//! let section = model
//!     .add_section(Section::from_shape(
//!         "R30x50",
//!         SectionShape::Rectangular { width: 0.3, height: 0.5 },
//!     ).unwrap())
//!     .unwrap();
//! let a = model.add_node(Point3::new(0.0, 0.0, 0.0)).unwrap();
//! let b = model.add_node(Point3::new(4.0, 0.0, 0.0)).unwrap();
//! let bar = model
//!     .add_bar(BarKind::Beam, section, concrete, a, b, None, 1, 0.0)
//!     .unwrap();
//! assert_eq!(model.bar_length(bar).unwrap(), 4.0);
//! ```
//!
//! ## Modules
//!
//! - [`materials`] - concrete/steel property derivation and catalog
//! - [`sections`] - section property derivation, polygons, standard profiles
//! - [`model`] - nodes, bars, releases and the model facade
//! - [`loads`] - actions, loads and the closed-form beam formulas
//! - [`deps`] - bidirectional dependency queries
//! - [`analysis`] - solver interface, flexibility coefficients, cache
//! - [`project`] / [`file_io`] - root container and persistence helpers
//! - [`events`] - change notifications for presentation layers
//! - [`errors`] - structured error types

pub mod analysis;
pub mod catalog;
pub mod deps;
pub mod errors;
pub mod events;
pub mod file_io;
pub mod loads;
pub mod materials;
pub mod model;
pub mod project;
pub mod sections;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{EntityKind, ModelError, ModelResult};
pub use events::{ChangeKind, ModelChange};
pub use model::Model;
pub use project::Project;
