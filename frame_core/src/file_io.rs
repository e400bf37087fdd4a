//! # File I/O
//!
//! Project persistence with safety rails:
//! - **Atomic saves**: write to a .tmp sibling, verify by re-parsing, rename
//! - **Version validation**: reject files from an incompatible schema
//! - **Integrity re-validation**: a loaded model goes through
//!   [`Model::validate`](crate::model::Model::validate) before it is handed
//!   to the caller, so corrupt files never become live models
//!
//! ## Example
//!
//! ```rust,no_run
//! use frame_core::file_io::{load_project, save_project};
//! use frame_core::project::Project;
//! use std::path::Path;
//!
//! let project = Project::new("Warehouse frame", "Jane Engineer");
//! save_project(&project, Path::new("warehouse.frm")).unwrap();
//! let reloaded = load_project(Path::new("warehouse.frm")).unwrap();
//! assert_eq!(reloaded.meta.name, "Warehouse frame");
//! ```

use std::fs;
use std::path::Path;

use crate::errors::{ModelError, ModelResult};
use crate::project::{Project, SCHEMA_VERSION};

/// Save a project atomically: serialize, write to `<path>.tmp`, re-parse the
/// temp file to verify the write, then rename over the target.
pub fn save_project(project: &Project, path: &Path) -> ModelResult<()> {
    let json = serde_json::to_string_pretty(project).map_err(|e| ModelError::Serialization {
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, &json).map_err(|e| {
        ModelError::file("write", tmp_path.display().to_string(), e.to_string())
    })?;

    // verify the bytes on disk parse back before committing the rename
    let written = fs::read_to_string(&tmp_path).map_err(|e| {
        ModelError::file("verify", tmp_path.display().to_string(), e.to_string())
    })?;
    serde_json::from_str::<Project>(&written).map_err(|e| ModelError::Serialization {
        reason: format!("verification re-parse failed: {}", e),
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        ModelError::file("rename", path.display().to_string(), e.to_string())
    })?;
    log::debug!("saved project to {}", path.display());
    Ok(())
}

/// Load a project, checking the schema version and re-validating the whole
/// entity graph. Corrupt or inconsistent files are rejected.
pub fn load_project(path: &Path) -> ModelResult<Project> {
    let json = fs::read_to_string(path)
        .map_err(|e| ModelError::file("read", path.display().to_string(), e.to_string()))?;

    let project: Project = serde_json::from_str(&json).map_err(|e| ModelError::Serialization {
        reason: e.to_string(),
    })?;

    if project.meta.version != SCHEMA_VERSION {
        return Err(ModelError::VersionMismatch {
            file_version: project.meta.version.clone(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    project.model.validate()?;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("frame_core_{}_{}.frm", tag, Uuid::new_v4()))
    }

    fn cleanup(path: &Path) {
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let path = temp_path("roundtrip");
        let mut project = Project::new("Roundtrip", "Engineer");
        project.model.add_concrete("C25/30", 25.0).unwrap();
        project.model.add_steel("S235", 235.0, 360.0).unwrap();

        save_project(&project, &path).unwrap();
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.name, "Roundtrip");
        assert_eq!(loaded.model.materials().len(), 2);
        cleanup(&path);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let path = temp_path("garbage");
        fs::write(&path, "this is not json").unwrap();
        let err = load_project(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        cleanup(&path);
    }

    #[test]
    fn test_load_rejects_version_mismatch() {
        let path = temp_path("version");
        let project = Project::new("Versioned", "Engineer");
        save_project(&project, &path).unwrap();

        let tampered = fs::read_to_string(&path)
            .unwrap()
            .replace(SCHEMA_VERSION, "99.0.0");
        fs::write(&path, tampered).unwrap();

        let err = load_project(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
        cleanup(&path);
    }

    #[test]
    fn test_load_revalidates_model_integrity() {
        use crate::model::{BarKind, Point3};

        let path = temp_path("integrity");
        let mut project = Project::new("Integrity", "Engineer");
        let material = project.model.add_steel("S235", 235.0, 360.0).unwrap();
        let section = project
            .model
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
        let n0 = project.model.add_node(Point3::new(0.0, 0.0, 0.0)).unwrap();
        let n1 = project.model.add_node(Point3::new(4.0, 0.0, 0.0)).unwrap();
        project
            .model
            .add_bar(BarKind::Beam, section, material, n0, n1, None, 1, 0.0)
            .unwrap();
        save_project(&project, &path).unwrap();

        // sever the bar's end node in the file: the load must be rejected
        let json = fs::read_to_string(&path).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let nodes = value["model"]["nodes"].as_object_mut().unwrap();
        let key = nodes
            .keys()
            .find(|k| **k == n1.0.to_string())
            .cloned()
            .unwrap();
        nodes.remove(&key);
        fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        let err = load_project(&path).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
        cleanup(&path);
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let path = temp_path("tmpclean");
        let project = Project::new("Clean", "Engineer");
        save_project(&project, &path).unwrap();
        assert!(!path.with_extension("tmp").exists());
        cleanup(&path);
    }
}
