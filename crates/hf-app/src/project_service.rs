//! Recipe loading, saving, validation and model introspection.

use std::path::Path;

use hf_components::LoopKind;
use hf_model::TopologySummary;
use hf_project::{BuiltModel, Project};
use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// On-disk encoding of a recipe or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// `.json` files are JSON, everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Summary of a loop for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOverview {
    pub id: String,
    pub name: String,
    pub kind: LoopKind,
    pub supply_count: usize,
    pub demand_count: usize,
    pub zone_count: usize,
}

/// Load a recipe from a YAML or JSON file.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ProjectFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let project: Project = match Format::from_path(path) {
        Format::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| AppError::Project(format!("Failed to parse project YAML: {}", e)))?,
        Format::Json => serde_json::from_str(&content)
            .map_err(|e| AppError::Project(format!("Failed to parse project JSON: {}", e)))?,
    };
    debug!(path = %path.display(), name = %project.name, "loaded project");

    Ok(project)
}

/// Validate and save a recipe, picking the encoding from the extension.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    validate_project(project)?;
    let content = render(project, Format::from_path(path))?;

    std::fs::write(path, content).map_err(|e| AppError::ProjectFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Validate recipe structure and references.
pub fn validate_project(project: &Project) -> AppResult<()> {
    hf_project::validate_project(project)?;
    Ok(())
}

/// Validate and build the model a recipe describes.
pub fn build_model(project: &Project) -> AppResult<BuiltModel> {
    Ok(hf_project::build_model(project)?)
}

/// List every loop in the recipe with counts taken from the built model.
pub fn list_loops(project: &Project, built: &BuiltModel) -> AppResult<Vec<LoopOverview>> {
    let air = project
        .air_loops
        .iter()
        .map(|def| (def.id.as_str(), def.name.as_str(), LoopKind::Air));
    let plant = project
        .plant_loops
        .iter()
        .map(|def| (def.id.as_str(), def.name.as_str(), LoopKind::Plant));

    air.chain(plant)
        .map(|(id, name, kind)| {
            let handle = built
                .handle(id)
                .ok_or_else(|| AppError::LoopNotFound(id.to_string()))?;
            let model = &built.model;
            Ok(LoopOverview {
                id: id.to_string(),
                name: name.to_string(),
                kind,
                supply_count: model.supply_components(handle, None).len(),
                demand_count: model.demand_components(handle, None).len(),
                zone_count: match kind {
                    LoopKind::Air => model.thermal_zones(handle).len(),
                    LoopKind::Plant => 0,
                },
            })
        })
        .collect()
}

/// Flow-ordered summary of every loop in the model.
pub fn summarize(built: &BuiltModel) -> TopologySummary {
    built.model.summary()
}

/// Graphviz rendering of the whole model.
pub fn to_dot(built: &BuiltModel) -> String {
    built.model.to_dot()
}

/// Serialize any report in the requested format.
pub fn render<T: Serialize>(value: &T, format: Format) -> AppResult<String> {
    match format {
        Format::Yaml => serde_yaml::to_string(value)
            .map_err(|e| AppError::Project(format!("Failed to serialize YAML: {}", e))),
        Format::Json => serde_json::to_string_pretty(value)
            .map_err(|e| AppError::Project(format!("Failed to serialize JSON: {}", e))),
    }
}
