//! Project loading, saving, validation, and introspection.

use ce_project::schema::{HeatPumpDef, PlantDef, Project, UnitDef, UnitKindDef};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Summary of a plant unit for listing.
#[derive(Debug, Clone)]
pub struct UnitSummary {
    pub id: String,
    pub name: String,
    pub kind: UnitKindDef,
    pub plant: &'static str,
    pub nameplate_load_w: f64,
    pub max_heat_duty_w: f64,
    /// Boundary values that will be swept.
    pub sample_count: usize,
    /// Boundary values skipped a priori.
    pub excluded_count: usize,
}

/// Summary of a heat pump for listing.
#[derive(Debug, Clone)]
pub struct HeatPumpSummary {
    pub id: String,
    pub name: String,
    pub nameplate_heat_w: f64,
    pub min_load_fraction: f64,
    pub sample_count: usize,
    pub excluded_count: usize,
}

/// Load and validate a project from a YAML file.
pub fn load_project(path: &Path) -> AppResult<Project> {
    if !path.exists() {
        return Err(AppError::ProjectFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "project file not found"),
        });
    }
    Ok(ce_project::load_yaml(path)?)
}

pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    Ok(ce_project::save_yaml(path, project)?)
}

/// Validate project structure.
pub fn validate_project(project: &Project) -> AppResult<()> {
    ce_project::validate_project(project)?;
    if project.units.is_empty() && project.heat_pumps.is_empty() {
        return Err(AppError::Validation(
            "Project must have at least one unit".to_string(),
        ));
    }
    Ok(())
}

/// List all units in the project with summaries.
pub fn list_units(project: &Project) -> Vec<UnitSummary> {
    let samples = project.boundary.sample_values();
    project
        .units
        .iter()
        .map(|unit| {
            let exclusions = crate::runtime::build_exclusions(&unit.exclusions);
            let excluded_count = samples.iter().filter(|&&v| exclusions.is_excluded(v)).count();
            UnitSummary {
                id: unit.id.clone(),
                name: unit.name.clone(),
                kind: unit.kind,
                plant: match unit.plant {
                    PlantDef::Linear { .. } => "linear",
                    PlantDef::ExtractionSurrogate { .. } => "extraction-surrogate",
                },
                nameplate_load_w: unit.sweep.nameplate_load_w,
                max_heat_duty_w: unit.sweep.max_heat_duty_w,
                sample_count: samples.len() - excluded_count,
                excluded_count,
            }
        })
        .collect()
}

pub fn list_heat_pumps(project: &Project) -> Vec<HeatPumpSummary> {
    let samples = project.boundary.sample_values();
    project
        .heat_pumps
        .iter()
        .map(|hp| {
            let exclusions = crate::runtime::build_exclusions(&hp.exclusions);
            let excluded_count = samples.iter().filter(|&&v| exclusions.is_excluded(v)).count();
            HeatPumpSummary {
                id: hp.id.clone(),
                name: hp.name.clone(),
                nameplate_heat_w: hp.sweep.nameplate_heat_w,
                min_load_fraction: hp.sweep.min_load_fraction,
                sample_count: samples.len() - excluded_count,
                excluded_count,
            }
        })
        .collect()
}

/// Get a specific unit by ID.
pub fn get_unit<'a>(project: &'a Project, unit_id: &str) -> AppResult<&'a UnitDef> {
    project
        .units
        .iter()
        .find(|u| u.id == unit_id)
        .ok_or_else(|| AppError::UnitNotFound(unit_id.to_string()))
}

pub fn get_heat_pump<'a>(project: &'a Project, unit_id: &str) -> AppResult<&'a HeatPumpDef> {
    project
        .heat_pumps
        .iter()
        .find(|hp| hp.id == unit_id)
        .ok_or_else(|| AppError::UnitNotFound(unit_id.to_string()))
}
