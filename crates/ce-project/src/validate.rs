//! Project validation logic.

use crate::schema::{
    BoundaryDef, ExclusionDef, HeatPumpDef, HeatPumpPlantDef, HeatPumpSweepDef, PlantDef, Project, SweepDef, UnitDef,
};
use std::collections::HashSet;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: String, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_boundary(&project.boundary)?;

    // Heat pumps share the unit id namespace: ids prefix exported columns.
    let mut unit_ids = HashSet::new();
    let ids = project
        .units
        .iter()
        .map(|u| &u.id)
        .chain(project.heat_pumps.iter().map(|hp| &hp.id));
    for id in ids {
        if !unit_ids.insert(id) {
            return Err(ValidationError::DuplicateId {
                id: id.clone(),
                context: "units".to_string(),
            });
        }
    }
    for unit in &project.units {
        validate_unit(unit)?;
    }
    for heat_pump in &project.heat_pumps {
        validate_heat_pump(heat_pump)?;
    }

    Ok(())
}

fn validate_boundary(boundary: &BoundaryDef) -> Result<(), ValidationError> {
    if boundary.lo > boundary.hi {
        return Err(invalid(
            "boundary lo".to_string(),
            boundary.lo,
            &format!("must not exceed hi = {}", boundary.hi),
        ));
    }
    if boundary.sample_step <= 0 {
        return Err(invalid(
            "boundary sample_step".to_string(),
            boundary.sample_step,
            "must be positive",
        ));
    }
    Ok(())
}

fn validate_id(id: &str) -> Result<(), ValidationError> {
    // Unit ids prefix exported column names.
    if id.is_empty() || id.contains([';', ',', '"', '\n']) {
        return Err(invalid(
            "unit id".to_string(),
            id,
            "must be non-empty and free of separators",
        ));
    }
    Ok(())
}

fn validate_unit(unit: &UnitDef) -> Result<(), ValidationError> {
    validate_id(&unit.id)?;
    validate_plant(unit)?;
    validate_sweep(&unit.sweep, &unit.id)?;
    validate_exclusions(&unit.exclusions, &unit.id)?;
    Ok(())
}

fn positive(value: f64, field: impl FnOnce() -> String) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field(), value, "must be positive and finite"));
    }
    Ok(())
}

fn fraction(value: f64, field: impl FnOnce() -> String) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(field(), value, "must lie in [0, 1]"));
    }
    Ok(())
}

fn validate_plant(unit: &UnitDef) -> Result<(), ValidationError> {
    let id = &unit.id;
    match &unit.plant {
        PlantDef::Linear {
            beta,
            eta_el,
            flue_share,
            max_duty_w,
            ..
        } => {
            fraction(*beta, || format!("unit '{id}' plant beta"))?;
            positive(*eta_el, || format!("unit '{id}' plant eta_el"))?;
            fraction(*eta_el, || format!("unit '{id}' plant eta_el"))?;
            fraction(*flue_share, || format!("unit '{id}' plant flue_share"))?;
            positive(*max_duty_w, || format!("unit '{id}' plant max_duty_w"))?;
        }
        PlantDef::ExtractionSurrogate {
            nameplate_load_w,
            eta_el_nominal,
            beta_ref,
            reference_temp_c,
            ambient_temp_c,
            max_heat_duty_w,
            heat_capacity_floor,
            flue_share,
            min_stable_duty_w,
            ..
        } => {
            positive(*nameplate_load_w, || format!("unit '{id}' plant nameplate_load_w"))?;
            positive(*eta_el_nominal, || format!("unit '{id}' plant eta_el_nominal"))?;
            fraction(*eta_el_nominal, || format!("unit '{id}' plant eta_el_nominal"))?;
            fraction(*beta_ref, || format!("unit '{id}' plant beta_ref"))?;
            positive(*max_heat_duty_w, || format!("unit '{id}' plant max_heat_duty_w"))?;
            fraction(*heat_capacity_floor, || format!("unit '{id}' plant heat_capacity_floor"))?;
            fraction(*flue_share, || format!("unit '{id}' plant flue_share"))?;
            if *min_stable_duty_w < 0.0 || *min_stable_duty_w >= *max_heat_duty_w {
                return Err(invalid(
                    format!("unit '{id}' plant min_stable_duty_w"),
                    min_stable_duty_w,
                    "must lie in [0, max_heat_duty_w)",
                ));
            }
            if reference_temp_c <= ambient_temp_c {
                return Err(invalid(
                    format!("unit '{id}' plant reference_temp_c"),
                    reference_temp_c,
                    "must exceed ambient_temp_c",
                ));
            }
        }
    }
    Ok(())
}

fn validate_sweep(sweep: &SweepDef, id: &str) -> Result<(), ValidationError> {
    positive(sweep.nameplate_load_w, || format!("unit '{id}' sweep nameplate_load_w"))?;
    positive(sweep.max_heat_duty_w, || format!("unit '{id}' sweep max_heat_duty_w"))?;

    if !(sweep.min_load_fraction > 0.0 && sweep.min_load_fraction < 1.0) {
        return Err(invalid(
            format!("unit '{id}' sweep min_load_fraction"),
            sweep.min_load_fraction,
            "must lie in (0, 1)",
        ));
    }
    if let Some(min_duty) = sweep.min_heat_duty_w
        && !(min_duty >= 0.0 && min_duty < sweep.max_heat_duty_w)
    {
        return Err(invalid(
            format!("unit '{id}' sweep min_heat_duty_w"),
            min_duty,
            "must lie in [0, max_heat_duty_w)",
        ));
    }
    if sweep.heat_steps < 2 {
        return Err(invalid(
            format!("unit '{id}' sweep heat_steps"),
            sweep.heat_steps,
            "at least 2 steps required",
        ));
    }
    if sweep.load_levels < 2 {
        return Err(invalid(
            format!("unit '{id}' sweep load_levels"),
            sweep.load_levels,
            "at least 2 levels required",
        ));
    }
    if let Some(n) = sweep.regression_points
        && !(2..=sweep.heat_steps).contains(&n)
    {
        return Err(invalid(
            format!("unit '{id}' sweep regression_points"),
            n,
            "must lie between 2 and heat_steps",
        ));
    }
    if sweep.heat_spacing == crate::schema::SpacingDef::Logarithmic && sweep.min_heat_duty_w == Some(0.0) {
        return Err(ValidationError::Unsupported {
            feature: format!("unit '{id}' logarithmic heat spacing from zero duty"),
            reason: "logarithmic spacing needs a positive lowest duty".to_string(),
        });
    }
    Ok(())
}

fn validate_heat_pump(heat_pump: &HeatPumpDef) -> Result<(), ValidationError> {
    let id = &heat_pump.id;
    validate_id(id)?;

    let HeatPumpPlantDef::Surrogate {
        nameplate_heat_w,
        carnot_quality,
        part_load_penalty,
        ..
    } = &heat_pump.plant;
    positive(*nameplate_heat_w, || format!("heat pump '{id}' plant nameplate_heat_w"))?;
    positive(*carnot_quality, || format!("heat pump '{id}' plant carnot_quality"))?;
    fraction(*carnot_quality, || format!("heat pump '{id}' plant carnot_quality"))?;
    if !(0.0..1.0).contains(part_load_penalty) {
        return Err(invalid(
            format!("heat pump '{id}' plant part_load_penalty"),
            part_load_penalty,
            "must lie in [0, 1)",
        ));
    }

    validate_heat_pump_sweep(&heat_pump.sweep, id)?;
    validate_exclusions(&heat_pump.exclusions, id)?;
    Ok(())
}

fn validate_heat_pump_sweep(sweep: &HeatPumpSweepDef, id: &str) -> Result<(), ValidationError> {
    positive(sweep.nameplate_heat_w, || format!("heat pump '{id}' sweep nameplate_heat_w"))?;

    let limits = std::iter::once(("", sweep.min_load_fraction, sweep.load_levels)).chain(
        sweep
            .high_boundary
            .map(|h| ("high_boundary ", h.min_load_fraction, h.load_levels)),
    );
    for (scope, share, levels) in limits {
        if !(share > 0.0 && share < 1.0) {
            return Err(invalid(
                format!("heat pump '{id}' sweep {scope}min_load_fraction"),
                share,
                "must lie in (0, 1)",
            ));
        }
        if levels < 2 {
            return Err(invalid(
                format!("heat pump '{id}' sweep {scope}load_levels"),
                levels,
                "at least 2 levels required",
            ));
        }
    }
    Ok(())
}

fn validate_exclusions(exclusions: &ExclusionDef, id: &str) -> Result<(), ValidationError> {
    if let (Some(below), Some(above)) = (exclusions.below, exclusions.above)
        && below > above
    {
        return Err(invalid(
            format!("unit '{id}' exclusions below"),
            below,
            &format!("excludes every value together with above = {above}"),
        ));
    }
    Ok(())
}
