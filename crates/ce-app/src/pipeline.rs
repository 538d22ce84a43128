//! Interpolation and timeseries resampling on top of characterization runs.

use std::fs::File;
use std::path::{Path, PathBuf};

use ce_envelope::{Envelope, HeatPumpParameters, ParameterSet};
use ce_project::schema::{HeatPumpDef, Project, UnitDef};
use ce_resample::{DispatchParameters, HeatPumpDispatch, UnitDispatch, resample};
use ce_results::ResultStore;
use ce_table::{EnvelopeTable, SampleTable};
use tracing::info;

use crate::characterize::{
    CharacterizeOptions, CharacterizeRequest, CharacterizeResponse, ensure_characterization_with_progress,
    ensure_heat_pump_characterization_with_progress,
};
use crate::error::{AppError, AppResult};
use crate::progress::{ProgressEvent, RunStage};
use crate::project_service;
use crate::runtime::{UnitDefinition, boundary_domain, build_exclusions, interpolation_settings, key_rounding, unit_kind};

fn interpolate<D: UnitDefinition, P: ParameterSet>(
    project: &Project,
    unit: &D,
    rows: &[(i32, P)],
) -> AppResult<EnvelopeTable<P>> {
    let exclusions = build_exclusions(unit.exclusion_def());
    let samples = SampleTable::from_samples(rows.iter().copied(), &exclusions)?;
    let table = EnvelopeTable::interpolate(
        &samples,
        boundary_domain(&project.boundary)?,
        &exclusions,
        &interpolation_settings(&project.interpolation),
    )?;
    info!(unit = %unit.id(), sampled = samples.len(), rows = table.len(), "table interpolated");
    Ok(table)
}

/// Dense table over the project's boundary domain from sparse envelopes.
pub fn interpolate_unit(project: &Project, unit: &UnitDef, envelopes: &[(i32, Envelope)]) -> AppResult<EnvelopeTable> {
    interpolate(project, unit, envelopes)
}

/// Dense heat pump table over the project's boundary domain.
pub fn interpolate_heat_pump(
    project: &Project,
    heat_pump: &HeatPumpDef,
    params: &[(i32, HeatPumpParameters)],
) -> AppResult<EnvelopeTable<HeatPumpParameters>> {
    interpolate(project, heat_pump, params)
}

/// Characterize a unit (or load its cached run) and interpolate the result.
pub fn load_table(
    project_path: &Path,
    unit_id: &str,
    options: CharacterizeOptions,
) -> AppResult<(CharacterizeResponse, EnvelopeTable)> {
    let request = CharacterizeRequest {
        project_path,
        unit_id,
        options,
    };
    let response = ensure_characterization_with_progress(&request, None)?;
    let project = project_service::load_project(project_path)?;
    let unit = project_service::get_unit(&project, unit_id)?;
    let table = interpolate_unit(&project, unit, &response.envelopes)?;
    Ok((response, table))
}

/// Characterize a heat pump (or load its cached run) and interpolate the result.
pub fn load_heat_pump_table(
    project_path: &Path,
    unit_id: &str,
    options: CharacterizeOptions,
) -> AppResult<(
    CharacterizeResponse<HeatPumpParameters>,
    EnvelopeTable<HeatPumpParameters>,
)> {
    let request = CharacterizeRequest {
        project_path,
        unit_id,
        options,
    };
    let response = ensure_heat_pump_characterization_with_progress(&request, None)?;
    let project = project_service::load_project(project_path)?;
    let heat_pump = project_service::get_heat_pump(&project, unit_id)?;
    let table = interpolate_heat_pump(&project, heat_pump, &response.envelopes)?;
    Ok((response, table))
}

pub struct ResampleRequest<'a> {
    pub project_path: &'a Path,
    /// `;`-separated file holding the boundary timeseries.
    pub series_path: &'a Path,
    /// Overrides the column named in the project.
    pub column: Option<&'a str>,
    pub options: CharacterizeOptions,
}

/// Dispatch parameters of one unit over the optimization horizon.
#[derive(Debug, Clone)]
pub struct UnitSeries {
    pub unit_id: String,
    pub run_id: String,
    pub parameters: UnitDispatch,
    /// Where the unit's timeseries table was stored in the run cache.
    pub timeseries_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ResampleResponse {
    pub horizon: usize,
    pub units: Vec<UnitSeries>,
}

impl ResampleResponse {
    /// All units' columns side by side, CHP units first, each in project order.
    pub fn columns(&self) -> Vec<(String, Vec<f64>)> {
        self.units
            .iter()
            .flat_map(|u| u.parameters.columns(self.horizon))
            .collect()
    }
}

fn reborrow<'a>(
    progress_cb: &'a mut Option<&mut dyn FnMut(ProgressEvent)>,
) -> Option<&'a mut dyn FnMut(ProgressEvent)> {
    match progress_cb {
        Some(cb) => Some(&mut **cb),
        None => None,
    }
}

/// Resample every unit of a project onto a boundary timeseries.
pub fn resample_project(
    request: &ResampleRequest,
    mut progress_cb: Option<&mut dyn FnMut(ProgressEvent)>,
) -> AppResult<ResampleResponse> {
    let project = project_service::load_project(request.project_path)?;
    let column = request
        .column
        .map(str::to_string)
        .or_else(|| project.resample.column.clone())
        .unwrap_or_else(|| project.boundary.name.clone());

    let series = ce_results::read_series_column(File::open(request.series_path)?, &column)?;
    if series.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "column {column} of {} holds no values",
            request.series_path.display()
        )));
    }
    let horizon = series.len();
    let rounding = key_rounding(project.resample.rounding);
    let store = ResultStore::for_project(request.project_path)?;

    let mut units = Vec::with_capacity(project.units.len() + project.heat_pumps.len());
    for unit in &project.units {
        let characterization = CharacterizeRequest {
            project_path: request.project_path,
            unit_id: &unit.id,
            options: request.options.clone(),
        };
        let response = ensure_characterization_with_progress(&characterization, reborrow(&mut progress_cb))?;
        let table = stage_table(&project, unit, &response, horizon, &mut progress_cb)?;
        let timeseries = resample(&table, &series, rounding)?;
        let parameters = DispatchParameters::from_timeseries(unit.id.clone(), unit_kind(unit.kind), &timeseries);
        units.push(store_series(&store, response.run_id, UnitDispatch::Chp(parameters), horizon)?);
    }

    for heat_pump in &project.heat_pumps {
        let characterization = CharacterizeRequest {
            project_path: request.project_path,
            unit_id: &heat_pump.id,
            options: request.options.clone(),
        };
        let response =
            ensure_heat_pump_characterization_with_progress(&characterization, reborrow(&mut progress_cb))?;
        let table = stage_table(&project, heat_pump, &response, horizon, &mut progress_cb)?;
        let timeseries = resample(&table, &series, rounding)?;
        let parameters = HeatPumpDispatch::from_timeseries(heat_pump.id.clone(), &timeseries);
        units.push(store_series(&store, response.run_id, UnitDispatch::HeatPump(parameters), horizon)?);
    }

    Ok(ResampleResponse { horizon, units })
}

/// Interpolate one unit's run, reporting both resampling stages.
fn stage_table<D: UnitDefinition, P: ParameterSet>(
    project: &Project,
    unit: &D,
    response: &CharacterizeResponse<P>,
    horizon: usize,
    progress_cb: &mut Option<&mut dyn FnMut(ProgressEvent)>,
) -> AppResult<EnvelopeTable<P>> {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(ProgressEvent::stage(unit.id(), RunStage::Interpolating, response.elapsed_s, None));
    }
    let table = interpolate(project, unit, &response.envelopes)?;

    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(ProgressEvent::stage(
            unit.id(),
            RunStage::Resampling,
            response.elapsed_s,
            Some(format!("{horizon} steps")),
        ));
    }
    Ok(table)
}

fn store_series(store: &ResultStore, run_id: String, parameters: UnitDispatch, horizon: usize) -> AppResult<UnitSeries> {
    parameters.validate(horizon)?;
    let timeseries_path = store.save_timeseries(&run_id, &parameters.columns(horizon))?;
    info!(unit = %parameters.unit(), horizon, path = %timeseries_path.display(), "timeseries resampled");

    Ok(UnitSeries {
        unit_id: parameters.unit().to_string(),
        run_id,
        parameters,
        timeseries_path,
    })
}
