//! Characterization runs: parallel sweeps per boundary value, parameter
//! extraction and the run cache.

use std::path::Path;
use std::time::Instant;

use ce_envelope::{Envelope, HeatPumpParameters};
use ce_project::schema::{HeatPumpDef, UnitDef};
use ce_results::{BoundaryIssue, ResultStore, RunManifest, SimulationSummary, SweepTrace};
use ce_sim::AdapterStats;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::progress::{ProgressEvent, RunStage};
use crate::project_service;
use crate::runtime::{BoundarySweep, UnitDefinition, UnitModel};

/// Options for characterization runs. `None` defers to the project file.
#[derive(Debug, Clone)]
pub struct CharacterizeOptions {
    pub use_cache: Option<bool>,
    pub parallel: Option<bool>,
    pub tool_version: String,
}

impl Default for CharacterizeOptions {
    fn default() -> Self {
        Self {
            use_cache: None,
            parallel: None,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Request to characterize one unit of a project.
pub struct CharacterizeRequest<'a> {
    pub project_path: &'a Path,
    pub unit_id: &'a str,
    pub options: CharacterizeOptions,
}

#[derive(Debug, Clone)]
pub struct CharacterizeResponse<P = Envelope> {
    pub run_id: String,
    pub manifest: RunManifest,
    /// Sparse parameter rows, ordered by boundary value.
    pub envelopes: Vec<(i32, P)>,
    pub loaded_from_cache: bool,
    pub elapsed_s: f64,
}

/// In-memory result of sweeping every sample value of one unit.
#[derive(Debug, Clone)]
pub struct UnitCharacterization<P = Envelope> {
    pub envelopes: Vec<(i32, P)>,
    pub traces: Vec<SweepTrace>,
    pub excluded: Vec<BoundaryIssue>,
    pub failed: Vec<BoundaryIssue>,
    pub simulation: SimulationSummary,
}

impl<P> Default for UnitCharacterization<P> {
    fn default() -> Self {
        Self {
            envelopes: Vec::new(),
            traces: Vec::new(),
            excluded: Vec::new(),
            failed: Vec::new(),
            simulation: SimulationSummary::default(),
        }
    }
}

enum BoundaryOutcome<P> {
    Excluded(BoundaryIssue),
    Swept {
        boundary: i32,
        trace: SweepTrace,
        stats: AdapterStats,
        params: Result<P, String>,
    },
}

impl<P> BoundaryOutcome<P> {
    fn boundary(&self) -> i32 {
        match self {
            Self::Excluded(issue) => issue.value,
            Self::Swept { boundary, .. } => *boundary,
        }
    }
}

fn characterize_boundary<M: UnitModel>(model: &M, boundary: i32) -> AppResult<BoundaryOutcome<M::Params>> {
    if let Err(excluded) = model.exclusions().check(boundary) {
        warn!(unit = %model.unit_id(), %excluded, "boundary skipped");
        return Ok(BoundaryOutcome::Excluded(BoundaryIssue {
            value: boundary,
            reason: excluded.reason.to_string(),
        }));
    }

    let started = Instant::now();
    let BoundarySweep {
        q,
        p,
        failed_steps,
        stats,
        params,
    } = model.sweep(boundary)?;

    Ok(BoundaryOutcome::Swept {
        boundary,
        trace: SweepTrace {
            boundary,
            q,
            p,
            runtime_s: started.elapsed().as_secs_f64(),
            failed_steps,
        },
        stats,
        params,
    })
}

/// Sweep and extract every sample value of one unit.
///
/// Boundary values are independent; with `parallel` they run on the rayon
/// pool, each worker with its own simulator. Results are ordered by boundary
/// value either way. Excluded values and failed extractions are reported,
/// not fatal.
pub fn characterize_unit<M: UnitModel>(
    model: &M,
    samples: &[i32],
    parallel: bool,
) -> AppResult<UnitCharacterization<M::Params>> {
    let mut samples = samples.to_vec();
    samples.sort_unstable();
    samples.dedup();

    let outcomes: Vec<AppResult<BoundaryOutcome<M::Params>>> = if parallel {
        samples
            .par_iter()
            .map(|&b| characterize_boundary(model, b))
            .collect()
    } else {
        samples
            .iter()
            .map(|&b| characterize_boundary(model, b))
            .collect()
    };
    let mut outcomes = outcomes.into_iter().collect::<AppResult<Vec<_>>>()?;
    outcomes.sort_by_key(BoundaryOutcome::boundary);

    let mut result = UnitCharacterization::default();
    for outcome in outcomes {
        match outcome {
            BoundaryOutcome::Excluded(issue) => result.excluded.push(issue),
            BoundaryOutcome::Swept {
                boundary,
                trace,
                stats,
                params,
            } => {
                let sim = &mut result.simulation;
                sim.calls += stats.calls;
                sim.converged += stats.converged;
                sim.not_converged += stats.not_converged;
                sim.linear_dependent += stats.linear_dependent;
                sim.non_finite += stats.non_finite;

                result.traces.push(trace);
                match params {
                    Ok(row) => result.envelopes.push((boundary, row)),
                    Err(reason) => result.failed.push(BoundaryIssue {
                        value: boundary,
                        reason,
                    }),
                }
            }
        }
    }

    info!(
        unit = %model.unit_id(),
        sampled = result.envelopes.len(),
        excluded = result.excluded.len(),
        failed = result.failed.len(),
        "unit characterized"
    );
    Ok(result)
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(ProgressEvent)>,
    unit_id: &str,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(ProgressEvent::stage(unit_id, stage, started.elapsed().as_secs_f64(), message));
    }
}

/// Characterize a unit or load its cached run.
pub fn ensure_characterization(request: &CharacterizeRequest) -> AppResult<CharacterizeResponse> {
    ensure_characterization_with_progress(request, None)
}

/// Characterize a unit or load its cached run, streaming stage events.
pub fn ensure_characterization_with_progress(
    request: &CharacterizeRequest,
    progress_cb: Option<&mut dyn FnMut(ProgressEvent)>,
) -> AppResult<CharacterizeResponse> {
    ensure_with::<UnitDef>(request, progress_cb)
}

/// Characterize a heat pump or load its cached run.
pub fn ensure_heat_pump_characterization(
    request: &CharacterizeRequest,
) -> AppResult<CharacterizeResponse<HeatPumpParameters>> {
    ensure_heat_pump_characterization_with_progress(request, None)
}

/// Characterize a heat pump or load its cached run, streaming stage events.
pub fn ensure_heat_pump_characterization_with_progress(
    request: &CharacterizeRequest,
    progress_cb: Option<&mut dyn FnMut(ProgressEvent)>,
) -> AppResult<CharacterizeResponse<HeatPumpParameters>> {
    ensure_with::<HeatPumpDef>(request, progress_cb)
}

fn ensure_with<D: UnitDefinition>(
    request: &CharacterizeRequest,
    mut progress_cb: Option<&mut dyn FnMut(ProgressEvent)>,
) -> AppResult<CharacterizeResponse<<D::Model as UnitModel>::Params>> {
    let started = Instant::now();
    let unit_id = request.unit_id;

    emit_progress(
        &mut progress_cb,
        unit_id,
        RunStage::LoadingProject,
        started,
        Some("Loading project".to_string()),
    );
    let project = project_service::load_project(request.project_path)?;
    let unit = D::find(&project, unit_id)?;
    let use_cache = request
        .options
        .use_cache
        .unwrap_or(project.characterization.use_cache);
    let parallel = request
        .options
        .parallel
        .unwrap_or(project.characterization.parallel);

    emit_progress(
        &mut progress_cb,
        unit_id,
        RunStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
    );
    let run_id = unit.run_id(&project.boundary, &request.options.tool_version);
    let store = ResultStore::for_project(request.project_path)?;

    if use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            unit_id,
            RunStage::LoadingCachedResult,
            started,
            Some("Loading cached run".to_string()),
        );
        let manifest = store.load_manifest(&run_id)?;
        let envelopes = store.load_envelopes(&run_id)?;
        emit_progress(&mut progress_cb, unit_id, RunStage::Completed, started, None);
        return Ok(CharacterizeResponse {
            run_id,
            manifest,
            envelopes,
            loaded_from_cache: true,
            elapsed_s: started.elapsed().as_secs_f64(),
        });
    }

    let samples = project.boundary.sample_values();
    emit_progress(
        &mut progress_cb,
        unit_id,
        RunStage::Sweeping,
        started,
        Some(format!("Sweeping {} boundary values", samples.len())),
    );
    let model = unit.compile()?;
    let result = characterize_unit(&model, &samples, parallel)?;

    emit_progress(
        &mut progress_cb,
        unit_id,
        RunStage::SavingResults,
        started,
        Some("Saving run".to_string()),
    );
    let manifest = RunManifest {
        run_id: run_id.clone(),
        unit_id: unit.id().to_string(),
        timestamp: RunManifest::now_timestamp(),
        tool_version: request.options.tool_version.clone(),
        boundary_name: project.boundary.name.clone(),
        sampled: result.envelopes.iter().map(|(b, _)| *b).collect(),
        excluded: result.excluded,
        failed: result.failed,
        simulation: result.simulation,
    };
    store.save_run(&manifest, &result.envelopes, &result.traces)?;

    emit_progress(&mut progress_cb, unit_id, RunStage::Completed, started, None);
    Ok(CharacterizeResponse {
        run_id,
        manifest,
        envelopes: result.envelopes,
        loaded_from_cache: false,
        elapsed_s: started.elapsed().as_secs_f64(),
    })
}
