mod common;

use ce_app::{
    AppError, CharacterizeOptions, CharacterizeRequest, HeatPumpRuntime, ProgressEvent, RunStage, UnitRuntime,
    characterize_unit, ensure_characterization, ensure_characterization_with_progress,
    ensure_heat_pump_characterization, list_heat_pumps, load_project,
};
use ce_envelope::HeatPumpParameters;
use ce_results::ResultStore;

fn request<'a>(path: &'a std::path::Path, unit_id: &'a str) -> CharacterizeRequest<'a> {
    CharacterizeRequest {
        project_path: path,
        unit_id,
        options: CharacterizeOptions::default(),
    }
}

#[test]
fn unit_characterization_reports_excluded_and_failed_values() {
    let project = common::project();
    let runtime = UnitRuntime::compile(&project.units[0]).unwrap();
    let result = characterize_unit(&runtime, &project.boundary.sample_values(), true).unwrap();

    let sampled: Vec<i32> = result.envelopes.iter().map(|(b, _)| *b).collect();
    assert_eq!(sampled, vec![60, 65, 80]);
    assert_eq!(result.excluded.len(), 1);
    assert_eq!(result.excluded[0].value, 70);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].value, 75);

    // Excluded values never reach the simulator.
    assert_eq!(result.traces.len(), 4);
    assert!(result.traces.iter().all(|t| t.boundary != 70));
    assert!(result.simulation.linear_dependent > 0);

    for (_, env) in &result.envelopes {
        assert!((env.p_max_wo_dh - 100.0).abs() < 1e-6);
        assert!((env.p_min_wo_dh - 50.0).abs() < 1e-6);
        assert!((env.beta - 0.5).abs() < 1e-9);
    }
}

#[test]
fn parallel_and_sequential_sweeps_agree() {
    let project = common::project();
    let runtime = UnitRuntime::compile(&project.units[0]).unwrap();
    let samples = project.boundary.sample_values();
    let parallel = characterize_unit(&runtime, &samples, true).unwrap();
    let sequential = characterize_unit(&runtime, &samples, false).unwrap();
    assert_eq!(parallel.envelopes, sequential.envelopes);
    assert_eq!(parallel.failed, sequential.failed);
    assert_eq!(parallel.simulation, sequential.simulation);
}

#[test]
fn second_run_is_served_from_cache() {
    let dir = common::scratch_dir("cache");
    let path = common::write_project(&dir, &common::project());

    let first = ensure_characterization(&request(&path, "A")).unwrap();
    assert!(!first.loaded_from_cache);
    assert_eq!(first.manifest.sampled, vec![60, 65, 80]);
    assert_eq!(first.manifest.excluded[0].value, 70);
    assert_eq!(first.manifest.failed[0].value, 75);

    let second = ensure_characterization(&request(&path, "A")).unwrap();
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);
    assert_eq!(second.manifest, first.manifest);
    assert_eq!(second.envelopes.len(), first.envelopes.len());

    let store = ResultStore::for_project(&path).unwrap();
    assert_eq!(store.list_runs("A").unwrap().len(), 1);
    assert_eq!(store.load_traces(&first.run_id).unwrap().len(), 4);
}

#[test]
fn disabling_cache_forces_a_fresh_sweep() {
    let dir = common::scratch_dir("nocache");
    let path = common::write_project(&dir, &common::project());

    ensure_characterization(&request(&path, "B")).unwrap();
    let mut req = request(&path, "B");
    req.options.use_cache = Some(false);
    let rerun = ensure_characterization(&req).unwrap();
    assert!(!rerun.loaded_from_cache);
    assert_eq!(rerun.manifest.sampled, vec![60, 65, 70, 75, 80]);
}

#[test]
fn changed_unit_gets_new_run_id() {
    let dir = common::scratch_dir("rehash");
    let mut project = common::project();
    let path = common::write_project(&dir, &project);
    let before = ensure_characterization(&request(&path, "B")).unwrap();

    project.units[1].sweep.load_levels = 4;
    let path = common::write_project(&dir, &project);
    let after = ensure_characterization(&request(&path, "B")).unwrap();
    assert_ne!(before.run_id, after.run_id);
    assert!(!after.loaded_from_cache);
}

#[test]
fn progress_stages_are_reported() {
    let dir = common::scratch_dir("progress");
    let path = common::write_project(&dir, &common::project());

    let mut events: Vec<ProgressEvent> = Vec::new();
    let response =
        ensure_characterization_with_progress(&request(&path, "A"), Some(&mut |e| events.push(e))).unwrap();
    assert!(!response.loaded_from_cache);
    let stages: Vec<RunStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(stages.first(), Some(&RunStage::LoadingProject));
    assert!(stages.contains(&RunStage::Sweeping));
    assert!(stages.contains(&RunStage::SavingResults));
    assert_eq!(stages.last(), Some(&RunStage::Completed));

    events.clear();
    ensure_characterization_with_progress(&request(&path, "A"), Some(&mut |e| events.push(e))).unwrap();
    assert!(events.iter().any(|e| e.stage == RunStage::LoadingCachedResult));
    assert!(events.iter().all(|e| e.stage != RunStage::Sweeping));
}

#[test]
fn heat_pump_characterization_uses_the_same_run_cache() {
    let dir = common::scratch_dir("heat_pump");
    let path = common::write_project(&dir, &common::project_with_heat_pump());

    let first = ensure_heat_pump_characterization(&request(&path, "HP")).unwrap();
    assert!(!first.loaded_from_cache);
    assert_eq!(first.manifest.unit_id, "HP");
    assert_eq!(first.manifest.sampled, vec![60, 70, 75, 80]);
    assert_eq!(first.manifest.failed[0].value, 65);
    for (_, params) in &first.envelopes {
        assert!((params.p_min / params.p_max - 0.25).abs() < 1e-9);
        assert!((params.c_1 - params.cop).abs() < 1e-9);
    }

    let second = ensure_heat_pump_characterization(&request(&path, "HP")).unwrap();
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);
    assert_eq!(second.envelopes, first.envelopes);

    let store = ResultStore::for_project(&path).unwrap();
    let traces = store.load_traces(&first.run_id).unwrap();
    assert_eq!(traces.len(), 5);
    assert!(traces.iter().filter(|t| t.boundary != 65).all(|t| t.q.len() == 4));
}

#[test]
fn heat_pump_sweep_follows_sink_temperature() {
    let project = common::project_with_heat_pump();
    let runtime = HeatPumpRuntime::compile(&project.heat_pumps[0]).unwrap();
    let result = characterize_unit(&runtime, &[60, 80], false).unwrap();

    let cops: Vec<f64> = result.envelopes.iter().map(|(_, p): &(i32, HeatPumpParameters)| p.cop).collect();
    assert_eq!(cops.len(), 2);
    assert!(cops[0] > cops[1]);

    let summaries = list_heat_pumps(&project);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].sample_count, 5);
}

#[test]
fn heat_pump_ids_are_not_chp_units() {
    let dir = common::scratch_dir("hp_namespace");
    let path = common::write_project(&dir, &common::project_with_heat_pump());
    let err = ensure_characterization(&request(&path, "HP")).unwrap_err();
    assert!(matches!(err, AppError::UnitNotFound(id) if id == "HP"));
}

#[test]
fn unknown_unit_is_an_error() {
    let dir = common::scratch_dir("unknown");
    let path = common::write_project(&dir, &common::project());
    let err = ensure_characterization(&request(&path, "Z")).unwrap_err();
    assert!(matches!(err, AppError::UnitNotFound(id) if id == "Z"));
}

#[test]
fn missing_project_file_is_reported() {
    let dir = common::scratch_dir("missing");
    let err = load_project(&dir.join("absent.yaml")).unwrap_err();
    assert!(matches!(err, AppError::ProjectFileRead { .. }));
}
