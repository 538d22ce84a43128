//! Shared fixtures: a small two-unit project on synthetic linear plants.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use ce_project::schema::{
    BoundaryDef, CharacterizationDef, ExclusionDef, HeatPumpDef, HeatPumpPlantDef, HeatPumpSweepDef,
    InterpolationDef, LossShareDef, PlantDef, Project, ResampleDef, SpacingDef, SweepDef, UnitDef, UnitKindDef,
};

static TEST_PROJECT_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn linear_unit(id: &str, kind: UnitKindDef, unsolvable: Vec<i32>, excluded: Vec<i32>) -> UnitDef {
    UnitDef {
        id: id.to_string(),
        name: format!("{id} test unit"),
        kind,
        plant: PlantDef::Linear {
            beta: 0.5,
            eta_el: 0.4,
            flue_share: 0.1,
            max_duty_w: 100.0,
            unsolvable,
        },
        sweep: SweepDef {
            nameplate_load_w: 100.0,
            min_load_fraction: 0.5,
            max_heat_duty_w: 100.0,
            min_heat_duty_w: Some(10.0),
            heat_steps: 7,
            heat_spacing: SpacingDef::Linear,
            load_levels: 5,
            regression_points: Some(3),
        },
        exclusions: ExclusionDef {
            values: excluded,
            below: None,
            above: None,
        },
        loss_share: LossShareDef::CornerAverage,
    }
}

/// Boundary 60..=80 sampled every 5. Unit `A` has 70 excluded and 75
/// unsolvable, unit `B` solves everywhere.
pub fn project() -> Project {
    Project {
        version: 1,
        name: "linear test".to_string(),
        boundary: BoundaryDef {
            name: "T_VL".to_string(),
            unit: "degC".to_string(),
            lo: 60,
            hi: 80,
            sample_step: 5,
        },
        units: vec![
            linear_unit("A", UnitKindDef::ExtractionTurbine, vec![75], vec![70]),
            linear_unit("B", UnitKindDef::BackPressureTurbine, Vec::new(), Vec::new()),
        ],
        heat_pumps: vec![],
        characterization: CharacterizationDef::default(),
        interpolation: InterpolationDef::default(),
        resample: ResampleDef::default(),
    }
}

/// Constant-COP heat pump that cannot be solved at 65.
pub fn heat_pump(id: &str) -> HeatPumpDef {
    HeatPumpDef {
        id: id.to_string(),
        name: format!("{id} test heat pump"),
        plant: HeatPumpPlantDef::Surrogate {
            nameplate_heat_w: 1000.0,
            source_temp_c: 40.0,
            sink_approach_k: 5.0,
            carnot_quality: 0.5,
            part_load_penalty: 0.0,
            unsolvable: vec![65],
        },
        sweep: HeatPumpSweepDef {
            nameplate_heat_w: 1000.0,
            min_load_fraction: 0.25,
            load_levels: 4,
            high_boundary: None,
        },
        exclusions: ExclusionDef::default(),
    }
}

/// [`project`] plus heat pump `HP`.
pub fn project_with_heat_pump() -> Project {
    let mut project = project();
    project.heat_pumps.push(heat_pump("HP"));
    project
}

/// Fresh directory per call, so run caches never leak between tests.
pub fn scratch_dir(tag: &str) -> PathBuf {
    let sequence = TEST_PROJECT_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("ce_app_{tag}_{}_{sequence}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

pub fn write_project(dir: &Path, project: &Project) -> PathBuf {
    let path = dir.join("project.yaml");
    ce_app::save_project(&path, project).expect("save project");
    path
}
