//! Project definitions turned into sweep machinery.

use ce_envelope::{Envelope, HeatPumpParameters, LossShareMethod, ParameterSet, extract, extract_heat_pump};
use ce_project::schema::{
    BoundaryDef, ExclusionDef, HeatPumpDef, HeatPumpPlantDef, HeatPumpSweepDef, InterpolationDef,
    InterpolationKindDef, LossShareDef, PlantDef, Project, RoundingDef, SpacingDef, SweepDef, UnitDef, UnitKindDef,
};
use ce_resample::{KeyRounding, UnitKind};
use ce_sim::{AdapterStats, ExtractionChpSurrogate, HeatPumpSurrogate, LinearPlant, SimulationAdapter, Simulator};
use ce_sweep::{
    ExclusionSet, HeatPumpPlan, HighBoundaryLimits, Spacing, SweepPlan, sweep_corners, sweep_heat_pump,
};
use ce_table::{BoundaryDomain, InterpolationKind, InterpolationSettings};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::project_service;

/// What sweeping one boundary value produced.
#[derive(Debug, Clone)]
pub struct BoundarySweep<P> {
    /// Converged heat flows, in sweep order.
    pub q: Vec<f64>,
    /// Converged powers, paired with `q`.
    pub p: Vec<f64>,
    pub failed_steps: usize,
    pub stats: AdapterStats,
    /// Reduced parameters, or why the reduction failed.
    pub params: Result<P, String>,
}

/// A compiled unit that can be swept one boundary value at a time.
pub trait UnitModel: Sync {
    type Params: ParameterSet;

    fn unit_id(&self) -> &str;

    fn exclusions(&self) -> &ExclusionSet;

    /// Sweep a non-excluded boundary value with a fresh simulator and reduce
    /// the result.
    fn sweep(&self, boundary: i32) -> AppResult<BoundarySweep<Self::Params>>;
}

/// A unit entry of a project file.
pub trait UnitDefinition {
    type Model: UnitModel;

    fn find<'p>(project: &'p Project, unit_id: &str) -> AppResult<&'p Self>;

    fn id(&self) -> &str;

    fn exclusion_def(&self) -> &ExclusionDef;

    fn compile(&self) -> AppResult<Self::Model>;

    /// Content hash of this definition for the run cache.
    fn run_id(&self, boundary: &BoundaryDef, tool_version: &str) -> String;
}

/// Simulator handed to one sweep worker.
pub type BoxedSimulator = Box<dyn Simulator + Send>;

/// Everything needed to characterize one unit, detached from the project.
#[derive(Debug, Clone)]
pub struct UnitRuntime {
    pub unit_id: String,
    pub kind: UnitKind,
    pub plant: PlantDef,
    pub plan: SweepPlan,
    pub exclusions: ExclusionSet,
    pub loss_share: LossShareMethod,
}

impl UnitRuntime {
    pub fn compile(unit: &UnitDef) -> AppResult<Self> {
        let plan = build_sweep_plan(&unit.sweep);
        plan.validate()?;
        Ok(Self {
            unit_id: unit.id.clone(),
            kind: unit_kind(unit.kind),
            plant: unit.plant.clone(),
            plan,
            exclusions: build_exclusions(&unit.exclusions),
            loss_share: loss_share_method(unit.loss_share),
        })
    }

    /// Fresh simulator instance; each sweep worker owns its own.
    pub fn simulator(&self) -> BoxedSimulator {
        build_simulator(&self.plant)
    }
}

impl UnitModel for UnitRuntime {
    type Params = Envelope;

    fn unit_id(&self) -> &str {
        &self.unit_id
    }

    fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    fn sweep(&self, boundary: i32) -> AppResult<BoundarySweep<Envelope>> {
        let mut adapter = SimulationAdapter::new(self.simulator());
        let corners = sweep_corners(&mut adapter, &self.plan, boundary, &self.exclusions)?;

        let params = match extract(&corners, self.loss_share) {
            Ok(env) => {
                info!(
                    unit = %self.unit_id,
                    boundary,
                    p_max_w = env.p_max_wo_dh,
                    p_min_w = env.p_min_wo_dh,
                    "envelope extracted"
                );
                Ok(env)
            }
            Err(e) => {
                warn!(unit = %self.unit_id, boundary, "extraction failed: {e}");
                Err(e.to_string())
            }
        };

        let (q, p) = corners.pq_cloud();
        Ok(BoundarySweep {
            q,
            p,
            failed_steps: corners.failed_steps(),
            stats: adapter.stats(),
            params,
        })
    }
}

impl UnitDefinition for UnitDef {
    type Model = UnitRuntime;

    fn find<'p>(project: &'p Project, unit_id: &str) -> AppResult<&'p Self> {
        project_service::get_unit(project, unit_id)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn exclusion_def(&self) -> &ExclusionDef {
        &self.exclusions
    }

    fn compile(&self) -> AppResult<UnitRuntime> {
        UnitRuntime::compile(self)
    }

    fn run_id(&self, boundary: &BoundaryDef, tool_version: &str) -> String {
        ce_results::compute_run_id(self, boundary, tool_version)
    }
}

/// Everything needed to characterize one heat pump.
#[derive(Debug, Clone)]
pub struct HeatPumpRuntime {
    pub unit_id: String,
    pub plant: HeatPumpPlantDef,
    pub plan: HeatPumpPlan,
    pub exclusions: ExclusionSet,
}

impl HeatPumpRuntime {
    pub fn compile(heat_pump: &HeatPumpDef) -> AppResult<Self> {
        let plan = build_heat_pump_plan(&heat_pump.sweep);
        plan.validate()?;
        Ok(Self {
            unit_id: heat_pump.id.clone(),
            plant: heat_pump.plant.clone(),
            plan,
            exclusions: build_exclusions(&heat_pump.exclusions),
        })
    }

    pub fn simulator(&self) -> HeatPumpSurrogate {
        let HeatPumpPlantDef::Surrogate {
            nameplate_heat_w,
            source_temp_c,
            sink_approach_k,
            carnot_quality,
            part_load_penalty,
            unsolvable,
        } = &self.plant;
        HeatPumpSurrogate {
            nameplate_heat_w: *nameplate_heat_w,
            source_temp_c: *source_temp_c,
            sink_approach_k: *sink_approach_k,
            carnot_quality: *carnot_quality,
            part_load_penalty: *part_load_penalty,
            unsolvable: unsolvable.clone(),
        }
    }
}

impl UnitModel for HeatPumpRuntime {
    type Params = HeatPumpParameters;

    fn unit_id(&self) -> &str {
        &self.unit_id
    }

    fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    fn sweep(&self, boundary: i32) -> AppResult<BoundarySweep<HeatPumpParameters>> {
        let mut adapter = SimulationAdapter::new(self.simulator());
        let sweep = sweep_heat_pump(&mut adapter, &self.plan, boundary, &self.exclusions)?;

        let params = match extract_heat_pump(&sweep) {
            Ok(params) => {
                info!(unit = %self.unit_id, boundary, p_max_w = params.p_max, cop = params.cop, "heat pump reduced");
                Ok(params)
            }
            Err(e) => {
                warn!(unit = %self.unit_id, boundary, "extraction failed: {e}");
                Err(e.to_string())
            }
        };

        let (q, p) = sweep.pq_cloud();
        Ok(BoundarySweep {
            q,
            p,
            failed_steps: sweep.failed_steps(),
            stats: adapter.stats(),
            params,
        })
    }
}

impl UnitDefinition for HeatPumpDef {
    type Model = HeatPumpRuntime;

    fn find<'p>(project: &'p Project, unit_id: &str) -> AppResult<&'p Self> {
        project_service::get_heat_pump(project, unit_id)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn exclusion_def(&self) -> &ExclusionDef {
        &self.exclusions
    }

    fn compile(&self) -> AppResult<HeatPumpRuntime> {
        HeatPumpRuntime::compile(self)
    }

    fn run_id(&self, boundary: &BoundaryDef, tool_version: &str) -> String {
        ce_results::compute_run_id(self, boundary, tool_version)
    }
}

pub fn build_simulator(plant: &PlantDef) -> BoxedSimulator {
    match plant {
        PlantDef::Linear {
            beta,
            eta_el,
            flue_share,
            max_duty_w,
            unsolvable,
        } => Box::new(LinearPlant {
            beta: *beta,
            eta_el: *eta_el,
            flue_share: *flue_share,
            max_duty_w: *max_duty_w,
            unsolvable: unsolvable.clone(),
        }),
        PlantDef::ExtractionSurrogate {
            nameplate_load_w,
            eta_el_nominal,
            part_load_coeffs,
            beta_ref,
            reference_temp_c,
            ambient_temp_c,
            max_heat_duty_w,
            heat_capacity_floor,
            flue_share,
            min_stable_duty_w,
            unsolvable,
        } => Box::new(ExtractionChpSurrogate {
            nameplate_load_w: *nameplate_load_w,
            eta_el_nominal: *eta_el_nominal,
            part_load_coeffs: *part_load_coeffs,
            beta_ref: *beta_ref,
            reference_temp_c: *reference_temp_c,
            ambient_temp_c: *ambient_temp_c,
            max_heat_duty_w: *max_heat_duty_w,
            heat_capacity_floor: *heat_capacity_floor,
            flue_share: *flue_share,
            min_stable_duty_w: *min_stable_duty_w,
            unsolvable: unsolvable.clone(),
        }),
    }
}

pub fn build_sweep_plan(sweep: &SweepDef) -> SweepPlan {
    let mut plan = SweepPlan::new(sweep.nameplate_load_w, sweep.min_load_fraction, sweep.max_heat_duty_w);
    if let Some(min_duty) = sweep.min_heat_duty_w {
        plan.min_heat_duty_w = min_duty;
    }
    plan.heat_steps = sweep.heat_steps;
    plan.heat_spacing = match sweep.heat_spacing {
        SpacingDef::Linear => Spacing::Linear,
        SpacingDef::Logarithmic => Spacing::Logarithmic,
    };
    plan.load_levels = sweep.load_levels;
    plan.regression_points = sweep.regression_points;
    plan
}

pub fn build_heat_pump_plan(sweep: &HeatPumpSweepDef) -> HeatPumpPlan {
    HeatPumpPlan {
        nameplate_heat_w: sweep.nameplate_heat_w,
        min_load_fraction: sweep.min_load_fraction,
        load_levels: sweep.load_levels,
        high_boundary: sweep.high_boundary.map(|h| HighBoundaryLimits {
            above: h.above,
            min_load_fraction: h.min_load_fraction,
            load_levels: h.load_levels,
        }),
    }
}

pub fn build_exclusions(def: &ExclusionDef) -> ExclusionSet {
    let mut set = ExclusionSet::new().with_values(def.values.iter().copied());
    if let Some(below) = def.below {
        set = set.with_lower_limit(below);
    }
    if let Some(above) = def.above {
        set = set.with_upper_limit(above);
    }
    set
}

pub fn loss_share_method(def: LossShareDef) -> LossShareMethod {
    match def {
        LossShareDef::CornerAverage => LossShareMethod::CornerAverage,
        LossShareDef::DeltaRatio => LossShareMethod::DeltaRatio,
    }
}

pub fn unit_kind(def: UnitKindDef) -> UnitKind {
    match def {
        UnitKindDef::ExtractionTurbine => UnitKind::ExtractionTurbine,
        UnitKindDef::BackPressureTurbine => UnitKind::BackPressureTurbine,
        UnitKindDef::Engine => UnitKind::Engine,
    }
}

pub fn interpolation_settings(def: &InterpolationDef) -> InterpolationSettings {
    InterpolationSettings {
        kind: match def.kind {
            InterpolationKindDef::Pchip => InterpolationKind::Pchip,
            InterpolationKindDef::NaturalCubic => InterpolationKind::NaturalCubic,
        },
        fill_excluded: def.fill_excluded,
    }
}

pub fn key_rounding(def: RoundingDef) -> KeyRounding {
    match def {
        RoundingDef::Truncate => KeyRounding::Truncate,
        RoundingDef::Round => KeyRounding::Round,
    }
}

pub fn boundary_domain(def: &BoundaryDef) -> AppResult<BoundaryDomain> {
    BoundaryDomain::new(def.lo, def.hi).map_err(|e| AppError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ce_sim::{Setpoint, SimulationAdapter};

    fn unit() -> UnitDef {
        UnitDef {
            id: "ICE".to_string(),
            name: "Engine".to_string(),
            kind: UnitKindDef::Engine,
            plant: PlantDef::Linear {
                beta: 0.5,
                eta_el: 0.4,
                flue_share: 0.1,
                max_duty_w: 100.0,
                unsolvable: vec![75],
            },
            sweep: SweepDef {
                nameplate_load_w: 100.0,
                min_load_fraction: 0.5,
                max_heat_duty_w: 100.0,
                min_heat_duty_w: None,
                heat_steps: 5,
                heat_spacing: SpacingDef::Linear,
                load_levels: 4,
                regression_points: None,
            },
            exclusions: ExclusionDef {
                values: vec![75],
                below: Some(65),
                above: Some(120),
            },
            loss_share: LossShareDef::DeltaRatio,
        }
    }

    #[test]
    fn compile_carries_sweep_settings() {
        let rt = UnitRuntime::compile(&unit()).unwrap();
        assert_eq!(rt.plan.min_heat_duty_w, 10.0);
        assert_eq!(rt.plan.heat_steps, 5);
        assert_eq!(rt.plan.load_levels, 4);
        assert_eq!(rt.plan.regression_points, None);
        assert_eq!(rt.loss_share, LossShareMethod::DeltaRatio);
        assert_eq!(rt.kind, UnitKind::Engine);
    }

    #[test]
    fn exclusions_follow_definition() {
        let rt = UnitRuntime::compile(&unit()).unwrap();
        assert!(rt.exclusions.is_excluded(75));
        assert!(rt.exclusions.is_excluded(64));
        assert!(rt.exclusions.is_excluded(121));
        assert!(!rt.exclusions.is_excluded(65));
    }

    #[test]
    fn simulator_built_from_plant() {
        let rt = UnitRuntime::compile(&unit()).unwrap();
        let mut adapter = SimulationAdapter::new(rt.simulator());
        let op = adapter.simulate(&Setpoint::new(100.0, 20.0), 80.0, None).unwrap();
        assert!((op.p_elec() - 90.0).abs() < 1e-12);
        assert!(adapter.simulate(&Setpoint::new(100.0, 20.0), 75.0, None).is_err());
    }

    fn heat_pump() -> HeatPumpDef {
        HeatPumpDef {
            id: "HP".to_string(),
            name: "Heat pump".to_string(),
            plant: HeatPumpPlantDef::Surrogate {
                nameplate_heat_w: 10e6,
                source_temp_c: 40.0,
                sink_approach_k: 5.0,
                carnot_quality: 0.5,
                part_load_penalty: 0.0,
                unsolvable: vec![85],
            },
            sweep: HeatPumpSweepDef {
                nameplate_heat_w: 10e6,
                min_load_fraction: 0.4,
                load_levels: 4,
                high_boundary: None,
            },
            exclusions: ExclusionDef::default(),
        }
    }

    #[test]
    fn heat_pump_sweeps_and_reduces() {
        let rt = HeatPumpRuntime::compile(&heat_pump()).unwrap();
        assert_eq!(rt.plan.limits_at(124), (0.4, 4));

        let swept = rt.sweep(80).unwrap();
        assert_eq!(swept.q.len(), 4);
        assert_eq!(swept.stats.calls, 4);
        let params = swept.params.unwrap();
        assert!((params.p_min / params.p_max - 0.4).abs() < 1e-9);

        let failed = rt.sweep(85).unwrap();
        assert_eq!(failed.failed_steps, 4);
        assert!(failed.params.is_err());
    }

    #[test]
    fn invalid_plan_rejected() {
        let mut def = unit();
        def.sweep.heat_steps = 1;
        assert!(matches!(UnitRuntime::compile(&def), Err(AppError::Sweep(_))));
    }
}
