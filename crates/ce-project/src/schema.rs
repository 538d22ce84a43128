//! Project schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub boundary: BoundaryDef,
    #[serde(default)]
    pub units: Vec<UnitDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub heat_pumps: Vec<HeatPumpDef>,
    #[serde(default)]
    pub characterization: CharacterizationDef,
    #[serde(default)]
    pub interpolation: InterpolationDef,
    #[serde(default)]
    pub resample: ResampleDef,
}

/// The boundary condition the envelopes depend on, e.g. feed temperature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundaryDef {
    pub name: String,
    #[serde(default = "default_boundary_unit")]
    pub unit: String,
    /// Lowest value of the dense table.
    pub lo: i32,
    /// Highest value of the dense table.
    pub hi: i32,
    /// Distance between characterized values.
    #[serde(default = "default_sample_step")]
    pub sample_step: i32,
}

impl BoundaryDef {
    /// Values to characterize: `lo`, `lo + step`, ... and always `hi`.
    pub fn sample_values(&self) -> Vec<i32> {
        if self.sample_step <= 0 || self.lo > self.hi {
            return Vec::new();
        }
        let mut values: Vec<i32> = (self.lo..=self.hi).step_by(self.sample_step as usize).collect();
        if values.last() != Some(&self.hi) {
            values.push(self.hi);
        }
        values
    }
}

fn default_boundary_unit() -> String {
    "degC".to_string()
}

fn default_sample_step() -> i32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: UnitKindDef,
    pub plant: PlantDef,
    pub sweep: SweepDef,
    #[serde(default)]
    pub exclusions: ExclusionDef,
    #[serde(default)]
    pub loss_share: LossShareDef,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnitKindDef {
    #[default]
    ExtractionTurbine,
    BackPressureTurbine,
    Engine,
}

/// Simulator backing a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum PlantDef {
    Linear {
        beta: f64,
        eta_el: f64,
        #[serde(default)]
        flue_share: f64,
        max_duty_w: f64,
        #[serde(default)]
        unsolvable: Vec<i32>,
    },
    ExtractionSurrogate {
        nameplate_load_w: f64,
        eta_el_nominal: f64,
        #[serde(default = "default_part_load_coeffs")]
        part_load_coeffs: [f64; 3],
        beta_ref: f64,
        #[serde(default = "default_reference_temp_c")]
        reference_temp_c: f64,
        #[serde(default = "default_ambient_temp_c")]
        ambient_temp_c: f64,
        max_heat_duty_w: f64,
        #[serde(default = "default_heat_capacity_floor")]
        heat_capacity_floor: f64,
        #[serde(default)]
        flue_share: f64,
        #[serde(default)]
        min_stable_duty_w: f64,
        #[serde(default)]
        unsolvable: Vec<i32>,
    },
}

fn default_part_load_coeffs() -> [f64; 3] {
    [0.7, 0.5, -0.2]
}

fn default_reference_temp_c() -> f64 {
    90.0
}

fn default_ambient_temp_c() -> f64 {
    15.0
}

fn default_heat_capacity_floor() -> f64 {
    0.3
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    pub nameplate_load_w: f64,
    pub min_load_fraction: f64,
    pub max_heat_duty_w: f64,
    /// Defaults to 10 % of `max_heat_duty_w`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_heat_duty_w: Option<f64>,
    #[serde(default = "default_heat_steps")]
    pub heat_steps: usize,
    #[serde(default)]
    pub heat_spacing: SpacingDef,
    #[serde(default = "default_load_levels")]
    pub load_levels: usize,
    /// Omit to regress over every converged point.
    #[serde(default = "default_regression_points")]
    pub regression_points: Option<usize>,
}

fn default_heat_steps() -> usize {
    7
}

fn default_load_levels() -> usize {
    7
}

fn default_regression_points() -> Option<usize> {
    Some(3)
}

/// A heat pump characterized by a single load sweep per boundary value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeatPumpDef {
    pub id: String,
    pub name: String,
    pub plant: HeatPumpPlantDef,
    pub sweep: HeatPumpSweepDef,
    #[serde(default)]
    pub exclusions: ExclusionDef,
}

/// Simulator backing a heat pump.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum HeatPumpPlantDef {
    Surrogate {
        nameplate_heat_w: f64,
        #[serde(default = "default_source_temp_c")]
        source_temp_c: f64,
        #[serde(default = "default_sink_approach_k")]
        sink_approach_k: f64,
        carnot_quality: f64,
        #[serde(default)]
        part_load_penalty: f64,
        #[serde(default)]
        unsolvable: Vec<i32>,
    },
}

fn default_source_temp_c() -> f64 {
    40.0
}

fn default_sink_approach_k() -> f64 {
    5.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeatPumpSweepDef {
    pub nameplate_heat_w: f64,
    #[serde(default = "default_hp_min_load_fraction")]
    pub min_load_fraction: f64,
    #[serde(default = "default_hp_load_levels")]
    pub load_levels: usize,
    /// Narrower turndown above a boundary value. Omit for 50 % over 6 levels
    /// above 115, set to null to disable.
    #[serde(default = "default_high_boundary")]
    pub high_boundary: Option<HighBoundaryDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HighBoundaryDef {
    pub above: i32,
    pub min_load_fraction: f64,
    pub load_levels: usize,
}

fn default_hp_min_load_fraction() -> f64 {
    0.3
}

fn default_hp_load_levels() -> usize {
    8
}

fn default_high_boundary() -> Option<HighBoundaryDef> {
    Some(HighBoundaryDef {
        above: 115,
        min_load_fraction: 0.5,
        load_levels: 6,
    })
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpacingDef {
    #[default]
    Linear,
    Logarithmic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExclusionDef {
    #[serde(default)]
    pub values: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LossShareDef {
    #[default]
    CornerAverage,
    DeltaRatio,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CharacterizationDef {
    /// Sweep boundary values on the rayon pool.
    pub parallel: bool,
    /// Reuse a stored run with the same content hash.
    pub use_cache: bool,
}

impl Default for CharacterizationDef {
    fn default() -> Self {
        Self {
            parallel: true,
            use_cache: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InterpolationDef {
    pub kind: InterpolationKindDef,
    /// Interpolate rows for excluded boundary values too. Off by default.
    pub fill_excluded: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationKindDef {
    #[default]
    Pchip,
    NaturalCubic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResampleDef {
    pub rounding: RoundingDef,
    /// Column holding the boundary series in input CSV files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundingDef {
    #[default]
    Truncate,
    Round,
}
