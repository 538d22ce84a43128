// ce-core/src/units.rs

use uom::si::f64::{Power as UomPower, ThermodynamicTemperature as UomThermodynamicTemperature};

// Public canonical unit types (SI, f64)
pub type Power = UomPower;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

/// Power value in megawatts, for reports.
#[inline]
pub fn as_mw(p: Power) -> f64 {
    use uom::si::power::megawatt;
    p.get::<megawatt>()
}

/// Absolute temperature in kelvin.
#[inline]
pub fn as_kelvin(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}
