use serde::{Deserialize, Serialize};

/// Control variables for one simulation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    /// Generator (prime mover) load target in W.
    pub load_w: f64,
    /// Heat-extraction duty target in W.
    pub heat_duty_w: f64,
}

impl Setpoint {
    pub fn new(load_w: f64, heat_duty_w: f64) -> Self {
        Self {
            load_w,
            heat_duty_w,
        }
    }
}
