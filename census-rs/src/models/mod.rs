//! Compartmental (SIR) models producing forward projections of infections.
pub mod sir;
pub use sir::*;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Default number of integration steps per simulated day.
pub const DEFAULT_SUBSTEPS: usize = 10;

/// Stepping scheme used to advance the SIR state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMethod {
    /// Runge-Kutta integration of the differential system.
    Continuous,
    /// Explicit daily recursion.
    Discrete,
}

impl Default for SimulationMethod {
    fn default() -> Self {
        SimulationMethod::Continuous
    }
}

impl SimulationMethod {
    /// Simulate `days` daily points starting from the initial condition.
    pub fn simulate(self, params: &SirParams, days: usize, substeps: usize) -> Result<Trajectory> {
        match self {
            SimulationMethod::Continuous => continuous_sir(params, &daily_grid(days), substeps),
            SimulationMethod::Discrete => discrete_sir(params, days),
        }
    }
}
