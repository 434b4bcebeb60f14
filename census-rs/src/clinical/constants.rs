use crate::prelude::Real;

///////////////////////////////////////////////////////////////////////////////
// Category labels
///////////////////////////////////////////////////////////////////////////////

pub const HOSPITALIZED: &str = "Hospitalized";
pub const ICU: &str = "ICU";
pub const DEATHS: &str = "Deaths";

///////////////////////////////////////////////////////////////////////////////
// Empirical corrections of the data backed models
///////////////////////////////////////////////////////////////////////////////

// CDC MMWR rates, corrected to the NYC population structure.
pub const CDC_HOSP_CORRECTION: Real = 0.132;
pub const CDC_DEATHS_CORRECTION: Real = 0.184;

// The Verity tables already assume half of the admissions go to the ICU.
pub const VERITY_HOSP_CORRECTION: Real = 1.0;
pub const VERITY_DEATHS_CORRECTION: Real = 1.0;

///////////////////////////////////////////////////////////////////////////////
// Defaults of the adjustable model
///////////////////////////////////////////////////////////////////////////////

pub const HOSP_RATE: Real = 0.025;
pub const ICU_RATE: Real = 0.01;
pub const DEATH_RATE: Real = 0.005;
pub const HOSP_LOS: usize = 7;
pub const ICU_LOS: usize = 9;
