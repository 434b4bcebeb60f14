//! Regional COVID-19 spread and hospital demand projections.
//!
//! The pipeline goes from a cumulative case series to a transmission rate
//! (`growth`), through a SIR simulation (`models`) to daily incidence, and
//! from incidence to admissions, bed census and deaths (`clinical`, `census`)
//! using age structured population data (`population`). Reference data is
//! loaded once into an immutable `ReferenceTables` context which is shared by
//! all projection requests.
pub mod census;
pub mod clinical;
pub mod error;
pub mod growth;
pub mod models;
pub mod population;
pub mod prelude;
pub mod projection;
pub mod report;
pub mod series;
pub mod tables;
pub mod utils;

pub use crate::error::{Error, Result};
pub use crate::prelude::{Age, Real, GAMMA};
