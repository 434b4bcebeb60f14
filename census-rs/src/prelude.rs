pub use crate::census::{CategorySeries, CensusAccumulator};
pub use crate::clinical::{CategoryRates, ClinicalModel, ClinicalModelKind, LosMap, ManualRates};
pub use crate::error::{Error, Result};
pub use crate::growth::{doubling_time, estimate_beta};
pub use crate::models::{SimulationMethod, SirParams, Trajectory};
pub use crate::population::{BucketScheme, PopulationVector, CDC_BUCKETS, VERITY_BUCKETS};
pub use crate::projection::{project, project_many, Projection, ProjectionRequest};
pub use crate::series::{CaseData, CaseRecord, CaseSeries, RegionCases};
pub use crate::tables::ReferenceTables;

/// Base Real type used by this crate. Uses an alias to easily change precision
/// if necessary.
pub type Real = f64;
pub(crate) const INF: Real = Real::INFINITY;

/// Starting age of an age band (0, 5, 10, ... for census data).
pub type Age = u8;

/// Default recovery rate: one over a 14 day infectious period.
pub const GAMMA: Real = 1.0 / 14.0;
