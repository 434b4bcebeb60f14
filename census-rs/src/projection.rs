//! Projection entry point: case series to hospital demand.
use crate::{
    census::{admissions_by_category, census_by_category, deaths_by_category, deaths_per_day, CategorySeries},
    clinical::{
        resolve_admission_rates, resolve_death_rates, resolve_los, ClinicalModelKind, ManualRates, HOSP_LOS, ICU_LOS,
    },
    error::{Error, Result},
    growth::{estimate_beta, mean_doubling_time, BETA_WINDOW},
    models::{SimulationMethod, SirParams, Trajectory, DEFAULT_SUBSTEPS},
    prelude::{Real, GAMMA},
    series::{CaseData, RegionCases, ALL_SUBREGIONS},
    tables::ReferenceTables,
};
use getset::{CopyGetters, Getters};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Inputs of a single projection. Read from TOML, missing keys take the
/// dashboard defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionRequest {
    pub state: String,
    pub county: String,
    pub asymptomatic_fraction: Real,
    pub hosp_los: usize,
    pub icu_los: usize,
    pub horizon_days: usize,
    pub clinical_model: ClinicalModelKind,
    pub gamma: Real,
    pub method: SimulationMethod,
    pub substeps: usize,
    pub rates: ManualRates,
}

impl Default for ProjectionRequest {
    fn default() -> Self {
        ProjectionRequest {
            state: String::new(),
            county: ALL_SUBREGIONS.to_string(),
            asymptomatic_fraction: 0.5,
            hosp_los: HOSP_LOS,
            icu_los: ICU_LOS,
            horizon_days: 200,
            clinical_model: ClinicalModelKind::default(),
            gamma: GAMMA,
            method: SimulationMethod::default(),
            substeps: DEFAULT_SUBSTEPS,
            rates: ManualRates::default(),
        }
    }
}

impl ProjectionRequest {
    pub fn new(state: &str, county: &str) -> Self {
        ProjectionRequest {
            state: state.to_string(),
            county: county.to_string(),
            ..Default::default()
        }
    }

    /// Check ranges that no later stage would catch with a clear message.
    pub fn validate(&self) -> Result<()> {
        if !(self.asymptomatic_fraction >= 0.0 && self.asymptomatic_fraction < 1.0) {
            return Err(Error::invalid(format!(
                "asymptomatic fraction must be in [0, 1), got {}",
                self.asymptomatic_fraction
            )));
        }
        if self.horizon_days == 0 {
            return Err(Error::invalid("projection horizon must be at least one day"));
        }
        if !(self.gamma > 0.0) || !self.gamma.is_finite() {
            return Err(Error::invalid(format!("recovery rate must be positive, got {}", self.gamma)));
        }
        let ManualRates {
            hospitalized,
            icu,
            death,
        } = self.rates;
        if [hospitalized, icu, death].iter().any(|x| !(*x >= 0.0) || !x.is_finite()) {
            return Err(Error::invalid(format!("invalid manual rates {:?}", self.rates)));
        }
        Ok(())
    }
}

/// Result of a projection. All series have one entry per simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, CopyGetters)]
pub struct Projection {
    #[getset(get_copy = "pub")]
    beta: Real,
    #[getset(get_copy = "pub")]
    gamma: Real,
    /// Mean doubling time of the growth window, in days.
    #[getset(get_copy = "pub")]
    doubling_time: Real,
    #[getset(get_copy = "pub")]
    initial_infected: Real,
    #[getset(get_copy = "pub")]
    population: Real,
    #[getset(get = "pub")]
    trajectory: Trajectory,
    #[getset(get = "pub")]
    admissions: CategorySeries,
    #[getset(get = "pub")]
    census: CategorySeries,
    /// Cumulative deaths.
    #[getset(get = "pub")]
    deaths: CategorySeries,
    #[getset(get = "pub")]
    deaths_per_day: CategorySeries,
}

impl Projection {
    pub fn days(&self) -> usize {
        self.trajectory.len()
    }

    /// Peak census of each category as (day, beds).
    pub fn peak_census(&self) -> Vec<(String, usize, Real)> {
        self.census
            .iter()
            .filter_map(|(category, series)| {
                let (t, x) = series
                    .iter()
                    .cloned()
                    .enumerate()
                    .fold(None, |acc: Option<(usize, Real)>, (t, x)| match acc {
                        Some((_, m)) if m >= x => acc,
                        _ => Some((t, x)),
                    })?;
                Some((category.clone(), t, x))
            })
            .collect()
    }
}

/// Run the full pipeline for one sub-region.
///
/// β is estimated on the last week of the parent region, which is less noisy
/// than a single county. The projection starts from the last confirmed count
/// of the sub-region scaled up by the asymptomatic fraction.
pub fn project(tables: &ReferenceTables, cases: &RegionCases, request: &ProjectionRequest) -> Result<Projection> {
    request.validate()?;
    cases.parent.validate()?;
    cases.local.validate()?;

    let window = cases.parent.tail(BETA_WINDOW);
    if window.is_empty() {
        return Err(Error::data(
            "projection",
            format!("empty case window for {}/{}", request.state, request.county),
        ));
    }
    let beta = estimate_beta(&window, request.gamma)?;
    let doubling_time = mean_doubling_time(&window)?;

    let last = cases.local.confirmed().last().cloned().ok_or_else(|| {
        Error::data(
            "projection",
            format!("no confirmed cases for {}/{}", request.state, request.county),
        )
    })?;
    if last.is_nan() {
        return Err(Error::data("projection", "last confirmed count is missing"));
    }
    let initial_infected = last / (1.0 - request.asymptomatic_fraction);

    let population = tables.population_structure(&request.state, &request.county)?;
    let n = population.total();
    info!(
        target: "projection",
        "{}/{}: beta={:.4}, Td={:.2}, I0={}, N={}",
        request.state,
        request.county,
        beta,
        doubling_time,
        initial_infected,
        n
    );

    let params = SirParams::new(beta, request.gamma, n, initial_infected)?;
    let trajectory = request
        .method
        .simulate(&params, request.horizon_days, request.substeps)?;
    debug!(
        target: "projection",
        "simulated {} days with {:?}, peak={:?}",
        trajectory.len(),
        request.method,
        trajectory.peak_infected()
    );

    let model = tables.clinical_model(request.clinical_model, request.rates)?;
    let admission_rates = resolve_admission_rates(&model, &population)?;
    let death_rates = resolve_death_rates(&model, &population)?;
    let los = resolve_los(&model, request.hosp_los, request.icu_los)?;
    debug!(
        target: "projection",
        "{} model: admissions={:?}, deaths={:?}, los={:?}",
        model.kind(),
        admission_rates,
        death_rates,
        los
    );

    let incidence = trajectory.new_infections();
    let admissions = admissions_by_category(incidence, &admission_rates);
    let census = census_by_category(incidence, &admission_rates, &los)?;
    let deaths = deaths_by_category(trajectory.removed(), &death_rates);
    let deaths_per_day = deaths_per_day(&deaths);

    Ok(Projection {
        beta,
        gamma: request.gamma,
        doubling_time,
        initial_infected,
        population: n,
        trajectory,
        admissions,
        census,
        deaths,
        deaths_per_day,
    })
}

/// Project the region named in the request from loaded case data.
pub fn project_region(tables: &ReferenceTables, data: &CaseData, request: &ProjectionRequest) -> Result<Projection> {
    let cases = data.region_cases(&request.state, &request.county)?;
    project(tables, &cases, request)
}

/// Evaluate independent requests in parallel against shared tables. Results
/// keep the order of the requests.
pub fn project_many(
    tables: &ReferenceTables,
    data: &CaseData,
    requests: &[ProjectionRequest],
) -> Vec<Result<Projection>> {
    requests
        .par_iter()
        .map(|request| project_region(tables, data, request))
        .collect()
}
