//! Clinical rate models: admission and death rates plus length of stay
//! conventions for each supported model.
//!
//! The adjustable model uses caller supplied scalar rates. The CDC and Verity
//! models weight published per age band coefficients by the population
//! structure of the region and apply a fixed empirical correction.
mod constants;
mod table;

pub use constants::*;
pub use table::*;

use crate::{
    error::{Error, Result},
    population::{BucketScheme, PopulationVector, CDC_BUCKETS, VERITY_BUCKETS},
    prelude::Real,
};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, convert::TryFrom, fmt, str::FromStr};

/// Rate per infection of each outcome category.
pub type CategoryRates = BTreeMap<String, Real>;

/// Length of stay in days of each outcome category.
pub type LosMap = BTreeMap<String, usize>;

/// Names of the supported clinical models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClinicalModelKind {
    Adjustable,
    Cdc,
    Verity,
}

impl Default for ClinicalModelKind {
    fn default() -> Self {
        ClinicalModelKind::Adjustable
    }
}

impl FromStr for ClinicalModelKind {
    type Err = Error;

    /// "CDC" and "Verity" select the data backed models. The adjustable model
    /// must be asked for explicitly as "default", "adjustable" or "custom".
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "adjustable" | "custom" => Ok(ClinicalModelKind::Adjustable),
            "cdc" => Ok(ClinicalModelKind::Cdc),
            "verity" => Ok(ClinicalModelKind::Verity),
            _ => Err(Error::ModelSelection(s.to_string())),
        }
    }
}

impl TryFrom<String> for ClinicalModelKind {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ClinicalModelKind> for String {
    fn from(kind: ClinicalModelKind) -> String {
        kind.to_string()
    }
}

impl fmt::Display for ClinicalModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClinicalModelKind::Adjustable => write!(f, "default"),
            ClinicalModelKind::Cdc => write!(f, "CDC"),
            ClinicalModelKind::Verity => write!(f, "Verity"),
        }
    }
}

/// Scalar rates of the adjustable model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualRates {
    pub hospitalized: Real,
    pub icu: Real,
    pub death: Real,
}

impl Default for ManualRates {
    fn default() -> Self {
        ManualRates {
            hospitalized: HOSP_RATE,
            icu: ICU_RATE,
            death: DEATH_RATE,
        }
    }
}

impl ManualRates {
    pub fn new(hospitalized: Real, icu: Real, death: Real) -> Self {
        ManualRates {
            hospitalized,
            icu,
            death,
        }
    }
}

/// Reference tables and corrections of a data backed model.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct RateModel {
    #[getset(get = "pub")]
    admissions: RateTable,
    #[getset(get = "pub")]
    deaths: RateTable,
    #[getset(get_copy = "pub")]
    scheme: BucketScheme,
    #[getset(get_copy = "pub")]
    admission_correction: Real,
    #[getset(get_copy = "pub")]
    death_correction: Real,
}

impl RateModel {
    /// Validate tables against the bucket scheme. Admission categories must be
    /// hospital or ICU categories so that a length of stay can be assigned.
    pub fn new(
        admissions: RateTable,
        deaths: RateTable,
        scheme: BucketScheme,
        admission_correction: Real,
        death_correction: Real,
    ) -> Result<Self> {
        scheme.validate()?;
        admissions.check_scheme(&scheme)?;
        deaths.check_scheme(&scheme)?;
        for category in admissions.categories() {
            los_group(category)?;
        }
        Ok(RateModel {
            admissions,
            deaths,
            scheme,
            admission_correction,
            death_correction,
        })
    }

    /// CDC MMWR tables with their correction factors.
    pub fn cdc(admissions: RateTable, deaths: RateTable) -> Result<Self> {
        Self::new(
            admissions,
            deaths,
            CDC_BUCKETS,
            CDC_HOSP_CORRECTION,
            CDC_DEATHS_CORRECTION,
        )
    }

    /// Verity et al. tables.
    pub fn verity(admissions: RateTable, deaths: RateTable) -> Result<Self> {
        Self::new(
            admissions,
            deaths,
            VERITY_BUCKETS,
            VERITY_HOSP_CORRECTION,
            VERITY_DEATHS_CORRECTION,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LosGroup {
    Hospital,
    Icu,
}

fn los_group(category: &str) -> Result<LosGroup> {
    if category.starts_with(HOSPITALIZED) {
        Ok(LosGroup::Hospital)
    } else if category.starts_with(ICU) {
        Ok(LosGroup::Icu)
    } else {
        Err(Error::data(
            "length of stay",
            format!("category {:?} is neither hospital nor ICU", category),
        ))
    }
}

/// A resolved clinical model, ready to compute rates for a population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClinicalModel<'a> {
    Adjustable(ManualRates),
    Cdc(&'a RateModel),
    Verity(&'a RateModel),
}

impl<'a> ClinicalModel<'a> {
    pub fn kind(&self) -> ClinicalModelKind {
        match self {
            ClinicalModel::Adjustable(_) => ClinicalModelKind::Adjustable,
            ClinicalModel::Cdc(_) => ClinicalModelKind::Cdc,
            ClinicalModel::Verity(_) => ClinicalModelKind::Verity,
        }
    }

    /// Age buckets used by the model. The adjustable model reports the CDC
    /// buckets though its rates do not depend on them.
    pub fn scheme(&self) -> BucketScheme {
        match self {
            ClinicalModel::Adjustable(_) => CDC_BUCKETS,
            ClinicalModel::Cdc(m) | ClinicalModel::Verity(m) => m.scheme,
        }
    }

    /// Normalize a census banded population and re-bucket it into the bands of
    /// the model.
    pub fn population_structure(&self, population: &PopulationVector) -> Result<PopulationVector> {
        self.scheme().rebucket(&population.normalized()?)
    }

    /// Admission rates of each category, given the population structure in the
    /// model's own bands.
    pub fn admission_rates(&self, structure: &PopulationVector) -> Result<CategoryRates> {
        match self {
            ClinicalModel::Adjustable(manual) => Ok(vec![
                (HOSPITALIZED.to_string(), manual.hospitalized),
                (ICU.to_string(), manual.icu),
            ]
            .into_iter()
            .collect()),
            ClinicalModel::Cdc(m) | ClinicalModel::Verity(m) => {
                m.admissions.rates(structure, m.admission_correction)
            }
        }
    }

    /// Death rates per category. The adjustable model has a single "Deaths"
    /// category.
    pub fn death_rates(&self, structure: &PopulationVector) -> Result<CategoryRates> {
        match self {
            ClinicalModel::Adjustable(manual) => {
                Ok(vec![(DEATHS.to_string(), manual.death)].into_iter().collect())
            }
            ClinicalModel::Cdc(m) | ClinicalModel::Verity(m) => {
                m.deaths.rates(structure, m.death_correction)
            }
        }
    }

    /// Length of stay of each admission category. Data backed models assign
    /// the hospital or ICU length of stay to each of their low/mean/high
    /// categories.
    pub fn length_of_stay(&self, hosp_days: usize, icu_days: usize) -> Result<LosMap> {
        match self {
            ClinicalModel::Adjustable(_) => Ok(vec![
                (HOSPITALIZED.to_string(), hosp_days),
                (ICU.to_string(), icu_days),
            ]
            .into_iter()
            .collect()),
            ClinicalModel::Cdc(m) | ClinicalModel::Verity(m) => m
                .admissions
                .categories()
                .iter()
                .map(|c| -> Result<(String, usize)> {
                    let days = match los_group(c)? {
                        LosGroup::Hospital => hosp_days,
                        LosGroup::Icu => icu_days,
                    };
                    Ok((c.clone(), days))
                })
                .collect(),
        }
    }
}

/// Admission rates of a census banded population under the given model.
pub fn resolve_admission_rates(model: &ClinicalModel, population: &PopulationVector) -> Result<CategoryRates> {
    model.admission_rates(&model.population_structure(population)?)
}

/// Death rates of a census banded population under the given model.
pub fn resolve_death_rates(model: &ClinicalModel, population: &PopulationVector) -> Result<CategoryRates> {
    model.death_rates(&model.population_structure(population)?)
}

/// Length of stay of each admission category of the model.
pub fn resolve_los(model: &ClinicalModel, hosp_days: usize, icu_days: usize) -> Result<LosMap> {
    model.length_of_stay(hosp_days, icu_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::CENSUS_BANDS;
    use assert_approx_eq::assert_approx_eq;

    fn categories() -> Vec<String> {
        ["Hospitalized-low", "Hospitalized-high", "ICU-low", "ICU-high"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn cdc_model() -> RateModel {
        let bands = CDC_BUCKETS.buckets();
        let rows: Vec<Vec<Real>> = bands.iter().map(|_| vec![0.1, 0.2, 0.05, 0.1]).collect();
        let admissions = RateTable::from_rows(bands.clone(), categories(), &rows).unwrap();
        let rows: Vec<Vec<Real>> = bands.iter().map(|_| vec![0.01, 0.02]).collect();
        let deaths = RateTable::from_rows(
            bands,
            vec!["Deaths-low".into(), "Deaths-high".into()],
            &rows,
        )
        .unwrap();
        RateModel::cdc(admissions, deaths).unwrap()
    }

    fn population() -> PopulationVector {
        PopulationVector::from_census([100.0; 18])
    }

    #[test]
    fn model_names() {
        assert_eq!("CDC".parse::<ClinicalModelKind>().unwrap(), ClinicalModelKind::Cdc);
        assert_eq!("Verity".parse::<ClinicalModelKind>().unwrap(), ClinicalModelKind::Verity);
        assert_eq!("Custom".parse::<ClinicalModelKind>().unwrap(), ClinicalModelKind::Adjustable);
        assert_eq!("default".parse::<ClinicalModelKind>().unwrap(), ClinicalModelKind::Adjustable);
        match "Imperial".parse::<ClinicalModelKind>() {
            Err(Error::ModelSelection(name)) => assert_eq!(name, "Imperial"),
            other => panic!("unexpected {:?}", other),
        }
        assert!("".parse::<ClinicalModelKind>().is_err());
    }

    #[test]
    fn adjustable_rates_ignore_population() {
        let model = ClinicalModel::Adjustable(ManualRates::new(0.05, 0.02, 0.01));
        let rates = resolve_admission_rates(&model, &population()).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[HOSPITALIZED], 0.05);
        assert_eq!(rates[ICU], 0.02);
        assert_eq!(resolve_death_rates(&model, &population()).unwrap()[DEATHS], 0.01);

        let los = resolve_los(&model, 7, 9).unwrap();
        assert_eq!(los[HOSPITALIZED], 7);
        assert_eq!(los[ICU], 9);
    }

    #[test]
    fn cdc_rates_are_weighted_and_corrected() {
        let tables = cdc_model();
        let model = ClinicalModel::Cdc(&tables);
        let rates = resolve_admission_rates(&model, &population()).unwrap();
        // uniform coefficients: weighted rate equals the coefficient
        assert_approx_eq!(rates["Hospitalized-low"], 0.1 * CDC_HOSP_CORRECTION);
        assert_approx_eq!(rates["ICU-high"], 0.1 * CDC_HOSP_CORRECTION);
        let deaths = resolve_death_rates(&model, &population()).unwrap();
        assert_approx_eq!(deaths["Deaths-high"], 0.02 * CDC_DEATHS_CORRECTION);

        let los = resolve_los(&model, 7, 9).unwrap();
        assert_eq!(los.len(), 4);
        assert_eq!(los["Hospitalized-high"], 7);
        assert_eq!(los["ICU-low"], 9);
    }

    #[test]
    fn structure_follows_model_buckets() {
        let tables = cdc_model();
        let s = ClinicalModel::Cdc(&tables).population_structure(&population()).unwrap();
        assert_eq!(s.bands(), CDC_BUCKETS.buckets());
        assert_approx_eq!(s.total(), 1.0);
        assert_approx_eq!(s.get(0).unwrap(), 4.0 / CENSUS_BANDS.len() as Real);
    }

    #[test]
    fn tables_must_match_scheme() {
        let tables = cdc_model();
        let err = RateModel::verity(tables.admissions().clone(), tables.deaths().clone());
        assert!(err.unwrap_err().is_data());

        let bands = CDC_BUCKETS.buckets();
        let rows: Vec<Vec<Real>> = bands.iter().map(|_| vec![0.1]).collect();
        let odd = RateTable::from_rows(bands, vec!["Ventilator".into()], &rows).unwrap();
        assert!(RateModel::cdc(odd, tables.deaths().clone()).is_err());
    }

    #[test]
    fn kind_roundtrip_in_toml() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Wrapper {
            model: ClinicalModelKind,
        }
        let w: Wrapper = toml::from_str("model = \"Verity\"").unwrap();
        assert_eq!(w.model, ClinicalModelKind::Verity);
        let data = toml::to_string(&w).unwrap();
        assert_eq!(toml::from_str::<Wrapper>(&data).unwrap(), w);
        assert!(toml::from_str::<Wrapper>("model = \"Imperial\"").is_err());
    }
}
