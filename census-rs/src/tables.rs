//! Immutable reference data shared by all projection requests.
//!
//! Tables are loaded once (from CSV readers or built in memory) and only read
//! afterwards, so a single `ReferenceTables` can serve concurrent projections
//! without locking.
use crate::{
    clinical::{ClinicalModel, ClinicalModelKind, ManualRates, RateModel, RateTable},
    error::{Error, Result},
    population::{PopulationVector, CDC_BUCKETS, VERITY_BUCKETS},
    prelude::{Age, Real},
    series::ALL_SUBREGIONS,
};
use getset::Getters;
use log::debug;
use std::{collections::BTreeMap, io::Read};

/// Population structures keyed by region and then sub-region.
pub type PopulationTable = BTreeMap<String, BTreeMap<String, PopulationVector>>;

/// Rate models and population structures.
#[derive(Debug, Clone, PartialEq, Default, Getters)]
#[getset(get = "pub")]
pub struct ReferenceTables {
    cdc: Option<RateModel>,
    verity: Option<RateModel>,
    populations: PopulationTable,
}

/// Region keys are stored without whitespace ("New York" -> "NewYork").
fn region_key(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Sub-region keys drop the " City" suffix ("New York City" -> "New York").
fn subregion_key(name: &str) -> String {
    name.replace(" City", "").trim().to_string()
}

impl ReferenceTables {
    /// Empty context. Both bucket schemes are validated here so that a broken
    /// mapping never reaches a projection.
    pub fn new() -> Result<Self> {
        CDC_BUCKETS.validate()?;
        VERITY_BUCKETS.validate()?;
        Ok(Self::default())
    }

    pub fn with_cdc(mut self, admissions: RateTable, deaths: RateTable) -> Result<Self> {
        self.cdc = Some(RateModel::cdc(admissions, deaths)?);
        Ok(self)
    }

    pub fn with_verity(mut self, admissions: RateTable, deaths: RateTable) -> Result<Self> {
        self.verity = Some(RateModel::verity(admissions, deaths)?);
        Ok(self)
    }

    /// Register the census banded population of a sub-region.
    pub fn with_population(mut self, region: &str, subregion: &str, population: PopulationVector) -> Result<Self> {
        population.validate()?;
        self.populations
            .entry(region_key(region))
            .or_default()
            .insert(subregion_key(subregion), population);
        Ok(self)
    }

    /// Register all populations of a table.
    pub fn with_populations(mut self, table: PopulationTable) -> Result<Self> {
        for (region, subregions) in table {
            for (subregion, population) in subregions {
                self = self.with_population(&region, &subregion, population)?;
            }
        }
        Ok(self)
    }

    /// Population structure of a sub-region, or the sum over all sub-regions
    /// when `subregion` is "All".
    pub fn population_structure(&self, region: &str, subregion: &str) -> Result<PopulationVector> {
        let subregions = self.populations.get(&region_key(region)).ok_or_else(|| {
            Error::data("population", format!("no population data for region {:?}", region))
        })?;

        if subregion == ALL_SUBREGIONS {
            let mut parts = subregions.values();
            let first = parts
                .next()
                .cloned()
                .ok_or_else(|| Error::data("population", format!("region {:?} is empty", region)))?;
            return parts.try_fold(first, |acc, p| acc.try_add(p));
        }
        subregions.get(&subregion_key(subregion)).cloned().ok_or_else(|| {
            Error::data(
                "population",
                format!("no population data for {:?} in {:?}", subregion, region),
            )
        })
    }

    /// Resolve a model name into a model backed by these tables.
    pub fn clinical_model(&self, kind: ClinicalModelKind, manual: ManualRates) -> Result<ClinicalModel<'_>> {
        let missing = || Error::data("clinical model", format!("no reference tables loaded for {}", kind));
        match kind {
            ClinicalModelKind::Adjustable => Ok(ClinicalModel::Adjustable(manual)),
            ClinicalModelKind::Cdc => self.cdc.as_ref().map(ClinicalModel::Cdc).ok_or_else(missing),
            ClinicalModelKind::Verity => self.verity.as_ref().map(ClinicalModel::Verity).ok_or_else(missing),
        }
    }
}

/// Read `state,county,0,5,...,85` rows of population counts.
pub fn read_populations<R: Read>(reader: R) -> Result<PopulationTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let bands = headers
        .iter()
        .skip(2)
        .map(|h| {
            h.trim()
                .parse::<Age>()
                .map_err(|_| Error::data("population table", format!("invalid age band {:?}", h)))
        })
        .collect::<Result<Vec<Age>>>()?;
    if bands.is_empty() {
        return Err(Error::data("population table", "no age band columns"));
    }

    let mut table = PopulationTable::new();
    for res in reader.records() {
        let record = res?;
        let (region, subregion) = match (record.get(0), record.get(1)) {
            (Some(r), Some(s)) => (r.trim().to_string(), s.trim().to_string()),
            _ => return Err(Error::data("population table", format!("short row {:?}", record))),
        };
        let counts = record
            .iter()
            .skip(2)
            .map(|s| {
                s.trim()
                    .parse::<Real>()
                    .map_err(|_| Error::data("population table", format!("invalid count {:?}", s)))
            })
            .collect::<Result<Vec<Real>>>()?;
        if counts.len() != bands.len() {
            return Err(Error::data(
                "population table",
                format!("row for {}/{} has {} counts", region, subregion, counts.len()),
            ));
        }
        let population = PopulationVector::new(bands.iter().cloned().zip(counts).collect());
        table.entry(region).or_default().insert(subregion, population);
    }
    debug!(target: "load", "population table: {} regions", table.len());
    Ok(table)
}
