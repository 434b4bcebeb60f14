use super::CategoryRates;
use crate::{
    error::{Error, Result},
    population::{BucketScheme, PopulationVector},
    prelude::{Age, Real},
};
use getset::Getters;
use ndarray::Array2;
use std::io::Read;

/// Per age band coefficients of a clinical outcome, one column per category
/// (e.g. "Hospitalized-low", "ICU-high").
///
/// Rates for a population are the product of its age-band fractions with the
/// coefficient matrix.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct RateTable {
    bands: Vec<Age>,
    categories: Vec<String>,
    coefficients: Array2<Real>,
}

impl RateTable {
    /// Create table from a (bands x categories) coefficient matrix.
    pub fn new(bands: Vec<Age>, categories: Vec<String>, coefficients: Array2<Real>) -> Result<Self> {
        if coefficients.dim() != (bands.len(), categories.len()) {
            return Err(Error::data(
                "rate table",
                format!(
                    "shape {:?} does not match {} bands and {} categories",
                    coefficients.dim(),
                    bands.len(),
                    categories.len()
                ),
            ));
        }
        if bands.is_empty() || categories.is_empty() {
            return Err(Error::data("rate table", "empty table"));
        }
        if bands.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::data("rate table", format!("age bands {:?} are not increasing", bands)));
        }
        if let Some(x) = coefficients.iter().find(|x| !(**x >= 0.0) || !x.is_finite()) {
            return Err(Error::data("rate table", format!("invalid coefficient {}", x)));
        }
        Ok(RateTable {
            bands,
            categories,
            coefficients,
        })
    }

    /// Create table from rows of coefficients, one row per age band.
    pub fn from_rows(bands: Vec<Age>, categories: Vec<String>, rows: &[Vec<Real>]) -> Result<Self> {
        let ncols = categories.len();
        if let Some(row) = rows.iter().find(|r| r.len() != ncols) {
            return Err(Error::data(
                "rate table",
                format!("row {:?} does not have {} columns", row, ncols),
            ));
        }
        let flat: Vec<Real> = rows.iter().flatten().cloned().collect();
        let coefficients = Array2::from_shape_vec((rows.len(), ncols), flat)
            .map_err(|e| Error::data("rate table", e.to_string()))?;
        Self::new(bands, categories, coefficients)
    }

    /// Read a table whose header is `age,<category>,...` followed by one row
    /// per age band.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();
        if headers.len() < 2 {
            return Err(Error::data("rate table", "header must name the age column and categories"));
        }
        let categories: Vec<String> = headers.iter().skip(1).map(|s| s.trim().to_string()).collect();

        let mut bands = vec![];
        let mut rows = vec![];
        for res in reader.records() {
            let record = res?;
            let band = record
                .get(0)
                .and_then(|s| s.trim().parse::<Age>().ok())
                .ok_or_else(|| Error::data("rate table", format!("invalid age band in {:?}", record)))?;
            let row = record
                .iter()
                .skip(1)
                .map(|s| {
                    s.trim()
                        .parse::<Real>()
                        .map_err(|_| Error::data("rate table", format!("invalid coefficient {:?}", s)))
                })
                .collect::<Result<Vec<Real>>>()?;
            bands.push(band);
            rows.push(row);
        }
        Self::from_rows(bands, categories, &rows)
    }

    /// Check the table uses the buckets of the given scheme.
    pub fn check_scheme(&self, scheme: &BucketScheme) -> Result<()> {
        if self.bands != scheme.buckets() {
            return Err(Error::data(
                "rate table",
                format!(
                    "age bands {:?} do not match the {} buckets {:?}",
                    self.bands,
                    scheme.name,
                    scheme.buckets()
                ),
            ));
        }
        Ok(())
    }

    /// Population weighted rates of each category times a correction factor.
    ///
    /// The population must be given in the table's own banding.
    pub fn rates(&self, population: &PopulationVector, correction: Real) -> Result<CategoryRates> {
        if population.bands() != self.bands {
            return Err(Error::data(
                "rate table",
                format!(
                    "population bands {:?} do not match table bands {:?}",
                    population.bands(),
                    self.bands
                ),
            ));
        }
        let weights = population.to_array(&self.bands)?;
        let rates = weights.dot(&self.coefficients);
        Ok(self
            .categories
            .iter()
            .cloned()
            .zip(rates.iter().map(|r| r * correction))
            .collect())
    }
}
