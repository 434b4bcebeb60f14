//! Age structured population vectors and their re-bucketing into the age
//! bands used by clinical rate tables.
use crate::{
    error::{Error, Result},
    prelude::{Age, Real},
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Starting ages of the 5-year census bands. The last band is 85+.
pub const CENSUS_BANDS: [Age; 18] = [
    0, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85,
];

/// Population counts (or fractions) keyed by the starting age of each band.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PopulationVector {
    counts: BTreeMap<Age, Real>,
}

impl PopulationVector {
    pub fn new(counts: BTreeMap<Age, Real>) -> Self {
        PopulationVector { counts }
    }

    /// Create from the 18 counts of the census 5-year bands, in order.
    pub fn from_census(counts: [Real; 18]) -> Self {
        PopulationVector {
            counts: CENSUS_BANDS.iter().cloned().zip(counts.iter().cloned()).collect(),
        }
    }

    pub fn get(&self, band: Age) -> Option<Real> {
        self.counts.get(&band).cloned()
    }

    /// Bands in ascending order.
    pub fn bands(&self) -> Vec<Age> {
        self.counts.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> Real {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Age, Real)> + '_ {
        self.counts.iter().map(|(&a, &x)| (a, x))
    }

    /// Check all counts are finite and non-negative and that the total is
    /// positive.
    pub fn validate(&self) -> Result<()> {
        if let Some((band, x)) = self.iter().find(|(_, x)| !(*x >= 0.0) || !x.is_finite()) {
            return Err(Error::data(
                "population",
                format!("invalid count {} for age band {}", x, band),
            ));
        }
        if !(self.total() > 0.0) {
            return Err(Error::data("population", "total population must be positive"));
        }
        Ok(())
    }

    /// Divide each band by the total population.
    pub fn normalized(&self) -> Result<PopulationVector> {
        let total = self.total();
        if !(total > 0.0) || !total.is_finite() {
            return Err(Error::numeric(
                "population",
                format!("cannot normalize population with total {}", total),
            ));
        }
        Ok(PopulationVector {
            counts: self.iter().map(|(a, x)| (a, x / total)).collect(),
        })
    }

    /// Band by band sum of two vectors. Both must have the same bands.
    pub fn try_add(&self, other: &PopulationVector) -> Result<PopulationVector> {
        if self.bands() != other.bands() {
            return Err(Error::data(
                "population",
                format!("mismatched age bands {:?} and {:?}", self.bands(), other.bands()),
            ));
        }
        Ok(PopulationVector {
            counts: self.iter().map(|(a, x)| (a, x + other.counts[&a])).collect(),
        })
    }

    /// Values ordered by the given bands. Every band must be present.
    pub fn to_array(&self, bands: &[Age]) -> Result<Array1<Real>> {
        bands
            .iter()
            .map(|band| {
                self.get(*band).ok_or_else(|| {
                    Error::data("population", format!("missing age band {}", band))
                })
            })
            .collect::<Result<Vec<Real>>>()
            .map(Array1::from)
    }
}

/// A named partition of the census 5-year bands into coarser buckets,
/// given as (census band, bucket) pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketScheme {
    pub name: &'static str,
    pub pairs: &'static [(Age, Age)],
}

/// Age bands of the CDC MMWR report.
pub const CDC_BUCKETS: BucketScheme = BucketScheme {
    name: "CDC",
    pairs: &[
        (0, 0),
        (5, 0),
        (10, 0),
        (15, 0),
        (20, 20),
        (25, 20),
        (30, 20),
        (35, 20),
        (40, 20),
        (45, 45),
        (50, 45),
        (55, 55),
        (60, 55),
        (65, 65),
        (70, 65),
        (75, 75),
        (80, 75),
        (85, 85),
    ],
};

/// 10-year age bands of Verity et al. The last bucket is 80+.
pub const VERITY_BUCKETS: BucketScheme = BucketScheme {
    name: "Verity",
    pairs: &[
        (0, 0),
        (5, 0),
        (10, 10),
        (15, 10),
        (20, 20),
        (25, 20),
        (30, 30),
        (35, 30),
        (40, 40),
        (45, 40),
        (50, 50),
        (55, 50),
        (60, 60),
        (65, 60),
        (70, 70),
        (75, 70),
        (80, 80),
        (85, 80),
    ],
};

impl BucketScheme {
    /// Distinct output buckets in ascending order.
    pub fn buckets(&self) -> Vec<Age> {
        let mut out: Vec<Age> = self.pairs.iter().map(|&(_, b)| b).collect();
        out.sort_unstable();
        out.dedup();
        return out;
    }

    /// Check that every census band is mapped exactly once.
    pub fn validate(&self) -> Result<()> {
        let mut seen: BTreeMap<Age, usize> = BTreeMap::new();
        for &(band, _) in self.pairs {
            *seen.entry(band).or_insert(0) += 1;
        }
        for band in CENSUS_BANDS.iter() {
            match seen.remove(band) {
                Some(1) => {}
                Some(n) => {
                    return Err(Error::data(
                        self.name,
                        format!("age band {} mapped {} times", band, n),
                    ))
                }
                None => return Err(Error::data(self.name, format!("age band {} is not mapped", band))),
            }
        }
        if let Some(band) = seen.keys().next() {
            return Err(Error::data(self.name, format!("unknown age band {}", band)));
        }
        Ok(())
    }

    /// Sum census bands into buckets. A missing input band is an error.
    pub fn rebucket(&self, population: &PopulationVector) -> Result<PopulationVector> {
        let mut counts: BTreeMap<Age, Real> = BTreeMap::new();
        for &(band, bucket) in self.pairs {
            let x = population.get(band).ok_or_else(|| {
                Error::data(
                    format!("{} age buckets", self.name),
                    format!("missing age band {}", band),
                )
            })?;
            *counts.entry(bucket).or_insert(0.0) += x;
        }
        Ok(PopulationVector { counts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn sample() -> PopulationVector {
        let mut counts = [0.0; 18];
        for (i, x) in counts.iter_mut().enumerate() {
            *x = 1000.0 + 37.0 * i as Real;
        }
        PopulationVector::from_census(counts)
    }

    #[test]
    fn schemes_partition_census_bands() {
        CDC_BUCKETS.validate().unwrap();
        VERITY_BUCKETS.validate().unwrap();
        assert_eq!(CDC_BUCKETS.buckets(), vec![0, 20, 45, 55, 65, 75, 85]);
        assert_eq!(VERITY_BUCKETS.buckets(), vec![0, 10, 20, 30, 40, 50, 60, 70, 80]);
    }

    #[test]
    fn broken_scheme_is_rejected() {
        let scheme = BucketScheme {
            name: "broken",
            pairs: &[(0, 0), (0, 0)],
        };
        assert!(scheme.validate().unwrap_err().is_data());
    }

    #[test]
    fn rebucketing_preserves_total() {
        let pop = sample();
        for scheme in &[CDC_BUCKETS, VERITY_BUCKETS] {
            let mapped = scheme.rebucket(&pop).unwrap();
            assert_eq!(mapped.bands(), scheme.buckets());
            assert_approx_eq!(mapped.total(), pop.total());
        }
        let cdc = CDC_BUCKETS.rebucket(&pop).unwrap();
        assert_eq!(cdc.get(85), pop.get(85));
        assert_eq!(cdc.get(0).unwrap(), 4000.0 + 37.0 * 6.0);
    }

    #[test]
    fn missing_band_is_an_error() {
        let mut counts = sample().counts;
        counts.remove(&60);
        let err = CDC_BUCKETS.rebucket(&PopulationVector::new(counts)).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn normalization() {
        let pop = sample();
        let frac = pop.normalized().unwrap();
        assert_approx_eq!(frac.total(), 1.0);
        assert!(PopulationVector::from_census([0.0; 18]).normalized().unwrap_err().is_numeric());
        assert!(PopulationVector::from_census([0.0; 18]).validate().is_err());
        assert!(pop.validate().is_ok());
    }

    #[test]
    fn add_and_order() {
        let pop = sample();
        let twice = pop.try_add(&pop).unwrap();
        assert_approx_eq!(twice.total(), 2.0 * pop.total());
        let arr = pop.to_array(&[85, 0]).unwrap();
        assert_eq!(arr.to_vec(), vec![pop.get(85).unwrap(), pop.get(0).unwrap()]);
        assert!(pop.to_array(&[3]).is_err());
    }
}
