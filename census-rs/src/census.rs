//! Conversion of incidence into admissions, occupied beds and deaths.
//!
//! The bed census of a category is the number of admissions of the last LOS
//! days. It is computed as the difference of the cumulative admissions and
//! the same cumulative sum shifted by LOS days.
use crate::{
    clinical::{CategoryRates, LosMap},
    error::{Error, Result},
    prelude::Real,
    utils::{cumsum, gradient, round_even},
};
use getset::CopyGetters;
use std::collections::BTreeMap;

/// Per category daily series (admissions, census, deaths).
pub type CategorySeries = BTreeMap<String, Vec<Real>>;

/// Streaming bed census for a fixed length of stay.
///
/// Keeps the cumulative admissions so that each new day costs O(1).
#[derive(Debug, Clone, PartialEq, Default, CopyGetters)]
pub struct CensusAccumulator {
    #[getset(get_copy = "pub")]
    los: usize,
    cumulative: Vec<Real>,
}

impl CensusAccumulator {
    pub fn new(los: usize) -> Self {
        CensusAccumulator {
            los,
            cumulative: vec![],
        }
    }

    /// Register the admissions of a new day and return its census.
    pub fn push(&mut self, admissions: Real) -> Real {
        let total = self.cumulative.last().cloned().unwrap_or(0.0) + admissions;
        self.cumulative.push(total);
        let t = self.cumulative.len() - 1;
        let shifted = if t >= self.los {
            self.cumulative[t - self.los]
        } else {
            0.0
        };
        total - shifted
    }

    /// Number of days registered so far.
    pub fn days(&self) -> usize {
        self.cumulative.len()
    }
}

/// Daily admissions: round(rate * incidence) with ties to even.
pub fn admissions(incidence: &[Real], rate: Real) -> Vec<Real> {
    incidence.iter().map(|x| round_even(rate * x)).collect()
}

/// Census of occupied beds from daily admissions and length of stay.
///
/// census[t] = cumsum[t] - cumsum[t - los], with the shifted term equal to
/// zero for t < los. A length of stay of 1 reproduces the admissions.
pub fn census(admissions: &[Real], los: usize) -> Vec<Real> {
    let acc = cumsum(admissions);
    (0..acc.len())
        .map(|t| if t >= los { acc[t] - acc[t - los] } else { acc[t] })
        .collect()
}

/// Admissions of each category for the given incidence.
pub fn admissions_by_category(incidence: &[Real], rates: &CategoryRates) -> CategorySeries {
    rates
        .iter()
        .map(|(category, &rate)| (category.clone(), admissions(incidence, rate)))
        .collect()
}

/// Census of each category with a length of stay. Every category of the
/// length of stay map must have an admission rate.
pub fn census_by_category(incidence: &[Real], rates: &CategoryRates, los: &LosMap) -> Result<CategorySeries> {
    los.iter()
        .map(|(category, &days)| -> Result<(String, Vec<Real>)> {
            let rate = rates.get(category).ok_or_else(|| {
                Error::data("census", format!("no admission rate for category {:?}", category))
            })?;
            Ok((category.clone(), census(&admissions(incidence, *rate), days)))
        })
        .collect()
}

/// Cumulative deaths of each category, round(rate * removed).
pub fn deaths_by_category(removed: &[Real], rates: &CategoryRates) -> CategorySeries {
    rates
        .iter()
        .map(|(category, &rate)| (category.clone(), admissions(removed, rate)))
        .collect()
}

/// Daily deaths, the rounded gradient of cumulative deaths.
pub fn deaths_per_day(deaths: &CategorySeries) -> CategorySeries {
    deaths
        .iter()
        .map(|(category, series)| {
            let daily = if series.len() < 2 {
                vec![0.0; series.len()]
            } else {
                gradient(series).into_iter().map(round_even).collect()
            };
            (category.clone(), daily)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(pairs: &[(&str, Real)]) -> CategoryRates {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn admissions_are_rounded_to_even() {
        assert_eq!(admissions(&[25.0, 35.0, 44.0], 0.1), vec![2.0, 4.0, 4.0]);
    }

    #[test]
    fn census_with_unit_los_is_admissions() {
        let adm = vec![3.0, 0.0, 5.0, 2.0, 7.0];
        assert_eq!(census(&adm, 1), adm);
    }

    #[test]
    fn census_is_window_sum() {
        let adm = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = census(&adm, 3);
        assert_eq!(out, vec![1.0, 3.0, 6.0, 9.0, 12.0, 15.0]);
        let mut acc = CensusAccumulator::new(3);
        let streamed: Vec<Real> = adm.iter().map(|&x| acc.push(x)).collect();
        assert_eq!(streamed, out);
        for t in 0..adm.len() {
            let lo = (t + 1).saturating_sub(3);
            assert_eq!(out[t], adm[lo..=t].iter().sum::<Real>());
        }
        assert_eq!(census(&adm, 0), vec![0.0; 6]);
    }

    #[test]
    fn accumulator_streams() {
        let mut acc = CensusAccumulator::new(2);
        assert_eq!(acc.push(4.0), 4.0);
        assert_eq!(acc.push(1.0), 5.0);
        assert_eq!(acc.push(2.0), 3.0);
        assert_eq!(acc.days(), 3);
        assert_eq!(acc.los(), 2);
    }

    #[test]
    fn census_by_category_needs_rates() {
        let incidence = vec![100.0, 200.0, 300.0];
        let r = rates(&[("Hospitalized", 0.1), ("ICU", 0.01)]);
        let los: LosMap = vec![("Hospitalized".to_string(), 2), ("ICU".to_string(), 5)]
            .into_iter()
            .collect();
        let out = census_by_category(&incidence, &r, &los).unwrap();
        assert_eq!(out["Hospitalized"], vec![10.0, 30.0, 50.0]);
        assert_eq!(out["ICU"], vec![1.0, 3.0, 6.0]);

        let adm = admissions_by_category(&incidence, &r);
        assert_eq!(adm["ICU"], vec![1.0, 2.0, 3.0]);

        let los: LosMap = vec![("Ventilator".to_string(), 2)].into_iter().collect();
        assert!(census_by_category(&incidence, &r, &los).unwrap_err().is_data());
    }

    #[test]
    fn deaths_follow_removed() {
        let removed = vec![0.0, 100.0, 300.0, 600.0];
        let deaths = deaths_by_category(&removed, &rates(&[("Deaths", 0.01)]));
        assert_eq!(deaths["Deaths"], vec![0.0, 1.0, 3.0, 6.0]);
        let daily = deaths_per_day(&deaths);
        assert_eq!(daily["Deaths"], vec![1.0, 2.0, 2.0, 3.0]);
    }
}
