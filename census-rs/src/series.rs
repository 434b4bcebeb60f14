//! Cumulative case series and the per-region case data collection.
use crate::{
    error::{Error, Result},
    prelude::Real,
    utils::interpolate_linear,
};
use chrono::{Duration, NaiveDate};
use getset::Getters;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, io::Read};

/// Name used for the whole parent region instead of a sub-region.
pub const ALL_SUBREGIONS: &str = "All";

/// First date with continuous reporting in the public data sets.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd(2020, 3, 10)
}

/// One day of cumulative counts. Missing counts are represented by NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub date: NaiveDate,
    pub confirmed: Real,
    pub deaths: Real,
}

impl CaseRecord {
    pub fn new(date: NaiveDate, confirmed: Real, deaths: Real) -> Self {
        CaseRecord {
            date,
            confirmed,
            deaths,
        }
    }
}

/// Date ordered sequence of cumulative confirmed cases and deaths of a region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters)]
pub struct CaseSeries {
    #[getset(get = "pub")]
    records: Vec<CaseRecord>,
}

impl CaseSeries {
    /// Create series from records in any order.
    ///
    /// Records are sorted by date. Duplicate dates, negative or infinite
    /// counts are rejected; NaN marks a missing value to be filled by
    /// `fill_gaps`.
    pub fn new(records: impl IntoIterator<Item = CaseRecord>) -> Result<Self> {
        let mut records: Vec<_> = records.into_iter().collect();
        records.sort_by_key(|r| r.date);

        for pair in records.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(Error::data("case series", format!("duplicate date {}", pair[0].date)));
            }
        }
        for r in &records {
            for &x in &[r.confirmed, r.deaths] {
                if x < 0.0 || x.is_infinite() {
                    return Err(Error::data(
                        "case series",
                        format!("invalid count {} at {}", x, r.date),
                    ));
                }
            }
        }
        Ok(CaseSeries { records })
    }

    /// Create a series of consecutive days starting at `start` with the given
    /// cumulative confirmed counts and no deaths.
    pub fn from_confirmed(start: NaiveDate, confirmed: &[Real]) -> Result<Self> {
        Self::new(
            confirmed
                .iter()
                .enumerate()
                .map(|(i, &c)| CaseRecord::new(start + Duration::days(i as i64), c, 0.0)),
        )
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn confirmed(&self) -> Vec<Real> {
        self.records.iter().map(|r| r.confirmed).collect()
    }

    pub fn deaths(&self) -> Vec<Real> {
        self.records.iter().map(|r| r.deaths).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Last (up to) n confirmed counts.
    pub fn tail(&self, n: usize) -> Vec<Real> {
        let start = self.records.len().saturating_sub(n);
        self.records[start..].iter().map(|r| r.confirmed).collect()
    }

    /// Drop all records before the given date.
    pub fn since(&self, date: NaiveDate) -> CaseSeries {
        CaseSeries {
            records: self.records.iter().filter(|r| r.date >= date).cloned().collect(),
        }
    }

    /// Insert missing calendar days and interpolate missing counts.
    ///
    /// Values between two known days are interpolated linearly, missing values
    /// after the last known day repeat it and missing values before the first
    /// known day are set to zero.
    pub fn fill_gaps(&self) -> CaseSeries {
        let (first, last) = match (self.records.first(), self.records.last()) {
            (Some(a), Some(b)) => (a.date, b.date),
            _ => return self.clone(),
        };
        let n = (last - first).num_days() as usize + 1;
        let mut confirmed = vec![Real::NAN; n];
        let mut deaths = vec![Real::NAN; n];
        for r in &self.records {
            let i = (r.date - first).num_days() as usize;
            confirmed[i] = r.confirmed;
            deaths[i] = r.deaths;
        }
        interpolate_linear(&mut confirmed);
        interpolate_linear(&mut deaths);

        let records = (0..n)
            .map(|i| CaseRecord::new(first + Duration::days(i as i64), confirmed[i], deaths[i]))
            .collect();
        CaseSeries { records }
    }

    /// Sum sub-region series day by day into a parent region series. Days
    /// missing from a sub-region count as zero.
    pub fn aggregate<'a>(series: impl IntoIterator<Item = &'a CaseSeries>) -> CaseSeries {
        let mut acc: BTreeMap<NaiveDate, (Real, Real)> = BTreeMap::new();
        for s in series {
            for r in &s.records {
                let entry = acc.entry(r.date).or_insert((0.0, 0.0));
                if !r.confirmed.is_nan() {
                    entry.0 += r.confirmed;
                }
                if !r.deaths.is_nan() {
                    entry.1 += r.deaths;
                }
            }
        }
        CaseSeries {
            records: acc
                .into_iter()
                .map(|(date, (c, d))| CaseRecord::new(date, c, d))
                .collect(),
        }
    }

    /// True if cumulative counts never decrease.
    pub fn is_monotone(&self) -> bool {
        self.records
            .windows(2)
            .all(|p| p[1].confirmed >= p[0].confirmed && p[1].deaths >= p[0].deaths)
    }

    /// Check the series is gap free, has no missing values and is monotone.
    pub fn validate(&self) -> Result<()> {
        for pair in self.records.windows(2) {
            if pair[1].date - pair[0].date != Duration::days(1) {
                return Err(Error::data(
                    "case series",
                    format!("gap between {} and {}", pair[0].date, pair[1].date),
                ));
            }
        }
        if let Some(r) = self
            .records
            .iter()
            .find(|r| r.confirmed.is_nan() || r.deaths.is_nan())
        {
            return Err(Error::data("case series", format!("missing value at {}", r.date)));
        }
        if !self.is_monotone() {
            return Err(Error::data("case series", "cumulative counts decrease"));
        }
        Ok(())
    }
}

/// Case series handed to a projection: the sub-region being projected and
/// its parent region, used to stabilize the growth estimate. Both are the
/// same series when the whole parent region is projected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionCases {
    pub parent: CaseSeries,
    pub local: CaseSeries,
}

impl RegionCases {
    pub fn new(parent: CaseSeries, local: CaseSeries) -> Self {
        RegionCases { parent, local }
    }

    /// Use the same series for both parent and sub-region.
    pub fn whole(series: CaseSeries) -> Self {
        RegionCases {
            parent: series.clone(),
            local: series,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CaseRow {
    date: NaiveDate,
    state: String,
    county: String,
    confirmed: Option<Real>,
    deaths: Option<Real>,
}

/// Case series of every sub-region (county) grouped by region (state).
#[derive(Debug, Clone, PartialEq, Default, Getters)]
pub struct CaseData {
    #[getset(get = "pub")]
    regions: BTreeMap<String, BTreeMap<String, CaseSeries>>,
}

impl CaseData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the series of a sub-region.
    pub fn insert(&mut self, region: &str, subregion: &str, series: CaseSeries) -> &mut Self {
        self.regions
            .entry(region.to_string())
            .or_default()
            .insert(subregion.to_string(), series);
        return self;
    }

    /// Read `date,state,county,confirmed,deaths` rows.
    ///
    /// Each county series is gap filled, truncated to start at `start` and
    /// must be monotone.
    pub fn from_csv<R: Read>(reader: R, start: NaiveDate) -> Result<Self> {
        let mut rows: BTreeMap<(String, String), Vec<CaseRecord>> = BTreeMap::new();
        let mut reader = csv::Reader::from_reader(reader);
        for res in reader.deserialize() {
            let row: CaseRow = res?;
            rows.entry((row.state, row.county)).or_default().push(CaseRecord::new(
                row.date,
                row.confirmed.unwrap_or(Real::NAN),
                row.deaths.unwrap_or(Real::NAN),
            ));
        }

        let mut data = CaseData::new();
        for ((state, county), records) in rows {
            let series = CaseSeries::new(records)?.fill_gaps().since(start);
            series
                .validate()
                .map_err(|e| Error::data("case data", format!("{}/{}: {}", state, county, e)))?;
            data.insert(&state, &county, series);
        }
        debug!(target: "load", "case data: {} regions", data.regions.len());
        Ok(data)
    }

    /// Series for a sub-region and its parent region. The parent region is the
    /// sum over all of its sub-regions; passing `"All"` as sub-region projects
    /// the parent region itself.
    pub fn region_cases(&self, region: &str, subregion: &str) -> Result<RegionCases> {
        let subregions = self
            .regions
            .get(region)
            .ok_or_else(|| Error::data("case data", format!("unknown region {:?}", region)))?;
        let parent = CaseSeries::aggregate(subregions.values());
        if subregion == ALL_SUBREGIONS {
            return Ok(RegionCases::whole(parent));
        }
        let local = subregions.get(subregion).ok_or_else(|| {
            Error::data(
                "case data",
                format!("unknown sub-region {:?} of {:?}", subregion, region),
            )
        })?;
        Ok(RegionCases::new(parent, local.clone()))
    }
}
