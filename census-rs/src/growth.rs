//! Growth rate, doubling time and transmission rate estimates from cumulative
//! case counts.
//!
//! The transmission rate follows the CHIME approach: instantaneous doubling
//! times are converted to β = 2^(1/Td) - 1 + γ and smoothed over the most
//! recent week.
use crate::{
    error::{Error, Result},
    prelude::Real,
    series::CaseSeries,
    utils::{gradient, linear_fit, TrailingMean},
};
use log::trace;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, f64::consts::LN_2};

/// Number of trailing β estimates averaged by `estimate_beta`.
pub const BETA_WINDOW: usize = 7;

/// Instantaneous doubling times of a positive series.
///
/// The local growth rate is the numerical gradient of ln(y). Points where the
/// doubling time is zero, infinite or NaN (plateaus or undefined growth) are
/// dropped. Series with less than two points have no gradient and return an
/// empty vector; non-positive or non-finite values are a numeric error.
pub fn doubling_time(series: &[Real]) -> Result<Vec<Real>> {
    if let Some(x) = series.iter().find(|x| !(**x > 0.0) || !x.is_finite()) {
        return Err(Error::numeric(
            "doubling time",
            format!("log undefined for value {} in {:?}", x, series),
        ));
    }
    let lny: Vec<Real> = series.iter().map(|x| x.ln()).collect();
    let td = gradient(&lny)
        .into_iter()
        .map(|rate| LN_2 / rate)
        .filter(|td| *td != 0.0 && td.is_finite())
        .collect();
    Ok(td)
}

/// Transmission rate corresponding to the doubling time td.
pub fn beta_from_doubling_time(td: Real, gamma: Real) -> Real {
    (2.0 as Real).powf(1.0 / td) - 1.0 + gamma
}

/// Estimate β from a short window of cumulative cases.
///
/// Averages the last (up to) seven per-point estimates. Fails with a data
/// error if no valid doubling time exists, e.g. for single point or constant
/// series.
pub fn estimate_beta(series: &[Real], gamma: Real) -> Result<Real> {
    if !(gamma >= 0.0) || !gamma.is_finite() {
        return Err(Error::invalid(format!("recovery rate must be finite and >= 0, got {}", gamma)));
    }
    let td = doubling_time(series)?;
    let mut window = TrailingMean::new(BETA_WINDOW)
        .ok_or_else(|| Error::invalid("empty smoothing window"))?;
    window.extend(td.iter().map(|&x| beta_from_doubling_time(x, gamma)));
    trace!(target: "growth", "td={:?}, gamma={}", td, gamma);

    window.mean().ok_or_else(|| {
        Error::data(
            "beta estimate",
            format!("no valid doubling time in case window {:?}", series),
        )
    })
}

/// Mean of all valid instantaneous doubling times of the series.
pub fn mean_doubling_time(series: &[Real]) -> Result<Real> {
    let td = doubling_time(series)?;
    if td.is_empty() {
        return Err(Error::data(
            "doubling time",
            format!("no valid doubling time in case window {:?}", series),
        ));
    }
    Ok(td.iter().sum::<Real>() / td.len() as Real)
}

/// Exponential growth constant B of y ~ A exp(B x), fitted by least squares
/// on ln(y). Zero counts contribute ln(y) = 0. Degenerate fits give zero.
pub fn fit_exponential(xs: &[Real], ys: &[Real]) -> Real {
    let logy: Vec<Real> = ys
        .iter()
        .map(|&y| if y == 0.0 { 0.0 } else { y.ln() })
        .collect();
    match linear_fit(xs, &logy) {
        Some((b, _)) if b.is_finite() => b,
        _ => 0.0,
    }
}

/// Basic reproduction number implied by a growth constant.
pub fn basic_reproduction_number(gamma: Real, growth: Real) -> Real {
    1.0 + growth / gamma
}

/// A region ranked by the exponential growth of its cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRank {
    pub region: String,
    pub heat: Real,
    pub cases: Real,
}

/// Rank regions by their exponential growth constant, fastest first.
pub fn rank_by_growth<'a, I>(regions: I) -> Vec<GrowthRank>
where
    I: IntoIterator<Item = (&'a str, &'a CaseSeries)>,
{
    let mut ranks: Vec<GrowthRank> = regions
        .into_iter()
        .map(|(name, series)| {
            let ys = series.confirmed();
            let xs: Vec<Real> = (1..=ys.len()).map(|x| x as Real).collect();
            GrowthRank {
                region: name.to_string(),
                heat: fit_exponential(&xs, &ys),
                cases: ys.last().cloned().unwrap_or(0.0),
            }
        })
        .collect();
    ranks.sort_by(|a, b| b.heat.partial_cmp(&a.heat).unwrap_or(Ordering::Equal));
    return ranks;
}
