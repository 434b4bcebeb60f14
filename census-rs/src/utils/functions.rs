use crate::prelude::Real;

/// Numerical gradient of a sequence sampled at unit spacing.
///
/// Uses central differences in the interior and one-sided first differences
/// at both boundaries. Sequences with less than two points have no gradient
/// and produce an empty vector.
pub fn gradient(ys: &[Real]) -> Vec<Real> {
    let n = ys.len();
    if n < 2 {
        return vec![];
    }
    let mut out = Vec::with_capacity(n);
    out.push(ys[1] - ys[0]);
    for i in 1..n - 1 {
        out.push((ys[i + 1] - ys[i - 1]) / 2.0);
    }
    out.push(ys[n - 1] - ys[n - 2]);
    return out;
}

/// Running sum of a sequence.
pub fn cumsum(xs: &[Real]) -> Vec<Real> {
    let mut acc = 0.0;
    xs.iter()
        .map(|x| {
            acc += x;
            acc
        })
        .collect()
}

/// Round to the nearest integer, resolving ties to the even neighbour.
pub fn round_even(x: Real) -> Real {
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        x.round()
    }
}

/// Fill NaN entries of a sequence in place.
///
/// Gaps between two known values are interpolated linearly by position,
/// trailing gaps repeat the last known value and leading gaps are set to
/// zero.
pub fn interpolate_linear(values: &mut [Real]) {
    let mut last: Option<usize> = None;
    for i in 0..values.len() {
        if values[i].is_nan() {
            continue;
        }
        match last {
            Some(j) if i > j + 1 => {
                let (a, b) = (values[j], values[i]);
                let span = (i - j) as Real;
                for k in j + 1..i {
                    values[k] = a + (b - a) * (k - j) as Real / span;
                }
            }
            None => {
                for v in values[..i].iter_mut() {
                    *v = 0.0;
                }
            }
            _ => {}
        }
        last = Some(i);
    }
    match last {
        Some(j) => {
            let fill = values[j];
            for v in values[j + 1..].iter_mut() {
                *v = fill;
            }
        }
        None => {
            for v in values.iter_mut() {
                *v = 0.0;
            }
        }
    }
}

/// Least squares fit of a straight line y = a * x + b. Return the pair (a, b)
/// or None if the problem is degenerate (less than two points or all x equal).
pub fn linear_fit(xs: &[Real], ys: &[Real]) -> Option<(Real, Real)> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let m = n as Real;
    let mx = xs[..n].iter().sum::<Real>() / m;
    let my = ys[..n].iter().sum::<Real>() / m;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
    }
    if sxx == 0.0 || !sxy.is_finite() {
        return None;
    }
    let a = sxy / sxx;
    Some((a, my - a * mx))
}
