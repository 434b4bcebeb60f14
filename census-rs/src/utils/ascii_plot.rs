use crate::prelude::{Real, INF};

/// ASCII plot of a sequence of positive values.
///
/// Draw each point as a column filled with '*'s up to the maximum height.
pub fn render_vbars(values: &[Real], height: usize) -> String {
    let max = values.iter().cloned().fold(-INF, Real::max);
    if values.is_empty() || height == 0 || !(max > 0.0) {
        return String::new();
    }
    let step = max / height as Real;

    let mut out = String::with_capacity((values.len() + 1) * height);
    for i in 0..height {
        let h = (height - i) as Real * step;
        out.extend(values.iter().map(|&x| if x >= h { '*' } else { ' ' }));
        out.push('\n');
    }
    return out;
}

/// ASCII plot of a sequence of positive values horizontally, one labeled row
/// per value.
pub fn render_hbars(labels: &[String], values: &[Real], width: usize) -> String {
    let max = values.iter().cloned().fold(-INF, Real::max);
    if values.is_empty() || width == 0 || !(max > 0.0) {
        return String::new();
    }
    let step = max / width as Real;
    let pad = labels.iter().map(|s| s.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, &x) in labels.iter().zip(values) {
        let n = (x.max(0.0) / step) as usize;
        out.push_str(&format!("{:>pad$} |{}\n", label, "=".repeat(n), pad = pad));
    }
    return out;
}
