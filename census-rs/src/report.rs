//! Text renderings of a projection: CSV tables and ASCII plots.
use crate::{
    error::{Error, Result},
    projection::Projection,
    utils::{render_hbars, render_vbars},
};
use std::io::Write;

/// Header of the CSV rendering. Category columns are prefixed by the series
/// they belong to, e.g. "census:ICU".
pub fn csv_header(projection: &Projection) -> Vec<String> {
    let mut head: Vec<String> = ["day", "susceptible", "infected", "removed", "new_infections"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for (prefix, series) in &[
        ("admissions", projection.admissions()),
        ("census", projection.census()),
        ("deaths", projection.deaths()),
    ] {
        head.extend(series.keys().map(|k| format!("{}:{}", prefix, k)));
    }
    return head;
}

/// Write one row per simulated day.
pub fn write_csv<W: Write>(projection: &Projection, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(csv_header(projection))?;

    for (t, point) in projection.trajectory().points().enumerate() {
        let mut row = vec![
            t.to_string(),
            format!("{:.2}", point.susceptible),
            format!("{:.2}", point.infected),
            format!("{:.2}", point.removed),
            format!("{:.2}", point.new_infections),
        ];
        for series in &[projection.admissions(), projection.census(), projection.deaths()] {
            row.extend(series.values().map(|s| s.get(t).map(|x| x.to_string()).unwrap_or_default()));
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render projection as CSV data.
pub fn render_csv(projection: &Projection) -> Result<String> {
    let mut buf: Vec<u8> = vec![];
    write_csv(projection, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::data("csv report", e.to_string()))
}

/// Infected curve as vertical bars, one column per day, followed by the peak
/// census of each category.
pub fn render_plot(projection: &Projection, height: usize) -> String {
    let mut out = render_vbars(projection.trajectory().infected(), height);
    let peaks = projection.peak_census();
    if !peaks.is_empty() {
        let labels: Vec<String> = peaks
            .iter()
            .map(|(category, day, _)| format!("{} (day {})", category, day))
            .collect();
        let values: Vec<_> = peaks.iter().map(|(_, _, x)| *x).collect();
        out.push('\n');
        out.push_str(&render_hbars(&labels, &values, 40));
    }
    return out;
}
