//! Multi-ticker volatility line chart.

use super::svg::{
    axis_labels, extent, legend, scale_value, series_color, svg_footer, svg_header, time_axis,
    title, value_axis, x_positions,
};
use crate::table::VolatilityTable;

const WIDTH: u32 = 1120;
const HEIGHT: u32 = 560;

pub(crate) const VOLATILITY_TITLE: &str = "Annualized Rolling Volatility";

/// One `<polyline>` per contiguous run of defined cells.
fn segments(xs: &[f64], values: &[f64], min_v: f64, max_v: f64, height: f64) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for (&x, &v) in xs.iter().zip(values) {
        if v.is_finite() {
            current.push(format!("{x:.2},{:.2}", scale_value(v, min_v, max_v, height)));
        } else if !current.is_empty() {
            out.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}

/// SVG document for the volatility table. Caller guarantees at least one
/// defined cell.
pub(crate) fn volatility_svg(vol: &VolatilityTable, title_prefix: Option<&str>) -> String {
    let width = WIDTH as f64;
    let height = HEIGHT as f64;
    let xs = x_positions(vol.row_count(), width);

    let (min_v, max_v) = extent(vol.iter_columns().flat_map(|(_, col)| col.iter()))
        .map(|(lo, hi)| (lo.min(0.0), hi))
        .unwrap_or((0.0, 1.0));

    let mut svg = svg_header(WIDTH, HEIGHT);
    value_axis(&mut svg, min_v, max_v, width, height, 5, |v| format!("{v:.2}"));
    time_axis(&mut svg, vol.dates(), &xs, width, height);

    let mut entries = Vec::new();
    for (i, (symbol, col)) in vol.iter_columns().enumerate() {
        let color = series_color(i);
        for points in segments(&xs, col, min_v, max_v, height) {
            svg.push_str(&format!(
                r##"<polyline fill="none" stroke="{color}" stroke-width="2" points="{points}" />"##
            ));
        }
        entries.push((symbol, color));
    }

    legend(&mut svg, &entries);

    let heading = match title_prefix {
        Some(prefix) => format!("{prefix} - {VOLATILITY_TITLE} (Risk Analysis)"),
        None => format!("{VOLATILITY_TITLE} (Risk Analysis)"),
    };
    title(&mut svg, &heading, width);
    axis_labels(&mut svg, "Date", "Volatility (Annualized)", width, height);

    svg.push_str(svg_footer());
    svg
}
