//! Annotated correlation heatmap on a fixed [-1, +1] diverging scale.

use super::svg::{escape, svg_footer, svg_header, title};
use crate::table::CorrelationMatrix;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 640;
const LEFT: f64 = 110.0;
const TOP: f64 = 60.0;
const BOTTOM: f64 = 90.0;
const BAR_WIDTH: f64 = 18.0;
const BAR_GAP: f64 = 40.0;

pub(crate) const CORRELATION_TITLE: &str = "Correlation Matrix (Diversification Analysis)";

/// Cool/warm diverging colour for a coefficient: blue at -1, near-white
/// at 0, red at +1. Values outside [-1, 1] are clamped.
pub fn diverging_rgb(value: f64) -> (u8, u8, u8) {
    const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let v = value.clamp(-1.0, 1.0);
    let (from, to, t) = if v < 0.0 { (MID, COOL, -v) } else { (MID, WARM, v) };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    (lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// SVG document for a non-empty correlation matrix.
pub(crate) fn correlation_svg(matrix: &CorrelationMatrix, title_prefix: Option<&str>) -> String {
    let width = WIDTH as f64;
    let height = HEIGHT as f64;
    let n = matrix.len();
    let grid = (width - LEFT - BAR_GAP - BAR_WIDTH - 60.0).min(height - TOP - BOTTOM);
    let cell = grid / n as f64;

    let mut svg = svg_header(WIDTH, HEIGHT);

    for row in 0..n {
        for col in 0..n {
            let value = matrix.at(row, col);
            let x = LEFT + col as f64 * cell;
            let y = TOP + row as f64 * cell;

            let (fill, label, text_color) = if value.is_nan() {
                ("#f5f5f5".to_string(), "nan".to_string(), "#808080")
            } else {
                let (r, g, b) = diverging_rgb(value);
                let text_color = if value.abs() > 0.6 { "#ffffff" } else { "#262626" };
                (format!("rgb({r},{g},{b})"), format!("{value:.2}"), text_color)
            };

            svg.push_str(&format!(
                r##"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{w:.2}" fill="{fill}" stroke="#ffffff" stroke-width="0.5" />"##,
                w = cell
            ));
            svg.push_str(&format!(
                r##"<text x="{tx:.2}" y="{ty:.2}" text-anchor="middle" font-size="13" fill="{text_color}">{label}</text>"##,
                tx = x + cell / 2.0,
                ty = y + cell / 2.0 + 4.0
            ));
        }
    }

    for (i, symbol) in matrix.symbols().iter().enumerate() {
        let center = i as f64 * cell + cell / 2.0;
        svg.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{label}</text>"##,
            x = LEFT - 8.0,
            y = TOP + center + 4.0,
            label = escape(symbol)
        ));
        svg.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="end" transform="rotate(-45 {x:.2} {y:.2})">{label}</text>"##,
            x = LEFT + center,
            y = TOP + grid + 16.0,
            label = escape(symbol)
        ));
    }

    colour_bar(&mut svg, LEFT + grid + BAR_GAP, grid);

    let heading = match title_prefix {
        Some(prefix) => format!("{prefix} - {CORRELATION_TITLE}"),
        None => CORRELATION_TITLE.to_string(),
    };
    title(&mut svg, &heading, width);

    svg.push_str(svg_footer());
    svg
}

/// Vertical colour bar from +1 (top) to -1 (bottom).
fn colour_bar(svg: &mut String, x: f64, grid: f64) {
    const STEPS: usize = 40;
    let step_h = grid / STEPS as f64;
    for k in 0..STEPS {
        let value = 1.0 - 2.0 * (k as f64 + 0.5) / STEPS as f64;
        let (r, g, b) = diverging_rgb(value);
        svg.push_str(&format!(
            r##"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="rgb({r},{g},{b})" />"##,
            y = TOP + k as f64 * step_h,
            w = BAR_WIDTH,
            h = step_h + 0.5
        ));
    }
    for tick in [1.0, 0.5, 0.0, -0.5, -1.0_f64] {
        let y = TOP + (1.0 - tick) / 2.0 * grid;
        svg.push_str(&format!(
            r##"<text x="{tx:.2}" y="{ty:.2}" text-anchor="start">{tick:.1}</text>"##,
            tx = x + BAR_WIDTH + 6.0,
            ty = y + 4.0
        ));
    }
}
