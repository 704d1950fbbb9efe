//! Shared SVG building blocks: canvas, scales, axes, legend.

use chrono::{Datelike, NaiveDate};

pub(crate) const PADDING: f64 = 56.0;

/// Matplotlib's default cycle, so charts read like the usual research plots.
pub(crate) const SERIES_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub(crate) fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

pub(crate) fn svg_header(width: u32, height: u32) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:11px;fill:#333}}</style><rect width="100%" height="100%" fill="#ffffff" />"##,
        w = width,
        h = height
    )
}

pub(crate) fn svg_footer() -> &'static str {
    "</svg>"
}

/// Escape text content for inclusion in SVG.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn title(svg: &mut String, text: &str, width: f64) {
    svg.push_str(&format!(
        r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="15" fill="#111">{text}</text>"##,
        x = width / 2.0,
        y = PADDING / 2.0,
        text = escape(text)
    ));
}

/// Min/max over finite values, widened when flat. None if nothing is finite.
pub(crate) fn extent<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
    }

    if !min_v.is_finite() || !max_v.is_finite() {
        return None;
    }

    if min_v == max_v {
        let adjust = if min_v == 0.0 { 1.0 } else { min_v.abs() * 0.1 };
        min_v -= adjust;
        max_v += adjust;
    }

    Some((min_v, max_v))
}

/// Map a value onto the vertical pixel range inside the padding.
pub(crate) fn scale_value(value: f64, min_v: f64, max_v: f64, height: f64) -> f64 {
    let inner_height = height - 2.0 * PADDING;
    let norm = (value - min_v) / (max_v - min_v);
    PADDING + (1.0 - norm) * inner_height
}

/// Evenly spaced x coordinates for `len` rows.
pub(crate) fn x_positions(len: usize, width: f64) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![width / 2.0],
        _ => {
            let inner_width = width - 2.0 * PADDING;
            (0..len)
                .map(|i| PADDING + inner_width * (i as f64 / (len - 1) as f64))
                .collect()
        }
    }
}

/// Horizontal grid lines with value labels on the left.
pub(crate) fn value_axis(
    svg: &mut String,
    min_v: f64,
    max_v: f64,
    width: f64,
    height: f64,
    ticks: usize,
    format: impl Fn(f64) -> String,
) {
    for k in 0..=ticks {
        let value = min_v + (max_v - min_v) * k as f64 / ticks as f64;
        let y = scale_value(value, min_v, max_v, height);
        svg.push_str(&format!(
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#000000" stroke-opacity="0.3" stroke-width="0.5" />"##,
            x1 = PADDING,
            x2 = width - PADDING,
            y = y
        ));
        svg.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{label}</text>"##,
            x = PADDING - 6.0,
            y = y + 4.0,
            label = escape(&format(value))
        ));
    }
}

/// Bottom date axis with one tick per month.
pub(crate) fn time_axis(svg: &mut String, dates: &[NaiveDate], xs: &[f64], width: f64, height: f64) {
    if dates.is_empty() || xs.is_empty() {
        return;
    }

    let axis_y = height - PADDING;
    svg.push_str(&format!(
        r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#000" stroke-width="1" />"##,
        x1 = PADDING,
        x2 = width - PADDING,
        y = axis_y
    ));

    let mut last_month: Option<(i32, u32)> = None;
    for (date, &x) in dates.iter().zip(xs) {
        let key = (date.year(), date.month());
        if last_month == Some(key) {
            continue;
        }
        last_month = Some(key);

        svg.push_str(&format!(
            r##"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="#000000" stroke-opacity="0.3" stroke-width="0.5" />"##,
            x = x,
            y1 = PADDING,
            y2 = axis_y
        ));
        svg.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"##,
            x = x,
            y = axis_y + 16.0,
            label = date.format("%Y-%m")
        ));
    }
}

pub(crate) fn axis_labels(svg: &mut String, x_label: &str, y_label: &str, width: f64, height: f64) {
    svg.push_str(&format!(
        r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="13">{label}</text>"##,
        x = width / 2.0,
        y = height - PADDING / 4.0,
        label = escape(x_label)
    ));
    svg.push_str(&format!(
        r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="13" transform="rotate(-90 {x:.2} {y:.2})">{label}</text>"##,
        x = PADDING / 4.0,
        y = height / 2.0,
        label = escape(y_label)
    ));
}

/// Legend box anchored in the upper-left of the plot area.
pub(crate) fn legend(svg: &mut String, entries: &[(&str, &str)]) {
    if entries.is_empty() {
        return;
    }

    let x = PADDING + 10.0;
    let top = PADDING + 8.0;
    let longest = entries.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    svg.push_str(&format!(
        r##"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="#ffffff" fill-opacity="0.8" stroke="#cccccc" />"##,
        x = x,
        y = top,
        w = 40.0 + longest as f64 * 7.0,
        h = 8.0 + entries.len() as f64 * 16.0
    ));

    let mut y = top + 16.0;
    for (label, color) in entries {
        svg.push_str(&format!(
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="2" />"##,
            x1 = x + 6.0,
            x2 = x + 26.0,
            y = y - 4.0,
            color = color
        ));
        svg.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="start">{label}</text>"##,
            x = x + 32.0,
            y = y,
            label = escape(label)
        ));
        y += 16.0;
    }
}
