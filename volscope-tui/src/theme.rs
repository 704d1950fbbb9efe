//! Colour tokens and style helpers for the viewer.
//!
//! Series colours follow the same categorical cycle as the SVG charts, so a
//! ticker has one colour everywhere. Heatmap cells reuse the core's
//! diverging scale.

use ratatui::style::{Color, Modifier, Style};
use volscope_core::render::diverging_rgb;

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const MUTED: Color = Color::Rgb(120, 130, 150);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const TEXT: Color = Color::White;
/// Cell background for an undefined coefficient.
pub const MISSING: Color = Color::Rgb(60, 60, 60);

const SERIES: [Color; 10] = [
    Color::Rgb(31, 119, 180),
    Color::Rgb(255, 127, 14),
    Color::Rgb(44, 160, 44),
    Color::Rgb(214, 39, 40),
    Color::Rgb(148, 103, 189),
    Color::Rgb(140, 86, 75),
    Color::Rgb(227, 119, 194),
    Color::Rgb(127, 127, 127),
    Color::Rgb(188, 189, 34),
    Color::Rgb(23, 190, 207),
];

pub fn series_color(index: usize) -> Color {
    SERIES[index % SERIES.len()]
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent().add_modifier(Modifier::BOLD)
    } else {
        muted()
    }
}

/// Line style for a series; the highlighted one is bold.
pub fn series_style(index: usize, highlighted: bool) -> Style {
    let style = Style::default().fg(series_color(index));
    if highlighted {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

/// Background for a correlation cell.
pub fn heatmap_color(rho: f64) -> Color {
    if rho.is_nan() {
        return MISSING;
    }
    let (r, g, b) = diverging_rgb(rho);
    Color::Rgb(r, g, b)
}

/// Annotation style readable on top of [`heatmap_color`].
pub fn heatmap_cell(rho: f64) -> Style {
    let fg = if rho.is_nan() || rho.abs() > 0.5 {
        Color::White
    } else {
        Color::Black
    };
    Style::default().bg(heatmap_color(rho)).fg(fg)
}
