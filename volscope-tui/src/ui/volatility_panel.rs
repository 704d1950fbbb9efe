//! Panel 1 — annualized rolling volatility, one Braille line per ticker.

use ratatui::layout::Rect;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use volscope_core::{AnalysisReport, VolatilityTable};

use crate::app::ViewerState;
use crate::theme;

const MIN_WIDTH: u16 = 20;
const MIN_HEIGHT: u16 = 6;

pub fn render(f: &mut Frame, area: Rect, state: &ViewerState, report: &AnalysisReport) {
    let vol = &report.volatility;
    match y_extent(vol) {
        Some(extent) if area.width >= MIN_WIDTH && area.height >= MIN_HEIGHT => {
            render_chart(f, area, state, vol, extent)
        }
        Some(_) => render_message(f, area, "Terminal too small for the chart."),
        None => render_message(f, area, "No volatility values: the window is longer than the history."),
    }
}

fn render_message(f: &mut Frame, area: Rect, message: &str) {
    let lines = vec![Line::from(""), Line::from(Span::styled(message, theme::muted()))];
    f.render_widget(Paragraph::new(lines), area);
}

/// Min and max over every defined value, or `None` when nothing is defined.
fn y_extent(vol: &VolatilityTable) -> Option<(f64, f64)> {
    vol.iter_columns()
        .flat_map(|(_, col)| col.iter().copied())
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Runs of consecutive defined points, as (row index, value).
fn segments(col: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (i, &v) in col.iter().enumerate() {
        if v.is_finite() {
            current.push((i as f64, v));
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn render_chart(
    f: &mut Frame,
    area: Rect,
    state: &ViewerState,
    vol: &VolatilityTable,
    (min_y, max_y): (f64, f64),
) {
    let padding = ((max_y - min_y).abs() * 0.05).max(0.01);
    let y_min = (min_y - padding).max(0.0);
    let y_max = max_y + padding;
    let x_max = vol.row_count().saturating_sub(1) as f64;

    // Datasets borrow their points, so collect every series first.
    let series: Vec<(usize, &str, Vec<Vec<(f64, f64)>>)> = vol
        .iter_columns()
        .enumerate()
        .map(|(i, (symbol, col))| (i, symbol, segments(col)))
        .collect();

    // Highlighted ticker last, so it draws on top.
    let mut order: Vec<usize> = (0..series.len()).filter(|&i| i != state.selected).collect();
    if state.selected < series.len() {
        order.push(state.selected);
    }

    let mut datasets = Vec::new();
    for i in order {
        let (index, symbol, runs) = &series[i];
        let highlighted = *index == state.selected;
        for (k, run) in runs.iter().enumerate() {
            let mut dataset = Dataset::default()
                .marker(symbols::Marker::Braille)
                .style(theme::series_style(*index, highlighted))
                .graph_type(GraphType::Line)
                .data(run);
            // One legend entry per ticker.
            if k == 0 {
                dataset = dataset.name(symbol.to_string());
            }
            datasets.push(dataset);
        }
    }

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(Span::styled("Date", theme::muted()))
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(date_labels(vol)),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Annualized Volatility", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(percent(y_min), theme::muted()),
                    Span::styled(percent((y_min + y_max) / 2.0), theme::muted()),
                    Span::styled(percent(y_max), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

fn percent(v: f64) -> String {
    format!("{:.0}%", v * 100.0)
}

/// First, middle and last date.
fn date_labels(vol: &VolatilityTable) -> Vec<Span<'static>> {
    let dates = vol.dates();
    if dates.is_empty() {
        return Vec::new();
    }
    [0, dates.len() / 2, dates.len() - 1]
        .iter()
        .map(|&i| Span::styled(dates[i].format("%Y-%m-%d").to_string(), theme::muted()))
        .collect()
}
