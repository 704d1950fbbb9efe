//! Panel 2 — return correlation grid on the fixed [-1, +1] diverging scale.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use volscope_core::{AnalysisReport, CorrelationMatrix};

use crate::theme;

pub fn render(f: &mut Frame, area: Rect, report: &AnalysisReport) {
    let matrix = &report.correlation;
    if matrix.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("No tickers to correlate.", theme::muted())),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(4)])
        .split(area);

    f.render_widget(grid(matrix), chunks[0]);
    f.render_widget(Paragraph::new(footer(report)), chunks[1]);
}

fn cell_width(matrix: &CorrelationMatrix) -> u16 {
    let longest = matrix.symbols().iter().map(String::len).max().unwrap_or(0);
    (longest.max(5) + 2) as u16
}

/// `{:.2}` annotation, `nan` when undefined.
pub(crate) fn annotation(rho: f64) -> String {
    if rho.is_nan() {
        "nan".to_string()
    } else {
        format!("{rho:.2}")
    }
}

fn grid(matrix: &CorrelationMatrix) -> Table<'static> {
    let width = cell_width(matrix);

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(
                matrix
                    .symbols()
                    .iter()
                    .map(|s| Cell::from(s.clone()).style(theme::accent())),
            )
            .collect::<Vec<_>>(),
    )
    .style(theme::accent().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = matrix
        .symbols()
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            let cells = std::iter::once(Cell::from(symbol.clone()).style(theme::accent())).chain(
                (0..matrix.len()).map(|j| {
                    let rho = matrix.at(i, j);
                    Cell::from(format!("{:^w$}", annotation(rho), w = width as usize))
                        .style(theme::heatmap_cell(rho))
                }),
            );
            Row::new(cells.collect::<Vec<_>>()).height(1)
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::repeat(Constraint::Length(width))
        .take(matrix.len() + 1)
        .collect();

    Table::new(rows, widths).header(header).column_spacing(0)
}

fn footer(report: &AnalysisReport) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Scale: -1 (blue) to +1 (red). Lower correlation means better diversification.",
        theme::muted(),
    ))];
    if let Some((a, b, rho)) = report.correlation.max_pair() {
        lines.push(Line::from(Span::styled(
            format!("Most correlated: {a} vs {b} ({})", annotation(rho)),
            theme::muted(),
        )));
    }
    if let Some(risk) = report.insight.risk_line() {
        lines.push(Line::from(Span::styled(risk, theme::warning())));
    }
    lines.push(Line::from(Span::styled(report.insight.headline(), theme::accent())));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_use_two_decimals() {
        assert_eq!(annotation(0.456), "0.46");
        assert_eq!(annotation(-1.0), "-1.00");
        assert_eq!(annotation(f64::NAN), "nan");
    }

    #[test]
    fn cells_fit_the_longest_symbol() {
        let report = crate::test_helpers::sample_report(&["THYAO.IS", "A"]);
        assert_eq!(cell_width(&report.correlation), 10);
    }
}
