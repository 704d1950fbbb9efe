//! Bottom status bar — key hints and run facts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use volscope_core::AnalysisReport;

use crate::app::ViewerState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, state: &ViewerState, report: &AnalysisReport) {
    let mut spans: Vec<Span> = vec![
        Span::styled(" 1:Volatility 2:Correlation  \u{2190}/\u{2192}:ticker  q:quit", theme::muted()),
        Span::raw(" | "),
        Span::styled(format!("window {}d", report.window), theme::accent()),
    ];

    if let Some(symbol) = state.selected_symbol(report) {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(symbol.to_string(), theme::series_style(state.selected, true)));
    }

    if report.synthetic {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("synthetic data", theme::warning()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
