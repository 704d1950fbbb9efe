//! Top-level layout: active panel plus a one-line status bar.

pub mod correlation_panel;
pub mod status_bar;
pub mod volatility_panel;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use volscope_core::AnalysisReport;

use crate::app::{Panel, ViewerState};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, state: &ViewerState, report: &AnalysisReport) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    draw_panel(f, chunks[0], state, report);
    status_bar::render(f, chunks[1], state, report);
}

fn draw_panel(f: &mut Frame, area: Rect, state: &ViewerState, report: &AnalysisReport) {
    let panel = state.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Volatility => volatility_panel::render(f, inner, state, report),
        Panel::Correlation => correlation_panel::render(f, inner, report),
    }
}
