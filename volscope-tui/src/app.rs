//! Viewer state — which panel is showing and which ticker is highlighted.

use volscope_core::AnalysisReport;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Volatility,
    Correlation,
}

impl Panel {
    pub const COUNT: usize = 2;

    pub fn index(self) -> usize {
        match self {
            Panel::Volatility => 0,
            Panel::Correlation => 1,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Volatility),
            1 => Some(Panel::Correlation),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Volatility => "Volatility",
            Panel::Correlation => "Correlation",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(self)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or(self)
    }
}

#[derive(Debug, Clone)]
pub struct ViewerState {
    pub active_panel: Panel,
    /// Highlighted ticker, as a column index into the volatility table.
    pub selected: usize,
    pub ticker_count: usize,
    pub running: bool,
}

impl ViewerState {
    pub fn new(ticker_count: usize) -> Self {
        Self {
            active_panel: Panel::Volatility,
            selected: 0,
            ticker_count,
            running: true,
        }
    }

    pub fn select_next(&mut self) {
        if self.ticker_count > 0 {
            self.selected = (self.selected + 1) % self.ticker_count;
        }
    }

    pub fn select_prev(&mut self) {
        if self.ticker_count > 0 {
            self.selected = (self.selected + self.ticker_count - 1) % self.ticker_count;
        }
    }

    pub fn selected_symbol<'a>(&self, report: &'a AnalysisReport) -> Option<&'a str> {
        report
            .volatility
            .symbols()
            .get(self.selected)
            .map(String::as_str)
    }
}
