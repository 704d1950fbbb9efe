//! Volscope TUI — terminal viewer for a finished analysis run.
//!
//! Panels:
//! 1. Volatility — annualized rolling volatility per ticker
//! 2. Correlation — annotated return correlation grid
//!
//! The viewer only reads an [`AnalysisReport`]; it never fetches or computes.

pub mod app;
pub mod input;
pub mod theme;
pub mod ui;

use std::io::{self, stdout, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::cursor::Show;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use volscope_core::AnalysisReport;

pub use app::{Panel, ViewerState};

#[cfg(test)]
mod test_helpers;

/// Show `report` in the alternate screen until the user quits.
///
/// The terminal is restored on every exit path, including a failed setup
/// and a panic, and the previous panic hook is reinstated afterwards.
pub fn run_viewer(report: &AnalysisReport) -> Result<()> {
    let _hook = PanicHookGuard::install(restore_after_panic);

    let mut guard = TerminalGuard::new(stdout());
    guard.enter()?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut state = ViewerState::new(report.volatility.column_count());
    run_loop(&mut terminal, &mut state, report)
}

fn restore_after_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stderr(), LeaveAlternateScreen, Show);
}

/// Leaves the alternate screen and raw mode on drop, undoing only the
/// steps that succeeded.
struct TerminalGuard<W: Write> {
    out: W,
    raw_mode: bool,
    alternate_screen: bool,
}

impl<W: Write> TerminalGuard<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            raw_mode: false,
            alternate_screen: false,
        }
    }

    fn enter(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        self.raw_mode = true;
        execute!(self.out, EnterAlternateScreen)?;
        self.alternate_screen = true;
        Ok(())
    }

    fn restore(&mut self) {
        if self.alternate_screen {
            let _ = execute!(self.out, LeaveAlternateScreen, Show);
            self.alternate_screen = false;
        }
        if self.raw_mode {
            let _ = disable_raw_mode();
            self.raw_mode = false;
        }
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Chains `restore` in front of the current panic hook; dropping the guard
/// puts the previous hook back.
struct PanicHookGuard {
    reinstate: Option<Box<dyn FnOnce()>>,
}

impl PanicHookGuard {
    fn install(restore: fn()) -> Self {
        let previous = Arc::new(std::panic::take_hook());
        let chained = Arc::clone(&previous);
        std::panic::set_hook(Box::new(move |info| {
            restore();
            chained(info);
        }));

        Self {
            reinstate: Some(Box::new(move || {
                drop(std::panic::take_hook());
                if let Ok(previous) = Arc::try_unwrap(previous) {
                    std::panic::set_hook(previous);
                }
            })),
        }
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        // The hook cannot be swapped while unwinding.
        if std::thread::panicking() {
            return;
        }
        if let Some(reinstate) = self.reinstate.take() {
            reinstate();
        }
    }
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut ViewerState,
    report: &AnalysisReport,
) -> Result<()> {
    while state.running {
        terminal.draw(|f| ui::draw(f, state, report))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(state, key);
            }
        }
    }
    Ok(())
}
