//! Chart rendering to standalone SVG files.
//!
//! Charts are written to disk rather than shown in a window, so a run never
//! blocks on a viewer. The terminal viewer in `volscope-tui` covers the
//! interactive case.

mod heatmap;
mod line_chart;
mod svg;

pub use heatmap::diverging_rgb;

use crate::risk::correlation_matrix;
use crate::table::{CorrelationMatrix, ReturnTable, VolatilityTable};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const VOLATILITY_FILE: &str = "volatility.svg";
pub const CORRELATION_FILE: &str = "correlation.svg";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to plot: {what} table is empty")]
    EmptyTable { what: &'static str },

    #[error("nothing to plot: every {what} value is undefined")]
    NoDefinedValues { what: &'static str },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub output_dir: PathBuf,
    /// Prepended to chart titles, e.g. a market or universe name.
    pub title_prefix: Option<String>,
}

impl RenderOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            title_prefix: None,
        }
    }
}

/// Draw one line per ticker on a shared date axis; returns the file written.
pub fn render_volatility(
    vol: &VolatilityTable,
    options: &RenderOptions,
) -> Result<PathBuf, RenderError> {
    if vol.is_empty() {
        return Err(RenderError::EmptyTable { what: "volatility" });
    }
    if vol.is_all_missing() {
        return Err(RenderError::NoDefinedValues { what: "volatility" });
    }

    let doc = line_chart::volatility_svg(vol, options.title_prefix.as_deref());
    write_chart(&options.output_dir, VOLATILITY_FILE, &doc)
}

/// Correlate the return columns and draw the annotated heatmap.
///
/// Returns the matrix alongside the file written so the caller can report on it.
pub fn render_correlation(
    returns: &ReturnTable,
    options: &RenderOptions,
) -> Result<(CorrelationMatrix, PathBuf), RenderError> {
    if returns.is_empty() {
        return Err(RenderError::EmptyTable { what: "return" });
    }
    if returns.is_all_missing() {
        return Err(RenderError::NoDefinedValues { what: "return" });
    }

    // Flat columns or no overlapping history leave every coefficient undefined.
    let matrix = correlation_matrix(returns);
    if matrix.is_all_missing() {
        return Err(RenderError::NoDefinedValues { what: "correlation" });
    }

    let doc = heatmap::correlation_svg(&matrix, options.title_prefix.as_deref());
    let path = write_chart(&options.output_dir, CORRELATION_FILE, &doc)?;
    Ok((matrix, path))
}

fn write_chart(dir: &Path, file: &str, doc: &str) -> Result<PathBuf, RenderError> {
    std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(file);
    std::fs::write(&path, doc).map_err(|source| RenderError::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), bytes = doc.len(), "chart written");
    Ok(path)
}
