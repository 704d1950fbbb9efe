//! Volscope CLI — rolling volatility and correlation for a ticker basket.
//!
//! Commands:
//! - `analyze` — fetch prices, compute risk tables, write both SVG charts
//! - `init-config` — write the default TOML configuration

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;
use volscope_core::data::{
    CircuitBreaker, DataProvider, StdoutProgress, SyntheticProvider, YahooProvider,
};
use volscope_core::{
    run_analysis, AnalysisConfig, AnalysisError, AnalysisReport, CorrelationMatrix, Stage,
    StageObserver,
};

#[derive(Parser)]
#[command(
    name = "volscope",
    about = "Volscope CLI: rolling volatility and return correlation for equity tickers"
)]
struct Cli {
    /// Log debug detail to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices, compute volatility and correlation, write the charts.
    Analyze(AnalyzeArgs),
    /// Write the default configuration as TOML.
    InitConfig {
        /// Destination file.
        #[arg(long, default_value = "volscope.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(clap::Args, Debug, Default)]
struct AnalyzeArgs {
    /// Path to a TOML config file. Built-in defaults otherwise.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tickers, comma separated (e.g. THYAO.IS,GARAN.IS).
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// First day fetched (YYYY-MM-DD, inclusive).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day bound (YYYY-MM-DD, exclusive).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Rolling window in trading days.
    #[arg(long)]
    window: Option<usize>,

    /// Directory for volatility.svg and correlation.svg.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Network timeout per attempt in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Prepended to both chart headings (e.g. "BIST 50").
    #[arg(long)]
    title_prefix: Option<String>,

    /// Use deterministic synthetic prices instead of Yahoo Finance.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Open the terminal viewer after the charts are written.
    #[arg(long, default_value_t = false)]
    view: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Analyze(args) => {
            if let Err(e) = run_analyze(&args) {
                eprintln!("error: [{}] {}", e.stage(), e);
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::InitConfig { path, force } => run_init_config(&path, force),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied on top.
fn build_config(args: &AnalyzeArgs) -> Result<AnalysisConfig, AnalysisError> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(tickers) = &args.tickers {
        config.tickers = tickers.iter().map(|t| t.trim().to_string()).collect();
    }
    if let Some(start) = args.start {
        config.start_date = start;
    }
    if let Some(end) = args.end {
        config.end_date = end;
    }
    if let Some(window) = args.window {
        config.window = window;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        config.fetch.timeout_secs = timeout;
    }
    if let Some(prefix) = &args.title_prefix {
        config.output.title_prefix = Some(prefix.clone());
    }
    if args.view {
        config.output.display = true;
    }

    config.validate()?;
    Ok(config)
}

/// Prints the section headers between stages.
struct ConsoleStages;

impl StageObserver for ConsoleStages {
    fn on_stage(&self, stage: Stage) {
        match stage {
            Stage::RenderVolatility => println!("\n--- Generating Volatility Plot ---"),
            Stage::RenderCorrelation => println!("\n--- Generating Correlation Matrix ---"),
            Stage::Fetch | Stage::Compute => {}
        }
    }
}

fn run_analyze(args: &AnalyzeArgs) -> Result<(), AnalysisError> {
    let config = build_config(args)?;
    debug!(?config, "resolved configuration");

    let provider: Box<dyn DataProvider> = if args.synthetic {
        Box::new(SyntheticProvider::new())
    } else {
        let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
        Box::new(YahooProvider::new(circuit_breaker, &config.fetch)?)
    };

    let report = run_analysis(&config, provider.as_ref(), &StdoutProgress, &ConsoleStages)?;
    print!("{}", report_text(&report));

    if config.output.display {
        if let Err(e) = volscope_tui::run_viewer(&report) {
            // The charts are already on disk; a viewer failure is not a failed run.
            eprintln!("warning: viewer closed with an error: {e}");
        }
    }

    Ok(())
}

/// Console summary printed after both charts are written.
fn report_text(report: &AnalysisReport) -> String {
    let mut out = String::from("Correlation Matrix:\n");
    out.push_str(&format_correlation(&report.correlation));
    out.push_str(&format!("Volatility chart: {}\n", report.volatility_chart.display()));
    out.push_str(&format!("Correlation chart: {}\n", report.correlation_chart.display()));

    out.push_str(&format!(
        "\n{:<12} {:>12} {:>12} {:>12}\n",
        "Ticker", "Latest", "Mean", "Peak"
    ));
    out.push_str(&"-".repeat(51));
    out.push('\n');
    for s in &report.summaries {
        out.push_str(&format!(
            "{:<12} {:>12} {:>12} {:>12}\n",
            s.symbol,
            percent(s.latest.map(|(_, v)| v)),
            percent(s.mean),
            percent(s.peak.map(|(_, v)| v)),
        ));
    }

    if report.synthetic {
        out.push_str("\nNote: prices are synthetic; figures are for demonstration only.\n");
    }

    out.push_str("\nAnalysis Complete.\n");
    if let Some(risk) = report.insight.risk_line() {
        out.push_str(&risk);
        out.push('\n');
    }
    out.push_str(&report.insight.headline());
    out.push('\n');
    out
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

/// Square correlation table with symbols on both axes.
fn format_correlation(matrix: &CorrelationMatrix) -> String {
    let width = matrix
        .symbols()
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(8)
        + 2;

    let mut out = format!("{:<width$}", "");
    for symbol in matrix.symbols() {
        out.push_str(&format!("{symbol:>width$}"));
    }
    out.push('\n');

    for (i, symbol) in matrix.symbols().iter().enumerate() {
        out.push_str(&format!("{symbol:<width$}"));
        for j in 0..matrix.len() {
            let rho = matrix.at(i, j);
            let cell = if rho.is_nan() {
                "nan".to_string()
            } else {
                format!("{rho:.4}")
            };
            out.push_str(&format!("{cell:>width$}"));
        }
        out.push('\n');
    }
    out
}

fn run_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let toml = AnalysisConfig::default().to_toml()?;
    std::fs::write(path, toml)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
