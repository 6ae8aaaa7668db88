//! CandleScreen CLI: screening runs, the refresh loop, and universe management.
//!
//! Commands:
//! - `run`: screen the universe once and print the ordered table
//! - `watch`: re-run the screen on a fixed interval
//! - `universe list|add|remove`: edit a universe TOML file

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use candlescreen_core::data::{
    CircuitBreaker, MarketDataProvider, SyntheticProvider, Universe, UniverseError, YahooProvider,
};
use candlescreen_core::domain::ResultRecord;
use candlescreen_runner::export::{price_cell, save_artifacts, write_csv, write_json};
use candlescreen_runner::{run_screen, ScreenReport, ScreenerConfig};

#[derive(Parser)]
#[command(
    name = "candlescreen",
    about = "CandleScreen: opening-bar moving-average screener for NSE stocks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen the universe once and print the ordered results.
    Run {
        #[command(flatten)]
        screen: ScreenArgs,

        /// Write the ordered results as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the full report as JSON.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Save report.json and results.csv under a dated directory here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Re-run the screen on a fixed interval.
    Watch {
        #[command(flatten)]
        screen: ScreenArgs,

        /// Seconds between runs. Overrides the config file.
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many runs. Runs forever when omitted.
        #[arg(long)]
        iterations: Option<usize>,
    },
    /// Universe file management.
    Universe {
        #[command(subcommand)]
        action: UniverseAction,
    },
}

#[derive(Args)]
struct ScreenArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Screen a past session (YYYY-MM-DD) instead of today's.
    #[arg(long)]
    date: Option<String>,

    /// Comma-separated symbols replacing the configured universe.
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    /// Use generated bars instead of Yahoo Finance.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Seed for --synthetic.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Worker threads (0 = one per core). Overrides the config file.
    #[arg(long)]
    max_parallel: Option<usize>,
}

#[derive(Subcommand)]
enum UniverseAction {
    /// Print the symbols in order.
    List {
        /// Universe file. The built-in NSE list is used when it does not exist.
        #[arg(long, default_value = "universe.toml")]
        file: PathBuf,
    },
    /// Add symbols; the exchange suffix is appended when missing.
    Add {
        #[arg(required = true)]
        symbols: Vec<String>,

        #[arg(long, default_value = "universe.toml")]
        file: PathBuf,
    },
    /// Remove symbols.
    Remove {
        #[arg(required = true)]
        symbols: Vec<String>,

        #[arg(long, default_value = "universe.toml")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            screen,
            csv,
            json,
            output_dir,
        } => run_cmd(&screen, csv, json, output_dir),
        Commands::Watch {
            screen,
            interval,
            iterations,
        } => watch_cmd(&screen, interval, iterations),
        Commands::Universe { action } => match action {
            UniverseAction::List { file } => universe_list(&file),
            UniverseAction::Add { symbols, file } => universe_add(&file, &symbols),
            UniverseAction::Remove { symbols, file } => universe_remove(&file, &symbols),
        },
    }
}

/// Logs go to stderr so stdout carries only the results table.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(args: &ScreenArgs) -> Result<ScreenerConfig> {
    let mut config = match &args.config {
        Some(path) => ScreenerConfig::from_file(path)?,
        None => ScreenerConfig::default(),
    };
    if let Some(date) = &args.date {
        config = config.with_date(date.clone());
    }
    if !args.symbols.is_empty() {
        config.universe = Universe::from_symbols(config.universe.suffix(), args.symbols.iter().cloned());
    }
    if let Some(n) = args.max_parallel {
        config.max_parallel = n;
    }
    config.validate()?;
    Ok(config)
}

fn build_provider(args: &ScreenArgs, config: &ScreenerConfig) -> Result<Box<dyn MarketDataProvider>> {
    let tz = config.tz()?;
    let interval = config.params.source_interval_minutes;
    if args.synthetic {
        warn!("using synthetic data; results are not market data");
        return Ok(Box::new(
            SyntheticProvider::new(tz, args.seed).with_interval_minutes(interval),
        ));
    }
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    Ok(Box::new(
        YahooProvider::new(circuit_breaker, tz)?.with_interval_minutes(interval)?,
    ))
}

fn screen_once(config: &ScreenerConfig, provider: &dyn MarketDataProvider) -> Result<ScreenReport> {
    let today = config.today()?;
    let report = run_screen(config, provider, today, |done, total| {
        eprint!("\rScreening {done}/{total}");
    })?;
    eprintln!();
    Ok(report)
}

fn run_cmd(
    args: &ScreenArgs,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(args)?;
    let provider = build_provider(args, &config)?;
    let report = screen_once(&config, provider.as_ref())?;

    print_report(&report);

    if let Some(path) = csv {
        write_csv(&report, &path)?;
        info!(path = %path.display(), "wrote CSV");
    }
    if let Some(path) = json {
        write_json(&report, &path)?;
        info!(path = %path.display(), "wrote JSON");
    }
    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn watch_cmd(args: &ScreenArgs, interval: Option<u64>, iterations: Option<usize>) -> Result<()> {
    let mut config = load_config(args)?;
    if let Some(secs) = interval {
        if secs == 0 {
            bail!("--interval must be positive");
        }
        config.refresh_interval_secs = secs;
    }
    let provider = build_provider(args, &config)?;
    let pause = Duration::from_secs(config.refresh_interval_secs);

    let mut runs = 0usize;
    loop {
        let report = screen_once(&config, provider.as_ref())?;
        print_report(&report);
        runs += 1;

        if iterations.is_some_and(|max| runs >= max) {
            break;
        }
        info!(next_in_secs = config.refresh_interval_secs, "waiting for next refresh");
        std::thread::sleep(pause);
    }
    Ok(())
}

// ─── Table output ───────────────────────────────────────────────────

fn print_report(report: &ScreenReport) {
    println!();
    println!(
        "Session {} ({}, {}), {} instruments",
        report.target_date, report.mode, report.provider, report.total
    );
    println!(
        "{:<16} {:>10} {:>10} {:>10} {:>10}  {:<18} {:<13} {:<13} {:>8}",
        "Symbol", "1st Open", "1st Close", "2nd Open", "2nd Close", "Signal", "Rank", "Volume", "% Chg"
    );
    println!("{}", "─".repeat(118));
    for record in &report.records {
        println!("{}", format_row(record));
    }
    println!("{}", "─".repeat(118));
    println!(
        "Signals: {}  No data: {}  Dataset: {}",
        report.signal_count(),
        report.no_data_count(),
        &report.dataset_hash[..report.dataset_hash.len().min(16)]
    );
}

fn format_row(r: &ResultRecord) -> String {
    format!(
        "{:<16} {:>10} {:>10} {:>10} {:>10}  {:<18} {:<13} {:<13} {:>8}",
        r.symbol,
        price_cell(r.first_open),
        price_cell(r.first_close),
        price_cell(r.second_open),
        price_cell(r.second_close),
        r.signal.label(),
        r.rank.map_or("", |m| m.label()),
        r.volume_status.label(),
        price_cell(r.pct_change),
    )
}

// ─── Universe commands ──────────────────────────────────────────────

fn load_universe(file: &Path) -> Result<Universe> {
    if file.exists() {
        Universe::from_file(file).with_context(|| format!("failed to load {}", file.display()))
    } else {
        Ok(Universe::default_nse())
    }
}

fn universe_list(file: &Path) -> Result<()> {
    let universe = load_universe(file)?;
    for symbol in universe.symbols() {
        println!("{symbol}");
    }
    eprintln!("{} symbols", universe.len());
    Ok(())
}

fn universe_add(file: &Path, symbols: &[String]) -> Result<()> {
    let mut universe = load_universe(file)?;
    for raw in symbols {
        match universe.add(raw) {
            Ok(symbol) => println!("Added {symbol}"),
            Err(e @ (UniverseError::Duplicate(_) | UniverseError::EmptySymbol)) => {
                warn!("{e}");
            }
            Err(e) => return Err(e.into()),
        }
    }
    universe.save(file)?;
    Ok(())
}

fn universe_remove(file: &Path, symbols: &[String]) -> Result<()> {
    let mut universe = load_universe(file)?;
    for raw in symbols {
        match universe.remove(raw) {
            Ok(symbol) => println!("Removed {symbol}"),
            Err(e @ (UniverseError::NotFound(_) | UniverseError::EmptySymbol)) => {
                warn!("{e}");
            }
            Err(e) => return Err(e.into()),
        }
    }
    universe.save(file)?;
    Ok(())
}
