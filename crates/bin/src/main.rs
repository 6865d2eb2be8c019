//! Incomeflow CLI binary.
//!
//! Reconciles quarterly income statements and prints, charts or exports them.

use clap::{Parser, Subcommand};
use incomeflow::{ChartOutcome, Reconciler, ReconcilerConfig, render_chart};
use incomeflow_output::{BandsExport, ExportFormat, Exporter, IncomeExport, IncomeSummary};
use incomeflow_valuation::ValuationBands;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "incomeflow")]
#[command(about = "Incomeflow: quarterly income waterfalls and valuation bands", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quarters to show (default from INCOMEFLOW_MAX_QUARTERS or 8)
    #[arg(long, global = true)]
    quarters: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reconciled quarterly income statement
    Income {
        /// Ticker or stock code
        symbol: String,

        /// Print as a Markdown table
        #[arg(long)]
        markdown: bool,
    },

    /// Build the chart specification as JSON
    Chart {
        /// Ticker or stock code
        symbol: String,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Show the P/E valuation bands
    Bands {
        /// Ticker or stock code
        symbol: String,
    },

    /// Export quarters or valuation bands
    Export {
        /// Ticker or stock code
        symbol: String,

        /// Output format (csv, json, pretty-json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Output file (defaults to `{symbol}.{ext}`)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Export valuation bands instead of quarters
        #[arg(long)]
        bands: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = ReconcilerConfig::from_env()?;
    if let Some(quarters) = cli.quarters {
        config = config.with_max_quarters(quarters);
    }
    let reconciler = Reconciler::new(config)?;

    match cli.command {
        Commands::Income { symbol, markdown } => {
            print_income(&reconciler, &symbol, markdown).await?;
        }
        Commands::Chart {
            symbol,
            output,
            pretty,
        } => {
            chart(&reconciler, &symbol, output, pretty).await?;
        }
        Commands::Bands { symbol } => {
            print_bands(&reconciler, &symbol).await?;
        }
        Commands::Export {
            symbol,
            format,
            output,
            bands,
        } => {
            export(&reconciler, &symbol, format, output, bands).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn spinner(message: String) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Ok(pb)
}

async fn print_income(
    reconciler: &Reconciler,
    symbol: &str,
    markdown: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = spinner(format!("Reconciling {symbol}..."))?;
    let result = reconciler.incomes(symbol).await;
    pb.finish_and_clear();
    let reconciliation = result?;

    let summary = IncomeSummary::new(
        reconciliation.symbol.clone(),
        reconciliation.source.clone(),
        reconciliation.quarters.clone(),
    );
    if markdown {
        println!("{}", summary.to_markdown());
    } else {
        println!("{}", summary.to_ascii_table());
    }
    Ok(())
}

async fn chart(
    reconciler: &Reconciler,
    symbol: &str,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = spinner(format!("Building chart for {symbol}..."))?;
    let result = render_chart(reconciler, symbol).await;
    pb.finish_and_clear();
    let outcome = result?;

    if let ChartOutcome::NotSupported(state) = &outcome {
        eprintln!("{}: {}", state.message, state.reason);
    }

    let format = if pretty {
        ExportFormat::PrettyJson
    } else {
        ExportFormat::Json
    };
    match output {
        Some(path) => {
            outcome.chart().export_to_file(&path, format)?;
            println!("Chart written to {}", path.display());
        }
        None => println!("{}", outcome.chart().export_to_string(format)?),
    }
    Ok(())
}

async fn print_bands(reconciler: &Reconciler, symbol: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bands = fetch_bands(reconciler, symbol).await?;
    if bands.is_empty() {
        println!("{}: P/E range is degenerate, no bands", symbol.trim().to_uppercase());
        return Ok(());
    }

    println!("{:<8} {:>12} {:>12}", "Band", "Multiple", "Last value");
    println!("{}", "-".repeat(34));
    for band in &bands.bands {
        let last = bands
            .last_point(band)
            .map_or_else(|| "-".to_string(), |(_, v)| format!("{v:.2}"));
        println!("{:<8} {:>12.2} {:>12}", band.label(), band.multiple, last);
    }
    Ok(())
}

async fn fetch_bands(
    reconciler: &Reconciler,
    symbol: &str,
) -> Result<ValuationBands, Box<dyn std::error::Error>> {
    if !reconciler.has_prices() {
        return Err(format!(
            "no price service configured; set {}",
            incomeflow::config::PRICE_URL_VAR
        )
        .into());
    }

    let pb = spinner(format!("Fetching prices for {symbol}..."))?;
    let result = reconciler.valuation(symbol).await;
    pb.finish_and_clear();
    let valuation = result?.ok_or("no price service configured")?;
    Ok(valuation.bands)
}

async fn export(
    reconciler: &Reconciler,
    symbol: &str,
    format: ExportFormat,
    output: Option<PathBuf>,
    bands: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let symbol = symbol.trim().to_uppercase();
    let path = output.unwrap_or_else(|| PathBuf::from(format!("{symbol}.{}", format.extension())));

    if bands {
        let bands = fetch_bands(reconciler, &symbol).await?;
        BandsExport::new(symbol, bands).export_to_file(&path, format)?;
    } else {
        let pb = spinner(format!("Reconciling {symbol}..."))?;
        let result = reconciler.incomes(&symbol).await;
        pb.finish_and_clear();
        let reconciliation = result?;
        IncomeExport::from_incomes(&symbol, &reconciliation.quarters).export_to_file(&path, format)?;
    }

    println!("Exported to {}", path.display());
    Ok(())
}
