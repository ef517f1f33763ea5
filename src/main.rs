use anyhow::{Context, Result};
use backtester::{BacktestOutcome, Backtester};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use configuration::ReversalCommission;
use core_types::StrategyId;
use market_data::{load_csv, BarSeries};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the bar-by-bar backtester.
fn main() -> Result<()> {
    // RUST_LOG may come from a .env file; a missing file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let _guard = init_tracing(args.log_file.as_deref())?;
            handle_run(args)
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Simulates a trading strategy bar by bar against historical price data.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single backtest over a CSV file of bars.
    Run(RunArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// CSV file with `timestamp,open,high,low,close,volume` rows.
    #[arg(long, short)]
    data: PathBuf,

    /// The TOML run configuration.
    #[arg(long, short, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `backtest.symbol`.
    #[arg(long)]
    symbol: Option<String>,

    /// Overrides `backtest.strategy` (e.g., "sma_crossover", "buy_and_hold").
    #[arg(long)]
    strategy: Option<StrategyId>,

    /// Overrides `ledger.reversal_commission`.
    #[arg(long, value_enum)]
    reversal_commission: Option<ReversalCommission>,

    /// Print the full outcome as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Write the event journal to this file as JSON.
    #[arg(long)]
    journal: Option<PathBuf>,

    /// Show a progress bar while the simulation runs.
    #[arg(long)]
    progress: bool,

    /// Also write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ==============================================================================
// Logging
// ==============================================================================

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Logs go to stderr so that `--json` output
/// on stdout stays machine-readable. The returned guard flushes the log file
/// on drop and must be held until the program exits.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().context("--log-file must name a file")?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter())
                .with_writer(writer)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(Some(guard))
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(None)
        }
    }
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

/// Handles loading the configuration and data, running the simulation and
/// printing its results.
fn handle_run(args: RunArgs) -> Result<()> {
    let mut config = configuration::load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    if let Some(symbol) = args.symbol {
        config.backtest.symbol = symbol;
    }
    if let Some(strategy) = args.strategy {
        config.backtest.strategy = strategy;
    }
    if let Some(reversal_commission) = args.reversal_commission {
        config.ledger.reversal_commission = reversal_commission;
    }
    config.validate().context("Invalid configuration after CLI overrides")?;

    let bars = load_csv(&args.data, &config.backtest.symbol)
        .with_context(|| format!("Failed to load bars from {}", args.data.display()))?;
    let mut source = BarSeries::new(bars);

    let mut backtester = Backtester::from_config(&config)
        .context("Failed to set up the backtest")?
        .with_progress(args.progress);
    let outcome = backtester.run(&mut source).context("Backtest failed")?;

    if let Some(path) = &args.journal {
        let json = outcome.journal.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write event journal to {}", path.display()))?;
        tracing::info!(path = %path.display(), events = outcome.journal.len(), "Event journal written");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", summary_table(&outcome));
        if !outcome.trades.is_empty() {
            println!("{}", trades_table(&outcome));
        }
    }

    Ok(())
}

fn summary_table(outcome: &BacktestOutcome) -> Table {
    let report = &outcome.report;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value"]);

    let rows: Vec<(&str, String)> = vec![
        ("Run ID", outcome.run_id.to_string()),
        ("Strategy", outcome.strategy.clone()),
        ("Symbol", outcome.symbol.clone()),
        ("Bars Processed", outcome.bars_processed.to_string()),
        ("Trades", outcome.trades.len().to_string()),
        ("Rejected Orders", outcome.rejected_orders.to_string()),
        ("Initial Cash", outcome.initial_cash.round_dp(2).to_string()),
        ("Realized PnL", outcome.realized_pnl.round_dp(2).to_string()),
        ("Final Equity", outcome.final_equity.round_dp(2).to_string()),
        ("Net Profit", outcome.net_profit().round_dp(2).to_string()),
        ("Total Return %", report.total_return_pct.round_dp(2).to_string()),
        ("Annualized Return", format!("{:.4}", report.annualized_return)),
        ("Annualized Volatility", format!("{:.4}", report.annualized_volatility)),
        ("Sharpe Ratio", format!("{:.4}", report.sharpe_ratio)),
        ("Max Drawdown", report.max_drawdown.round_dp(2).to_string()),
        ("Max Drawdown %", report.max_drawdown_pct.round_dp(2).to_string()),
        (
            "Win Rate %",
            report
                .trades
                .win_rate_pct
                .map_or_else(|| "-".to_string(), |rate| rate.round_dp(2).to_string()),
        ),
        (
            "Profit Factor",
            report
                .trades
                .profit_factor
                .map_or_else(|| "-".to_string(), |factor| factor.round_dp(2).to_string()),
        ),
    ];

    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }
    table
}

fn trades_table(outcome: &BacktestOutcome) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Closed At", "Position", "Quantity", "Entry", "Exit", "PnL"]);

    for (i, trade) in outcome.trades.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            trade.order.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            trade.position_side().to_string(),
            trade.quantity.to_string(),
            trade.entry_price.round_dp(2).to_string(),
            trade.exit_price().round_dp(2).to_string(),
            trade.pnl.round_dp(2).to_string(),
        ]);
    }
    table
}
