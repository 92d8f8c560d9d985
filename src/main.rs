use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use networth::app::Tracker;
use networth::config::{default_config_path, ResolvedConfig};
use networth::holdings::Holdings;
use networth::prices::{CoinGeckoPriceSource, YahooPriceSource};
use networth::store::{build_store, Backend};

#[derive(Parser)]
#[command(name = "networth")]
#[command(about = "Personal net worth tracker")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured storage backend ("sqlite" or "github")
    #[arg(long)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch prices, compute a snapshot, and save it
    Refresh {
        /// Snapshot date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the most recent snapshot
    Latest,
    /// List all snapshots ordered by date
    History,
    /// Inspect or edit the holdings document
    Holdings {
        #[command(subcommand)]
        command: HoldingsCommand,
    },
    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum HoldingsCommand {
    /// Print the holdings document
    Show,
    /// Add a stock position
    AddStock { ticker: String, shares: Decimal },
    /// Add an ETF position
    AddEtf { ticker: String, shares: Decimal },
    /// Add a crypto position
    AddCrypto {
        /// CoinGecko coin id (e.g. "bitcoin")
        id: String,
        /// Display symbol (e.g. "BTC")
        symbol: String,
        amount: Decimal,
    },
    /// Add a cash balance
    AddCash { label: String, amount: Decimal },
    /// Remove a stock position by ticker
    RemoveStock { ticker: String },
    /// Remove an ETF position by ticker
    RemoveEtf { ticker: String },
    /// Remove a crypto position by coin id
    RemoveCrypto { id: String },
    /// Remove a cash balance by label
    RemoveCash { label: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = ResolvedConfig::load_or_default(&config_path)?;
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }

    match cli.command {
        Command::Refresh { date } => {
            let holdings = Holdings::load(&config.holdings_path)?;
            let tracker = build_tracker(&config)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let snapshot = tracker.refresh(&holdings, date).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Latest => {
            let tracker = build_tracker(&config)?;
            match tracker.latest_summary().await? {
                Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                None => println!("No snapshots yet. Run 'networth refresh' first."),
            }
        }
        Command::History => {
            let tracker = build_tracker(&config)?;
            let history = tracker.history().await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        Command::Holdings { command } => run_holdings_command(&config, command)?,
        Command::Config => {
            println!("Config file: {}", config_path.display());
            println!("Holdings: {}", config.holdings_path.display());
            match config.storage.backend {
                Backend::Sqlite => {
                    println!("Backend: sqlite ({})", config.sqlite_path.display());
                }
                Backend::Github => {
                    println!(
                        "Backend: github ({}:{})",
                        config.storage.github.repo, config.storage.github.file
                    );
                }
            }
        }
    }

    Ok(())
}

fn build_tracker(config: &ResolvedConfig) -> Result<Tracker> {
    let store = build_store(config)?;
    let equities = YahooPriceSource::new();
    let crypto =
        CoinGeckoPriceSource::new().with_quote_currency(config.prices.quote_currency.clone());
    Ok(Tracker::new(store, Box::new(equities), Box::new(crypto)))
}

fn run_holdings_command(config: &ResolvedConfig, command: HoldingsCommand) -> Result<()> {
    let mut holdings = Holdings::load_or_default(&config.holdings_path)?;

    match command {
        HoldingsCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&holdings)?);
            return Ok(());
        }
        HoldingsCommand::AddStock { ticker, shares } => holdings.add_stock(&ticker, shares),
        HoldingsCommand::AddEtf { ticker, shares } => holdings.add_etf(&ticker, shares),
        HoldingsCommand::AddCrypto { id, symbol, amount } => {
            holdings.add_crypto(&id, &symbol, amount)
        }
        HoldingsCommand::AddCash { label, amount } => holdings.add_cash(&label, amount),
        HoldingsCommand::RemoveStock { ticker } => {
            if !holdings.remove_stock(&ticker) {
                println!("No stock holding for {ticker}");
                return Ok(());
            }
        }
        HoldingsCommand::RemoveEtf { ticker } => {
            if !holdings.remove_etf(&ticker) {
                println!("No ETF holding for {ticker}");
                return Ok(());
            }
        }
        HoldingsCommand::RemoveCrypto { id } => {
            if !holdings.remove_crypto(&id) {
                println!("No crypto holding for {id}");
                return Ok(());
            }
        }
        HoldingsCommand::RemoveCash { label } => {
            if !holdings.remove_cash(&label) {
                println!("No cash entry for {label}");
                return Ok(());
            }
        }
    }

    holdings.save(&config.holdings_path)?;
    Ok(())
}
