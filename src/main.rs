//! Gate.io ladder orders - main entry point
//!
//! Places a ladder of spot orders between two prices, or lists open and
//! past orders with `--listopen` / `--list`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gate_ladder::config::{LadderArgs, LadderConfig};
use gate_ladder::gateio::{ClientConfig, Credentials, GateClient};
use gate_ladder::prompt::TerminalOperator;
use gate_ladder::workflow::{self, RunOutcome};

#[derive(Parser, Debug)]
#[command(name = "gate-ladder")]
#[command(about = "Place ladder orders on Gate.io spot markets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: LadderArgs,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    let log_filename = format!(
        "ladder_{}.log",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Set log level - filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    // Console goes to stderr so stdout only carries prompts and reports
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose)?;

    let config = LadderConfig::from_args(cli.args)?;
    let credentials = Credentials::from_env_file(&config.env_file)?;

    let client_config = if config.testnet {
        ClientConfig::testnet()
    } else {
        ClientConfig::default()
    };
    let client = GateClient::with_config(credentials, client_config)
        .context("Failed to build HTTP client")?;
    info!("Using {} for {}", client.base_url(), config.pair);

    let mut operator = TerminalOperator;
    match workflow::run(&config, &client, &mut operator)? {
        RunOutcome::Completed(_) => info!("Done"),
        RunOutcome::Aborted => info!("Nothing sent"),
    }

    Ok(())
}
