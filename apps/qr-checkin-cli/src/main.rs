mod logging;
mod terminal;
mod view;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use qr_checkin::{
    CheckinConfig, HttpValidationClient, Identifier, LookupMode, ValidationClient,
    WorkflowController, WorkflowError,
};
use url::Url;

use terminal::{Console, TerminalCamera, TerminalPresenter, TerminalPrompt};

/// QR check-in - scan, look up and check people in
#[derive(Parser)]
#[command(name = "qr-checkin")]
#[command(about = "QR check-in - scan, look up and check people in")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lookup service base URL (overrides config)
    #[arg(long)]
    base_url: Option<Url>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive scan console
    Scan,
    /// Look a single identifier up and exit
    Lookup {
        identifier: String,
        /// Check the person in instead of only reading the record
        #[arg(long)]
        validate: bool,
    },
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (QR_CHECKIN__*) -> 4) CLI overrides
    let mut config = CheckinConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.service.base_url = base_url;
        config.validate()?;
    }

    logging::init(&config.logging, cli.verbose)?;

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Scan) {
        Commands::Scan => run_console(&config).await,
        Commands::Lookup {
            identifier,
            validate,
        } => lookup_once(&config, &identifier, validate).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &CheckinConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn lookup_once(config: &CheckinConfig, raw: &str, validate: bool) -> Result<()> {
    let identifier = Identifier::parse(raw)?;
    let mode = if validate {
        LookupMode::Validate
    } else {
        LookupMode::ReadOnly
    };
    let client = HttpValidationClient::new(&config.service)?;

    let report = client.lookup(&identifier, mode).await;
    if let Some(failure) = report.failure {
        anyhow::bail!("lookup failed: {failure}");
    }
    for line in view::outcome_lines(&report.outcome, &chrono::Local) {
        println!("{line}");
    }
    Ok(())
}

async fn run_console(config: &CheckinConfig) -> Result<()> {
    let console = Arc::new(Console::new());
    let controller = WorkflowController::new(
        Arc::new(TerminalCamera::new(console.clone())),
        Arc::new(TerminalPrompt::new(console.clone())),
        Arc::new(HttpValidationClient::new(&config.service)?),
        Arc::new(TerminalPresenter),
        config.scanner.symbology,
    );
    tracing::info!(base_url = %config.service.base_url, "scan console ready");
    println!("Commands: scan, confirm, quit");

    while let Some(command) = console.ask("> ").await? {
        match command.to_ascii_lowercase().as_str() {
            "" => {}
            "scan" | "s" => {
                controller.request_scan().await?;
            }
            "confirm" | "c" => match controller.confirm().await {
                Ok(_) => {}
                Err(WorkflowError::ConfirmUnavailable { .. }) => {
                    println!("Nothing to confirm. Scan a QR first.");
                }
                Err(e) => return Err(e.into()),
            },
            "quit" | "q" | "exit" => break,
            other => println!("Unknown command '{other}'. Commands: scan, confirm, quit"),
        }
    }
    Ok(())
}
