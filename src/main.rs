use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use docsis_watch::{Coordinator, LogbookSink};
use dw_core::config::{Config, Transport};
use dw_core::extract::decode_payload;
use dw_core::{Normalizer, Summary};
use dw_feeds::{SnapshotSource, Source};

const CHECK_BUDGET: Duration = Duration::from_secs(8);

#[derive(Parser)]
#[command(name = "docsis-watch", about = "Watch a cable modem's DOCSIS event log")]
struct Cli {
    /// Config file (default: ~/.config/docsis-watch/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Modem address, overrides `[modem] host`.
    #[arg(long, global = true)]
    host: Option<String>,

    /// `http` or `snmp`, overrides `[modem] transport`.
    #[arg(long, global = true)]
    transport: Option<Transport>,

    /// Seconds between polls, overrides `[modem] scan_interval_secs`.
    #[arg(long, global = true)]
    interval: Option<u64>,

    /// Write debug logs to --log-file (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,

    #[arg(long, global = true, default_value = "/tmp/docsis-watch-debug.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll until interrupted, announcing new events to the log.
    Run,
    /// Poll once and print the summary as JSON.
    Once {
        /// Print the full diagnostics dump instead of the summary.
        #[arg(long)]
        diagnostics: bool,
    },
    /// Check that the modem answers within 8 seconds.
    Check,
    /// Decode a saved status payload (JSON or HTML) and print the summary.
    Parse { file: PathBuf },
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
        .context("loading configuration")?;

        if let Some(host) = &self.host {
            cfg.modem.host = host.clone();
        }
        if let Some(transport) = self.transport {
            cfg.modem.transport = transport;
        }
        if let Some(secs) = self.interval {
            cfg.modem.scan_interval_secs = secs;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cli.log_file)
            .with_context(|| format!("opening {}", cli.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(filter)
            .init();
        tracing::info!(
            "docsis-watch debug log started, tail -f {}",
            cli.log_file.display()
        );
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match &cli.command {
        Command::Parse { file } => parse(&cli, file),
        Command::Run => {
            let cfg = cli.load_config()?;
            let mut coordinator = coordinator(&cfg)?;
            coordinator
                .run(cfg.scan_interval(), async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await;
            Ok(ExitCode::SUCCESS)
        }
        Command::Once { diagnostics } => {
            let cfg = cli.load_config()?;
            let mut coordinator = coordinator(&cfg)?;
            let polled = coordinator.poll_once().await.map(|_| ());
            let out = if *diagnostics {
                coordinator.diagnostics()
            } else {
                serde_json::to_value(coordinator.summary())?
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
            polled.context("polling modem")?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => {
            let cfg = cli.load_config()?;
            let source = Source::from_config(&cfg).context("building snapshot source")?;
            match tokio::time::timeout(CHECK_BUDGET, source.fetch_snapshot()).await {
                Ok(Ok(snapshot)) => {
                    println!("ok: {} answered with {} keys", source.describe(), snapshot.len());
                    Ok(ExitCode::SUCCESS)
                }
                Ok(Err(err)) => {
                    println!("cannot_connect: {err}");
                    Ok(ExitCode::FAILURE)
                }
                Err(_) => {
                    println!("connection_timeout: no answer within {CHECK_BUDGET:?}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn coordinator(cfg: &Config) -> anyhow::Result<Coordinator<Source, LogbookSink>> {
    let source = Source::from_config(cfg).context("building snapshot source")?;
    let normalizer = Normalizer::new(cfg.columns.clone(), cfg.rules.clone());
    Ok(Coordinator::new(source, normalizer, LogbookSink))
}

/// Offline decode. Does not create or read the config file unless --config
/// is given.
fn parse(cli: &Cli, file: &Path) -> anyhow::Result<ExitCode> {
    let cfg = match &cli.config {
        Some(_) => cli.load_config()?,
        None => Config::defaults(),
    };
    let payload =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let snapshot = decode_payload(&payload, &cfg.columns);
    let normalizer = Normalizer::new(cfg.columns, cfg.rules);
    let summary = Summary::from_records(
        normalizer.derive_latest_event(&snapshot),
        normalizer.derive_latest_error(&snapshot),
        Utc::now(),
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::SUCCESS)
}
