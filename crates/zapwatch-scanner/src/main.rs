//! ZapWatch - web application scanning through OWASP ZAP
//!
//! Entry point for the `zapwatch` console binary.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use zapwatch_common::{Config, LogConfig, LogFormat};
use zapwatch_core::{ScanTarget, ScanType};
use zapwatch_engine::{ZapClient, ZapClientConfig};
use zapwatch_report::{compare_scans, generate_report, render_history, render_summary};
use zapwatch_scanner::console;
use zapwatch_scanner::{Orchestrator, ScanOutcome, ScanSettings};
use zapwatch_store::ResultStore;

/// ZapWatch web application scanner
#[derive(Parser, Debug)]
#[command(name = "zapwatch")]
#[command(version)]
#[command(about = "Drive OWASP ZAP scans, store findings and render reports", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "zapwatch.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<String>,

    /// Result database path (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// ZAP API endpoint (overrides config)
    #[arg(long)]
    zap_url: Option<String>,

    /// ZAP API key (overrides config)
    #[arg(long, env = "ZAP_API_KEY")]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scan; missing options are prompted for
    Scan {
        /// Target URL
        #[arg(short, long)]
        target: Option<String>,

        /// Scan type (quick, standard, deep)
        #[arg(short = 'T', long = "type")]
        scan_type: Option<ScanType>,
    },

    /// Write the HTML report of a scan
    Report {
        scan_id: i64,

        /// Output file (default: <report dir>/security_report_<id>.html)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the summary counts of two scans
    Compare {
        first: Option<i64>,
        second: Option<i64>,
    },

    /// Print the summary of a scan
    Summary { scan_id: i64 },

    /// List recent scans, newest first
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let log_config = LogConfig::new()
        .level(&config.logging.level)
        .format(LogFormat::from_name(&config.logging.format))
        .with_file(config.logging.with_file);
    zapwatch_common::init_logging_with_config(log_config);

    debug!("ZapWatch v{}", env!("CARGO_PKG_VERSION"));

    let store = ResultStore::open(&config.store.database_path)?;
    info!("Database initialized: {}", config.store.database_path.display());

    match args.command {
        Command::Scan { target, scan_type } => run_scan(&config, store, target, scan_type).await,
        Command::Report { scan_id, output } => {
            let output = output.unwrap_or_else(|| config.report.report_path(scan_id));
            write_report(&store, scan_id, output)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Compare { first, second } => run_compare(&store, first, second),
        Command::Summary { scan_id } => {
            match store.get_scan(scan_id)? {
                Some(scan) => println!("{}", render_summary(&scan)),
                None => println!("[!] Scan not found"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::History { limit } => {
            print!("{}", render_history(&store.recent_scans(limit)?));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// File (if present) < environment < command line
fn load_config(args: &Args) -> Result<Config> {
    let config = if args.config.exists() {
        Config::from_file(&args.config)
            .with_context(|| format!("loading {}", args.config.display()))?
    } else {
        Config::default()
    };

    let mut config = config.merge_env();

    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &args.log_format {
        config.logging.format = format.clone();
    }
    if let Some(db) = &args.db {
        config.store.database_path = db.clone();
    }
    if let Some(url) = &args.zap_url {
        config.engine.endpoint = url.clone();
    }
    if let Some(key) = &args.api_key {
        config.engine.api_key = key.clone();
    }

    Ok(config)
}

async fn run_scan(
    config: &Config,
    store: ResultStore,
    target: Option<String>,
    scan_type: Option<ScanType>,
) -> Result<ExitCode> {
    let client = ZapClient::new(ZapClientConfig {
        endpoint: config.engine.endpoint.clone(),
        api_key: config.engine.api_key.clone(),
        request_timeout: config.engine.request_timeout(),
        alert_page_size: config.scan.alert_page_size,
    })?;

    println!("{}", console::BANNER);
    println!("[*] Make sure ZAP is running on {}", client.endpoint());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let target = match target {
        Some(t) => ScanTarget::parse(&t)?,
        None => console::prompt_target(&mut input, &mut out)?,
    };
    let scan_type = match scan_type {
        Some(t) => t,
        None => console::prompt_scan_type(&mut input, &mut out)?,
    };

    println!("\n[+] Starting {} scan for: {}", scan_type, target);
    let orchestrator = Orchestrator::new(client, store, ScanSettings::from(&config.scan));

    match orchestrator.run(&target, scan_type).await? {
        ScanOutcome::Completed { scan_id, counts } => {
            println!("[+] Scan completed! Found {} vulnerabilities", counts.total);
            if let Some(scan) = orchestrator.store().get_scan(scan_id)? {
                println!("{}", render_summary(&scan));
            }

            let report = write_report(orchestrator.store(), scan_id, config.report.report_path(scan_id))?;
            if let Some(path) = report {
                println!("[+] All done! Check {} for detailed report", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        ScanOutcome::Failed { scan_id, reason } => {
            println!("[!] Error during scan #{}: {}", scan_id, reason);
            println!("[!] Scan failed. Please check ZAP connection and try again.");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Write a report, printing a message instead of failing when the scan is unknown
fn write_report(store: &ResultStore, scan_id: i64, output: PathBuf) -> Result<Option<PathBuf>> {
    match generate_report(store, scan_id, &output) {
        Ok(path) => {
            println!("[+] Report generated: {}", path.display());
            Ok(Some(path))
        }
        Err(e) if e.is_not_found() => {
            println!("[!] Scan not found");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn run_compare(store: &ResultStore, first: Option<i64>, second: Option<i64>) -> Result<ExitCode> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let first = match first {
        Some(id) => id,
        None => console::prompt_scan_id(&mut input, &mut out, "Enter first scan ID: ")?,
    };
    let second = match second {
        Some(id) => id,
        None => console::prompt_scan_id(&mut input, &mut out, "Enter second scan ID: ")?,
    };

    match compare_scans(store, first, second) {
        Ok(comparison) => print!("{}", comparison.render_table()),
        Err(e) if e.is_not_found() => println!("One or both scans not found!"),
        Err(e) => return Err(e.into()),
    }
    Ok(ExitCode::SUCCESS)
}
