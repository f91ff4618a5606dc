use clap::{Parser, ValueEnum};
use orderlog::config::{AppConfig, ConfigOverrides, ReportFormat};
use orderlog::order_log::read_lines;
use orderlog::report::Report;
use orderlog::OrderLogQueryEngine;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "orderlog", about = "Answer aggregate queries over an order log read from stdin.")]
struct Cli {
    /// TOML config file; defaults apply when it does not exist
    #[arg(long, env = "ORDERLOG_CONFIG", default_value = "config.toml")]
    config: String,

    /// Symbol for the biggest-buys and best-sell sections
    #[arg(long)]
    symbol: Option<String>,

    /// Exact HH:MM:SS timestamp for the best-sell section
    #[arg(long)]
    timestamp: Option<String>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Fail on the first malformed line instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Input lines are comma-separated
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing; stdout is reserved for the report
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load_or_default(&cli.config)?;
    config.apply_overrides(ConfigOverrides {
        symbol: cli.symbol.clone(),
        timestamp: cli.timestamp.clone(),
        format: cli.format.map(ReportFormat::from),
        strict: cli.strict,
        csv: cli.csv,
    })?;
    Ok(config)
}

fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Config: format={:?}, policy={:?}, symbol={}, timestamp={}",
        config.input.format, config.input.policy, config.report.symbol, config.report.timestamp,
    );

    let lines = read_lines(io::stdin().lock())?;

    let engine = OrderLogQueryEngine::new(lines, &config.input)?;
    let summary = engine.summary();
    if summary.rejected > 0 {
        warn!(
            rejected = summary.rejected,
            parsed = summary.parsed,
            "Some order lines were skipped"
        );
    }

    let report = Report::build(&engine, &config.report);
    let rendered = report.render(config.report.format)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
