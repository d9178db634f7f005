//! Integrity CLI - Command-line interface for the integrity checker
//!
//! Commands:
//! - serve: Run the HTTP scoring service
//! - score: Score a saved submission file
//! - rules: Print the scoring rule table

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use integrity_checker::pipeline::parse_submission;
use integrity_checker::{
    serve, IntegrityAnalyzer, IntegrityError, RiskScorer, ServiceConfig, VERSION,
};

/// Integrity - heuristic authorship-risk scoring for writing sessions
#[derive(Parser)]
#[command(name = "integrity")]
#[command(version = VERSION)]
#[command(about = "Score writing sessions for signs of pasted or injected content", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP scoring service (POST /submit)
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address, overrides the config file
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Allowed CORS origin, repeatable; overrides the config file
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,
    },

    /// Score a saved submission
    Score {
        /// Submission JSON file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Print the scoring rules
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), IntegrityCliError> {
    match cli.command {
        Commands::Serve {
            config,
            bind,
            allow_origins,
        } => cmd_serve(config.as_deref(), bind, allow_origins),

        Commands::Score { input, pretty } => cmd_score(&input, pretty),

        Commands::Rules { json } => cmd_rules(json),
    }
}

fn cmd_serve(
    config_path: Option<&Path>,
    bind: Option<SocketAddr>,
    allow_origins: Vec<String>,
) -> Result<(), IntegrityCliError> {
    let mut config = match config_path {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(addr) = bind {
        config = config.with_bind_addr(addr);
    }
    if !allow_origins.is_empty() {
        config = config.with_allowed_origins(allow_origins);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(config))?;
    Ok(())
}

fn cmd_score(input: &Path, pretty: bool) -> Result<(), IntegrityCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(IntegrityCliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let submission = parse_submission(&input_data)?;
    let report = IntegrityAnalyzer::new().analyze(&submission)?;

    if pretty {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(())
}

fn cmd_rules(json: bool) -> Result<(), IntegrityCliError> {
    let rules = RiskScorer::rules();

    if json {
        println!("{}", serde_json::to_string_pretty(rules)?);
        return Ok(());
    }

    println!("{:<3} {:<26} {:>6}  {:<40} REASON", "#", "ID", "WEIGHT", "CONDITION");
    for (i, rule) in rules.iter().enumerate() {
        println!(
            "{:<3} {:<26} {:>6}  {:<40} {}",
            i + 1,
            rule.id,
            format!("+{}", rule.weight),
            rule.condition,
            rule.reason
        );
    }
    println!("\nRisk is the sum of triggered weights, capped at {}.", integrity_checker::MAX_RISK);

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum IntegrityCliError {
    Io(io::Error),
    Analysis(IntegrityError),
    Json(serde_json::Error),
    NoInput,
}

impl From<io::Error> for IntegrityCliError {
    fn from(e: io::Error) -> Self {
        IntegrityCliError::Io(e)
    }
}

impl From<IntegrityError> for IntegrityCliError {
    fn from(e: IntegrityError) -> Self {
        IntegrityCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for IntegrityCliError {
    fn from(e: serde_json::Error) -> Self {
        IntegrityCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<IntegrityCliError> for CliError {
    fn from(e: IntegrityCliError) -> Self {
        match e {
            IntegrityCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            IntegrityCliError::Analysis(IntegrityError::ConfigError(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Check the TOML configuration file".to_string()),
            },
            IntegrityCliError::Analysis(IntegrityError::ServerError(msg)) => CliError {
                code: "SERVER_ERROR".to_string(),
                message: msg,
                hint: Some("Is another process already listening on that address?".to_string()),
            },
            IntegrityCliError::Analysis(e) => CliError {
                code: "ANALYSIS_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Ensure input has text, total_chars, total_words, startTime, endTime, duration_seconds and events"
                        .to_string(),
                ),
            },
            IntegrityCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            IntegrityCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal, refusing to wait for input".to_string(),
                hint: Some("Pipe a submission file, e.g. `integrity score -i - < session.json`".to_string()),
            },
        }
    }
}
