//! BetterRest CLI - Command-line interface for BetterRest
//!
//! Commands:
//! - calculate: Calculate the bedtime for one request
//! - batch: Calculate bedtimes for many independent requests
//! - doctor: Diagnose model and configuration health
//! - model: Print the loaded coefficient set

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use betterrest::config::{BetterRestConfig, DEFAULT_CONFIG_FILE};
use betterrest::display::{format_coffee_cups, format_sleep_amount};
use betterrest::model::{CoefficientSet, PredictionEngine};
use betterrest::state::{Alert, CalculationState};
use betterrest::{calculate_with, ComputeError, SleepRequest, TimeOfDay};
use betterrest::{BETTERREST_VERSION, PRODUCER_NAME};

/// BetterRest - Find the bedtime that gets you the sleep you need
#[derive(Parser)]
#[command(name = "betterrest")]
#[command(version = BETTERREST_VERSION)]
#[command(about = "Estimate an ideal bedtime from wake time, sleep goal and coffee intake", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./betterrest.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the bedtime for one request
    Calculate {
        /// Wake-up time (HH:MM, 24-hour)
        #[arg(short, long)]
        wake: Option<String>,

        /// Desired amount of sleep in hours (4-12, steps of 0.25)
        #[arg(short, long)]
        sleep: Option<f64>,

        /// Daily coffee intake in cups (0-20)
        #[arg(short, long)]
        coffee: Option<u32>,

        /// Coefficient asset to load instead of the configured one
        #[arg(long)]
        model: Option<PathBuf>,

        /// Snap out-of-range values into range instead of rejecting them
        #[arg(long)]
        clamp: bool,

        /// Print the alert a front end would show
        #[arg(long)]
        alert: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Calculate bedtimes for many independent requests
    Batch {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Coefficient asset to load instead of the configured one
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Diagnose model and configuration health
    Doctor {
        /// Coefficient asset to check instead of the configured one
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the loaded coefficient set
    Model {
        /// Coefficient asset to print instead of the configured one
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one request per line)
    Ndjson,
    /// JSON array of requests
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one result per line)
    Ndjson,
    /// JSON array of results
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
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

fn run(cli: Cli) -> Result<(), RestCliError> {
    let config = BetterRestConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging.level);

    match cli.command {
        Commands::Calculate {
            wake,
            sleep,
            coffee,
            model,
            clamp,
            alert,
            json,
        } => cmd_calculate(
            &config,
            wake.as_deref(),
            sleep,
            coffee,
            model.as_deref(),
            clamp,
            alert,
            json,
        ),

        Commands::Batch {
            input,
            output,
            input_format,
            output_format,
            model,
        } => cmd_batch(
            &config,
            &input,
            &output,
            input_format,
            output_format,
            model.as_deref(),
        ),

        Commands::Doctor { model, json } => {
            cmd_doctor(&config, cli.config.as_deref(), model.as_deref(), json)
        }

        Commands::Model { model, json } => cmd_model(&config, model.as_deref(), json),
    }
}

/// Send logs to stderr; `RUST_LOG` takes precedence over the config file
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_engine(
    config: &BetterRestConfig,
    model: Option<&Path>,
) -> Result<PredictionEngine, RestCliError> {
    let engine = match model {
        Some(path) => PredictionEngine::from_file(path)?,
        None => config.load_engine()?,
    };
    info!(version = engine.version(), "sleep model ready");
    Ok(engine)
}

fn load_coefficients(
    config: &BetterRestConfig,
    model: Option<&Path>,
) -> Result<CoefficientSet, ComputeError> {
    match model.or(config.model.path.as_deref()) {
        Some(path) => CoefficientSet::from_file(path),
        None => CoefficientSet::bundled(),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_calculate(
    config: &BetterRestConfig,
    wake: Option<&str>,
    sleep: Option<f64>,
    coffee: Option<u32>,
    model: Option<&Path>,
    clamp: bool,
    alert: bool,
    json: bool,
) -> Result<(), RestCliError> {
    let defaults = config.default_request()?;

    let wake_time = match wake {
        Some(text) => text.parse::<TimeOfDay>()?,
        None => defaults.wake_time,
    };
    let hours = sleep.unwrap_or(defaults.desired_sleep_hours);
    let cups = coffee.unwrap_or(defaults.coffee_cups as u32);

    let request = if clamp {
        SleepRequest::clamped(wake_time, hours, cups)
    } else {
        let cups = u8::try_from(cups).map_err(|_| {
            ComputeError::InvalidInput(format!("coffee intake must be at most 20 cups, got {cups}"))
        })?;
        let request = SleepRequest::new(wake_time, hours, cups);
        request.validate()?;
        request
    };

    let engine = load_engine(config, model)?;
    let state = CalculationState::from_result(&calculate_with(&engine, &request));

    if json {
        let report = CalculationReport {
            wake_time: request.wake_time.to_string(),
            desired_sleep: format_sleep_amount(request.desired_sleep_hours),
            coffee: format_coffee_cups(request.coffee_cups),
            model_version: engine.version().to_string(),
            alert: state.alert(),
            state: state.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if alert {
        if let Some(alert) = state.alert() {
            println!("{}", alert.title);
            println!("{}", alert.message);
        }
    } else if let Some(bedtime) = state.bedtime() {
        println!("{}", bedtime.formatted);
    }

    match state {
        CalculationState::Failed { .. } => Err(RestCliError::CalculationFailed),
        _ => Ok(()),
    }
}

fn cmd_batch(
    config: &BetterRestConfig,
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    model: Option<&Path>,
) -> Result<(), RestCliError> {
    // Read input
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    // Parse records
    let records = match input_format {
        InputFormat::Ndjson => parse_ndjson(&input_data)?,
        InputFormat::Json => serde_json::from_str::<Vec<BatchRecord>>(&input_data)?,
    };

    if records.is_empty() {
        return Err(RestCliError::NoRecords);
    }

    let engine = load_engine(config, model)?;

    // Each record is an independent request
    let mut results = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let request = record.to_request().map_err(|e| RestCliError::InvalidRecord {
            index,
            message: e.to_string(),
        })?;

        let state = CalculationState::from_result(&calculate_with(&engine, &request));
        results.push(BatchResult {
            id: record.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            wake_time: request.wake_time.to_string(),
            desired_sleep_hours: request.desired_sleep_hours,
            coffee_cups: request.coffee_cups,
            state,
        });
    }

    debug!(records = results.len(), "batch complete");

    // Write output
    let output_data = format_output(&results, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_doctor(
    config: &BetterRestConfig,
    config_path: Option<&Path>,
    model: Option<&Path>,
    json: bool,
) -> Result<(), RestCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    // Check BetterRest version
    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("BetterRest version {}", BETTERREST_VERSION),
    });

    // Check configuration file
    let config_check = match config_path {
        Some(path) => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!("Loaded {}", path.display()),
        },
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!("Loaded ./{}", DEFAULT_CONFIG_FILE),
        },
        None => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "No config file, using built-in defaults".to_string(),
        },
    };
    checks.push(config_check);

    // Check default request
    let defaults = match config.default_request() {
        Ok(request) => {
            checks.push(DoctorCheck {
                name: "defaults".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Wake {}, sleep {}, {}",
                    request.wake_time,
                    format_sleep_amount(request.desired_sleep_hours),
                    format_coffee_cups(request.coffee_cups)
                ),
            });
            request
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "defaults".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            });
            SleepRequest::default()
        }
    };

    // Check the model asset loads and evaluates
    let source = model
        .or(config.model.path.as_deref())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "bundled".to_string());

    match load_engine(config, model) {
        Ok(engine) => {
            checks.push(DoctorCheck {
                name: "model".to_string(),
                status: CheckStatus::Ok,
                message: format!("Model {} loaded from {}", engine.version(), source),
            });

            let check = match calculate_with(&engine, &defaults) {
                Ok(bedtime) => DoctorCheck {
                    name: "prediction".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Default request gives bedtime {} ({:.2} h predicted)",
                        bedtime.formatted, bedtime.predicted_sleep_hours
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "prediction".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            };
            checks.push(check);
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "model".to_string(),
                status: CheckStatus::Error,
                message: format!("{} ({})", CliError::from(e).message, source),
            });
        }
    }

    // Check stdin is available (for batch input from a pipe)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (batch input ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: BETTERREST_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("BetterRest Doctor Report");
        println!("========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(RestCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_model(
    config: &BetterRestConfig,
    model: Option<&Path>,
    json: bool,
) -> Result<(), RestCliError> {
    let coefficients = load_coefficients(config, model)?;

    if json {
        println!("{}", coefficients.to_json()?);
    } else {
        println!("Model:     {}", coefficients.model);
        println!("Version:   {}", coefficients.version);
        println!("Intercept: {}", coefficients.intercept);
        println!("Weights:");
        println!("  wake (per second):        {}", coefficients.weights.wake);
        println!("  estimated_sleep (per h):  {}", coefficients.weights.estimated_sleep);
        println!("  coffee (per cup):         {}", coefficients.weights.coffee);
    }

    Ok(())
}

// Helper functions

fn parse_ndjson(input: &str) -> Result<Vec<BatchRecord>, RestCliError> {
    let mut records = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: BatchRecord = serde_json::from_str(trimmed).map_err(|e| {
            RestCliError::ParseError(format!("Failed to parse line {}: {}", line_no + 1, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

fn format_output(
    results: &[BatchResult],
    format: &OutputFormat,
) -> Result<String, RestCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for result in results {
                lines.push(serde_json::to_string(result)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(results)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(results)?),
    }
}

// Record types

/// Wake time given either as `HH:MM` or as seconds since midnight
#[derive(Deserialize)]
#[serde(untagged)]
enum WakeInput {
    Seconds(u32),
    Clock(String),
}

#[derive(Deserialize)]
struct BatchRecord {
    id: Option<String>,
    wake_time: WakeInput,
    desired_sleep_hours: f64,
    coffee_cups: u8,
}

impl BatchRecord {
    fn to_request(&self) -> Result<SleepRequest, ComputeError> {
        let wake_time = match &self.wake_time {
            WakeInput::Seconds(seconds) => TimeOfDay::try_from(*seconds)?,
            WakeInput::Clock(text) => text.parse()?,
        };
        Ok(SleepRequest::new(
            wake_time,
            self.desired_sleep_hours,
            self.coffee_cups,
        ))
    }
}

#[derive(Serialize)]
struct BatchResult {
    id: String,
    wake_time: String,
    desired_sleep_hours: f64,
    coffee_cups: u8,
    #[serde(flatten)]
    state: CalculationState,
}

#[derive(Serialize)]
struct CalculationReport {
    wake_time: String,
    desired_sleep: String,
    coffee: String,
    model_version: String,
    state: CalculationState,
    alert: Option<Alert>,
}

// Error types

#[derive(Debug)]
enum RestCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoRecords,
    InvalidRecord { index: usize, message: String },
    CalculationFailed,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for RestCliError {
    fn from(e: io::Error) -> Self {
        RestCliError::Io(e)
    }
}

impl From<ComputeError> for RestCliError {
    fn from(e: ComputeError) -> Self {
        match e {
            ComputeError::CalculationFailed => RestCliError::CalculationFailed,
            other => RestCliError::Compute(other),
        }
    }
}

impl From<serde_json::Error> for RestCliError {
    fn from(e: serde_json::Error) -> Self {
        RestCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ComputeError> for CliError {
    fn from(e: ComputeError) -> Self {
        let hint = match &e {
            ComputeError::ModelUnavailable(_) => {
                Some("Check the model path or run 'betterrest doctor'".to_string())
            }
            ComputeError::InvalidInput(_) => Some(
                "Wake time is HH:MM, sleep 4-12 hours in 0.25 steps, coffee 0-20 cups (or pass --clamp)"
                    .to_string(),
            ),
            ComputeError::ConfigError(_) => Some("Check the TOML syntax of the config file".to_string()),
            _ => None,
        };
        CliError {
            code: e.code().to_string(),
            message: e.to_string(),
            hint,
        }
    }
}

impl From<RestCliError> for CliError {
    fn from(e: RestCliError) -> Self {
        match e {
            RestCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            RestCliError::Compute(e) => CliError::from(e),
            RestCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            RestCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No requests found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            RestCliError::InvalidRecord { index, message } => CliError {
                code: "INVALID_RECORD".to_string(),
                message: format!("Record {}: {}", index, message),
                hint: Some("Wake time is HH:MM or seconds since midnight".to_string()),
            },
            RestCliError::CalculationFailed => CliError {
                code: "CALCULATION_FAILED".to_string(),
                message: ComputeError::CalculationFailed.to_string(),
                hint: None,
            },
            RestCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            RestCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
