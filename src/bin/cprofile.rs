//! cprofile CLI - Command-line interface for the concentration profile engine
//!
//! Commands:
//! - record: Append task events to the event store
//! - summary: Compute the summary and concentration profile for a session
//! - validate: Validate task event records
//! - exercises: List the code exercise catalog
//! - doctor: Diagnose event store and environment health

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use concentration_profile::grading::{CatalogGrader, ExerciseId};
use concentration_profile::store::DEFAULT_DATA_FILE;
use concentration_profile::{
    ComputeError, Event, EventRecordAdapter, JsonFileEventStore, Summary, SummaryProcessor,
    ENGINE_VERSION, PRODUCER_NAME,
};

/// cprofile - Concentration profile engine for reading, reaction and code tasks
#[derive(Parser)]
#[command(name = "cprofile")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score task sessions into a concentration profile", long_about = None)]
struct Cli {
    /// JSON event store file
    #[arg(long, global = true, env = "CPROFILE_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append task events to the event store
    Record {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,
    },

    /// Compute the summary for one session
    Summary {
        /// Session identifier
        #[arg(short, long)]
        session: String,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Validate task event records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the code exercise catalog
    Exercises {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose event store and environment health
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

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

fn run(cli: Cli) -> Result<(), ProfileCliError> {
    match cli.command {
        Commands::Record {
            input,
            input_format,
        } => cmd_record(&cli.data_file, &input, input_format),

        Commands::Summary {
            session,
            output_format,
        } => cmd_summary(&cli.data_file, &session, output_format),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Exercises { json } => cmd_exercises(json),

        Commands::Doctor { json } => cmd_doctor(&cli.data_file, json),
    }
}

fn cmd_record(
    data_file: &Path,
    input: &Path,
    input_format: InputFormat,
) -> Result<(), ProfileCliError> {
    let events = read_events(input, input_format)?;
    if events.is_empty() {
        return Err(ProfileCliError::NoInputEvents);
    }

    let mut processor = SummaryProcessor::new(JsonFileEventStore::new(data_file));
    for event in events {
        let stored = processor.ingest(event, &CatalogGrader)?;
        info!(
            event_id = %stored.event_id,
            kind = stored.event.kind().as_str(),
            session_id = stored.event.session_id(),
            "saved event"
        );
    }

    Ok(())
}

fn cmd_summary(
    data_file: &Path,
    session_id: &str,
    output_format: OutputFormat,
) -> Result<(), ProfileCliError> {
    if !data_file.exists() {
        warn!(path = %data_file.display(), "event store file does not exist");
    }

    let processor = SummaryProcessor::new(JsonFileEventStore::new(data_file));
    let summary = processor.summary(session_id)?;

    println!("{}", format_summary(&summary, &output_format)?);
    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), ProfileCliError> {
    let events = read_events(input, input_format)?;
    let failures = EventRecordAdapter::validate_events(&events);

    let report = ValidationReport {
        total_events: events.len(),
        valid_events: events.len() - failures.len(),
        invalid_events: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                session_id: f.session_id.clone(),
                kind: f.kind.as_str().to_string(),
                error: f.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events:   {}", report.total_events);
        println!("Valid events:   {}", report.valid_events);
        println!("Invalid events: {}", report.invalid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - {} event for session '{}' (index {}): {}",
                    err.kind, err.session_id, err.index, err.error
                );
            }
        }
    }

    if report.invalid_events > 0 {
        Err(ProfileCliError::ValidationFailed(report.invalid_events))
    } else {
        Ok(())
    }
}

fn cmd_exercises(json: bool) -> Result<(), ProfileCliError> {
    let exercises: Vec<ExerciseInfo> = ExerciseId::ALL
        .iter()
        .map(|e| ExerciseInfo {
            exercise_id: e.as_str().to_string(),
            function_name: e.function_name().to_string(),
            test_cases: e.test_case_count(),
            description: e.description().to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&exercises)?);
    } else {
        println!("Code exercises");
        println!("==============");
        for exercise in &exercises {
            println!(
                "  {} ({} tests): {}",
                exercise.exercise_id, exercise.test_cases, exercise.description
            );
        }
    }

    Ok(())
}

fn cmd_doctor(data_file: &Path, json: bool) -> Result<(), ProfileCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Engine version {}", ENGINE_VERSION),
    });

    if data_file.exists() {
        match JsonFileEventStore::new(data_file).load_all() {
            Ok(records) => checks.push(DoctorCheck {
                name: "event_store".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Event store {} readable ({} records)",
                    data_file.display(),
                    records.len()
                ),
            }),
            Err(e) => checks.push(DoctorCheck {
                name: "event_store".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read event store: {}", e),
            }),
        }
    } else {
        checks.push(DoctorCheck {
            name: "event_store".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Event store {} does not exist yet (created on first record)",
                data_file.display()
            ),
        });
    }

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
            message: "stdin is a pipe (record from stdin ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("cprofile Doctor Report");
        println!("======================");
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
        Err(ProfileCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_events(input: &Path, input_format: InputFormat) -> Result<Vec<Event>, ProfileCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let events = match input_format {
        InputFormat::Ndjson => EventRecordAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => EventRecordAdapter::parse_array(&input_data)?,
    };
    Ok(events)
}

fn format_summary(summary: &Summary, format: &OutputFormat) -> Result<String, ProfileCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(summary)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(summary)?),
    }
}

// Error types

#[derive(Debug)]
enum ProfileCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoInputEvents,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for ProfileCliError {
    fn from(e: io::Error) -> Self {
        ProfileCliError::Io(e)
    }
}

impl From<ComputeError> for ProfileCliError {
    fn from(e: ComputeError) -> Self {
        ProfileCliError::Compute(e)
    }
}

impl From<serde_json::Error> for ProfileCliError {
    fn from(e: serde_json::Error) -> Self {
        ProfileCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ProfileCliError> for CliError {
    fn from(e: ProfileCliError) -> Self {
        match e {
            ProfileCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ProfileCliError::Compute(ComputeError::NoEventsForSession(session)) => CliError {
                code: "NO_EVENTS".to_string(),
                message: format!("No events found for session '{}'", session),
                hint: Some("Record events for the session before requesting a summary".to_string()),
            },
            ProfileCliError::Compute(e @ ComputeError::InvalidEvent(_)) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'cprofile validate' for details".to_string()),
            },
            ProfileCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure records carry a kind tag or exactly one task field".to_string()),
            },
            ProfileCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ProfileCliError::NoInputEvents => CliError {
                code: "NO_INPUT_EVENTS".to_string(),
                message: "No events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            ProfileCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} events failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            ProfileCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_events: usize,
    valid_events: usize,
    invalid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    session_id: String,
    kind: String,
    error: String,
}

#[derive(serde::Serialize)]
struct ExerciseInfo {
    exercise_id: String,
    function_name: String,
    test_cases: u32,
    description: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
