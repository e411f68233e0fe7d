//! gsod-query CLI - compile weather requests to SQL
//!
//! Usage:
//!   gsod-query compile --start <date> --end <date> --metrics <list> [filters] [--dialect <dialect>]
//!   gsod-query compile --request <file.json|->
//!   gsod-query validate --request <file.json|->
//!   gsod-query metrics
//!
//! Examples:
//!   gsod-query compile --start 2024-01-01 --end 2024-01-07 --metrics temp,prcp --state CA
//!   gsod-query compile --start 2024-01-01 --end 2024-12-31 --metrics temp --country US --aggregation monthly --dialect postgres
//!   echo '{"start_date":"2024-01-01","end_date":"2024-01-31","metrics":["temp"]}' | gsod-query compile --request - --output json

use clap::{Args, Parser, Subcommand, ValueEnum};
use gsod_query::compile::{compile, CompileOptions, MAX_ROWS_LIMIT};
use gsod_query::config::Settings;
use gsod_query::request::{Metric, RawRequest};
use gsod_query::sql::Dialect;
use gsod_query::validation::validate;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gsod-query")]
#[command(about = "gsod-query - Build SQL for NOAA GSOD daily weather data")]
#[command(version)]
struct Cli {
    /// Path to a gsod-query.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a request to SQL
    Compile {
        #[command(flatten)]
        request: RequestArgs,

        /// SQL dialect to generate (overrides config)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Row cap (overrides config)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_ROWS_LIMIT))]
        max_rows: Option<u64>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Validate a request and print its normalized form
    Validate {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// List the metrics that can be requested
    Metrics,
}

/// A request, either as a JSON document or as individual flags.
#[derive(Args)]
struct RequestArgs {
    /// JSON request file (`-` for stdin)
    #[arg(
        short,
        long,
        conflicts_with_all = [
            "start", "end", "metrics", "country", "state", "station", "aggregation",
            "metric_aggregation",
        ]
    )]
    request: Option<PathBuf>,

    /// First day, YYYY-MM-DD
    #[arg(long, required_unless_present = "request")]
    start: Option<String>,

    /// Last day, YYYY-MM-DD (inclusive)
    #[arg(long, required_unless_present = "request")]
    end: Option<String>,

    /// Comma-separated metrics, e.g. temp,prcp
    #[arg(short, long, value_delimiter = ',', required_unless_present = "request")]
    metrics: Vec<String>,

    /// Two-letter country code
    #[arg(long)]
    country: Option<String>,

    /// Two-letter state code
    #[arg(long)]
    state: Option<String>,

    /// Station identifier (USAF)
    #[arg(long)]
    station: Option<String>,

    /// none, daily, weekly or monthly
    #[arg(short, long)]
    aggregation: Option<String>,

    /// avg, min or max
    #[arg(long)]
    metric_aggregation: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Bigquery,
    Duckdb,
    Postgres,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Bigquery => Dialect::BigQuery,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Postgres => Dialect::Postgres,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL only
    Sql,
    /// Output the compiled query as JSON
    Json,
    /// Output SQL with comments
    Verbose,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            request,
            dialect,
            max_rows,
            output,
        } => cmd_compile(cli.config, request, dialect, max_rows, output),
        Commands::Validate { request } => cmd_validate(request),
        Commands::Metrics => cmd_metrics(),
    }
}

fn cmd_compile(
    config: Option<PathBuf>,
    args: RequestArgs,
    dialect: Option<DialectArg>,
    max_rows: Option<u64>,
    output: OutputFormat,
) -> ExitCode {
    let settings = match load_settings(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let raw = match read_request(args) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let request = match validate(&raw) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Invalid request: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut options = CompileOptions::from_settings(&settings);
    if let Some(d) = dialect {
        options = options.with_dialect(d.into());
    }
    if let Some(n) = max_rows {
        options = options.with_max_rows(n);
    }

    let compiled = compile(&request, &options);

    match output {
        OutputFormat::Sql => {
            println!("{}", compiled.sql_text);
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&compiled) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Verbose => {
            println!("-- gsod-query compiled SQL");
            println!("-- Dialect: {}", compiled.dialect);
            println!("-- Join: {}", if compiled.uses_join { "stations" } else { "none" });
            println!("-- Columns: {}", compiled.expected_columns.join(", "));
            println!();
            println!("{}", compiled.sql_text);
        }
    }
    ExitCode::SUCCESS
}

fn cmd_validate(args: RequestArgs) -> ExitCode {
    let raw = match read_request(args) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match validate(&raw) {
        Ok(request) => match serde_json::to_string_pretty(&request) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error serializing request: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Invalid request: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_metrics() -> ExitCode {
    println!("Metrics:");
    for metric in Metric::ALL {
        println!("  - {:<5} {}", metric.column(), metric.description());
    }
    ExitCode::SUCCESS
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings, gsod_query::config::SettingsError> {
    match path {
        Some(p) => Settings::from_file(p),
        None => Settings::load(),
    }
}

fn read_request(args: RequestArgs) -> Result<RawRequest, String> {
    let Some(path) = args.request else {
        return Ok(RawRequest {
            start_date: args.start.unwrap_or_default(),
            end_date: args.end.unwrap_or_default(),
            metrics: args.metrics,
            country: args.country,
            state: args.state,
            station_id: args.station,
            aggregation: args.aggregation,
            metric_aggregation: args.metric_aggregation,
        });
    };

    let source = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Error reading request from stdin: {}", e))?;
        buf
    } else {
        fs::read_to_string(&path)
            .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?
    };

    serde_json::from_str(&source).map_err(|e| format!("Error parsing request JSON: {}", e))
}
