//! askdata CLI - Ask questions about a CSV file
//!
//! Usage:
//!   askdata ask <data.csv> <question>
//!   askdata profile <data.csv>
//!   askdata check <data.csv> <plan.json> [--question <text>]
//!   askdata run <data.csv> <plan.json> [--question <text>]
//!   askdata serve [--port <port>]          (with the `server` feature)
//!
//! Examples:
//!   askdata ask sales.csv "which region has the highest revenue?"
//!   askdata run sales.csv plan.json --question "top 5 products"

use askdata::analyst::{Analyst, AnalystOptions, AnalystResponse};
use askdata::config::Settings;
use askdata::dataset::{self, Dataset};
use askdata::execution::execute;
use askdata::oracle::ChatClient;
use askdata::plan;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "askdata")]
#[command(about = "askdata - Ask questions about tabular data in plain language")]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to the standard search locations)
    #[arg(long, global = true, env = "ASKDATA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question about a CSV file
    Ask {
        /// Path to the CSV file
        csv: PathBuf,

        /// The question to answer
        question: String,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show column types and null counts of a CSV file
    Profile {
        /// Path to the CSV file
        csv: PathBuf,
    },

    /// Repair, sanitize and validate a plan without executing it
    Check {
        /// Path to the CSV file
        csv: PathBuf,

        /// Path to the plan JSON
        plan: PathBuf,

        /// Question the plan answers (drives intent detection)
        #[arg(short, long, default_value = "")]
        question: String,
    },

    /// Validate and execute a plan, printing the result table
    Run {
        /// Path to the CSV file
        csv: PathBuf,

        /// Path to the plan JSON
        plan: PathBuf,

        /// Question the plan answers (drives intent detection)
        #[arg(short, long, default_value = "")]
        question: String,
    },

    /// Serve the HTTP API
    #[cfg(feature = "server")]
    Serve {
        /// Address to bind (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("askdata=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Ask {
            csv,
            question,
            json,
        } => cmd_ask(&settings, &csv, &question, json),
        Commands::Profile { csv } => cmd_profile(&settings, &csv),
        Commands::Check {
            csv,
            plan,
            question,
        } => cmd_check(&settings, &csv, &plan, &question),
        Commands::Run {
            csv,
            plan,
            question,
        } => cmd_run(&settings, &csv, &plan, &question),
        #[cfg(feature = "server")]
        Commands::Serve { host, port } => cmd_serve(settings, host, port),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, askdata::config::SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

fn load_dataset(settings: &Settings, csv: &Path) -> Option<Dataset> {
    match dataset::load_path(csv, settings.dataset.inference_options()) {
        Ok(d) => Some(d),
        Err(e) => {
            eprintln!("Error reading '{}': {}", csv.display(), e);
            None
        }
    }
}

fn read_plan_text(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            None
        }
    }
}

fn runtime() -> Option<tokio::runtime::Runtime> {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => Some(rt),
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            None
        }
    }
}

fn build_analyst(settings: &Settings) -> Option<Analyst> {
    match ChatClient::from_settings(&settings.oracle) {
        Ok(client) => {
            Some(Analyst::with_client(client).with_options(AnalystOptions::from_settings(settings)))
        }
        Err(e) => {
            eprintln!("Error configuring oracle: {}", e);
            None
        }
    }
}

fn cmd_ask(settings: &Settings, csv: &Path, question: &str, json: bool) -> ExitCode {
    let Some(dataset) = load_dataset(settings, csv) else {
        return ExitCode::FAILURE;
    };
    let Some(analyst) = build_analyst(settings) else {
        return ExitCode::FAILURE;
    };
    let Some(rt) = runtime() else {
        return ExitCode::FAILURE;
    };

    let response = match rt.block_on(analyst.ask(&dataset, question)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        return print_json(&response);
    }

    println!("{}", response.insight());
    if let AnalystResponse::Analysis { plan, chart, .. } = &response {
        println!();
        println!("Analysis: {}", plan.analysis_type());
        if let Some(chart) = chart {
            match chart.y() {
                Some(y) => println!("Chart: {} of {} by {}", chart.chart_type().as_str(), y, chart.x()),
                None => println!("Chart: {} of {}", chart.chart_type().as_str(), chart.x()),
            }
        }
    }
    ExitCode::SUCCESS
}

fn cmd_profile(settings: &Settings, csv: &Path) -> ExitCode {
    let Some(dataset) = load_dataset(settings, csv) else {
        return ExitCode::FAILURE;
    };

    println!("File: {}", csv.display());
    println!("Rows: {}", dataset.num_rows());
    println!();
    print!("{}", dataset::profile(&dataset));
    ExitCode::SUCCESS
}

fn cmd_check(settings: &Settings, csv: &Path, plan_path: &Path, question: &str) -> ExitCode {
    let Some(dataset) = load_dataset(settings, csv) else {
        return ExitCode::FAILURE;
    };
    let Some(text) = read_plan_text(plan_path) else {
        return ExitCode::FAILURE;
    };

    match plan::prepare(&text, &dataset.column_names(), question) {
        Ok(plan) => {
            println!("✓ Plan is valid");
            print_json(&plan)
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(settings: &Settings, csv: &Path, plan_path: &Path, question: &str) -> ExitCode {
    let Some(dataset) = load_dataset(settings, csv) else {
        return ExitCode::FAILURE;
    };
    let Some(text) = read_plan_text(plan_path) else {
        return ExitCode::FAILURE;
    };

    let plan = match plan::prepare(&text, &dataset.column_names(), question) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    match execute(&dataset, &plan) {
        Ok(output) => {
            print!("{}", output.result);
            println!();
            println!(
                "{} row(s), {} after filtering",
                output.result.num_rows(),
                output.filtered.num_rows()
            );
            if let Some(chart) = &output.chart {
                if let Ok(spec) = serde_json::to_string(chart) {
                    println!("Chart: {}", spec);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Execution error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "server")]
fn cmd_serve(settings: Settings, host: Option<String>, port: Option<u16>) -> ExitCode {
    use askdata::web::{serve, AppState};

    let mut server = settings.server.clone();
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }

    let Some(analyst) = build_analyst(&settings) else {
        return ExitCode::FAILURE;
    };
    let Some(rt) = runtime() else {
        return ExitCode::FAILURE;
    };

    let state = AppState::new(analyst, settings.dataset.inference_options());
    let addr = server.address();
    println!("askdata server");
    println!("   URL: http://{}", addr);
    println!();
    println!("   Press Ctrl+C to stop");

    match rt.block_on(serve(state, &addr)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}
