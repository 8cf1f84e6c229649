//! Startup Projection CLI
//!
//! Command-line interface for running projections, comparing scenarios and
//! managing the named-scenario store

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use startup_projection::export::report::{
    document_rows, format_break_even, format_count, format_currency, format_multiple,
    format_percent, format_runway, summary_lines,
};
use startup_projection::export::write_records;
use startup_projection::{ProjectionEngine, RawParameters, ScenarioBatch, ScenarioStore};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "startup_projection")]
#[command(version)]
#[command(about = "Monthly user, revenue, cost and cash projection with investor metrics")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Scenario store file (defaults to $PROJECTION_STORE or scenarios.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Project one parameter set
    Run {
        /// JSON parameter file; missing fields take the default scenario
        #[arg(short, long, conflicts_with = "scenario")]
        params: Option<PathBuf>,

        /// Name of a saved scenario to run instead of a file
        #[arg(short, long)]
        scenario: Option<String>,

        /// Write every monthly record to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print records and summary as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Project several parameter files or saved scenarios side by side
    Compare {
        /// JSON parameter files or saved scenario names
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Manage named scenarios
    Scenario {
        #[command(subcommand)]
        action: ScenarioAction,
    },
}

#[derive(Subcommand, Debug)]
enum ScenarioAction {
    /// Save a parameter file under a name
    Save {
        name: String,
        #[arg(short, long)]
        params: PathBuf,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List saved scenarios
    List,
    /// Print a saved scenario's parameters as JSON
    Show { name: String },
    /// Delete a saved scenario
    Remove { name: String },
}

fn read_params(path: &Path) -> Result<RawParameters> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading parameter file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing parameter file {}", path.display()))
}

fn open_store(path: Option<&PathBuf>) -> Result<ScenarioStore> {
    let path = path.cloned().unwrap_or_else(ScenarioStore::default_path);
    ScenarioStore::open(&path).with_context(|| format!("opening scenario store {}", path.display()))
}

/// Resolve a compare/run input: an existing file path, else a saved scenario name
fn resolve_input(input: &str, store: Option<&PathBuf>) -> Result<RawParameters> {
    let path = Path::new(input);
    if path.exists() {
        return read_params(path);
    }
    let store = open_store(store)?;
    Ok(store.load(input)?.parameters.clone())
}

fn run(raw: RawParameters, csv: Option<PathBuf>, json: bool) -> Result<()> {
    let params = raw.normalize().context("invalid parameters")?;
    let engine = ProjectionEngine::new(params);
    let (result, summary) = engine.run();

    if let Some(path) = csv {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_records(BufWriter::new(file), engine.params(), &result.records)?;
        println!("Monthly records written to: {}", path.display());
    }

    if json {
        let body = serde_json::json!({ "records": result.records, "summary": summary });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("Projection ({} months):", result.len());
    println!(
        "{:>6} {:>10} {:>9} {:>8} {:>12} {:>12} {:>12} {:>14}",
        "Month", "Users", "Paying", "Conv", "Revenue", "Costs", "Net", "Cash"
    );
    println!("{}", "-".repeat(90));
    for index in document_rows(&result.records, &summary.break_even) {
        let row = &result.records[index];
        let marker = if summary.break_even.index() == Some(index) { " <- break-even" } else { "" };
        println!(
            "{:>6} {:>10} {:>9} {:>8} {:>12} {:>12} {:>12} {:>14}{}",
            row.label,
            format_count(row.total_users),
            format_count(row.paying_users),
            format_percent(row.conversion_rate, 2),
            format_currency(row.total_revenue),
            format_currency(row.total_costs),
            format_currency(row.net_income),
            format_currency(row.cash_balance),
            marker,
        );
    }

    println!("\nSummary:");
    for (label, value) in summary_lines(&summary) {
        println!("  {:<20} {}", label, value);
    }
    Ok(())
}

fn compare(inputs: &[String], store: Option<&PathBuf>) -> Result<()> {
    let mut batch = ScenarioBatch::new();
    for input in inputs {
        let raw = resolve_input(input, store)?;
        batch
            .add_raw(input.clone(), &raw)
            .with_context(|| format!("invalid parameters in {}", input))?;
    }

    println!(
        "{:<24} {:>12} {:>12} {:>12} {:>16} {:>10}",
        "Scenario", "Users", "Final ARR", "Break-even", "Runway", "Multiple"
    );
    println!("{}", "-".repeat(92));
    for outcome in batch.run() {
        let s = &outcome.summary;
        println!(
            "{:<24} {:>12} {:>12} {:>12} {:>16} {:>10}",
            outcome.name,
            format_count(s.final_users),
            format_currency(s.final_arr),
            format_break_even(&s.break_even),
            format_runway(&s.runway),
            format_multiple(s.return_multiple),
        );
    }
    Ok(())
}

fn scenario(action: ScenarioAction, store_path: Option<&PathBuf>) -> Result<()> {
    let mut store = open_store(store_path)?;
    match action {
        ScenarioAction::Save { name, params, description } => {
            let raw = read_params(&params)?;
            // Refuse to save input that could never run
            raw.normalize().context("invalid parameters")?;
            store.save(&name, &description, raw)?;
            println!("Saved '{}' to {}", name, store.path().display());
        }
        ScenarioAction::List => {
            if store.is_empty() {
                println!("No saved scenarios in {}", store.path().display());
            }
            for (name, saved) in store.list() {
                println!(
                    "{:<24} {}  {}",
                    name,
                    saved.saved_at.format("%Y-%m-%d %H:%M"),
                    saved.description
                );
            }
        }
        ScenarioAction::Show { name } => {
            let saved = store.load(&name)?;
            println!("{}", serde_json::to_string_pretty(&saved.parameters)?);
        }
        ScenarioAction::Remove { name } => {
            store.remove(&name)?;
            println!("Removed '{}'", name);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let store = args.store.as_ref();

    match args.command {
        Commands::Run { params, scenario, csv, json } => {
            let raw = match (params, scenario) {
                (Some(path), _) => read_params(&path)?,
                (None, Some(name)) => open_store(store)?.load(&name)?.parameters.clone(),
                (None, None) => RawParameters::default(),
            };
            run(raw, csv, json)
        }
        Commands::Compare { inputs } => compare(&inputs, store),
        Commands::Scenario { action } => scenario(action, store),
    }
}
