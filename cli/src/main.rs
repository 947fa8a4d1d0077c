use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use valchain_core::AnySchema;
use valchain_definition::{CheckConfig, CheckMode, DefinitionFormat, DefinitionSet};

/// CLI-specific report format with clap argument parsing support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "valchain", version)]
#[command(about = "Lint schema definitions and check JSON/YAML documents against them")]
struct Cli {
    /// Enable verbose logging on stderr. Repeat for more (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lint and compile one or more definition files.
    Lint(LintArgs),
    /// Check documents against a named schema.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct LintArgs {
    /// Definition files and/or directories containing definition files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Name of the schema to check documents against.
    #[arg(long)]
    schema: String,
    /// Definition file or directory (repeatable).
    #[arg(long = "definitions")]
    definitions: Vec<PathBuf>,
    /// Path to a valchain.yml run configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Report every failing constraint instead of the first.
    #[arg(long)]
    all: bool,
    /// Report format.
    #[arg(long, default_value = "text")]
    format: ReportFormat,
    /// Number of documents checked in parallel (default: from config, else 4).
    #[arg(long)]
    jobs: Option<usize>,
    /// JSON or YAML documents to check.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Lint(args) => run_lint(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_lint(args: LintArgs) -> Result<(), String> {
    let paths = collect_definition_paths(&args.inputs)?;
    let set = DefinitionSet::from_files(&paths).map_err(|e| e.to_string())?;
    let registry = set.compile().map_err(|e| e.to_string())?;
    println!(
        "Validated {} definition file(s) with {} schema(s).",
        paths.len(),
        registry.len()
    );
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let (config, mut definitions) = match &args.config {
        Some(path) => {
            let config = CheckConfig::load(path)
                .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?;
            let definitions = config.definition_paths(path);
            (config, definitions)
        }
        None => (CheckConfig::default(), Vec::new()),
    };
    definitions.extend(args.definitions.iter().cloned());
    if definitions.is_empty() {
        return Err("No definitions given: use --definitions or --config".to_string());
    }

    let mode = if args.all { CheckMode::All } else { config.mode };
    let jobs = args.jobs.unwrap_or(config.jobs);
    if jobs == 0 {
        return Err("--jobs must be at least 1".to_string());
    }

    let paths = collect_definition_paths(&definitions)?;
    let registry = DefinitionSet::from_files(&paths)
        .and_then(|set| set.compile())
        .map_err(|e| e.to_string())?;
    let schema = registry.require(&args.schema).map_err(|e| e.to_string())?;

    info!(
        schema = %args.schema,
        documents = args.inputs.len(),
        jobs,
        mode = mode.as_str(),
        "checking documents"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;
    let results: Vec<DocumentResult> = pool.install(|| {
        args.inputs
            .par_iter()
            .map(|path| check_document(path, &*schema, mode))
            .collect()
    });

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&results)),
        ReportFormat::Json => {
            let report = CheckReport {
                checked_at: chrono::Utc::now().to_rfc3339(),
                schema: &args.schema,
                mode: mode.as_str(),
                results: &results,
            };
            let raw = serde_json::to_string_pretty(&report)
                .map_err(|err| format!("Failed to serialize report: {err}"))?;
            println!("{raw}");
        }
    }

    let failed = results.iter().filter(|result| !result.valid).count();
    if failed > 0 {
        return Err(format!(
            "{failed} of {} document(s) failed validation",
            results.len()
        ));
    }
    Ok(())
}

/// Outcome of checking a single document.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct DocumentResult {
    path: String,
    valid: bool,
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    checked_at: String,
    schema: &'a str,
    mode: &'static str,
    results: &'a [DocumentResult],
}

fn check_document(path: &Path, schema: &dyn AnySchema, mode: CheckMode) -> DocumentResult {
    let errors = match read_document(path) {
        Ok(value) => mode.run(schema, Some(&value)),
        Err(err) => vec![err],
    };
    debug!(path = %path.display(), errors = errors.len(), "checked document");
    DocumentResult {
        path: path.display().to_string(),
        valid: errors.is_empty(),
        errors,
    }
}

fn read_document(path: &Path) -> Result<Value, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    parse_document(path, &raw)
}

/// Parses `raw` as YAML for `.yml`/`.yaml` paths and as JSON otherwise.
fn parse_document(path: &Path, raw: &str) -> Result<Value, String> {
    match DefinitionFormat::from_path(path) {
        Some(DefinitionFormat::Yaml) => serde_yaml::from_str(raw)
            .map_err(|err| format!("Invalid YAML in '{}': {err}", path.display())),
        _ => serde_json::from_str(raw)
            .map_err(|err| format!("Invalid JSON in '{}': {err}", path.display())),
    }
}

fn render_text(results: &[DocumentResult]) -> String {
    let mut out = String::new();
    for result in results {
        let status = if result.valid { "ok" } else { "FAIL" };
        out.push_str(&format!("{status} {}\n", result.path));
        for error in &result.errors {
            out.push_str(&format!("  {error}\n"));
        }
    }
    let failed = results.iter().filter(|result| !result.valid).count();
    out.push_str(&format!(
        "Checked {} document(s), {failed} failed.\n",
        results.len()
    ));
    out
}

/// Expands directories into their definition files (sorted); files are kept
/// as given.
fn collect_definition_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let entries = fs::read_dir(input)
                .map_err(|err| format!("Failed to read directory '{}': {err}", input.display()))?;
            let mut found: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|path| path.is_file() && DefinitionFormat::from_path(path).is_some())
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    if paths.is_empty() {
        return Err("No definition files found".to_string());
    }
    Ok(paths)
}
