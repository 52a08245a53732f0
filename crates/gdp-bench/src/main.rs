//! `gdp-bench`: times the Big-M transformation on synthetic models.

mod artifact;
mod report;
mod scenario;

use clap::{Parser, Subcommand};
use gdp_bigm::{BigMArgs, TransformConfig};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::artifact::{load_records, write_records};
use crate::report::{OutputFormat, Thresholds, compare, emit, summarize};
use crate::scenario::{Scenario, Shape, execute};

const DEFAULT_DISJUNCTIONS: [usize; 4] = [10, 100, 1_000, 10_000];

#[derive(Parser, Debug)]
#[command(author, version, about = "Benchmarks for the GDP Big-M transformation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build and relax synthetic models, writing one JSONL record per stage
    Run(RunArgs),
    /// Summarize a JSONL artifact
    Report {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Compare a candidate artifact against a baseline
    Compare(CompareArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Model shapes, comma separated
    #[arg(long = "scenario", value_enum, value_delimiter = ',', default_value = "flat")]
    scenarios: Vec<Scenario>,

    /// Disjunction counts, comma separated
    #[arg(long, value_delimiter = ',')]
    disjunctions: Option<Vec<usize>>,

    #[arg(long, default_value_t = 2)]
    disjuncts: usize,

    /// Constraints in every disjunct
    #[arg(long, default_value_t = 2)]
    rows: usize,

    /// Global Big-M value; without it coefficients are estimated from bounds
    #[arg(long)]
    big_m: Option<f64>,

    #[arg(long, default_value_t = 1)]
    repetitions: u32,

    /// Artifact path, defaults to `artifacts/bench/<run id>.jsonl`
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Tracing filter such as `gdp_bigm=debug`; falls back to GDP_TRACE
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Parser, Debug)]
struct CompareArgs {
    #[arg(long)]
    baseline: PathBuf,

    #[arg(long)]
    candidate: PathBuf,

    /// Only rows of this stage are compared
    #[arg(long, default_value = "transform")]
    stage: String,

    /// Fail when mean duration grows by more than this percentage
    #[arg(long)]
    max_duration_pct: Option<f64>,

    /// Fail when mean RSS growth rises by more than this percentage
    #[arg(long)]
    max_memory_pct: Option<f64>,

    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

type BoxError = Box<dyn std::error::Error>;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), BoxError> {
    match Cli::parse().command {
        Command::Run(args) => run_benchmarks(args),
        Command::Report { input, format } => emit(format, &summarize(&load_records(&input)?)),
        Command::Compare(args) => run_compare(args),
    }
}

fn run_benchmarks(args: RunArgs) -> Result<(), BoxError> {
    if args.repetitions == 0 {
        return Err(invalid_input("repetitions must be greater than zero"));
    }
    if args.disjuncts < 2 || args.rows == 0 {
        return Err(invalid_input(
            "each disjunction needs at least two disjuncts with one row each",
        ));
    }
    gdp_tools::enable_logging(args.log_level.as_deref())?;

    let run_id = format!(
        "bench_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| std::io::Error::other(err.to_string()))?
            .as_millis()
    );
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("artifacts/bench/{run_id}.jsonl")));

    let config = match args.big_m {
        Some(value) => TransformConfig::new().with_big_m(BigMArgs::global(value)),
        None => TransformConfig::new(),
    };
    let counts = args
        .disjunctions
        .clone()
        .unwrap_or_else(|| DEFAULT_DISJUNCTIONS.to_vec());

    let mut records = Vec::new();
    for &scenario in &args.scenarios {
        for &disjunctions in &counts {
            let shape = Shape {
                disjunctions,
                disjuncts: args.disjuncts,
                rows: args.rows,
            };
            for repetition in 1..=args.repetitions {
                let outcome = execute(scenario, shape, &config)?;
                records.extend(outcome.records(&run_id, scenario, shape, repetition));
            }
        }
    }

    write_records(&output, &records)?;
    match args.format {
        OutputFormat::Table => emit(args.format, &summarize(&records))?,
        _ => emit(args.format, &records)?,
    }
    println!("artifact: {}", output.display());
    Ok(())
}

fn run_compare(args: CompareArgs) -> Result<(), BoxError> {
    let baseline = summarize(&load_records(&args.baseline)?);
    let candidate = summarize(&load_records(&args.candidate)?);
    let rows = compare(&baseline, &candidate, &args.stage);
    if rows.is_empty() {
        return Err(invalid_input(&format!(
            "no scenario/case pairs with stage '{}' in both artifacts",
            args.stage
        )));
    }
    emit(args.format, &rows)?;

    let thresholds = Thresholds {
        duration_pct: args.max_duration_pct,
        memory_pct: args.max_memory_pct,
    };
    let regressions = rows.iter().filter(|row| thresholds.exceeded_by(row)).count();
    if regressions > 0 {
        return Err(invalid_input(&format!(
            "{regressions} row(s) exceed the regression thresholds"
        )));
    }
    Ok(())
}

fn invalid_input(message: &str) -> BoxError {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        message.to_string(),
    ))
}
