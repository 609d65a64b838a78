//! Dyadsum CLI tool for running and checking dyadic rank aggregation.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dyadsum")]
#[command(about = "Dyadic partial sums over rank space", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug events to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Aggregate a JSON input of ranks and weights
    Run(RunArgs),
    /// Generate a random input for benchmarking and testing
    Generate(GenerateArgs),
    /// Check the dyadic result against the brute-force reference
    Verify(VerifyArgs),
}

#[derive(Debug, Parser)]
struct RunArgs {
    /// Input JSON file with "rank" and "weight" arrays (defaults to stdin)
    input: Option<PathBuf>,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    /// Number of observations
    #[arg(value_parser = parse_count)]
    n: usize,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Random seed for reproducible generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Give every observation weight 1 instead of a uniform [0, 1) draw
    #[arg(long)]
    unit_weights: bool,
}

#[derive(Debug, Parser)]
struct VerifyArgs {
    /// Input JSON file with "rank" and "weight" arrays (defaults to stdin)
    input: Option<PathBuf>,

    /// Maximum allowed difference, relative to max(1, |expected|)
    #[arg(short, long, default_value = "1e-9")]
    tolerance: f64,
}

/// Input document: `{"rank": [...], "weight": [...]}`.
#[derive(Debug, Serialize, Deserialize)]
struct Input {
    rank: Vec<usize>,
    weight: Vec<f64>,
}

/// Output document: `{"output": [...]}`.
#[derive(Debug, Serialize, Deserialize)]
struct Output {
    output: Vec<f64>,
}

/// Parse an observation count like "1000", "10k" or "1m" (case insensitive)
fn parse_count(s: &str) -> Result<usize, String> {
    let s = s.trim().to_lowercase();

    if let Ok(n) = s.parse::<usize>() {
        return Ok(n);
    }

    let (num_str, unit) = if let Some(num) = s.strip_suffix('m') {
        (num, 1_000_000)
    } else if let Some(num) = s.strip_suffix('k') {
        (num, 1_000)
    } else {
        return Err(format!(
            "Invalid count: '{}'. Use a number like '1000', '10k' or '1m'",
            s
        ));
    };

    let n = num_str
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("Invalid number in count: '{}'", s))?;
    n.checked_mul(unit)
        .ok_or_else(|| format!("Count too large: '{}'", s))
}

fn read_input(path: Option<&Path>) -> Result<Input> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("Input is not a valid {\"rank\", \"weight\"} document")
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ Wrote {} bytes to {}", text.len(), path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Index and values of the first element differing by more than `tolerance`.
fn first_disagreement(actual: &[f64], expected: &[f64], tolerance: f64) -> Option<(usize, f64, f64)> {
    actual
        .iter()
        .zip(expected)
        .enumerate()
        .find(|&(_, (&a, &e))| {
            a.is_nan() != e.is_nan() || (a - e).abs() > tolerance * e.abs().max(1.0)
        })
        .map(|(i, (&a, &e))| (i, a, e))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => {
            let input = read_input(args.input.as_deref())?;
            let output = dyadsum::aggregate_ranks(&input.rank, &input.weight)?;
            let doc = Output { output };
            let text = if args.pretty {
                serde_json::to_string_pretty(&doc)?
            } else {
                serde_json::to_string(&doc)?
            };
            write_output(args.output.as_deref(), &text)
        }
        Command::Generate(args) => {
            let input = generators::generate(args.n, args.seed, args.unit_weights);
            let text = serde_json::to_string(&input)?;
            write_output(args.output.as_deref(), &text)
        }
        Command::Verify(args) => {
            let input = read_input(args.input.as_deref())?;
            let actual = dyadsum::aggregate_ranks(&input.rank, &input.weight)?;
            let expected = dyadsum::reference::aggregate_naive(&input.rank, &input.weight);

            if let Some((i, a, e)) = first_disagreement(&actual, &expected, args.tolerance) {
                bail!(
                    "Mismatch at index {}: dyadic = {}, reference = {}",
                    i,
                    a,
                    e
                );
            }
            eprintln!("✓ {} outputs agree with the reference", actual.len());
            Ok(())
        }
    }
}

mod generators;
