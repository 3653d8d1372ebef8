#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use ahp_harness::consistency::ConsistencyReport;
use ahp_harness::{
    evaluate, parse_names, priority_vector, AhpConfig, AhpRequest, ComparisonMatrix,
    PriorityVector,
};

#[derive(Parser)]
#[command(name = "ahp", version, about = "Analytic Hierarchy Process CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a criteria → alternatives request from JSON
    Evaluate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Override the request's consistency threshold
        #[arg(long)]
        consistency_threshold: Option<f64>,
        /// Exit with an error if any table fails the consistency check
        #[arg(long)]
        strict: bool,
    },
    /// Priority weights and consistency report for one complete matrix (JSON rows)
    Weights {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = "Matrix")]
        label: String,
        #[arg(long)]
        consistency_threshold: Option<f64>,
    },
    /// Write a request skeleton with every pair at equal importance
    Template {
        /// Criteria names separated by ',', ';' or tab
        #[arg(long)]
        criteria: String,
        /// Alternative names separated by ',', ';' or tab
        #[arg(long)]
        alternatives: String,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Serialize)]
struct WeightsOutput {
    weights: PriorityVector,
    consistency: ConsistencyReport,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            input,
            out,
            consistency_threshold,
            strict,
        } => {
            let req: AhpRequest = read_json(&input)?;
            let config = with_threshold(req.config(), consistency_threshold);
            let hierarchy = req.to_hierarchy()?;
            let outcome = evaluate(&hierarchy, &config)?;
            write_json(&out, &outcome)?;

            for (rank, (name, weight)) in outcome.ranked_alternatives().iter().enumerate() {
                println!("{}. {name}\t{weight:.4}", rank + 1);
            }

            let failed = outcome.consistency_failures();
            if strict && !failed.is_empty() {
                let labels: Vec<&str> = failed.iter().map(|r| r.label.as_str()).collect();
                return Err(format!("failed consistency check: {}", labels.join(", ")).into());
            }
        }
        Commands::Weights {
            input,
            out,
            label,
            consistency_threshold,
        } => {
            let matrix: ComparisonMatrix = read_json(&input)?;
            let config = with_threshold(AhpConfig::default(), consistency_threshold);
            let (weights, consistency) = priority_vector(&matrix, &label, &config)?;
            write_json(
                &out,
                &WeightsOutput {
                    weights,
                    consistency,
                },
            )?;
        }
        Commands::Template {
            criteria,
            alternatives,
            out,
        } => {
            let criteria = parse_names("criteria", &criteria)?;
            let alternatives = parse_names("alternatives", &alternatives)?;
            let req = AhpRequest::template(criteria, alternatives)?;
            write_json(&out, &req)?;
        }
    }

    Ok(())
}

fn with_threshold(mut config: AhpConfig, threshold: Option<f64>) -> AhpConfig {
    if let Some(t) = threshold {
        config.consistency_threshold = t;
    }
    config
}

fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<T, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), std::io::Error> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}
