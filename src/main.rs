use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::metadata::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use class_outcome_series::{build_series, classify, load, project, report, Enrollment};

#[derive(Parser)]
#[command(name = "class-outcome-series")]
#[command(about = "Per-period enrollment outcome statistics for Group Scholar", long_about = None)]
struct Cli {
    /// Log per-offering detail
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SeriesArgs {
    /// Class offerings as a JSON array or an enrollment CSV
    #[arg(long, env = "OUTCOME_SERIES_INPUT")]
    input: PathBuf,
    #[arg(long)]
    subject: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the analytics series for a subject as JSON
    Series {
        #[command(flatten)]
        source: SeriesArgs,
        #[arg(long)]
        pretty: bool,
    },
    /// Print chart records for a subject as JSON
    Chart {
        #[command(flatten)]
        source: SeriesArgs,
        #[arg(long)]
        pretty: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: SeriesArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Classify a single enrollment
    Classify {
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        pre: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        post: f64,
        #[arg(long)]
        failed_by_attendance: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let fmt = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false);
    tracing_subscriber::registry().with(fmt).with(filter).init();
}

fn load_series(source: &SeriesArgs) -> anyhow::Result<Vec<class_outcome_series::AnalyticsEntry>> {
    let offerings = load::offerings_from_path(&source.input)
        .with_context(|| format!("failed to load offerings from {}", source.input.display()))?;
    Ok(build_series(&source.subject, &offerings))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

fn write_report(out: Option<&Path>, report: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, report)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => print!("{report}"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Series { source, pretty } => {
            let series = load_series(&source)?;
            print_json(&series, pretty)?;
        }
        Commands::Chart { source, pretty } => {
            let series = load_series(&source)?;
            print_json(&project(&series), pretty)?;
        }
        Commands::Report { source, out } => {
            let series = load_series(&source)?;
            let report = report::build_report(&source.subject, Utc::now().date_naive(), &series);
            write_report(out.as_deref(), &report)?;
        }
        Commands::Classify {
            pre,
            post,
            failed_by_attendance,
        } => {
            let enrollment = Enrollment {
                student: None,
                pre_final_average: pre,
                post_final_average: post,
                failed_by_attendance,
            };
            match classify(&enrollment) {
                Some(category) => println!("{category}"),
                None => println!("unclassified"),
            }
        }
    }

    Ok(())
}
