use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing::info;

mod classify;
mod config;
mod db;
mod engine;
mod error;
mod models;
mod report;
mod store;
mod weighting;

use crate::config::Config;
use crate::engine::Aggregator;
use crate::models::AggregationResult;
use crate::report::LearnerSection;
use crate::store::{MemoryStore, ScoreStore};

const NOT_FOUND_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(name = "weighted-grades")]
#[command(about = "Weighted grade averages for Group Scholar learners", long_about = None)]
struct Cli {
    /// Read score events from a CSV file instead of Postgres (analytics commands only)
    #[arg(long, global = true)]
    from_csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import score events from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Weighted average per class for one learner
    ClassAverages {
        #[arg(long)]
        learner: i64,
        #[arg(long)]
        json: bool,
    },
    /// Overall average across a learner's classes
    LearnerAverage {
        #[arg(long)]
        learner: i64,
        #[arg(long)]
        json: bool,
    },
    /// Average of weighted scores across every learner
    CohortStats {
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long = "learner")]
        learners: Vec<i64>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("groupscholar_weighted_grades=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = connect_for("init-db", cli.from_csv.as_deref()).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect_for("seed", cli.from_csv.as_deref()).await?;
            let inserted = db::seed(&pool).await?;
            println!("Seed data inserted ({inserted} new score events).");
        }
        Commands::Import { csv } => {
            let pool = connect_for("import", cli.from_csv.as_deref()).await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} score events from {}.", csv.display());
        }
        Commands::ClassAverages { learner, json } => {
            let aggregator = open_aggregator(cli.from_csv.as_deref()).await?;
            match aggregator.per_class_averages(learner).await? {
                Some(result) => emit(&AggregationResult::PerClassAverages(result), json)?,
                None => not_found(&format!("No score events found for learner {learner}.")),
            }
        }
        Commands::LearnerAverage { learner, json } => {
            let aggregator = open_aggregator(cli.from_csv.as_deref()).await?;
            match aggregator.overall_average(learner).await? {
                Some(result) => emit(&AggregationResult::LearnerOverallAverage(result), json)?,
                None => not_found(&format!("Learner {learner}'s average not found.")),
            }
        }
        Commands::CohortStats { json } => {
            let aggregator = open_aggregator(cli.from_csv.as_deref()).await?;
            match aggregator.cohort_average().await? {
                Some(result) => emit(&AggregationResult::CohortAverage(result), json)?,
                None => not_found("No score events recorded."),
            }
        }
        Commands::Report { learners, out } => {
            let aggregator = open_aggregator(cli.from_csv.as_deref()).await?;
            let cohort = aggregator.cohort_average().await?;
            let mut sections = Vec::new();
            for learner_id in learners {
                sections.push(LearnerSection {
                    learner_id,
                    per_class: aggregator.per_class_averages(learner_id).await?,
                    overall: aggregator.overall_average(learner_id).await?,
                });
            }

            let report = report::build_report(cohort.as_ref(), &sections);
            std::fs::write(&out, report)?;
            info!(learners = sections.len(), "report generated");
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

/// Schema and import commands always write to Postgres.
fn reject_csv_source(command: &str, from_csv: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = from_csv {
        anyhow::bail!(
            "--from-csv {} cannot be used with {command}, which writes to Postgres",
            path.display()
        );
    }
    Ok(())
}

async fn connect_for(command: &str, from_csv: Option<&Path>) -> anyhow::Result<PgPool> {
    reject_csv_source(command, from_csv)?;
    let config = Config::from_env()?;
    db::connect(&config).await
}

async fn open_aggregator(
    from_csv: Option<&Path>,
) -> anyhow::Result<Aggregator<Box<dyn ScoreStore>>> {
    let store: Box<dyn ScoreStore> = match from_csv {
        Some(path) => Box::new(MemoryStore::from_csv(path)?),
        None => {
            let config = Config::from_env()?;
            let pool = db::connect(&config).await?;
            Box::new(db::PgScoreStore::new(pool, config.fetch_timeout))
        }
    };
    Ok(Aggregator::new(store))
}

fn emit(result: &AggregationResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", report::render_json(result)?);
    } else {
        print!("{}", report::render_text(result));
    }
    Ok(())
}

fn not_found(message: &str) -> ! {
    eprintln!("{message}");
    process::exit(NOT_FOUND_EXIT_CODE);
}
