//! Memoria CLI
//!
//! Command-line interface for the memory intelligence engine:
//! - Analyze a piece of content
//! - Show a stored memory with its stored analysis
//! - Cluster, chain and query stored memories
//! - Track how a concept evolves over time
//! - Summarize recent memories

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use memoria::analysis::codec;
use memoria::{
    AnalysisResult, Chain, Cluster, Config, EvolutionReport, FusedResult, InMemoryStore,
    LoggingConfig, MemoryCategory, MemoryDetail, MemoryService, Record, Timeframe,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "memoria")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Memory intelligence over short textual memories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Records file, JSON array or CSV (overrides [store] records_path)
    #[arg(short, long, global = true)]
    pub records: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a piece of content
    Analyze {
        /// Text to analyze
        content: String,
        /// Print the versioned storage envelope instead
        #[arg(long)]
        envelope: bool,
        /// Record id stored in the envelope
        #[arg(long, default_value = "adhoc")]
        id: String,
    },

    /// Show a memory and the analysis stored with it
    Show {
        /// Memory id
        id: String,
    },

    /// Cluster memories from a timeframe
    Cluster {
        /// Timeframe (day, week, month)
        #[arg(short, long, default_value = "week")]
        timeframe: String,
        /// Smallest cluster to report
        #[arg(long)]
        min_size: Option<usize>,
        /// Similarity threshold (0.0 - 1.0)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Build an associative chain from a memory
    Chain {
        /// Seed memory id
        id: String,
        /// Links after the seed
        #[arg(short, long)]
        depth: Option<usize>,
        /// Minimum similarity per link
        #[arg(long)]
        min_similarity: Option<f64>,
    },

    /// Query memories by category and content
    Query {
        /// Restrict to a category (e.g. chat_history, tweet_history)
        #[arg(short = 'C', long)]
        category: Option<MemoryCategory>,
        /// Query text
        content: String,
    },

    /// Track a concept over the day, week and month windows
    Evolve {
        /// Concept to track
        concept: String,
    },

    /// Summarize memories from a timeframe
    Summary {
        /// Timeframe (day, week, month)
        #[arg(short, long, default_value = "day")]
        timeframe: String,
        /// Number of memories to include
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(records) = &cli.records {
        config.store.records_path = Some(records.to_string_lossy().to_string());
    }

    init_logging(&config.logging);

    match cli.command {
        Commands::Config { output } => {
            let content = memoria::config::generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing config to {:?}", path))?;
                    println!("Wrote default config to {:?}", path);
                }
                None => print!("{}", content),
            }
        }

        Commands::Analyze {
            content,
            envelope,
            id,
        } => {
            let service = build_service(&config)?;

            if envelope {
                let envelope = service.analyze_envelope(&id, &content);
                println!("{}", codec::encode(&envelope)?);
            } else {
                let analysis = service.analyze(&content);
                emit(cli.format, &analysis, print_analysis)?;
            }
        }

        Commands::Show { id } => {
            let service = build_service(&config)?;

            let detail = service.get_memory(&id).await?;
            emit(cli.format, &detail, print_detail)?;
        }

        Commands::Cluster {
            timeframe,
            min_size,
            threshold,
        } => {
            let service = build_service(&config)?;

            let mut cluster_config = config.engine.cluster;
            if let Some(min_size) = min_size {
                cluster_config.min_size = min_size;
            }
            if let Some(threshold) = threshold {
                cluster_config.threshold = threshold;
            }

            let clusters = service
                .cluster_memories(Timeframe::from_name(&timeframe), &cluster_config)
                .await?;
            emit(cli.format, &clusters, |c| print_clusters(c))?;
        }

        Commands::Chain {
            id,
            depth,
            min_similarity,
        } => {
            let service = build_service(&config)?;

            let mut chain_config = config.engine.chain;
            if let Some(depth) = depth {
                chain_config.depth = depth;
            }
            if let Some(min_similarity) = min_similarity {
                chain_config.min_similarity = min_similarity;
            }

            let chain = service.chain_memories(&id, &chain_config).await?;
            emit(cli.format, &chain, print_chain)?;
        }

        Commands::Query { category, content } => {
            let service = build_service(&config)?;

            let results = service.query_memories(category, &content).await?;
            emit(cli.format, &results, |r| print_query(r))?;
        }

        Commands::Evolve { concept } => {
            let service = build_service(&config)?;

            let report = service.track_evolution(&concept).await?;
            emit(cli.format, &report, print_evolution)?;
        }

        Commands::Summary { timeframe, limit } => {
            let service = build_service(&config)?;

            let limit = limit.unwrap_or(config.engine.summary_limit);
            let summary = service
                .summarize(Timeframe::from_name(&timeframe), limit)
                .await?;
            emit(cli.format, &summary, |s| println!("{}", s))?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber; output goes to stderr
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("memoria={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_service(config: &Config) -> anyhow::Result<MemoryService> {
    let store = match &config.store.records_path {
        Some(path) => InMemoryStore::load_path(path.as_ref())
            .with_context(|| format!("loading records from {}", path))?,
        None => {
            tracing::warn!("No records file configured, starting with an empty store");
            InMemoryStore::new()
        }
    };

    let store = Arc::new(store);
    Ok(MemoryService::new(
        store.clone(),
        store,
        config.engine.clone(),
    ))
}

fn emit<T, F>(format: OutputFormat, value: &T, table: F) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => table(value),
    }
    Ok(())
}

fn print_analysis(analysis: &AnalysisResult) {
    println!("{:<20} {:.4}", "Sentiment", analysis.sentiment);
    println!("{:<20} {}", "Emotional context", analysis.emotional_context);
    println!("{:<20} {:.4}", "Importance", analysis.importance);
    println!("{:<20} {}", "Key concepts", analysis.key_concepts.join(", "));
    println!(
        "{:<20} {}",
        "Patterns",
        analysis
            .patterns
            .iter()
            .map(|p| format!("{:?}", p).to_lowercase())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("{:<20} {}", "Associations", analysis.associations.join(", "));
    println!("{:<20} {}", "Summary", analysis.summary);
}

fn print_detail(detail: &MemoryDetail) {
    let record = &detail.record;
    println!("{:<20} {}", "ID", record.id);
    println!("{:<20} {}", "Category", record.category);
    println!("{:<20} {}", "Created", record.created_at.to_rfc3339());
    println!("{:<20} {}", "Content", record.content);
    println!();

    match &detail.analysis {
        Some(analysis) => print_analysis(analysis),
        None => println!("(no stored analysis)"),
    }
}

fn print_clusters(clusters: &[Cluster]) {
    if clusters.is_empty() {
        println!("No clusters found.");
        return;
    }

    for (idx, cluster) in clusters.iter().enumerate() {
        println!("Cluster {} ({} members): {}", idx + 1, cluster.len(), cluster.centroid);
        for member in &cluster.members {
            println!("  {:<38} {}", member.id, preview(member));
        }
        println!();
    }
}

fn print_chain(chain: &Chain) {
    for (step, record) in chain.records.iter().enumerate() {
        let marker = if step == 0 { "seed" } else { "->" };
        println!("{:<5} {:<38} {}", marker, record.id, preview(record));
    }
}

fn print_query(results: &[FusedResult<Record>]) {
    if results.is_empty() {
        println!("No matching memories.");
        return;
    }

    println!("{:<7} {:<38} {:<18} {}", "Score", "ID", "Category", "Content");
    println!("{}", "-".repeat(90));
    for result in results {
        println!(
            "{:<7.2} {:<38} {:<18} {}",
            result.score,
            result.id,
            result.item.category,
            preview(&result.item)
        );
    }
}

fn print_evolution(report: &BTreeMap<Timeframe, EvolutionReport>) {
    println!("{:<7} {:>9} {:>10}  {}", "Window", "Frequency", "Sentiment", "Related");
    println!("{}", "-".repeat(60));
    for (timeframe, entry) in report {
        let related: Vec<&str> = entry.related_concepts.iter().map(String::as_str).collect();
        println!(
            "{:<7} {:>9} {:>10.4}  {}",
            timeframe.to_string(),
            entry.frequency,
            entry.sentiment,
            related.join(", ")
        );
    }
}

fn preview(record: &Record) -> String {
    memoria::analysis::text::truncate_chars(&record.content, 60)
}
