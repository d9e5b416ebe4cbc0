use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use graph::{compact_dag, render, CommitGraph, GitWalker};
use pipeviz_core::{load_commit_document, load_entity_document, normalize, RenderConfig};
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};

#[derive(Parser)]
#[command(name = "pipeviz")]
#[command(about = "Compact deployment topology and commit history into renderable graphs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Render configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Dot,
}

#[derive(Subcommand)]
enum Commands {
    /// Compact a commit graph document
    Commits {
        /// Path to the `{cgraph, instances}` document
        path: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },
    /// Normalize an infrastructure entity document
    Entities {
        /// Path to the container array document
        path: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },
    /// Compact the history of a local git repository, tracking HEAD
    Git {
        /// Path to the repository
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Number of commits to walk
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },
    /// Show DAG and compaction statistics for a commit graph document
    Stats {
        /// Path to the `{cgraph, instances}` document
        path: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = RenderConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Commits { path, format } => {
            let document = match load_commit_document(&path).await {
                Ok(document) => document,
                Err(e) => {
                    error!(error = %e, "skipping render");
                    return Err(e.into());
                }
            };

            let graph = document
                .compact(&config.canvas())
                .with_context(|| format!("Failed to compact {}", path.display()))?;
            print_commit_graph(&graph, &config, format)?;
        }
        Commands::Entities { path, format } => {
            let containers = match load_entity_document(&path).await {
                Ok(containers) => containers,
                Err(e) => {
                    error!(error = %e, "skipping render");
                    return Err(e.into());
                }
            };

            let graph = normalize(&containers);
            match format {
                Format::Json => println!("{}", graph.to_json()?),
                Format::Dot => print!("{}", graph.to_dot()),
            }
        }
        Commands::Git { path, limit, format } => {
            let walker = open_walker(&path)?;
            let dag = walker.into_dag(limit)?;
            let instances: Vec<_> = walker.head_instance()?.into_iter().collect();

            info!(commits = dag.vertex_count(), "walked repository");
            let graph = compact_dag(&dag, &instances, &config.canvas())?;
            print_commit_graph(&graph, &config, format)?;
        }
        Commands::Stats { path } => {
            let document = load_commit_document(&path).await?;
            let dag = document.dag();
            let stats = dag.stats();

            println!("Repository statistics:");
            println!("  Total commits: {}", stats.total_commits);
            println!("  Total edges: {}", stats.total_edges);
            println!("  Merge commits: {}", stats.merge_commits);
            println!("  Branch points: {}", stats.branch_points);
            println!("  Root commits: {}", stats.root_commits);
            println!("  Leaf commits: {}", stats.leaf_commits);

            let graph = compact_dag(&dag, &document.instances, &config.canvas())?;
            let compacted = graph.stats();

            println!("\nCompacted graph:");
            println!("  Instance nodes: {}", compacted.instance_nodes);
            println!("  Commit nodes: {}", compacted.commit_nodes);
            println!("  Edges: {} ({} anchor)", compacted.edges, compacted.anchor_edges);
            println!("  Summarized commits: {}", compacted.summarized_commits);
        }
    }

    Ok(())
}

fn open_walker(path: &Path) -> Result<GitWalker> {
    let path = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Repository path is not valid UTF-8"))?;
    GitWalker::new(Some(path))
}

fn print_commit_graph(graph: &CommitGraph, config: &RenderConfig, format: Format) -> Result<()> {
    let options = config.render_options();
    match format {
        Format::Json => println!("{}", render::to_json(graph, &options)?),
        Format::Dot => print!("{}", render::to_dot(graph, &options)),
    }
    Ok(())
}
