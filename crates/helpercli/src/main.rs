// crates/helpercli/src/main.rs

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use helpercore::{HelperDefinition, NodeRole, NoteLevel, WalkEvent, WalkEventKind};
use helpernodes::{
    load_definition, save_definition, Courier, FetchConfig, HelperStore, HttpFetcher, PageFetcher,
    Player,
};
use helperruntime::{Graph, NodeRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "helper")]
#[command(about = "Media helper graph engine", long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a courier definition for a search query
    Run {
        /// Path to courier definition JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Search query seeded into the entry nodes
        #[arg(short, long)]
        query: String,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Find the player for a page URL and print its media binding
    Match {
        /// Page URL
        url: String,

        /// Player definition JSON files, tried in order
        #[arg(short, long = "player", required_unless_present = "store")]
        players: Vec<PathBuf>,

        /// Directory of stored players, tried after any given files
        #[arg(short, long)]
        store: Option<PathBuf>,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Validate a helper definition file
    Validate {
        /// Path to definition JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Create an example courier definition
    Init {
        /// Output file path
        #[arg(short, long, default_value = "courier.json")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct FetchArgs {
    /// Window in which fetches count as recent
    #[arg(long, default_value_t = 1000)]
    recency_ms: u64,

    /// Recent fetches above which a fetch is delayed
    #[arg(long, default_value_t = 3)]
    threshold_wait: usize,

    /// Recent fetches above which fetching is disabled
    #[arg(long, default_value_t = 10)]
    threshold_abort: usize,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[arg(long)]
    user_agent: Option<String>,
}

impl FetchArgs {
    fn config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            recency: Duration::from_millis(self.recency_ms),
            threshold_wait: self.threshold_wait,
            threshold_abort: self.threshold_abort,
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    fn fetcher(&self) -> Result<Arc<dyn PageFetcher>> {
        Ok(Arc::new(HttpFetcher::new(&self.config())?))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match cli.command {
        Commands::Run { file, query, fetch } => {
            run_courier(file, query, fetch).await?;
        }

        Commands::Match { url, players, store, fetch } => {
            match_player(url, players, store, fetch).await?;
        }

        Commands::Validate { file } => {
            validate_definition(file).await?;
        }

        Commands::Nodes => {
            list_nodes();
        }

        Commands::Init { output } => {
            create_example_courier(output).await?;
        }
    }

    Ok(())
}

/// Every node type any helper may use
fn full_registry(fetcher: Arc<dyn PageFetcher>) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    helpernodes::register_all(&mut registry, fetcher);
    helpernodes::register_courier_nodes(&mut registry);
    helpernodes::register_player_nodes(&mut registry);
    registry
}

/// Print walk events as they arrive
fn print_events(mut events: broadcast::Receiver<WalkEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event.kind {
                WalkEventKind::Started { bootstrappers } => {
                    println!("▶️  Walk started from {} bootstrappers", bootstrappers);
                }
                WalkEventKind::NodeStarted { node_id, node_type } => {
                    println!("  ⚡ {} ({})", node_id, node_type);
                }
                WalkEventKind::NodeCompleted { node_id, duration_ms } => {
                    println!("  ✅ {} completed in {}ms", node_id, duration_ms);
                }
                WalkEventKind::NodeWaiting { .. } => {}
                WalkEventKind::NodeFailed { node_id, error } => {
                    println!("  ❌ {} failed: {}", node_id, error);
                }
                WalkEventKind::Note { node_id, level, message } => match level {
                    NoteLevel::Info => println!("     ℹ️  [{}] {}", node_id, message),
                    NoteLevel::Warning => println!("     ⚠️  [{}] {}", node_id, message),
                },
                WalkEventKind::Finished { success, processed, duration_ms } => {
                    if success {
                        println!("✨ Walk processed {} nodes in {}ms", processed, duration_ms);
                    } else {
                        println!("💥 Walk failed after {}ms", duration_ms);
                    }
                }
            }
        }
    })
}

async fn run_courier(file: PathBuf, query: String, fetch: FetchArgs) -> Result<()> {
    let definition = load_definition(&file)
        .await
        .with_context(|| format!("loading {}", file.display()))?;
    let registry = Arc::new(full_registry(fetch.fetcher()?));
    let mut courier = Courier::from_definition(&definition, registry)?;

    println!("🚀 Courier: {} ({} nodes)", courier.name(), courier.graph().len());
    let event_task = print_events(courier.graph().subscribe_events());

    let found = courier.find(&query).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    event_task.abort();
    println!();

    match found? {
        Some(media) => {
            println!("📤 Media URL: {}", media.url);
            if let Some(title) = media.title {
                println!("   Title: {}", title);
            }
        }
        None => println!("No media found for '{}'", query),
    }

    Ok(())
}

async fn match_player(url: String, files: Vec<PathBuf>, store: Option<PathBuf>, fetch: FetchArgs) -> Result<()> {
    let registry = Arc::new(full_registry(fetch.fetcher()?));

    let mut players = Vec::new();
    for file in &files {
        let definition = load_definition(file)
            .await
            .with_context(|| format!("loading {}", file.display()))?;
        players.push(Player::from_definition(&definition, Arc::clone(&registry))?);
    }

    if let Some(dir) = store {
        let stored = HelperStore::new(&dir)
            .all()
            .await
            .with_context(|| format!("reading players from {}", dir.display()))?;
        for (id, definition) in stored {
            match Player::from_definition(&definition, Arc::clone(&registry)) {
                Ok(player) => players.push(player),
                Err(e) => tracing::warn!("Skipping stored player {}: {}", id, e),
            }
        }
    }
    tracing::debug!("Loaded {} players", players.len());

    let Some(index) = Player::select(&players, &url)
        .and_then(|chosen| players.iter().position(|p| std::ptr::eq(p, chosen)))
    else {
        println!("No player applies to {}", url);
        return Ok(());
    };

    let player = &mut players[index];
    println!("🎬 Player: {}", player.name());

    match player.binding(&url).await? {
        Some(binding) => {
            println!("   Media selectors: {}", binding.media_selectors);
            if let Some(ads) = binding.ad_selectors {
                println!("   Ad selectors: {}", ads);
            }
        }
        None => println!("   Player produced no media selectors"),
    }

    Ok(())
}

async fn validate_definition(file: PathBuf) -> Result<()> {
    println!("🔍 Validating definition: {}", file.display());

    let definition = load_definition(&file).await?;
    let mut graph = Graph::new(Arc::new(full_registry(Arc::new(OfflineFetcher))));
    graph.set_dataset(&definition.nodes)?;

    let connections: usize = definition.nodes
        .values()
        .map(|record| record.input.len())
        .sum();
    let entries = graph.nodes().filter(|n| matches!(n.role(), NodeRole::Entry(_))).count();
    let results = graph.nodes().filter(|n| matches!(n.role(), NodeRole::Result(_))).count();

    println!("✅ Definition is valid:");
    println!("   Name: {}", definition.name);
    println!("   Nodes: {}", graph.len());
    println!("   Connections: {}", connections);
    println!("   Entry nodes: {}", entries);
    println!("   Result nodes: {}", results);

    if entries == 0 {
        println!("   ⚠️  no entry node, the helper cannot be seeded");
    }
    if results == 0 {
        println!("   ⚠️  no result node, the helper produces nothing");
    }

    Ok(())
}

fn list_nodes() {
    println!("📦 Available Node Types:");
    println!();

    let registry = full_registry(Arc::new(OfflineFetcher));

    for node_type in registry.list_node_types() {
        if let Some(metadata) = registry.get_metadata(&node_type) {
            println!("  • {} ({})", node_type, metadata.category);
            println!("    {}", metadata.description);
        } else {
            println!("  • {}", node_type);
        }
    }
}

/// Stands in for the network where no walk will run
struct OfflineFetcher;

#[async_trait::async_trait]
impl PageFetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, helpercore::NodeError> {
        Err(helpercore::NodeError::Fetch(format!("offline, not fetching {}", url)))
    }
}

async fn create_example_courier(output: PathBuf) -> Result<()> {
    let mut courier = Courier::new("Example courier", Arc::new(full_registry(Arc::new(OfflineFetcher))));
    let graph = courier.graph_mut();

    let layout = [
        ("request", "request", 0.0),
        ("convert", "encode", 1.0),
        ("string-create", "search", 1.0),
        ("string-join", "address", 2.0),
        ("content", "page", 3.0),
        ("selector", "first-hit", 4.0),
        ("property", "link", 5.0),
        ("property", "label", 5.0),
        ("mediaUrl", "media-url", 6.0),
        ("mediaTitle", "media-title", 6.0),
    ];
    for (row, (node_type, id, column)) in layout.iter().enumerate() {
        graph.create_node_with_id(node_type, *id)?;
        graph.set_position(id, helpercore::Position::new(column * 200.0, row as f64 * 80.0))?;
    }

    graph.set_option("search", "value", "https://example.com/search?q=")?;
    graph.set_option("first-hit", "selectors", "a.result")?;
    graph.set_option("link", "key", "href")?;
    graph.set_option("label", "key", "textContent")?;

    graph.connect("request", "query", "encode", "text")?;
    graph.connect("search", "value", "address", "left")?;
    graph.connect("encode", "result", "address", "right")?;
    graph.connect("address", "result", "page", "url")?;
    graph.connect("page", "root", "first-hit", "root")?;
    graph.connect("first-hit", "found", "link", "target")?;
    graph.connect("first-hit", "found", "label", "target")?;
    graph.connect("link", "value", "media-url", "url")?;
    graph.connect("label", "value", "media-title", "title")?;

    let definition: HelperDefinition = courier.definition();
    save_definition(&output, &definition).await?;

    println!("✨ Created example courier: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  helper run --file {} --query 'big buck bunny'", output.display());

    Ok(())
}
