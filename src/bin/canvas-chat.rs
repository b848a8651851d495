//! canvas-chat CLI: assemble conversations from a canvas file.
//!
//! Usage:
//!   canvas-chat assemble <canvas> <node> [--vault dir] [--max-depth n] [--budget n] [--model name]
//!   canvas-chat parents <canvas> <node>
//!   canvas-chat expand <canvas> <node> [--vault dir]
//!   canvas-chat config

use canvas_chat::{
    Canvas, CanvasId, CanvasRegistry, ChatConfig, ChatEngine, NodeContent, NodeId, VaultResolver,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "canvas-chat",
    version,
    about = "Build chat completion requests from canvas notes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log traversal and budget decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct Target {
    /// Path to the .canvas file
    canvas: PathBuf,
    /// ID of the selected note
    node: String,
    /// Vault root for file notes (defaults to the canvas's directory)
    #[arg(long)]
    vault: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the completion request for a note as JSON
    Assemble {
        #[command(flatten)]
        target: Target,
        /// Ancestor levels to include (0 = unlimited)
        #[arg(long)]
        max_depth: Option<usize>,
        /// Input token budget
        #[arg(long)]
        budget: Option<usize>,
        /// Chat model name
        #[arg(long)]
        model: Option<String>,
    },
    /// List the parents of a note in traversal order
    Parents {
        #[command(flatten)]
        target: Target,
    },
    /// Print the expanded text of a template note
    Expand {
        #[command(flatten)]
        target: Target,
    },
    /// Print the effective configuration
    Config,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "canvas_chat=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ChatConfig, String> {
    let result = match path {
        Some(path) => ChatConfig::load(path),
        None => ChatConfig::load_or_default(),
    };
    result.map_err(|e| format!("Failed to load config: {}", e))
}

async fn open_engine(target: &Target, config: ChatConfig) -> Result<ChatEngine, String> {
    let canvas = Canvas::load(&target.canvas)
        .await
        .map_err(|e| format!("Failed to load canvas: {}", e))?;
    let vault = target.vault.clone().unwrap_or_else(|| {
        target
            .canvas
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let registry = Arc::new(CanvasRegistry::new());
    registry.upsert(canvas);
    Ok(ChatEngine::new(registry, Arc::new(VaultResolver::new(vault)), config))
}

fn canvas_id(target: &Target) -> CanvasId {
    CanvasId::from_string(target.canvas.display().to_string())
}

async fn cmd_assemble(engine: &ChatEngine, target: &Target) -> Result<(), String> {
    let node = NodeId::from(target.node.as_str());
    let request = engine
        .request(&canvas_id(target), &node)
        .await
        .map_err(|e| e.to_string())?;
    match request {
        Some(request) => {
            let json = serde_json::to_string_pretty(&request).map_err(|e| e.to_string())?;
            println!("{}", json);
            eprintln!(
                "{} messages, {} tokens",
                request.messages.len(),
                request.budget_used
            );
        }
        None => eprintln!("Nothing to send: the conversation is empty"),
    }
    Ok(())
}

fn cmd_parents(engine: &ChatEngine, target: &Target) -> Result<(), String> {
    let node = NodeId::from(target.node.as_str());
    let parents = engine
        .parents(&canvas_id(target), &node)
        .map_err(|e| e.to_string())?;
    if parents.is_empty() {
        println!("No parents (root note)");
        return Ok(());
    }
    for parent in parents {
        let summary = match &parent.content {
            NodeContent::Text { text } => text.lines().next().unwrap_or("").to_string(),
            NodeContent::File { file, .. } => file.clone(),
            NodeContent::Link { url } => url.clone(),
            NodeContent::Group { label } => label.clone().unwrap_or_default(),
        };
        println!("  {}  ({}, {})  {}", parent.id, parent.x, parent.y, summary);
    }
    Ok(())
}

async fn cmd_expand(engine: &ChatEngine, target: &Target) -> Result<(), String> {
    let node = NodeId::from(target.node.as_str());
    match engine
        .expand_template(&canvas_id(target), &node)
        .await
        .map_err(|e| e.to_string())?
    {
        Some(text) => println!("{}", text),
        None => eprintln!("Note '{}' is not a template or has nothing to fill", target.node),
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Assemble {
            target,
            max_depth,
            budget,
            model,
        } => {
            if let Some(depth) = max_depth {
                config.max_depth = depth;
            }
            if let Some(budget) = budget {
                config.token_budget = budget;
            }
            if let Some(model) = model {
                config.model = model;
            }
            config.validate().map_err(|e| e.to_string())?;
            let engine = open_engine(&target, config).await?;
            cmd_assemble(&engine, &target).await
        }
        Commands::Parents { target } => {
            let engine = open_engine(&target, config).await?;
            cmd_parents(&engine, &target)
        }
        Commands::Expand { target } => {
            let engine = open_engine(&target, config).await?;
            cmd_expand(&engine, &target).await
        }
        Commands::Config => {
            print!("{}", config.to_yaml().map_err(|e| e.to_string())?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
