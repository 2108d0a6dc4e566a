use anyhow::Result;
use clap::{Parser, Subcommand};
use readwise_reader_mcp::config::{load_config, Config};
use readwise_reader_mcp::mcp::{McpServer, ToolContext, ToolRegistry};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Readwise Reader MCP - expose a Readwise Reader library as MCP tools
#[derive(Parser, Debug)]
#[command(name = "readwise-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Expose a Readwise Reader library as MCP tools", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server (stdio unless --http is given)
    Serve {
        /// Serve JSON-RPC over HTTP instead of stdio
        #[arg(long)]
        http: bool,

        /// Port for HTTP mode
        #[arg(long, short, default_value_t = 3000)]
        port: u16,

        /// Host for HTTP mode
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// List documents
    #[command(alias = "ls")]
    List {
        /// Document location (new, later, shortlist, archive, feed)
        #[arg(long, short)]
        location: Option<String>,

        /// Document category (article, email, rss, highlight, note, pdf, epub, tweet, video)
        #[arg(long, short)]
        category: Option<String>,

        /// Tag name
        #[arg(long, short)]
        tag: Option<String>,

        /// Only documents updated after this ISO 8601 date
        #[arg(long)]
        updated_after: Option<String>,

        /// Only documents saved after this ISO 8601 date (filtered locally)
        #[arg(long)]
        added_after: Option<String>,

        /// Page size
        #[arg(long)]
        limit: Option<u32>,

        /// Continue from this cursor
        #[arg(long)]
        page_cursor: Option<String>,

        /// Include converted plain-text content
        #[arg(long)]
        full_content: bool,

        /// Include raw HTML content
        #[arg(long)]
        html: bool,
    },

    /// Search documents by topic
    #[command(alias = "s")]
    Search {
        /// Search terms; a document matches if any term occurs
        #[arg(required = true)]
        terms: Vec<String>,
    },

    /// List all tags
    Tags,

    /// Print the effective configuration (token redacted)
    Config,
}

impl Commands {
    /// Tool name and arguments for commands that map onto a tool
    fn as_tool_call(&self) -> Option<(&'static str, Value)> {
        match self {
            Commands::List {
                location,
                category,
                tag,
                updated_after,
                added_after,
                limit,
                page_cursor,
                full_content,
                html,
            } => {
                let mut args = Map::new();
                let mut set = |key: &str, value: Option<Value>| {
                    if let Some(value) = value {
                        args.insert(key.to_string(), value);
                    }
                };
                set("location", location.clone().map(Value::from));
                set("category", category.clone().map(Value::from));
                set("tag", tag.clone().map(Value::from));
                set("updatedAfter", updated_after.clone().map(Value::from));
                set("addedAfter", added_after.clone().map(Value::from));
                set("limit", limit.map(Value::from));
                set("pageCursor", page_cursor.clone().map(Value::from));
                set("withFullContent", full_content.then_some(Value::Bool(true)));
                set("withHtmlContent", html.then_some(Value::Bool(true)));
                Some(("readwise_list_documents", Value::Object(args)))
            }
            Commands::Search { terms } => {
                Some(("readwise_topic_search", json!({ "searchTerms": terms })))
            }
            Commands::Tags => Some(("readwise_list_tags", json!({}))),
            Commands::Serve { .. } | Commands::Config => None,
        }
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("readwise_reader_mcp={}", level)),
    );

    // stdout carries MCP traffic in stdio mode
    let json_layer = cli
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!cli.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn serve(config: &Config, http: bool, host: &str, port: u16) -> Result<()> {
    let registry = ToolRegistry::new(ToolContext::from_config(config)?);
    let server = McpServer::new(&registry)?;

    if http {
        let addr = format!("{}:{}", host, port);
        let (bound_addr, handle) = server.run_http(&addr).await?;
        tracing::info!("MCP server listening on {}", bound_addr);

        handle
            .await
            .map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?;
    } else {
        server.run().await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = load_config(cli.config.as_deref())?;
    let command = cli.command.unwrap_or(Commands::Serve {
        http: false,
        port: 3000,
        host: "127.0.0.1".to_string(),
    });

    match command {
        Commands::Serve { http, port, host } => serve(&config, http, &host, port).await?,
        Commands::Config => print!("{}", config.to_redacted_toml()?),
        ref other => {
            let Some((tool, args)) = other.as_tool_call() else {
                return Ok(());
            };
            let registry = ToolRegistry::new(ToolContext::from_config(&config)?);
            let response = registry.call(tool, args).await;
            if response.is_error {
                anyhow::bail!(response.text);
            }
            println!("{}", response.text);
        }
    }

    Ok(())
}
