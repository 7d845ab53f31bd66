//! FinSight CLI - command-line interface to the equity-research backend
//!
//! Provides an interactive chat session plus one-shot commands for uploads,
//! knowledge-base management, and market data.

use clap::{Parser, Subcommand};
use finsight_app::{ChatController, UploadController};
use finsight_client::{ApiClient, ResearchBackend};
use finsight_core::{
    init_logging, ChatMode, DataPreview, FinsightConfig, Message, Role,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Chat with your research documents and live market data")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check backend health and advertised capabilities
    Status,

    /// Interactive chat session
    Chat {
        /// Initial response mode (standard, search, agentic)
        #[arg(short, long, default_value = "standard")]
        mode: String,
    },

    /// Upload a document (csv, xls, xlsx, pdf) to the knowledge base
    Upload {
        /// File to upload
        file: PathBuf,
    },

    /// Search the knowledge base
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,
    },

    /// Show knowledge-base statistics
    Stats,

    /// Clear the knowledge base
    Clear,

    /// Market overview for the backend's watchlist
    Market,

    /// Fetch quote and price history for a symbol
    Quote {
        /// Ticker symbol
        symbol: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FinsightConfig::from_file(path)?,
        None => {
            let default_path = FinsightConfig::default_path();
            if default_path.exists() {
                FinsightConfig::from_file(default_path)?
            } else {
                FinsightConfig::default()
            }
        }
    };

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let client = ApiClient::new(&config.api)?;

    match cli.command {
        Commands::Status => run_status(&client).await,
        Commands::Chat { mode } => run_chat(&client, &config, &mode).await,
        Commands::Upload { file } => run_upload(&client, &file).await,
        Commands::Search { query, limit } => run_search(&client, &query, limit).await,
        Commands::Stats => run_stats(&client).await,
        Commands::Clear => run_clear(&client).await,
        Commands::Market => run_market(&client).await,
        Commands::Quote { symbol } => run_quote(&client, &symbol).await,
    }
}

async fn run_status(client: &ApiClient) -> anyhow::Result<()> {
    let status = client.health().await?;
    let caps = status.capabilities;

    println!("Backend status: {:?}", status.api_status);
    println!("  LLM chat:          {}", check_mark(caps.llm_chat));
    println!("  Retrieval index:   {}", check_mark(caps.retrieval_pipeline));
    println!("  Agentic reasoning: {}", check_mark(caps.agentic_reasoning));
    Ok(())
}

fn check_mark(available: bool) -> &'static str {
    if available {
        "available"
    } else {
        "unavailable"
    }
}

async fn run_chat(
    client: &ApiClient,
    config: &FinsightConfig,
    initial_mode: &str,
) -> anyhow::Result<()> {
    let status = client.health().await?;
    let mut controller = ChatController::new(&status, config.chat.clone());

    match initial_mode.parse::<ChatMode>() {
        Ok(mode) => {
            if !controller.set_mode(mode) {
                println!(
                    "{} mode is not available on this backend, staying in {}",
                    mode,
                    controller.mode()
                );
            }
        }
        Err(e) => println!("{}", e),
    }

    println!("FinSight chat started (mode: {})", controller.mode());
    println!("Type 'help' for commands, 'quit' to exit\n");
    if let Some(welcome) = controller.messages().last() {
        println!("Assistant: {}\n", welcome.content);
    }

    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            "help" | "h" => {
                show_chat_help();
                continue;
            }
            "clear" => {
                controller.clear();
                if let Some(notice) = controller.messages().last() {
                    println!("{}\n", notice.content);
                }
                continue;
            }
            command if command == "mode" || command.starts_with("mode ") => {
                handle_mode_command(&mut controller, command);
                continue;
            }
            _ => {}
        }

        match controller.send_message(client, input).await {
            Ok(_) => {
                if let Some(message) = controller.messages().last() {
                    print_assistant_message(message);
                }
            }
            Err(e) => println!("Error: {}\n", e),
        }
    }

    Ok(())
}

fn handle_mode_command(controller: &mut ChatController, command: &str) {
    let Some(requested) = command.strip_prefix("mode").map(str::trim) else {
        return;
    };

    if requested.is_empty() {
        println!("Current mode: {}\n", controller.mode());
        return;
    }

    match requested.parse::<ChatMode>() {
        Ok(mode) => {
            if controller.set_mode(mode) {
                println!("Switched to {} mode\n", mode);
            } else {
                println!("{} mode is not available on this backend\n", mode);
            }
        }
        Err(e) => println!("{}\n", e),
    }
}

fn print_assistant_message(message: &Message) {
    if message.role != Role::Assistant {
        return;
    }

    println!("Assistant: {}\n", message.content);

    let Some(metadata) = &message.metadata else {
        return;
    };

    if !metadata.plan.is_empty() {
        println!("Plan:");
        for (i, step) in metadata.plan.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    }
    if !metadata.sources.is_empty() {
        println!("Sources:");
        for source in metadata.sources.iter().take(3) {
            println!("  - {}", source);
        }
    }
    if let Some(confidence) = metadata.confidence {
        println!("Confidence: {:.0}%", confidence * 100.0);
    }
    if !metadata.plan.is_empty() || !metadata.sources.is_empty() || metadata.confidence.is_some() {
        println!();
    }
}

fn show_chat_help() {
    println!("Available commands:");
    println!("  help, h        - Show this help message");
    println!("  mode           - Show the current response mode");
    println!("  mode <name>    - Switch mode (standard, search, agentic)");
    println!("  clear          - Reset the conversation");
    println!("  quit, exit, q  - Leave the chat");
    println!("  <message>      - Ask a question\n");
}

async fn run_upload(client: &ApiClient, file: &Path) -> anyhow::Result<()> {
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file.display()))?;

    let bytes = std::fs::read(file)?;
    info!("Read {} bytes from {}", bytes.len(), file.display());

    let mut controller = UploadController::new();
    let outcome = controller.submit(client, file_name, bytes).await?;

    println!("{}", outcome.message);

    match &outcome.preview {
        DataPreview::Tabular(table) => {
            println!(
                "Preview: {} rows x {} columns",
                table.row_count, table.column_count
            );
            for row in table.sample_rows.iter().take(3) {
                println!("  {}", serde_json::Value::Object(row.clone()));
            }
        }
        DataPreview::Document(doc) => {
            println!(
                "Preview: {} words ({} characters)",
                doc.word_count, doc.char_count
            );
            println!("  {}", doc.excerpt);
        }
    }

    if !outcome.charts.is_empty() {
        println!("Charts:");
        for chart in &outcome.charts {
            println!("  - {}", chart.title().unwrap_or("untitled"));
        }
    }

    Ok(())
}

async fn run_search(client: &ApiClient, query: &str, limit: usize) -> anyhow::Result<()> {
    let hits = client.search_documents(query, limit).await?;

    if hits.is_empty() {
        println!("No matching documents found.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{}. [{:.2}] {}",
            i + 1,
            hit.relevance,
            hit.source_name().unwrap_or("unknown source")
        );
        println!("   {}", truncate(&hit.content, 200));
    }

    Ok(())
}

async fn run_stats(client: &ApiClient) -> anyhow::Result<()> {
    let stats = client.index_stats().await?;
    println!(
        "Knowledge base: {} documents, {} chunks",
        stats.document_count, stats.chunk_count
    );
    Ok(())
}

async fn run_clear(client: &ApiClient) -> anyhow::Result<()> {
    if client.clear_index().await? {
        println!("Knowledge base cleared.");
    } else {
        println!("The backend declined to clear the knowledge base.");
    }
    Ok(())
}

async fn run_market(client: &ApiClient) -> anyhow::Result<()> {
    let quotes = client.market_overview().await?;

    let mut symbols: Vec<_> = quotes.keys().collect();
    symbols.sort();

    for symbol in symbols {
        let quote = &quotes[symbol];
        println!(
            "{:<6} {:>10.2} {:>+8.2} ({:>+6.2}%)  {}",
            symbol,
            quote.price,
            quote.change,
            quote.change_percent,
            quote.company_name.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

async fn run_quote(client: &ApiClient, symbol: &str) -> anyhow::Result<()> {
    let report = client.fetch_quote(symbol).await?;

    println!(
        "{}: {:.2} ({:+.2})",
        report.symbol, report.series.latest_price, report.series.price_change
    );
    if let Some(name) = report.info.get("longName").and_then(|v| v.as_str()) {
        println!("  {}", name);
    }
    println!("  {} rows of history", report.series.rows.len());

    let charts = finsight_app::parse_chart_specs(report.charts);
    if !charts.is_empty() {
        println!("Charts:");
        for chart in &charts {
            println!("  - {}", chart.title().unwrap_or("untitled"));
        }
    }

    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
