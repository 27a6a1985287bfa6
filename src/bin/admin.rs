//! CLI administration tool for the link registry.
//!
//! Runs registry operations directly against the configured store, without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Apply the schema
//! cargo run --bin admin -- init
//!
//! # Create a link with a generated or custom code
//! cargo run --bin admin -- create https://example.com
//! cargo run --bin admin -- create https://example.com --code abc123
//!
//! # Inspect links
//! cargo run --bin admin -- list
//! cargo run --bin admin -- get abc123
//!
//! # Delete a link
//! cargo run --bin admin -- delete abc123
//!
//! # Check store connectivity
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see `link_registry::config`.

use link_registry::application::services::LinkService;
use link_registry::config;
use link_registry::domain::entities::Link;
use link_registry::infrastructure::persistence::build_repository;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing the link registry.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Prepare the store (idempotent)
    Init,

    /// Create a short link
    Create {
        /// Target URL (http:// or https://)
        url: String,

        /// Custom code, 6-8 alphanumeric characters
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Show one link
    Get { code: String },

    /// List all links, newest first
    List,

    /// Delete a link
    Delete {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check store connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let service = LinkService::new(build_repository(&config)?)
        .with_store_timeout(config.store_timeout());

    match cli.command {
        Commands::Init => {
            service.initialize().await?;
            println!("{}", "✅ Store initialized".green().bold());
        }
        Commands::Create { url, code } => {
            let link = service.create_link(url, code).await?;
            println!("{}", "✅ Link created".green().bold());
            print_link(&link);
        }
        Commands::Get { code } => {
            let link = service.get_link(&code).await?;
            print_link(&link);
        }
        Commands::List => list_links(&service).await?,
        Commands::Delete { code, yes } => delete_link(&service, code, yes).await?,
        Commands::Db {
            action: DbAction::Check,
        } => {
            println!("{}", "🔍 Checking store connection...".bright_blue());
            service.ping().await?;
            println!("{}", "✅ Store connection OK".green().bold());
        }
    }

    Ok(())
}

fn print_link(link: &Link) {
    println!();
    println!("  Code:         {}", link.code.bright_yellow().bold());
    println!("  URL:          {}", link.target_url.cyan());
    println!("  Clicks:       {}", link.clicks.to_string().bright_white());
    println!(
        "  Last clicked: {}",
        link.last_clicked_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string())
            .bright_black()
    );
    println!(
        "  Created:      {}",
        link.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
    println!();
}

/// Prints all links as a table.
///
/// ```text
///   Code      Clicks  Created            URL
///   ──────────────────────────────────────────────────────────
///   abc123    3       2025-01-15 10:30   https://example.com
/// ```
async fn list_links(service: &LinkService) -> Result<()> {
    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    let links = service.list_links().await?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<9} {:<7} {:<18} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<9} {:<7} {:<18} {}",
            link.code.cyan(),
            link.clicks,
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.target_url
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes a link, asking for confirmation unless `--yes` is given.
async fn delete_link(service: &LinkService, code: String, skip_confirm: bool) -> Result<()> {
    let link = service.get_link(&code).await?;
    print_link(&link);

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service.delete_link(&code).await?;
    println!("{}", "✅ Link deleted".green().bold());

    Ok(())
}
