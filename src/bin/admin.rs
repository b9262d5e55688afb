//! CLI administration tool for shortly.
//!
//! Provides commands for issuing API tokens, managing links as the operator,
//! viewing statistics and checking the database without HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Issue a new API token
//! cargo run --bin admin -- token create "Production API"
//!
//! # Inspect, disable or delete any link
//! cargo run --bin admin -- link show abc123
//! cargo run --bin admin -- link deactivate abc123
//! cargo run --bin admin -- link delete abc123 --yes
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see `shortly::config`). `DATABASE_URL` and
//! `TOKEN_SIGNING_SECRET` are required; `REDIS_URL` lets link commands evict
//! cached redirects.

use shortly::application::services::link_service::short_url;
use shortly::application::services::{AuthService, LinkService, MutationHooks, StatsService};
use shortly::config::{self, Config};
use shortly::domain::repositories::{LinkRepository, StatsRepository, TokenRepository};
use shortly::infrastructure::persistence::{PgLinkRepository, PgStatsRepository, PgTokenRepository};
use shortly::server::{connect_cache, connect_pool};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortly.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage links of any owner
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show service-wide statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Issue a new API token
    Create {
        /// Token name (e.g., "Production API", "Mobile App")
        name: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Link management subcommands. These ignore link ownership.
#[derive(Subcommand)]
enum LinkAction {
    /// Show a link with its click count
    Show { code: String },

    /// Disable a link
    Deactivate { code: String },

    /// Delete a link and its clicks
    Delete {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

/// Repositories over one pool.
struct Repositories {
    links: Arc<dyn LinkRepository>,
    stats: Arc<dyn StatsRepository>,
    tokens: Arc<dyn TokenRepository>,
}

impl Repositories {
    fn new(pool: &PgPool) -> Self {
        let pool = Arc::new(pool.clone());
        Self {
            links: Arc::new(PgLinkRepository::new(pool.clone())),
            stats: Arc::new(PgStatsRepository::new(pool.clone())),
            tokens: Arc::new(PgTokenRepository::new(pool)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    let pool = connect_pool(&config).await?;
    let repos = Repositories::new(&pool);

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &config, &repos).await?,
        Commands::Link { action } => handle_link_action(action, &config, &repos).await?,
        Commands::Stats => handle_stats(&repos, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &repos).await?,
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, config: &Config, repos: &Repositories) -> Result<()> {
    let service = AuthService::new(repos.tokens.clone(), config.token_signing_secret.clone());

    match action {
        TokenAction::Create { name, yes } => create_token(&service, name, yes, config).await,
    }
}

/// Issues a new API token.
///
/// Only the HMAC of the token is stored. The raw token is printed once and
/// cannot be retrieved later.
async fn create_token(
    service: &AuthService<dyn TokenRepository>,
    name: String,
    skip_confirm: bool,
    config: &Config,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();
    println!("  Name: {}", name.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let (token, raw) = service
        .issue(&name)
        .await
        .context("Failed to create token")?;

    println!();
    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!("  Token: {}", raw.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" -d '{{\"url\":\"https://example.com\"}}' {}/api/links",
        raw.bright_yellow(),
        config.base_url
    );
    println!();

    Ok(())
}

/// Dispatches link management commands.
///
/// Mutations go through the same cache hooks as the API, so a deactivated or
/// deleted link stops redirecting immediately.
async fn handle_link_action(action: LinkAction, config: &Config, repos: &Repositories) -> Result<()> {
    let cache = connect_cache(config).await;
    let service = LinkService::new(
        repos.links.clone(),
        MutationHooks::new(cache),
        config.short_code_length,
    );

    match action {
        LinkAction::Show { code } => {
            let details = service.get(None, &code).await?;
            let link = details.link;

            let status = if !link.is_active {
                "DISABLED".red()
            } else if link.is_expired() {
                "EXPIRED".yellow()
            } else {
                "ACTIVE".green()
            };

            println!("{}", "🔗 Link".bright_blue().bold());
            println!();
            println!("  Code:        {}", link.code.cyan());
            println!("  Short URL:   {}", short_url(&config.base_url, &link.code));
            println!("  Destination: {}", link.destination_url.bright_white());
            if let Some(title) = &link.title {
                println!("  Title:       {title}");
            }
            println!("  Status:      {status}");
            if link.password_hash.is_some() {
                println!("  Password:    {}", "required".yellow());
            }
            if !link.tags.is_empty() {
                println!("  Tags:        {}", link.tags.join(", "));
            }
            match link.expires_at {
                Some(at) => println!("  Expires:     {}", at.format("%Y-%m-%d %H:%M")),
                None => println!("  Expires:     {}", "never".bright_black()),
            }
            match link.max_clicks {
                Some(max) => println!("  Clicks:      {} / {max}", details.click_count),
                None => println!("  Clicks:      {}", details.click_count),
            }
            println!(
                "  Created:     {}",
                link.created_at
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
                    .bright_black()
            );
            println!();
        }
        LinkAction::Deactivate { code } => {
            service.deactivate(None, &code).await?;
            println!("{}", format!("✅ Link {code} deactivated").green().bold());
        }
        LinkAction::Delete { code, yes } => {
            let details = service.get(None, &code).await?;

            println!("{}", "🗑️  Delete Link".bright_blue().bold());
            println!();
            println!("  Code:        {}", code.cyan());
            println!("  Destination: {}", details.link.destination_url);
            println!("  Clicks:      {}", details.click_count);
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete this link and all its clicks?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            service.delete(None, &code).await?;
            println!("{}", format!("✅ Link {code} deleted").green().bold());
        }
    }

    Ok(())
}

/// Displays service-wide statistics.
async fn handle_stats(repos: &Repositories, pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let service = StatsService::new(repos.links.clone(), repos.stats.clone());
    let totals = service.totals().await?;

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Links:         {}",
        totals.links.to_string().bright_green().bold()
    );
    println!(
        "  Active links:  {}",
        totals.active_links.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:        {}",
        totals.clicks.to_string().bright_green().bold()
    );
    println!(
        "  Active tokens: {}",
        tokens_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, repos: &Repositories) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            repos.links.ping().await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
    }

    Ok(())
}
