//! CLI administration tool for cinema-api.
//!
//! Provides commands for managing users, permissions and tokens, and for
//! database checks, without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create a user (password is prompted)
//! cargo run --bin admin -- user create --name "Alice" --email alice@example.com --activated
//!
//! # Activate a user
//! cargo run --bin admin -- user activate alice@example.com
//!
//! # Grant permissions
//! cargo run --bin admin -- user grant alice@example.com movies:read movies:write
//!
//! # List users
//! cargo run --bin admin -- user list
//!
//! # Delete expired tokens
//! cargo run --bin admin -- token purge
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use cinema_api::application::services::PermissionService;
use cinema_api::domain::entities::{MOVIES_READ, MOVIES_WRITE, NewUser};
use cinema_api::domain::repositories::{TokenRepository, UserRepository};
use cinema_api::infrastructure::persistence::{
    DEFAULT_STORE_TIMEOUT, PgPermissionRepository, PgTokenRepository, PgUserRepository,
};
use cinema_api::utils::password::hash_password;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing cinema-api.
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
    /// Manage users and their permissions
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        /// Mark the account as activated right away
        #[arg(long)]
        activated: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Activate an existing user
    Activate { email: String },

    /// Grant permission codes to a user
    Grant {
        email: String,

        /// Permission codes, e.g. movies:read movies:write
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// List all users with their permissions
    List,
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Delete every expired token
    Purge,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let users = Arc::new(PgUserRepository::new(pool.clone(), DEFAULT_STORE_TIMEOUT));
    let permissions = PermissionService::new(Arc::new(PgPermissionRepository::new(
        pool,
        DEFAULT_STORE_TIMEOUT,
    )));

    match action {
        UserAction::Create {
            name,
            email,
            activated,
            yes,
        } => create_user(users, name, email, activated, yes).await,
        UserAction::Activate { email } => activate_user(users, &email).await,
        UserAction::Grant { email, codes } => grant(users, &permissions, &email, codes).await,
        UserAction::List => list_users(users, &permissions).await,
    }
}

/// Creates a user with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for name and email (or use provided)
/// 2. Prompt for the password twice
/// 3. Confirm creation (unless `--yes` flag)
/// 4. Hash the password with Argon2id and store the user
async fn create_user(
    users: Arc<PgUserRepository>,
    name: Option<String>,
    email: Option<String>,
    activated: bool,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Name").interact_text()?,
    };

    let email: String = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };

    let password = Password::new()
        .with_prompt("Password (8-72 bytes)")
        .with_confirmation("Repeat password", "Passwords don't match")
        .interact()?;

    if !(8..=72).contains(&password.len()) {
        anyhow::bail!("Password must be between 8 and 72 bytes long");
    }

    println!();
    println!("{}", "User details:".bright_white().bold());
    println!("  Name:      {}", name.cyan());
    println!("  Email:     {}", email.cyan());
    println!(
        "  Activated: {}",
        if activated { "yes".green() } else { "no".yellow() }
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this user?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let password_hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let user = users
        .insert(NewUser {
            name,
            email,
            password_hash,
            activated,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

    println!();
    println!(
        "{} (id {})",
        "✅ User created successfully!".green().bold(),
        user.id.to_string().bright_white()
    );
    println!();
    println!("{}", "Grant access with:".bright_white());
    println!(
        "  {} admin -- user grant {} {} {}",
        "cargo run --bin".bright_cyan(),
        user.email,
        MOVIES_READ,
        MOVIES_WRITE
    );
    println!();

    Ok(())
}

async fn activate_user(users: Arc<PgUserRepository>, email: &str) -> Result<()> {
    let credentials = users
        .find_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("User not found")?;

    if credentials.user.activated {
        println!("{}", "⚠️  This user is already activated".yellow());
        return Ok(());
    }

    users
        .activate(credentials.user.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to activate user: {}", e))?;

    println!("{}", "✅ User activated".green().bold());

    Ok(())
}

async fn grant(
    users: Arc<PgUserRepository>,
    permissions: &PermissionService<PgPermissionRepository>,
    email: &str,
    codes: Vec<String>,
) -> Result<()> {
    let credentials = users
        .find_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("User not found")?;

    for code in &codes {
        if code != MOVIES_READ && code != MOVIES_WRITE {
            println!("{} {}", "⚠️  Unknown permission, skipped:".yellow(), code);
        }
    }

    permissions
        .grant(credentials.user.id, &codes)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to grant permissions: {}", e))?;

    let granted = permissions
        .get_all_for_user(credentials.user.id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!(
        "{} {}",
        "✅ Permissions now:".green().bold(),
        granted.codes().join(", ").cyan()
    );

    Ok(())
}

/// Lists all users with activation status and permissions.
///
/// # Output Format
///
/// ```text
/// 📋 Users
///
///   ID  Email                          Status     Permissions
///   ──────────────────────────────────────────────────────────────────────
///   1   alice@example.com              ACTIVE     movies:read, movies:write
///   2   bob@example.com                INACTIVE
/// ```
async fn list_users(
    users: Arc<PgUserRepository>,
    permissions: &PermissionService<PgPermissionRepository>,
) -> Result<()> {
    println!("{}", "📋 Users".bright_blue().bold());
    println!();

    let all = users
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if all.is_empty() {
        println!("{}", "  No users found".yellow());
        println!();
        println!(
            "  Create one with: {} admin -- user create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<30} {:<10} {}",
        "ID".bright_white().bold(),
        "Email".bright_white().bold(),
        "Status".bright_white().bold(),
        "Permissions".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for user in &all {
        let status = if user.activated {
            "ACTIVE".green()
        } else {
            "INACTIVE".red()
        };

        let granted = permissions
            .get_all_for_user(user.id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

        println!(
            "  {:<3} {:<30} {:<10} {}",
            user.id.to_string().bright_black(),
            user.email.cyan(),
            status,
            granted.codes().join(", ")
        );
    }

    println!();
    println!("  Total: {}", all.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let repo = PgTokenRepository::new(Arc::new(pool.clone()), DEFAULT_STORE_TIMEOUT);

    match action {
        TokenAction::Purge => {
            let removed = repo
                .purge_expired(Utc::now())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to purge tokens: {}", e))?;

            println!(
                "{} {}",
                "✅ Expired tokens deleted:".green().bold(),
                removed.to_string().bright_white()
            );
        }
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let movies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
                .fetch_one(pool)
                .await?;

            let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Movies:     {}", movies.to_string().bright_green().bold());
            println!("  Users:      {}", users.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}
