//! MyUI CLI
//!
//! Command-line interface for MyUI operations:
//! - Inspect a user's stored configuration
//! - List base tables and dashboards
//! - Add or remove dashboards, set the UI language
//! - Generate a default config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use myui::config::{generate_default_config, Config};
use myui::graphql::{GraphqlTransport, HasuraClient, MemoryBackend};
use myui::schema::SchemaIntrospector;
use myui::shell::Locale;
use myui::sync::ConfigSyncClient;
use myui::userconfig::UserConfiguration;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "myui-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage MyUI user configurations")]
#[command(long_about = "Reads and appends versions of a user's MyUI configuration\n(dashboards, UI preferences, base tables) through the GraphQL endpoint.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: MYUI_CONFIG or the standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// User id (default: ui.default_user_id)
    #[arg(short, long, global = true)]
    pub user: Option<i64>,

    /// Use an empty in-process backend instead of the GraphQL endpoint
    /// (read-only: nothing written to it outlives the command)
    #[arg(long, global = true)]
    pub memory: bool,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the user's current configuration
    Show,

    /// List base tables exposed by the endpoint
    Tables,

    /// List the user's dashboards
    Dashboards,

    /// Add an empty dashboard
    AddDashboard {
        /// Dashboard name
        name: String,
    },

    /// Remove a dashboard
    RemoveDashboard {
        /// Dashboard name
        name: String,
    },

    /// Set the preferred UI language
    Language {
        /// Locale code (en, nl)
        locale: Locale,
    },

    /// Generate default config file
    InitConfig {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// Whether the command appends a configuration version
    fn is_mutating(&self) -> bool {
        matches!(
            self,
            Commands::AddDashboard { .. }
                | Commands::RemoveDashboard { .. }
                | Commands::Language { .. }
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig { output } = &cli.command {
        return write_default_config(output.as_ref());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    myui::logging::init(&config.logging);

    if cli.memory && cli.command.is_mutating() {
        anyhow::bail!("--memory is read-only: changes would be discarded when the command exits");
    }

    let transport: Arc<dyn GraphqlTransport> = if cli.memory {
        Arc::new(MemoryBackend::new())
    } else {
        Arc::new(
            HasuraClient::new(config.graphql.to_hasura())
                .context("Failed to create GraphQL client")?,
        )
    };
    let sync = ConfigSyncClient::new(Arc::clone(&transport));
    let user_id = cli.user.unwrap_or(config.ui.default_user_id);

    match cli.command {
        Commands::Show => {
            let current = fetch(&sync, user_id).await?;
            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&current)?),
                _ => print_summary(user_id, &current),
            }
        }

        Commands::Tables => {
            let tables = SchemaIntrospector::new(transport)
                .list_base_tables()
                .await
                .context("Failed to list base tables")?;
            print_list("Base tables", &tables, &cli.format)?;
        }

        Commands::Dashboards => {
            let current = fetch(&sync, user_id).await?;
            print_list("Dashboards", &current.dashboard_names(), &cli.format)?;
        }

        Commands::AddDashboard { name } => {
            let mut current = fetch(&sync, user_id).await?;
            let added = current.add_dashboard(&name)?.name.clone();
            persist(&sync, user_id, &current).await?;
            println!("✓ Added dashboard '{}'", added);
        }

        Commands::RemoveDashboard { name } => {
            let mut current = fetch(&sync, user_id).await?;
            let removed = current.remove_dashboard(&name)?;
            persist(&sync, user_id, &current).await?;
            println!(
                "✓ Removed dashboard '{}' ({} elements)",
                removed.name,
                removed.dashboard_elements.len()
            );
        }

        Commands::Language { locale } => {
            let mut current = fetch(&sync, user_id).await?;
            current.set_language(locale.code());
            persist(&sync, user_id, &current).await?;
            println!("✓ Language set to {}", locale);
        }

        // Written above, before any config is loaded
        Commands::InitConfig { .. } => {}
    }

    Ok(())
}

async fn fetch(sync: &ConfigSyncClient, user_id: i64) -> Result<UserConfiguration> {
    sync.fetch_latest(user_id)
        .await
        .with_context(|| format!("Failed to fetch configuration for user {}", user_id))
}

async fn persist(sync: &ConfigSyncClient, user_id: i64, config: &UserConfiguration) -> Result<()> {
    sync.persist(user_id, config)
        .await
        .with_context(|| format!("Failed to store configuration for user {}", user_id))
}

fn write_default_config(output: Option<&PathBuf>) -> Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Config written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn print_summary(user_id: i64, config: &UserConfiguration) {
    println!("User {}", user_id);
    println!("  Language:    {}", config.ui_preferences.language);
    println!("  Base tables: {}", config.base_tables.len());
    for table in &config.base_tables {
        println!(
            "    {:<20} {} columns, ordered by '{}'",
            table.name,
            table.column_names.len(),
            table.ordering.by
        );
    }
    println!("  Dashboards:  {}", config.dashboards.len());
    for dashboard in &config.dashboards {
        println!(
            "    {:<20} {} elements",
            dashboard.name,
            dashboard.dashboard_elements.len()
        );
    }
}

fn print_list(title: &str, items: &[String], format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(items)?),
        _ => {
            println!("{} ({}):", title, items.len());
            for item in items {
                println!("  {}", item);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutating_commands() {
        let cli = Cli::parse_from(["myui-cli", "--memory", "add-dashboard", "Sales"]);
        assert!(cli.memory);
        assert!(cli.command.is_mutating());

        let cli = Cli::parse_from(["myui-cli", "language", "nl"]);
        assert!(cli.command.is_mutating());

        for args in [["myui-cli", "show"], ["myui-cli", "tables"], ["myui-cli", "dashboards"]] {
            assert!(!Cli::parse_from(args).command.is_mutating());
        }
    }
}
