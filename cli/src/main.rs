mod client;
mod cook;
mod render;
mod seed;

use aldente_core::{fetch_repository_or_empty, BlobStoreConfig, RecipeRepository};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aldente")]
#[command(about = "Al Dente CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recipe names in the repository
    List,
    /// Print a recipe's ingredients and steps
    Show {
        /// Recipe name (exact match)
        name: String,
    },
    /// Walk through a recipe interactively
    Cook {
        /// Recipe to select right away; omit to start on the recipe list
        name: Option<String>,
    },
    /// Upload a repository document; its first recipe is appended
    Upload {
        /// Path to a `{"recipes": [...]}` JSON file
        file: PathBuf,
        /// Server URL (default: http://localhost:3000)
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
    },
    /// Upload the bundled sample recipes
    Seed {
        /// Server URL (default: http://localhost:3000)
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
    },
    /// Ping the server (unauthenticated)
    Ping {
        /// Server URL (default: http://localhost:3000)
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            let repository = load_repository().await?;
            if repository.is_empty() {
                println!("No recipes yet.");
            }
            for name in repository.names() {
                println!("{}", name);
            }
        }
        Commands::Show { name } => {
            let repository = load_repository().await?;
            let recipe = repository
                .find(&name)
                .with_context(|| format!("No recipe named {:?}", name))?;
            print!("{}", render::recipe(recipe));
        }
        Commands::Cook { name } => {
            cook::run(name.as_deref()).await?;
        }
        Commands::Upload { file, server } => {
            let document = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let saved = client::save_recipe(&server, &document).await?;
            println!("{} ({})", saved.message, saved.url);
        }
        Commands::Seed { server } => {
            seed::seed(&server).await?;
        }
        Commands::Ping { server } => {
            let message = client::ping(&server).await?;
            println!("{}", message);
        }
    }

    Ok(())
}

/// Read the repository straight from the configured blob store.
pub(crate) async fn load_repository() -> Result<RecipeRepository> {
    let config = BlobStoreConfig::from_env().context("Invalid blob store configuration")?;
    let store = config.build().context("Failed to set up blob store")?;
    tracing::debug!(store = %store.describe(), key = %config.key, "loading repository");
    fetch_repository_or_empty(store.as_ref(), &config.key)
        .await
        .with_context(|| format!("Failed to load recipes from {}", store.describe()))
}
