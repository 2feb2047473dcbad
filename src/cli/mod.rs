//! Command-line interface for streamcat.
//!
//! Provides the interactive catalog shell plus a couple of inspection
//! commands for the classification table and the resolved configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;

use crate::config::{self, ResolvedConfig};
use crate::core::Catalog;
use crate::domain::ClassificationTable;

pub mod demo;
pub mod shell;

pub use shell::Shell;

/// streamcat - in-memory streaming catalog
#[derive(Parser, Debug)]
#[command(name = "streamcat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive catalog shell (default)
    Shell {
        /// Preload a sample catalog and a demo administrator
        #[arg(long)]
        demo: bool,
    },

    /// Print the age classification table
    Classifications {
        /// Emit JSON instead of a numbered list
        #[arg(long)]
        json: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command.unwrap_or(Commands::Shell { demo: false }) {
            Commands::Shell { demo } => run_shell(demo).await,
            Commands::Classifications { json } => show_classifications(json),
            Commands::Config => show_config(),
        }
    }
}

/// Build the catalog and hand stdin/stdout to the shell
async fn run_shell(demo: bool) -> Result<()> {
    let cfg = config::config()?;
    let catalog = Arc::new(Catalog::new(cfg.accounts.clone()));

    let notes = demo::bootstrap(&catalog, cfg, demo).context("Failed to prepare catalog")?;

    let shell = Shell::new(
        catalog,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        cfg.session.timeout(),
    )
    .with_banner(notes);

    shell.run().await
}

/// Print the classification table
fn show_classifications(json: bool) -> Result<()> {
    let table = ClassificationTable::global();

    if json {
        let rendered = serde_json::to_string_pretty(table.labels())?;
        println!("{}", rendered);
        return Ok(());
    }

    for (number, label) in table.numbered() {
        println!(
            "{}. {:<8} {:<10} min age {:>2}  {}",
            number,
            label.name,
            label.rating.code(),
            label.min_age,
            label.description
        );
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg: &ResolvedConfig = config::config()?;

    println!("streamcat configuration");
    println!("{}", "=".repeat(40));
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Accounts:");
    println!(
        "  Age range:        {}-{}",
        cfg.accounts.min_age, cfg.accounts.max_age
    );
    println!(
        "  Password length:  {}-{}",
        cfg.accounts.min_password_len, cfg.accounts.max_password_len
    );
    println!("  Default plan:     {}", cfg.accounts.default_plan);
    println!();
    println!("Session:");
    println!("  Idle timeout:     {}s", cfg.session.timeout_seconds);
    println!();
    println!(
        "Bootstrap admin:    {}",
        cfg.admin
            .as_ref()
            .map(|a| a.email.as_str())
            .unwrap_or("(none)")
    );
    println!("Demo catalog:       {}", cfg.seed_demo);

    Ok(())
}
