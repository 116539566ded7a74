mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::*;
use crudforge_core::GeneratorConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crudforge")]
#[command(about = "Generate CRUD controllers, views and routes from entity metadata")]
#[command(version)]
struct Cli {
    /// Project root containing crudforge.toml and the metadata directory
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a CRUD controller, its views, a test stub and routing for an entity
    Crud(crud::CrudArgs),

    /// Print the normalized fields of an entity as YAML
    Fields {
        /// Entity type name (fully qualified, or its short name when unique)
        entity: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GeneratorConfig::load(&cli.project)
        .with_context(|| format!("Failed to load configuration from {}", cli.project.display()))?;
    logging::init_logging(&config.log_level)?;

    match cli.command {
        Commands::Crud(args) => {
            crud::run(&cli.project, &config, &args)?;
        }
        Commands::Fields { entity } => {
            fields::run(&cli.project, &config, &entity)?;
        }
    }

    Ok(())
}
