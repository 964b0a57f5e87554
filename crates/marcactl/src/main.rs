//! Marca control - CLI for the availability determination engine.
//!
//! Thin harness over [`marca_engine::AvailabilityEngine`]; the web funnel
//! consumes the same API.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing::Level;

use marca_common::category::{BusinessType, NizaCategory};
use marca_common::config::EngineConfig;
use marca_common::verdict::AvailabilityVerdict;
use marca_engine::AvailabilityEngine;

#[derive(Parser)]
#[command(name = "marcactl")]
#[command(about = "Preliminary trademark availability screening", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file path (defaults to /etc/marca/config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full availability analysis for a brand
    Check {
        /// Brand name to screen
        marca: String,

        /// Business description for the Niza classification
        #[arg(long)]
        descripcion: String,

        /// Business type: producto or servicio
        #[arg(long, default_value = "servicio")]
        tipo: String,

        /// Emit the raw analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a business description without searching
    Classify {
        /// Business description
        #[arg(long)]
        descripcion: String,

        /// Business type: producto or servicio
        #[arg(long, default_value = "servicio")]
        tipo: String,
    },
}

fn parse_tipo(s: &str) -> Result<BusinessType> {
    BusinessType::parse(s).ok_or_else(|| anyhow!("tipo must be 'producto' or 'servicio', got '{}'", s))
}

fn print_category(category: &NizaCategory) {
    println!("  {}", category.to_string().bold());
    if !category.additional_codes.is_empty() {
        let extra: Vec<String> = category
            .additional_codes
            .iter()
            .map(|c| c.to_string())
            .collect();
        println!("  Clases adicionales: {}", extra.join(", "));
    }
    if !category.note.is_empty() {
        println!("  Nota: {}", category.note.dimmed());
    }
}

fn print_verdict(verdict: AvailabilityVerdict) {
    match verdict {
        AvailabilityVerdict::AvailablePreliminary => {
            println!("  {}", "Sin coincidencias exactas (preliminar)".green().bold());
        }
        AvailabilityVerdict::ConflictFound => {
            println!("  {}", "Posibles conflictos encontrados".yellow().bold());
        }
        AvailabilityVerdict::Inconclusive => {
            println!("  {}", "Resultado no concluyente".yellow().bold());
        }
        AvailabilityVerdict::ConnectionFailure => {
            println!("  {}", "No se pudo consultar el servicio".red().bold());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load_or_default(cli.config.as_deref())?;
    let engine = AvailabilityEngine::new(&config)?;

    match cli.command {
        Commands::Check {
            marca,
            descripcion,
            tipo,
            json,
        } => {
            let tipo = parse_tipo(&tipo)?;
            let analysis = engine.determine(&marca, &descripcion, tipo).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("Marca: {}", marca.bold());
                print_verdict(analysis.verdict);
                print_category(&analysis.category);
            }
        }
        Commands::Classify { descripcion, tipo } => {
            let tipo = parse_tipo(&tipo)?;
            let category = engine.classify(&descripcion, tipo).await;
            print_category(&category);
        }
    }

    Ok(())
}
