//! kiln - procedural mesh tool
//!
//! Composes manifest shapes into `.kgeo` geometry files, inspects them,
//! and runs the draw-call batch optimizer over a manifest scene.

mod commands;
mod manifest;
mod shape;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Kiln procedural mesh tool")]
#[command(version)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one .kgeo file per manifest shape
    Compose {
        /// Path to kiln.toml manifest
        #[arg(default_value = "kiln.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print counts, bounds and validity of a .kgeo file
    Inspect {
        /// Input .kgeo file
        input: PathBuf,
    },

    /// Optimize the manifest's objects and report draw calls
    Batch {
        /// Path to kiln.toml manifest
        #[arg(default_value = "kiln.toml")]
        manifest: PathBuf,

        /// Output directory for merged batches (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save each merged batch as batch_<n>.kgeo
        #[arg(long)]
        write_merged: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Commands::Compose { manifest, output } => {
            tracing::info!("Composing shapes from {:?}", manifest);
            let report = commands::compose(&manifest, output.as_deref())?;
            tracing::info!("Wrote {} files", report.written.len());
        }

        Commands::Inspect { input } => {
            let report = commands::inspect(&input)?;
            report.print(&input);
        }

        Commands::Batch {
            manifest,
            output,
            write_merged,
        } => {
            tracing::info!("Batching objects from {:?}", manifest);
            let report = commands::batch(&manifest, output.as_deref(), write_merged)?;
            println!(
                "{} objects, {} draws -> {} draws, {} merged groups",
                report.objects, report.draws_before, report.draws_after, report.merged_groups
            );
            for path in &report.written {
                println!("  {}", path.display());
            }
        }
    }

    Ok(())
}
