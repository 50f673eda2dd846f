//! Tablewash CLI - batch workbook perturbation tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablewash::prelude::*;

#[derive(Parser)]
#[command(name = "tablewash")]
#[command(
    author,
    version,
    about = "Write perturbed copies of worksheet-table columns in XLSX workbooks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Perturb every workbook in a directory and write the output copies
    Run {
        /// Directory containing the input .xlsx files
        dir: PathBuf,

        /// Number of perturbed copies to write per workbook
        #[arg(short, long, default_value = "1")]
        copies: usize,

        /// Output suffix counter; the first copy gets the next value
        #[arg(long, default_value = "1001")]
        suffix_start: u32,

        /// Mean of the Gaussian factor distribution
        #[arg(short, long, default_value = "1.0")]
        mean: f64,

        /// Standard deviation of the Gaussian factor distribution
        #[arg(short, long, default_value = "0.02")]
        std_dev: f64,

        /// Seed for the factor stream (default: random)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the sheets, tables, and columns of every workbook in a directory
    Info {
        /// Directory containing the input .xlsx files
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            dir,
            copies,
            suffix_start,
            mean,
            std_dev,
            seed,
        } => run(&dir, copies, suffix_start, mean, std_dev, seed),
        Commands::Info { dir } => show_info(&dir),
    }
}

fn run(
    dir: &PathBuf,
    copies: usize,
    suffix_start: u32,
    mean: f64,
    std_dev: f64,
    seed: Option<u64>,
) -> Result<()> {
    let options = BatchOptions {
        copies_per_file: copies,
        out_suffix_start: suffix_start,
        factor_mean: mean,
        factor_std_dev: std_dev,
        seed,
    };

    let structure = read_structure(dir, options.copies_per_file, options.out_suffix_start)
        .with_context(|| format!("Failed to scan '{}'", dir.display()))?;

    if structure.is_empty() {
        eprintln!("Warning: no .xlsx files found in '{}'", dir.display());
        return Ok(());
    }

    let summary = write_all(&structure, &options)
        .with_context(|| format!("Failed to process '{}'", dir.display()))?;

    eprintln!(
        "Wrote {} file(s): {} cell(s) scaled, {} cell(s) cleared",
        summary.files_written, summary.stats.scaled, summary.stats.cleared
    );

    Ok(())
}

fn show_info(dir: &PathBuf) -> Result<()> {
    let structure = read_structure(dir, 0, 0)
        .with_context(|| format!("Failed to scan '{}'", dir.display()))?;

    if structure.is_empty() {
        eprintln!("Warning: no .xlsx files found in '{}'", dir.display());
        return Ok(());
    }

    for book in &structure.books {
        println!("File: {}", book.input.display());

        for sheet in &book.sheets {
            println!("  Sheet: \"{}\"", sheet.name);

            if sheet.tables.is_empty() {
                println!("    (no tables)");
            }
            for table in &sheet.tables {
                println!("    Table: \"{}\"", table.name);
                for column in &table.columns {
                    println!("      {}", column);
                }
            }
        }
        println!();
    }

    Ok(())
}
