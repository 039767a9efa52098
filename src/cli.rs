//! CLI argument parsing for the courier-dispatch binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "courier-dispatch", about = "Courier dispatch: delivery import and route planning")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Bulk-import deliveries from a CSV file
    Import {
        /// CSV file with one delivery per row
        file: PathBuf,
        /// Print the summary as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
    /// Write the CSV import template
    Template {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a courier's route as JSON
    Route {
        /// Courier id
        #[arg(long)]
        courier: i64,
        /// Reorder stops shortest first
        #[arg(long)]
        optimize: bool,
    },
    /// Print delivery and courier counters as JSON
    Stats,
}
