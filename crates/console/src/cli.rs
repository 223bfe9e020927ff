// crates/console/src/cli.rs
//! Command-line surface: one subcommand per control-panel action.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default server address — the pipeline server's stock port.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

#[derive(Debug, Parser)]
#[command(
    name = "maskdeck",
    version,
    about = "Console for a remote PDF masking / OCR pipeline"
)]
pub struct Cli {
    /// Base URL of the pipeline server.
    #[arg(
        long,
        global = true,
        env = "MASKDECK_SERVER_URL",
        default_value = DEFAULT_SERVER_URL
    )]
    pub server_url: String,

    /// Override the job polling interval in milliseconds. Fixed for the
    /// life of each job.
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check server connectivity and folder inventory.
    Status,

    /// List the PDFs waiting in the server's source folder.
    Scan,

    /// Start the masking job and follow it to completion.
    Mask,

    /// Start the OCR job and follow it, showing the file being processed.
    Ocr,

    /// Extract personal info and write it as CSV.
    Extract {
        /// Output path (default: dated file name in the current directory).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download the masked-files archive.
    Download {
        /// Output path (default: dated file name in the current directory).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the whole pipeline: scan, mask, ocr, extract, mapping.
    Run,
}
