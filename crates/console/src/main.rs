// crates/console/src/main.rs
//! maskdeck binary.
//!
//! Parses the CLI, initializes quiet tracing (step UX goes through
//! eprintln and the progress bars, not the log), and dispatches to the
//! command implementations.

mod cli;
mod commands;
mod render;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, Command};
use crate::commands::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet by default; transient poll errors live at debug level and
    // stay invisible unless the subscriber is reconfigured.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    eprintln!("\n\u{1f5c2} maskdeck v{}\n", env!("CARGO_PKG_VERSION"));

    let app = App::new(&cli.server_url, cli.poll_interval_ms);

    match cli.command {
        Command::Status => app.status().await?,
        Command::Scan => {
            app.scan().await?;
        }
        Command::Mask => app.mask().await?,
        Command::Ocr => app.ocr().await?,
        Command::Extract { output } => {
            app.extract(output.as_deref()).await?;
        }
        Command::Download { output } => {
            app.download(output.as_deref()).await?;
        }
        Command::Run => app.run().await?,
    }

    Ok(())
}
