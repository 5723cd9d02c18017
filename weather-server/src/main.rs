//! Binary crate for the `weather-server` HTTP facade.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Exposing the core dispatcher over HTTP

use clap::Parser;

mod cli;
mod error;
mod http;
mod telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; keys may come from the real environment.
    let _ = dotenv::dotenv();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
