//! CLI module for Risk Model Serving
//!
//! - `serve`: run the HTTP inference server
//! - `inspect`: validate a model artifact file and print its schema

pub mod inspect;
pub mod serve;

use clap::{Parser, Subcommand};

/// Risk Model Serving - HTTP inference for a cached classifier
#[derive(Parser)]
#[command(name = "risk-model-serving")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the inference server
    Serve,

    /// Validate a model artifact and print its identity and feature schema
    Inspect(inspect::InspectArgs),
}
