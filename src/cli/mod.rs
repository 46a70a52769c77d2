//! CLI module for the clause graph query service
//!
//! Provides subcommands for running the service:
//! - `serve`: run the HTTP API server
//! - `ingest`: build the graph and index for one document and exit

pub mod ingest;
pub mod serve;

use clap::{Parser, Subcommand};

/// Clause graph retrieval service for policy document Q&A
#[derive(Parser)]
#[command(name = "cgrag-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Build the clause graph and vector index for a document
    Ingest(ingest::IngestArgs),
}
