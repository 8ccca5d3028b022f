//! CLI argument definitions using clap
//!
//! Commands:
//! - nonobvious check [--config <path>]
//! - nonobvious spec [--config <path>] --entity <name>
//! - nonobvious validate [--config <path>] --entity <name>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// nonobvious - immutable, validated domain models
#[derive(Parser, Debug)]
#[command(name = "nonobvious")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load every entity definition and list the entity names
    Check {
        /// Path to configuration file (default: ./nonobvious.json, if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the validation spec of an entity
    Spec {
        /// Path to configuration file (default: ./nonobvious.json, if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Entity name
        #[arg(long)]
        entity: String,
    },

    /// Validate JSON objects read from stdin, one per line
    Validate {
        /// Path to configuration file (default: ./nonobvious.json, if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Entity name
        #[arg(long)]
        entity: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
