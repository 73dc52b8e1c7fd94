//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Finsight - Personal finance dashboard with an AI advisor
#[derive(Parser)]
#[command(name = "finsight")]
#[command(
    about = "Summarize a finance spreadsheet and ask an AI advisor about it",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.local/share/finsight/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show income, expense, net cash, expense breakdown and monthly trend
    Summary {
        /// Spreadsheet to analyze (.csv or .xlsx)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Ask the advisor for an analysis of the spreadsheet
    Insight {
        /// Spreadsheet to analyze (.csv or .xlsx)
        #[arg(short, long)]
        file: PathBuf,

        /// Model id (see `finsight models`)
        #[arg(short, long)]
        model: Option<String>,

        /// Rows of data included in the prompt
        #[arg(long)]
        preview_rows: Option<usize>,
    },

    /// Ask the advisor a single question about the spreadsheet
    Ask {
        /// Spreadsheet to analyze (.csv or .xlsx)
        #[arg(short, long)]
        file: PathBuf,

        /// Model id (see `finsight models`)
        #[arg(short, long)]
        model: Option<String>,

        /// The question
        question: String,
    },

    /// Chat with the advisor interactively (/reset clears history, /quit exits)
    Chat {
        /// Spreadsheet to analyze (.csv or .xlsx)
        #[arg(short, long)]
        file: PathBuf,

        /// Model id (see `finsight models`)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List supported advisor models
    Models,

    /// Manage advisor prompts
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List prompts and their override status
    List,

    /// Show the content of a prompt
    Show {
        /// Prompt id (financial_insight, advisor_chat)
        id: String,
    },

    /// Print the override directory
    Path,
}
