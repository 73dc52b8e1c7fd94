//! Finsight CLI - Personal finance dashboard with an AI advisor
//!
//! Usage:
//!   finsight summary --file data.xlsx          Summary, breakdown and monthly trend
//!   finsight insight --file data.xlsx          Advisor analysis of the data
//!   finsight ask --file data.csv "question"    One advisor question
//!   finsight chat --file data.csv              Interactive advisor chat
//!   finsight serve --port 3000                 Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Summary { file } => commands::cmd_summary(&file),
        Commands::Insight {
            file,
            model,
            preview_rows,
        } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_insight(&config, &file, model.as_deref(), preview_rows).await
        }
        Commands::Ask {
            file,
            model,
            question,
        } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_ask(&config, &file, model.as_deref(), &question).await
        }
        Commands::Chat { file, model } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_chat(&config, &file, model.as_deref()).await
        }
        Commands::Models => commands::cmd_models(),
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { id }) => commands::cmd_prompts_show(&id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Serve { port, host } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_serve(&config, &host, port).await
        }
    }
}
