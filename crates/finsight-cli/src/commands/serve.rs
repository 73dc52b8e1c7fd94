//! Server command implementation

use anyhow::Result;
use finsight_core::{AdvisorBackend, AdvisorConfig};

use super::connect_advisor;

pub async fn cmd_serve(config: &AdvisorConfig, host: &str, port: u16) -> Result<()> {
    // Fails before binding when the API key is missing
    let advisor = connect_advisor(config)?;

    println!("🚀 Starting Finsight web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!("   Advisor: {} ({})", advisor.client().host(), config.model);
    println!("   Preview rows: {}", config.preview_rows);
    println!();
    println!("   Press Ctrl+C to stop");

    finsight_server::serve(advisor.client().clone(), config.clone(), host, port).await?;

    Ok(())
}
