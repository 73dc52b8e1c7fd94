//! Shared utilities for command implementations
//!
//! - `load_config` - Resolve advisor settings (file, env, .env)
//! - `connect_advisor` - Build the advisor client, failing fast without a key
//! - `resolve_model` - Pick the model from a flag or the config default
//! - `open_session` - Parse a spreadsheet into a fresh session

use std::path::Path;

use anyhow::{Context, Result};
use finsight_core::prompts::PromptLibrary;
use finsight_core::{
    parse_file, AIClient, Advisor, AdvisorBackend, AdvisorConfig, AdvisorModel, RequestBuilder,
    Session,
};

/// Load advisor configuration
pub fn load_config(path: Option<&Path>) -> Result<AdvisorConfig> {
    AdvisorConfig::load(path).context("Failed to load configuration")
}

/// Build the advisor, failing when the API key is missing
pub fn connect_advisor(config: &AdvisorConfig) -> Result<Advisor> {
    let client = AIClient::from_config(config).context("Advisor is not configured")?;
    tracing::debug!(host = %client.host(), model = %client.model(), "Advisor client ready");
    Ok(Advisor::new(client))
}

/// Model from the `--model` flag, else the configured default
pub fn resolve_model(flag: Option<&str>, config: &AdvisorConfig) -> Result<AdvisorModel> {
    match flag {
        Some(id) => id.parse().context("Invalid --model"),
        None => Ok(config.model),
    }
}

/// Parse `file` into a new session using the prompt library
pub fn open_session(file: &Path, preview_rows: usize) -> Result<Session> {
    let builder = RequestBuilder::from_library(&mut PromptLibrary::new())
        .context("Failed to load advisor prompts")?;
    let mut session = Session::new(builder, preview_rows);

    let dataset =
        parse_file(file).with_context(|| format!("Failed to read {}", file.display()))?;
    session.load_dataset(dataset)?;
    Ok(session)
}
