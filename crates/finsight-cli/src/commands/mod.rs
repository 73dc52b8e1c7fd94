//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `advisor` - Advisor commands (insight, ask, chat)
//! - `core` - Shared utilities (config, advisor client, session loading)
//! - `models` - Supported model listing
//! - `prompts` - Prompt library management commands
//! - `reports` - Summary report
//! - `serve` - Web server command

pub mod advisor;
pub mod core;
pub mod models;
pub mod prompts;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use advisor::*;
pub use self::core::*;
pub use models::*;
pub use prompts::*;
pub use reports::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
