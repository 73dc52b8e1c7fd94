//! Advisor request types
//!
//! These types are backend-agnostic and used across all advisor implementations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::ChatMessage;

/// Chat models the advisor may be pointed at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvisorModel {
    #[default]
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama31Instant,
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama33Versatile,
    #[serde(rename = "mixtral-8x7b-32768")]
    Mixtral8x7b,
}

impl AdvisorModel {
    /// Wire identifier sent in the `model` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llama31Instant => "llama-3.1-8b-instant",
            Self::Llama33Versatile => "llama-3.3-70b-versatile",
            Self::Mixtral8x7b => "mixtral-8x7b-32768",
        }
    }

    /// Every supported model, default first
    pub fn all() -> &'static [AdvisorModel] {
        &[
            Self::Llama31Instant,
            Self::Llama33Versatile,
            Self::Mixtral8x7b,
        ]
    }
}

impl fmt::Display for AdvisorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdvisorModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = Self::all().iter().map(|m| m.as_str()).collect();
                Error::Validation(format!(
                    "Unknown model '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// A fully built chat-completion request
///
/// Built by the request builder without any I/O; a backend turns it into one
/// HTTP call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisorRequest {
    pub model: AdvisorModel,
    pub messages: Vec<ChatMessage>,
}

impl AdvisorRequest {
    pub fn new(model: AdvisorModel, messages: Vec<ChatMessage>) -> Self {
        Self { model, messages }
    }
}
