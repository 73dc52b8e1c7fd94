//! Explicit session state and its command handlers
//!
//! A [`Session`] holds one uploaded dataset and one advisor conversation.
//! Handlers are plain methods: they validate, mutate the session and return a
//! value for the caller to present. The only async step, sending a request,
//! lives in [`crate::advisor::Advisor`].

use tracing::{info, warn};

use crate::advisor::RequestBuilder;
use crate::aggregate;
use crate::ai::{AdvisorModel, AdvisorRequest};
use crate::conversation::Conversation;
use crate::error::{Error, Result};
use crate::ingest;
use crate::models::{DashboardReport, Dataset};

/// A chat request waiting for its reply
///
/// Carries the question so the exchange can be recorded once the reply
/// arrives. Dropping it records nothing.
#[derive(Debug, Clone)]
#[must_use = "pass the pending exchange to Session::complete_exchange"]
pub struct PendingExchange {
    question: String,
    request: AdvisorRequest,
}

impl PendingExchange {
    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn request(&self) -> &AdvisorRequest {
        &self.request
    }
}

/// One user's dataset plus advisor conversation
#[derive(Debug, Clone)]
pub struct Session {
    builder: RequestBuilder,
    preview_limit: usize,
    dataset: Option<Dataset>,
    conversation: Conversation,
}

impl Session {
    pub fn new(builder: RequestBuilder, preview_limit: usize) -> Self {
        Self {
            builder,
            preview_limit,
            dataset: None,
            conversation: Conversation::new(),
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn preview_limit(&self) -> usize {
        self.preview_limit
    }

    /// Parse an uploaded file and make it the active dataset
    ///
    /// On any error the previous dataset stays active. The conversation is
    /// kept across uploads.
    pub fn on_upload(&mut self, file_name: &str, data: &[u8]) -> Result<DashboardReport> {
        let dataset = ingest::parse_upload(file_name, data).map_err(|e| {
            warn!(file = %file_name, error = %e, "Upload rejected");
            e
        })?;
        self.load_dataset(dataset)
    }

    /// Make an already parsed dataset the active one
    ///
    /// A dataset whose totals overflow is rejected and the previous one stays.
    pub fn load_dataset(&mut self, dataset: Dataset) -> Result<DashboardReport> {
        let report = aggregate::dashboard(&dataset)?;
        info!(source = %dataset.source, rows = dataset.len(), "Dataset loaded");
        self.dataset = Some(dataset);
        Ok(report)
    }

    /// Dashboard for the active dataset
    pub fn dashboard(&self) -> Result<DashboardReport> {
        aggregate::dashboard(self.require_dataset()?)
    }

    /// Build the one-shot insight request
    pub fn on_insight(&self, model: AdvisorModel) -> Result<AdvisorRequest> {
        let dataset = self.require_dataset()?;
        Ok(self
            .builder
            .build_insight_request(dataset, self.preview_limit, model))
    }

    /// Build a chat request for `question` against the current history
    pub fn on_ask_question(&self, question: &str, model: AdvisorModel) -> Result<PendingExchange> {
        let dataset = self.require_dataset()?;
        let request = self.builder.build_chat_request(
            dataset,
            &self.conversation,
            question,
            self.preview_limit,
            model,
        )?;
        Ok(PendingExchange {
            question: question.to_string(),
            request,
        })
    }

    /// Record a finished exchange, or leave the history untouched on failure
    pub fn complete_exchange(
        &mut self,
        pending: PendingExchange,
        outcome: Result<String>,
    ) -> Result<String> {
        let reply = outcome?;
        self.conversation
            .record_exchange(pending.question, reply.clone());
        Ok(reply)
    }

    /// Clear the conversation; the dataset stays
    pub fn on_reset_chat(&mut self) {
        self.conversation.reset();
        info!("Chat history cleared");
    }

    fn require_dataset(&self) -> Result<&Dataset> {
        self.dataset.as_ref().ok_or(Error::NoDataset)
    }
}
