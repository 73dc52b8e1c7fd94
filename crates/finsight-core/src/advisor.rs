//! Advisor request construction and the end-to-end advisor driver
//!
//! Building a request is pure: it renders a bounded data preview into the
//! prompt templates and never touches the network. [`Advisor`] is the thin
//! async layer that sends a built request and feeds the outcome back into the
//! session.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::ai::{AIClient, AdvisorBackend, AdvisorModel, AdvisorRequest};
use crate::conversation::Conversation;
use crate::error::{Error, Result};
use crate::models::{ChatMessage, Dataset};
use crate::preview::render_preview;
use crate::prompts::{Prompt, PromptId, PromptLibrary};
use crate::session::Session;

/// Rows of data embedded in every advisor prompt
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// Builds insight and chat requests from the prompt library
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    insight: Prompt,
    chat: Prompt,
}

impl RequestBuilder {
    /// Load both advisor prompts, honoring overrides
    ///
    /// Each prompt must carry a `# System` and a `# User` section.
    pub fn from_library(library: &mut PromptLibrary) -> Result<Self> {
        let insight = load_checked(library, PromptId::FinancialInsight)?;
        let chat = load_checked(library, PromptId::AdvisorChat)?;
        Ok(Self { insight, chat })
    }

    /// Builder over the compiled-in prompts only
    pub fn embedded() -> Result<Self> {
        Self::from_library(&mut PromptLibrary::embedded_only())
    }

    /// System persona followed by the preview and the fixed analysis prompt
    pub fn build_insight_request(
        &self,
        dataset: &Dataset,
        preview_limit: usize,
        model: AdvisorModel,
    ) -> AdvisorRequest {
        let preview = render_preview(dataset, preview_limit);

        let mut vars = HashMap::new();
        vars.insert("data_preview", preview.as_str());

        let messages = vec![
            ChatMessage::system(self.insight.system_section().unwrap_or_default()),
            ChatMessage::user(self.insight.render_user(&vars)),
        ];

        debug!(
            model = %model,
            preview_rows = dataset.len().min(preview_limit),
            "Built insight request"
        );
        AdvisorRequest::new(model, messages)
    }

    /// System persona, the prior conversation in order, then the new question
    ///
    /// An empty or whitespace-only question is rejected and nothing is built.
    pub fn build_chat_request(
        &self,
        dataset: &Dataset,
        conversation: &Conversation,
        question: &str,
        preview_limit: usize,
        model: AdvisorModel,
    ) -> Result<AdvisorRequest> {
        if question.trim().is_empty() {
            return Err(Error::Validation("Question must not be empty".into()));
        }

        let preview = render_preview(dataset, preview_limit);

        let mut vars = HashMap::new();
        vars.insert("data_preview", preview.as_str());
        vars.insert("question", question);

        let mut messages = Vec::with_capacity(conversation.len() + 2);
        messages.push(ChatMessage::system(
            self.chat.system_section().unwrap_or_default(),
        ));
        messages.extend(conversation.messages().iter().cloned());
        messages.push(ChatMessage::user(self.chat.render_user(&vars)));

        debug!(
            model = %model,
            history = conversation.len(),
            "Built chat request"
        );
        Ok(AdvisorRequest::new(model, messages))
    }
}

fn load_checked(library: &mut PromptLibrary, id: PromptId) -> Result<Prompt> {
    let prompt = library.get(id)?;
    if prompt.system_section().is_none() || prompt.user_section().is_none() {
        return Err(Error::InvalidData(format!(
            "Prompt {} needs both '# System' and '# User' sections",
            id.as_str()
        )));
    }
    Ok(prompt.clone())
}

/// Sends session requests through an advisor client
#[derive(Clone)]
pub struct Advisor {
    client: AIClient,
}

impl Advisor {
    pub fn new(client: AIClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AIClient {
        &self.client
    }

    /// One-shot analysis of the session's dataset
    ///
    /// Insight replies are not added to the conversation.
    pub async fn insight(&self, session: &Session, model: AdvisorModel) -> Result<String> {
        let request = session.on_insight(model)?;
        let reply = self.client.complete(&request).await?;
        info!(model = %model, "Generated financial insight");
        Ok(reply)
    }

    /// Ask a follow-up question; the exchange is recorded only on success
    pub async fn ask(
        &self,
        session: &mut Session,
        question: &str,
        model: AdvisorModel,
    ) -> Result<String> {
        let pending = session.on_ask_question(question, model)?;
        let outcome = self.client.complete(pending.request()).await;
        if let Err(ref e) = outcome {
            warn!(error = %e, "Advisor exchange failed; conversation unchanged");
        }
        session.complete_exchange(pending, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_csv;
    use crate::models::{Category, Role, TransactionRow};
    use rust_decimal_macros::dec;

    fn dataset() -> Dataset {
        Dataset::new(
            "finance.csv",
            vec![
                TransactionRow::new(Category::Income, dec!(1000)).with_month("Jan"),
                TransactionRow::new(Category::Expense, dec!(200))
                    .with_detail("Food")
                    .with_month("Jan"),
            ],
        )
    }

    #[test]
    fn test_insight_request_shape() {
        let builder = RequestBuilder::embedded().unwrap();
        let request = builder.build_insight_request(&dataset(), 20, AdvisorModel::default());

        assert_eq!(request.model, AdvisorModel::Llama31Instant);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[0].content.contains("finance expert"));
        assert_eq!(request.messages[1].role, Role::User);
        assert!(request.messages[1]
            .content
            .contains(&render_preview(&dataset(), 20)));
        assert!(request.messages[1].content.contains("savings"));
    }

    #[test]
    fn test_insight_request_is_deterministic() {
        let builder = RequestBuilder::embedded().unwrap();
        let a = builder.build_insight_request(&dataset(), 20, AdvisorModel::Mixtral8x7b);
        let b = builder.build_insight_request(&dataset(), 20, AdvisorModel::Mixtral8x7b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_insight_preview_bounded() {
        let many = Dataset::new(
            "many.csv",
            (0..50)
                .map(|i| {
                    TransactionRow::new(Category::Expense, dec!(1))
                        .with_detail(format!("item-{}", i))
                })
                .collect(),
        );
        let builder = RequestBuilder::embedded().unwrap();
        let request = builder.build_insight_request(&many, 20, AdvisorModel::default());

        let user = &request.messages[1].content;
        assert!(user.contains("item-19"));
        assert!(!user.contains("item-20"));
    }

    #[test]
    fn test_chat_request_order() {
        let builder = RequestBuilder::embedded().unwrap();
        let mut conversation = Conversation::new();
        conversation.record_exchange("First?", "First answer.");
        conversation.record_exchange("Second?", "Second answer.");

        let request = builder
            .build_chat_request(
                &dataset(),
                &conversation,
                "Third?",
                20,
                AdvisorModel::Llama33Versatile,
            )
            .unwrap();

        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User
            ]
        );
        assert!(request.messages[0].content.contains("financial advisor"));
        assert_eq!(request.messages[1].content, "First?");
        assert_eq!(request.messages[4].content, "Second answer.");
        assert_eq!(
            request.messages[5].content,
            format!("Data:\n{}\n\nQuestion: Third?", render_preview(&dataset(), 20))
        );
        assert_eq!(request.model, AdvisorModel::Llama33Versatile);
    }

    #[test]
    fn test_requests_carry_every_sheet_column() {
        let csv = "Date,Category,Detail,Amount,Note\n\
                   2024-01-05,Expense,Food,200,weekly shop\n";
        let wide = parse_csv(csv.as_bytes(), "wide.csv").unwrap();
        let builder = RequestBuilder::embedded().unwrap();

        let insight = builder.build_insight_request(&wide, 20, AdvisorModel::default());
        let chat = builder
            .build_chat_request(&wide, &Conversation::new(), "Why?", 20, AdvisorModel::default())
            .unwrap();

        for request in [insight, chat] {
            let user = &request.messages.last().unwrap().content;
            assert!(user.contains("Date Category Detail Amount"));
            assert!(user.contains("2024-01-05"));
            assert!(user.contains("weekly shop"));
        }
    }

    #[test]
    fn test_chat_request_rejects_empty_question() {
        let builder = RequestBuilder::embedded().unwrap();
        let conversation = Conversation::new();

        for question in ["", "   ", "\n\t"] {
            let result = builder.build_chat_request(
                &dataset(),
                &conversation,
                question,
                20,
                AdvisorModel::default(),
            );
            assert!(matches!(result, Err(Error::Validation(_))));
        }
    }

    #[test]
    fn test_builder_rejects_prompt_without_sections() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("advisor_chat.md"),
            "---\nid: advisor_chat\nversion: 2\n---\n\nJust text.",
        )
        .unwrap();

        let mut library = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        assert!(matches!(
            RequestBuilder::from_library(&mut library),
            Err(Error::InvalidData(_))
        ));
    }
}
