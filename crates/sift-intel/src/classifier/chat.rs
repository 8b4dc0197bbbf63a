//! Classifier backed by an OpenAI-compatible chat-completions endpoint.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::prompt::{
    briefing_user, intent_user, relevance_user, BRIEFING_SYSTEM, INTENT_SYSTEM, RELEVANCE_SYSTEM,
};
use super::reply::{parse_briefing, parse_intent, parse_relevance};
use super::{Classifier, ClassifierItem, HistoricalHints, IntentIndices};
use crate::error::ClassifierError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Chat-completions classifier.
///
/// Use [`ChatClassifier::new`] for the default endpoint or
/// [`ChatClassifier::with_base_url`] to point at a mock server in tests.
pub struct ChatClassifier {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ChatClassifier {
    /// # Errors
    ///
    /// Returns [`ClassifierError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, ClassifierError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ClassifierError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send one system + user exchange and return the reply text.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        json_reply: bool,
    ) -> Result<String, ClassifierError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
            response_format: json_reply.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        tracing::debug!(model = %self.model, json_reply, "classifier chat request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::UnexpectedStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|source| ClassifierError::Malformed {
                context: "chat completion envelope",
                source,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ClassifierError::EmptyReply)
    }
}

#[async_trait]
impl Classifier for ChatClassifier {
    async fn filter_relevance(
        &self,
        batch: &[ClassifierItem],
        query: &str,
        briefing: &str,
        hints: Option<&HistoricalHints>,
    ) -> Result<BTreeSet<usize>, ClassifierError> {
        let user = relevance_user(batch, query, briefing, hints);
        let raw = self.complete(RELEVANCE_SYSTEM, &user, true).await?;
        parse_relevance(&raw, batch.len())
    }

    async fn categorize_intent(
        &self,
        items: &[ClassifierItem],
        query: &str,
        briefing: &str,
    ) -> Result<IntentIndices, ClassifierError> {
        let user = intent_user(items, query, briefing);
        let raw = self.complete(INTENT_SYSTEM, &user, true).await?;
        parse_intent(&raw, items.len())
    }

    async fn semantic_briefing(&self, query: &str) -> Result<String, ClassifierError> {
        let raw = self
            .complete(BRIEFING_SYSTEM, &briefing_user(query), false)
            .await?;
        parse_briefing(&raw)
    }
}
