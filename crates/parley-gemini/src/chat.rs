//! Chat completion against Gemini

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parley_core::{ChatCompleteRequest, ChatCompleteResponse, ChatCompleter, ChatError, ResponseMetadata};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::backend::Backend;
use crate::convert::{build_history, convert_response_schema, convert_tools, validate_messages};
use crate::error::GeminiError;
use crate::protocol::{Content, GenerateContentConfig, Role};
use crate::stream::reassemble;

/// MIME type requested alongside a response schema
const JSON_MIME_TYPE: &str = "application/json";

/// Gemini model identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatCompleteModel(Cow<'static, str>);

impl ChatCompleteModel {
    pub const GEMINI_2_0_FLASH: Self = Self(Cow::Borrowed("models/gemini-2.0-flash"));
    pub const GEMINI_2_5_FLASH: Self = Self(Cow::Borrowed("models/gemini-2.5-flash"));
    pub const GEMINI_2_5_PRO: Self = Self(Cow::Borrowed("models/gemini-2.5-pro"));

    /// Any other model identifier, e.g. `models/gemini-2.5-flash-lite`
    pub fn custom(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatCompleteModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChatCompleteModel {
    fn from(id: String) -> Self {
        Self::custom(id)
    }
}

/// [`ChatCompleter`] backed by a Gemini model
#[derive(Clone)]
pub struct GeminiChatCompleter {
    backend: Arc<dyn Backend>,
    model: ChatCompleteModel,
}

impl GeminiChatCompleter {
    pub fn new(backend: Arc<dyn Backend>, model: ChatCompleteModel) -> Self {
        Self { backend, model }
    }

    pub const fn model(&self) -> &ChatCompleteModel {
        &self.model
    }

    /// Start a streaming completion
    ///
    /// Returns once the chat session is open. Token usage on the returned
    /// metadata is final only after the part stream has been drained.
    ///
    /// # Errors
    ///
    /// Returns an error wrapping [`GeminiError`] if tools, the response
    /// schema or the conversation cannot be converted, or if the session
    /// cannot be created.
    ///
    /// # Panics
    ///
    /// Panics if the request has no messages or its last message is not from
    /// the user.
    pub async fn chat_complete(
        &self,
        cancel: CancellationToken,
        request: ChatCompleteRequest,
    ) -> Result<ChatCompleteResponse, ChatError> {
        let span = tracing::info_span!(
            "gemini.chat_complete",
            "otel.kind" = "client",
            "ai.model" = %self.model,
            "ai.message_count" = request.messages.len(),
            "ai.temperature" = tracing::field::Empty,
            "ai.has_system_prompt" = tracing::field::Empty,
            "ai.tool_count" = tracing::field::Empty,
            "ai.tools" = tracing::field::Empty,
            "ai.has_response_schema" = tracing::field::Empty,
            "ai.prompt_tokens" = tracing::field::Empty,
            "ai.thoughts_tokens" = tracing::field::Empty,
            "ai.completion_tokens" = tracing::field::Empty,
        );

        validate_messages(&request.messages);

        self.start(cancel, request, span.clone()).instrument(span).await
    }

    async fn start(
        &self,
        cancel: CancellationToken,
        request: ChatCompleteRequest,
        span: Span,
    ) -> Result<ChatCompleteResponse, ChatError> {
        let ChatCompleteRequest {
            messages,
            temperature,
            system,
            tools,
            response_schema,
        } = request;

        let mut config = GenerateContentConfig::default();

        if let Some(temperature) = temperature {
            #[allow(clippy::cast_possible_truncation)]
            let narrowed = temperature as f32;
            config.temperature = Some(narrowed);
            span.record("ai.temperature", temperature);
        }

        if let Some(system) = system {
            config.system_instruction = Some(Content::from_text(system, Role::User));
            span.record("ai.has_system_prompt", true);
        }

        if !tools.is_empty() {
            config.tools = convert_tools(&tools).map_err(|e| failed(GeminiError::Tools(e), "tool conversion failed"))?;

            let mut names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
            names.sort_unstable();
            span.record("ai.tool_count", tools.len());
            span.record("ai.tools", names.join(",").as_str());
        }

        if let Some(schema) = &response_schema {
            let schema = convert_response_schema(schema)
                .map_err(|e| failed(GeminiError::ResponseSchema(e), "response schema conversion failed"))?;
            config.response_mime_type = Some(JSON_MIME_TYPE.to_owned());
            config.response_schema = Some(schema);
            span.record("ai.has_response_schema", true);
        }

        let (history, live) = build_history(messages)
            .await
            .map_err(|e| failed(e, "request assembly failed"))?;

        let session = self
            .backend
            .create_chat(self.model.as_str(), config, history)
            .await
            .map_err(|e| failed(e, "chat session creation failed"))?;

        let (recorder, meta) = ResponseMetadata::channel();
        let parts = reassemble(session.send_stream(live), cancel, recorder, span);

        Ok(ChatCompleteResponse::new(parts, meta))
    }
}

/// Log a setup failure on the current span and convert it
fn failed(error: GeminiError, message: &str) -> ChatError {
    tracing::error!(error = %error, "{message}");
    ChatError::from(error)
}

#[async_trait]
impl ChatCompleter for GeminiChatCompleter {
    async fn chat_complete(
        &self,
        cancel: CancellationToken,
        request: ChatCompleteRequest,
    ) -> Result<ChatCompleteResponse, ChatError> {
        Self::chat_complete(self, cancel, request).await
    }
}
