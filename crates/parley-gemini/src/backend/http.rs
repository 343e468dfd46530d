use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{Backend, ChatSession, ChunkStream};
use crate::error::GeminiError;
use crate::protocol::{
    Content, ErrorResponse, GenerateContentConfig, GenerateContentRequest, GenerateContentResponse, Part, Role,
};

/// Default Gemini API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Backend speaking the Generative Language REST API over SSE
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

impl HttpBackend {
    /// Create a backend for `base_url` (or the public endpoint)
    ///
    /// `timeout` limits connecting and the wait for each piece of the
    /// response, so long generations keep streaming as long as data arrives.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::InvalidConfig` if the base URL cannot carry
    /// paths or the HTTP client cannot be built.
    pub fn new(api_key: SecretString, base_url: Option<Url>, timeout: Option<Duration>) -> Result<Self, GeminiError> {
        let base_url = match base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| GeminiError::InvalidConfig(e.to_string()))?,
        };

        if base_url.cannot_be_a_base() {
            return Err(GeminiError::InvalidConfig(format!("base URL {base_url} cannot be a base")));
        }

        // Bounds connecting and each read, never the whole streamed body
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.connect_timeout(timeout).read_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GeminiError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Build the `streamGenerateContent` endpoint URL for a model
    fn stream_url(&self, model: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let model = model.trim_start_matches('/');
        if model.contains('/') {
            format!("{base}/{model}:streamGenerateContent?alt=sse")
        } else {
            format!("{base}/models/{model}:streamGenerateContent?alt=sse")
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn create_chat(
        &self,
        model: &str,
        config: GenerateContentConfig,
        history: Vec<Content>,
    ) -> Result<Box<dyn ChatSession>, GeminiError> {
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            url: self.stream_url(model),
            api_key: self.api_key.clone(),
            config,
            history,
        }))
    }
}

struct HttpSession {
    client: Client,
    url: String,
    api_key: SecretString,
    config: GenerateContentConfig,
    history: Vec<Content>,
}

impl ChatSession for HttpSession {
    fn send_stream(self: Box<Self>, parts: Vec<Part>) -> ChunkStream {
        let Self {
            client,
            url,
            api_key,
            config,
            history,
        } = *self;
        let request = GenerateContentRequest::new(config, history, Content::new(Role::User, parts));

        Box::pin(async_stream::try_stream! {
            let response = client
                .post(&url)
                .header(API_KEY_HEADER, api_key.expose_secret())
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "gemini stream request failed");
                    GeminiError::Http(e)
                })?;

            let response = check_status(response).await?;
            let mut events = response.bytes_stream().eventsource();

            while let Some(event) = events.next().await {
                let event = event.map_err(|e| GeminiError::Stream(e.to_string()))?;
                let data = event.data.trim();
                if data.is_empty() {
                    continue;
                }

                let chunk: GenerateContentResponse = serde_json::from_str(data).map_err(|e| {
                    tracing::debug!(error = %e, data = %data, "undecodable gemini SSE chunk");
                    GeminiError::Decode(e)
                })?;
                yield chunk;
            }
        })
    }
}

/// Turn a non-success response into `GeminiError::Status`
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GeminiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    tracing::warn!(status = %status, message = %message, "gemini returned error");
    Err(GeminiError::Status { status, message })
}

/// Message from a Google error body, or the raw body when it is not one
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(response) => response.error.message,
        Err(_) => body.to_owned(),
    }
}
