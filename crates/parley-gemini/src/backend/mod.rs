//! Gemini chat session seam
//!
//! The chat completer talks to Gemini only through [`Backend`] and
//! [`ChatSession`], so tests and alternative transports can stand in for
//! the HTTP implementation.

mod http;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

pub use self::http::{DEFAULT_BASE_URL, HttpBackend};
use crate::error::GeminiError;
use crate::protocol::{Content, GenerateContentConfig, GenerateContentResponse, Part};

/// Stream of raw response chunks for one send
///
/// Ends when the backend finishes or right after the first error.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, GeminiError>> + Send>>;

/// Opens chat sessions against a model
#[async_trait]
pub trait Backend: Send + Sync {
    /// Bind a session to a model, its generation config and prior turns
    async fn create_chat(
        &self,
        model: &str,
        config: GenerateContentConfig,
        history: Vec<Content>,
    ) -> Result<Box<dyn ChatSession>, GeminiError>;
}

/// A chat session that can send one live user turn
pub trait ChatSession: Send {
    /// Send `parts` as the newest user turn and stream the reply
    ///
    /// Nothing goes over the wire until the returned stream is first polled.
    fn send_stream(self: Box<Self>, parts: Vec<Part>) -> ChunkStream;
}
