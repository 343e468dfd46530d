//! Gemini adapter for the Parley chat completion interface
//!
//! Converts neutral requests (messages, tools, response schemas) into
//! Gemini `streamGenerateContent` calls and reassembles the streamed
//! chunks into neutral output parts with token usage.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use futures_util::StreamExt;
//! use parley_core::{ChatCompleteRequest, Message};
//! use parley_gemini::{ChatCompleteModel, ChatCompleterOptions, Client, ClientOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = Client::new(ClientOptions::new("api-key"))?;
//! let completer = client.chat_completer(ChatCompleterOptions {
//!     model: ChatCompleteModel::GEMINI_2_5_FLASH,
//! });
//!
//! let request = ChatCompleteRequest::new(vec![Message::user_text("Hi!")]);
//! let mut response = completer.chat_complete(CancellationToken::new(), request).await?;
//! while let Some(part) = response.parts.next().await {
//!     print!("{}", part?.text());
//! }
//! println!("\n{:?}", response.meta.usage());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod backend;
mod chat;
mod client;
pub mod convert;
mod error;
pub mod protocol;
mod stream;

pub use backend::{Backend, ChatSession, ChunkStream, DEFAULT_BASE_URL, HttpBackend};
pub use chat::{ChatCompleteModel, GeminiChatCompleter};
pub use client::{ChatCompleterOptions, Client, ClientOptions};
pub use error::{GeminiError, SchemaError};
pub use stream::reassemble;
