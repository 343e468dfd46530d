//! Provider-neutral chat completion types
//!
//! Messages, parts, tools and schemas as callers build them, plus the
//! [`ChatCompleter`] contract that backend adapters implement. Nothing in
//! this crate knows about a specific provider's wire format.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod completer;
pub mod error;
pub mod message;
pub mod request;
pub mod response;
pub mod schema;
pub mod tool;

pub use completer::ChatCompleter;
pub use error::ChatError;
pub use message::{DataPart, DataReader, Message, MessagePart, Role, ToolCall, ToolResult};
pub use request::ChatCompleteRequest;
pub use response::{ChatCompleteResponse, PartStream, ResponseMetadata, Usage, UsageRecorder};
pub use schema::{Schema, SchemaType};
pub use tool::{Tool, ToolProperties, ToolSchema};
