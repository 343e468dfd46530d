use std::fmt;
use std::pin::Pin;

use tokio::io::AsyncRead;

/// Role of a message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Role {
    /// The caller
    User,
    /// The model
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Model => f.write_str("model"),
        }
    }
}

/// One turn of a conversation
#[derive(Debug)]
pub struct Message {
    /// Author of the turn
    pub role: Role,
    /// Ordered parts making up the turn
    pub parts: Vec<MessagePart>,
}

impl Message {
    pub const fn new(role: Role, parts: Vec<MessagePart>) -> Self {
        Self { role, parts }
    }

    /// User turn with a single text part
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![MessagePart::Text(text.into())])
    }

    /// Model turn with a single text part
    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![MessagePart::Text(text.into())])
    }

    /// User turn carrying binary data read from `reader`
    pub fn user_data(mime_type: impl Into<String>, reader: impl AsyncRead + Send + 'static) -> Self {
        Self::new(Role::User, vec![MessagePart::Data(DataPart::new(mime_type, reader))])
    }

    /// User turn returning the outcome of a tool call
    pub fn user_tool_result(result: ToolResult) -> Self {
        Self::new(Role::User, vec![MessagePart::ToolResult(result)])
    }
}

/// A single piece of message content
///
/// Exactly one payload exists per variant. The panicking accessors
/// ([`MessagePart::text`], [`MessagePart::tool_call`], ...) treat reading the
/// wrong payload as a programming error.
#[derive(Debug)]
#[non_exhaustive]
pub enum MessagePart {
    /// Plain text
    Text(String),
    /// A model-initiated function invocation
    ToolCall(ToolCall),
    /// The caller-supplied outcome of a tool call
    ToolResult(ToolResult),
    /// Binary data such as images, audio or video
    Data(DataPart),
}

impl MessagePart {
    /// Text payload
    ///
    /// # Panics
    ///
    /// Panics if the part is not [`MessagePart::Text`].
    #[track_caller]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            other => panic!("not a text part: {other:?}"),
        }
    }

    /// Tool call payload
    ///
    /// # Panics
    ///
    /// Panics if the part is not [`MessagePart::ToolCall`].
    #[track_caller]
    pub fn tool_call(&self) -> &ToolCall {
        match self {
            Self::ToolCall(call) => call,
            other => panic!("not a tool call part: {other:?}"),
        }
    }

    /// Tool result payload
    ///
    /// # Panics
    ///
    /// Panics if the part is not [`MessagePart::ToolResult`].
    #[track_caller]
    pub fn tool_result(&self) -> &ToolResult {
        match self {
            Self::ToolResult(result) => result,
            other => panic!("not a tool result part: {other:?}"),
        }
    }

    /// Binary data payload
    ///
    /// # Panics
    ///
    /// Panics if the part is not [`MessagePart::Data`].
    #[track_caller]
    pub fn data(&self) -> &DataPart {
        match self {
            Self::Data(data) => data,
            other => panic!("not a data part: {other:?}"),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub const fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            Self::ToolCall(call) => Some(call),
            _ => None,
        }
    }
}

impl From<ToolCall> for MessagePart {
    fn from(call: ToolCall) -> Self {
        Self::ToolCall(call)
    }
}

impl From<ToolResult> for MessagePart {
    fn from(result: ToolResult) -> Self {
        Self::ToolResult(result)
    }
}

/// A function invocation requested by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Call identifier, echoed back in the matching [`ToolResult`]
    pub id: String,
    /// Name of the tool to invoke
    pub name: String,
    /// JSON-encoded arguments
    pub args: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args: args.into(),
        }
    }
}

/// Outcome of executing a tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Identifier of the call this result answers
    pub id: String,
    /// Declared name of the tool that ran
    pub name: String,
    /// Tool output
    pub content: String,
    /// Error message if the tool failed
    pub error: Option<String>,
}

impl ToolResult {
    /// Successful result
    pub fn output(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
            error: None,
        }
    }

    /// Failed result
    pub fn failed(id: impl Into<String>, name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Async byte source backing a [`DataPart`]
pub type DataReader = Pin<Box<dyn AsyncRead + Send>>;

/// Binary payload with its MIME type
///
/// The reader is consumed once, when the request is assembled.
pub struct DataPart {
    /// MIME type such as `image/jpeg`
    pub mime_type: String,
    /// Byte source
    pub reader: DataReader,
}

impl DataPart {
    pub fn new(mime_type: impl Into<String>, reader: impl AsyncRead + Send + 'static) -> Self {
        Self {
            mime_type: mime_type.into(),
            reader: Box::pin(reader),
        }
    }

    /// Data part over an in-memory buffer
    pub fn from_bytes(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(mime_type, std::io::Cursor::new(bytes))
    }
}

impl fmt::Debug for DataPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPart")
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}
