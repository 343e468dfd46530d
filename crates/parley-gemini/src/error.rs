use std::fmt;

use parley_core::ChatError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while translating schemas and tool declarations
///
/// Wrapping variants carry the position of the failing subtree so a
/// failure deep inside a schema can be traced back to its path. Their
/// [`source`](std::error::Error::source) is the wrapped `SchemaError`
/// itself, not the box holding it.
#[derive(Debug)]
pub enum SchemaError {
    /// A property definition was not a JSON object
    NotAnObject,

    /// Opaque tool properties did not decode to a JSON object
    Unmarshal(serde_json::Error),

    /// Schema nesting exceeded the supported depth
    TooDeep { max: usize },

    Property { name: String, source: Box<SchemaError> },

    Items(Box<SchemaError>),

    AnyOf { index: usize, source: Box<SchemaError> },

    Tool { name: String, source: Box<SchemaError> },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("property is not an object"),
            Self::Unmarshal(e) => write!(f, "unmarshaling properties: {e}"),
            Self::TooDeep { max } => write!(f, "schema nesting exceeds {max} levels"),
            Self::Property { name, source } => write!(f, "converting property {name}: {source}"),
            Self::Items(source) => write!(f, "converting array items: {source}"),
            Self::AnyOf { index, source } => write!(f, "converting any_of[{index}]: {source}"),
            Self::Tool { name, source } => write!(f, "converting tool {name}: {source}"),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotAnObject | Self::TooDeep { .. } => None,
            Self::Unmarshal(e) => Some(e),
            Self::Property { source, .. }
            | Self::Items(source)
            | Self::AnyOf { source, .. }
            | Self::Tool { source, .. } => Some(&**source),
        }
    }
}

impl SchemaError {
    pub(crate) fn property(name: &str, source: Self) -> Self {
        Self::Property {
            name: name.to_owned(),
            source: Box::new(source),
        }
    }

    pub(crate) fn items(source: Self) -> Self {
        Self::Items(Box::new(source))
    }

    pub(crate) fn any_of(index: usize, source: Self) -> Self {
        Self::AnyOf {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn tool(name: &str, source: Self) -> Self {
        Self::Tool {
            name: name.to_owned(),
            source: Box::new(source),
        }
    }
}

/// Errors that can occur while completing a chat against Gemini
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("error converting tools: {0}")]
    Tools(#[source] SchemaError),

    #[error("error converting response schema: {0}")]
    ResponseSchema(#[source] SchemaError),

    /// Tool call arguments in the request were not a JSON object
    #[error("error unmarshaling request tool call args: {0}")]
    ToolCallArgs(#[source] serde_json::Error),

    /// Tool call arguments in the response could not be encoded
    #[error("error marshaling response tool call args: {0}")]
    ResponseToolCallArgs(#[source] serde_json::Error),

    /// Reading a binary data part failed
    #[error("error reading request data: {0}")]
    ReadData(#[source] std::io::Error),

    /// Client or session could not be set up
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sending the request failed
    #[error("upstream request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Backend answered with a non-success status
    ///
    /// `message` is the API's error message, or the raw body when the body
    /// is not a Google error response.
    #[error("provider returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The event stream broke mid-response
    #[error("streaming error: {0}")]
    Stream(String),

    /// A stream chunk was not a valid response
    #[error("failed to decode stream chunk: {0}")]
    Decode(#[source] serde_json::Error),
}

impl From<GeminiError> for ChatError {
    fn from(error: GeminiError) -> Self {
        Self::provider(error)
    }
}
