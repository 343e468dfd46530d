use crate::message::Message;
use crate::schema::Schema;
use crate::tool::Tool;

/// Input to a single chat completion
///
/// The conversation must be non-empty and end with a user turn.
#[derive(Debug, Default)]
pub struct ChatCompleteRequest {
    /// Conversation so far, oldest first
    pub messages: Vec<Message>,
    /// Sampling temperature
    pub temperature: Option<f64>,
    /// System prompt
    pub system: Option<String>,
    /// Tools the model may call
    pub tools: Vec<Tool>,
    /// Schema the response must conform to
    pub response_schema: Option<Schema>,
}

impl ChatCompleteRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn with_response_schema(mut self, schema: Schema) -> Self {
        self.response_schema = Some(schema);
        self
    }
}
