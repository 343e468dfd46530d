//! Neutral conversation to Gemini content history

use parley_core::{DataPart, Message, MessagePart, ToolCall, ToolResult};
use serde_json::{Map, Value};
use tokio::io::AsyncReadExt;

use crate::error::GeminiError;
use crate::protocol::{Content, FunctionCall, FunctionResponse, Part, Role};

/// Check the caller-side invariants of a conversation
///
/// # Panics
///
/// Panics if `messages` is empty or the final message is not from the user.
#[track_caller]
pub fn validate_messages(messages: &[Message]) {
    let Some(last) = messages.last() else {
        panic!("at least one message is required");
    };
    assert!(
        last.role == parley_core::Role::User,
        "last message must have user role, got {}",
        last.role
    );
}

/// Split a conversation into prior history and the live turn's parts
///
/// Data parts are read to the end here, so this is the only step of
/// request assembly that waits on I/O.
///
/// # Panics
///
/// Panics if `messages` is empty, the final message is not from the user,
/// or a message carries a role or part kind this adapter does not know.
pub async fn build_history(messages: Vec<Message>) -> Result<(Vec<Content>, Vec<Part>), GeminiError> {
    validate_messages(&messages);

    let mut contents = Vec::with_capacity(messages.len());
    for message in messages {
        let role = convert_role(message.role);
        let mut parts = Vec::with_capacity(message.parts.len());
        for part in message.parts {
            parts.push(convert_part(part).await?);
        }
        contents.push(Content::new(role, parts));
    }

    let live = contents.pop().map(|content| content.parts).unwrap_or_default();
    Ok((contents, live))
}

fn convert_role(role: parley_core::Role) -> Role {
    match role {
        parley_core::Role::User => Role::User,
        parley_core::Role::Model => Role::Model,
        other => panic!("unknown role {other:?}"),
    }
}

async fn convert_part(part: MessagePart) -> Result<Part, GeminiError> {
    match part {
        MessagePart::Text(text) => Ok(Part::text(text)),
        MessagePart::ToolCall(call) => convert_tool_call(call).map(Part::function_call),
        MessagePart::ToolResult(result) => Ok(Part::function_response(convert_tool_result(result))),
        MessagePart::Data(data) => read_data(data).await,
        other => panic!("unknown message part {other:?}"),
    }
}

fn convert_tool_call(call: ToolCall) -> Result<FunctionCall, GeminiError> {
    // `null` stands for a call without arguments
    let args: Option<Map<String, Value>> = serde_json::from_str(&call.args).map_err(GeminiError::ToolCallArgs)?;
    let args = args.unwrap_or_default();

    Ok(FunctionCall {
        id: Some(call.id),
        name: call.name,
        args,
    })
}

/// Function responses are keyed by the declared tool name; the call id
/// travels alongside it.
fn convert_tool_result(result: ToolResult) -> FunctionResponse {
    let mut response = Map::new();
    match result.error {
        Some(error) => response.insert("error".to_owned(), Value::String(error)),
        None => response.insert("output".to_owned(), Value::String(result.content)),
    };

    FunctionResponse {
        id: Some(result.id),
        name: result.name,
        response,
    }
}

async fn read_data(data: DataPart) -> Result<Part, GeminiError> {
    let DataPart { mime_type, mut reader } = data;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await.map_err(GeminiError::ReadData)?;
    Ok(Part::inline_data(mime_type, bytes))
}
