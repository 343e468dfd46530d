//! Reassembly of streamed Gemini chunks into neutral output parts

use futures_util::{Stream, StreamExt};
use parley_core::{ChatError, MessagePart, ToolCall, Usage, UsageRecorder};
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::backend::ChunkStream;
use crate::error::GeminiError;
use crate::protocol::{FunctionCall, UsageMetadata};

/// Turn a chunk stream into a stream of output parts
///
/// Chunks are pulled only when the consumer asks for the next part, and
/// parts come out in the order the backend sent them. Usage carried by a
/// chunk overwrites everything recorded before it. The stream ends after the
/// first error; cancellation drops `chunks` and then yields a single
/// [`ChatError::Cancelled`].
pub fn reassemble(
    chunks: ChunkStream,
    cancel: CancellationToken,
    recorder: UsageRecorder,
    span: Span,
) -> impl Stream<Item = Result<MessagePart, ChatError>> + Send + 'static {
    async_stream::stream! {
        let mut chunks = Some(chunks);
        let mut calls = 0usize;

        'chunks: loop {
            let next = match chunks.as_mut() {
                Some(stream) => tokio::select! {
                    biased;
                    () = cancel.cancelled() => None,
                    chunk = stream.next() => Some(chunk),
                },
                None => break,
            };

            let chunk = match next {
                None => {
                    drop(chunks.take());
                    tracing::error!(parent: &span, "chat completion cancelled");
                    yield Err(ChatError::Cancelled);
                    break;
                }
                Some(None) => break,
                Some(Some(Err(e))) => {
                    drop(chunks.take());
                    tracing::error!(parent: &span, error = %e, "error streaming chat completion");
                    yield Err(ChatError::from(e));
                    break;
                }
                Some(Some(Ok(chunk))) => chunk,
            };

            if let Some(usage) = chunk.usage_metadata {
                record_usage(&recorder, &span, usage);
            }

            let Some(content) = chunk.candidates.into_iter().next().and_then(|c| c.content) else {
                continue;
            };

            for part in content.parts {
                let mut outputs: Vec<Result<MessagePart, GeminiError>> = Vec::with_capacity(2);
                if let Some(text) = part.text.filter(|text| !text.is_empty()) {
                    outputs.push(Ok(MessagePart::Text(text)));
                }
                if let Some(call) = part.function_call {
                    let call = convert_function_call(call, calls).map(MessagePart::ToolCall);
                    calls += 1;
                    outputs.push(call);
                }

                // A single chunk may carry many parts; nothing follows a cancel
                for output in outputs {
                    if cancel.is_cancelled() {
                        drop(chunks.take());
                        tracing::error!(parent: &span, "chat completion cancelled");
                        yield Err(ChatError::Cancelled);
                        break 'chunks;
                    }

                    match output {
                        Ok(part) => yield Ok(part),
                        Err(e) => {
                            drop(chunks.take());
                            tracing::error!(parent: &span, error = %e, "error converting response tool call");
                            yield Err(ChatError::from(e));
                            break 'chunks;
                        }
                    }
                }
            }
        }
    }
}

fn record_usage(recorder: &UsageRecorder, span: &Span, usage: UsageMetadata) {
    recorder.record(Usage::new(
        usage.prompt_token_count,
        usage.thoughts_token_count,
        usage.candidates_token_count,
    ));
    span.record("ai.prompt_tokens", usage.prompt_token_count);
    span.record("ai.thoughts_tokens", usage.thoughts_token_count);
    span.record("ai.completion_tokens", usage.candidates_token_count);
}

fn convert_function_call(call: FunctionCall, ordinal: usize) -> Result<ToolCall, GeminiError> {
    let args = serde_json::to_string(&call.args).map_err(GeminiError::ResponseToolCallArgs)?;
    let id = match call.id {
        Some(id) if !id.is_empty() => id,
        _ => synthesize_call_id(ordinal),
    };

    Ok(ToolCall::new(id, call.name, args))
}

/// Hex SHA-256 of the current time and the call's position in the response
fn synthesize_call_id(ordinal: usize) -> String {
    let now = jiff::Timestamp::now();
    let mut hasher = Sha256::new();
    hasher.update(format!("{}.{:09}", now.as_second(), now.subsec_nanosecond()));
    hasher.update(ordinal.to_be_bytes());
    format!("{:x}", hasher.finalize())
}
