use std::fmt;
use std::pin::Pin;

use futures_util::Stream;
use tokio::sync::watch;

use crate::error::ChatError;
use crate::message::MessagePart;

/// Lazy sequence of output parts
///
/// Ends after the backend stream ends, or right after the first error.
pub type PartStream = Pin<Box<dyn Stream<Item = Result<MessagePart, ChatError>> + Send>>;

/// Output of a chat completion
pub struct ChatCompleteResponse {
    /// Output parts in the order the backend produced them
    pub parts: PartStream,
    /// Usage accounting, complete only once `parts` is drained
    pub meta: ResponseMetadata,
}

impl ChatCompleteResponse {
    pub fn new<S>(parts: S, meta: ResponseMetadata) -> Self
    where
        S: Stream<Item = Result<MessagePart, ChatError>> + Send + 'static,
    {
        Self {
            parts: Box::pin(parts),
            meta,
        }
    }
}

impl fmt::Debug for ChatCompleteResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompleteResponse")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Token counts for one completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Tokens spent on model reasoning
    pub thoughts_tokens: u32,
    /// Always `prompt_tokens + thoughts_tokens + completion_tokens`
    pub total_tokens: u32,
}

impl Usage {
    pub const fn new(prompt_tokens: u32, thoughts_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            thoughts_tokens,
            total_tokens: prompt_tokens
                .saturating_add(thoughts_tokens)
                .saturating_add(completion_tokens),
        }
    }
}

/// Read side of a call's usage accumulator
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    usage: watch::Receiver<Usage>,
}

impl ResponseMetadata {
    /// Create a linked recorder and metadata pair starting at zero usage
    pub fn channel() -> (UsageRecorder, Self) {
        let (tx, rx) = watch::channel(Usage::default());
        (UsageRecorder { usage: tx }, Self { usage: rx })
    }

    /// Latest usage written by the producer
    pub fn usage(&self) -> Usage {
        *self.usage.borrow()
    }
}

/// Write side of a call's usage accumulator
#[derive(Debug)]
pub struct UsageRecorder {
    usage: watch::Sender<Usage>,
}

impl UsageRecorder {
    /// Overwrite all counters; later writes supersede earlier ones
    pub fn record(&self, usage: Usage) {
        self.usage.send_replace(usage);
    }
}
