use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ChatError;
use crate::request::ChatCompleteRequest;
use crate::response::ChatCompleteResponse;

/// Trait implemented by each backend adapter
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Start a streaming chat completion
    ///
    /// Returns once the backend stream is open. Cancelling `cancel` stops the
    /// returned part stream with a single [`ChatError::Cancelled`].
    ///
    /// # Panics
    ///
    /// Implementations panic when `request` has no messages or its last
    /// message is not authored by the user.
    async fn chat_complete(
        &self,
        cancel: CancellationToken,
        request: ChatCompleteRequest,
    ) -> Result<ChatCompleteResponse, ChatError>;
}
