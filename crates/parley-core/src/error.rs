use thiserror::Error;

/// Errors surfaced through the neutral chat completion interface
///
/// Contract violations (an empty conversation, a final turn not authored by
/// the user) are not represented here; they panic.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Error raised by a backend adapter; downcast the source for details
    #[error(transparent)]
    Provider(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The caller cancelled the call while it was streaming
    #[error("chat completion cancelled")]
    Cancelled,
}

impl ChatError {
    /// Wrap an adapter error
    pub fn provider(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Provider(Box::new(error))
    }

    /// Adapter error as a concrete type, if it is one
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Provider(inner) => inner.downcast_ref(),
            Self::Cancelled => None,
        }
    }
}
