use neuro_chat_model::{ErrorKind, ModelProviderError};
use neuro_chat_report::ExportError;

/// Errors from the chat session.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The user text was empty or only whitespace. Nothing was sent.
    #[error("message cannot be empty")]
    EmptyInput,
    /// The model provider failed, either before or while streaming.
    #[error("model provider failed: {0}")]
    Provider(Box<dyn ModelProviderError>),
    /// The provider answered with blank text where content was required.
    #[error("the generated response is empty")]
    EmptyGeneration,
    /// The report could not be serialized.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ChatError {
    /// Returns the provider error kind, if this is a provider failure.
    #[inline]
    pub fn provider_error_kind(&self) -> Option<ErrorKind> {
        match self {
            ChatError::Provider(err) => Some(err.kind()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::{self, Display};

    use super::*;

    #[derive(Debug)]
    struct RateLimited;

    impl Display for RateLimited {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "slow down")
        }
    }

    impl std::error::Error for RateLimited {}

    impl ModelProviderError for RateLimited {
        fn kind(&self) -> ErrorKind {
            ErrorKind::RateLimitExceeded
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ChatError::EmptyInput.to_string(),
            "message cannot be empty"
        );
        assert_eq!(
            ChatError::EmptyGeneration.to_string(),
            "the generated response is empty"
        );
        let err = ChatError::Provider(Box::new(RateLimited));
        assert_eq!(err.to_string(), "model provider failed: slow down");
    }

    #[test]
    fn test_provider_error_kind() {
        let err = ChatError::Provider(Box::new(RateLimited));
        assert_eq!(
            err.provider_error_kind(),
            Some(ErrorKind::RateLimitExceeded)
        );
        assert_eq!(ChatError::EmptyInput.provider_error_kind(), None);
    }
}
