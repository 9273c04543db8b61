//! Chat-layer errors and classification.

use lprovider::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Transport,
    Settings,
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Transport, message)
    }

    pub fn settings(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Settings, message)
    }

    pub fn channel(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Channel, message)
    }
}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        match value.kind {
            ProviderErrorKind::InvalidRequest => ChatError::invalid_request(value.message),
            _ => ChatError::transport(value.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use lprovider::ProviderError;

    use super::{ChatError, ChatErrorKind};

    #[test]
    fn provider_errors_keep_their_readable_message() {
        let error = ChatError::from(ProviderError::unavailable("503 Service Unavailable"));
        assert_eq!(error.kind, ChatErrorKind::Transport);
        assert_eq!(error.message, "503 Service Unavailable");
        assert_eq!(error.to_string(), "Transport: 503 Service Unavailable");

        let invalid = ChatError::from(ProviderError::invalid_request("bad temperature"));
        assert_eq!(invalid.kind, ChatErrorKind::InvalidRequest);
    }
}
