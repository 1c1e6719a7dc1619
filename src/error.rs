use thiserror::Error;

/// Failure classes surfaced by the session runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Empty or malformed query; rejected before any request is issued.
    #[error("{0}")]
    UserInput(String),
    /// Network failure or non-success API response. Shown to the user verbatim.
    #[error("{0}")]
    Upstream(String),
    /// Narration resource failure. Absorbed by the controller, never shown.
    #[error("narration resource error: {0}")]
    Resource(String),
}

impl SessionError {
    pub fn user_input(message: impl Into<String>) -> Self {
        Self::UserInput(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Self::Resource(message.into())
    }

    pub fn is_user_input(&self) -> bool {
        matches!(self, Self::UserInput(_))
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::SessionError;

    #[test]
    fn upstream_messages_display_verbatim() {
        let err = SessionError::upstream("Invalid lang code. Supported: [de, en]");
        assert_eq!(err.to_string(), "Invalid lang code. Supported: [de, en]");
    }

    #[test]
    fn resource_errors_are_prefixed() {
        let err = SessionError::resource("device busy");
        assert_eq!(err.to_string(), "narration resource error: device busy");
        assert!(!err.is_user_input());
    }
}
