use crate::codec::CodecError;
use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error
    /// (e.g., "config.port", "intent.question")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "query")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Underlying cause of an [`Error::Unknown`].
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A collaborator (camera, speech-to-text, dialog) reported a failure.
    #[error("{0}")]
    Collaborator(String),
}

/// Tagged failure categories that callers pattern-match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The server could not be reached or the send budget was exhausted.
    ConnectionFailure,
    /// No question could be obtained from the user.
    NoQuestion,
    /// The server answered with bytes that are not a valid response.
    MalformedResponse,
    /// Anything else, including read failures and configuration problems.
    Unknown,
}

/// Unified error type for the VQA client.
/// This aggregates all low-level errors into the categories the calling layer reacts to.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Connection failure: {endpoint} unreachable after {attempts} send attempt(s): {source}")]
    ConnectionFailure {
        endpoint: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("No question could be obtained{}", format_context(.context))]
    NoQuestion { context: ErrorContext },

    #[error("Unknown error: {message}{}", format_context(.context))]
    Unknown {
        message: String,
        context: ErrorContext,
        #[source]
        cause: FailureCause,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Create a new unknown error with structured context
    pub fn unknown_with_context(
        msg: impl Into<String>,
        cause: impl Into<FailureCause>,
        context: ErrorContext,
    ) -> Self {
        Error::Unknown {
            message: msg.into(),
            context,
            cause: cause.into(),
        }
    }

    pub fn no_question(context: ErrorContext) -> Self {
        Error::NoQuestion { context }
    }

    /// The tagged category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::ConnectionFailure { .. } => FailureKind::ConnectionFailure,
            Error::NoQuestion { .. } => FailureKind::NoQuestion,
            Error::Unknown {
                cause: FailureCause::Codec(_),
                ..
            } => FailureKind::MalformedResponse,
            _ => FailureKind::Unknown,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::NoQuestion { context }
            | Error::Unknown { context, .. }
            | Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = Error::ConnectionFailure {
            endpoint: "localhost:1".to_string(),
            attempts: 3,
            source: TransportError::NotConnected,
        };
        assert_eq!(err.kind(), FailureKind::ConnectionFailure);

        let err = Error::unknown_with_context(
            "bad response",
            CodecError::MissingField("result"),
            ErrorContext::new(),
        );
        assert_eq!(err.kind(), FailureKind::MalformedResponse);

        let err = Error::unknown_with_context(
            "read failed",
            TransportError::ConnectionClosed { buffered: 2 },
            ErrorContext::new(),
        );
        assert_eq!(err.kind(), FailureKind::Unknown);

        assert_eq!(
            Error::no_question(ErrorContext::new()).kind(),
            FailureKind::NoQuestion
        );
        assert_eq!(Error::configuration("x").kind(), FailureKind::Unknown);
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::configuration_with_context(
            "port must be non-zero",
            ErrorContext::new()
                .with_field_path("config.port")
                .with_source("config_validator"),
        );
        let text = err.to_string();
        assert!(text.contains("port must be non-zero"));
        assert!(text.contains("field: config.port"));
        assert!(text.contains("source: config_validator"));
    }

    #[test]
    fn test_display_without_context() {
        let err = Error::no_question(ErrorContext::new());
        assert_eq!(err.to_string(), "No question could be obtained");
    }
}
