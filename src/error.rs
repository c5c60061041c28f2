//! Error types for sqlbind.

use thiserror::Error;

/// Errors raised while compiling a named-parameter template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The parameter map was empty.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A `:name` token has no binding in the parameter map.
    #[error("Missing parameter: '{0}'")]
    MissingParameter(String),

    /// Unterminated literal or comment (strict mode only).
    #[error("Malformed template at position {position}: {message}")]
    MalformedTemplate { position: usize, message: String },
}

impl CompileError {
    /// Create a malformed template error at the given byte offset.
    pub fn malformed(position: usize, message: impl Into<String>) -> Self {
        Self::MalformedTemplate {
            position,
            message: message.into(),
        }
    }

    /// Name of the unbound parameter, if this is a `MissingParameter`.
    pub fn missing_name(&self) -> Option<&str> {
        match self {
            Self::MissingParameter(name) => Some(name),
            _ => None,
        }
    }
}

/// The main error type for sqlbind operations.
#[derive(Debug, Error)]
pub enum SqlBindError {
    /// Template compilation failed.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Caller supplied unusable input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// More than one statement in a single template.
    #[error("Multiple statements detected.")]
    MultipleStatements,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SqlBindError {
    /// Create an invalid argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type alias for sqlbind operations.
pub type SqlBindResult<T> = Result<T, SqlBindError>;
