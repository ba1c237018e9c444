use thiserror::Error;

/// Result type for bindmig operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the migration engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Lexical error: {message}")]
    Lexical { message: String },

    #[error("Layout error: {message}")]
    Layout { message: String },

    #[error("Unsupported class '{name}': not a fragment or activity")]
    UnsupportedClass { name: String },

    #[error("Rewrite conflict: {message}")]
    RewriteConflict { message: String },

    #[error("Internal migration error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a parse error with location information
    pub fn parse_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a lexical error
    pub fn lexical_error(message: impl Into<String>) -> Self {
        Self::Lexical { message: message.into() }
    }

    /// Create a layout (markup) error
    pub fn layout_error(message: impl Into<String>) -> Self {
        Self::Layout { message: message.into() }
    }

    /// Create a rewrite conflict error
    pub fn rewrite_conflict(message: impl Into<String>) -> Self {
        Self::RewriteConflict { message: message.into() }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}
