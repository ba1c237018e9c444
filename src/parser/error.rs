use crate::ast::Location;
use crate::error::Error;
use std::fmt;

/// Errors produced while lexing or parsing a source file.
///
/// Migration is transactional: the first parse error aborts the run before
/// any rewrite is planned, so no recovery machinery is needed here.
#[derive(Debug, Clone)]
pub enum ParseError {
    /// Unexpected token encountered
    UnexpectedToken {
        expected: String,
        found: String,
        location: Location,
    },

    /// Unexpected end of input
    UnexpectedEndOfInput { expected: String, location: Location },

    /// Invalid syntax
    InvalidSyntax { message: String, location: Location },

    /// Lexical error
    LexicalError { message: String, location: Location },
}

impl ParseError {
    pub fn unexpected_token(expected: &str, found: &str, location: Location) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            location,
        }
    }

    pub fn unexpected_end_of_input(expected: &str, location: Location) -> Self {
        ParseError::UnexpectedEndOfInput {
            expected: expected.to_string(),
            location,
        }
    }

    pub fn invalid_syntax(message: &str, location: Location) -> Self {
        ParseError::InvalidSyntax {
            message: message.to_string(),
            location,
        }
    }

    /// Get the location of the error
    pub fn location(&self) -> Location {
        match self {
            ParseError::UnexpectedToken { location, .. }
            | ParseError::UnexpectedEndOfInput { location, .. }
            | ParseError::InvalidSyntax { location, .. }
            | ParseError::LexicalError { location, .. } => *location,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { expected, found, location } => {
                write!(
                    f,
                    "Parse error at {}:{}: expected {}, found {}",
                    location.line, location.column, expected, found
                )
            }
            ParseError::UnexpectedEndOfInput { expected, location } => {
                write!(
                    f,
                    "Parse error at {}:{}: unexpected end of input, expected {}",
                    location.line, location.column, expected
                )
            }
            ParseError::InvalidSyntax { message, location } => {
                write!(f, "Parse error at {}:{}: {}", location.line, location.column, message)
            }
            ParseError::LexicalError { message, location } => {
                write!(f, "Lexical error at {}:{}: {}", location.line, location.column, message)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for Error {
    fn from(parse_error: ParseError) -> Self {
        let location = parse_error.location();
        match parse_error {
            ParseError::UnexpectedToken { expected, found, .. } => Error::Parse {
                line: location.line,
                column: location.column,
                message: format!("expected {}, found {}", expected, found),
            },
            ParseError::UnexpectedEndOfInput { expected, .. } => Error::Parse {
                line: location.line,
                column: location.column,
                message: format!("unexpected end of input, expected {}", expected),
            },
            ParseError::InvalidSyntax { message, .. } => Error::Parse {
                line: location.line,
                column: location.column,
                message,
            },
            ParseError::LexicalError { message, .. } => Error::Lexical { message },
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;
