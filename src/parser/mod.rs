//! Parser module for the Kotlin subset the migration operates on.
//!
//! This module handles lexical analysis and parsing of Kotlin source into
//! the AST defined in [`crate::ast`].

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseError, ParseResult};
pub use lexer::{Lexer, LexicalToken, Token};
pub use parser::Parser;

use crate::ast::KtFile;
use crate::error::Result;

/// Parse a Kotlin source file into a [`KtFile`]
pub fn parse_kotlin(source: &str) -> Result<KtFile> {
    parser::parse(source)
}
