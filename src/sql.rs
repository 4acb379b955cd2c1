//! SQL front end: lexer, parser, and the statement AST.

pub mod ast;

mod error;
mod lexer;
mod parser;
mod token;

pub use error::{Span, SyntaxError};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Keyword, Token, TokenKind};

use ast::Statement;

/// Parses every statement in `sql`.
pub fn parse(sql: &str) -> Result<Vec<Statement>, SyntaxError> {
    Parser::new(sql)?.parse()
}
