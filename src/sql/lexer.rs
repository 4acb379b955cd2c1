//! SQL lexer.
//!
//! Converts a SQL string into tokens: case-insensitive keywords,
//! identifiers, integer/float/string literals, comparison operators,
//! punctuation, with `--` line and `/* */` block comments skipped.

use super::error::{Span, SyntaxError};
use super::token::{Keyword, Token, TokenKind};

/// SQL tokenizer.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over the given input.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenizes the entire input. The result always ends with an EOF token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace_and_comments()?;
        let start = self.pos;

        let Some(ch) = self.current_char() else {
            return Ok(Token::new(TokenKind::Eof, Span::at(start)));
        };

        if ch == '\'' {
            return self.scan_string();
        }
        if ch.is_ascii_digit() {
            return self.scan_number();
        }
        if ch.is_ascii_alphabetic() || ch == '_' {
            return self.scan_identifier_or_keyword();
        }
        self.scan_operator_or_punctuation()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.pos += ch.len_utf8();
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.current_char() {
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('-') if self.peek_char() == Some('-') => {
                    while let Some(ch) = self.current_char() {
                        self.advance();
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.peek_char() == Some('*') => {
                    let start = self.pos;
                    self.advance();
                    self.advance();
                    loop {
                        match self.current_char() {
                            Some('*') if self.peek_char() == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => self.advance(),
                            None => {
                                return Err(SyntaxError::new(
                                    "unterminated block comment",
                                    Span::new(start, self.pos),
                                ))
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_string(&mut self) -> Result<Token, SyntaxError> {
        let start = self.pos;
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.current_char() {
                Some('\'') if self.peek_char() == Some('\'') => {
                    value.push('\'');
                    self.advance();
                    self.advance();
                }
                Some('\'') => {
                    self.advance();
                    let span = Span::new(start, self.pos);
                    return Ok(Token::new(TokenKind::String(value), span));
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
                None => {
                    return Err(SyntaxError::new(
                        "unterminated string literal",
                        Span::new(start, self.pos),
                    ))
                }
            }
        }
    }

    fn scan_number(&mut self) -> Result<Token, SyntaxError> {
        let start = self.pos;
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let mut is_float = false;
        if self.current_char() == Some('.')
            && self.peek_char().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.advance();
            while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let span = Span::new(start, self.pos);
        let text = &self.input[start..self.pos];
        let kind = if is_float {
            TokenKind::Float(
                text.parse()
                    .map_err(|_| SyntaxError::new("invalid number literal", span))?,
            )
        } else {
            TokenKind::Integer(
                text.parse()
                    .map_err(|_| SyntaxError::new("invalid number literal", span))?,
            )
        };
        Ok(Token::new(kind, span))
    }

    fn scan_identifier_or_keyword(&mut self) -> Result<Token, SyntaxError> {
        let start = self.pos;
        while self
            .current_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let span = Span::new(start, self.pos);
        let text = &self.input[start..self.pos];
        let kind = match Keyword::from_ident(text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(text.to_string()),
        };
        Ok(Token::new(kind, span))
    }

    fn scan_operator_or_punctuation(&mut self) -> Result<Token, SyntaxError> {
        let start = self.pos;
        let ch = self.current_char().unwrap_or_default();
        self.advance();
        let kind = match ch {
            '=' => TokenKind::Eq,
            '<' => match self.current_char() {
                Some('>') => {
                    self.advance();
                    TokenKind::Neq
                }
                Some('=') => {
                    self.advance();
                    TokenKind::LtEq
                }
                _ => TokenKind::Lt,
            },
            '>' => match self.current_char() {
                Some('=') => {
                    self.advance();
                    TokenKind::GtEq
                }
                _ => TokenKind::Gt,
            },
            '!' if self.current_char() == Some('=') => {
                self.advance();
                TokenKind::Neq
            }
            '-' => TokenKind::Minus,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '*' => TokenKind::Asterisk,
            _ => {
                return Err(SyntaxError::new(
                    format!("unexpected character '{}'", ch),
                    Span::new(start, self.pos),
                ))
            }
        };
        Ok(Token::new(kind, Span::new(start, self.pos)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        Lexer::new(sql)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("select SELECT SeLeCt"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_and_literals() {
        assert_eq!(
            kinds("foo_1 42 3.5 'it''s'"),
            vec![
                TokenKind::Identifier("foo_1".to_string()),
                TokenKind::Integer(42),
                TokenKind::Float(3.5),
                TokenKind::String("it's".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("= <> != < <= > >= - ( ) , ; . *"),
            vec![
                TokenKind::Eq,
                TokenKind::Neq,
                TokenKind::Neq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Minus,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Dot,
                TokenKind::Asterisk,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("select -- trailing\n/* block\ncomment */ 1"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Integer(1),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert!(Lexer::new("'open").tokenize().is_err());
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("select @").tokenize().unwrap_err();
        assert_eq!(err.span.start, 7);
    }
}
