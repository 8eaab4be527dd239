/// Recursive-descent parser for the message IDL.
use crate::ast::*;
use crate::lexer::{LexError, Lexer, SpannedToken, Token};
use std::fmt;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        Self {
            line: e.line,
            col: e.col,
            message: e.message,
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    pub fn parse(input: &str) -> Result<File, ParseError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let mut parser = Self { tokens, pos: 0 };
        parser.parse_file()
    }

    // -- Helpers --

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn current_span(&self) -> (usize, usize) {
        let t = &self.tokens[self.pos];
        (t.line, t.col)
    }

    fn error(&self, message: String) -> ParseError {
        let (line, col) = self.current_span();
        ParseError { line, col, message }
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos].token;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {expected}, got {}", self.peek())))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            Token::Ident(s) => {
                self.advance();
                Ok(s)
            }
            // Keywords that are only special at the start of a declaration
            Token::Package | Token::Message => {
                let s = self.peek().to_string();
                self.advance();
                Ok(s)
            }
            other => Err(self.error(format!("expected identifier, got {other}"))),
        }
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// `a.b.c`
    fn parse_dotted(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_ident()?;
        while self.eat(&Token::Dot) {
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    // -- Top-level --

    fn parse_file(&mut self) -> Result<File, ParseError> {
        let package = if self.eat(&Token::Package) {
            let name = self.parse_dotted()?;
            self.expect(&Token::Semicolon)?;
            Some(name)
        } else {
            None
        };

        let mut messages = Vec::new();
        while !self.at(&Token::Eof) {
            match self.peek() {
                Token::Message => messages.push(self.parse_message()?),
                Token::Enum => return Err(self.error("enums are not supported".to_string())),
                other => {
                    return Err(self.error(format!("expected message, got {other}")));
                }
            }
        }
        Ok(File { package, messages })
    }

    // -- Messages --

    fn parse_message(&mut self) -> Result<MessageDef, ParseError> {
        self.expect(&Token::Message)?;
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace)?;
        let mut fields = Vec::new();
        while !self.at(&Token::RBrace) {
            fields.push(self.parse_field()?);
        }
        self.expect(&Token::RBrace)?;
        Ok(MessageDef { name, fields })
    }

    fn parse_field(&mut self) -> Result<FieldDef, ParseError> {
        let label = match self.peek() {
            Token::Required => FieldLabel::Required,
            Token::Optional => FieldLabel::Optional,
            Token::Repeated => {
                return Err(self.error("repeated fields are not supported".to_string()));
            }
            other => {
                return Err(self.error(format!("expected required or optional, got {other}")));
            }
        };
        self.advance();

        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        let tag = if self.eat(&Token::Eq) {
            match *self.peek() {
                Token::Integer(n) => {
                    self.advance();
                    Some(n)
                }
                ref other => return Err(self.error(format!("expected field number, got {other}"))),
            }
        } else {
            None
        };
        self.expect(&Token::Semicolon)?;

        Ok(FieldDef {
            label,
            ty,
            name,
            tag,
        })
    }

    fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        let name = self.parse_dotted()?;
        if is_scalar(&name) {
            Ok(TypeRef::Scalar(name))
        } else {
            Ok(TypeRef::Named(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let file = Parser::parse("message Empty {}").unwrap();
        assert_eq!(file.package, None);
        assert_eq!(file.messages.len(), 1);
        assert_eq!(file.messages[0].name, "Empty");
        assert!(file.messages[0].fields.is_empty());
    }

    #[test]
    fn test_parse_message_with_fields() {
        let input = r#"
            package dm.gamesys;

            message SpawnObject {
                required string prototype = 1;
                required dmMath.Point3 position = 2;
                optional float scale;
            }
        "#;
        let file = Parser::parse(input).unwrap();
        assert_eq!(file.package.as_deref(), Some("dm.gamesys"));
        let msg = &file.messages[0];
        assert_eq!(msg.fields.len(), 3);
        assert_eq!(msg.fields[0].label, FieldLabel::Required);
        assert_eq!(msg.fields[0].ty, TypeRef::Scalar("string".into()));
        assert_eq!(msg.fields[0].tag, Some(1));
        assert_eq!(msg.fields[1].ty, TypeRef::Named("dmMath.Point3".into()));
        assert_eq!(msg.fields[2].label, FieldLabel::Optional);
        assert_eq!(msg.fields[2].tag, None);
    }

    #[test]
    fn test_parse_rejects_repeated() {
        let err = Parser::parse("message M {\n  repeated int32 xs = 1;\n}").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("repeated"));
    }

    #[test]
    fn test_parse_rejects_enum() {
        let err = Parser::parse("enum Color { RED = 0; }").unwrap_err();
        assert!(err.message.contains("enum"));
    }

    #[test]
    fn test_parse_missing_label() {
        let err = Parser::parse("message M { int32 x; }").unwrap_err();
        assert_eq!((err.line, err.col), (1, 13));
    }

    #[test]
    fn test_parse_keyword_field_name() {
        let file = Parser::parse("message Post { required string message; }").unwrap();
        assert_eq!(file.messages[0].fields[0].name, "message");
    }
}
