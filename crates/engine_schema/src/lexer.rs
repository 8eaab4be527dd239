/// Lexer for the message IDL.
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Package,
    Message,
    Required,
    Optional,
    Repeated,
    Enum,

    // Literals
    Ident(String),
    Integer(u64),

    // Punctuation
    Dot,
    Eq,
    Semicolon,
    LBrace,
    RBrace,

    // Special
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Package => write!(f, "package"),
            Token::Message => write!(f, "message"),
            Token::Required => write!(f, "required"),
            Token::Optional => write!(f, "optional"),
            Token::Repeated => write!(f, "repeated"),
            Token::Enum => write!(f, "enum"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Integer(n) => write!(f, "{n}"),
            Token::Dot => write!(f, "."),
            Token::Eq => write!(f, "="),
            Token::Semicolon => write!(f, ";"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub line: usize,
    pub col: usize,
}

pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.token == Token::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.input.get(self.pos).copied()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    fn starts_with(&self, a: u8, b: u8) -> bool {
        self.input.get(self.pos) == Some(&a) && self.input.get(self.pos + 1) == Some(&b)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            while let Some(b) = self.peek_byte() {
                if b.is_ascii_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            if self.starts_with(b'/', b'/') {
                while let Some(b) = self.advance() {
                    if b == b'\n' {
                        break;
                    }
                }
                continue;
            }

            if self.starts_with(b'/', b'*') {
                let (line, col) = (self.line, self.col);
                self.advance(); // /
                self.advance(); // *
                loop {
                    if self.starts_with(b'*', b'/') {
                        self.advance();
                        self.advance();
                        break;
                    }
                    if self.advance().is_none() {
                        return Err(LexError {
                            line,
                            col,
                            message: "unterminated block comment".to_string(),
                        });
                    }
                }
                continue;
            }

            return Ok(());
        }
    }

    fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        self.skip_whitespace_and_comments()?;

        let line = self.line;
        let col = self.col;

        let Some(b) = self.peek_byte() else {
            return Ok(SpannedToken {
                token: Token::Eof,
                line,
                col,
            });
        };

        let punct = match b {
            b'.' => Some(Token::Dot),
            b'=' => Some(Token::Eq),
            b';' => Some(Token::Semicolon),
            b'{' => Some(Token::LBrace),
            b'}' => Some(Token::RBrace),
            _ => None,
        };

        if let Some(token) = punct {
            self.advance();
            return Ok(SpannedToken { token, line, col });
        }

        if b.is_ascii_digit() {
            let mut num = 0u64;
            while let Some(d) = self.peek_byte() {
                if !d.is_ascii_digit() {
                    break;
                }
                num = num
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(u64::from(d - b'0')))
                    .ok_or_else(|| LexError {
                        line,
                        col,
                        message: "integer literal too large".to_string(),
                    })?;
                self.advance();
            }
            return Ok(SpannedToken {
                token: Token::Integer(num),
                line,
                col,
            });
        }

        if b.is_ascii_alphabetic() || b == b'_' {
            let start = self.pos;
            while let Some(c) = self.peek_byte() {
                if c.is_ascii_alphanumeric() || c == b'_' {
                    self.advance();
                } else {
                    break;
                }
            }
            // Only ASCII bytes were consumed.
            let word = String::from_utf8_lossy(&self.input[start..self.pos]);
            let token = match word.as_ref() {
                "package" => Token::Package,
                "message" => Token::Message,
                "required" => Token::Required,
                "optional" => Token::Optional,
                "repeated" => Token::Repeated,
                "enum" => Token::Enum,
                other => Token::Ident(other.to_string()),
            };
            return Ok(SpannedToken { token, line, col });
        }

        Err(LexError {
            line,
            col,
            message: format!("unexpected character: '{}'", b as char),
        })
    }
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokens() {
        let input = "message Vector3 { required float x = 1; }";
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].token, Token::Message);
        assert!(matches!(tokens[1].token, Token::Ident(ref s) if s == "Vector3"));
        assert_eq!(tokens[2].token, Token::LBrace);
        assert_eq!(tokens[3].token, Token::Required);
        assert_eq!(tokens[6].token, Token::Eq);
        assert_eq!(tokens[7].token, Token::Integer(1));
        assert_eq!(tokens[8].token, Token::Semicolon);
    }

    #[test]
    fn test_comments() {
        let input = "// line comment\nmessage /* block */ Foo {}";
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].token, Token::Message);
        assert!(matches!(tokens[1].token, Token::Ident(ref s) if s == "Foo"));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unterminated_comment() {
        let mut lexer = Lexer::new("message /* open");
        let err = lexer.tokenize().unwrap_err();
        assert_eq!((err.line, err.col), (1, 9));
    }

    #[test]
    fn test_dotted_package() {
        let input = "package dm.gamesys;";
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].token, Token::Package);
        assert!(matches!(tokens[1].token, Token::Ident(ref s) if s == "dm"));
        assert_eq!(tokens[2].token, Token::Dot);
        assert_eq!(tokens[4].token, Token::Semicolon);
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("message $");
        let err = lexer.tokenize().unwrap_err();
        assert_eq!(err.col, 9);
    }
}
