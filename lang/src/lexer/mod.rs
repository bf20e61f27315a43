pub mod token;

pub use token::{Position, Token, TokenKind};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnterminatedString { position: Position },
    InvalidEscape { ch: char, position: Position },
    UnterminatedComment { position: Position },
}

pub type LexResult = Result<Vec<Token>, LexError>;

/// Tokenize a whole source string.
///
/// The returned list always ends with an `Eof` token. Bytes that match no
/// reserved lexeme become `Invalid` tokens; only malformed strings and
/// unterminated block comments are lexical errors.
pub fn lex(input: &str) -> LexResult {
    Lexer::new(input).lex_all()
}

struct Lexer {
    input: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn lex_all(&mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia()?;

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "\0", self.current_position()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let ch = self.peek();

        if ch.is_ascii_digit() {
            Ok(self.lex_number())
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            Ok(self.lex_identifier())
        } else if ch == '"' {
            self.lex_string()
        } else {
            Ok(self.lex_symbol())
        }
    }

    fn lex_number(&mut self) -> Token {
        let mut value = self.walk(|c| c.is_ascii_digit());

        // A decimal part only counts with a digit after the dot.
        if self.peek() == '.' && self.peek_at(1).is_ascii_digit() {
            value.push(self.advance());
            value.push_str(&self.walk(|c| c.is_ascii_digit()));
        }

        Token::new(TokenKind::Number, value, self.current_position())
    }

    fn lex_identifier(&mut self) -> Token {
        let value = self.walk(|c| c.is_ascii_alphanumeric() || c == '_');
        let kind = token::keyword_kind(&value).unwrap_or(TokenKind::Identifier);

        Token::new(kind, value, self.current_position())
    }

    fn lex_string(&mut self) -> Result<Token, LexError> {
        self.advance(); // opening quote

        let mut value = String::new();
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\\' {
                self.advance(); // backslash
                match self.advance() {
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    ch => {
                        return Err(LexError::InvalidEscape {
                            ch,
                            position: self.current_position(),
                        })
                    }
                }
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            return Err(LexError::UnterminatedString {
                position: self.current_position(),
            });
        }

        self.advance(); // closing quote
        Ok(Token::new(TokenKind::Str, value, self.current_position()))
    }

    fn lex_symbol(&mut self) -> Token {
        // Two-character operator attempt: the only fused pairs end in `=`.
        // `->` is not fused; the parser consumes `-` then `>`.
        if self.peek_at(1) == '=' {
            let pair: String = [self.peek(), '='].iter().collect();
            if let Some(kind) = token::atomic_kind(&pair) {
                self.advance();
                self.advance();
                return Token::new(kind, pair, self.current_position());
            }
        }

        let single = self.advance().to_string();
        let kind = token::atomic_kind(&single).unwrap_or(TokenKind::Invalid);

        Token::new(kind, single, self.current_position())
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            while self.peek().is_whitespace() {
                self.advance();
            }

            if self.peek() == '/' && self.peek_at(1) == '/' {
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
            } else if self.peek() == '/' && self.peek_at(1) == '*' {
                self.advance();
                self.advance();
                loop {
                    if self.is_at_end() {
                        return Err(LexError::UnterminatedComment {
                            position: self.current_position(),
                        });
                    }
                    if self.peek() == '*' && self.peek_at(1) == '/' {
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                }
            } else {
                return Ok(());
            }
        }
    }

    fn walk(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut value = String::new();
        while !self.is_at_end() && predicate(self.peek()) {
            value.push(self.advance());
        }
        value
    }

    /// `'\0'` at and past the end of input; the cursor never moves there.
    fn peek(&self) -> char {
        self.input.get(self.position).copied().unwrap_or('\0')
    }

    fn peek_at(&self, offset: usize) -> char {
        self.input.get(self.position + offset).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        if self.is_at_end() {
            return '\0';
        }

        let ch = self.input[self.position];
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        ch
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}
