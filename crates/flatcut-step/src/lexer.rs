//! Part 21 (STEP physical file format) lexer.
//!
//! Tokenizes STEP files according to ISO 10303-21. Handles:
//! - Keywords, including user-defined `!NAME` keywords and the hyphenated
//!   `ISO-10303-21` / `END-ISO-10303-21` markers
//! - Entity references (`#123`)
//! - Strings with doubled-quote escapes (`'it''s'`)
//! - Reals in every exporter spelling (`1.5E-10`, `-3.14`, `0.`, `1.E-05`)
//! - Integers
//! - Enumerations (`.T.`, `.UNSPECIFIED.`)
//! - Punctuation (parentheses, comma, semicolon, equals, asterisk, dollar)

use crate::error::StepError;

/// One lexical unit of an exchange file.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Upper-cased keyword: entity type, section name or `!USER` keyword.
    Keyword(String),
    /// `#id` instance name.
    EntityRef(u64),
    /// Unquoted string contents.
    String(String),
    /// Number with a decimal point or exponent.
    Real(f64),
    /// Number without one.
    Integer(i64),
    /// Upper-cased enumeration name, without the dots.
    Enum(String),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `=`
    Equals,
    /// `*`, a value derived by the schema.
    Asterisk,
    /// `$`, an omitted optional value.
    Dollar,
}

/// 1-based line and column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Line.
    pub line: usize,
    /// Column.
    pub col: usize,
}

/// A token and where it starts.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// Start position.
    pub pos: Position,
}

/// Byte-level tokenizer over a whole file held in memory.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    /// Start at the first byte of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Collect every remaining token.
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>, StepError> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    /// Next token; `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<SpannedToken>, StepError> {
        self.skip_whitespace_and_comments();

        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };

        let start = Position {
            line: self.line,
            col: self.col,
        };

        let token = match ch {
            b'(' => self.single(Token::LParen),
            b')' => self.single(Token::RParen),
            b',' => self.single(Token::Comma),
            b';' => self.single(Token::Semicolon),
            b'=' => self.single(Token::Equals),
            b'*' => self.single(Token::Asterisk),
            b'$' => self.single(Token::Dollar),
            b'#' => self.read_entity_ref()?,
            b'\'' => self.read_string()?,
            b'.' => self.read_enum()?,
            b'-' | b'+' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit() || c == b'.') => {
                self.read_number()?
            }
            b'0'..=b'9' => self.read_number()?,
            b'A'..=b'Z' | b'a'..=b'z' | b'_' | b'!' => self.read_keyword(),
            _ => {
                return Err(StepError::lexer(
                    self.line,
                    self.col,
                    format!("unexpected character: '{}'", ch as char),
                ));
            }
        };

        Ok(Some(SpannedToken { token, pos: start }))
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn peek_char(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn advance_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek_char().is_some_and(&pred) {
            self.advance();
        }
    }

    /// ASCII text between `start` and the cursor.
    fn text_from(&self, start: usize) -> &str {
        // Only ever called on spans accepted by ASCII predicates.
        std::str::from_utf8(&self.input[start..self.pos]).unwrap_or_default()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.advance_while(|c| c.is_ascii_whitespace());

            if self.peek_char() == Some(b'/') && self.peek_at(1) == Some(b'*') {
                self.advance();
                self.advance();
                while self.peek_char().is_some() {
                    if self.peek_char() == Some(b'*') && self.peek_at(1) == Some(b'/') {
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                }
                continue;
            }

            break;
        }
    }

    fn read_entity_ref(&mut self) -> Result<Token, StepError> {
        let (line, col) = (self.line, self.col);
        self.advance(); // '#'

        let start = self.pos;
        self.advance_while(|c| c.is_ascii_digit());
        let digits = self.text_from(start);
        if digits.is_empty() {
            return Err(StepError::lexer(line, col, "expected digits after '#'"));
        }

        digits
            .parse()
            .map(Token::EntityRef)
            .map_err(|_| StepError::lexer(line, col, format!("invalid entity ID: {digits}")))
    }

    fn read_string(&mut self) -> Result<Token, StepError> {
        let (line, col) = (self.line, self.col);
        self.advance(); // opening quote

        let mut content = Vec::new();
        loop {
            match self.advance() {
                None => return Err(StepError::lexer(line, col, "unterminated string")),
                Some(b'\'') => {
                    if self.peek_char() == Some(b'\'') {
                        content.push(b'\'');
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(ch) => content.push(ch),
            }
        }

        Ok(Token::String(String::from_utf8_lossy(&content).into_owned()))
    }

    fn read_enum(&mut self) -> Result<Token, StepError> {
        let (line, col) = (self.line, self.col);
        self.advance(); // opening '.'

        let start = self.pos;
        self.advance_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        let name = self.text_from(start).to_string();

        if self.peek_char() != Some(b'.') {
            let found = self.peek_char().map(|c| c as char).unwrap_or(' ');
            return Err(StepError::lexer(
                line,
                col,
                format!("invalid character in enumeration: '{found}'"),
            ));
        }
        self.advance(); // closing '.'

        if name.is_empty() {
            return Err(StepError::lexer(line, col, "empty enumeration"));
        }
        Ok(Token::Enum(name.to_uppercase()))
    }

    fn read_number(&mut self) -> Result<Token, StepError> {
        let (line, col) = (self.line, self.col);
        let start = self.pos;
        let mut is_real = false;

        if matches!(self.peek_char(), Some(b'-' | b'+')) {
            self.advance();
        }
        self.advance_while(|c| c.is_ascii_digit());

        // A '.' directly after the mantissa is always a decimal point: exporters
        // write `0.` and `1.E-05`, and an enumeration never follows a number
        // without a separator.
        if self.peek_char() == Some(b'.') {
            is_real = true;
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek_char(), Some(b'E' | b'e')) {
            is_real = true;
            self.advance();
            if matches!(self.peek_char(), Some(b'-' | b'+')) {
                self.advance();
            }
            self.advance_while(|c| c.is_ascii_digit());
        }

        let text = self.text_from(start);
        if is_real {
            text.parse()
                .map(Token::Real)
                .map_err(|_| StepError::lexer(line, col, format!("invalid real number: {text}")))
        } else {
            text.parse()
                .map(Token::Integer)
                .map_err(|_| StepError::lexer(line, col, format!("invalid integer: {text}")))
        }
    }

    fn read_keyword(&mut self) -> Token {
        let start = self.pos;
        if self.peek_char() == Some(b'!') {
            self.advance();
        }
        self.advance_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'-');
        Token::Keyword(self.text_from(start).to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input.as_bytes());
        lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|st| st.token)
            .collect()
    }

    #[test]
    fn test_entity_ref() {
        assert_eq!(tokenize("#123"), vec![Token::EntityRef(123)]);
        assert_eq!(tokenize("#1"), vec![Token::EntityRef(1)]);
    }

    #[test]
    fn test_string() {
        assert_eq!(tokenize("'hello'"), vec![Token::String("hello".into())]);
        assert_eq!(tokenize("'it''s'"), vec![Token::String("it's".into())]);
    }

    #[test]
    fn test_enum() {
        assert_eq!(tokenize(".T."), vec![Token::Enum("T".into())]);
        assert_eq!(
            tokenize(".unspecified."),
            vec![Token::Enum("UNSPECIFIED".into())]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokenize("42"), vec![Token::Integer(42)]);
        assert_eq!(tokenize("-7"), vec![Token::Integer(-7)]);
        assert_eq!(tokenize("3.25"), vec![Token::Real(3.25)]);
        assert_eq!(tokenize("-1.5E-10"), vec![Token::Real(-1.5e-10)]);
        assert_eq!(tokenize("2.0E3"), vec![Token::Real(2000.0)]);
    }

    #[test]
    fn test_exporter_real_spellings() {
        assert_eq!(
            tokenize("(0.,-1.,1.E-05)"),
            vec![
                Token::LParen,
                Token::Real(0.0),
                Token::Comma,
                Token::Real(-1.0),
                Token::Comma,
                Token::Real(1e-5),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            tokenize("CARTESIAN_POINT"),
            vec![Token::Keyword("CARTESIAN_POINT".into())]
        );
        assert_eq!(tokenize("data"), vec![Token::Keyword("DATA".into())]);
        assert_eq!(
            tokenize("END-ISO-10303-21"),
            vec![Token::Keyword("END-ISO-10303-21".into())]
        );
        assert_eq!(
            tokenize("!VENDOR_THING"),
            vec![Token::Keyword("!VENDOR_THING".into())]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tokenize("()=,;*$"),
            vec![
                Token::LParen,
                Token::RParen,
                Token::Equals,
                Token::Comma,
                Token::Semicolon,
                Token::Asterisk,
                Token::Dollar,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(tokenize("/* comment */ #1"), vec![Token::EntityRef(1)]);
        assert_eq!(
            tokenize("#1 /* inline */ #2"),
            vec![Token::EntityRef(1), Token::EntityRef(2)]
        );
    }

    #[test]
    fn test_positions() {
        let mut lexer = Lexer::new(b"#1\n  #2");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[1].pos, Position { line: 2, col: 3 });
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Lexer::new(b"'open").tokenize(),
            Err(StepError::Lexer { .. })
        ));
        assert!(matches!(
            Lexer::new(b"#").tokenize(),
            Err(StepError::Lexer { .. })
        ));
        assert!(matches!(
            Lexer::new(b"@").tokenize(),
            Err(StepError::Lexer { line: 1, col: 1, .. })
        ));
    }

    #[test]
    fn test_complete_entity() {
        let input = "#1 = CARTESIAN_POINT('', (0.0, 1.5E-2, -3.0));";
        let tokens = tokenize(input);
        assert_eq!(
            tokens,
            vec![
                Token::EntityRef(1),
                Token::Equals,
                Token::Keyword("CARTESIAN_POINT".into()),
                Token::LParen,
                Token::String("".into()),
                Token::Comma,
                Token::LParen,
                Token::Real(0.0),
                Token::Comma,
                Token::Real(0.015),
                Token::Comma,
                Token::Real(-3.0),
                Token::RParen,
                Token::RParen,
                Token::Semicolon,
            ]
        );
    }
}
