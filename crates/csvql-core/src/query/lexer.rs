/// Lexer for tokenizing statements
///
/// Converts raw SQL text into a stream of tokens for parsing.
use std::fmt;

/// Token types produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Select,
    Distinct,
    From,
    Where,
    Group,
    By,
    OrderBy,
    Limit,
    Offset,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Outer,
    On,
    And,
    Or,
    Not,
    Like,
    Insert,
    Into,
    Values,
    Delete,

    // Operators
    Eq, // =
    Ne, // != or <>
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=

    // Literals; numbers keep their source text
    Number(String),
    String(String),
    Null,

    // Identifiers, possibly table-qualified
    Identifier(String),

    // Punctuation
    Asterisk,   // *
    Comma,      // ,
    LeftParen,  // (
    RightParen, // )
    Semicolon,  // ;

    // Special
    Asc,
    Desc,

    // End of input
    Eof,
}

impl Token {
    /// Keywords that never start a clause where a name is expected, so
    /// they may also serve as table or column names.
    pub fn is_soft_keyword(&self) -> bool {
        matches!(
            self,
            Token::Inner
                | Token::Left
                | Token::Right
                | Token::Full
                | Token::Cross
                | Token::Outer
                | Token::Asc
                | Token::Desc
                | Token::Offset
                | Token::By
                | Token::Like
                | Token::Values
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Select => write!(f, "SELECT"),
            Token::Distinct => write!(f, "DISTINCT"),
            Token::From => write!(f, "FROM"),
            Token::Where => write!(f, "WHERE"),
            Token::Group => write!(f, "GROUP"),
            Token::By => write!(f, "BY"),
            Token::OrderBy => write!(f, "ORDER BY"),
            Token::Limit => write!(f, "LIMIT"),
            Token::Offset => write!(f, "OFFSET"),
            Token::Join => write!(f, "JOIN"),
            Token::Inner => write!(f, "INNER"),
            Token::Left => write!(f, "LEFT"),
            Token::Right => write!(f, "RIGHT"),
            Token::Full => write!(f, "FULL"),
            Token::Cross => write!(f, "CROSS"),
            Token::Outer => write!(f, "OUTER"),
            Token::On => write!(f, "ON"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Like => write!(f, "LIKE"),
            Token::Insert => write!(f, "INSERT"),
            Token::Into => write!(f, "INTO"),
            Token::Values => write!(f, "VALUES"),
            Token::Delete => write!(f, "DELETE"),
            Token::Eq => write!(f, "="),
            Token::Ne => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::Number(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "'{}'", s),
            Token::Null => write!(f, "NULL"),
            Token::Identifier(id) => write!(f, "{}", id),
            Token::Asterisk => write!(f, "*"),
            Token::Comma => write!(f, ","),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Semicolon => write!(f, ";"),
            Token::Asc => write!(f, "ASC"),
            Token::Desc => write!(f, "DESC"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// Lexer state
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    /// Create a new lexer from input string
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        if self.position >= self.input.len() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();

        // Single-character tokens
        match ch {
            '*' => {
                self.advance();
                return Ok(Token::Asterisk);
            }
            ',' => {
                self.advance();
                return Ok(Token::Comma);
            }
            '(' => {
                self.advance();
                return Ok(Token::LeftParen);
            }
            ')' => {
                self.advance();
                return Ok(Token::RightParen);
            }
            ';' => {
                self.advance();
                return Ok(Token::Semicolon);
            }
            '=' => {
                self.advance();
                return Ok(Token::Eq);
            }
            '<' => {
                self.advance();
                if self.peek_is('=') {
                    self.advance();
                    return Ok(Token::Le);
                }
                if self.peek_is('>') {
                    self.advance();
                    return Ok(Token::Ne);
                }
                return Ok(Token::Lt);
            }
            '>' => {
                self.advance();
                if self.peek_is('=') {
                    self.advance();
                    return Ok(Token::Ge);
                }
                return Ok(Token::Gt);
            }
            '!' => {
                self.advance();
                if self.peek_is('=') {
                    self.advance();
                    return Ok(Token::Ne);
                }
                return Err(LexerError::UnexpectedCharacter(ch));
            }
            '\'' | '"' => return self.read_string(ch),
            '-' if self.next_char().is_some_and(|c| c.is_ascii_digit()) => {
                return Ok(self.read_number());
            }
            _ => {}
        }

        // Numbers
        if ch.is_ascii_digit() {
            return Ok(self.read_number());
        }

        // Identifiers and keywords
        if ch.is_alphabetic() || ch == '_' {
            return Ok(self.read_identifier_or_keyword());
        }

        Err(LexerError::UnexpectedCharacter(ch))
    }

    /// Tokenize entire input into vector of tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        Ok(self
            .tokenize_with_text()?
            .into_iter()
            .map(|(token, _)| token)
            .collect())
    }

    /// Tokenize, pairing each token with the source text it was read from.
    pub fn tokenize_with_text(&mut self) -> Result<Vec<(Token, String)>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.position;
            let token = self.next_token()?;
            let text = self.input[start..self.position].iter().collect();
            let done = token == Token::Eof;
            tokens.push((token, text));
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn next_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn peek_is(&self, expected: char) -> bool {
        self.input.get(self.position) == Some(&expected)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        let mut has_dot = false;

        if self.current_char() == '-' {
            self.advance();
        }

        while self.position < self.input.len() {
            let ch = self.current_char();
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.' && !has_dot && self.next_char().is_some_and(|c| c.is_ascii_digit())
            {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        Token::Number(self.input[start..self.position].iter().collect())
    }

    /// Reads a `'...'` or `"..."` literal; a doubled quote escapes itself.
    fn read_string(&mut self, quote: char) -> Result<Token, LexerError> {
        self.advance(); // skip opening quote
        let mut string = String::new();

        loop {
            if self.position >= self.input.len() {
                return Err(LexerError::UnterminatedString);
            }
            let ch = self.current_char();
            self.advance();
            if ch == quote {
                if self.peek_is(quote) {
                    string.push(quote);
                    self.advance();
                    continue;
                }
                break;
            }
            string.push(ch);
        }

        Ok(Token::String(string))
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.position;

        while self.position < self.input.len() {
            let ch = self.current_char();
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.input[start..self.position].iter().collect();
        let uppercase = text.to_uppercase();

        // Check for multi-word keywords (ORDER BY)
        if uppercase == "ORDER" {
            let resume = self.position;
            self.skip_whitespace();
            let next_start = self.position;
            while self.position < self.input.len() && self.current_char().is_alphabetic() {
                self.advance();
            }
            let next_text: String = self.input[next_start..self.position].iter().collect();
            if next_text.eq_ignore_ascii_case("BY") {
                return Token::OrderBy;
            }
            // Rollback if not followed by BY
            self.position = resume;
        }

        // Match keywords
        match uppercase.as_str() {
            "SELECT" => Token::Select,
            "DISTINCT" => Token::Distinct,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "GROUP" => Token::Group,
            "BY" => Token::By,
            "LIMIT" => Token::Limit,
            "OFFSET" => Token::Offset,
            "JOIN" => Token::Join,
            "INNER" => Token::Inner,
            "LEFT" => Token::Left,
            "RIGHT" => Token::Right,
            "FULL" => Token::Full,
            "CROSS" => Token::Cross,
            "OUTER" => Token::Outer,
            "ON" => Token::On,
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "LIKE" => Token::Like,
            "INSERT" => Token::Insert,
            "INTO" => Token::Into,
            "VALUES" => Token::Values,
            "DELETE" => Token::Delete,
            "ASC" => Token::Asc,
            "DESC" => Token::Desc,
            "NULL" => Token::Null,
            _ => Token::Identifier(text),
        }
    }
}

/// Lexer errors
#[derive(Debug, Clone, PartialEq)]
pub enum LexerError {
    UnexpectedCharacter(char),
    UnterminatedString,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnexpectedCharacter(ch) => write!(f, "Unexpected character: '{}'", ch),
            LexerError::UnterminatedString => write!(f, "Unterminated string literal"),
        }
    }
}

impl std::error::Error for LexerError {}
