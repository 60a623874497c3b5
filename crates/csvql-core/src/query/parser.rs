/// Parser for SELECT / INSERT / DELETE statements
///
/// Converts a stream of tokens into a statement descriptor. Dispatch is on
/// the leading keyword; clauses are parsed in grammar order so keywords that
/// appear inside one clause can never be mistaken for the start of another.
use super::ast::*;
use super::lexer::{Lexer, LexerError, Token};
use std::fmt;

/// Deepest nesting of parentheses and NOT accepted in a WHERE clause.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parses one statement.
pub fn parse(input: &str) -> Result<Statement, ParseError> {
    Parser::new(input)?.parse()
}

/// Parser for statements
pub struct Parser {
    tokens: Vec<Token>,
    /// Source text of each token
    texts: Vec<String>,
    position: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser from SQL text
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let (tokens, texts): (Vec<Token>, Vec<String>) = lexer
            .tokenize_with_text()
            .map_err(ParseError::LexerError)?
            .into_iter()
            .unzip();
        Ok(Self {
            tokens,
            texts,
            position: 0,
            depth: 0,
        })
    }

    /// Parse the statement into a descriptor
    pub fn parse(&mut self) -> Result<Statement, ParseError> {
        let (statement, clause) = match self.current_token() {
            Token::Select => (Statement::Select(self.parse_select()?), Clause::Select),
            Token::Insert => (Statement::Insert(self.parse_insert()?), Clause::Insert),
            Token::Delete => (Statement::Delete(self.parse_delete()?), Clause::Delete),
            Token::Eof => return Err(ParseError::EmptyStatement),
            other => return Err(ParseError::UnsupportedStatement(other.clone())),
        };

        if self.current_token() == &Token::Semicolon {
            self.advance();
        }
        if self.current_token() != &Token::Eof {
            return Err(self.invalid(clause, "end of statement"));
        }

        Ok(statement)
    }

    fn parse_select(&mut self) -> Result<SelectStatement, ParseError> {
        self.expect_token(Token::Select, Clause::Select)?;

        let distinct = self.consume(&Token::Distinct);

        let mut columns = Vec::new();
        loop {
            if self.current_token() == &Token::Asterisk {
                self.advance();
                columns.push(SelectColumn::Wildcard);
            } else {
                columns.push(self.parse_column(Clause::Select)?);
            }

            if !self.consume(&Token::Comma) {
                break;
            }
        }

        self.expect_token(Token::From, Clause::Select)?;
        let table = self.expect_identifier(Clause::Select, "table name")?;

        let join = self.parse_join()?;
        let where_clause = self.parse_where()?;
        let group_by = self.parse_group_by()?;
        let order_by = self.parse_order_by()?;
        let limit = self.parse_limit()?;

        let has_bare_aggregate = group_by.is_none() && columns.iter().any(|c| c.is_aggregate());

        Ok(SelectStatement {
            distinct,
            columns,
            table,
            join,
            where_clause,
            group_by,
            order_by,
            limit,
            has_bare_aggregate,
        })
    }

    /// A column reference or an aggregate call such as `SUM(score)`.
    fn parse_column(&mut self, clause: Clause) -> Result<SelectColumn, ParseError> {
        let name = self.expect_identifier(clause, "column name or *")?;

        let function = match AggregateFunction::from_name(&name) {
            Some(function) if self.current_token() == &Token::LeftParen => function,
            _ => return Ok(SelectColumn::Column(name)),
        };
        self.advance();

        let argument = match self.current_token().clone() {
            Token::Asterisk if function == AggregateFunction::Count => {
                self.advance();
                AggregateArgument::Wildcard
            }
            Token::Identifier(column) => {
                self.advance();
                AggregateArgument::Column(column)
            }
            _ => return Err(self.invalid(clause, "aggregate argument")),
        };

        self.expect_token(Token::RightParen, clause)?;

        Ok(SelectColumn::Aggregate { function, argument })
    }

    fn parse_join(&mut self) -> Result<Option<Join>, ParseError> {
        let join_type = match self.current_token() {
            Token::Inner => {
                self.advance();
                JoinType::Inner
            }
            Token::Left => {
                self.advance();
                self.consume(&Token::Outer);
                JoinType::Left
            }
            Token::Right => {
                self.advance();
                self.consume(&Token::Outer);
                JoinType::Right
            }
            Token::Join => JoinType::Inner, // Default to INNER JOIN
            Token::Full | Token::Cross => {
                return Err(ParseError::Unsupported(format!(
                    "{} JOIN",
                    self.current_token()
                )))
            }
            _ => return Ok(None),
        };

        self.expect_token(Token::Join, Clause::Join)?;
        let table = self.expect_identifier(Clause::Join, "table name")?;
        self.expect_token(Token::On, Clause::Join)?;
        let left_field = self.expect_identifier(Clause::Join, "qualified column")?;
        self.expect_token(Token::Eq, Clause::Join)?;
        let right_field = self.expect_identifier(Clause::Join, "qualified column")?;

        Ok(Some(Join {
            join_type,
            table,
            left_field,
            right_field,
        }))
    }

    fn parse_where(&mut self) -> Result<Option<Expression>, ParseError> {
        if !self.consume(&Token::Where) {
            return Ok(None);
        }
        Ok(Some(self.parse_expression()?))
    }

    fn parse_group_by(&mut self) -> Result<Option<Vec<String>>, ParseError> {
        if !self.consume(&Token::Group) {
            return Ok(None);
        }
        self.expect_token(Token::By, Clause::GroupBy)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.expect_identifier(Clause::GroupBy, "column name")?);
            if !self.consume(&Token::Comma) {
                break;
            }
        }

        Ok(Some(columns))
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.consume(&Token::Or) {
            let right = self.parse_logical_and()?;
            left = Expression::LogicalOp {
                left: Box::new(left),
                op: LogicalOperator::Or,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_not()?;

        while self.consume(&Token::And) {
            let right = self.parse_not()?;
            left = Expression::LogicalOp {
                left: Box::new(left),
                op: LogicalOperator::And,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expression, ParseError> {
        if self.consume(&Token::Not) {
            self.enter()?;
            let expr = self.parse_not();
            self.depth -= 1;
            return Ok(Expression::Not(Box::new(expr?)));
        }

        if self.consume(&Token::LeftParen) {
            self.enter()?;
            let expr = self.parse_expression();
            self.depth -= 1;
            let expr = expr?;
            self.expect_token(Token::RightParen, Clause::Where)?;
            return Ok(expr);
        }

        self.parse_condition()
    }

    /// Counts one more level of WHERE nesting, failing past the limit.
    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep(MAX_NESTING_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_condition(&mut self) -> Result<Expression, ParseError> {
        let field = self.expect_identifier(Clause::Where, "column name")?;

        // field [NOT] LIKE 'pattern'
        let negated = self.current_token() == &Token::Not && self.peek_token() == &Token::Like;
        if negated {
            self.advance();
        }
        if self.consume(&Token::Like) {
            let pattern = match self.current_token().clone() {
                Token::String(pattern) => {
                    self.advance();
                    pattern
                }
                _ => return Err(self.invalid(Clause::Where, "string pattern")),
            };
            let like = Expression::Condition(Condition {
                field,
                operator: ComparisonOperator::Like,
                value: Literal::String(pattern),
            });
            return Ok(if negated {
                Expression::Not(Box::new(like))
            } else {
                like
            });
        }

        let operator = match self.current_token() {
            Token::Eq => ComparisonOperator::Eq,
            Token::Ne => ComparisonOperator::Ne,
            Token::Lt => ComparisonOperator::Lt,
            Token::Le => ComparisonOperator::Le,
            Token::Gt => ComparisonOperator::Gt,
            Token::Ge => ComparisonOperator::Ge,
            _ => return Err(self.invalid(Clause::Where, "comparison operator or LIKE")),
        };
        self.advance();

        let value = self.parse_literal(Clause::Where)?;

        Ok(Expression::Condition(Condition {
            field,
            operator,
            value,
        }))
    }

    fn parse_literal(&mut self, clause: Clause) -> Result<Literal, ParseError> {
        let literal = match self.current_token().clone() {
            Token::Number(n) => Literal::Number(n),
            Token::String(s) => Literal::String(s),
            Token::Identifier(word) => Literal::Bare(word),
            Token::Null => Literal::Null,
            _ => return Err(self.invalid(clause, "literal value")),
        };
        self.advance();
        Ok(literal)
    }

    fn parse_order_by(&mut self) -> Result<Option<Vec<OrderByColumn>>, ParseError> {
        if !self.consume(&Token::OrderBy) {
            return Ok(None);
        }

        let mut columns = Vec::new();

        loop {
            let column = self.parse_column(Clause::OrderBy)?.label();

            let direction = if self.consume(&Token::Desc) {
                OrderDirection::Desc
            } else {
                self.consume(&Token::Asc);
                OrderDirection::Asc
            };

            columns.push(OrderByColumn { column, direction });

            if !self.consume(&Token::Comma) {
                break;
            }
        }

        Ok(Some(columns))
    }

    fn parse_limit(&mut self) -> Result<Option<LimitClause>, ParseError> {
        if !self.consume(&Token::Limit) {
            return Ok(None);
        }

        let count = self.expect_count()?;
        let offset = if self.consume(&Token::Offset) {
            Some(self.expect_count()?)
        } else {
            None
        };

        Ok(Some(LimitClause { count, offset }))
    }

    fn expect_count(&mut self) -> Result<usize, ParseError> {
        match self.current_token().clone() {
            Token::Number(n) => {
                let count = n
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidLimitValue(n.clone()))?;
                self.advance();
                Ok(count)
            }
            _ => Err(self.invalid(Clause::Limit, "integer")),
        }
    }

    fn parse_insert(&mut self) -> Result<InsertStatement, ParseError> {
        self.expect_token(Token::Insert, Clause::Insert)?;
        self.expect_token(Token::Into, Clause::Insert)?;
        let table = self.expect_identifier(Clause::Insert, "table name")?;

        self.expect_token(Token::LeftParen, Clause::Insert)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.expect_identifier(Clause::Insert, "column name")?);
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        self.expect_token(Token::RightParen, Clause::Insert)?;

        self.expect_token(Token::Values, Clause::Insert)?;
        self.expect_token(Token::LeftParen, Clause::Insert)?;
        let mut values = Vec::new();
        loop {
            values.push(self.parse_literal(Clause::Insert)?);
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        self.expect_token(Token::RightParen, Clause::Insert)?;

        if columns.len() != values.len() {
            return Err(ParseError::ColumnCountMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }

        Ok(InsertStatement {
            table,
            columns,
            values,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteStatement, ParseError> {
        self.expect_token(Token::Delete, Clause::Delete)?;
        self.expect_token(Token::From, Clause::Delete)?;
        let table = self.expect_identifier(Clause::Delete, "table name")?;
        let where_clause = self.parse_where()?;

        Ok(DeleteStatement {
            table,
            where_clause,
        })
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_token(&self) -> &Token {
        let next = (self.position + 1).min(self.tokens.len() - 1);
        &self.tokens[next]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    /// Advances past `token` if it is next.
    fn consume(&mut self, token: &Token) -> bool {
        if self.current_token() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, expected: Token, clause: Clause) -> Result<(), ParseError> {
        if self.current_token() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.invalid(clause, &expected.to_string()))
        }
    }

    /// A name; soft keywords such as `left` or `desc` keep their spelling.
    fn expect_identifier(&mut self, clause: Clause, what: &str) -> Result<String, ParseError> {
        let name = match self.current_token() {
            Token::Identifier(name) => name.clone(),
            token if token.is_soft_keyword() => self.texts[self.position].clone(),
            _ => return Err(self.invalid(clause, what)),
        };
        self.advance();
        Ok(name)
    }

    fn invalid(&self, clause: Clause, expected: &str) -> ParseError {
        ParseError::InvalidFormat {
            clause,
            expected: expected.to_string(),
            found: self.current_token().clone(),
        }
    }
}

/// Statement part a parse error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    Join,
    Where,
    GroupBy,
    OrderBy,
    Limit,
    Insert,
    Delete,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Select => write!(f, "SELECT"),
            Clause::Join => write!(f, "JOIN"),
            Clause::Where => write!(f, "WHERE clause"),
            Clause::GroupBy => write!(f, "GROUP BY"),
            Clause::OrderBy => write!(f, "ORDER BY"),
            Clause::Limit => write!(f, "LIMIT"),
            Clause::Insert => write!(f, "INSERT"),
            Clause::Delete => write!(f, "DELETE"),
        }
    }
}

/// Parser errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    LexerError(LexerError),
    InvalidFormat {
        clause: Clause,
        expected: String,
        found: Token,
    },
    EmptyStatement,
    UnsupportedStatement(Token),
    ColumnCountMismatch { columns: usize, values: usize },
    InvalidLimitValue(String),
    /// Recognized syntax the engine does not implement (e.g. FULL JOIN)
    Unsupported(String),
    /// WHERE clause nests parentheses or NOT past the given limit
    NestingTooDeep(usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::LexerError(e) => write!(f, "Lexer error: {}", e),
            ParseError::InvalidFormat {
                clause,
                expected,
                found,
            } => write!(
                f,
                "Invalid {} format: expected {}, found {}",
                clause, expected, found
            ),
            ParseError::EmptyStatement => write!(f, "Empty statement"),
            ParseError::UnsupportedStatement(token) => {
                write!(f, "Unsupported SQL command: {}", token)
            }
            ParseError::ColumnCountMismatch { columns, values } => write!(
                f,
                "INSERT has {} columns but {} values",
                columns, values
            ),
            ParseError::InvalidLimitValue(n) => {
                write!(f, "Invalid LIMIT value: {} (must be a non-negative integer)", n)
            }
            ParseError::Unsupported(what) => write!(f, "Unsupported: {}", what),
            ParseError::NestingTooDeep(limit) => {
                write!(f, "WHERE clause nested deeper than {} levels", limit)
            }
        }
    }
}

impl std::error::Error for ParseError {}
