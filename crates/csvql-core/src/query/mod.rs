/// Query engine module
///
/// SQL-subset parsing, predicate evaluation, joins, aggregation and execution.
/// Statement descriptors
#[allow(missing_docs)]
pub mod ast;
/// Statement executor
#[allow(missing_docs)]
pub mod executor;
/// SQL lexer
#[allow(missing_docs)]
pub mod lexer;
/// SQL parser
#[allow(missing_docs)]
pub mod parser;
/// Typed cell values
#[allow(missing_docs)]
pub mod value;

/// GROUP BY and bare aggregates
pub mod aggregate;
/// INNER/LEFT/RIGHT joins
pub mod join;
/// WHERE evaluation
pub mod predicate;
/// Result and table rows
#[allow(missing_docs)]
pub mod row;

// Re-export main types
pub use ast::*;
pub use executor::{Executor, StatementResult};
pub use lexer::{Lexer, LexerError, Token};
pub use parser::{parse, ParseError, Parser};
pub use row::Row;
pub use value::{coerce, strip_quotes, Value};
