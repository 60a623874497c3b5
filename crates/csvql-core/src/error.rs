//! Error types for csvql.

use crate::query::ast::ComparisonOperator;
use crate::query::parser::ParseError;
use crate::query::value::Value;
use std::fmt;

/// The main error type for csvql operations.
#[derive(Debug)]
pub enum Error {
    /// Statement text did not match the grammar
    Parse(ParseError),

    /// A WHERE/ON/ORDER BY/projection field is absent from a row
    Field(String),

    /// Relational comparison between a number and a string
    TypeMismatch {
        /// Operator being applied
        op: ComparisonOperator,
        /// Coerced field value
        left: Value,
        /// Coerced literal
        right: Value,
    },

    /// Join kind or operator the engine does not implement
    UnsupportedOperation(String),

    /// Failure reported by a table store
    Store {
        /// Table the store was accessing
        table: String,
        /// What went wrong
        reason: String,
    },

    /// A lock was poisoned (internal error)
    LockPoisoned,

    /// I/O error
    Io(std::io::Error),
}

impl Error {
    /// Builds a store error for `table`.
    pub fn store(table: impl Into<String>, reason: impl fmt::Display) -> Self {
        Error::Store {
            table: table.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{}", e),
            Error::Field(name) => write!(f, "Invalid field: {}", name),
            Error::TypeMismatch { op, left, right } => write!(
                f,
                "Type mismatch: cannot compare {} {} {}",
                left.quoted(),
                op,
                right.quoted()
            ),
            Error::UnsupportedOperation(what) => write!(f, "Unsupported operation: {}", what),
            Error::Store { table, reason } => {
                write!(f, "Store error for table '{}': {}", table, reason)
            }
            Error::LockPoisoned => write!(f, "Lock poisoned"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Unsupported(what) => Error::UnsupportedOperation(what),
            other => Error::Parse(other),
        }
    }
}

/// A specialized `Result` type for csvql operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse;

    #[test]
    fn test_display() {
        assert_eq!(Error::Field("age".into()).to_string(), "Invalid field: age");
        assert_eq!(
            Error::store("student", "table does not exist").to_string(),
            "Store error for table 'student': table does not exist"
        );
        let mismatch = Error::TypeMismatch {
            op: ComparisonOperator::Lt,
            left: Value::text("Ann"),
            right: Value::Number(3.5),
        };
        assert_eq!(mismatch.to_string(), "Type mismatch: cannot compare 'Ann' < 3.5");
    }

    #[test]
    fn test_unsupported_parse_maps_to_operation() {
        let err: Error = parse("SELECT * FROM a FULL JOIN b ON a.id = b.id")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::UnsupportedOperation(w) if w.contains("FULL")));

        let err: Error = parse("SELECT").unwrap_err().into();
        assert!(matches!(err, Error::Parse(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
