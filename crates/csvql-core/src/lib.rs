//! # csvql Core
//!
//! Query engine for csvql: a small SQL subset (SELECT with joins, filters,
//! grouping and ordering; INSERT; DELETE) evaluated over tables of text
//! cells held by a [`TableStore`].
//!
//! ```
//! use csvql_core::{Executor, MemoryStore, Row, StatementResult};
//!
//! let store = MemoryStore::new();
//! store
//!     .insert_rows("student", vec![Row::from_pairs([("id", "1"), ("name", "Ann")])])
//!     .unwrap();
//!
//! let result = Executor::new(&store)
//!     .execute_sql("SELECT name FROM student WHERE id = 1")
//!     .unwrap();
//! assert!(matches!(result, StatementResult::Rows(rows) if rows.len() == 1));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod query;
pub mod store;

pub use error::{Error, Result};
pub use query::{parse, Executor, Row, Statement, StatementResult, Value};
pub use store::{extend_header, MemoryStore, TableStore};
