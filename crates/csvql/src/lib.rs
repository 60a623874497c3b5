//! # csvql
//!
//! A small SQL dialect over tables stored as CSV files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use csvql::{Database, StatementResult};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Every `<name>.csv` in the directory is a table
//!     let db = Database::open("./data")?;
//!
//!     db.execute("INSERT INTO student (id, name) VALUES (3, 'Cid')")?;
//!
//!     for row in db.query("SELECT name FROM student WHERE id > 1 ORDER BY name")? {
//!         println!("{}", serde_json::to_string(&row)?);
//!     }
//!
//!     if let StatementResult::Deleted { count, .. } =
//!         db.execute("DELETE FROM student WHERE id = '2'")?
//!     {
//!         println!("removed {}", count);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Database Modes
//!
//! ```rust
//! use csvql::Database;
//!
//! // In-memory tables (lost on exit)
//! let db = Database::in_memory();
//! db.create_table("t", ["a", "b"])?;
//! db.execute("INSERT INTO t (a, b) VALUES (1, 'x')")?;
//! assert_eq!(db.query("SELECT * FROM t")?.len(), 1);
//! # Ok::<(), csvql::Error>(())
//! ```

use csvql_core::{Executor, MemoryStore, TableStore};
use csvql_storage::CsvStore;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub mod logging;
pub mod repl;

// Re-export core types
pub use csvql_core::query;
pub use csvql_core::{parse, Error, Result, Row, Statement, StatementResult, Value};

// Storage components
pub use csvql_storage::StoreConfig;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Table storage behind a database handle
enum StorageBackend {
    /// Tables held in memory
    Memory(MemoryStore),
    /// One CSV file per table
    Csv(CsvStore),
}

impl TableStore for StorageBackend {
    fn load(&self, table: &str) -> Result<Vec<Row>> {
        match self {
            StorageBackend::Memory(store) => store.load(table),
            StorageBackend::Csv(store) => store.load(table),
        }
    }

    fn save(&self, table: &str, rows: &[Row]) -> Result<()> {
        match self {
            StorageBackend::Memory(store) => store.save(table, rows),
            StorageBackend::Csv(store) => store.save(table, rows),
        }
    }

    fn columns(&self, table: &str) -> Result<Vec<String>> {
        match self {
            StorageBackend::Memory(store) => store.columns(table),
            StorageBackend::Csv(store) => store.columns(table),
        }
    }
}

/// The main database handle.
///
/// Cheap to clone; clones share the same tables. Statements are not
/// isolated from each other: two handles writing the same table at once
/// can lose updates.
#[derive(Clone)]
pub struct Database {
    inner: Arc<StorageBackend>,
}

impl Database {
    /// Opens a directory of CSV tables, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Opens a directory of tables with a custom file layout.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self> {
        let store = CsvStore::open_with_config(path, config)?;
        Ok(Database {
            inner: Arc::new(StorageBackend::Csv(store)),
        })
    }

    /// Creates a database whose tables live in memory.
    pub fn in_memory() -> Self {
        Database {
            inner: Arc::new(StorageBackend::Memory(MemoryStore::new())),
        }
    }

    /// Parses and runs one statement.
    pub fn execute(&self, sql: &str) -> Result<StatementResult> {
        debug!(sql, "executing statement");
        Executor::new(self.inner.as_ref()).execute_sql(sql)
    }

    /// Runs a SELECT and returns its rows.
    pub fn query(&self, sql: &str) -> Result<Vec<Row>> {
        match parse(sql)? {
            Statement::Select(select) => Executor::new(self.inner.as_ref()).execute_select(&select),
            other => Err(Error::UnsupportedOperation(format!(
                "query expects a SELECT statement, got: {}",
                other
            ))),
        }
    }

    /// Creates an empty table with the given columns, replacing any
    /// existing table of that name.
    pub fn create_table<I, S>(&self, name: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self.inner.as_ref() {
            StorageBackend::Memory(store) => store.create_table(name, columns),
            StorageBackend::Csv(store) => store.create_table(name, columns),
        }
    }

    /// Names of the available tables, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        match self.inner.as_ref() {
            StorageBackend::Memory(store) => store.table_names(),
            StorageBackend::Csv(store) => store.table_names(),
        }
    }

    /// Returns whether tables are stored on disk.
    pub fn is_persistent(&self) -> bool {
        matches!(self.inner.as_ref(), StorageBackend::Csv(_))
    }
}
