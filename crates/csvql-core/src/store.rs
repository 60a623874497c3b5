//! Table store interface.
//!
//! The executor reads whole tables and overwrites whole tables through a
//! [`TableStore`]. Two implementations exist: [`MemoryStore`] here and the
//! CSV-file store in `csvql-storage`.

use crate::error::{Error, Result};
use crate::query::Row;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Whole-table load/save access.
///
/// INSERT and DELETE are a read-modify-overwrite of one table with no
/// isolation: two writers interleaving on the same table can lose updates
/// (last writer wins). Callers that need more must serialize statements
/// per table themselves.
pub trait TableStore {
    /// Returns every row of `table` in storage order.
    ///
    /// Fails with [`Error::Store`] when the table does not exist or cannot
    /// be read.
    fn load(&self, table: &str) -> Result<Vec<Row>>;

    /// Replaces the contents of `table` with `rows`.
    ///
    /// The table keeps its existing columns; row keys it does not have yet
    /// are appended to them.
    fn save(&self, table: &str, rows: &[Row]) -> Result<()>;

    /// Column names of `table` in header order, even when it has no rows.
    fn columns(&self, table: &str) -> Result<Vec<String>>;
}

impl<S: TableStore + ?Sized> TableStore for &S {
    fn load(&self, table: &str) -> Result<Vec<Row>> {
        (**self).load(table)
    }

    fn save(&self, table: &str, rows: &[Row]) -> Result<()> {
        (**self).save(table, rows)
    }

    fn columns(&self, table: &str) -> Result<Vec<String>> {
        (**self).columns(table)
    }
}

/// Appends the keys of `rows` missing from `header`, in first-seen order.
pub fn extend_header(header: &mut Vec<String>, rows: &[Row]) {
    for row in rows {
        for column in &row.columns {
            if !header.contains(column) {
                header.push(column.clone());
            }
        }
    }
}

#[derive(Clone, Default)]
struct MemTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// In-memory table store.
///
/// Cheap to clone; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, MemTable>>>,
}

impl MemoryStore {
    /// Creates a store with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with the given columns, replacing any
    /// existing one with that name.
    pub fn create_table<I, S>(&self, name: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = columns.into_iter().map(|c| c.as_ref().to_string()).collect();
        let mut tables = self.tables.write().map_err(|_| Error::LockPoisoned)?;
        tables.insert(
            name.to_string(),
            MemTable {
                columns,
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    /// Appends rows to `name`, creating the table if needed.
    pub fn insert_rows<I>(&self, name: &str, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = Row>,
    {
        let rows: Vec<Row> = rows.into_iter().collect();
        let mut tables = self.tables.write().map_err(|_| Error::LockPoisoned)?;
        let table = tables.entry(name.to_string()).or_default();
        extend_header(&mut table.columns, &rows);
        table.rows.extend(rows);
        Ok(())
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let tables = self.tables.read().map_err(|_| Error::LockPoisoned)?;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl TableStore for MemoryStore {
    fn load(&self, table: &str) -> Result<Vec<Row>> {
        let tables = self.tables.read().map_err(|_| Error::LockPoisoned)?;
        tables
            .get(table)
            .map(|t| t.rows.clone())
            .ok_or_else(|| Error::store(table, "table does not exist"))
    }

    fn save(&self, table: &str, rows: &[Row]) -> Result<()> {
        let mut tables = self.tables.write().map_err(|_| Error::LockPoisoned)?;
        let entry = tables.entry(table.to_string()).or_default();
        extend_header(&mut entry.columns, rows);
        entry.rows = rows.to_vec();
        Ok(())
    }

    fn columns(&self, table: &str) -> Result<Vec<String>> {
        let tables = self.tables.read().map_err(|_| Error::LockPoisoned)?;
        tables
            .get(table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| Error::store(table, "table does not exist"))
    }
}
