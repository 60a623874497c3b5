//! # csvql Storage
//!
//! CSV-file table store for csvql.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! Users should depend on the main `csvql` crate instead, which wires this
//! store behind its `Database` handle.
//!
//! ---
//!
//! Each table is one file `<dir>/<table>.<ext>` whose first record is the
//! header. Every cell is loaded as text; typing happens at query time.
//!
//! ```text
//! student.csv          enrollment.csv
//! id,name              student_id,course
//! 1,Ann                1,Math
//! 2,Bob                9,Art
//! ```

use csvql_core::{extend_header, Error, Result, Row, TableStore, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default table file extension
const DEFAULT_EXTENSION: &str = "csv";

/// CSV store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// File extension of table files, without the dot
    pub extension: String,
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            delimiter: b',',
        }
    }
}

impl StoreConfig {
    /// Use a different file extension (e.g. `tsv`)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Use a different field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Table store backed by a directory of CSV files
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
    config: StoreConfig,
}

impl CsvStore {
    /// Open a store over `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(dir, StoreConfig::default())
    }

    /// Open a store with custom configuration
    pub fn open_with_config(dir: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), extension = %config.extension, "csv store opened");
        Ok(Self { dir, config })
    }

    /// File backing `table`
    pub fn table_path(&self, table: &str) -> Result<PathBuf> {
        let valid = !table.is_empty()
            && !table.starts_with('.')
            && !table.contains(['/', '\\']);
        if !valid {
            return Err(Error::store(table, "invalid table name"));
        }
        Ok(self.dir.join(format!("{}.{}", table, self.config.extension)))
    }

    /// Creates (or truncates) `name` with a header row and no data
    pub fn create_table<I, S>(&self, name: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let header: Vec<String> = columns.into_iter().map(|c| c.as_ref().to_string()).collect();
        self.write_table(name, &header, &[])
    }

    /// Names of all tables in the directory, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.config.extension.as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn write_table(&self, table: &str, header: &[String], rows: &[Row]) -> Result<()> {
        let path = self.table_path(table)?;
        let tmp_path = path.with_extension(format!("{}.tmp", self.config.extension));

        let written = self.write_file(&tmp_path, header, rows).and_then(|()| {
            fs::rename(&tmp_path, &path).map_err(|e| Error::store(table, e))
        });
        if let Err(e) = written {
            warn!(table, error = %e, "table write failed");
            let _ = fs::remove_file(&tmp_path);
            return Err(match e {
                Error::Store { .. } => e,
                other => Error::store(table, other),
            });
        }

        debug!(table, rows = rows.len(), "table written");
        Ok(())
    }

    fn write_file(&self, path: &Path, header: &[String], rows: &[Row]) -> Result<()> {
        let io = |e: csv::Error| Error::Io(e.into());
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter)
            .from_path(path)
            .map_err(io)?;

        writer.write_record(header).map_err(io)?;
        for row in rows {
            let record = header
                .iter()
                .map(|col| row.get(col).map(Value::to_cell).unwrap_or_default());
            writer.write_record(record).map_err(io)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl TableStore for CsvStore {
    fn load(&self, table: &str) -> Result<Vec<Row>> {
        let path = self.table_path(table)?;
        if !path.is_file() {
            return Err(Error::store(table, "table does not exist"));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| Error::store(table, e))?;
        let header = reader.headers().map_err(|e| Error::store(table, e))?.clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::store(table, e))?;
            // Short records are padded with empty cells
            let row = Row::from_pairs(
                header
                    .iter()
                    .enumerate()
                    .map(|(idx, name)| (name, record.get(idx).unwrap_or(""))),
            );
            rows.push(row);
        }

        debug!(table, rows = rows.len(), "table loaded");
        Ok(rows)
    }

    /// Keeps the existing header, appends row keys it lacks in first-seen
    /// order, then writes every row through a temporary file renamed over
    /// the table.
    fn save(&self, table: &str, rows: &[Row]) -> Result<()> {
        let mut header = if self.table_path(table)?.is_file() {
            self.read_header(table)?
        } else {
            Vec::new()
        };
        extend_header(&mut header, rows);
        self.write_table(table, &header, rows)
    }

    fn columns(&self, table: &str) -> Result<Vec<String>> {
        if !self.table_path(table)?.is_file() {
            return Err(Error::store(table, "table does not exist"));
        }
        self.read_header(table)
    }
}

impl CsvStore {
    fn read_header(&self, table: &str) -> Result<Vec<String>> {
        let path = self.table_path(table)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .from_path(&path)
            .map_err(|e| Error::store(table, e))?;
        let header = reader.headers().map_err(|e| Error::store(table, e))?;
        Ok(header.iter().map(str::to_string).collect())
    }
}
