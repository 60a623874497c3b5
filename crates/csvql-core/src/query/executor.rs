/// Statement executor
///
/// Runs parsed statements against a [`TableStore`]. SELECT is a fixed
/// pipeline: load, join, filter, then either aggregate or
/// order/project/distinct, then offset/limit.
use super::aggregate::{aggregate_bare, aggregate_grouped};
use super::ast::*;
use super::join::join;
use super::parser;
use super::predicate::evaluate_expression;
use super::row::Row;
use super::value::Value;
use crate::error::{Error, Result};
use crate::store::TableStore;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Outcome of one statement
#[derive(Debug, Clone, PartialEq)]
pub enum StatementResult {
    Rows(Vec<Row>),
    Inserted { table: String, count: usize },
    Deleted { table: String, count: usize },
}

/// Statement executor bound to a table store
pub struct Executor<'a, S: TableStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: TableStore + ?Sized> Executor<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Parses and executes one statement.
    pub fn execute_sql(&self, sql: &str) -> Result<StatementResult> {
        let statement = parser::parse(sql)?;
        self.execute(&statement)
    }

    pub fn execute(&self, statement: &Statement) -> Result<StatementResult> {
        match statement {
            Statement::Select(select) => self.execute_select(select).map(StatementResult::Rows),
            Statement::Insert(insert) => {
                let count = self.execute_insert(insert)?;
                Ok(StatementResult::Inserted {
                    table: insert.table.clone(),
                    count,
                })
            }
            Statement::Delete(delete) => {
                let count = self.execute_delete(delete)?;
                Ok(StatementResult::Deleted {
                    table: delete.table.clone(),
                    count,
                })
            }
        }
    }

    pub fn execute_select(&self, select: &SelectStatement) -> Result<Vec<Row>> {
        let mut tables = vec![select.table.as_str()];
        if let Some(spec) = &select.join {
            tables.push(spec.table.as_str());
        }
        check_qualifiers(select.field_references(), &tables)?;

        let base = self.store.load(&select.table)?;
        let rows = match &select.join {
            Some(spec) => {
                let other = self.store.load(&spec.table)?;
                join(spec, &select.table, &base, &other, &select.columns)?
            }
            None => base,
        };

        let loaded = rows.len();
        let rows = filter(rows, select.where_clause.as_ref())?;
        trace!(loaded, matched = rows.len(), "filter applied");

        let result = if select.has_bare_aggregate {
            vec![aggregate_bare(&rows, &select.columns)?]
        } else if let Some(group_by) = &select.group_by {
            let grouped = aggregate_grouped(&rows, group_by, &select.columns)?;
            let ordered = order(grouped, select.order_by.as_deref())?;
            apply_limit(ordered, select.limit.as_ref())
        } else {
            let ordered = order(rows, select.order_by.as_deref())?;
            let mut projected = project(ordered, &select.columns)?;
            if select.distinct {
                projected = distinct(projected);
            }
            apply_limit(projected, select.limit.as_ref())
        };

        debug!(table = %select.table, rows = result.len(), "select executed");
        Ok(result)
    }

    /// Appends one row and returns the number inserted.
    pub fn execute_insert(&self, insert: &InsertStatement) -> Result<usize> {
        if insert.columns.len() != insert.values.len() {
            return Err(Error::Parse(parser::ParseError::ColumnCountMismatch {
                columns: insert.columns.len(),
                values: insert.values.len(),
            }));
        }

        let mut rows = self.store.load(&insert.table)?;
        let header = self.store.columns(&insert.table)?;
        let provided = |name: &str| {
            insert
                .columns
                .iter()
                .rposition(|c| c == name)
                .map(|idx| insert.values[idx].to_cell())
        };

        // Header columns first so the row matches the table shape
        let mut row = Row::new();
        for column in &header {
            row.set(column.clone(), provided(column).unwrap_or_else(|| Value::text("")));
        }
        for (column, value) in insert.columns.iter().zip(&insert.values) {
            if row.get(column).is_none() {
                row.set(column.clone(), value.to_cell());
            }
        }

        rows.push(row);
        self.store.save(&insert.table, &rows)?;
        debug!(table = %insert.table, total = rows.len(), "row inserted");
        Ok(1)
    }

    /// Removes matching rows and returns how many were removed.
    pub fn execute_delete(&self, delete: &DeleteStatement) -> Result<usize> {
        if let Some(expression) = &delete.where_clause {
            let fields = expression.conditions().into_iter().map(|c| c.field.as_str());
            check_qualifiers(fields, &[delete.table.as_str()])?;
        }

        let rows = self.store.load(&delete.table)?;
        let before = rows.len();

        let kept = match &delete.where_clause {
            Some(expression) => {
                let mut kept = Vec::with_capacity(rows.len());
                for row in rows {
                    if !evaluate_expression(&row, expression)? {
                        kept.push(row);
                    }
                }
                kept
            }
            None => Vec::new(),
        };

        let removed = before - kept.len();
        self.store.save(&delete.table, &kept)?;
        debug!(table = %delete.table, removed, remaining = kept.len(), "rows deleted");
        Ok(removed)
    }
}

/// Rejects `table.field` references whose table the statement does not read.
fn check_qualifiers<'f, I>(fields: I, tables: &[&str]) -> Result<()>
where
    I: IntoIterator<Item = &'f str>,
{
    for field in fields {
        if let Some((table, _)) = field.split_once('.') {
            if !tables.contains(&table) {
                return Err(Error::Field(field.to_string()));
            }
        }
    }
    Ok(())
}

fn filter(rows: Vec<Row>, expression: Option<&Expression>) -> Result<Vec<Row>> {
    let Some(expression) = expression else {
        return Ok(rows);
    };

    let mut kept = Vec::new();
    for row in rows {
        if evaluate_expression(&row, expression)? {
            kept.push(row);
        }
    }
    Ok(kept)
}

/// Stable multi-key sort on coerced values.
fn order(rows: Vec<Row>, columns: Option<&[OrderByColumn]>) -> Result<Vec<Row>> {
    let Some(columns) = columns.filter(|c| !c.is_empty()) else {
        return Ok(rows);
    };

    let mut keyed = Vec::with_capacity(rows.len());
    for row in rows {
        let mut keys = Vec::with_capacity(columns.len());
        for col in columns {
            let value = row
                .resolve(&col.column)
                .ok_or_else(|| Error::Field(col.column.clone()))?;
            keys.push(value.coerce());
        }
        keyed.push((keys, row));
    }

    keyed.sort_by(|(a, _), (b, _)| {
        for (idx, col) in columns.iter().enumerate() {
            let ordering = a[idx].sort_cmp(&b[idx]);
            let ordering = match col.direction {
                OrderDirection::Asc => ordering,
                OrderDirection::Desc => ordering.reverse(),
            };
            if ordering != std::cmp::Ordering::Equal {
                return ordering;
            }
        }
        std::cmp::Ordering::Equal
    });

    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

fn project(rows: Vec<Row>, columns: &[SelectColumn]) -> Result<Vec<Row>> {
    rows.into_iter()
        .map(|row| {
            let mut out = Row::new();
            for col in columns {
                match col {
                    SelectColumn::Wildcard => {
                        for (name, value) in row.iter() {
                            out.set(name, value.clone());
                        }
                    }
                    SelectColumn::Column(name) => {
                        let value = row
                            .resolve(name)
                            .ok_or_else(|| Error::Field(name.clone()))?;
                        out.set(name.clone(), value.clone());
                    }
                    // Only reachable with GROUP BY or as a bare aggregate
                    SelectColumn::Aggregate { .. } => {}
                }
            }
            Ok(out)
        })
        .collect()
}

/// Drops repeated rows, keeping the first occurrence.
fn distinct(rows: Vec<Row>) -> Vec<Row> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            let key: Vec<(String, Option<String>)> = row
                .iter()
                .map(|(name, value)| (name.to_string(), value.raw_text().map(|t| t.into_owned())))
                .collect();
            seen.insert(key)
        })
        .collect()
}

fn apply_limit(rows: Vec<Row>, limit: Option<&LimitClause>) -> Vec<Row> {
    match limit {
        Some(limit) => rows
            .into_iter()
            .skip(limit.offset.unwrap_or(0))
            .take(limit.count)
            .collect(),
        None => rows,
    }
}
