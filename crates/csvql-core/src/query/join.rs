/// Join evaluation
///
/// Joins two tables on a column-equality condition. The probe side is
/// indexed by coerced key so matching is linear; output order is the same
/// as a nested loop over the driving table.
use super::ast::{Join, JoinType, SelectColumn};
use super::row::Row;
use super::value::Value;
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

/// Hashable form of a coerced join key. NULL and NaN never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Number(u64),
    Text(String),
}

impl JoinKey {
    fn from_value(value: &Value) -> Option<Self> {
        match value.coerce() {
            Value::Number(n) if n.is_nan() => None,
            // -0.0 and 0.0 must hash alike
            Value::Number(n) => Some(JoinKey::Number((n + 0.0).to_bits())),
            Value::Text(s) => Some(JoinKey::Text(s)),
            Value::Null => None,
        }
    }
}

/// Joins `left_rows` (the FROM table) with `right_rows` (the JOIN table).
///
/// Every output row carries all left fields as `left_table.field`, all
/// right fields as `right_table.field` (NULL when that side is missing), and
/// each requested output field under the name it was requested with.
pub fn join(
    join: &Join,
    left_table: &str,
    left_rows: &[Row],
    right_rows: &[Row],
    fields: &[SelectColumn],
) -> Result<Vec<Row>> {
    let (left_key, right_key) = key_fields(join, left_table);
    let builder = RowBuilder::new(left_table, &join.table, left_rows, right_rows, fields);

    let mut result = Vec::new();
    match join.join_type {
        JoinType::Inner | JoinType::Left => {
            let index = build_index(right_rows, right_key)?;
            for l_row in left_rows {
                let matches = probe(&index, l_row, left_key)?;
                for &r_idx in matches {
                    result.push(builder.build(Some(l_row), Some(&right_rows[r_idx])));
                }
                if matches.is_empty() && join.join_type == JoinType::Left {
                    // Left row with NULL values for right side
                    result.push(builder.build(Some(l_row), None));
                }
            }
        }
        JoinType::Right => {
            let index = build_index(left_rows, left_key)?;
            for r_row in right_rows {
                let matches = probe(&index, r_row, right_key)?;
                for &l_idx in matches {
                    result.push(builder.build(Some(&left_rows[l_idx]), Some(r_row)));
                }
                if matches.is_empty() {
                    // NULL values for left side with right row
                    result.push(builder.build(None, Some(r_row)));
                }
            }
        }
    }

    debug!(
        join_type = %join.join_type,
        left = left_rows.len(),
        right = right_rows.len(),
        output = result.len(),
        "join evaluated"
    );

    Ok(result)
}

/// Resolves which ON field belongs to which table.
///
/// `ON b.x = a.y` with `a` as the FROM table is accepted as `a.y = b.x`.
fn key_fields<'a>(join: &'a Join, left_table: &str) -> (&'a str, &'a str) {
    let qualifier = |field: &str| field.split_once('.').map(|(table, _)| table.to_string());
    let (mut left, mut right) = (join.left_field.as_str(), join.right_field.as_str());

    let left_names_base = qualifier(left).as_deref() == Some(left_table);
    let right_names_base = qualifier(right).as_deref() == Some(left_table);
    if right_names_base && !left_names_base {
        std::mem::swap(&mut left, &mut right);
    }
    (left, right)
}

fn key_of(row: &Row, field: &str) -> Result<Option<JoinKey>> {
    let value = row
        .resolve(field)
        .ok_or_else(|| Error::Field(field.to_string()))?;
    Ok(JoinKey::from_value(value))
}

fn build_index(rows: &[Row], field: &str) -> Result<HashMap<JoinKey, Vec<usize>>> {
    let mut index: HashMap<JoinKey, Vec<usize>> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        if let Some(key) = key_of(row, field)? {
            index.entry(key).or_default().push(idx);
        }
    }
    Ok(index)
}

fn probe<'i>(
    index: &'i HashMap<JoinKey, Vec<usize>>,
    row: &Row,
    field: &str,
) -> Result<&'i [usize]> {
    Ok(key_of(row, field)?
        .and_then(|key| index.get(&key))
        .map(Vec::as_slice)
        .unwrap_or(&[]))
}

/// Builds joined rows with a fixed key set.
struct RowBuilder<'a> {
    left_table: &'a str,
    right_table: &'a str,
    left_columns: Vec<String>,
    right_columns: Vec<String>,
    requested: Vec<&'a str>,
}

impl<'a> RowBuilder<'a> {
    fn new(
        left_table: &'a str,
        right_table: &'a str,
        left_rows: &[Row],
        right_rows: &[Row],
        fields: &'a [SelectColumn],
    ) -> Self {
        let shape = |rows: &[Row]| rows.first().map(|r| r.columns.clone()).unwrap_or_default();
        let requested = fields
            .iter()
            .filter_map(|f| match f {
                SelectColumn::Column(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();

        Self {
            left_table,
            right_table,
            left_columns: shape(left_rows),
            right_columns: shape(right_rows),
            requested,
        }
    }

    fn build(&self, left: Option<&Row>, right: Option<&Row>) -> Row {
        let cell = |row: Option<&Row>, name: &str| {
            row.and_then(|r| r.get(name)).cloned().unwrap_or(Value::Null)
        };

        let mut row = Row::new();
        for col in &self.left_columns {
            row.set(format!("{}.{}", self.left_table, col), cell(left, col));
        }
        for col in &self.right_columns {
            row.set(format!("{}.{}", self.right_table, col), cell(right, col));
        }

        for field in &self.requested {
            let value = match field.split_once('.') {
                Some((table, name)) if table == self.left_table => cell(left, name),
                Some((table, name)) if table == self.right_table => cell(right, name),
                Some(_) => Value::Null,
                None if self.left_columns.iter().any(|c| c == *field) => cell(left, field),
                None => cell(right, field),
            };
            row.set(*field, value);
        }

        row
    }
}
