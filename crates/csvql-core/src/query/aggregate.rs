/// Aggregate evaluation for GROUP BY and bare aggregate queries
use super::ast::{AggregateArgument, AggregateFunction, SelectColumn};
use super::row::Row;
use super::value::Value;
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::trace;

/// Composite group key; NULL is kept distinct from empty text.
type GroupKey = Vec<Option<String>>;

/// Partitions `rows` by the `group_by` fields and computes each aggregate
/// in `columns` per group.
///
/// Groups come out in first-occurrence order. Each output row holds the
/// group-by fields followed by the aggregates under their labels; plain
/// columns that are not grouped are dropped.
pub fn aggregate_grouped(
    rows: &[Row],
    group_by: &[String],
    columns: &[SelectColumn],
) -> Result<Vec<Row>> {
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Row>> = Vec::new();

    for row in rows {
        let mut key = Vec::with_capacity(group_by.len());
        for field in group_by {
            let value = row
                .resolve(field)
                .ok_or_else(|| Error::Field(field.clone()))?;
            key.push(value.raw_text().map(|t| t.into_owned()));
        }
        let idx = *positions.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(row);
    }

    trace!(groups = groups.len(), rows = rows.len(), "rows grouped");

    groups
        .iter()
        .map(|members| {
            let mut out = Row::new();
            for field in group_by {
                let value = members[0].resolve(field).cloned().unwrap_or(Value::Null);
                out.set(field.clone(), value);
            }
            for column in columns {
                if let SelectColumn::Aggregate { function, argument } = column {
                    out.set(column.label(), compute(*function, argument, members)?);
                }
            }
            Ok(out)
        })
        .collect()
}

/// Computes the aggregates in `columns` over all of `rows` as one row.
pub fn aggregate_bare(rows: &[Row], columns: &[SelectColumn]) -> Result<Row> {
    let members: Vec<&Row> = rows.iter().collect();
    let mut out = Row::new();
    for column in columns {
        if let SelectColumn::Aggregate { function, argument } = column {
            out.set(column.label(), compute(*function, argument, &members)?);
        }
    }
    Ok(out)
}

fn compute(function: AggregateFunction, argument: &AggregateArgument, rows: &[&Row]) -> Result<Value> {
    if function == AggregateFunction::Count {
        return Ok(Value::Number(rows.len() as f64));
    }

    let field = match argument {
        AggregateArgument::Column(field) => field,
        AggregateArgument::Wildcard => {
            return Err(Error::UnsupportedOperation(format!("{}(*)", function)))
        }
    };

    let mut numbers = Vec::with_capacity(rows.len());
    for row in rows {
        let value = row
            .resolve(field)
            .ok_or_else(|| Error::Field(field.clone()))?;
        numbers.push(value.to_number());
    }

    let sum = || numbers.iter().sum::<f64>();
    let value = match function {
        AggregateFunction::Sum => Value::Number(sum()),
        _ if numbers.is_empty() => Value::Null,
        AggregateFunction::Avg => Value::Number(sum() / numbers.len() as f64),
        AggregateFunction::Min => Value::Number(fold_nan(&numbers, |a, b| if b < a { b } else { a })),
        AggregateFunction::Max => Value::Number(fold_nan(&numbers, |a, b| if b > a { b } else { a })),
        AggregateFunction::Count => Value::Number(numbers.len() as f64),
    };
    Ok(value)
}

// f64::min/max skip NaN; a non-numeric cell must poison the result instead.
fn fold_nan(numbers: &[f64], pick: impl Fn(f64, f64) -> f64) -> f64 {
    numbers.iter().skip(1).fold(numbers[0], |acc, &n| {
        if acc.is_nan() || n.is_nan() {
            f64::NAN
        } else {
            pick(acc, n)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> Vec<Row> {
        vec![
            Row::from_pairs([("name", "Ann"), ("dept", "math"), ("score", "90")]),
            Row::from_pairs([("name", "Bob"), ("dept", "art"), ("score", "70")]),
            Row::from_pairs([("name", "Cid"), ("dept", "math"), ("score", "80")]),
        ]
    }

    fn agg(function: AggregateFunction, field: Option<&str>) -> SelectColumn {
        SelectColumn::Aggregate {
            function,
            argument: match field {
                Some(f) => AggregateArgument::Column(f.to_string()),
                None => AggregateArgument::Wildcard,
            },
        }
    }

    #[test]
    fn test_grouped_first_occurrence_order() {
        let columns = vec![
            SelectColumn::Column("dept".to_string()),
            SelectColumn::Column("name".to_string()),
            agg(AggregateFunction::Count, None),
            agg(AggregateFunction::Avg, Some("score")),
        ];
        let rows = aggregate_grouped(&scores(), &["dept".to_string()], &columns).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].columns, vec!["dept", "COUNT(*)", "AVG(score)"]);
        assert_eq!(rows[0].get("dept"), Some(&Value::text("math")));
        assert_eq!(rows[0].get("COUNT(*)"), Some(&Value::Number(2.0)));
        assert_eq!(rows[0].get("AVG(score)"), Some(&Value::Number(85.0)));
        assert_eq!(rows[1].get("dept"), Some(&Value::text("art")));
    }

    #[test]
    fn test_grouped_min_max_sum() {
        let columns = vec![
            agg(AggregateFunction::Min, Some("score")),
            agg(AggregateFunction::Max, Some("score")),
            agg(AggregateFunction::Sum, Some("score")),
        ];
        let rows = aggregate_grouped(&scores(), &["dept".to_string()], &columns).unwrap();
        assert_eq!(rows[0].get("MIN(score)"), Some(&Value::Number(80.0)));
        assert_eq!(rows[0].get("MAX(score)"), Some(&Value::Number(90.0)));
        assert_eq!(rows[0].get("SUM(score)"), Some(&Value::Number(170.0)));
    }

    #[test]
    fn test_non_numeric_poisons() {
        let rows = vec![
            Row::from_pairs([("score", "10")]),
            Row::from_pairs([("score", "n/a")]),
        ];
        for function in [AggregateFunction::Sum, AggregateFunction::Min, AggregateFunction::Max] {
            let out = aggregate_bare(&rows, &[agg(function, Some("score"))]).unwrap();
            match &out.values[0] {
                Value::Number(n) => assert!(n.is_nan(), "{} should be NaN", function),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_bare_on_empty_input() {
        let columns = vec![
            agg(AggregateFunction::Count, Some("score")),
            agg(AggregateFunction::Sum, Some("score")),
            agg(AggregateFunction::Avg, Some("score")),
            agg(AggregateFunction::Max, Some("score")),
        ];
        let row = aggregate_bare(&[], &columns).unwrap();
        assert_eq!(
            row.values,
            vec![Value::Number(0.0), Value::Number(0.0), Value::Null, Value::Null]
        );
    }

    #[test]
    fn test_missing_argument_field() {
        let err = aggregate_bare(&scores(), &[agg(AggregateFunction::Sum, Some("age"))]).unwrap_err();
        assert!(matches!(err, Error::Field(f) if f == "age"));
    }

    #[test]
    fn test_group_key_keeps_null_apart_from_empty() {
        let rows = vec![
            Row::from_pairs([("k", Value::Null)]),
            Row::from_pairs([("k", Value::text(""))]),
        ];
        let out = aggregate_grouped(&rows, &["k".to_string()], &[agg(AggregateFunction::Count, None)])
            .unwrap();
        assert_eq!(out.len(), 2);
    }
}
