/// WHERE predicate evaluation
///
/// Conditions are checked against coerced values; LIKE matches the raw text.
use super::ast::{ComparisonOperator, Condition, Expression, Literal, LogicalOperator};
use super::row::Row;
use super::value::Value;
use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;

/// Evaluates one condition against `row`.
pub fn evaluate(row: &Row, condition: &Condition) -> Result<bool> {
    let cell = row
        .resolve(&condition.field)
        .ok_or_else(|| Error::Field(condition.field.clone()))?;

    if condition.operator == ComparisonOperator::Like {
        let pattern = match &condition.value {
            Literal::String(text) => like_regex(text)?,
            other => like_regex(&other.to_string())?,
        };
        return Ok(cell.raw_text().is_some_and(|text| pattern.is_match(&text)));
    }

    compare(&cell.coerce(), condition.operator, &condition.value.coerced())
}

/// Evaluates a WHERE expression tree. AND/OR short-circuit.
pub fn evaluate_expression(row: &Row, expression: &Expression) -> Result<bool> {
    match expression {
        Expression::Condition(condition) => evaluate(row, condition),
        Expression::LogicalOp { left, op, right } => {
            let left = evaluate_expression(row, left)?;
            match op {
                LogicalOperator::And if !left => Ok(false),
                LogicalOperator::Or if left => Ok(true),
                _ => evaluate_expression(row, right),
            }
        }
        Expression::Not(inner) => Ok(!evaluate_expression(row, inner)?),
    }
}

/// Compares two coerced values.
///
/// Equality across different kinds is false (NULL = NULL is true).
/// Ordering a number against a string is a type mismatch; ordering
/// against NULL is false.
pub fn compare(left: &Value, op: ComparisonOperator, right: &Value) -> Result<bool> {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) | (_, Value::Null) => None,
        _ if op.is_relational() => {
            return Err(Error::TypeMismatch {
                op,
                left: left.clone(),
                right: right.clone(),
            })
        }
        _ => None,
    };

    let result = match op {
        ComparisonOperator::Eq => ordering == Some(Ordering::Equal),
        ComparisonOperator::Ne => ordering != Some(Ordering::Equal),
        ComparisonOperator::Lt => ordering == Some(Ordering::Less),
        ComparisonOperator::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        ComparisonOperator::Gt => ordering == Some(Ordering::Greater),
        ComparisonOperator::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        ComparisonOperator::Like => {
            return Err(Error::UnsupportedOperation(
                "LIKE on coerced values".to_string(),
            ))
        }
    };
    Ok(result)
}

/// Translates a LIKE pattern into an anchored, case-insensitive regex.
///
/// `%` matches any run, `_` exactly one character; everything else is literal.
pub fn like_regex(pattern: &str) -> Result<Regex> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    translated.push('^');
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '%' | '_' => {
                translated.push_str(&regex::escape(&literal));
                literal.clear();
                translated.push_str(if ch == '%' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    translated.push_str(&regex::escape(&literal));
    translated.push('$');

    RegexBuilder::new(&translated)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| Error::UnsupportedOperation(format!("LIKE pattern '{}': {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(field: &str, operator: ComparisonOperator, value: Literal) -> Condition {
        Condition {
            field: field.to_string(),
            operator,
            value,
        }
    }

    fn student() -> Row {
        Row::from_pairs([("id", "2"), ("name", "John"), ("age", "30")])
    }

    #[test]
    fn test_numeric_comparison_on_text_cells() {
        let row = student();
        let gt = condition("age", ComparisonOperator::Gt, Literal::Number("25".into()));
        assert!(evaluate(&row, &gt).unwrap());

        // "30" < "4" as strings, but 30 > 4 as numbers
        let lt = condition("age", ComparisonOperator::Lt, Literal::Number("4".into()));
        assert!(!evaluate(&row, &lt).unwrap());
    }

    #[test]
    fn test_quoted_literal_is_coerced() {
        let row = student();
        let eq = condition("id", ComparisonOperator::Eq, Literal::String("2".into()));
        assert!(evaluate(&row, &eq).unwrap());

        let name = condition("name", ComparisonOperator::Ne, Literal::String("Jane".into()));
        assert!(evaluate(&row, &name).unwrap());
    }

    #[test]
    fn test_missing_field() {
        let row = student();
        let missing = condition("email", ComparisonOperator::Eq, Literal::Bare("x".into()));
        assert!(matches!(evaluate(&row, &missing), Err(Error::Field(f)) if f == "email"));
    }

    #[test]
    fn test_type_mismatch_on_relational() {
        let row = student();
        let bad = condition("name", ComparisonOperator::Gt, Literal::Number("5".into()));
        assert!(matches!(
            evaluate(&row, &bad),
            Err(Error::TypeMismatch { .. })
        ));

        // Equality across kinds is simply false
        let eq = condition("name", ComparisonOperator::Eq, Literal::Number("5".into()));
        assert!(!evaluate(&row, &eq).unwrap());
    }

    #[test]
    fn test_null_comparisons() {
        let row = Row::from_pairs([("course", Value::Null)]);
        let eq_null = condition("course", ComparisonOperator::Eq, Literal::Null);
        assert!(evaluate(&row, &eq_null).unwrap());

        let gt = condition("course", ComparisonOperator::Gt, Literal::String("A".into()));
        assert!(!evaluate(&row, &gt).unwrap());

        let like = condition("course", ComparisonOperator::Like, Literal::String("%".into()));
        assert!(!evaluate(&row, &like).unwrap());
    }

    #[test]
    fn test_like() {
        let row = student();
        let cases = [
            ("J%", true),
            ("%OH%", true),
            ("J_hn", true),
            ("J_n", false),
            ("john", true),
            ("Jo", false),
            ("J.hn", false),
        ];
        for (pattern, expected) in cases {
            let like = condition("name", ComparisonOperator::Like, Literal::String(pattern.into()));
            assert_eq!(evaluate(&row, &like).unwrap(), expected, "pattern {}", pattern);
        }
    }

    #[test]
    fn test_like_matches_raw_text() {
        let row = Row::from_pairs([("code", "007")]);
        let like = condition("code", ComparisonOperator::Like, Literal::String("00%".into()));
        assert!(evaluate(&row, &like).unwrap());
    }

    #[test]
    fn test_expression_tree() {
        let row = student();
        let young = Expression::Condition(condition(
            "age",
            ComparisonOperator::Lt,
            Literal::Number("18".into()),
        ));
        let john = Expression::Condition(condition(
            "name",
            ComparisonOperator::Eq,
            Literal::String("John".into()),
        ));

        let or = Expression::LogicalOp {
            left: Box::new(young.clone()),
            op: LogicalOperator::Or,
            right: Box::new(john.clone()),
        };
        assert!(evaluate_expression(&row, &or).unwrap());

        let and = Expression::LogicalOp {
            left: Box::new(young),
            op: LogicalOperator::And,
            right: Box::new(john.clone()),
        };
        assert!(!evaluate_expression(&row, &and).unwrap());
        assert!(!evaluate_expression(&row, &Expression::Not(Box::new(john))).unwrap());
    }

    #[test]
    fn test_evaluate_is_pure() {
        let row = student();
        let before = row.clone();
        let cond = condition("age", ComparisonOperator::Ge, Literal::Number("30".into()));
        let first = evaluate(&row, &cond).unwrap();
        let second = evaluate(&row, &cond).unwrap();
        assert_eq!(first, second);
        assert_eq!(row, before);
    }
}
