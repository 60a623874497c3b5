/// Typed cell values and text coercion
///
/// Tables hold text cells; numbers only appear after coercion (comparisons,
/// aggregates) so stored data round-trips unchanged.
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Comparison form of this value: text cells go through [`coerce`].
    pub fn coerce(&self) -> Value {
        match self {
            Value::Text(raw) => coerce(raw),
            other => other.clone(),
        }
    }

    /// Numeric form used by SUM/AVG/MIN/MAX; anything non-numeric is NaN.
    pub fn to_number(&self) -> f64 {
        match self.coerce() {
            Value::Number(n) => n,
            _ => f64::NAN,
        }
    }

    /// The uncoerced text seen by LIKE. Null has none.
    pub fn raw_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(format_number(*n))),
            Value::Null => None,
        }
    }

    /// Text written back to a table store.
    pub fn to_cell(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Rendering used in error messages, with strings quoted.
    pub fn quoted(&self) -> String {
        match self {
            Value::Text(s) => format!("'{}'", s),
            other => other.to_string(),
        }
    }

    /// Total order over coerced values: NULL < numbers < strings.
    ///
    /// NaN compares equal to every number so sorting stays stable.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Number(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

/// Normalizes a raw cell or literal for comparison.
///
/// One layer of matching single or double quotes is removed; the rest
/// becomes a number when it is non-blank and parses fully as a finite number.
pub fn coerce(raw: &str) -> Value {
    let unquoted = strip_quotes(raw);
    match parse_number(unquoted) {
        Some(n) => Value::Number(n),
        None => Value::Text(unquoted.to_string()),
    }
}

/// Removes one layer of matching `'...'` or `"..."` quoting.
pub fn strip_quotes(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'\'' || first == b'"') && bytes[bytes.len() - 1] == first {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Value::Number(n) => serializer.serialize_str(&format_number(*n)),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Null => serializer.serialize_unit(),
        }
    }
}
