/// Result and table rows
///
/// A row is an ordered field → value mapping. Keys are either bare (`name`)
/// or table-qualified (`student.name`).
use super::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(field, value)` pairs, keeping their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut row = Row::new();
        for (key, value) in pairs {
            row.set(key, value.into());
        }
        row
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Exact key lookup.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| &self.values[idx])
    }

    /// Field reference lookup.
    ///
    /// Tries the exact key, then `table.field` → `field`, then
    /// `field` → the first `<table>.field` key. The executor rejects
    /// qualifiers naming a table the statement does not read before any
    /// row is resolved, so the `table.field` → `field` step only applies
    /// to the row's own table.
    pub fn resolve(&self, field: &str) -> Option<&Value> {
        if let Some(value) = self.get(field) {
            return Some(value);
        }
        match field.split_once('.') {
            Some((_, bare)) => self.get(bare),
            None => {
                let suffix = format!(".{}", field);
                self.columns
                    .iter()
                    .position(|c| c.ends_with(&suffix))
                    .map(|idx| &self.values[idx])
            }
        }
    }

    /// Inserts or replaces `name`. Replacing keeps the original position.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.columns.iter().position(|c| *c == name) {
            Some(idx) => self.values[idx] = value,
            None => {
                self.columns.push(name);
                self.values.push(value);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut row = Row::from_pairs([("id", "1"), ("name", "Ann")]);
        row.set("id", Value::text("2"));
        assert_eq!(row.columns, vec!["id", "name"]);
        assert_eq!(row.get("id"), Some(&Value::text("2")));
    }

    #[test]
    fn test_resolve_qualified_and_bare() {
        let bare = Row::from_pairs([("name", "Ann")]);
        assert_eq!(bare.resolve("student.name"), Some(&Value::text("Ann")));

        let joined = Row::from_pairs([("student.name", "Ann"), ("enrollment.course", "Math")]);
        assert_eq!(joined.resolve("course"), Some(&Value::text("Math")));
        assert_eq!(joined.resolve("student.name"), Some(&Value::text("Ann")));
        assert_eq!(joined.resolve("age"), None);
    }
}
