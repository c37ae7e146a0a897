//! Parameterized partial `UPDATE` statement builder.
//!
//! # Invariants
//! - Only columns explicitly set are written.
//! - Values are always bound positionally; column names come from `'static`
//!   identifiers owned by the caller, never from input.

use rusqlite::types::Value;

/// Accumulates `(column, value)` assignments for one row update.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: &'static str,
    key_column: &'static str,
    assignments: Vec<(&'static str, Value)>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str, key_column: &'static str) -> Self {
        Self {
            table,
            key_column,
            assignments: Vec::new(),
        }
    }

    /// Adds an assignment unconditionally.
    pub fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Adds an assignment only when `value` is present.
    pub fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(column, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.assignments.iter().map(|(column, _)| *column)
    }

    /// Produces SQL and bind values for the row identified by `key`.
    ///
    /// Returns `None` when no assignment was added.
    pub fn build(self, key: impl Into<Value>) -> Option<(String, Vec<Value>)> {
        if self.assignments.is_empty() {
            return None;
        }

        let set_clause = self
            .assignments
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let key_index = self.assignments.len() + 1;
        let sql = format!(
            "UPDATE {} SET {set_clause} WHERE {} = ?{key_index};",
            self.table, self.key_column
        );

        let mut values = self
            .assignments
            .into_iter()
            .map(|(_, value)| value)
            .collect::<Vec<_>>();
        values.push(key.into());
        Some((sql, values))
    }
}

#[cfg(test)]
mod tests {
    use super::UpdateBuilder;
    use rusqlite::types::Value;

    #[test]
    fn empty_builder_produces_no_statement() {
        let builder = UpdateBuilder::new("users", "id").set_opt::<i64>("age", None);
        assert!(builder.is_empty());
        assert!(builder.build(1_i64).is_none());
    }

    #[test]
    fn only_supplied_columns_are_emitted() {
        let builder = UpdateBuilder::new("users", "id")
            .set_opt::<String>("name", None)
            .set_opt("email", Some("new@example.com".to_string()))
            .set_opt("age", Some(31_i32));
        assert_eq!(builder.columns().collect::<Vec<_>>(), vec!["email", "age"]);

        let (sql, values) = builder.build(9_i64).unwrap();
        assert_eq!(sql, "UPDATE users SET email = ?1, age = ?2 WHERE id = ?3;");
        assert_eq!(
            values,
            vec![
                Value::Text("new@example.com".to_string()),
                Value::Integer(31),
                Value::Integer(9),
            ]
        );
    }
}
