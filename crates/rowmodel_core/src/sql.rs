//! SQL assembly.
//!
//! All statement text emitted by the model operations is built here.
//! The shapes are part of the compatibility contract and are covered
//! by golden tests. Table and column identifiers are validated against
//! a conservative allow-list before interpolation, and sort direction
//! is a closed enum, so no caller-supplied text reaches the statement
//! unchecked.

use crate::error::{CoreError, CoreResult};
use crate::value::Value;
use std::fmt::Write as _;

/// Sort direction for `ORDER BY` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// The SQL keyword for this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Match {
    Equals(Value),
    IsNull,
    In(Vec<Value>),
}

/// A conjunctive predicate over columns, rendered in insertion order.
///
/// One equality per entry, `IS NULL` for null values (no bound
/// parameter), `IN(?,?,…)` for sequences with the values flattened
/// into the bind list in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<(String, Match)>,
}

impl Predicate {
    /// Creates an empty predicate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no conditions were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Adds an equality condition. A `Null` value becomes `IS NULL`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        let cond = if value.is_null() {
            Match::IsNull
        } else {
            Match::Equals(value)
        };
        self.conditions.push((column.to_string(), cond));
        self
    }

    /// Adds an explicit `IS NULL` condition.
    #[must_use]
    pub fn is_null(mut self, column: &str) -> Self {
        self.conditions.push((column.to_string(), Match::IsNull));
        self
    }

    /// Adds an `IN(…)` condition, one placeholder per element.
    #[must_use]
    pub fn any_of(mut self, column: &str, values: Vec<Value>) -> Self {
        self.conditions.push((column.to_string(), Match::In(values)));
        self
    }

    /// Renders the predicate as `(clause, bound values)`.
    ///
    /// An empty predicate renders an empty clause; callers that embed
    /// it after `WHERE` then produce a statement the driver rejects at
    /// prepare time, which degrades degenerate lookups to the
    /// silent-failure path.
    pub fn render(&self) -> CoreResult<(String, Vec<Value>)> {
        let mut clause = String::new();
        let mut bound = Vec::new();

        for (i, (column, cond)) in self.conditions.iter().enumerate() {
            check_identifier(column, "column")?;
            if i > 0 {
                clause.push_str(" AND ");
            }
            match cond {
                Match::Equals(value) => {
                    let _ = write!(clause, "`{column}` = ?");
                    bound.push(value.clone());
                }
                Match::IsNull => {
                    let _ = write!(clause, "`{column}` IS NULL");
                }
                Match::In(values) => {
                    let placeholders = vec!["?"; values.len()].join(",");
                    let _ = write!(clause, "`{column}` IN({placeholders})");
                    bound.extend(values.iter().cloned());
                }
            }
        }

        Ok((clause, bound))
    }
}

/// `INSERT INTO `t` (a, b) VALUES (?, ?);`
pub fn insert(table: &str, columns: &[&str]) -> CoreResult<String> {
    check_identifier(table, "table")?;
    for column in columns {
        check_identifier(column, "column")?;
    }
    let placeholders = vec!["?"; columns.len()].join(", ");
    Ok(format!(
        "INSERT INTO `{table}` ({}) VALUES ({placeholders});",
        columns.join(", ")
    ))
}

/// `INSERT INTO `t` (a, b) VALUES (?, ?), (?, ?)`
///
/// No trailing semicolon on the batch shape.
pub fn batch_insert(table: &str, columns: &[&str], rows: usize) -> CoreResult<String> {
    check_identifier(table, "table")?;
    for column in columns {
        check_identifier(column, "column")?;
    }
    let placeholders = vec!["?"; columns.len()].join(", ");
    let mut sql = format!("INSERT INTO `{table}` ({}) VALUES", columns.join(", "));
    for i in 0..rows {
        if i > 0 {
            sql.push(',');
        }
        let _ = write!(sql, " ({placeholders})");
    }
    Ok(sql)
}

/// `SELECT * FROM `t`;` with an optional `ORDER BY` tail.
pub fn select_all(table: &str, order: &[(String, SortOrder)]) -> CoreResult<String> {
    check_identifier(table, "table")?;
    let mut sql = format!("SELECT * FROM `{table}`");
    if !order.is_empty() {
        let mut clauses = Vec::with_capacity(order.len());
        for (column, direction) in order {
            check_identifier(column, "column")?;
            clauses.push(format!("`{column}` {}", direction.as_str()));
        }
        let _ = write!(sql, " ORDER BY {}", clauses.join(", "));
    }
    sql.push(';');
    Ok(sql)
}

/// `SELECT * FROM `t` WHERE <clause>;`, optionally `LIMIT 1`.
pub fn select_where(table: &str, clause: &str, limit_one: bool) -> CoreResult<String> {
    check_identifier(table, "table")?;
    Ok(if limit_one {
        format!("SELECT * FROM `{table}` WHERE {clause} LIMIT 1;")
    } else {
        format!("SELECT * FROM `{table}` WHERE {clause};")
    })
}

/// `UPDATE `t` SET `a` = ?, `b` = ? WHERE <clause>;`
pub fn update(table: &str, columns: &[&str], clause: &str) -> CoreResult<String> {
    check_identifier(table, "table")?;
    let mut assignments = Vec::with_capacity(columns.len());
    for column in columns {
        check_identifier(column, "column")?;
        assignments.push(format!("`{column}` = ?"));
    }
    Ok(format!(
        "UPDATE `{table}` SET {} WHERE {clause};",
        assignments.join(", ")
    ))
}

/// `DELETE FROM `t` WHERE <clause>;`
pub fn delete_where(table: &str, clause: &str) -> CoreResult<String> {
    check_identifier(table, "table")?;
    Ok(format!("DELETE FROM `{table}` WHERE {clause};"))
}

/// `DELETE FROM `t`;`
pub fn delete_all(table: &str) -> CoreResult<String> {
    check_identifier(table, "table")?;
    Ok(format!("DELETE FROM `{table}`;"))
}

/// `SELECT COUNT(*) FROM `t`` with no terminator.
pub fn count(table: &str) -> CoreResult<String> {
    check_identifier(table, "table")?;
    Ok(format!("SELECT COUNT(*) FROM `{table}`"))
}

fn check_identifier(ident: &str, kind: &'static str) -> CoreResult<()> {
    if is_valid_identifier(ident) {
        Ok(())
    } else {
        Err(CoreError::invalid_identifier(kind, ident))
    }
}

fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_shape() {
        let sql = insert("users", &["user_uuid", "first_name"]).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO `users` (user_uuid, first_name) VALUES (?, ?);"
        );
    }

    #[test]
    fn batch_insert_shape_has_no_trailing_semicolon() {
        let sql = batch_insert("users", &["a", "b"], 2).unwrap();
        assert_eq!(sql, "INSERT INTO `users` (a, b) VALUES (?, ?), (?, ?)");
    }

    #[test]
    fn select_all_shape() {
        assert_eq!(select_all("users", &[]).unwrap(), "SELECT * FROM `users`;");
        let order = vec![
            ("first_name".to_string(), SortOrder::Asc),
            ("last_name".to_string(), SortOrder::Desc),
        ];
        assert_eq!(
            select_all("users", &order).unwrap(),
            "SELECT * FROM `users` ORDER BY `first_name` ASC, `last_name` DESC;"
        );
    }

    #[test]
    fn where_clause_eq_null_and_in() {
        let (clause, bound) = Predicate::new()
            .eq("a", 1i64)
            .eq("x", Value::Null)
            .any_of("c", vec![Value::Integer(1), Value::Integer(2)])
            .render()
            .unwrap();
        assert_eq!(clause, "`a` = ? AND `x` IS NULL AND `c` IN(?,?)");
        assert_eq!(
            bound,
            vec![Value::Integer(1), Value::Integer(1), Value::Integer(2)]
        );
    }

    #[test]
    fn update_shape() {
        let sql = update("users", &["last_name"], "`user_uuid` = ?").unwrap();
        assert_eq!(
            sql,
            "UPDATE `users` SET `last_name` = ? WHERE `user_uuid` = ?;"
        );
    }

    #[test]
    fn delete_shapes() {
        assert_eq!(
            delete_where("users", "`user_uuid` = ?").unwrap(),
            "DELETE FROM `users` WHERE `user_uuid` = ?;"
        );
        assert_eq!(delete_all("users").unwrap(), "DELETE FROM `users`;");
    }

    #[test]
    fn count_shape_has_no_terminator() {
        assert_eq!(count("users").unwrap(), "SELECT COUNT(*) FROM `users`");
    }

    #[test]
    fn select_where_shapes() {
        assert_eq!(
            select_where("users", "`a` = ?", true).unwrap(),
            "SELECT * FROM `users` WHERE `a` = ? LIMIT 1;"
        );
        assert_eq!(
            select_where("users", "`a` = ?", false).unwrap(),
            "SELECT * FROM `users` WHERE `a` = ?;"
        );
    }

    #[test]
    fn identifiers_are_allow_listed() {
        assert!(matches!(
            insert("users;drop", &["a"]),
            Err(CoreError::InvalidIdentifier { kind: "table", .. })
        ));
        assert!(matches!(
            insert("users", &["a b"]),
            Err(CoreError::InvalidIdentifier { kind: "column", .. })
        ));
        assert!(matches!(
            select_all("users", &[("1col".to_string(), SortOrder::Asc)]),
            Err(CoreError::InvalidIdentifier { .. })
        ));
        assert!(Predicate::new().eq("", 1i64).render().is_err());
    }

    #[test]
    fn empty_predicate_renders_empty_clause() {
        let (clause, bound) = Predicate::new().render().unwrap();
        assert!(clause.is_empty());
        assert!(bound.is_empty());
    }
}
