//! The model trait: declaration, change tracking and persistence.

use crate::cursor::RowCursor;
use crate::database::Database;
use crate::error::{CoreError, CoreResult};
use crate::fields::FieldMap;
use crate::sql::{self, Predicate, SortOrder};
use crate::value::{Comparison, Row, Value};

/// Primary key declaration of a model: one column, or an ordered set
/// of columns for composite keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKey {
    /// A single key column.
    Single(&'static str),
    /// An ordered set of key columns.
    Composite(&'static [&'static str]),
}

impl PrimaryKey {
    /// The key columns, in declaration order.
    #[must_use]
    pub fn columns(self) -> Vec<&'static str> {
        match self {
            Self::Single(column) => vec![column],
            Self::Composite(columns) => columns.to_vec(),
        }
    }

    /// The single key column, if this is not a composite key.
    #[must_use]
    pub const fn single(self) -> Option<&'static str> {
        match self {
            Self::Single(column) => Some(column),
            Self::Composite(_) => None,
        }
    }
}

/// An Active-Record style table model.
///
/// A concrete entity type declares its table and primary key, owns a
/// [`FieldMap`], and gains every persistence operation as a provided
/// method. Operations execute against an explicitly passed
/// [`Database`] handle and map result rows back into instances via
/// the `transform` hook and the `from_fields` factory.
///
/// # Example
///
/// ```rust,ignore
/// struct User {
///     fields: FieldMap,
/// }
///
/// impl Model for User {
///     fn table() -> &'static str {
///         "users"
///     }
///     fn primary_key() -> PrimaryKey {
///         PrimaryKey::Single("user_uuid")
///     }
///     fn from_fields(fields: FieldMap) -> Self {
///         Self { fields }
///     }
///     fn fields(&self) -> &FieldMap {
///         &self.fields
///     }
///     fn fields_mut(&mut self) -> &mut FieldMap {
///         &mut self.fields
///     }
/// }
/// ```
pub trait Model: Sized {
    /// The table this model persists to.
    fn table() -> &'static str;

    /// The primary key column(s).
    fn primary_key() -> PrimaryKey;

    /// Constructs an instance around a field map. Every
    /// row-materializing operation builds instances through this
    /// factory.
    fn from_fields(fields: FieldMap) -> Self;

    /// The field storage.
    fn fields(&self) -> &FieldMap;

    /// Mutable field storage.
    fn fields_mut(&mut self) -> &mut FieldMap;

    /// Equality strategy for the tracked setter's "unchanged" check.
    fn comparison() -> Comparison {
        Comparison::Strict
    }

    /// Hook applied to every row fetched from storage before
    /// assignment, for per-model type coercion. Identity by default.
    fn transform(row: Row) -> Row {
        row
    }

    /// Creates an empty instance.
    fn create() -> Self {
        Self::from_fields(FieldMap::new())
    }

    /// Column names of the current fields, in insertion order.
    fn keys(&self) -> Vec<&str> {
        self.fields().keys().collect()
    }

    /// Values of the current fields, in insertion order.
    fn values(&self) -> Vec<&Value> {
        self.fields().values().collect()
    }

    /// The value for one column, if present.
    fn value(&self, key: &str) -> Option<&Value> {
        self.fields().get(key)
    }

    /// Clones the fields into a row.
    fn to_row(&self) -> Row {
        self.fields().to_row()
    }

    /// True when at least one field changed since load/save.
    fn has_changes(&self) -> bool {
        self.fields().has_changes()
    }

    /// The changed keys, in first-touch order.
    fn changed_keys(&self) -> Vec<&str> {
        self.fields().changed_keys().collect()
    }

    /// Sets a field through change tracking: a no-op when the value is
    /// unchanged under the model's comparison strategy.
    fn set(&mut self, key: &str, value: impl Into<Value>) {
        let comparison = Self::comparison();
        self.fields_mut().set(key, value.into(), comparison);
    }

    /// Replaces the entire field mapping. The dirty set is left
    /// untouched — treat this as the reset point for freshly loaded
    /// rows.
    fn set_data(&mut self, row: Row) {
        self.fields_mut().replace(row);
    }

    /// Merges a row through change tracking, one tracked set per
    /// entry.
    fn merge_data(&mut self, row: Row) {
        let comparison = Self::comparison();
        self.fields_mut().merge(row, comparison);
    }

    /// The current value of the single primary key column.
    ///
    /// Fails with a logic error on composite-key models.
    fn key(&self) -> CoreResult<Option<&Value>> {
        match Self::primary_key().single() {
            Some(column) => Ok(self.fields().get(column)),
            None => Err(CoreError::composite_key("key")),
        }
    }

    /// Inserts the current fields as a new row.
    ///
    /// Builds `INSERT INTO … VALUES (…)` from all current keys and
    /// values in insertion order. When the primary key is a single
    /// column absent from the fields and the driver returned a
    /// non-zero generated id, the id is back-filled (untracked).
    /// Returns `Ok(true)` iff exactly one row was affected;
    /// `Ok(false)` on prepare failure.
    fn save(&mut self, db: &Database) -> CoreResult<bool> {
        let keys = self.keys();
        let statement = sql::insert(Self::table(), &keys)?;
        let params: Vec<Value> = self.fields().values().cloned().collect();
        let Some(outcome) = db.execute(&statement, &params)? else {
            return Ok(false);
        };

        if outcome.last_insert_id != 0 {
            if let Some(pk) = Self::primary_key().single() {
                if !self.fields().contains_key(pk) {
                    self.fields_mut()
                        .put(pk, Value::Integer(outcome.last_insert_id));
                }
            }
        }

        Ok(outcome.rows_affected == 1)
    }

    /// Inserts many instances with a single multi-row statement.
    ///
    /// Empty input succeeds trivially without issuing a statement.
    /// The first instance's column order is used for every row and
    /// values are bound in row-major order; callers must ensure a
    /// uniform column set across instances. Returns `Ok(true)` iff
    /// the affected-row count equals the instance count.
    fn save_batch(db: &Database, instances: &[Self]) -> CoreResult<bool> {
        let Some(first) = instances.first() else {
            return Ok(true);
        };
        let keys = first.keys();
        let statement = sql::batch_insert(Self::table(), &keys, instances.len())?;
        let mut params = Vec::with_capacity(keys.len() * instances.len());
        for instance in instances {
            params.extend(instance.fields().values().cloned());
        }
        let Some(outcome) = db.execute(&statement, &params)? else {
            return Ok(false);
        };
        Ok(outcome.rows_affected == instances.len())
    }

    /// Counts the rows of the table. `Ok(None)` on query or fetch
    /// failure.
    fn count(db: &Database) -> CoreResult<Option<i64>> {
        let statement = sql::count(Self::table())?;
        let Some(rows) = db.select(&statement, &[])? else {
            return Ok(None);
        };
        match rows.first().and_then(|row| row.first()) {
            Some((_, Value::Integer(n))) => Ok(Some(*n)),
            _ => Ok(None),
        }
    }

    /// Fetches every row, with optional `ORDER BY` clauses appended in
    /// the given order.
    fn fetch_all(db: &Database, order: &[(String, SortOrder)]) -> CoreResult<Vec<Self>> {
        let statement = sql::select_all(Self::table(), order)?;
        Self::collect_query(db, &statement, &[])
    }

    /// Finds one row by primary key value.
    ///
    /// Fails with a logic error on composite-key models — use
    /// `find_where` instead. No statement is issued in that case.
    fn find_by_id(db: &Database, pk_value: impl Into<Value>) -> CoreResult<Option<Self>> {
        match Self::primary_key().single() {
            Some(column) => Self::find_where(db, &Predicate::new().eq(column, pk_value)),
            None => Err(CoreError::composite_key("find_by_id")),
        }
    }

    /// Finds the first row matching a predicate.
    fn find_where(db: &Database, predicate: &Predicate) -> CoreResult<Option<Self>> {
        let (clause, bound) = predicate.render()?;
        let statement = sql::select_where(Self::table(), &clause, true)?;
        Self::find_one(db, &statement, &bound)
    }

    /// Collects every row matching a predicate.
    fn collect_where(db: &Database, predicate: &Predicate) -> CoreResult<Vec<Self>> {
        let (clause, bound) = predicate.render()?;
        let statement = sql::select_where(Self::table(), &clause, false)?;
        Self::collect_query(db, &statement, &bound)
    }

    /// Like `collect_where`, but returns a one-shot forward cursor
    /// instead of a materialized vector.
    fn collect_cursor_where(db: &Database, predicate: &Predicate) -> CoreResult<RowCursor<Self>> {
        let (clause, bound) = predicate.render()?;
        let statement = sql::select_where(Self::table(), &clause, false)?;
        Self::cursor_query(db, &statement, &bound)
    }

    /// Materializes the first row of an arbitrary query as an
    /// instance, or `None` on no match or prepare failure.
    fn find_one(db: &Database, statement: &str, params: &[Value]) -> CoreResult<Option<Self>> {
        let Some(rows) = db.select(statement, params)? else {
            return Ok(None);
        };
        Ok(rows.into_iter().next().map(|row| {
            let row = Self::transform(row);
            Self::from_fields(row.into_iter().collect())
        }))
    }

    /// Materializes every row of an arbitrary query.
    fn collect_query(db: &Database, statement: &str, params: &[Value]) -> CoreResult<Vec<Self>> {
        Ok(Self::cursor_query(db, statement, params)?.collect())
    }

    /// Runs an arbitrary query and wraps the results in a one-shot
    /// cursor. Prepare failure yields an already-empty cursor.
    fn cursor_query(db: &Database, statement: &str, params: &[Value]) -> CoreResult<RowCursor<Self>> {
        let rows = db.select(statement, params)?.unwrap_or_default();
        Ok(RowCursor::new(rows))
    }

    /// Writes the dirty fields back to the row identified by the
    /// current primary key values.
    ///
    /// `Ok(false)` without issuing a statement when nothing changed.
    /// The dirty set is cleared only on a confirmed single-row
    /// update.
    fn update(&mut self, db: &Database) -> CoreResult<bool> {
        if !self.has_changes() {
            return Ok(false);
        }

        let (pk_clause, pk_values) = self.primary_key_clause()?;
        let dirty: Vec<String> = self
            .fields()
            .changed_keys()
            .map(ToString::to_string)
            .collect();
        let columns: Vec<&str> = dirty.iter().map(String::as_str).collect();
        let statement = sql::update(Self::table(), &columns, &pk_clause)?;

        let mut params: Vec<Value> = columns
            .iter()
            .map(|key| self.fields().get(key).cloned().unwrap_or(Value::Null))
            .collect();
        params.extend(pk_values);

        let Some(outcome) = db.execute(&statement, &params)? else {
            return Ok(false);
        };
        if outcome.rows_affected == 1 {
            self.fields_mut().clear_changes();
            return Ok(true);
        }
        Ok(false)
    }

    /// Deletes the row identified by the current primary key values.
    ///
    /// Returns `Ok(true)` iff the driver reported no error — deleting
    /// a row that does not exist still succeeds.
    fn delete(&self, db: &Database) -> CoreResult<bool> {
        let (clause, values) = self.primary_key_clause()?;
        let statement = sql::delete_where(Self::table(), &clause)?;
        Ok(db.execute(&statement, &values)?.is_some())
    }

    /// Deletes one row by primary key value.
    ///
    /// Fails with a logic error on composite-key models — use
    /// `delete_where` instead. No statement is issued in that case.
    fn delete_where_primary(db: &Database, pk_value: impl Into<Value>) -> CoreResult<bool> {
        match Self::primary_key().single() {
            Some(column) => Self::delete_where(db, &Predicate::new().eq(column, pk_value)),
            None => Err(CoreError::composite_key("delete_where_primary")),
        }
    }

    /// Deletes every row matching a predicate.
    fn delete_where(db: &Database, predicate: &Predicate) -> CoreResult<bool> {
        let (clause, bound) = predicate.render()?;
        let statement = sql::delete_where(Self::table(), &clause)?;
        Ok(db.execute(&statement, &bound)?.is_some())
    }

    /// Deletes every row of the table.
    fn delete_all(db: &Database) -> CoreResult<bool> {
        let statement = sql::delete_all(Self::table())?;
        Ok(db.execute(&statement, &[])?.is_some())
    }

    /// Re-reads the row identified by the current primary key values.
    ///
    /// On no match the prior fields are left untouched and `Ok(false)`
    /// is returned; on match the fields are replaced through
    /// `transform` + `set_data` and `Ok(true)` is returned.
    fn refresh(&mut self, db: &Database) -> CoreResult<bool> {
        let (clause, values) = self.primary_key_clause()?;
        let statement = sql::select_where(Self::table(), &clause, true)?;
        let Some(rows) = db.select(&statement, &values)? else {
            return Ok(false);
        };
        match rows.into_iter().next() {
            Some(row) => {
                self.set_data(Self::transform(row));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Normalizes the primary key into the `(clause, bound values)`
    /// shape used by update, delete and refresh. A key column is only
    /// included when present in the current fields.
    fn primary_key_clause(&self) -> CoreResult<(String, Vec<Value>)> {
        let mut predicate = Predicate::new();
        for column in Self::primary_key().columns() {
            if let Some(value) = self.fields().get(column) {
                predicate = predicate.eq(column, value.clone());
            }
        }
        predicate.render()
    }
}
