//! Connection handle and slot-indexed registry.

use crate::config::{DatabaseConfig, EnvConfig};
use crate::error::{CoreError, CoreResult};
use crate::value::{Row, Value};
use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection};
use std::fmt;
use tracing::{debug, info, warn};

/// Tag selecting among independent logical connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The main connection.
    Primary,
    /// A second, independent connection.
    Secondary,
    /// A third, independent connection.
    Tertiary,
}

impl Slot {
    /// All slots, in order.
    pub const ALL: [Self; 3] = [Self::Primary, Self::Secondary, Self::Tertiary];

    const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Tertiary => 2,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
            Self::Tertiary => write!(f, "tertiary"),
        }
    }
}

/// Outcome of a successfully executed write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Number of rows the statement affected.
    pub rows_affected: usize,
    /// Rowid generated by the last insert on this connection, zero
    /// when the driver produced none.
    pub last_insert_id: i64,
}

/// A statement recorded by the statement log.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedStatement {
    /// The SQL text as sent to the driver.
    pub sql: String,
    /// The bound parameters, in bind order.
    pub params: Vec<Value>,
}

/// One logical database connection.
///
/// Holds the active environment block extracted at construction and
/// the driver handle once `connect()` succeeds. The handle is
/// long-lived: it is released on `disconnect()` or drop, never per
/// operation.
///
/// # Statement policy
///
/// `execute` and `select` prepare and run one parameterized statement.
/// A prepare-stage failure degrades to `Ok(None)` (logged at warn);
/// execute-stage driver errors propagate as `Err`. Callers of the
/// model operations therefore check boolean/option results rather
/// than catching prepare errors.
pub struct Database {
    env: Option<EnvConfig>,
    conn: Option<Connection>,
    log: Mutex<Option<Vec<LoggedStatement>>>,
}

impl Database {
    /// Builds a handle from an optional configuration.
    ///
    /// With a config, the active environment block is extracted and
    /// stored (failing on a malformed config). Without one, the
    /// handle is only usable through `set_connection`.
    pub fn new(config: Option<&DatabaseConfig>) -> CoreResult<Self> {
        let env = match config {
            Some(config) => Some(config.active_env()?.clone()),
            None => None,
        };
        Ok(Self {
            env,
            conn: None,
            log: Mutex::new(None),
        })
    }

    /// Opens the physical connection described by the stored
    /// environment block.
    ///
    /// Fails with `MissingConfig` when the handle was constructed
    /// without a config, with `UnsupportedAdapter` for adapters this
    /// driver cannot open, and propagates driver errors.
    pub fn connect(&mut self) -> CoreResult<()> {
        let env = self.env.as_ref().ok_or(CoreError::MissingConfig)?;
        match env.adapter.as_str() {
            "sqlite" => {
                let conn = if env.name == ":memory:" {
                    Connection::open_in_memory()?
                } else {
                    Connection::open(&env.name)?
                };
                info!(dsn = %env.dsn(), "connected");
                self.conn = Some(conn);
                Ok(())
            }
            other => Err(CoreError::unsupported_adapter(other)),
        }
    }

    /// Releases the connection handle. Idempotent.
    pub fn disconnect(&mut self) {
        if self.conn.take().is_some() {
            info!("disconnected");
        }
    }

    /// True once `connect()` (or `set_connection`) has succeeded.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Injects an already-open driver handle, e.g. from a fixture.
    pub fn set_connection(&mut self, conn: Connection) {
        self.conn = Some(conn);
    }

    /// Borrows the driver handle.
    ///
    /// Fails with `NotConnected` before a successful `connect()`.
    pub fn connection(&self) -> CoreResult<&Connection> {
        self.conn.as_ref().ok_or(CoreError::NotConnected)
    }

    /// Name of the active database, when a config was supplied.
    #[must_use]
    pub fn db_name(&self) -> Option<&str> {
        self.env.as_ref().map(|env| env.name.as_str())
    }

    /// Prepares and executes a write statement.
    ///
    /// Returns `Ok(None)` when the statement fails to prepare.
    pub fn execute(&self, sql: &str, params: &[Value]) -> CoreResult<Option<ExecOutcome>> {
        let conn = self.connection()?;
        self.log_statement(sql, params);
        debug!(sql, bound = params.len(), "execute");
        let mut stmt = match conn.prepare(sql) {
            Ok(stmt) => stmt,
            Err(err) => {
                warn!(sql, %err, "statement failed to prepare");
                return Ok(None);
            }
        };
        let rows_affected = stmt.execute(params_from_iter(params.iter()))?;
        Ok(Some(ExecOutcome {
            rows_affected,
            last_insert_id: conn.last_insert_rowid(),
        }))
    }

    /// Prepares and executes a query, materializing all result rows.
    ///
    /// Returns `Ok(None)` when the statement fails to prepare.
    pub fn select(&self, sql: &str, params: &[Value]) -> CoreResult<Option<Vec<Row>>> {
        let conn = self.connection()?;
        self.log_statement(sql, params);
        debug!(sql, bound = params.len(), "select");
        let mut stmt = match conn.prepare(sql) {
            Ok(stmt) => stmt,
            Err(err) => {
                warn!(sql, %err, "statement failed to prepare");
                return Ok(None);
            }
        };
        let columns: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut entry = Row::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                entry.push((name.clone(), Value::from(row.get_ref(i)?)));
            }
            out.push(entry);
        }
        Ok(Some(out))
    }

    /// Starts recording every statement passed to `execute`/`select`.
    ///
    /// Used by test harnesses to assert the exact SQL and bind values
    /// an operation issued.
    pub fn enable_statement_log(&self) {
        let mut log = self.log.lock();
        if log.is_none() {
            *log = Some(Vec::new());
        }
    }

    /// Returns a copy of the recorded statements.
    #[must_use]
    pub fn logged_statements(&self) -> Vec<LoggedStatement> {
        self.log.lock().clone().unwrap_or_default()
    }

    /// Empties the statement log, keeping recording enabled.
    pub fn clear_statement_log(&self) {
        if let Some(entries) = self.log.lock().as_mut() {
            entries.clear();
        }
    }

    fn log_statement(&self, sql: &str, params: &[Value]) {
        if let Some(entries) = self.log.lock().as_mut() {
            entries.push(LoggedStatement {
                sql: sql.to_string(),
                params: params.to_vec(),
            });
        }
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("db_name", &self.db_name())
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// A caller-owned table of connection handles indexed by [`Slot`].
///
/// There is no process-wide state: the registry is an ordinary value
/// constructed by the caller and passed where it is needed. At most
/// one handle lives in each slot; registering again replaces it.
#[derive(Debug, Default)]
pub struct Registry {
    slots: [Option<Database>; 3],
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a database in a slot, replacing any previous occupant.
    pub fn register(&mut self, slot: Slot, db: Database) {
        self.slots[slot.index()] = Some(db);
    }

    /// True when the slot holds a database.
    #[must_use]
    pub fn is_registered(&self, slot: Slot) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Borrows the database in a slot.
    pub fn get(&self, slot: Slot) -> CoreResult<&Database> {
        self.slots[slot.index()]
            .as_ref()
            .ok_or(CoreError::NotRegistered { slot })
    }

    /// Mutably borrows the database in a slot.
    pub fn get_mut(&mut self, slot: Slot) -> CoreResult<&mut Database> {
        self.slots[slot.index()]
            .as_mut()
            .ok_or(CoreError::NotRegistered { slot })
    }

    /// Removes and returns the database in a slot.
    pub fn remove(&mut self, slot: Slot) -> Option<Database> {
        self.slots[slot.index()].take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    fn connected() -> Database {
        let config = DatabaseConfig::sqlite_in_memory();
        let mut db = Database::new(Some(&config)).unwrap();
        db.connect().unwrap();
        db
    }

    #[test]
    fn connect_without_config_is_a_logic_error() {
        let mut db = Database::new(None).unwrap();
        assert!(matches!(db.connect(), Err(CoreError::MissingConfig)));
    }

    #[test]
    fn connection_before_connect_fails() {
        let config = DatabaseConfig::sqlite_in_memory();
        let db = Database::new(Some(&config)).unwrap();
        assert!(matches!(db.connection(), Err(CoreError::NotConnected)));
    }

    #[test]
    fn unsupported_adapter_is_reported() {
        let config = DatabaseConfig::single(
            "prod",
            crate::config::EnvConfig {
                adapter: "mysql".to_string(),
                name: "app".to_string(),
                host: "localhost".to_string(),
                user: "app".to_string(),
                pass: String::new(),
                port: 3306,
                charset: "utf8".to_string(),
            },
        );
        let mut db = Database::new(Some(&config)).unwrap();
        assert!(matches!(
            db.connect(),
            Err(CoreError::UnsupportedAdapter { .. })
        ));
    }

    #[test]
    fn file_backed_connect_persists_across_handles() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("db.sqlite3");
        let env = crate::config::EnvConfig {
            adapter: "sqlite".to_string(),
            name: path.display().to_string(),
            host: "localhost".to_string(),
            user: String::new(),
            pass: String::new(),
            port: 0,
            charset: "utf8".to_string(),
        };
        let config = DatabaseConfig::single("test", env);

        let mut first = Database::new(Some(&config)).unwrap();
        first.connect().unwrap();
        first
            .execute("CREATE TABLE t (id INTEGER)", &[])
            .unwrap()
            .unwrap();
        first
            .execute("INSERT INTO t (id) VALUES (?)", &[Value::Integer(1)])
            .unwrap()
            .unwrap();
        first.disconnect();

        let mut second = Database::new(Some(&config)).unwrap();
        second.connect().unwrap();
        let rows = second.select("SELECT id FROM t", &[]).unwrap().unwrap();
        assert_eq!(rows, vec![vec![("id".to_string(), Value::Integer(1))]]);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut db = connected();
        db.disconnect();
        db.disconnect();
        assert!(!db.is_connected());
    }

    #[test]
    fn execute_reports_outcome() {
        let db = connected();
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT)", &[])
            .unwrap();
        let outcome = db
            .execute(
                "INSERT INTO t (v) VALUES (?)",
                &[Value::Text("x".to_string())],
            )
            .unwrap()
            .unwrap();
        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(outcome.last_insert_id, 1);
    }

    #[test]
    fn prepare_failure_degrades_to_none() {
        let db = connected();
        assert!(db.execute("NOT SQL AT ALL", &[]).unwrap().is_none());
        assert!(db.select("ALSO NOT SQL", &[]).unwrap().is_none());
    }

    #[test]
    fn select_materializes_named_rows() {
        let db = connected();
        db.execute("CREATE TABLE t (id INTEGER, v TEXT)", &[])
            .unwrap();
        db.execute(
            "INSERT INTO t (id, v) VALUES (?, ?)",
            &[Value::Integer(7), Value::Text("x".to_string())],
        )
        .unwrap();
        let rows = db.select("SELECT * FROM t", &[]).unwrap().unwrap();
        assert_eq!(
            rows,
            vec![vec![
                ("id".to_string(), Value::Integer(7)),
                ("v".to_string(), Value::Text("x".to_string())),
            ]]
        );
    }

    #[test]
    fn statement_log_records_sql_and_params() {
        let db = connected();
        db.enable_statement_log();
        db.execute("CREATE TABLE t (id INTEGER)", &[]).unwrap();
        db.execute("INSERT INTO t (id) VALUES (?)", &[Value::Integer(1)])
            .unwrap();
        let logged = db.logged_statements();
        assert_eq!(logged.len(), 2);
        assert_eq!(logged[1].sql, "INSERT INTO t (id) VALUES (?)");
        assert_eq!(logged[1].params, vec![Value::Integer(1)]);
        db.clear_statement_log();
        assert!(db.logged_statements().is_empty());
    }

    #[test]
    fn registry_lookup_of_empty_slot_fails() {
        let registry = Registry::new();
        assert!(matches!(
            registry.get(Slot::Primary),
            Err(CoreError::NotRegistered { slot: Slot::Primary })
        ));
    }

    #[test]
    fn registry_register_and_replace() {
        let mut registry = Registry::new();
        registry.register(Slot::Primary, connected());
        assert!(registry.is_registered(Slot::Primary));
        assert!(registry.get(Slot::Primary).unwrap().is_connected());
        assert!(!registry.is_registered(Slot::Secondary));

        let config = DatabaseConfig::sqlite_in_memory();
        let replacement = Database::new(Some(&config)).unwrap();
        registry.register(Slot::Primary, replacement);
        assert!(!registry.get(Slot::Primary).unwrap().is_connected());
    }
}
