//! Test fixtures and database helpers.

use rowmodel_core::{
    Database, DatabaseConfig, EnvConfig, FieldMap, Model, PrimaryKey, Value,
};
use tempfile::TempDir;
use uuid::Uuid;

/// The `users` schema every fixture database carries.
pub const USERS_SCHEMA: &str = "CREATE TABLE `users` (
    user_uuid VARCHAR(128),
    first_name VARCHAR(50),
    last_name VARCHAR(50),
    date_of_birth DATE
)";

/// Composite-key companion table.
pub const ORDER_LINES_SCHEMA: &str = "CREATE TABLE `order_lines` (
    order_id INTEGER,
    line_no INTEGER,
    sku TEXT
)";

/// Sample row: Gwénola Etheve.
pub const GWENOLA_UUID: &str = "5c8169b1-d6ef-4415-8c39-e1664df8b954";
/// Sample row: William Desportes.
pub const WILLIAM_UUID: &str = "874d1aa5-4db3-4953-88dd-2dd58a298d3e";

/// Returns a fresh random UUID string for test rows.
#[must_use]
pub fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// A connected test database with the fixture schema applied and the
/// statement log enabled.
pub struct TestDatabase {
    /// The database handle.
    pub db: Database,
    /// Kept alive so the file-backed database is not removed early.
    _temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates an in-memory test database.
    #[must_use]
    pub fn memory() -> Self {
        let config = DatabaseConfig::sqlite_in_memory();
        Self::from_config(&config, None)
    }

    /// Creates a file-backed test database in a temporary directory.
    #[must_use]
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let path = temp_dir.path().join("test.sqlite3");
        let config = DatabaseConfig::single(
            "test",
            EnvConfig {
                adapter: "sqlite".to_string(),
                name: path.display().to_string(),
                host: "localhost".to_string(),
                user: String::new(),
                pass: String::new(),
                port: 0,
                charset: "utf8".to_string(),
            },
        );
        Self::from_config(&config, Some(temp_dir))
    }

    fn from_config(config: &DatabaseConfig, temp_dir: Option<TempDir>) -> Self {
        let mut db = Database::new(Some(config)).expect("failed to build database");
        db.connect().expect("failed to connect");
        db.execute(USERS_SCHEMA, &[])
            .expect("failed to create users table")
            .expect("users schema failed to prepare");
        db.execute(ORDER_LINES_SCHEMA, &[])
            .expect("failed to create order_lines table")
            .expect("order_lines schema failed to prepare");
        db.enable_statement_log();
        Self {
            db,
            _temp_dir: temp_dir,
        }
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

impl std::ops::DerefMut for TestDatabase {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.db
    }
}

/// Runs a test against a fresh in-memory database.
pub fn with_test_db<F: FnOnce(&Database)>(f: F) {
    let test_db = TestDatabase::memory();
    f(&test_db.db);
}

/// The sample user model, keyed by UUID.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    fields: FieldMap,
}

impl Model for User {
    fn table() -> &'static str {
        "users"
    }

    fn primary_key() -> PrimaryKey {
        PrimaryKey::Single("user_uuid")
    }

    fn from_fields(fields: FieldMap) -> Self {
        Self { fields }
    }

    fn fields(&self) -> &FieldMap {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }
}

impl User {
    /// Builds a user with the full column set in schema order.
    #[must_use]
    pub fn create_with(
        user_uuid: &str,
        first_name: &str,
        last_name: Option<&str>,
        date_of_birth: Option<&str>,
    ) -> Self {
        let mut user = Self::create();
        user.set_data(vec![
            ("user_uuid".to_string(), Value::from(user_uuid)),
            ("first_name".to_string(), Value::from(first_name)),
            ("last_name".to_string(), Value::from(last_name)),
            ("date_of_birth".to_string(), Value::from(date_of_birth)),
        ]);
        user
    }

    /// Tracked setter for the first name.
    pub fn set_first_name(&mut self, first_name: &str) {
        self.set("first_name", first_name);
    }

    /// Tracked setter for the last name.
    pub fn set_last_name(&mut self, last_name: &str) {
        self.set("last_name", last_name);
    }

    /// Looks a user up by UUID.
    pub fn find_by_uuid(
        db: &Database,
        user_uuid: &str,
    ) -> rowmodel_core::CoreResult<Option<Self>> {
        Self::find_by_id(db, user_uuid)
    }
}

/// Composite-key sample model.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    fields: FieldMap,
}

impl Model for OrderLine {
    fn table() -> &'static str {
        "order_lines"
    }

    fn primary_key() -> PrimaryKey {
        PrimaryKey::Composite(&["order_id", "line_no"])
    }

    fn from_fields(fields: FieldMap) -> Self {
        Self { fields }
    }

    fn fields(&self) -> &FieldMap {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }
}

impl OrderLine {
    /// Builds an order line with the full column set in schema order.
    #[must_use]
    pub fn create_with(order_id: i64, line_no: i64, sku: &str) -> Self {
        let mut line = Self::create();
        line.set_data(vec![
            ("order_id".to_string(), Value::Integer(order_id)),
            ("line_no".to_string(), Value::Integer(line_no)),
            ("sku".to_string(), Value::from(sku)),
        ]);
        line
    }
}

/// Inserts the two sample users (Gwénola, then William) and returns
/// them.
pub fn seed_sample_users(db: &Database) -> (User, User) {
    let mut gwenola = User::create_with(GWENOLA_UUID, "Gwénola", Some("Etheve"), None);
    let mut william = User::create_with(WILLIAM_UUID, "William", Some("Desportes"), None);
    assert!(gwenola.save(db).expect("saving Gwénola failed"));
    assert!(william.save(db).expect("saving William failed"));
    (gwenola, william)
}
