//! Golden SQL expectations.
//!
//! The statement shapes the model layer emits are part of the
//! compatibility contract and are asserted verbatim.

use rowmodel_core::{Database, Value};

/// Insert issued by `User::save` with the full column set.
pub const USER_INSERT: &str =
    "INSERT INTO `users` (user_uuid, first_name, last_name, date_of_birth) VALUES (?, ?, ?, ?);";

/// Two-row batch insert for users. No trailing semicolon.
pub const USER_BATCH_INSERT_2: &str =
    "INSERT INTO `users` (user_uuid, first_name, last_name, date_of_birth) \
     VALUES (?, ?, ?, ?), (?, ?, ?, ?)";

/// Unordered select-all over users.
pub const USER_SELECT_ALL: &str = "SELECT * FROM `users`;";

/// Select-all ordered by first name, ascending.
pub const USER_SELECT_ALL_BY_FIRST_NAME_ASC: &str =
    "SELECT * FROM `users` ORDER BY `first_name` ASC;";

/// Primary-key lookup for users.
pub const USER_FIND_BY_UUID: &str = "SELECT * FROM `users` WHERE `user_uuid` = ? LIMIT 1;";

/// Primary-key delete for users.
pub const USER_DELETE_BY_UUID: &str = "DELETE FROM `users` WHERE `user_uuid` = ?;";

/// Full-table delete for users.
pub const USER_DELETE_ALL: &str = "DELETE FROM `users`;";

/// Count over users. No terminator.
pub const USER_COUNT: &str = "SELECT COUNT(*) FROM `users`";

/// Asserts that the statement log contains the given SQL, and that
/// its bound parameters match when `params` is provided.
///
/// Panics with the full list of logged statements when the SQL was
/// never issued.
pub fn assert_was_statement(db: &Database, sql: &str, params: Option<&[Value]>) {
    let logged = db.logged_statements();
    for statement in &logged {
        if statement.sql == sql {
            if let Some(expected) = params {
                assert_eq!(
                    statement.params, expected,
                    "bound parameters differ for {sql:?}"
                );
            }
            return;
        }
    }
    let seen: Vec<&str> = logged.iter().map(|s| s.sql.as_str()).collect();
    panic!("statement {sql:?} not found, {} statements logged: {seen:?}", logged.len());
}
