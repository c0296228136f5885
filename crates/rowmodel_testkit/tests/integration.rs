//! End-to-end scenarios over the fixture database.

use rowmodel_core::{Database, DatabaseConfig, Model, Registry, Slot, SortOrder, Value};
use rowmodel_testkit::prelude::*;

fn cleanup_users(db: &Database) {
    if User::count(db).unwrap() != Some(0) {
        assert!(User::delete_all(db).unwrap());
    }
    db.clear_statement_log();
}

#[test]
fn insert_success_exposition() {
    let db = TestDatabase::memory();
    cleanup_users(&db);
    assert_eq!(User::count(&db).unwrap(), Some(0));

    let mut user1 = User::create_with(GWENOLA_UUID, "Gwénola", Some("Etheve"), None);
    assert!(user1.save(&db).unwrap());
    assert_was_statement(
        &db,
        USER_INSERT,
        Some(&[
            Value::from(GWENOLA_UUID),
            Value::from("Gwénola"),
            Value::from("Etheve"),
            Value::Null,
        ]),
    );
    assert_eq!(User::count(&db).unwrap(), Some(1));

    let user = User::find_by_uuid(&db, GWENOLA_UUID).unwrap().unwrap();
    assert_was_statement(&db, USER_FIND_BY_UUID, Some(&[Value::from(GWENOLA_UUID)]));
    assert_eq!(
        user.values(),
        vec![
            &Value::from(GWENOLA_UUID),
            &Value::from("Gwénola"),
            &Value::from("Etheve"),
            &Value::Null,
        ]
    );
    assert_eq!(
        user.keys(),
        vec!["user_uuid", "first_name", "last_name", "date_of_birth"]
    );
    assert_eq!(
        user.to_row(),
        vec![
            ("user_uuid".to_string(), Value::from(GWENOLA_UUID)),
            ("first_name".to_string(), Value::from("Gwénola")),
            ("last_name".to_string(), Value::from("Etheve")),
            ("date_of_birth".to_string(), Value::Null),
        ]
    );
    assert_eq!(user.value("user_uuid"), Some(&Value::from(GWENOLA_UUID)));

    assert!(user1.delete(&db).unwrap());
    assert_was_statement(&db, USER_DELETE_BY_UUID, Some(&[Value::from(GWENOLA_UUID)]));
    assert_eq!(User::count(&db).unwrap(), Some(0));
}

#[test]
fn refresh_and_update_converge() {
    let db = TestDatabase::memory();
    cleanup_users(&db);

    let mut user1 = User::create_with(GWENOLA_UUID, "Gwénola", Some("Etheve"), None);
    assert!(User::find_by_uuid(&db, GWENOLA_UUID).unwrap().is_none());
    assert!(user1.save(&db).unwrap());

    let mut user1bis = User::find_by_uuid(&db, GWENOLA_UUID).unwrap().unwrap();
    assert_eq!(user1.to_row(), user1bis.to_row());

    user1.set_last_name("ETHEVE");
    assert_ne!(user1.to_row(), user1bis.to_row());

    // The change was not written yet, refreshing does not pick it up.
    assert!(user1bis.refresh(&db).unwrap());
    assert_ne!(user1.to_row(), user1bis.to_row());

    assert!(user1.update(&db).unwrap());
    assert!(user1bis.refresh(&db).unwrap());
    assert_eq!(user1.to_row(), user1bis.to_row());

    assert_eq!(User::count(&db).unwrap(), Some(1));
    let users = User::fetch_all(&db, &[]).unwrap();
    assert_was_statement(&db, USER_SELECT_ALL, Some(&[]));
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].to_row(), user1.to_row());
}

#[test]
fn fetch_all_ordering_exposition() {
    let db = TestDatabase::memory();
    cleanup_users(&db);
    let (gwenola, william) = seed_sample_users(&db);
    assert_eq!(User::count(&db).unwrap(), Some(2));

    let ascending =
        User::fetch_all(&db, &[("first_name".to_string(), SortOrder::Asc)]).unwrap();
    assert_was_statement(&db, USER_SELECT_ALL_BY_FIRST_NAME_ASC, Some(&[]));
    assert_eq!(ascending[0].to_row(), gwenola.to_row());
    assert_eq!(ascending[1].to_row(), william.to_row());

    let descending =
        User::fetch_all(&db, &[("first_name".to_string(), SortOrder::Desc)]).unwrap();
    assert_eq!(descending[0].to_row(), william.to_row());
    assert_eq!(descending[1].to_row(), gwenola.to_row());
}

#[test]
fn batch_insert_exposition() {
    let db = TestDatabase::memory();
    cleanup_users(&db);

    let users = vec![
        User::create_with(GWENOLA_UUID, "Gwénola", Some("Etheve"), None),
        User::create_with(WILLIAM_UUID, "William", Some("Desportes"), None),
    ];
    assert!(User::save_batch(&db, &users).unwrap());
    assert_was_statement(&db, USER_BATCH_INSERT_2, None);
    assert_was_statement(&db, USER_COUNT, Some(&[]));
    assert_eq!(User::count(&db).unwrap(), Some(2));
    assert!(User::delete_all(&db).unwrap());
    assert_was_statement(&db, USER_DELETE_ALL, Some(&[]));
}

#[test]
fn cursor_streams_seeded_rows_once() {
    let db = TestDatabase::memory();
    cleanup_users(&db);
    seed_sample_users(&db);

    let mut cursor = User::collect_cursor_where(
        &db,
        &rowmodel_core::Predicate::new().any_of(
            "user_uuid",
            vec![Value::from(GWENOLA_UUID), Value::from(WILLIAM_UUID)],
        ),
    )
    .unwrap();

    let first = cursor.next().unwrap();
    assert_eq!(first.value("first_name"), Some(&Value::from("Gwénola")));
    assert!(!cursor.is_exhausted());
    let second = cursor.next().unwrap();
    assert_eq!(second.value("first_name"), Some(&Value::from("William")));
    assert!(cursor.is_exhausted());
    assert!(cursor.next().is_none());
}

#[test]
fn db_name_reports_the_active_database() {
    let db = TestDatabase::memory();
    assert_eq!(db.db_name(), Some(":memory:"));

    let file_db = TestDatabase::file();
    assert!(file_db.db_name().unwrap().ends_with("test.sqlite3"));
}

#[test]
fn file_backed_database_round_trips() {
    let db = TestDatabase::file();
    let uuid = new_uuid();
    let mut user = User::create_with(&uuid, "Gwénola", None, None);
    assert!(user.save(&db).unwrap());
    let found = User::find_by_uuid(&db, &uuid).unwrap().unwrap();
    assert_eq!(found.to_row(), user.to_row());
}

#[test]
fn registry_slots_are_independent() {
    let mut registry = Registry::new();
    registry.register(Slot::Primary, TestDatabase::memory().db);
    registry.register(Slot::Secondary, TestDatabase::memory().db);

    {
        let primary = registry.get(Slot::Primary).unwrap();
        let mut user = User::create_with(GWENOLA_UUID, "Gwénola", None, None);
        assert!(user.save(primary).unwrap());
    }

    assert_eq!(
        User::count(registry.get(Slot::Primary).unwrap()).unwrap(),
        Some(1)
    );
    assert_eq!(
        User::count(registry.get(Slot::Secondary).unwrap()).unwrap(),
        Some(0)
    );
    assert!(registry.get(Slot::Tertiary).is_err());

    let mut primary = registry.remove(Slot::Primary).unwrap();
    primary.disconnect();
    assert!(!registry.is_registered(Slot::Primary));
}

#[test]
fn config_via_json_connects() {
    let config = DatabaseConfig::from_json(
        r#"{
            "current_env": "test",
            "environments": {
                "test": {
                    "adapter": "sqlite",
                    "name": ":memory:",
                    "host": "localhost",
                    "user": "",
                    "pass": "",
                    "port": 0,
                    "charset": "utf8"
                }
            }
        }"#,
    )
    .unwrap();
    let mut db = Database::new(Some(&config)).unwrap();
    db.connect().unwrap();
    db.execute(USERS_SCHEMA, &[]).unwrap().unwrap();
    assert_eq!(User::count(&db).unwrap(), Some(0));
}
