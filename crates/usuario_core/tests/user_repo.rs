use rusqlite::Connection;
use usuario_core::db::migrations::latest_version;
use usuario_core::db::open_db_in_memory;
use usuario_core::{RepoError, SqliteUserRepository, UserDraft, UserRepository};

#[test]
fn insert_and_find_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::try_new(&conn).unwrap();

    let created = repo
        .insert_user(&UserDraft::new("Ana", 30, "ana@x.com"), 1_700_000_000_000)
        .unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.registered_at, 1_700_000_000_000);
    assert_eq!(created.updated_at, None);

    let loaded = repo.find_user(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert!(repo.find_user(42).unwrap().is_none());
}

#[test]
fn autoincrement_never_reuses_deleted_ids() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.insert_user(&UserDraft::new("Ana", 30, "ana@x.com"), 1)
        .unwrap();
    let second = repo
        .insert_user(&UserDraft::new("Bea", 25, "bea@x.com"), 2)
        .unwrap();
    repo.delete_user(second.id).unwrap();

    let third = repo
        .insert_user(&UserDraft::new("Caio", 40, "caio@x.com"), 3)
        .unwrap();
    assert_eq!(third.id, 3);
}

#[test]
fn unique_constraint_maps_to_duplicate_email() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.insert_user(&UserDraft::new("Ana", 30, "ana@x.com"), 1)
        .unwrap();
    let other = repo
        .insert_user(&UserDraft::new("Bea", 25, "bea@x.com"), 1)
        .unwrap();

    let insert_err = repo
        .insert_user(&UserDraft::new("Caio", 40, "ana@x.com"), 1)
        .unwrap_err();
    assert!(matches!(insert_err, RepoError::DuplicateEmail(ref email) if email == "ana@x.com"));

    let update_err = repo
        .update_user(other.id, &UserDraft::new("Bea", 25, "ana@x.com"), 2)
        .unwrap_err();
    assert!(matches!(update_err, RepoError::DuplicateEmail(_)));
    assert!(repo.email_exists("ana@x.com").unwrap());
    assert!(!repo.email_exists("nobody@x.com").unwrap());
}

#[test]
fn update_stamps_updated_at_and_keeps_registration() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::try_new(&conn).unwrap();

    let user = repo
        .insert_user(&UserDraft::new("Ana", 30, "ana@x.com"), 100)
        .unwrap();
    let updated = repo
        .update_user(user.id, &UserDraft::new("Ana Silva", 31, "ana@y.com"), 200)
        .unwrap();

    assert_eq!(updated.id, user.id);
    assert_eq!(updated.name, "Ana Silva");
    assert_eq!(updated.age, 31);
    assert_eq!(updated.email, "ana@y.com");
    assert_eq!(updated.registered_at, 100);
    assert_eq!(updated.updated_at, Some(200));
}

#[test]
fn update_and_delete_missing_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::try_new(&conn).unwrap();

    let err = repo
        .update_user(7, &UserDraft::new("Ana", 30, "ana@x.com"), 1)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(7)));

    let err = repo.delete_user(7).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(7)));
}

#[test]
fn list_orders_by_name_then_id() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::try_new(&conn).unwrap();

    for (name, email) in [
        ("Caio", "caio@x.com"),
        ("Ana", "ana1@x.com"),
        ("Bea", "bea@x.com"),
        ("Ana", "ana2@x.com"),
    ] {
        repo.insert_user(&UserDraft::new(name, 20, email), 1).unwrap();
    }

    let listed: Vec<_> = repo
        .list_users()
        .unwrap()
        .into_iter()
        .map(|user| (user.name, user.id))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("Ana".to_string(), 2),
            ("Ana".to_string(), 4),
            ("Bea".to_string(), 3),
            ("Caio".to_string(), 1),
        ]
    );
}

#[test]
fn name_search_is_case_sensitive_substring() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.insert_user(&UserDraft::new("Mariana", 20, "mariana@x.com"), 1)
        .unwrap();
    repo.insert_user(&UserDraft::new("Ana", 30, "ana@x.com"), 1)
        .unwrap();
    repo.insert_user(&UserDraft::new("Bruno", 40, "bruno@x.com"), 1)
        .unwrap();

    let names: Vec<_> = repo
        .find_users_by_name("ana")
        .unwrap()
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(names, vec!["Mariana".to_string()]);

    let names: Vec<_> = repo
        .find_users_by_name("An")
        .unwrap()
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(names, vec!["Ana".to_string()]);

    assert!(repo.find_users_by_name("Zé").unwrap().is_empty());
}

#[test]
fn invalid_persisted_rows_are_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users (name, age, email) VALUES ('Ana', 30, 'broken-email');",
        [],
    )
    .unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let err = repo.list_users().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteUserRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_users_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteUserRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("users"))));
}

#[test]
fn repository_rejects_users_table_missing_updated_at() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            email TEXT NOT NULL UNIQUE,
            registered_at INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteUserRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "users",
            column: "updated_at"
        })
    ));
}
