use phonebook_core::{
    open_db, open_db_in_memory, Contact, ContactRepository, ContactValidationError, ImportRow,
    InputError, PageRequest, PhonebookStore, RepoError, SqliteContactRepository, StoreConfig,
    StoreError,
};
use rusqlite::Connection;
use std::time::Duration;

fn seed(conn: &Connection) {
    let store = PhonebookStore::new(SqliteContactRepository::new(conn));
    store.upsert("Ann", "Lee", "5551234").unwrap();
    store.upsert("Bob", "Lee", "9990000").unwrap();
}

#[test]
fn upsert_same_identity_keeps_latest_phone() {
    let conn = open_db_in_memory().unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    store.upsert("Ann", "Lee", "5551234").unwrap();
    store.upsert("Ann", "Lee", "5559999").unwrap();
    store.upsert("Ann", "Lee", "5559999").unwrap();

    assert_eq!(
        store.list_all().unwrap(),
        vec![Contact::new("Ann", "Lee", "5559999")]
    );
    assert_eq!(
        SqliteContactRepository::new(&conn)
            .count_contacts()
            .unwrap(),
        1
    );
}

#[test]
fn upsert_blank_identity_is_input_error() {
    let conn = open_db_in_memory().unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    let err = store.upsert("", "Lee", "5551234").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Input(InputError::BlankField("first_name"))
    ));
}

#[test]
fn search_matches_names_case_insensitively_and_phone_substring() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    let by_surname = store.search("Lee").unwrap();
    assert_eq!(
        by_surname,
        vec![
            Contact::new("Ann", "Lee", "5551234"),
            Contact::new("Bob", "Lee", "9990000"),
        ]
    );

    let lower = store.search("ann").unwrap();
    assert_eq!(lower, vec![Contact::new("Ann", "Lee", "5551234")]);

    let by_phone = store.search("9000").unwrap();
    assert_eq!(by_phone, vec![Contact::new("Bob", "Lee", "9990000")]);

    assert!(store.search("Zed").unwrap().is_empty());
}

#[test]
fn search_treats_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));
    store.upsert("Al_x", "100%", "1234567").unwrap();

    assert!(store.search("A_n").unwrap().is_empty());
    assert_eq!(
        store.search("%").unwrap(),
        vec![Contact::new("Al_x", "100%", "1234567")]
    );
}

#[test]
fn search_folds_case_of_non_ascii_names() {
    let conn = open_db_in_memory().unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));
    store.upsert("Иван", "Петров", "5551234").unwrap();
    store.upsert("Ärni", "Öz", "7654321").unwrap();

    assert_eq!(
        store.search("иван").unwrap(),
        vec![Contact::new("Иван", "Петров", "5551234")]
    );
    assert_eq!(
        store.search("ПЕТР").unwrap(),
        vec![Contact::new("Иван", "Петров", "5551234")]
    );
    assert_eq!(
        store.search("ärni").unwrap(),
        vec![Contact::new("Ärni", "Öz", "7654321")]
    );
    assert_eq!(store.search("öz").unwrap().len(), 1);
}

#[test]
fn empty_search_pattern_matches_everything() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    assert_eq!(store.search("").unwrap().len(), 2);
}

#[test]
fn list_pages_by_identity() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    assert_eq!(
        store.list(PageRequest::new(1, 0)).unwrap(),
        vec![Contact::new("Ann", "Lee", "5551234")]
    );
    assert_eq!(
        store.list(PageRequest::new(1, 1)).unwrap(),
        vec![Contact::new("Bob", "Lee", "9990000")]
    );
    assert!(store.list(PageRequest::new(5, 2)).unwrap().is_empty());
    assert!(store.list(PageRequest::new(0, 0)).unwrap().is_empty());
}

#[test]
fn consecutive_pages_concatenate_to_larger_page() {
    let conn = open_db_in_memory().unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));
    for (first, last) in [
        ("Eve", "Moss"),
        ("Ann", "Zed"),
        ("Cy", "Pat"),
        ("Ann", "Bay"),
        ("Bob", "Lee"),
        ("Dee", "Ray"),
    ] {
        store.upsert(first, last, "5551234").unwrap();
    }

    let n = 2;
    let m = 3;
    let mut joined = store.list(PageRequest::new(n, 0)).unwrap();
    joined.extend(store.list(PageRequest::new(m, n)).unwrap());
    let whole = store.list(PageRequest::new(n + m, 0)).unwrap();

    assert_eq!(joined, whole);
    let identities = whole
        .iter()
        .map(|contact| contact.identity())
        .collect::<Vec<_>>();
    assert_eq!(
        identities,
        vec![
            ("Ann", "Bay"),
            ("Ann", "Zed"),
            ("Bob", "Lee"),
            ("Cy", "Pat"),
            ("Dee", "Ray"),
        ]
    );
}

#[test]
fn delete_by_phone_removes_only_exact_matches() {
    let conn = open_db_in_memory().unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));
    store.upsert("Ann", "Lee", "555-0100").unwrap();
    store.upsert("Bob", "Ray", "555-0100").unwrap();
    store.upsert("Cy", "Pat", "555-01000").unwrap();

    let removed = store.delete("555-0100").unwrap();

    assert_eq!(removed, 2);
    assert_eq!(
        store.list_all().unwrap(),
        vec![Contact::new("Cy", "Pat", "555-01000")]
    );
}

#[test]
fn delete_matches_first_name_or_surname() {
    let conn = open_db_in_memory().unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));
    store.upsert("Lee", "Park", "1111111").unwrap();
    store.upsert("Ann", "Lee", "2222222").unwrap();
    store.upsert("Bob", "Ray", "3333333").unwrap();

    assert_eq!(store.delete("Lee").unwrap(), 2);
    assert_eq!(
        store.list_all().unwrap(),
        vec![Contact::new("Bob", "Ray", "3333333")]
    );
}

#[test]
fn delete_without_matches_is_not_an_error() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    assert_eq!(store.delete("nobody").unwrap(), 0);
    assert_eq!(store.list_all().unwrap().len(), 2);
}

#[test]
fn bulk_import_persists_valid_rows_and_returns_rejects() {
    let conn = open_db_in_memory().unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    let report = store
        .bulk_import(vec![
            ImportRow::new("Ann", "Lee", "5551234"),
            ImportRow::new("Cy", "Pat", "abc"),
        ])
        .unwrap();

    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].row, ImportRow::new("Cy", "Pat", "abc"));
    assert_eq!(
        store.list_all().unwrap(),
        vec![Contact::new("Ann", "Lee", "5551234")]
    );
}

#[test]
fn bulk_import_invalid_phone_leaves_existing_identity_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));
    store.upsert("Ann", "Lee", "5551234").unwrap();

    let invalid = [
        "555123",
        "1234567890123456",
        "555-1234",
        "+5551234",
        "",
        "55512a4",
    ];
    let rows = invalid
        .iter()
        .map(|phone| ImportRow::new("Ann", "Lee", *phone))
        .collect::<Vec<_>>();
    let report = store.bulk_import(rows).unwrap();

    assert_eq!(report.accepted, 0);
    assert_eq!(report.rejected.len(), invalid.len());
    assert_eq!(
        store.list_all().unwrap(),
        vec![Contact::new("Ann", "Lee", "5551234")]
    );
}

#[test]
fn bulk_import_valid_phones_overwrite_by_identity() {
    let conn = open_db_in_memory().unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    let report = store
        .bulk_import(vec![
            ImportRow::new("Ann", "Lee", "1234567"),
            ImportRow::new("Ann", "Lee", "123456789012345"),
        ])
        .unwrap();

    assert_eq!(report.accepted, 2);
    assert!(report.rejected.is_empty());
    assert_eq!(
        store.list_all().unwrap(),
        vec![Contact::new("Ann", "Lee", "123456789012345")]
    );
}

#[test]
fn bulk_import_rejects_rows_with_missing_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));
    let rows: Vec<ImportRow> = serde_json::from_str(
        r#"[
            {"first_name": "Ann", "surname": "Lee", "phone": "5551234"},
            {"first_name": "Bob", "phone": "9990000"},
            {"first_name": "", "surname": "Ray", "phone": "1112223"}
        ]"#,
    )
    .unwrap();

    let report = store.bulk_import(rows).unwrap();

    assert_eq!(report.accepted, 1);
    assert!(matches!(
        report.rejected[0].reason,
        ContactValidationError::MissingField(_)
    ));
    assert!(matches!(
        report.rejected[1].reason,
        ContactValidationError::EmptyField(_)
    ));
}

#[test]
fn contacts_survive_reopen_of_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::file(dir.path().join("phonebook.db"));

    {
        let conn = open_db(&config).unwrap();
        seed(&conn);
    }

    let conn = open_db(&config).unwrap();
    let repo = SqliteContactRepository::new(&conn);
    assert_eq!(repo.search_contacts("Lee").unwrap().len(), 2);
}

#[test]
fn storage_failure_surfaces_as_storage_unavailable() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE phonebook;").unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    let err = store.upsert("Ann", "Lee", "5551234").unwrap_err();
    assert!(matches!(err, StoreError::StorageUnavailable(_)));

    let err = store
        .bulk_import(vec![ImportRow::new("Ann", "Lee", "5551234")])
        .unwrap_err();
    assert!(matches!(err, StoreError::StorageUnavailable(_)));
}

#[test]
fn bulk_import_storage_failure_rolls_back_whole_batch() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    conn.execute_batch(
        "CREATE TRIGGER block_cy BEFORE INSERT ON phonebook
         WHEN NEW.first_name = 'Cy'
         BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
    )
    .unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&conn));

    let err = store
        .bulk_import(vec![
            ImportRow::new("Ann", "Lee", "5550000"),
            ImportRow::new("Dee", "Ray", "4445556"),
            ImportRow::new("Cy", "Pat", "1112223"),
        ])
        .unwrap_err();

    assert!(matches!(err, StoreError::StorageUnavailable(_)));
    assert_eq!(
        store.list_all().unwrap(),
        vec![
            Contact::new("Ann", "Lee", "5551234"),
            Contact::new("Bob", "Lee", "9990000"),
        ]
    );
}

#[test]
fn locked_database_reports_lock_after_busy_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.db");
    let writer = open_db(&StoreConfig::file(&path)).unwrap();
    let blocked =
        open_db(&StoreConfig::file(&path).with_busy_timeout(Duration::from_millis(0))).unwrap();

    writer.execute_batch("BEGIN EXCLUSIVE;").unwrap();
    let store = PhonebookStore::new(SqliteContactRepository::new(&blocked));
    let err = store.upsert("Ann", "Lee", "5551234").unwrap_err();
    writer.execute_batch("ROLLBACK;").unwrap();

    match err {
        StoreError::StorageUnavailable(RepoError::Db(db_err)) => assert!(db_err.is_locked()),
        other => panic!("unexpected error: {other}"),
    }
}
