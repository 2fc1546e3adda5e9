use lessonbook_core::service::subject_service::{CreateSubject, SubjectPatch};
use lessonbook_core::{open_db_in_memory, ServiceError, SqliteCatalogRepository, SubjectService};
use rusqlite::Connection;

fn subjects(conn: &Connection) -> SubjectService<SqliteCatalogRepository<'_>> {
    SubjectService::new(SqliteCatalogRepository::try_new(conn).unwrap())
}

fn create(conn: &Connection, uid: &str, slug: &str) -> Result<lessonbook_core::Subject, ServiceError> {
    subjects(conn).create(CreateSubject {
        uid: uid.to_string(),
        name: format!("{uid} name"),
        slug: slug.to_string(),
        description: None,
    })
}

fn subject_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM subjects", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_assigns_increasing_order_and_trims_fields() {
    let conn = open_db_in_memory().unwrap();
    let first = subjects(&conn)
        .create(CreateSubject {
            uid: "  math ".to_string(),
            name: " Math ".to_string(),
            slug: "math".to_string(),
            description: Some("  Numbers  ".to_string()),
        })
        .unwrap();
    let second = create(&conn, "physics", "physics").unwrap();

    assert_eq!(first.uid, "math");
    assert_eq!(first.name, "Math");
    assert_eq!(first.description.as_deref(), Some("Numbers"));
    assert_eq!(first.order, 0);
    assert_eq!(second.order, 1);

    let listed: Vec<_> = subjects(&conn)
        .list()
        .unwrap()
        .into_iter()
        .map(|subject| subject.uid)
        .collect();
    assert_eq!(listed, ["math", "physics"]);
}

#[test]
fn duplicate_uid_or_slug_fails_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    create(&conn, "math", "math").unwrap();

    let uid_error = create(&conn, "math", "other").unwrap_err();
    assert!(matches!(uid_error, ServiceError::SubjectUidInUse(ref uid) if uid == "math"));
    let slug_error = create(&conn, "other", "math").unwrap_err();
    assert_eq!(
        slug_error.to_string(),
        "Subject slug \"math\" is already in use."
    );
    assert_eq!(subject_count(&conn), 1);
}

#[test]
fn blank_required_field_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let error = create(&conn, "math", "   ").unwrap_err();
    assert!(matches!(error, ServiceError::InvalidField { field: "slug" }));
    assert_eq!(error.to_string(), "slug must be a non-empty string.");
    assert_eq!(subject_count(&conn), 0);
}

#[test]
fn get_by_slug_normalizes_and_returns_none_when_absent() {
    let conn = open_db_in_memory().unwrap();
    let created = create(&conn, "math", "math").unwrap();

    let found = subjects(&conn).get_by_slug("  math ").unwrap();
    assert_eq!(found.map(|subject| subject.id), Some(created.id));
    assert_eq!(subjects(&conn).get_by_slug("history").unwrap(), None);
    assert!(matches!(
        subjects(&conn).get_by_slug(" "),
        Err(ServiceError::InvalidField { field: "slug" })
    ));
}

#[test]
fn update_patches_only_provided_fields() {
    let conn = open_db_in_memory().unwrap();
    let created = subjects(&conn)
        .create(CreateSubject {
            uid: "math".to_string(),
            name: "Math".to_string(),
            slug: "math".to_string(),
            description: Some("Numbers".to_string()),
        })
        .unwrap();

    let renamed = subjects(&conn)
        .update(
            created.id,
            SubjectPatch {
                name: Some("Mathematics".to_string()),
                uid: Some("math".to_string()),
                ..SubjectPatch::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Mathematics");
    assert_eq!(renamed.slug, "math");
    assert_eq!(renamed.description.as_deref(), Some("Numbers"));
    assert_eq!(renamed.order, created.order);

    let cleared = subjects(&conn)
        .update(
            created.id,
            SubjectPatch {
                description: Some(None),
                ..SubjectPatch::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.description, None);

    let stored = subjects(&conn).get_by_slug("math").unwrap().unwrap();
    assert_eq!(stored, cleared);
}

#[test]
fn update_rejects_slug_taken_by_another_subject() {
    let conn = open_db_in_memory().unwrap();
    let math = create(&conn, "math", "math").unwrap();
    create(&conn, "physics", "physics").unwrap();

    let error = subjects(&conn)
        .update(
            math.id,
            SubjectPatch {
                name: Some("Renamed".to_string()),
                slug: Some("physics".to_string()),
                ..SubjectPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(error, ServiceError::SubjectSlugInUse(_)));

    let unchanged = subjects(&conn).get_by_slug("math").unwrap().unwrap();
    assert_eq!(unchanged.name, "math name");
}

#[test]
fn update_of_missing_subject_fails() {
    let conn = open_db_in_memory().unwrap();
    let missing = uuid::Uuid::new_v4();
    let error = subjects(&conn)
        .update(missing, SubjectPatch::default())
        .unwrap_err();
    assert!(matches!(error, ServiceError::SubjectNotFound(id) if id == missing));
}
