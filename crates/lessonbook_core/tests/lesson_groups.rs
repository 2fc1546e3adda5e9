use lessonbook_core::service::lesson_group_service::{CreateLessonGroup, LessonGroupPatch};
use lessonbook_core::service::subject_service::CreateSubject;
use lessonbook_core::{
    open_db_in_memory, LessonGroup, LessonGroupService, ServiceError, SqliteCatalogRepository,
    Subject, SubjectService,
};
use rusqlite::Connection;

fn groups(conn: &Connection) -> LessonGroupService<SqliteCatalogRepository<'_>> {
    LessonGroupService::new(SqliteCatalogRepository::try_new(conn).unwrap())
}

fn subject(conn: &Connection, slug: &str) -> Subject {
    SubjectService::new(SqliteCatalogRepository::try_new(conn).unwrap())
        .create(CreateSubject {
            uid: slug.to_string(),
            name: slug.to_string(),
            slug: slug.to_string(),
            description: None,
        })
        .unwrap()
}

fn create_group(
    conn: &Connection,
    subject: &Subject,
    slug: &str,
    is_default: bool,
) -> Result<LessonGroup, ServiceError> {
    groups(conn).create(CreateLessonGroup {
        uid: format!("g_{slug}"),
        subject_id: subject.id,
        title: slug.to_uppercase(),
        slug: slug.to_string(),
        is_default,
    })
}

fn default_ids(conn: &Connection, subject: &Subject) -> Vec<uuid::Uuid> {
    groups(conn)
        .list_by_subject(subject.id)
        .unwrap()
        .into_iter()
        .filter(|group| group.is_default)
        .map(|group| group.id)
        .collect()
}

#[test]
fn ensure_default_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "math");

    let first = groups(&conn).ensure_default_for_subject(math.id).unwrap();
    let second = groups(&conn).ensure_default_for_subject(math.id).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.uid, format!("lg_default_{}", math.id));
    assert_eq!(first.slug, "lessons");
    assert_eq!(first.title, "Lessons");
    assert_eq!(first.order, 0);
    assert_eq!(default_ids(&conn, &math), [first.id]);
}

#[test]
fn ensure_default_probes_for_free_uid_and_slug() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "math");
    groups(&conn)
        .create(CreateLessonGroup {
            uid: format!("lg_default_{}", math.id),
            subject_id: math.id,
            title: "Squatter".to_string(),
            slug: "lessons".to_string(),
            is_default: false,
        })
        .unwrap();
    create_group(&conn, &math, "lessons-2", false).unwrap();

    let default = groups(&conn).ensure_default_for_subject(math.id).unwrap();
    assert_eq!(default.uid, format!("lg_default_{}_2", math.id));
    assert_eq!(default.slug, "lessons-3");
    assert_eq!(default.order, 2);
}

#[test]
fn ensure_default_heals_double_default() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "math");
    let first = create_group(&conn, &math, "a", true).unwrap();
    let second = create_group(&conn, &math, "b", false).unwrap();
    conn.execute(
        "UPDATE lesson_groups SET is_default = 1 WHERE id = ?1",
        [second.id.to_string()],
    )
    .unwrap();
    assert_eq!(default_ids(&conn, &math).len(), 2);

    let kept = groups(&conn).ensure_default_for_subject(math.id).unwrap();
    assert_eq!(default_ids(&conn, &math), [kept.id]);
    assert!(kept.id == first.id || kept.id == second.id);
}

#[test]
fn ensure_default_for_missing_subject_fails() {
    let conn = open_db_in_memory().unwrap();
    let error = groups(&conn)
        .ensure_default_for_subject(uuid::Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(error, ServiceError::SubjectNotFound(_)));
}

#[test]
fn create_with_default_flag_moves_the_default() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "math");
    let first = create_group(&conn, &math, "basics", true).unwrap();
    assert!(first.is_default);

    let second = create_group(&conn, &math, "advanced", true).unwrap();
    assert!(second.is_default);
    assert_eq!(second.order, 1);
    assert_eq!(default_ids(&conn, &math), [second.id]);
}

#[test]
fn uid_and_slug_are_unique_per_subject_only() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "math");
    let physics = subject(&conn, "physics");
    create_group(&conn, &math, "basics", false).unwrap();

    let duplicate = create_group(&conn, &math, "basics", false).unwrap_err();
    assert!(matches!(duplicate, ServiceError::GroupUidInUse(_)));
    assert_eq!(
        duplicate.to_string(),
        "Lesson group uid \"g_basics\" is already in use for this subject."
    );

    let elsewhere = create_group(&conn, &physics, "basics", false).unwrap();
    assert_eq!(elsewhere.order, 0);
}

#[test]
fn default_cannot_be_unset_directly() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "math");
    let basics = create_group(&conn, &math, "basics", true).unwrap();
    let advanced = create_group(&conn, &math, "advanced", false).unwrap();

    let error = groups(&conn)
        .update(
            basics.id,
            LessonGroupPatch {
                title: Some("Renamed".to_string()),
                is_default: Some(false),
                ..LessonGroupPatch::default()
            },
        )
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Cannot unset default directly. Set another group as default."
    );

    let ignored = groups(&conn)
        .update(
            advanced.id,
            LessonGroupPatch {
                is_default: Some(false),
                ..LessonGroupPatch::default()
            },
        )
        .unwrap();
    assert!(!ignored.is_default);

    let promoted = groups(&conn)
        .update(
            advanced.id,
            LessonGroupPatch {
                is_default: Some(true),
                ..LessonGroupPatch::default()
            },
        )
        .unwrap();
    assert!(promoted.is_default);
    assert_eq!(default_ids(&conn, &math), [advanced.id]);
}

#[test]
fn update_keeps_own_slug_and_rejects_a_sibling_slug() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "math");
    let basics = create_group(&conn, &math, "basics", false).unwrap();
    create_group(&conn, &math, "advanced", false).unwrap();

    let same = groups(&conn)
        .update(
            basics.id,
            LessonGroupPatch {
                slug: Some("basics".to_string()),
                title: Some("Basics".to_string()),
                ..LessonGroupPatch::default()
            },
        )
        .unwrap();
    assert_eq!(same.title, "Basics");

    let taken = groups(&conn)
        .update(
            basics.id,
            LessonGroupPatch {
                slug: Some("advanced".to_string()),
                ..LessonGroupPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(taken, ServiceError::GroupSlugInUse(_)));
}

#[test]
fn reorder_places_listed_groups_first_then_stragglers() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "math");
    let a = create_group(&conn, &math, "a", false).unwrap();
    let b = create_group(&conn, &math, "b", false).unwrap();
    let c = create_group(&conn, &math, "c", false).unwrap();
    let d = create_group(&conn, &math, "d", false).unwrap();

    groups(&conn).reorder(math.id, &[c.id, a.id]).unwrap();

    let ordered: Vec<_> = groups(&conn)
        .list_by_subject(math.id)
        .unwrap()
        .into_iter()
        .map(|group| (group.id, group.order))
        .collect();
    assert_eq!(ordered, [(c.id, 0), (a.id, 1), (b.id, 2), (d.id, 3)]);
}

#[test]
fn reorder_with_foreign_group_fails_without_changes() {
    let conn = open_db_in_memory().unwrap();
    let math = subject(&conn, "math");
    let physics = subject(&conn, "physics");
    let a = create_group(&conn, &math, "a", false).unwrap();
    let b = create_group(&conn, &math, "b", false).unwrap();
    let foreign = create_group(&conn, &physics, "x", false).unwrap();

    let error = groups(&conn)
        .reorder(math.id, &[b.id, foreign.id])
        .unwrap_err();
    assert!(matches!(
        error,
        ServiceError::GroupNotInSubject { group_id, .. } if group_id == foreign.id
    ));

    let orders: Vec<_> = groups(&conn)
        .list_by_subject(math.id)
        .unwrap()
        .into_iter()
        .map(|group| (group.id, group.order))
        .collect();
    assert_eq!(orders, [(a.id, 0), (b.id, 1)]);
}
