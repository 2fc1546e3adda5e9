//! Subject table contract and SQLite implementation.

use super::sqlite::{parse_uuid, SqliteCatalogRepository};
use super::{RepoError, RepoResult};
use crate::model::subject::{Subject, SubjectId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const SUBJECT_SELECT_SQL: &str = "SELECT
    id,
    uid,
    name,
    slug,
    description,
    sort_order,
    created_at
FROM subjects";

/// Insert payload for one subject; `id` and `created_at` are assigned here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
    pub uid: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub order: i64,
}

/// Repository interface for subject rows.
pub trait SubjectRepository {
    /// Lists all subjects by `order` ascending.
    fn list_subjects(&self) -> RepoResult<Vec<Subject>>;
    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    fn find_subject_by_uid(&self, uid: &str) -> RepoResult<Option<Subject>>;
    fn find_subject_by_slug(&self, slug: &str) -> RepoResult<Option<Subject>>;
    /// `1 + max(order)` over all subjects, or `0` when none exist.
    fn next_subject_order(&self) -> RepoResult<i64>;
    fn insert_subject(&self, subject: &NewSubject) -> RepoResult<Subject>;
    /// Overwrites every mutable column of an existing subject.
    fn update_subject(&self, subject: &Subject) -> RepoResult<()>;
}

impl SubjectRepository for SqliteCatalogRepository<'_> {
    fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBJECT_SELECT_SQL} ORDER BY sort_order ASC, created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(parse_subject_row(row)?);
        }
        Ok(subjects)
    }

    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        query_one(self.conn, "id = ?1", &id.to_string())
    }

    fn find_subject_by_uid(&self, uid: &str) -> RepoResult<Option<Subject>> {
        query_one(self.conn, "uid = ?1", uid)
    }

    fn find_subject_by_slug(&self, slug: &str) -> RepoResult<Option<Subject>> {
        query_one(self.conn, "slug = ?1", slug)
    }

    fn next_subject_order(&self) -> RepoResult<i64> {
        let next = self.conn.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM subjects;",
            [],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    fn insert_subject(&self, subject: &NewSubject) -> RepoResult<Subject> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO subjects (id, uid, name, slug, description, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                subject.uid,
                subject.name,
                subject.slug,
                subject.description,
                subject.order,
            ],
        )?;
        self.get_subject(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("inserted subject {id} not readable")))
    }

    fn update_subject(&self, subject: &Subject) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE subjects
             SET uid = ?2,
                 name = ?3,
                 slug = ?4,
                 description = ?5,
                 sort_order = ?6
             WHERE id = ?1;",
            params![
                subject.id.to_string(),
                subject.uid,
                subject.name,
                subject.slug,
                subject.description,
                subject.order,
            ],
        )?;
        Ok(())
    }
}

fn query_one(conn: &Connection, predicate: &str, value: &str) -> RepoResult<Option<Subject>> {
    let mut stmt = conn.prepare(&format!("{SUBJECT_SELECT_SQL} WHERE {predicate};"))?;
    let row = stmt
        .query_row([value], |row| Ok(parse_subject_row(row)))
        .optional()?;
    row.transpose()
}

fn parse_subject_row(row: &Row<'_>) -> RepoResult<Subject> {
    let id_text: String = row.get("id")?;
    Ok(Subject {
        id: parse_uuid(&id_text, "subjects.id")?,
        uid: row.get("uid")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
    })
}
