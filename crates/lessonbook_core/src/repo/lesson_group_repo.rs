//! Lesson group table contract and SQLite implementation.

use super::sqlite::{parse_bool, parse_uuid, SqliteCatalogRepository};
use super::{RepoError, RepoResult};
use crate::model::lesson_group::{LessonGroup, LessonGroupId};
use crate::model::subject::SubjectId;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const GROUP_SELECT_SQL: &str = "SELECT
    id,
    uid,
    subject_id,
    title,
    slug,
    sort_order,
    is_default,
    created_at
FROM lesson_groups";

/// Insert payload for one lesson group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLessonGroup {
    pub uid: String,
    pub subject_id: SubjectId,
    pub title: String,
    pub slug: String,
    pub order: i64,
    pub is_default: bool,
}

/// Repository interface for lesson group rows.
pub trait LessonGroupRepository {
    /// Lists the subject's groups by `order` ascending.
    fn list_groups(&self, subject_id: SubjectId) -> RepoResult<Vec<LessonGroup>>;
    fn get_group(&self, id: LessonGroupId) -> RepoResult<Option<LessonGroup>>;
    fn find_group_by_uid(&self, subject_id: SubjectId, uid: &str)
        -> RepoResult<Option<LessonGroup>>;
    fn find_group_by_slug(
        &self,
        subject_id: SubjectId,
        slug: &str,
    ) -> RepoResult<Option<LessonGroup>>;
    /// Groups of the subject currently flagged default, oldest first.
    fn list_default_groups(&self, subject_id: SubjectId) -> RepoResult<Vec<LessonGroup>>;
    /// `1 + max(order)` within the subject, or `0` when it has no groups.
    fn next_group_order(&self, subject_id: SubjectId) -> RepoResult<i64>;
    fn insert_group(&self, group: &NewLessonGroup) -> RepoResult<LessonGroup>;
    /// Overwrites uid, title, and slug of an existing group.
    fn update_group(&self, group: &LessonGroup) -> RepoResult<()>;
    fn set_group_default(&self, id: LessonGroupId, is_default: bool) -> RepoResult<()>;
    fn set_group_order(&self, id: LessonGroupId, order: i64) -> RepoResult<()>;
}

impl LessonGroupRepository for SqliteCatalogRepository<'_> {
    fn list_groups(&self, subject_id: SubjectId) -> RepoResult<Vec<LessonGroup>> {
        query_many(
            self.conn,
            "subject_id = ?1 ORDER BY sort_order ASC, created_at ASC, id ASC",
            &[&subject_id.to_string()],
        )
    }

    fn get_group(&self, id: LessonGroupId) -> RepoResult<Option<LessonGroup>> {
        query_first(self.conn, "id = ?1", &[&id.to_string()])
    }

    fn find_group_by_uid(
        &self,
        subject_id: SubjectId,
        uid: &str,
    ) -> RepoResult<Option<LessonGroup>> {
        query_first(
            self.conn,
            "subject_id = ?1 AND uid = ?2",
            &[&subject_id.to_string(), &uid],
        )
    }

    fn find_group_by_slug(
        &self,
        subject_id: SubjectId,
        slug: &str,
    ) -> RepoResult<Option<LessonGroup>> {
        query_first(
            self.conn,
            "subject_id = ?1 AND slug = ?2",
            &[&subject_id.to_string(), &slug],
        )
    }

    fn list_default_groups(&self, subject_id: SubjectId) -> RepoResult<Vec<LessonGroup>> {
        query_many(
            self.conn,
            "subject_id = ?1 AND is_default = 1 ORDER BY created_at ASC, id ASC",
            &[&subject_id.to_string()],
        )
    }

    fn next_group_order(&self, subject_id: SubjectId) -> RepoResult<i64> {
        let next = self.conn.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1
             FROM lesson_groups
             WHERE subject_id = ?1;",
            [subject_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    fn insert_group(&self, group: &NewLessonGroup) -> RepoResult<LessonGroup> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO lesson_groups (id, uid, subject_id, title, slug, sort_order, is_default)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.to_string(),
                group.uid,
                group.subject_id.to_string(),
                group.title,
                group.slug,
                group.order,
                group.is_default,
            ],
        )?;
        self.get_group(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted lesson group {id} not readable"))
        })
    }

    fn update_group(&self, group: &LessonGroup) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE lesson_groups
             SET uid = ?2,
                 title = ?3,
                 slug = ?4
             WHERE id = ?1;",
            params![group.id.to_string(), group.uid, group.title, group.slug],
        )?;
        Ok(())
    }

    fn set_group_default(&self, id: LessonGroupId, is_default: bool) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE lesson_groups SET is_default = ?2 WHERE id = ?1;",
            params![id.to_string(), is_default],
        )?;
        Ok(())
    }

    fn set_group_order(&self, id: LessonGroupId, order: i64) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE lesson_groups SET sort_order = ?2 WHERE id = ?1;",
            params![id.to_string(), order],
        )?;
        Ok(())
    }
}

fn query_many(
    conn: &Connection,
    clause: &str,
    values: &[&dyn ToSql],
) -> RepoResult<Vec<LessonGroup>> {
    let mut stmt = conn.prepare(&format!("{GROUP_SELECT_SQL} WHERE {clause};"))?;
    let mut rows = stmt.query(values)?;
    let mut groups = Vec::new();
    while let Some(row) = rows.next()? {
        groups.push(parse_group_row(row)?);
    }
    Ok(groups)
}

fn query_first(
    conn: &Connection,
    clause: &str,
    values: &[&dyn ToSql],
) -> RepoResult<Option<LessonGroup>> {
    Ok(query_many(conn, clause, values)?.into_iter().next())
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<LessonGroup> {
    let id_text: String = row.get("id")?;
    let subject_text: String = row.get("subject_id")?;
    Ok(LessonGroup {
        id: parse_uuid(&id_text, "lesson_groups.id")?,
        uid: row.get("uid")?,
        subject_id: parse_uuid(&subject_text, "lesson_groups.subject_id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        order: row.get("sort_order")?,
        is_default: parse_bool(row.get("is_default")?, "lesson_groups.is_default")?,
        created_at: row.get("created_at")?,
    })
}
