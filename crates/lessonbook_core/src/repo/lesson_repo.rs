//! Lesson table contract and SQLite implementation.
//!
//! # Invariants
//! - Sibling scope is `(subject_id, group_id, parent_lesson_id)`; a `NULL`
//!   parent is matched with `IS` so root lessons form their own scope.
//! - Sibling listing is deterministic: `sort_order ASC, title ASC, id ASC`.

use super::sqlite::{parse_uuid, SqliteCatalogRepository};
use super::{RepoError, RepoResult};
use crate::model::lesson::{Difficulty, Lesson, LessonId, LessonStatus};
use crate::model::lesson_group::LessonGroupId;
use crate::model::subject::SubjectId;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const LESSON_SELECT_SQL: &str = "SELECT
    id,
    uid,
    subject_id,
    group_id,
    parent_lesson_id,
    title,
    description,
    lesson_slug,
    body_mdx,
    sort_order,
    difficulty,
    status,
    updated_at,
    summary,
    created_at
FROM lessons";

/// Insert payload for one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLesson {
    pub uid: String,
    pub subject_id: SubjectId,
    pub group_id: LessonGroupId,
    pub parent_lesson_id: Option<LessonId>,
    pub title: String,
    pub description: String,
    pub lesson_slug: String,
    pub body_mdx: String,
    pub order: i64,
    pub difficulty: Difficulty,
    pub status: LessonStatus,
    pub updated_at: String,
    pub summary: Option<String>,
}

/// Repository interface for lesson rows.
pub trait LessonRepository {
    fn get_lesson(&self, id: LessonId) -> RepoResult<Option<Lesson>>;
    fn find_lesson_by_uid(&self, subject_id: SubjectId, uid: &str) -> RepoResult<Option<Lesson>>;
    fn find_lesson_by_slug(
        &self,
        subject_id: SubjectId,
        lesson_slug: &str,
    ) -> RepoResult<Option<Lesson>>;
    /// Every lesson of the subject with the given status.
    fn list_lessons_by_status(
        &self,
        subject_id: SubjectId,
        status: LessonStatus,
    ) -> RepoResult<Vec<Lesson>>;
    /// Lessons in one sibling scope.
    fn list_sibling_lessons(
        &self,
        subject_id: SubjectId,
        group_id: LessonGroupId,
        parent_lesson_id: Option<LessonId>,
    ) -> RepoResult<Vec<Lesson>>;
    /// `1 + max(order)` within one sibling scope, or `0` when it is empty.
    fn next_lesson_order(
        &self,
        subject_id: SubjectId,
        group_id: LessonGroupId,
        parent_lesson_id: Option<LessonId>,
    ) -> RepoResult<i64>;
    fn insert_lesson(&self, lesson: &NewLesson) -> RepoResult<Lesson>;
    /// Overwrites every mutable column of an existing lesson.
    fn update_lesson(&self, lesson: &Lesson) -> RepoResult<()>;
    fn delete_lesson(&self, id: LessonId) -> RepoResult<()>;
}

impl LessonRepository for SqliteCatalogRepository<'_> {
    fn get_lesson(&self, id: LessonId) -> RepoResult<Option<Lesson>> {
        query_first(self.conn, "id = ?1", &[&id.to_string()])
    }

    fn find_lesson_by_uid(&self, subject_id: SubjectId, uid: &str) -> RepoResult<Option<Lesson>> {
        query_first(
            self.conn,
            "subject_id = ?1 AND uid = ?2",
            &[&subject_id.to_string(), &uid],
        )
    }

    fn find_lesson_by_slug(
        &self,
        subject_id: SubjectId,
        lesson_slug: &str,
    ) -> RepoResult<Option<Lesson>> {
        query_first(
            self.conn,
            "subject_id = ?1 AND lesson_slug = ?2",
            &[&subject_id.to_string(), &lesson_slug],
        )
    }

    fn list_lessons_by_status(
        &self,
        subject_id: SubjectId,
        status: LessonStatus,
    ) -> RepoResult<Vec<Lesson>> {
        query_many(
            self.conn,
            "subject_id = ?1 AND status = ?2 ORDER BY sort_order ASC, title ASC, id ASC",
            &[&subject_id.to_string(), &status.as_str()],
        )
    }

    fn list_sibling_lessons(
        &self,
        subject_id: SubjectId,
        group_id: LessonGroupId,
        parent_lesson_id: Option<LessonId>,
    ) -> RepoResult<Vec<Lesson>> {
        query_many(
            self.conn,
            "subject_id = ?1 AND group_id = ?2 AND parent_lesson_id IS ?3
             ORDER BY sort_order ASC, title ASC, id ASC",
            &[
                &subject_id.to_string(),
                &group_id.to_string(),
                &parent_lesson_id.map(|id| id.to_string()),
            ],
        )
    }

    fn next_lesson_order(
        &self,
        subject_id: SubjectId,
        group_id: LessonGroupId,
        parent_lesson_id: Option<LessonId>,
    ) -> RepoResult<i64> {
        let next = self.conn.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1
             FROM lessons
             WHERE subject_id = ?1
               AND group_id = ?2
               AND parent_lesson_id IS ?3;",
            params![
                subject_id.to_string(),
                group_id.to_string(),
                parent_lesson_id.map(|id| id.to_string()),
            ],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    fn insert_lesson(&self, lesson: &NewLesson) -> RepoResult<Lesson> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO lessons (
                id,
                uid,
                subject_id,
                group_id,
                parent_lesson_id,
                title,
                description,
                lesson_slug,
                body_mdx,
                sort_order,
                difficulty,
                status,
                updated_at,
                summary
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                id.to_string(),
                lesson.uid,
                lesson.subject_id.to_string(),
                lesson.group_id.to_string(),
                lesson.parent_lesson_id.map(|value| value.to_string()),
                lesson.title,
                lesson.description,
                lesson.lesson_slug,
                lesson.body_mdx,
                lesson.order,
                lesson.difficulty.as_str(),
                lesson.status.as_str(),
                lesson.updated_at,
                lesson.summary,
            ],
        )?;
        self.get_lesson(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("inserted lesson {id} not readable")))
    }

    fn update_lesson(&self, lesson: &Lesson) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE lessons
             SET uid = ?2,
                 group_id = ?3,
                 parent_lesson_id = ?4,
                 title = ?5,
                 description = ?6,
                 lesson_slug = ?7,
                 body_mdx = ?8,
                 sort_order = ?9,
                 difficulty = ?10,
                 status = ?11,
                 updated_at = ?12,
                 summary = ?13
             WHERE id = ?1;",
            params![
                lesson.id.to_string(),
                lesson.uid,
                lesson.group_id.to_string(),
                lesson.parent_lesson_id.map(|value| value.to_string()),
                lesson.title,
                lesson.description,
                lesson.lesson_slug,
                lesson.body_mdx,
                lesson.order,
                lesson.difficulty.as_str(),
                lesson.status.as_str(),
                lesson.updated_at,
                lesson.summary,
            ],
        )?;
        Ok(())
    }

    fn delete_lesson(&self, id: LessonId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM lessons WHERE id = ?1;", [id.to_string()])?;
        Ok(())
    }
}

fn query_many(conn: &Connection, clause: &str, values: &[&dyn ToSql]) -> RepoResult<Vec<Lesson>> {
    let mut stmt = conn.prepare(&format!("{LESSON_SELECT_SQL} WHERE {clause};"))?;
    let mut rows = stmt.query(values)?;
    let mut lessons = Vec::new();
    while let Some(row) = rows.next()? {
        lessons.push(parse_lesson_row(row)?);
    }
    Ok(lessons)
}

fn query_first(
    conn: &Connection,
    clause: &str,
    values: &[&dyn ToSql],
) -> RepoResult<Option<Lesson>> {
    Ok(query_many(conn, clause, values)?.into_iter().next())
}

fn parse_lesson_row(row: &Row<'_>) -> RepoResult<Lesson> {
    let id_text: String = row.get("id")?;
    let subject_text: String = row.get("subject_id")?;
    let group_text: String = row.get("group_id")?;
    let parent_lesson_id = row
        .get::<_, Option<String>>("parent_lesson_id")?
        .map(|value| parse_uuid(&value, "lessons.parent_lesson_id"))
        .transpose()?;

    let difficulty_text: String = row.get("difficulty")?;
    let difficulty = difficulty_text.parse::<Difficulty>().map_err(|err| {
        RepoError::InvalidData(format!("{err} in lessons.difficulty"))
    })?;
    let status_text: String = row.get("status")?;
    let status = status_text
        .parse::<LessonStatus>()
        .map_err(|err| RepoError::InvalidData(format!("{err} in lessons.status")))?;

    Ok(Lesson {
        id: parse_uuid(&id_text, "lessons.id")?,
        uid: row.get("uid")?,
        subject_id: parse_uuid(&subject_text, "lessons.subject_id")?,
        group_id: parse_uuid(&group_text, "lessons.group_id")?,
        parent_lesson_id,
        title: row.get("title")?,
        description: row.get("description")?,
        lesson_slug: row.get("lesson_slug")?,
        body_mdx: row.get("body_mdx")?,
        order: row.get("sort_order")?,
        difficulty,
        status,
        updated_at: row.get("updated_at")?,
        summary: row.get("summary")?,
        created_at: row.get("created_at")?,
    })
}
