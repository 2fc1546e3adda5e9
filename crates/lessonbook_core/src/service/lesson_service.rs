//! Lesson use-case service.
//!
//! # Invariants
//! - `uid` and `lesson_slug` are unique within a subject.
//! - A lesson's group belongs to its subject; a parent lesson belongs to the
//!   same subject and group.
//! - Parent links never form a cycle.
//! - New and moved lessons take the next order of their sibling scope;
//!   the scope they leave is not compacted.

use super::common::{now_timestamp, trim_optional};
use super::hierarchy::{
    assert_no_cycle, assert_unique_lesson_slug, assert_unique_lesson_uid, ensure_default_group,
};
use super::sidebar::{build_sidebar_tree, SidebarTree};
use super::{normalize_required, ServiceError, ServiceResult};
use crate::model::lesson::{Difficulty, Lesson, LessonId, LessonStatus};
use crate::model::lesson_group::{LessonGroup, LessonGroupId};
use crate::model::subject::{Subject, SubjectId};
use crate::repo::{CatalogRepository, LessonGroupRepository, LessonRepository, NewLesson};
use log::info;
use serde::Serialize;
use std::collections::VecDeque;

/// Input for [`LessonService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLesson {
    pub uid: String,
    pub subject_id: SubjectId,
    /// Explicit group; falls back to the parent's group, then the subject's
    /// default group.
    pub group_id: Option<LessonGroupId>,
    pub parent_lesson_id: Option<LessonId>,
    pub title: String,
    pub description: String,
    pub lesson_slug: String,
    pub body_mdx: String,
    pub difficulty: Difficulty,
    /// Defaults to `draft`.
    pub status: Option<LessonStatus>,
    pub summary: Option<String>,
}

/// Partial content update. Placement and status have their own operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonPatch {
    pub uid: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub lesson_slug: Option<String>,
    pub body_mdx: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// `Some(None)` clears the summary.
    pub summary: Option<Option<String>>,
}

/// Target placement for [`LessonService::move_lesson`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LessonMove {
    /// `None` keeps the current group.
    pub group_id: Option<LessonGroupId>,
    /// `None` keeps the current parent; `Some(None)` makes it a root lesson.
    pub parent_lesson_id: Option<Option<LessonId>>,
}

/// A lesson resolved from its public route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonRoute {
    pub subject: Subject,
    pub lesson: Lesson,
}

/// Identity of a deleted lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedLesson {
    pub id: LessonId,
    pub uid: String,
}

/// Lessons deleted by [`LessonService::remove_subtree`], in discovery
/// (breadth-first) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedSubtree {
    pub deleted_lesson_ids: Vec<LessonId>,
    pub deleted_lesson_uids: Vec<String>,
}

/// Lesson service facade.
pub struct LessonService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> LessonService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get(&self, lesson_id: LessonId) -> ServiceResult<Lesson> {
        self.repo
            .atomically(|repo| -> ServiceResult<Lesson> { lesson_or_not_found(repo, lesson_id) })
    }

    /// Resolves `/{subject_slug}/{lesson_slug}`.
    ///
    /// Returns `None` when either part is missing, or when the lesson is not
    /// published and `include_drafts` is false.
    pub fn get_by_route(
        &self,
        subject_slug: &str,
        lesson_slug: &str,
        include_drafts: bool,
    ) -> ServiceResult<Option<LessonRoute>> {
        let subject_slug = normalize_required(subject_slug, "subjectSlug")?;
        let lesson_slug = normalize_required(lesson_slug, "lessonSlug")?;

        self.repo
            .atomically(|repo| -> ServiceResult<Option<LessonRoute>> {
                let Some(subject) = repo.find_subject_by_slug(&subject_slug)? else {
                    return Ok(None);
                };
                let Some(lesson) = repo.find_lesson_by_slug(subject.id, &lesson_slug)? else {
                    return Ok(None);
                };
                if !include_drafts && !lesson.is_published() {
                    return Ok(None);
                }
                Ok(Some(LessonRoute { subject, lesson }))
            })
    }

    /// Builds the navigation tree of a subject.
    ///
    /// Only published lessons are visible unless `include_drafts` is set, in
    /// which case every status is.
    pub fn get_sidebar_tree(
        &self,
        subject_id: SubjectId,
        include_drafts: bool,
    ) -> ServiceResult<SidebarTree> {
        self.repo.atomically(|repo| -> ServiceResult<SidebarTree> {
            let subject = repo
                .get_subject(subject_id)?
                .ok_or(ServiceError::SubjectNotFound(subject_id))?;
            let groups = repo.list_groups(subject_id)?;

            let visible: &[LessonStatus] = if include_drafts {
                &LessonStatus::ALL
            } else {
                &[LessonStatus::Published]
            };
            let mut lessons = Vec::new();
            for status in visible {
                lessons.extend(repo.list_lessons_by_status(subject_id, *status)?);
            }

            build_sidebar_tree(&subject, groups, lessons)
        })
    }

    pub fn create(&self, input: CreateLesson) -> ServiceResult<Lesson> {
        let uid = normalize_required(&input.uid, "uid")?;
        let title = normalize_required(&input.title, "title")?;
        let description = normalize_required(&input.description, "description")?;
        let lesson_slug = normalize_required(&input.lesson_slug, "lessonSlug")?;
        let body_mdx = normalize_required(&input.body_mdx, "bodyMdx")?;
        let subject_id = input.subject_id;

        let lesson = self.repo.atomically(|repo| -> ServiceResult<Lesson> {
            repo.get_subject(subject_id)?
                .ok_or(ServiceError::SubjectNotFound(subject_id))?;

            let default_group_id = ensure_default_group(repo, subject_id)?;

            let parent = match input.parent_lesson_id {
                Some(parent_id) => {
                    let parent = lesson_or_not_found(repo, parent_id)?;
                    if parent.subject_id != subject_id {
                        return Err(ServiceError::ParentSubjectMismatch { parent_id });
                    }
                    Some(parent)
                }
                None => None,
            };

            let group_id = match (input.group_id, parent.as_ref()) {
                (Some(group_id), _) => group_id,
                (None, Some(parent)) => parent.group_id,
                (None, None) => default_group_id,
            };
            let group = group_or_not_found(repo, group_id)?;
            if group.subject_id != subject_id {
                return Err(ServiceError::GroupSubjectMismatch { group_id });
            }
            if let Some(parent) = parent.as_ref() {
                if parent.group_id != group_id {
                    return Err(ServiceError::ParentGroupMismatch {
                        parent_id: parent.id,
                        group_id,
                    });
                }
            }

            assert_unique_lesson_uid(repo, subject_id, &uid, None)?;
            assert_unique_lesson_slug(repo, subject_id, &lesson_slug, None)?;

            let order = repo.next_lesson_order(subject_id, group_id, input.parent_lesson_id)?;
            Ok(repo.insert_lesson(&NewLesson {
                uid,
                subject_id,
                group_id,
                parent_lesson_id: input.parent_lesson_id,
                title,
                description,
                lesson_slug,
                body_mdx,
                order,
                difficulty: input.difficulty,
                status: input.status.unwrap_or_default(),
                updated_at: now_timestamp(),
                summary: trim_optional(input.summary.as_deref()),
            })?)
        })?;

        info!(
            "event=lesson_create module=service status=ok lesson_id={} group_id={} order={}",
            lesson.id, lesson.group_id, lesson.order
        );
        Ok(lesson)
    }

    /// Applies `patch` and returns the merged record. Always refreshes
    /// `updated_at`.
    pub fn update(&self, lesson_id: LessonId, patch: LessonPatch) -> ServiceResult<Lesson> {
        let lesson = self.repo.atomically(|repo| -> ServiceResult<Lesson> {
            let mut lesson = lesson_or_not_found(repo, lesson_id)?;

            if let Some(uid) = patch.uid.as_deref() {
                let uid = normalize_required(uid, "uid")?;
                if uid != lesson.uid {
                    assert_unique_lesson_uid(repo, lesson.subject_id, &uid, Some(lesson.id))?;
                }
                lesson.uid = uid;
            }
            if let Some(title) = patch.title.as_deref() {
                lesson.title = normalize_required(title, "title")?;
            }
            if let Some(description) = patch.description.as_deref() {
                lesson.description = normalize_required(description, "description")?;
            }
            if let Some(lesson_slug) = patch.lesson_slug.as_deref() {
                let lesson_slug = normalize_required(lesson_slug, "lessonSlug")?;
                if lesson_slug != lesson.lesson_slug {
                    assert_unique_lesson_slug(
                        repo,
                        lesson.subject_id,
                        &lesson_slug,
                        Some(lesson.id),
                    )?;
                }
                lesson.lesson_slug = lesson_slug;
            }
            if let Some(body_mdx) = patch.body_mdx.as_deref() {
                lesson.body_mdx = normalize_required(body_mdx, "bodyMdx")?;
            }
            if let Some(difficulty) = patch.difficulty {
                lesson.difficulty = difficulty;
            }
            if let Some(summary) = patch.summary.as_ref() {
                lesson.summary = trim_optional(summary.as_deref());
            }

            lesson.updated_at = now_timestamp();
            repo.update_lesson(&lesson)?;
            Ok(lesson)
        })?;

        info!("event=lesson_update module=service status=ok lesson_id={lesson_id}");
        Ok(lesson)
    }

    /// Overwrites the status. Any status may follow any other.
    pub fn set_status(&self, lesson_id: LessonId, status: LessonStatus) -> ServiceResult<Lesson> {
        let lesson = self.repo.atomically(|repo| -> ServiceResult<Lesson> {
            let mut lesson = lesson_or_not_found(repo, lesson_id)?;
            lesson.status = status;
            lesson.updated_at = now_timestamp();
            repo.update_lesson(&lesson)?;
            Ok(lesson)
        })?;

        info!("event=lesson_set_status module=service status=ok lesson_id={lesson_id} lesson_status={status}");
        Ok(lesson)
    }

    /// Moves a lesson to another group and/or parent, appending it to the
    /// end of the target sibling scope.
    pub fn move_lesson(&self, lesson_id: LessonId, target: LessonMove) -> ServiceResult<Lesson> {
        let lesson = self.repo.atomically(|repo| -> ServiceResult<Lesson> {
            let mut lesson = lesson_or_not_found(repo, lesson_id)?;

            let group_id = target.group_id.unwrap_or(lesson.group_id);
            let group = group_or_not_found(repo, group_id)?;
            if group.subject_id != lesson.subject_id {
                return Err(ServiceError::GroupSubjectMismatch { group_id });
            }

            let parent_lesson_id = target.parent_lesson_id.unwrap_or(lesson.parent_lesson_id);
            if let Some(parent_id) = parent_lesson_id {
                let parent = lesson_or_not_found(repo, parent_id)?;
                if parent.subject_id != lesson.subject_id {
                    return Err(ServiceError::ParentSubjectMismatch { parent_id });
                }
                if parent.group_id != group_id {
                    return Err(ServiceError::ParentGroupMismatch {
                        parent_id,
                        group_id,
                    });
                }
                assert_no_cycle(repo, lesson.id, parent_id)?;
            }

            lesson.order = repo.next_lesson_order(lesson.subject_id, group_id, parent_lesson_id)?;
            lesson.group_id = group_id;
            lesson.parent_lesson_id = parent_lesson_id;
            lesson.updated_at = now_timestamp();
            repo.update_lesson(&lesson)?;
            Ok(lesson)
        })?;

        info!(
            "event=lesson_move module=service status=ok lesson_id={lesson_id} group_id={} order={}",
            lesson.group_id, lesson.order
        );
        Ok(lesson)
    }

    /// Deletes one childless lesson.
    pub fn remove(&self, lesson_id: LessonId) -> ServiceResult<RemovedLesson> {
        let removed = self.repo.atomically(|repo| -> ServiceResult<RemovedLesson> {
            let lesson = lesson_or_not_found(repo, lesson_id)?;
            let children =
                repo.list_sibling_lessons(lesson.subject_id, lesson.group_id, Some(lesson.id))?;
            if !children.is_empty() {
                return Err(ServiceError::HasChildren(lesson.id));
            }
            repo.delete_lesson(lesson.id)?;
            Ok(RemovedLesson {
                id: lesson.id,
                uid: lesson.uid,
            })
        })?;

        info!("event=lesson_remove module=service status=ok lesson_id={lesson_id}");
        Ok(removed)
    }

    /// Deletes a lesson and every descendant in its group.
    ///
    /// Rows are deleted deepest-first so no child outlives its parent.
    pub fn remove_subtree(&self, lesson_id: LessonId) -> ServiceResult<RemovedSubtree> {
        let removed = self.repo.atomically(|repo| -> ServiceResult<RemovedSubtree> {
            let root = lesson_or_not_found(repo, lesson_id)?;

            let mut queue = VecDeque::from([root.id]);
            let mut deleted_lesson_ids = Vec::new();
            let mut deleted_lesson_uids = Vec::new();
            while let Some(current_id) = queue.pop_front() {
                let current = lesson_or_not_found(repo, current_id)?;
                deleted_lesson_ids.push(current.id);
                deleted_lesson_uids.push(current.uid);

                let children =
                    repo.list_sibling_lessons(root.subject_id, root.group_id, Some(current_id))?;
                queue.extend(children.into_iter().map(|child| child.id));
            }

            for id in deleted_lesson_ids.iter().rev() {
                repo.delete_lesson(*id)?;
            }
            Ok(RemovedSubtree {
                deleted_lesson_ids,
                deleted_lesson_uids,
            })
        })?;

        info!(
            "event=lesson_remove_subtree module=service status=ok lesson_id={lesson_id} deleted={}",
            removed.deleted_lesson_ids.len()
        );
        Ok(removed)
    }
}

fn lesson_or_not_found<R: LessonRepository>(repo: &R, lesson_id: LessonId) -> ServiceResult<Lesson> {
    repo.get_lesson(lesson_id)?
        .ok_or(ServiceError::LessonNotFound(lesson_id))
}

fn group_or_not_found<R: LessonGroupRepository>(
    repo: &R,
    group_id: LessonGroupId,
) -> ServiceResult<LessonGroup> {
    repo.get_group(group_id)?
        .ok_or(ServiceError::GroupNotFound(group_id))
}
