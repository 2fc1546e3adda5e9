//! Uniqueness, default-group, and parent-chain helpers shared by services.
//!
//! Helpers run inside the caller's unit of work; they never open their own
//! transaction.
//!
//! # Invariants
//! - `assert_unique_*` pass when the only match is `exclude_id`.
//! - `ensure_default_group` leaves exactly one default group per subject.

use super::{ServiceError, ServiceResult};
use crate::model::lesson::LessonId;
use crate::model::lesson_group::{
    default_group_uid, LessonGroupId, DEFAULT_GROUP_SLUG, DEFAULT_GROUP_TITLE,
};
use crate::model::subject::SubjectId;
use crate::repo::{
    LessonGroupRepository, LessonRepository, NewLessonGroup, RepoResult, SubjectRepository,
};
use log::{info, warn};
use std::collections::HashSet;

pub fn assert_unique_subject_uid<R: SubjectRepository>(
    repo: &R,
    uid: &str,
    exclude_id: Option<SubjectId>,
) -> ServiceResult<()> {
    match repo.find_subject_by_uid(uid)? {
        Some(existing) if Some(existing.id) != exclude_id => {
            Err(ServiceError::SubjectUidInUse(uid.to_string()))
        }
        _ => Ok(()),
    }
}

pub fn assert_unique_subject_slug<R: SubjectRepository>(
    repo: &R,
    slug: &str,
    exclude_id: Option<SubjectId>,
) -> ServiceResult<()> {
    match repo.find_subject_by_slug(slug)? {
        Some(existing) if Some(existing.id) != exclude_id => {
            Err(ServiceError::SubjectSlugInUse(slug.to_string()))
        }
        _ => Ok(()),
    }
}

pub fn assert_unique_group_uid<R: LessonGroupRepository>(
    repo: &R,
    subject_id: SubjectId,
    uid: &str,
    exclude_id: Option<LessonGroupId>,
) -> ServiceResult<()> {
    match repo.find_group_by_uid(subject_id, uid)? {
        Some(existing) if Some(existing.id) != exclude_id => {
            Err(ServiceError::GroupUidInUse(uid.to_string()))
        }
        _ => Ok(()),
    }
}

pub fn assert_unique_group_slug<R: LessonGroupRepository>(
    repo: &R,
    subject_id: SubjectId,
    slug: &str,
    exclude_id: Option<LessonGroupId>,
) -> ServiceResult<()> {
    match repo.find_group_by_slug(subject_id, slug)? {
        Some(existing) if Some(existing.id) != exclude_id => {
            Err(ServiceError::GroupSlugInUse(slug.to_string()))
        }
        _ => Ok(()),
    }
}

pub fn assert_unique_lesson_uid<R: LessonRepository>(
    repo: &R,
    subject_id: SubjectId,
    uid: &str,
    exclude_id: Option<LessonId>,
) -> ServiceResult<()> {
    match repo.find_lesson_by_uid(subject_id, uid)? {
        Some(existing) if Some(existing.id) != exclude_id => {
            Err(ServiceError::LessonUidInUse(uid.to_string()))
        }
        _ => Ok(()),
    }
}

pub fn assert_unique_lesson_slug<R: LessonRepository>(
    repo: &R,
    subject_id: SubjectId,
    lesson_slug: &str,
    exclude_id: Option<LessonId>,
) -> ServiceResult<()> {
    match repo.find_lesson_by_slug(subject_id, lesson_slug)? {
        Some(existing) if Some(existing.id) != exclude_id => {
            Err(ServiceError::LessonSlugInUse(lesson_slug.to_string()))
        }
        _ => Ok(()),
    }
}

/// Returns the subject's default group id, creating one when none exists.
///
/// Extra default flags left by an earlier inconsistent write are cleared,
/// keeping the oldest default.
pub fn ensure_default_group<R: LessonGroupRepository>(
    repo: &R,
    subject_id: SubjectId,
) -> ServiceResult<LessonGroupId> {
    let defaults = repo.list_default_groups(subject_id)?;
    if let Some((kept, duplicates)) = defaults.split_first() {
        for duplicate in duplicates {
            warn!(
                "event=default_group_heal module=service status=ok subject_id={subject_id} kept={} cleared={}",
                kept.id, duplicate.id
            );
            repo.set_group_default(duplicate.id, false)?;
        }
        return Ok(kept.id);
    }

    let uid = first_free_candidate(&default_group_uid(subject_id), '_', |candidate| {
        Ok(repo.find_group_by_uid(subject_id, candidate)?.is_none())
    })?;
    let slug = first_free_candidate(DEFAULT_GROUP_SLUG, '-', |candidate| {
        Ok(repo.find_group_by_slug(subject_id, candidate)?.is_none())
    })?;
    let order = repo.next_group_order(subject_id)?;

    let group = repo.insert_group(&NewLessonGroup {
        uid,
        subject_id,
        title: DEFAULT_GROUP_TITLE.to_string(),
        slug,
        order,
        is_default: true,
    })?;
    info!(
        "event=default_group_create module=service status=ok subject_id={subject_id} group_id={}",
        group.id
    );
    Ok(group.id)
}

/// Makes `group_id` the only default group of `subject_id`. Idempotent.
pub fn set_default_group<R: LessonGroupRepository>(
    repo: &R,
    subject_id: SubjectId,
    group_id: LessonGroupId,
) -> ServiceResult<()> {
    let mut already_default = false;
    for group in repo.list_default_groups(subject_id)? {
        if group.id == group_id {
            already_default = true;
            continue;
        }
        repo.set_group_default(group.id, false)?;
    }
    if !already_default {
        repo.set_group_default(group_id, true)?;
    }
    Ok(())
}

/// Rejects `parent_id` when it is `lesson_id` or one of its descendants.
///
/// Walks upward from `parent_id` through stored parent links. A broken chain
/// fails with `ParentNotFound`; a pre-existing loop is reported as a cycle.
pub fn assert_no_cycle<R: LessonRepository>(
    repo: &R,
    lesson_id: LessonId,
    parent_id: LessonId,
) -> ServiceResult<()> {
    let mut visited = HashSet::new();
    let mut cursor = Some(parent_id);
    while let Some(current) = cursor {
        if current == lesson_id || !visited.insert(current) {
            return Err(ServiceError::CycleDetected {
                lesson_id,
                parent_id,
            });
        }
        let ancestor = repo
            .get_lesson(current)?
            .ok_or(ServiceError::ParentNotFound(current))?;
        cursor = ancestor.parent_lesson_id;
    }
    Ok(())
}

/// Probes `base`, `base<sep>2`, `base<sep>3`, ... until `is_free` accepts one.
fn first_free_candidate(
    base: &str,
    separator: char,
    mut is_free: impl FnMut(&str) -> RepoResult<bool>,
) -> RepoResult<String> {
    let mut suffix = 1_u64;
    loop {
        let candidate = if suffix == 1 {
            base.to_string()
        } else {
            format!("{base}{separator}{suffix}")
        };
        if is_free(&candidate)? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}
