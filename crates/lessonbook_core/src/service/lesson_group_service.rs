//! Lesson group use-case service.
//!
//! # Invariants
//! - `uid` and `slug` are unique within a subject.
//! - Default is promotion-only: a group stops being default only when
//!   another group of the subject is promoted.
//! - After `reorder`, every group of the subject has a distinct, contiguous
//!   order starting at `0`.

use super::hierarchy::{
    assert_unique_group_slug, assert_unique_group_uid, ensure_default_group, set_default_group,
};
use super::{normalize_required, ServiceError, ServiceResult};
use crate::model::lesson_group::{LessonGroup, LessonGroupId};
use crate::model::subject::SubjectId;
use crate::repo::{CatalogRepository, NewLessonGroup};
use log::info;
use std::collections::HashSet;

/// Input for [`LessonGroupService::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateLessonGroup {
    pub uid: String,
    pub subject_id: SubjectId,
    pub title: String,
    pub slug: String,
    /// Promote the new group to default after insert.
    pub is_default: bool,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonGroupPatch {
    pub uid: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    /// `Some(true)` promotes. `Some(false)` is rejected on the current
    /// default and ignored otherwise.
    pub is_default: Option<bool>,
}

/// Lesson group service facade.
pub struct LessonGroupService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> LessonGroupService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the subject's groups by display order.
    pub fn list_by_subject(&self, subject_id: SubjectId) -> ServiceResult<Vec<LessonGroup>> {
        self.repo
            .atomically(|repo| -> ServiceResult<_> { Ok(repo.list_groups(subject_id)?) })
    }

    pub fn create(&self, input: CreateLessonGroup) -> ServiceResult<LessonGroup> {
        let uid = normalize_required(&input.uid, "uid")?;
        let title = normalize_required(&input.title, "title")?;
        let slug = normalize_required(&input.slug, "slug")?;
        let subject_id = input.subject_id;

        let group = self.repo.atomically(|repo| -> ServiceResult<LessonGroup> {
            repo.get_subject(subject_id)?
                .ok_or(ServiceError::SubjectNotFound(subject_id))?;
            assert_unique_group_uid(repo, subject_id, &uid, None)?;
            assert_unique_group_slug(repo, subject_id, &slug, None)?;

            let order = repo.next_group_order(subject_id)?;
            let mut group = repo.insert_group(&NewLessonGroup {
                uid,
                subject_id,
                title,
                slug,
                order,
                is_default: false,
            })?;
            if input.is_default {
                set_default_group(repo, subject_id, group.id)?;
                group.is_default = true;
            }
            Ok(group)
        })?;

        info!(
            "event=group_create module=service status=ok subject_id={subject_id} group_id={} is_default={}",
            group.id, group.is_default
        );
        Ok(group)
    }

    /// Applies `patch` and returns the merged record.
    pub fn update(
        &self,
        group_id: LessonGroupId,
        patch: LessonGroupPatch,
    ) -> ServiceResult<LessonGroup> {
        let group = self.repo.atomically(|repo| -> ServiceResult<LessonGroup> {
            let mut group = repo
                .get_group(group_id)?
                .ok_or(ServiceError::GroupNotFound(group_id))?;

            if patch.is_default == Some(false) && group.is_default {
                return Err(ServiceError::DefaultDemotion(group_id));
            }

            if let Some(uid) = patch.uid.as_deref() {
                let uid = normalize_required(uid, "uid")?;
                assert_unique_group_uid(repo, group.subject_id, &uid, Some(group.id))?;
                group.uid = uid;
            }
            if let Some(title) = patch.title.as_deref() {
                group.title = normalize_required(title, "title")?;
            }
            if let Some(slug) = patch.slug.as_deref() {
                let slug = normalize_required(slug, "slug")?;
                assert_unique_group_slug(repo, group.subject_id, &slug, Some(group.id))?;
                group.slug = slug;
            }
            repo.update_group(&group)?;

            if patch.is_default == Some(true) {
                set_default_group(repo, group.subject_id, group.id)?;
                group.is_default = true;
            }
            Ok(group)
        })?;

        info!("event=group_update module=service status=ok group_id={group_id}");
        Ok(group)
    }

    /// Assigns `0..k-1` to `ordered_group_ids`, then appends every unlisted
    /// group of the subject in its previous relative order.
    pub fn reorder(
        &self,
        subject_id: SubjectId,
        ordered_group_ids: &[LessonGroupId],
    ) -> ServiceResult<()> {
        self.repo.atomically(|repo| -> ServiceResult<()> {
            let groups = repo.list_groups(subject_id)?;
            let owned: HashSet<LessonGroupId> = groups.iter().map(|group| group.id).collect();
            if let Some(foreign) = ordered_group_ids.iter().find(|id| !owned.contains(*id)) {
                return Err(ServiceError::GroupNotInSubject {
                    group_id: *foreign,
                    subject_id,
                });
            }

            let mut placed = HashSet::new();
            let listed = ordered_group_ids
                .iter()
                .copied()
                .filter(|id| placed.insert(*id))
                .collect::<Vec<_>>();
            let stragglers = groups
                .iter()
                .map(|group| group.id)
                .filter(|id| !placed.contains(id));

            for (order, group_id) in listed.iter().copied().chain(stragglers).enumerate() {
                repo.set_group_order(group_id, order as i64)?;
            }
            Ok(())
        })?;

        info!(
            "event=group_reorder module=service status=ok subject_id={subject_id} listed={}",
            ordered_group_ids.len()
        );
        Ok(())
    }

    /// Ensures the subject has exactly one default group and returns it.
    pub fn ensure_default_for_subject(&self, subject_id: SubjectId) -> ServiceResult<LessonGroup> {
        self.repo.atomically(|repo| -> ServiceResult<LessonGroup> {
            repo.get_subject(subject_id)?
                .ok_or(ServiceError::SubjectNotFound(subject_id))?;
            let group_id = ensure_default_group(repo, subject_id)?;
            repo.list_default_groups(subject_id)?
                .into_iter()
                .find(|group| group.id == group_id)
                .ok_or(ServiceError::InvariantViolation(
                    "default lesson group missing",
                ))
        })
    }
}
