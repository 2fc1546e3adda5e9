//! Subject use-case service.
//!
//! # Invariants
//! - `uid` and `slug` are unique across all subjects.
//! - New subjects are appended after the current highest `order`.

use super::common::trim_optional;
use super::hierarchy::{assert_unique_subject_slug, assert_unique_subject_uid};
use super::{normalize_required, ServiceError, ServiceResult};
use crate::model::subject::{Subject, SubjectId};
use crate::repo::{CatalogRepository, NewSubject};
use log::info;

/// Input for [`SubjectService::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSubject {
    pub uid: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectPatch {
    pub uid: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

/// Subject service facade.
pub struct SubjectService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> SubjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every subject by display order.
    pub fn list(&self) -> ServiceResult<Vec<Subject>> {
        self.repo
            .atomically(|repo| -> ServiceResult<_> { Ok(repo.list_subjects()?) })
    }

    /// Looks a subject up by slug; `None` when absent.
    pub fn get_by_slug(&self, slug: &str) -> ServiceResult<Option<Subject>> {
        let slug = normalize_required(slug, "slug")?;
        self.repo.atomically(|repo| -> ServiceResult<_> {
            Ok(repo.find_subject_by_slug(&slug)?)
        })
    }

    pub fn create(&self, input: CreateSubject) -> ServiceResult<Subject> {
        let uid = normalize_required(&input.uid, "uid")?;
        let name = normalize_required(&input.name, "name")?;
        let slug = normalize_required(&input.slug, "slug")?;
        let description = trim_optional(input.description.as_deref());

        let subject = self.repo.atomically(|repo| -> ServiceResult<Subject> {
            assert_unique_subject_uid(repo, &uid, None)?;
            assert_unique_subject_slug(repo, &slug, None)?;
            let order = repo.next_subject_order()?;
            Ok(repo.insert_subject(&NewSubject {
                uid,
                name,
                slug,
                description,
                order,
            })?)
        })?;

        info!(
            "event=subject_create module=service status=ok subject_id={} order={}",
            subject.id, subject.order
        );
        Ok(subject)
    }

    /// Applies `patch` and returns the merged record.
    pub fn update(&self, subject_id: SubjectId, patch: SubjectPatch) -> ServiceResult<Subject> {
        let subject = self.repo.atomically(|repo| -> ServiceResult<Subject> {
            let mut subject = repo
                .get_subject(subject_id)?
                .ok_or(ServiceError::SubjectNotFound(subject_id))?;

            if let Some(uid) = patch.uid.as_deref() {
                let uid = normalize_required(uid, "uid")?;
                if uid != subject.uid {
                    assert_unique_subject_uid(repo, &uid, Some(subject.id))?;
                }
                subject.uid = uid;
            }
            if let Some(name) = patch.name.as_deref() {
                subject.name = normalize_required(name, "name")?;
            }
            if let Some(slug) = patch.slug.as_deref() {
                let slug = normalize_required(slug, "slug")?;
                if slug != subject.slug {
                    assert_unique_subject_slug(repo, &slug, Some(subject.id))?;
                }
                subject.slug = slug;
            }
            if let Some(description) = patch.description.as_ref() {
                subject.description = trim_optional(description.as_deref());
            }

            repo.update_subject(&subject)?;
            Ok(subject)
        })?;

        info!("event=subject_update module=service status=ok subject_id={subject_id}");
        Ok(subject)
    }
}
