//! Catalog use-case services.
//!
//! # Responsibility
//! - Enforce hierarchy invariants (uniqueness, ordering, default group,
//!   cross-subject references, cycle-free parent chains) above the
//!   repository layer.
//! - Run every operation as one atomic unit of work.
//!
//! # Invariants
//! - A failed operation leaves no partial writes behind.
//! - Not-found is an error everywhere except route/slug lookups, which
//!   return `None`.

use crate::model::lesson::LessonId;
use crate::model::lesson_group::LessonGroupId;
use crate::model::subject::SubjectId;
use crate::repo::RepoError;

mod common;
pub mod hierarchy;
pub mod lesson_group_service;
pub mod lesson_service;
pub mod sidebar;
pub mod subject_service;

pub use common::normalize_required;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from catalog service operations.
///
/// Messages identify the offending value and are stable enough for callers
/// that only look at text.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Required text field is blank after trim.
    #[error("{field} must be a non-empty string.")]
    InvalidField { field: &'static str },
    #[error("Subject \"{0}\" was not found.")]
    SubjectNotFound(SubjectId),
    #[error("Lesson group \"{0}\" was not found.")]
    GroupNotFound(LessonGroupId),
    #[error("Lesson \"{0}\" was not found.")]
    LessonNotFound(LessonId),
    /// A parent chain points at a lesson that no longer exists.
    #[error("Parent lesson \"{0}\" was not found.")]
    ParentNotFound(LessonId),
    #[error("Subject uid \"{0}\" is already in use.")]
    SubjectUidInUse(String),
    #[error("Subject slug \"{0}\" is already in use.")]
    SubjectSlugInUse(String),
    #[error("Lesson group uid \"{0}\" is already in use for this subject.")]
    GroupUidInUse(String),
    #[error("Lesson group slug \"{0}\" is already in use for this subject.")]
    GroupSlugInUse(String),
    #[error("Lesson uid \"{0}\" is already in use for this subject.")]
    LessonUidInUse(String),
    #[error("Lesson slug \"{0}\" is already in use for this subject.")]
    LessonSlugInUse(String),
    /// Reorder listed a group owned by another subject.
    #[error("Group \"{group_id}\" does not belong to this subject.")]
    GroupNotInSubject {
        group_id: LessonGroupId,
        subject_id: SubjectId,
    },
    #[error("Lesson group \"{group_id}\" must belong to the same subject.")]
    GroupSubjectMismatch { group_id: LessonGroupId },
    #[error("Parent lesson \"{parent_id}\" must belong to the same subject.")]
    ParentSubjectMismatch { parent_id: LessonId },
    #[error("Child and parent lessons must be in the same group.")]
    ParentGroupMismatch {
        parent_id: LessonId,
        group_id: LessonGroupId,
    },
    #[error("Cannot set a lesson as a child of its own subtree.")]
    CycleDetected {
        lesson_id: LessonId,
        parent_id: LessonId,
    },
    #[error("Cannot remove lesson with sublessons. Move or delete children first.")]
    HasChildren(LessonId),
    #[error("Cannot unset default directly. Set another group as default.")]
    DefaultDemotion(LessonGroupId),
    #[error("Lesson \"{0}\" has parent in different group.")]
    ParentInDifferentGroup(LessonId),
    /// Internal consistency mismatch; signals a logic bug, not user input.
    #[error("Invariant violation: {0}.")]
    InvariantViolation(&'static str),
    #[error(transparent)]
    Repo(#[from] RepoError),
}
