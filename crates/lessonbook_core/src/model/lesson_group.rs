//! Lesson group record: an ordered bucket of lessons within one subject.

use crate::model::subject::SubjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable lesson group identifier.
pub type LessonGroupId = Uuid;

/// Title used for groups synthesized as the subject fallback.
pub const DEFAULT_GROUP_TITLE: &str = "Lessons";
/// Base slug probed for synthesized default groups (`lessons`, `lessons-2`, ...).
pub const DEFAULT_GROUP_SLUG: &str = "lessons";

/// One lesson group row.
///
/// # Invariants
/// - `uid` and `slug` are unique within `subject_id`.
/// - Once any group exists for a subject, exactly one should be default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonGroup {
    pub id: LessonGroupId,
    pub uid: String,
    pub subject_id: SubjectId,
    pub title: String,
    pub slug: String,
    pub order: i64,
    pub is_default: bool,
    pub created_at: i64,
}

/// Base uid probed for the synthesized default group of `subject_id`.
pub fn default_group_uid(subject_id: SubjectId) -> String {
    format!("lg_default_{subject_id}")
}
