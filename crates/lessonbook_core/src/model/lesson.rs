//! Lesson record and its enumerations.
//!
//! # Invariants
//! - `uid` and `lesson_slug` are unique within `subject_id`.
//! - `group_id` references a group of the same subject.
//! - `parent_lesson_id` references a lesson of the same subject and group;
//!   parent links form a forest per group.
//! - `order` is unique only within `(subject_id, group_id, parent_lesson_id)`.

use crate::model::lesson_group::LessonGroupId;
use crate::model::subject::SubjectId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable lesson identifier.
pub type LessonId = Uuid;

/// Publication state. Any state may be set directly; there is no enforced
/// transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl LessonStatus {
    pub const ALL: [LessonStatus; 3] = [Self::Draft, Self::Published, Self::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

/// Reader-facing difficulty label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// Raised when a persisted or user-supplied label is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for LessonStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownVariant {
                kind: "lesson status",
                value: value.to_string(),
            })
    }
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str() == value)
            .ok_or_else(|| UnknownVariant {
                kind: "difficulty",
                value: value.to_string(),
            })
    }
}

impl Display for LessonStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lesson row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    pub uid: String,
    pub subject_id: SubjectId,
    pub group_id: LessonGroupId,
    /// `None` means a root lesson of its group.
    pub parent_lesson_id: Option<LessonId>,
    pub title: String,
    pub description: String,
    pub lesson_slug: String,
    pub body_mdx: String,
    pub order: i64,
    pub difficulty: Difficulty,
    pub status: LessonStatus,
    /// RFC 3339 timestamp (UTC, millisecond precision) of the last write.
    pub updated_at: String,
    pub summary: Option<String>,
    pub created_at: i64,
}

impl Lesson {
    pub fn is_published(&self) -> bool {
        self.status == LessonStatus::Published
    }

    /// Site-relative route of this lesson under `subject_slug`.
    pub fn href(&self, subject_slug: &str) -> String {
        format!("/{subject_slug}/{}", self.lesson_slug)
    }
}

#[cfg(test)]
mod tests {
    use super::{Difficulty, LessonStatus};

    #[test]
    fn status_labels_round_trip_through_from_str() {
        for status in LessonStatus::ALL {
            assert_eq!(status.as_str().parse::<LessonStatus>().unwrap(), status);
        }
        assert_eq!(LessonStatus::default(), LessonStatus::Draft);
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        let err = "expert".parse::<Difficulty>().unwrap_err();
        assert_eq!(err.to_string(), "unknown difficulty `expert`");
    }

    #[test]
    fn status_serializes_as_lowercase_label() {
        let json = serde_json::to_string(&LessonStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
    }
}
