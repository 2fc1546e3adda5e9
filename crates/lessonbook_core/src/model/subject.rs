//! Subject record: the top-level content area (for example a course).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable subject identifier.
pub type SubjectId = Uuid;

/// One subject row.
///
/// `uid` and `slug` are unique across all subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub uid: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Display position; appended as `max + 1` on create.
    pub order: i64,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}
