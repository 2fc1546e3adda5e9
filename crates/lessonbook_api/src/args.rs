//! Declared argument schemas, one per callable function.
//!
//! Field names are camelCase and unknown fields are rejected, so malformed
//! calls fail before any handler runs.

use lessonbook_core::{Difficulty, LessonGroupId, LessonId, LessonStatus, SubjectId};
use serde::{Deserialize, Deserializer};

/// Distinguishes an omitted field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NoArgs {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct SlugArgs {
    pub slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct SubjectIdArgs {
    pub subject_id: SubjectId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CreateSubjectArgs {
    pub uid: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct UpdateSubjectArgs {
    pub subject_id: SubjectId,
    pub uid: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CreateLessonGroupArgs {
    pub uid: String,
    pub subject_id: SubjectId,
    pub title: String,
    pub slug: String,
    pub is_default: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct UpdateLessonGroupArgs {
    pub group_id: LessonGroupId,
    pub uid: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ReorderLessonGroupsArgs {
    pub subject_id: SubjectId,
    pub ordered_group_ids: Vec<LessonGroupId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct RouteArgs {
    pub subject_slug: String,
    pub lesson_slug: String,
    pub include_drafts: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct SidebarArgs {
    pub subject_id: SubjectId,
    pub include_drafts: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CreateLessonArgs {
    pub uid: String,
    pub subject_id: SubjectId,
    pub group_id: Option<LessonGroupId>,
    #[serde(default)]
    pub parent_lesson_id: Option<LessonId>,
    pub title: String,
    pub description: String,
    pub lesson_slug: String,
    pub body_mdx: String,
    pub difficulty: Difficulty,
    pub status: Option<LessonStatus>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct UpdateLessonArgs {
    pub lesson_id: LessonId,
    pub uid: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub lesson_slug: Option<String>,
    pub body_mdx: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "double_option")]
    pub summary: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct SetLessonStatusArgs {
    pub lesson_id: LessonId,
    pub status: LessonStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct MoveLessonArgs {
    pub lesson_id: LessonId,
    pub group_id: Option<LessonGroupId>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_lesson_id: Option<Option<LessonId>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct LessonIdArgs {
    pub lesson_id: LessonId,
}

#[cfg(test)]
mod tests {
    use super::{MoveLessonArgs, UpdateSubjectArgs};
    use serde_json::json;

    #[test]
    fn omitted_and_null_parent_are_distinct() {
        let lesson_id = uuid::Uuid::new_v4();
        let omitted: MoveLessonArgs =
            serde_json::from_value(json!({ "lessonId": lesson_id })).expect("omitted");
        assert_eq!(omitted.parent_lesson_id, None);

        let cleared: MoveLessonArgs =
            serde_json::from_value(json!({ "lessonId": lesson_id, "parentLessonId": null }))
                .expect("null");
        assert_eq!(cleared.parent_lesson_id, Some(None));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = serde_json::from_value::<UpdateSubjectArgs>(json!({
            "subjectId": uuid::Uuid::new_v4(),
            "colour": "red",
        }))
        .expect_err("unknown field");
        assert!(error.to_string().contains("colour"));
    }
}
