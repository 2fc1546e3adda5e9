//! Lesson file frontmatter.

use super::ContentError;
use crate::model::lesson::{Difficulty, LessonStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Validated metadata block of a lesson file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonFrontmatter {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub lesson_slug: String,
    pub order: f64,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub status: LessonStatus,
    /// Kept as written once it parses as an ISO-8601 date or date-time.
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Splits `input` into its leading `---` YAML block and the remaining body.
///
/// The block closes on a `---` or `...` line. Returns `None` when the input
/// does not open with a delimiter or the block never closes.
pub fn split_frontmatter(input: &str) -> Option<(&str, &str)> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines = input.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if matches!(line.trim_end(), "---" | "...") {
            return Some((&input[yaml_start..offset], &input[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parses and validates a YAML frontmatter block read from `path`.
pub fn parse_frontmatter(yaml: &str, path: &Path) -> Result<LessonFrontmatter, ContentError> {
    let value: Value =
        serde_yaml::from_str(yaml).map_err(|source| ContentError::FrontmatterSyntax {
            path: path.to_path_buf(),
            source,
        })?;
    let empty = Mapping::new();
    let fields = match &value {
        Value::Mapping(fields) => fields,
        Value::Null => &empty,
        _ => {
            return Err(ContentError::FrontmatterNotMapping {
                path: path.to_path_buf(),
            })
        }
    };
    let invalid = |field: &'static str, expected: &str| ContentError::InvalidFrontmatter {
        path: path.to_path_buf(),
        field,
        expected: expected.to_string(),
    };
    let required_string = |field: &'static str| -> Result<String, ContentError> {
        non_empty_string(fields.get(field))
            .ok_or_else(|| invalid(field, "a non-empty string"))
    };

    let title = required_string("title")?;
    let description = required_string("description")?;
    let subject = required_string("subject")?;
    let lesson_slug = required_string("lessonSlug")?;

    let updated_at = non_empty_string(fields.get("updatedAt"))
        .filter(|value| is_iso_date(value))
        .ok_or_else(|| invalid("updatedAt", "a valid ISO date"))?;

    let order = fields
        .get("order")
        .and_then(Value::as_f64)
        .filter(|order| !order.is_nan())
        .ok_or_else(|| invalid("order", "a number"))?;

    let difficulty = fields
        .get("difficulty")
        .and_then(Value::as_str)
        .and_then(|value| value.parse::<Difficulty>().ok())
        .ok_or_else(|| invalid("difficulty", &one_of(&Difficulty::ALL)))?;

    let status = fields
        .get("status")
        .and_then(Value::as_str)
        .and_then(|value| value.parse::<LessonStatus>().ok())
        .ok_or_else(|| invalid("status", &one_of(&LessonStatus::ALL)))?;

    let tags = fields
        .get("tags")
        .and_then(Value::as_sequence)
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| invalid("tags", "a string list"))?;

    let estimated_minutes = fields
        .get("estimatedMinutes")
        .and_then(Value::as_f64)
        .filter(|minutes| minutes.is_finite());
    let summary = non_empty_string(fields.get("summary"));

    Ok(LessonFrontmatter {
        title,
        description,
        subject,
        lesson_slug,
        order,
        difficulty,
        tags,
        status,
        updated_at,
        estimated_minutes,
        summary,
    })
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

fn is_iso_date(value: &str) -> bool {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn one_of<T: std::fmt::Display>(values: &[T]) -> String {
    let names: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("one of {}", names.join(", "))
}
