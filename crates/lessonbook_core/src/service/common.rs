use super::{ServiceError, ServiceResult};
use chrono::{SecondsFormat, Utc};

/// Trims `value` and rejects it when nothing is left.
pub fn normalize_required(value: &str, field: &'static str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidField { field });
    }
    Ok(trimmed.to_string())
}

/// Trims optional free text; `None` stays `None`.
pub(crate) fn trim_optional(value: Option<&str>) -> Option<String> {
    value.map(|text| text.trim().to_string())
}

/// Current UTC time as RFC 3339 with millisecond precision.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
