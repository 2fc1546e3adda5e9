//! Remotely-callable function surface over the lesson catalog.
//!
//! # Responsibility
//! - Address every catalog operation by a stable function name such as
//!   `lessons:getSidebarTree`.
//! - Validate JSON arguments against a declared schema before any handler
//!   runs.
//!
//! # Invariants
//! - Calls never panic; every outcome is a [`CallResponse`].
//! - One call is one transaction; a failed call writes nothing.

mod args;
mod dispatch;

use lessonbook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_db,
    ping as ping_inner,
};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use dispatch::{ApiError, FUNCTION_NAMES};

const DEFAULT_DB_FILE_NAME: &str = "lessonbook.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Stable response envelope for [`call`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Function result; absent on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Human-readable outcome for diagnostics.
    pub message: String,
}

impl CallResponse {
    fn success(function: &str, value: Value) -> Self {
        Self {
            ok: true,
            value: Some(value),
            message: format!("{function} succeeded."),
        }
    }

    fn failure(function: &str, err: &ApiError) -> Self {
        Self {
            ok: false,
            value: None,
            message: format!("{function} failed: {err}"),
        }
    }
}

pub fn ping() -> String {
    ping_inner().to_owned()
}

pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Starts core file logging. Returns an empty string on success and the
/// error message otherwise.
pub fn init_logging(level: &str, log_dir: &str) -> String {
    match init_logging_inner(level, log_dir) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the database file used by [`call`] for the rest of the process.
///
/// Returns `false` when a different path was already pinned.
pub fn configure_db_path(path: impl Into<PathBuf>) -> bool {
    let path = path.into();
    let active = DB_PATH.get_or_init(|| path.clone());
    active == &path
}

/// Database file used by [`call`].
///
/// Falls back to `LESSONBOOK_DB`, then to a file in the temp directory.
pub fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("LESSONBOOK_DB") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
        })
        .clone()
}

/// Invokes `function` with JSON `args` against the configured database.
///
/// Blank `args` mean `{}`.
pub fn call(function: &str, args: &str) -> CallResponse {
    call_at(&resolve_db_path(), function, args)
}

/// Like [`call`], against the database file at `db_path`.
pub fn call_at(db_path: &Path, function: &str, args: &str) -> CallResponse {
    match open_db(db_path) {
        Ok(conn) => call_with_connection(&conn, function, args),
        Err(err) => CallResponse::failure(function, &ApiError::from(err)),
    }
}

/// Like [`call`], on an already-open, migrated connection.
pub fn call_with_connection(conn: &Connection, function: &str, args: &str) -> CallResponse {
    let outcome = parse_args(args).and_then(|args| dispatch::dispatch(conn, function, args));
    match outcome {
        Ok(value) => {
            info!("event=api_call module=api status=ok function={function}");
            CallResponse::success(function, value)
        }
        Err(err) => {
            warn!("event=api_call module=api status=error function={function} error_kind={}", err.kind());
            CallResponse::failure(function, &err)
        }
    }
}

fn parse_args(raw: &str) -> Result<Value, ApiError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw).map_err(ApiError::MalformedJson)
}

#[cfg(test)]
mod tests {
    use super::{call_with_connection, core_version, init_logging, ping};
    use lessonbook_core::open_db_in_memory;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info", "").is_empty());
        assert!(!init_logging("verbose", "/tmp/lessonbook-logs").is_empty());
    }

    #[test]
    fn unknown_function_fails_without_panicking() {
        let conn = open_db_in_memory().expect("open db");
        let response = call_with_connection(&conn, "lessons:explode", "{}");
        assert!(!response.ok);
        assert!(response.value.is_none());
        assert!(response.message.contains("unknown function `lessons:explode`"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let conn = open_db_in_memory().expect("open db");
        let response = call_with_connection(&conn, "subjects:list", "{not json");
        assert!(!response.ok);
        assert!(response.message.starts_with("subjects:list failed:"));
    }

    #[test]
    fn blank_args_mean_empty_object() {
        let conn = open_db_in_memory().expect("open db");
        let response = call_with_connection(&conn, "subjects:list", "  ");
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.value, Some(serde_json::json!([])));
    }
}
