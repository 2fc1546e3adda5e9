//! Core domain logic for Lessonbook.
//! This crate is the single source of truth for catalog invariants.

pub mod content;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use content::{
    load_lesson_file, render_lesson, CompileCache, ContentError, LessonDocument, RenderedLesson,
    TocItem,
};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::lesson::{Difficulty, Lesson, LessonId, LessonStatus};
pub use model::lesson_group::{LessonGroup, LessonGroupId};
pub use model::subject::{Subject, SubjectId};
pub use repo::{RepoError, RepoResult, SqliteCatalogRepository};
pub use service::lesson_group_service::LessonGroupService;
pub use service::lesson_service::LessonService;
pub use service::sidebar::{SidebarGroup, SidebarNode, SidebarTree};
pub use service::subject_service::SubjectService;
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
