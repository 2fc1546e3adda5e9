//! Repository layer contracts and the SQLite catalog implementation.
//!
//! # Responsibility
//! - Define per-table data access contracts for subjects, lesson groups,
//!   and lessons.
//! - Keep SQL details away from hierarchy rules in `service`.
//!
//! # Invariants
//! - Repositories never enforce uniqueness or hierarchy rules themselves;
//!   they report what is stored.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;

pub mod lesson_group_repo;
pub mod lesson_repo;
mod sqlite;
pub mod subject_repo;

pub use lesson_group_repo::{LessonGroupRepository, NewLessonGroup};
pub use lesson_repo::{LessonRepository, NewLesson};
pub use sqlite::SqliteCatalogRepository;
pub use subject_repo::{NewSubject, SubjectRepository};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    #[error(transparent)]
    Db(#[from] DbError),
    /// Connection schema is not at the expected migrated version.
    #[error("catalog repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    #[error("catalog repository requires table `{0}`")]
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    #[error("invalid catalog data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Runs a unit of work as one atomic transaction.
///
/// Reads inside `work` observe a consistent snapshot; an `Err` from `work`
/// rolls back every write it made.
pub trait Transactional {
    fn atomically<T, E>(&self, work: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>;
}

/// Every table contract in one bound, as used by the services.
pub trait CatalogRepository:
    SubjectRepository + LessonGroupRepository + LessonRepository + Transactional
{
}

impl<T> CatalogRepository for T where
    T: SubjectRepository + LessonGroupRepository + LessonRepository + Transactional
{
}
