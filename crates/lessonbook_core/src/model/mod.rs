//! Catalog domain model: subjects, lesson groups, and lessons.
//!
//! # Invariants
//! - Every record is identified by a stable UUID assigned at insert time.
//! - `order` is server-assigned and only meaningful within its scope.

pub mod lesson;
pub mod lesson_group;
pub mod subject;
