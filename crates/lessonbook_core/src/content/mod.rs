//! Lesson content compilation.
//!
//! # Responsibility
//! - Parse lesson file frontmatter and compile markdown bodies to HTML plus
//!   a heading table of contents.
//! - Memoize compilations by content hash through [`CompileCache`].
//!
//! # Invariants
//! - Content never touches the catalog database; stored lessons are
//!   rendered from records the caller already loaded.

mod cache;
mod compile;
mod frontmatter;
mod headings;

pub use cache::CompileCache;
pub use compile::{compile_lesson_body, CompiledLesson};
pub use frontmatter::{parse_frontmatter, split_frontmatter, LessonFrontmatter};
pub use headings::{slugify, split_custom_id, Slugger, TocItem};

use crate::model::lesson::Lesson;
use crate::model::subject::Subject;
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read lesson file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Lesson file has no frontmatter block: {}", path.display())]
    MissingFrontmatter { path: PathBuf },
    #[error("Frontmatter is not valid YAML: {}: {source}", path.display())]
    FrontmatterSyntax {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Frontmatter must be a mapping: {}", path.display())]
    FrontmatterNotMapping { path: PathBuf },
    #[error("Frontmatter \"{field}\" must be {expected}: {}", path.display())]
    InvalidFrontmatter {
        path: PathBuf,
        field: &'static str,
        expected: String,
    },
}

/// A lesson file compiled for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDocument {
    pub frontmatter: LessonFrontmatter,
    pub html: String,
    pub toc: Vec<TocItem>,
    /// `/<subject>/<lessonSlug>`.
    pub canonical_url: String,
    pub source_path: PathBuf,
}

/// A stored lesson compiled for its public route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedLesson {
    pub html: String,
    pub toc: Vec<TocItem>,
    pub canonical_url: String,
}

/// Reads, validates and compiles one lesson file.
pub fn load_lesson_file(path: &Path, cache: &CompileCache) -> Result<LessonDocument, ContentError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (yaml, body) = split_frontmatter(&raw).ok_or_else(|| ContentError::MissingFrontmatter {
        path: path.to_path_buf(),
    })?;
    let frontmatter = parse_frontmatter(yaml, path)?;
    let compiled = cache.get_or_compile(body);

    info!(
        "event=lesson_file_load module=content status=ok headings={}",
        compiled.toc.len()
    );
    Ok(LessonDocument {
        canonical_url: canonical_url(&frontmatter.subject, &frontmatter.lesson_slug),
        html: compiled.html.clone(),
        toc: compiled.toc.clone(),
        frontmatter,
        source_path: path.to_path_buf(),
    })
}

/// Compiles a stored lesson's `body_mdx`.
pub fn render_lesson(
    subject: &Subject,
    lesson: &Lesson,
    cache: &CompileCache,
) -> RenderedLesson {
    let compiled = cache.get_or_compile(&lesson.body_mdx);
    RenderedLesson {
        html: compiled.html.clone(),
        toc: compiled.toc.clone(),
        canonical_url: lesson.href(&subject.slug),
    }
}

pub fn canonical_url(subject_slug: &str, lesson_slug: &str) -> String {
    format!("/{subject_slug}/{lesson_slug}")
}
