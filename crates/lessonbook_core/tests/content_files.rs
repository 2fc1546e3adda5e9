use lessonbook_core::content::{canonical_url, ContentError};
use lessonbook_core::{load_lesson_file, CompileCache, Difficulty, LessonStatus};
use std::fs;

const LESSON: &str = "---
title: Domain of a function
description: Where a function is defined
subject: math
lessonSlug: domain
order: 1
difficulty: beginner
tags:
  - functions
status: published
updatedAt: 2025-01-15T08:30:00Z
estimatedMinutes: 12
---
# Domain [#domain]

The domain of $f(x) = \\sqrt{x}$ is $x \\ge 0$.

## Examples

## Examples
";

#[test]
fn lesson_file_compiles_with_frontmatter_and_toc() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("domain.mdx");
    fs::write(&path, LESSON).unwrap();

    let cache = CompileCache::new();
    let document = load_lesson_file(&path, &cache).unwrap();

    assert_eq!(document.frontmatter.title, "Domain of a function");
    assert_eq!(document.frontmatter.difficulty, Difficulty::Beginner);
    assert_eq!(document.frontmatter.status, LessonStatus::Published);
    assert_eq!(document.frontmatter.estimated_minutes, Some(12.0));
    assert_eq!(document.canonical_url, "/math/domain");
    assert_eq!(document.source_path, path);

    let urls: Vec<_> = document.toc.iter().map(|item| item.url.as_str()).collect();
    assert_eq!(urls, ["#domain", "#examples", "#examples-1"]);
    assert!(document.html.contains(r#"<h1 id="domain">Domain</h1>"#));
    assert!(document.html.contains("math-inline"));
    assert!(!document.html.contains("title: Domain"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn reloading_unchanged_file_hits_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("domain.mdx");
    fs::write(&path, LESSON).unwrap();
    let cache = CompileCache::new();

    let first = load_lesson_file(&path, &cache).unwrap();
    let second = load_lesson_file(&path, &cache).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);

    fs::write(&path, LESSON.replace("## Examples\n\n## Examples", "## Examples")).unwrap();
    let edited = load_lesson_file(&path, &cache).unwrap();
    assert_eq!(edited.toc.len(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn file_without_frontmatter_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.mdx");
    fs::write(&path, "# Just a heading\n").unwrap();

    let error = load_lesson_file(&path, &CompileCache::new()).unwrap_err();
    assert!(matches!(error, ContentError::MissingFrontmatter { .. }));
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = load_lesson_file(&dir.path().join("absent.mdx"), &CompileCache::new())
        .unwrap_err();
    assert!(matches!(error, ContentError::Io { .. }));
}

#[test]
fn invalid_order_names_field_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("domain.mdx");
    fs::write(&path, LESSON.replace("order: 1", "order: first")).unwrap();

    let error = load_lesson_file(&path, &CompileCache::new()).unwrap_err();
    assert_eq!(
        error.to_string(),
        format!("Frontmatter \"order\" must be a number: {}", path.display())
    );
}

#[test]
fn canonical_url_joins_subject_and_lesson() {
    assert_eq!(canonical_url("math", "domain"), "/math/domain");
}
