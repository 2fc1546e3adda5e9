//! Markdown body compilation.
//!
//! # Responsibility
//! - Render a lesson body to HTML with tables, strikethrough, task lists,
//!   footnotes and `$`/`$$` math enabled.
//! - Give every heading an `id` and collect the table of contents.
//!
//! # Invariants
//! - Generated heading ids never repeat within one document.
//! - A trailing `[#id]` marker sets the id verbatim and never reaches the
//!   output. Authors own custom ids; they are not checked for collisions.

use super::headings::{split_custom_id, Slugger, TocItem};
use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;

/// Output of one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledLesson {
    pub html: String,
    pub toc: Vec<TocItem>,
}

struct PendingHeading<'a> {
    level: HeadingLevel,
    classes: Vec<CowStr<'a>>,
    attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    children: Vec<Event<'a>>,
}

/// Compiles a lesson body (frontmatter already removed).
pub fn compile_lesson_body(source: &str) -> CompiledLesson {
    let mut slugger = Slugger::new();
    let mut toc = Vec::new();
    let mut events = Vec::new();
    let mut pending: Option<PendingHeading<'_>> = None;

    for event in Parser::new_ext(source, markdown_options()) {
        match event {
            Event::Start(Tag::Heading {
                level,
                classes,
                attrs,
                ..
            }) => {
                pending = Some(PendingHeading {
                    level,
                    classes,
                    attrs,
                    children: Vec::new(),
                });
            }
            Event::End(TagEnd::Heading(level)) => {
                let Some(heading) = pending.take() else {
                    continue;
                };
                let (id, title, children) = resolve_heading(heading.children, &mut slugger);
                toc.push(TocItem {
                    title,
                    depth: heading_depth(heading.level),
                    url: format!("#{id}"),
                });
                events.push(Event::Start(Tag::Heading {
                    level: heading.level,
                    id: Some(CowStr::from(id)),
                    classes: heading.classes,
                    attrs: heading.attrs,
                }));
                events.extend(children);
                events.push(Event::End(TagEnd::Heading(level)));
            }
            other => match pending.as_mut() {
                Some(heading) => heading.children.push(other),
                None => events.push(other),
            },
        }
    }

    let mut html_output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut html_output, events.into_iter());
    CompiledLesson {
        html: html_output,
        toc,
    }
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_MATH
}

/// Returns `(id, plain title, rewritten children)` for one heading.
fn resolve_heading<'a>(
    children: Vec<Event<'a>>,
    slugger: &mut Slugger,
) -> (String, String, Vec<Event<'a>>) {
    let mut children = merge_adjacent_text(children);

    let mut custom_id = None;
    if let Some(Event::Text(last)) = children.last() {
        if let Some((rest, id)) = split_custom_id(last) {
            // Reserve the id so later generated slugs step around it.
            slugger.slug(id);
            custom_id = Some(id.to_string());

            let rest = rest.to_string();
            children.pop();
            if !rest.is_empty() {
                children.push(Event::Text(CowStr::from(rest)));
            }
        }
    }

    let title = plain_text(&children);
    let id = match custom_id {
        Some(id) => id,
        None => slugger.slug(&title),
    };
    (id, title, children)
}

// The parser may split one run of text at brackets or entities.
fn merge_adjacent_text(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut merged: Vec<Event<'_>> = Vec::with_capacity(events.len());
    for event in events {
        match (merged.last_mut(), event) {
            (Some(Event::Text(previous)), Event::Text(next)) => {
                let joined = format!("{previous}{next}");
                *previous = CowStr::from(joined);
            }
            (_, event) => merged.push(event),
        }
    }
    merged
}

fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(value)
            | Event::Code(value)
            | Event::InlineMath(value)
            | Event::DisplayMath(value) => text.push_str(value),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
