//! Sidebar tree assembly.
//!
//! Turns a subject's groups and its visible lessons into the nested view
//! model rendered by navigation: one entry per group, each carrying its
//! root lessons with nested children.
//!
//! # Invariants
//! - Siblings are sorted by `(order ascending, title)`.
//! - A child whose parent sits in another group fails the whole build.
//! - A lesson whose parent is not in the visible set is omitted together
//!   with its subtree.
//! - `items` is absent (not empty) on leaf nodes.

use super::{ServiceError, ServiceResult};
use crate::model::lesson::{Lesson, LessonId, LessonStatus};
use crate::model::lesson_group::{LessonGroup, LessonGroupId};
use crate::model::subject::Subject;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Navigation tree for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarTree {
    pub groups: Vec<SidebarGroup>,
}

/// One group with its root-level lesson trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarGroup {
    #[serde(flatten)]
    pub group: LessonGroup,
    pub items: Vec<SidebarNode>,
}

/// One lesson entry in the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarNode {
    pub id: LessonId,
    pub uid: String,
    pub title: String,
    pub lesson_slug: String,
    /// `/{subjectSlug}/{lessonSlug}`.
    pub href: String,
    pub status: LessonStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<SidebarNode>>,
}

impl SidebarTree {
    /// Depth-first iterator over every lesson node in the tree.
    pub fn nodes(&self) -> impl Iterator<Item = &SidebarNode> {
        let mut stack: Vec<&SidebarNode> = self
            .groups
            .iter()
            .rev()
            .flat_map(|group| group.items.iter().rev())
            .collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Some(children) = node.items.as_ref() {
                stack.extend(children.iter().rev());
            }
            Some(node)
        })
    }
}

/// Builds the sidebar tree from already-filtered rows.
///
/// `groups` must be in display order. A lesson listed more than once is
/// kept once (first occurrence).
pub fn build_sidebar_tree(
    subject: &Subject,
    groups: Vec<LessonGroup>,
    lessons: Vec<Lesson>,
) -> ServiceResult<SidebarTree> {
    let mut seen = HashSet::new();
    let lessons: Vec<Lesson> = lessons
        .into_iter()
        .filter(|lesson| seen.insert(lesson.id))
        .collect();
    let by_id: HashMap<LessonId, &Lesson> =
        lessons.iter().map(|lesson| (lesson.id, lesson)).collect();

    let mut children: HashMap<LessonId, Vec<&Lesson>> = HashMap::new();
    let mut roots: HashMap<LessonGroupId, Vec<&Lesson>> = HashMap::new();
    for lesson in &lessons {
        match lesson.parent_lesson_id {
            Some(parent_id) => {
                let Some(parent) = by_id.get(&parent_id) else {
                    continue;
                };
                if parent.group_id != lesson.group_id {
                    return Err(ServiceError::ParentInDifferentGroup(lesson.id));
                }
                children.entry(parent_id).or_default().push(lesson);
            }
            None => roots.entry(lesson.group_id).or_default().push(lesson),
        }
    }

    for bucket in children.values_mut().chain(roots.values_mut()) {
        bucket.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.title.cmp(&b.title)));
    }

    let groups = groups
        .into_iter()
        .map(|group| {
            let items = roots
                .get(&group.id)
                .map(|bucket| {
                    bucket
                        .iter()
                        .map(|lesson| build_node(lesson, &children, &subject.slug))
                        .collect()
                })
                .unwrap_or_default();
            SidebarGroup { group, items }
        })
        .collect();

    Ok(SidebarTree { groups })
}

fn build_node(
    lesson: &Lesson,
    children: &HashMap<LessonId, Vec<&Lesson>>,
    subject_slug: &str,
) -> SidebarNode {
    let nested: Vec<SidebarNode> = children
        .get(&lesson.id)
        .map(|bucket| {
            bucket
                .iter()
                .map(|child| build_node(child, children, subject_slug))
                .collect()
        })
        .unwrap_or_default();

    SidebarNode {
        id: lesson.id,
        uid: lesson.uid.clone(),
        title: lesson.title.clone(),
        lesson_slug: lesson.lesson_slug.clone(),
        href: lesson.href(subject_slug),
        status: lesson.status,
        items: (!nested.is_empty()).then_some(nested),
    }
}

#[cfg(test)]
mod tests {
    use super::build_sidebar_tree;
    use crate::model::lesson::{Difficulty, Lesson, LessonId, LessonStatus};
    use crate::model::lesson_group::{LessonGroup, LessonGroupId};
    use crate::model::subject::Subject;
    use crate::service::ServiceError;
    use uuid::Uuid;

    fn subject() -> Subject {
        Subject {
            id: Uuid::new_v4(),
            uid: "math".to_string(),
            name: "Math".to_string(),
            slug: "math".to_string(),
            description: None,
            order: 0,
            created_at: 0,
        }
    }

    fn group(subject: &Subject, slug: &str, order: i64) -> LessonGroup {
        LessonGroup {
            id: Uuid::new_v4(),
            uid: slug.to_string(),
            subject_id: subject.id,
            title: slug.to_string(),
            slug: slug.to_string(),
            order,
            is_default: order == 0,
            created_at: 0,
        }
    }

    fn lesson(
        group_id: LessonGroupId,
        parent: Option<LessonId>,
        title: &str,
        order: i64,
    ) -> Lesson {
        Lesson {
            id: Uuid::new_v4(),
            uid: title.to_lowercase(),
            subject_id: Uuid::nil(),
            group_id,
            parent_lesson_id: parent,
            title: title.to_string(),
            description: "d".to_string(),
            lesson_slug: title.to_lowercase(),
            body_mdx: "# body".to_string(),
            order,
            difficulty: Difficulty::Beginner,
            status: LessonStatus::Published,
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
            summary: None,
            created_at: 0,
        }
    }

    #[test]
    fn siblings_sort_by_order_then_title() {
        let subject = subject();
        let g = group(&subject, "lessons", 0);
        let b = lesson(g.id, None, "Beta", 1);
        let a = lesson(g.id, None, "Alpha", 1);
        let first = lesson(g.id, None, "Zeta", 0);

        let tree = build_sidebar_tree(&subject, vec![g], vec![b, a, first]).unwrap();
        let titles: Vec<&str> = tree.groups[0]
            .items
            .iter()
            .map(|node| node.title.as_str())
            .collect();
        assert_eq!(titles, ["Zeta", "Alpha", "Beta"]);
    }

    #[test]
    fn leaves_omit_items_and_parents_nest_children() {
        let subject = subject();
        let g = group(&subject, "lessons", 0);
        let root = lesson(g.id, None, "Root", 0);
        let child = lesson(g.id, Some(root.id), "Child", 0);

        let tree = build_sidebar_tree(&subject, vec![g], vec![child.clone(), root]).unwrap();
        let root_node = &tree.groups[0].items[0];
        let nested = root_node.items.as_ref().unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].id, child.id);
        assert_eq!(nested[0].href, "/math/child");
        assert!(nested[0].items.is_none());

        let json = serde_json::to_value(&tree).unwrap();
        assert!(json["groups"][0]["items"][0]["items"][0].get("items").is_none());
        assert_eq!(json["groups"][0]["slug"], "lessons");
        assert_eq!(json["groups"][0]["items"][0]["lessonSlug"], "root");
    }

    #[test]
    fn parent_in_other_group_fails() {
        let subject = subject();
        let g1 = group(&subject, "one", 0);
        let g2 = group(&subject, "two", 1);
        let parent = lesson(g1.id, None, "Parent", 0);
        let stray = lesson(g2.id, Some(parent.id), "Stray", 0);
        let stray_id = stray.id;

        let err = build_sidebar_tree(&subject, vec![g1, g2], vec![parent, stray]).unwrap_err();
        assert!(matches!(err, ServiceError::ParentInDifferentGroup(id) if id == stray_id));
    }

    #[test]
    fn child_of_hidden_parent_is_dropped() {
        let subject = subject();
        let g = group(&subject, "lessons", 0);
        let hidden_parent = Uuid::new_v4();
        let orphan = lesson(g.id, Some(hidden_parent), "Orphan", 0);

        let tree = build_sidebar_tree(&subject, vec![g], vec![orphan]).unwrap();
        assert!(tree.groups[0].items.is_empty());
        assert_eq!(tree.nodes().count(), 0);
    }

    #[test]
    fn duplicate_rows_are_kept_once() {
        let subject = subject();
        let g = group(&subject, "lessons", 0);
        let only = lesson(g.id, None, "Only", 0);

        let tree = build_sidebar_tree(&subject, vec![g], vec![only.clone(), only]).unwrap();
        assert_eq!(tree.groups[0].items.len(), 1);
    }

    #[test]
    fn groups_without_lessons_are_still_listed() {
        let subject = subject();
        let first = group(&subject, "first", 0);
        let second = group(&subject, "second", 1);
        let tree = build_sidebar_tree(&subject, vec![first, second], Vec::new()).unwrap();
        assert_eq!(tree.groups.len(), 2);
        assert!(tree.groups.iter().all(|group| group.items.is_empty()));
    }
}
