//! Function-name routing to catalog services.

use crate::args::{
    CreateLessonArgs, CreateLessonGroupArgs, CreateSubjectArgs, LessonIdArgs, MoveLessonArgs,
    NoArgs, ReorderLessonGroupsArgs, RouteArgs, SetLessonStatusArgs, SidebarArgs, SlugArgs,
    SubjectIdArgs, UpdateLessonArgs, UpdateLessonGroupArgs, UpdateSubjectArgs,
};
use lessonbook_core::content::{render_lesson, CompileCache};
use lessonbook_core::service::lesson_group_service::{CreateLessonGroup, LessonGroupPatch};
use lessonbook_core::service::lesson_service::{CreateLesson, LessonMove, LessonPatch};
use lessonbook_core::service::subject_service::{CreateSubject, SubjectPatch};
use lessonbook_core::{
    DbError, LessonGroupService, LessonService, RepoError, ServiceError, SqliteCatalogRepository,
    SubjectService,
};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Every function name accepted by [`crate::call`].
pub const FUNCTION_NAMES: [&str; 18] = [
    "subjects:list",
    "subjects:getBySlug",
    "subjects:create",
    "subjects:update",
    "lessonGroups:listBySubject",
    "lessonGroups:create",
    "lessonGroups:update",
    "lessonGroups:reorder",
    "lessonGroups:ensureDefaultForSubject",
    "lessons:getByRoute",
    "lessons:getSidebarTree",
    "lessons:create",
    "lessons:update",
    "lessons:setStatus",
    "lessons:move",
    "lessons:remove",
    "lessons:removeSubtree",
    "lessons:renderByRoute",
];

static RENDER_CACHE: OnceLock<CompileCache> = OnceLock::new();

/// Failure of one call, before or inside its handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("arguments are not valid JSON: {0}")]
    MalformedJson(serde_json::Error),
    #[error("invalid arguments: {0}")]
    InvalidArgs(serde_json::Error),
    #[error("failed to encode result: {0}")]
    Encode(serde_json::Error),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    /// Stable, content-free label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownFunction(_) => "unknown_function",
            Self::MalformedJson(_) => "malformed_json",
            Self::InvalidArgs(_) => "invalid_args",
            Self::Encode(_) => "encode",
            Self::Db(_) => "db",
            Self::Repo(_) => "repo",
            Self::Service(_) => "service",
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub(crate) fn dispatch(conn: &Connection, function: &str, args: Value) -> ApiResult<Value> {
    match function {
        "subjects:list" => {
            parse::<NoArgs>(args)?;
            encode(subjects(conn)?.list()?)
        }
        "subjects:getBySlug" => {
            let args: SlugArgs = parse(args)?;
            encode(subjects(conn)?.get_by_slug(&args.slug)?)
        }
        "subjects:create" => {
            let args: CreateSubjectArgs = parse(args)?;
            encode(subjects(conn)?.create(CreateSubject {
                uid: args.uid,
                name: args.name,
                slug: args.slug,
                description: args.description,
            })?)
        }
        "subjects:update" => {
            let args: UpdateSubjectArgs = parse(args)?;
            encode(subjects(conn)?.update(
                args.subject_id,
                SubjectPatch {
                    uid: args.uid,
                    name: args.name,
                    slug: args.slug,
                    description: args.description,
                },
            )?)
        }
        "lessonGroups:listBySubject" => {
            let args: SubjectIdArgs = parse(args)?;
            encode(groups(conn)?.list_by_subject(args.subject_id)?)
        }
        "lessonGroups:create" => {
            let args: CreateLessonGroupArgs = parse(args)?;
            encode(groups(conn)?.create(CreateLessonGroup {
                uid: args.uid,
                subject_id: args.subject_id,
                title: args.title,
                slug: args.slug,
                is_default: args.is_default.unwrap_or(false),
            })?)
        }
        "lessonGroups:update" => {
            let args: UpdateLessonGroupArgs = parse(args)?;
            encode(groups(conn)?.update(
                args.group_id,
                LessonGroupPatch {
                    uid: args.uid,
                    title: args.title,
                    slug: args.slug,
                    is_default: args.is_default,
                },
            )?)
        }
        "lessonGroups:reorder" => {
            let args: ReorderLessonGroupsArgs = parse(args)?;
            groups(conn)?.reorder(args.subject_id, &args.ordered_group_ids)?;
            Ok(Value::Null)
        }
        "lessonGroups:ensureDefaultForSubject" => {
            let args: SubjectIdArgs = parse(args)?;
            encode(groups(conn)?.ensure_default_for_subject(args.subject_id)?)
        }
        "lessons:getByRoute" => {
            let args: RouteArgs = parse(args)?;
            encode(lessons(conn)?.get_by_route(
                &args.subject_slug,
                &args.lesson_slug,
                args.include_drafts.unwrap_or(false),
            )?)
        }
        "lessons:getSidebarTree" => {
            let args: SidebarArgs = parse(args)?;
            encode(
                lessons(conn)?
                    .get_sidebar_tree(args.subject_id, args.include_drafts.unwrap_or(false))?,
            )
        }
        "lessons:create" => {
            let args: CreateLessonArgs = parse(args)?;
            encode(lessons(conn)?.create(CreateLesson {
                uid: args.uid,
                subject_id: args.subject_id,
                group_id: args.group_id,
                parent_lesson_id: args.parent_lesson_id,
                title: args.title,
                description: args.description,
                lesson_slug: args.lesson_slug,
                body_mdx: args.body_mdx,
                difficulty: args.difficulty,
                status: args.status,
                summary: args.summary,
            })?)
        }
        "lessons:update" => {
            let args: UpdateLessonArgs = parse(args)?;
            encode(lessons(conn)?.update(
                args.lesson_id,
                LessonPatch {
                    uid: args.uid,
                    title: args.title,
                    description: args.description,
                    lesson_slug: args.lesson_slug,
                    body_mdx: args.body_mdx,
                    difficulty: args.difficulty,
                    summary: args.summary,
                },
            )?)
        }
        "lessons:setStatus" => {
            let args: SetLessonStatusArgs = parse(args)?;
            encode(lessons(conn)?.set_status(args.lesson_id, args.status)?)
        }
        "lessons:move" => {
            let args: MoveLessonArgs = parse(args)?;
            encode(lessons(conn)?.move_lesson(
                args.lesson_id,
                LessonMove {
                    group_id: args.group_id,
                    parent_lesson_id: args.parent_lesson_id,
                },
            )?)
        }
        "lessons:remove" => {
            let args: LessonIdArgs = parse(args)?;
            encode(lessons(conn)?.remove(args.lesson_id)?)
        }
        "lessons:removeSubtree" => {
            let args: LessonIdArgs = parse(args)?;
            encode(lessons(conn)?.remove_subtree(args.lesson_id)?)
        }
        "lessons:renderByRoute" => {
            let args: RouteArgs = parse(args)?;
            let route = lessons(conn)?.get_by_route(
                &args.subject_slug,
                &args.lesson_slug,
                args.include_drafts.unwrap_or(false),
            )?;
            let Some(route) = route else {
                return Ok(Value::Null);
            };
            let cache = RENDER_CACHE.get_or_init(CompileCache::new);
            encode(render_lesson(&route.subject, &route.lesson, cache))
        }
        other => Err(ApiError::UnknownFunction(other.to_string())),
    }
}

fn parse<T: DeserializeOwned>(args: Value) -> ApiResult<T> {
    serde_json::from_value(args).map_err(ApiError::InvalidArgs)
}

fn encode<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(ApiError::Encode)
}

fn subjects(conn: &Connection) -> ApiResult<SubjectService<SqliteCatalogRepository<'_>>> {
    Ok(SubjectService::new(SqliteCatalogRepository::try_new(conn)?))
}

fn groups(conn: &Connection) -> ApiResult<LessonGroupService<SqliteCatalogRepository<'_>>> {
    Ok(LessonGroupService::new(SqliteCatalogRepository::try_new(conn)?))
}

fn lessons(conn: &Connection) -> ApiResult<LessonService<SqliteCatalogRepository<'_>>> {
    Ok(LessonService::new(SqliteCatalogRepository::try_new(conn)?))
}
