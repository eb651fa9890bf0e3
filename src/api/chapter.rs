use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::database;
use crate::database::chapter::{ChapterChanges, LatestChapterRecord, NewChapter};
use crate::error::ApiError;
use crate::models::Chapter;
use crate::AppState;

use super::common;

const MAX_TITLE_BYTES: usize = 256;
const MAX_CONTENT_BYTES: usize = 1 << 20;

fn validate_new_chapter(new: &NewChapter) -> Result<(), ApiError> {
    common::require_non_empty(&new.title, "title")?;
    common::check_max_bytes(&new.title, MAX_TITLE_BYTES, "title")?;
    common::require_non_empty(&new.content, "content")?;
    common::check_max_bytes(&new.content, MAX_CONTENT_BYTES, "content")?;
    Ok(())
}

fn validate_changes(changes: &ChapterChanges) -> Result<(), ApiError> {
    if let Some(title) = &changes.title {
        common::require_non_empty(title, "title")?;
        common::check_max_bytes(title, MAX_TITLE_BYTES, "title")?;
    }
    if let Some(content) = &changes.content {
        common::require_non_empty(content, "content")?;
        common::check_max_bytes(content, MAX_CONTENT_BYTES, "content")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct LatestChapterResponse {
    #[serde(flatten)]
    chapter: Chapter,
    novel_title: String,
    translator_name: Option<String>,
}

fn convert_latest_records_to_response(
    records: Vec<LatestChapterRecord>,
) -> Vec<LatestChapterResponse> {
    records
        .into_iter()
        .map(
            |LatestChapterRecord {
                 chapter,
                 novel_title,
                 translator_name,
             }| LatestChapterResponse {
                chapter,
                novel_title,
                translator_name,
            },
        )
        .collect()
}

#[get("/chapters/latest")]
async fn latest_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<common::PageQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let (offset, limit) = common::page_bounds(query.page, query.limit);
    let result = common::with_connection(&state, move |connection| {
        database::chapter::list_latest_chapters(connection, offset, limit)
    })
    .await
    .map(convert_latest_records_to_response);
    common::respond(&req, result)
}

#[get("/novels/{novel_id}/chapters")]
async fn list_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    query: web::Query<common::PageQuery>,
) -> HttpResponse {
    let novel_id = path.into_inner();
    let query = query.into_inner();
    let (offset, limit) = common::page_bounds(query.page, query.limit);
    let result = common::with_connection(&state, move |connection| {
        database::chapter::list_chapters(connection, novel_id, offset, limit)
    })
    .await;
    common::respond(&req, result)
}

#[post("/novels/{novel_id}/chapters")]
async fn create_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<NewChapter>,
) -> HttpResponse {
    let novel_id = path.into_inner();
    let payload = payload.into_inner();
    if let Err(error) = validate_new_chapter(&payload) {
        return common::error_response(req.path(), &error);
    }
    let result = common::with_connection(&state, move |connection| {
        database::chapter::create_chapter(connection, novel_id, payload)
    })
    .await;
    common::respond(&req, result)
}

#[get("/novels/{novel_id}/chapters/{chapter_id}")]
async fn get_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(i32, i32)>,
) -> HttpResponse {
    let (novel_id, chapter_id) = path.into_inner();
    let result = common::with_connection(&state, move |connection| {
        database::chapter::get_chapter(connection, novel_id, chapter_id)
    })
    .await;
    common::respond(&req, result)
}

#[put("/novels/{novel_id}/chapters/{chapter_id}")]
async fn update_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(i32, i32)>,
    payload: web::Json<ChapterChanges>,
) -> HttpResponse {
    let (novel_id, chapter_id) = path.into_inner();
    let payload = payload.into_inner();
    if let Err(error) = validate_changes(&payload) {
        return common::error_response(req.path(), &error);
    }
    let result = common::with_connection(&state, move |connection| {
        database::chapter::update_chapter(connection, novel_id, chapter_id, payload)
    })
    .await;
    common::respond(&req, result)
}

#[delete("/novels/{novel_id}/chapters/{chapter_id}")]
async fn delete_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(i32, i32)>,
) -> HttpResponse {
    let (novel_id, chapter_id) = path.into_inner();
    let result = common::with_connection(&state, move |connection| {
        database::chapter::delete_chapter(connection, novel_id, chapter_id)
            .map(|_| common::Empty {})
    })
    .await;
    common::respond(&req, result)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(latest_handler)
        .service(list_handler)
        .service(create_handler)
        .service(get_handler)
        .service(update_handler)
        .service(delete_handler);
}
