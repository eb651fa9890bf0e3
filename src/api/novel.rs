use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::database;
use crate::database::novel::{NewNovel, NovelChanges};
use crate::error::ApiError;
use crate::AppState;

use super::common;

const MAX_TITLE_BYTES: usize = 256;
const MAX_DESCRIPTION_BYTES: usize = 4096;
const MAX_COVER_URL_BYTES: usize = 1024;

fn validate_new_novel(new: &NewNovel) -> Result<(), ApiError> {
    common::require_non_empty(&new.title, "title")?;
    common::check_max_bytes(&new.title, MAX_TITLE_BYTES, "title")?;
    common::require_non_empty(&new.translator_id, "translator_id")?;
    if let Some(description) = &new.description {
        common::check_max_bytes(description, MAX_DESCRIPTION_BYTES, "description")?;
    }
    if let Some(cover_url) = &new.cover_url {
        common::check_max_bytes(cover_url, MAX_COVER_URL_BYTES, "cover_url")?;
    }
    Ok(())
}

fn validate_changes(changes: &NovelChanges) -> Result<(), ApiError> {
    if let Some(title) = &changes.title {
        common::require_non_empty(title, "title")?;
        common::check_max_bytes(title, MAX_TITLE_BYTES, "title")?;
    }
    if let Some(description) = &changes.description {
        common::check_max_bytes(description, MAX_DESCRIPTION_BYTES, "description")?;
    }
    if let Some(cover_url) = &changes.cover_url {
        common::check_max_bytes(cover_url, MAX_COVER_URL_BYTES, "cover_url")?;
    }
    if let Some(status) = &changes.status {
        common::require_non_empty(status, "status")?;
    }
    Ok(())
}

#[derive(Deserialize)]
struct ListQuery {
    page: Option<i64>,
    limit: Option<i64>,
    translator_id: Option<String>,
    ids: Option<String>,
}

#[get("/novels")]
async fn list_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    let (offset, limit) = common::page_bounds(query.page, query.limit);
    let ids = match query.ids.as_deref().map(common::parse_ids).transpose() {
        Ok(ids) => ids,
        Err(error) => return common::error_response(req.path(), &error),
    };
    let translator_id = query.translator_id;
    let result = common::with_connection(&state, move |connection| {
        database::novel::list_novels(connection, offset, limit, translator_id, ids)
    })
    .await;
    common::respond(&req, result)
}

#[post("/novels")]
async fn create_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<NewNovel>,
) -> HttpResponse {
    let payload = payload.into_inner();
    if let Err(error) = validate_new_novel(&payload) {
        return common::error_response(req.path(), &error);
    }
    let result = common::with_connection(&state, move |connection| {
        database::novel::create_novel(connection, payload)
    })
    .await;
    common::respond(&req, result)
}

#[get("/novels/{novel_id}")]
async fn get_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let novel_id = path.into_inner();
    let result = common::with_connection(&state, move |connection| {
        database::novel::get_novel(connection, novel_id)
    })
    .await;
    common::respond(&req, result)
}

#[put("/novels/{novel_id}")]
async fn update_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<NovelChanges>,
) -> HttpResponse {
    let novel_id = path.into_inner();
    let payload = payload.into_inner();
    if let Err(error) = validate_changes(&payload) {
        return common::error_response(req.path(), &error);
    }
    let result = common::with_connection(&state, move |connection| {
        database::novel::update_novel(connection, novel_id, payload)
    })
    .await;
    common::respond(&req, result)
}

#[delete("/novels/{novel_id}")]
async fn delete_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let novel_id = path.into_inner();
    let result = common::with_connection(&state, move |connection| {
        database::novel::delete_novel(connection, novel_id).map(|_| common::Empty {})
    })
    .await;
    common::respond(&req, result)
}

#[derive(Deserialize)]
struct SearchQuery {
    query: String,
    page: Option<i64>,
    limit: Option<i64>,
}

#[get("/search")]
async fn search_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    let query = query.into_inner();
    if let Err(error) = common::require_non_empty(&query.query, "query") {
        return common::error_response(req.path(), &error);
    }
    let (offset, limit) = common::page_bounds(query.page, query.limit);
    let result = common::with_connection(&state, move |connection| {
        database::novel::search_novels(connection, &query.query, offset, limit)
    })
    .await;
    common::respond(&req, result)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_handler)
        .service(create_handler)
        .service(get_handler)
        .service(update_handler)
        .service(delete_handler)
        .service(search_handler);
}
