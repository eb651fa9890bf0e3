use actix_web::{get, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::database;
use crate::error::ApiError;
use crate::AppState;

use super::common;

const MAX_TAG_NAME_BYTES: usize = 64;
const MAX_TAGS_PER_NOVEL: usize = 20;

#[get("/tags")]
async fn list_handler(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let result =
        common::with_connection(&state, database::tag::list_tags).await;
    common::respond(&req, result)
}

#[get("/novels/{novel_id}/tags")]
async fn novel_tags_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let novel_id = path.into_inner();
    let result = common::with_connection(&state, move |connection| {
        database::tag::get_novel_tags(connection, novel_id)
    })
    .await;
    common::respond(&req, result)
}

#[derive(Deserialize)]
struct UpdateTagsPayload {
    tags: Vec<String>,
}

fn validate_tags(tags: &[String]) -> Result<(), ApiError> {
    if tags.len() > MAX_TAGS_PER_NOVEL {
        return Err(ApiError::Validation(format!(
            "a novel can carry at most {} tags",
            MAX_TAGS_PER_NOVEL
        )));
    }
    for tag in tags {
        common::check_max_bytes(tag, MAX_TAG_NAME_BYTES, "tag")?;
    }
    Ok(())
}

#[put("/novels/{novel_id}/tags")]
async fn update_tags_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateTagsPayload>,
) -> HttpResponse {
    let novel_id = path.into_inner();
    let payload = payload.into_inner();
    if let Err(error) = validate_tags(&payload.tags) {
        return common::error_response(req.path(), &error);
    }
    let result = common::with_connection(&state, move |connection| {
        database::tag::update_novel_tags(connection, novel_id, payload.tags)
    })
    .await;
    common::respond(&req, result)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_handler)
        .service(novel_tags_handler)
        .service(update_tags_handler);
}
