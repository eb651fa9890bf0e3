use actix_web::{get, post, put, web, HttpRequest, HttpResponse};

use crate::database;
use crate::database::translator::{NewTranslator, TranslatorChanges};
use crate::error::ApiError;
use crate::AppState;

use super::common;

const MAX_USER_ID_BYTES: usize = 64;
const MAX_NAME_BYTES: usize = 64;
const MAX_BIO_BYTES: usize = 1024;

fn validate_new_translator(new: &NewTranslator) -> Result<(), ApiError> {
    common::require_non_empty(&new.user_id, "user_id")?;
    common::check_max_bytes(&new.user_id, MAX_USER_ID_BYTES, "user_id")?;
    common::require_non_empty(&new.display_name, "display_name")?;
    common::check_max_bytes(&new.display_name, MAX_NAME_BYTES, "display_name")?;
    if let Some(username) = &new.username {
        common::check_max_bytes(username, MAX_NAME_BYTES, "username")?;
    }
    if let Some(bio) = &new.bio {
        common::check_max_bytes(bio, MAX_BIO_BYTES, "bio")?;
    }
    Ok(())
}

fn validate_changes(changes: &TranslatorChanges) -> Result<(), ApiError> {
    if changes.username.is_none() && changes.display_name.is_none() && changes.bio.is_none() {
        return Err(ApiError::Validation("no fields to update".to_owned()));
    }
    if let Some(display_name) = &changes.display_name {
        common::require_non_empty(display_name, "display_name")?;
        common::check_max_bytes(display_name, MAX_NAME_BYTES, "display_name")?;
    }
    if let Some(username) = &changes.username {
        common::check_max_bytes(username, MAX_NAME_BYTES, "username")?;
    }
    if let Some(bio) = &changes.bio {
        common::check_max_bytes(bio, MAX_BIO_BYTES, "bio")?;
    }
    Ok(())
}

#[post("/translators")]
async fn create_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<NewTranslator>,
) -> HttpResponse {
    let payload = payload.into_inner();
    if let Err(error) = validate_new_translator(&payload) {
        return common::error_response(req.path(), &error);
    }
    let result = common::with_connection(&state, move |connection| {
        database::translator::create_translator(connection, payload)
    })
    .await;
    common::respond(&req, result)
}

#[get("/translators/{user_id}")]
async fn get_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let user_id = path.into_inner();
    let result = common::with_connection(&state, move |connection| {
        database::translator::get_translator(connection, &user_id)
    })
    .await;
    common::respond(&req, result)
}

#[put("/translators/{user_id}")]
async fn update_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<TranslatorChanges>,
) -> HttpResponse {
    let user_id = path.into_inner();
    let payload = payload.into_inner();
    if let Err(error) = validate_changes(&payload) {
        return common::error_response(req.path(), &error);
    }
    let result = common::with_connection(&state, move |connection| {
        database::translator::update_translator(connection, &user_id, payload)
    })
    .await;
    common::respond(&req, result)
}

#[get("/translators/{user_id}/stats")]
async fn stats_handler(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let user_id = path.into_inner();
    let result = common::with_connection(&state, move |connection| {
        database::translator::get_translator_stats(connection, &user_id)
    })
    .await;
    common::respond(&req, result)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_handler)
        .service(get_handler)
        .service(update_handler)
        .service(stats_handler);
}
