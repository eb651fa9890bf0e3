use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::{AppState, DbConnection};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Serialize)]
pub struct Empty {}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
struct SuccessEnvelope<T: Serialize> {
    status: &'static str,
    data: T,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    status: &'static str,
    message: String,
    path: &'a str,
}

/// Maps a finished request onto the uniform response envelope. This is the
/// only place an `ApiError` turns into an HTTP status.
pub fn respond<T: Serialize>(req: &HttpRequest, result: Result<T, ApiError>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(SuccessEnvelope {
            status: "success",
            data,
        }),
        Err(error) => error_response(req.path(), &error),
    }
}

pub fn error_response(path: &str, error: &ApiError) -> HttpResponse {
    let status_code = error.status_code();
    if status_code.is_server_error() {
        tracing::error!("{}: {}", path, error);
    }
    HttpResponse::build(status_code).json(ErrorEnvelope {
        status: "error",
        message: error.to_string(),
        path,
    })
}

/// Checks out a pooled connection and runs `query` on the blocking thread
/// pool, one connection per request.
pub async fn with_connection<T, F>(state: &AppState, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&DbConnection) -> Result<T, ApiError> + Send + 'static,
{
    let connection = state
        .db_pool
        .get()
        .map_err(|error| ApiError::Pool(error.to_string()))?;
    web::block(move || query(&*connection)).await?
}

/// Translates `page`/`limit` query values into `(offset, limit)`. The offset
/// saturates so an absurd page number stays a valid (empty) query instead of
/// overflowing.
pub fn page_bounds(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let page = page.unwrap_or(1).max(1);
    (page.saturating_sub(1).saturating_mul(limit), limit)
}

/// Parses the `ids=3,5` comma-separated filter.
pub fn parse_ids(raw: &str) -> Result<Vec<i32>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .map_err(|_| ApiError::Validation(format!("invalid id: {}", part)))
        })
        .collect()
}

pub fn require_non_empty(value: &str, field: &'static str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

pub fn check_max_bytes(value: &str, max: usize, field: &'static str) -> Result<(), ApiError> {
    if value.len() > max {
        return Err(ApiError::Validation(format!(
            "{} must not exceed {} bytes",
            field, max
        )));
    }
    Ok(())
}

// Extractor failures (malformed JSON, non-integer path segments, missing
// query parameters) would otherwise bypass the envelope entirely.
pub fn json_error_handler(error: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let response = error_response(req.path(), &ApiError::Validation(error.to_string()));
    InternalError::from_response(error, response).into()
}

pub fn query_error_handler(error: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let response = error_response(req.path(), &ApiError::Validation(error.to_string()));
    InternalError::from_response(error, response).into()
}

pub fn path_error_handler(error: PathError, req: &HttpRequest) -> actix_web::Error {
    let response = error_response(req.path(), &ApiError::Validation(error.to_string()));
    InternalError::from_response(error, response).into()
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    use super::*;

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let body = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[actix_rt::test]
    async fn success_uses_the_envelope() {
        let req = TestRequest::get().uri("/api/novels").to_http_request();
        let response = respond(&req, Ok(Empty {}));
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["status"], "success");
        assert!(value["data"].is_object());
    }

    #[actix_rt::test]
    async fn failure_reports_message_and_path() {
        let req = TestRequest::get().uri("/api/novels/7").to_http_request();
        let response = respond::<Empty>(&req, Err(ApiError::NotFound("novel")));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let value = body_json(response).await;
        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "novel not found");
        assert_eq!(value["path"], "/api/novels/7");
    }

    #[test]
    fn page_bounds_defaults_and_clamps() {
        assert_eq!(page_bounds(None, None), (0, DEFAULT_PAGE_SIZE));
        assert_eq!(page_bounds(Some(3), Some(10)), (20, 10));
        assert_eq!(page_bounds(Some(0), Some(10)), (0, 10));
        assert_eq!(page_bounds(Some(1), Some(100_000)), (0, MAX_PAGE_SIZE));
        assert_eq!(page_bounds(Some(2), Some(-5)), (1, 1));
    }

    #[test]
    fn huge_page_numbers_saturate_instead_of_overflowing() {
        assert_eq!(page_bounds(Some(i64::MAX), Some(2)), (i64::MAX, 2));
        assert_eq!(
            page_bounds(Some(i64::MAX), Some(MAX_PAGE_SIZE)),
            (i64::MAX, MAX_PAGE_SIZE)
        );
    }

    #[test]
    fn parse_ids_accepts_lists_and_rejects_junk() {
        assert_eq!(parse_ids("3,5").unwrap(), vec![3, 5]);
        assert_eq!(parse_ids(" 3 , 5 ,").unwrap(), vec![3, 5]);
        assert!(parse_ids("").unwrap().is_empty());
        assert!(parse_ids("3,abc").is_err());
    }
}
