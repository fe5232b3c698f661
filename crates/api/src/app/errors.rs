use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockpile_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", err.to_string())
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::StorageUnavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 400 with a field-level error map, for request bodies that fail validation
/// on multiple fields at once.
pub fn validation_error_map(errors: Vec<(&'static str, String)>) -> axum::response::Response {
    let map: serde_json::Map<String, serde_json::Value> = errors
        .into_iter()
        .map(|(field, msg)| (field.to_string(), json!(msg)))
        .collect();

    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": "validation failed",
            "validationErrors": map,
        })),
    )
        .into_response()
}
