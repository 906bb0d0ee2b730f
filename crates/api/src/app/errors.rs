use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use quayside_core::EntityId;
use quayside_infra::{LifecycleError, RegistryStoreError};

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

pub fn lifecycle_error_to_response(err: LifecycleError) -> axum::response::Response {
    match err {
        LifecycleError::EntityNotFound { .. } | LifecycleError::JobNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        LifecycleError::InvalidTransition(msg) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        LifecycleError::Store(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
        LifecycleError::Registry(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "registry_error",
            e.to_string(),
        ),
    }
}

pub fn registry_error_to_response(err: RegistryStoreError) -> axum::response::Response {
    match err {
        RegistryStoreError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "entity not found")
        }
        RegistryStoreError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg)
        }
    }
}

pub fn parse_entity_id(raw: &str) -> Result<EntityId, axum::response::Response> {
    raw.parse::<EntityId>().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("invalid entity id: {raw}"),
        )
    })
}
